//! Structural diff engine for docpatch.
//!
//! Compares two introspected values and compiles the differences into a
//! document-store partial update: `$set`, `$unset` and `$push` groups keyed by
//! dot-separated field path, plus the array filters that positional paths
//! (`items.$[elem0]`) refer to.
//!
//! ```
//! use docpatch_diff::{diff, Value, SET};
//! use docpatch_types::introspect_struct;
//!
//! struct User {
//!     name: String,
//!     age: i32,
//! }
//! introspect_struct!(User { name, age });
//!
//! let old = User { name: "John".into(), age: 25 };
//! let new = User { name: "John".into(), age: 26 };
//! let patch = diff(Some(&old), Some(&new)).unwrap();
//! assert_eq!(patch.get(SET, "age"), Some(&Value::Int(26)));
//! ```
//!
//! # Key Types
//!
//! - [`Patch`] -- Accumulated operations, array filters and metadata
//! - [`DiffConfig`] -- Ignore list, [`ArrayStrategy`], [`ZeroValueHandling`], comparers
//! - [`PointerTracker`] -- Detects heap values reachable from both sides
//! - [`DiffError`] -- Failure modes of a diff call

pub mod compare;
pub mod config;
pub mod error;
pub mod filters;
pub mod patch;
pub mod path;
pub mod tracker;

pub use compare::{diff, diff_nodes, diff_with_config};
pub use config::{ArrayStrategy, CustomComparer, DiffConfig, ZeroValueHandling};
pub use error::{DiffError, DiffResult};
pub use filters::ArrayFilterIdentifier;
pub use patch::{Operations, Patch, PatchInfo, PatchMetadata, EACH, PUSH, SET, UNSET};
pub use tracker::{PointerTracker, SharedPointer, Side};

pub use docpatch_types::{Document, Introspect, Node, NodeKind, Value};
