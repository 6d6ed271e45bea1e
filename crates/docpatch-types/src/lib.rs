//! Foundation types for docpatch.
//!
//! This crate provides the runtime introspection model the diff engine walks,
//! the external field-naming convention, and the value model patches carry.
//! Every other docpatch crate depends on `docpatch-types`.
//!
//! # Key Types
//!
//! - [`Introspect`] -- Capability to describe a value at runtime
//! - [`Node`] / [`NodeKind`] -- Introspected value tree (type identity + shape)
//! - [`StructNode`] -- Builder for struct nodes (also via [`introspect_struct!`])
//! - [`Value`] / [`Document`] -- Patch values, order-preserving documents
//! - [`encode_document`] -- BSON encoding for store submission

pub mod bson;
pub mod error;
pub mod introspect;
pub mod naming;
pub mod node;
pub mod value;

pub use bson::encode_document;
pub use error::EncodeError;
pub use introspect::{Introspect, StructNode};
pub use naming::{external_name, to_snake_case};
pub use node::{Field, Node, NodeKind, Pointer};
pub use value::{Document, Value};
