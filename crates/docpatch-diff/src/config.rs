//! Diff configuration.
//!
//! A [`DiffConfig`] is assembled with builder methods before a diff starts and
//! is read-only while the traversal runs. Everything except custom comparers
//! can also be loaded from a serialized form (e.g. a TOML file).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use docpatch_types::Node;

/// How array and slice fields are reconciled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayStrategy {
    /// Overwrite the whole field with the new sequence.
    #[default]
    Replace,
    /// Push new trailing elements when the old sequence is a prefix.
    Append,
    /// Positional updates for same-length changes, pushes for pure growth.
    Smart,
    /// Pair struct elements by identifier field.
    Merge,
}

/// What to do when a scalar changes to its type's zero value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroValueHandling {
    /// Emit `$unset`.
    #[serde(rename = "unset")]
    AsUnset,
    /// Emit `$set` with the zero value.
    #[default]
    #[serde(rename = "set")]
    AsSet,
    /// Emit nothing.
    Ignore,
}

/// A caller-supplied comparison for one field path.
///
/// Returns `Ok(true)` when the values should be treated as equal, `Ok(false)`
/// to replace the field with the new value, or `Err` to abort the diff.
pub type CustomComparer = Arc<dyn Fn(&Node, &Node) -> Result<bool, String> + Send + Sync>;

/// Configuration for a single diff call.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    ignore_fields: Vec<String>,
    array_strategy: ArrayStrategy,
    zero_value_handling: ZeroValueHandling,
    detect_pointer_sharing: bool,
    #[serde(skip)]
    custom_comparers: BTreeMap<String, CustomComparer>,
}

impl DiffConfig {
    /// Default configuration: replace arrays, set zero values, no sharing check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip fields matching any entry by short name, external name, or full path.
    pub fn ignore_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.ignore_fields.contains(&field) {
                self.ignore_fields.push(field);
            }
        }
        self
    }

    pub fn array_strategy(mut self, strategy: ArrayStrategy) -> Self {
        self.array_strategy = strategy;
        self
    }

    pub fn zero_value_handling(mut self, handling: ZeroValueHandling) -> Self {
        self.zero_value_handling = handling;
        self
    }

    /// Fail the diff if old and new share any pointer.
    pub fn detect_pointer_sharing(mut self, enabled: bool) -> Self {
        self.detect_pointer_sharing = enabled;
        self
    }

    /// Register a comparer for an exact field path.
    pub fn custom_comparer<F>(mut self, path: impl Into<String>, comparer: F) -> Self
    where
        F: Fn(&Node, &Node) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.custom_comparers.insert(path.into(), Arc::new(comparer));
        self
    }

    pub fn ignored_fields(&self) -> &[String] {
        &self.ignore_fields
    }

    pub fn strategy(&self) -> ArrayStrategy {
        self.array_strategy
    }

    pub fn zero_handling(&self) -> ZeroValueHandling {
        self.zero_value_handling
    }

    pub fn detects_pointer_sharing(&self) -> bool {
        self.detect_pointer_sharing
    }

    pub fn comparer(&self, path: &str) -> Option<&CustomComparer> {
        self.custom_comparers.get(path)
    }

    /// Returns `true` if any of the field's three names is on the ignore list.
    pub fn is_ignored(&self, short_name: &str, external_name: &str, full_path: &str) -> bool {
        self.ignore_fields
            .iter()
            .any(|f| f == short_name || f == external_name || f == full_path)
    }
}

impl fmt::Debug for DiffConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffConfig")
            .field("ignore_fields", &self.ignore_fields)
            .field("array_strategy", &self.array_strategy)
            .field("zero_value_handling", &self.zero_value_handling)
            .field("detect_pointer_sharing", &self.detect_pointer_sharing)
            .field(
                "custom_comparers",
                &self.custom_comparers.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
