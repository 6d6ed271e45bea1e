//! The patch accumulator.
//!
//! A [`Patch`] groups field-path → value changes under update operators, keeps
//! the array filters positional paths refer to, and records change metadata.
//!
//! # Invariants
//!
//! - A path appears under at most one operator. Writing a path under a new
//!   operator moves it there.
//! - `is_empty()` holds exactly when there are no operator groups.
//! - `metadata.total_changes` counts every `add_operation` call, including
//!   repeated writes to the same path.

use std::collections::BTreeMap;

use serde::Serialize;

use docpatch_types::{encode_document, Document, Value};

use crate::error::DiffResult;

/// Replace a field's value.
pub const SET: &str = "$set";
/// Remove a field.
pub const UNSET: &str = "$unset";
/// Append to an array field.
pub const PUSH: &str = "$push";
/// Modifier carrying several values for `$push`.
pub const EACH: &str = "$each";

/// Operator name → field path → value.
pub type Operations = BTreeMap<String, BTreeMap<String, Value>>;

/// Bookkeeping about what a patch touches.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMetadata {
    /// Every path written, in first-write order.
    pub fields_changed: Vec<String>,
    /// The operator currently holding each path.
    pub operation_types: BTreeMap<String, String>,
    /// Number of `add_operation` calls.
    pub total_changes: usize,
}

/// Serializable snapshot of a patch.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchInfo {
    pub operations: Operations,
    pub array_filters: Vec<Document>,
    pub metadata: PatchMetadata,
}

/// A set of document update operations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    operations: Operations,
    array_filters: Vec<Document>,
    metadata: PatchMetadata,
}

impl Patch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `operator path = value`.
    ///
    /// The last write for a path wins, and the path is removed from any other
    /// operator it was previously recorded under.
    pub fn add_operation(&mut self, operator: &str, path: &str, value: Value) {
        self.operations.retain(|op, fields| {
            if op != operator {
                fields.remove(path);
            }
            !fields.is_empty()
        });
        self.operations
            .entry(operator.to_string())
            .or_default()
            .insert(path.to_string(), value);

        if !self.metadata.fields_changed.iter().any(|p| p == path) {
            self.metadata.fields_changed.push(path.to_string());
        }
        self.metadata
            .operation_types
            .insert(path.to_string(), operator.to_string());
        self.metadata.total_changes += 1;
    }

    /// Append an array filter document.
    pub fn add_array_filter(&mut self, filter: Document) {
        self.array_filters.push(filter);
    }

    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    /// The value recorded for `path` under `operator`, if any.
    pub fn get(&self, operator: &str, path: &str) -> Option<&Value> {
        self.operations.get(operator).and_then(|fields| fields.get(path))
    }

    /// Array filters in the order they were added.
    pub fn array_filters(&self) -> &[Document] {
        &self.array_filters
    }

    pub fn metadata(&self) -> &PatchMetadata {
        &self.metadata
    }

    /// Returns `true` if the patch has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of (operator, path) entries.
    pub fn len(&self) -> usize {
        self.operations.values().map(BTreeMap::len).sum()
    }

    /// A serializable copy of the operations, filters and metadata.
    pub fn info(&self) -> PatchInfo {
        PatchInfo {
            operations: self.operations.clone(),
            array_filters: self.array_filters.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// The update document: `{ "$set": {...}, "$unset": {...}, ... }`.
    pub fn update_document(&self) -> Document {
        self.operations
            .iter()
            .map(|(op, fields)| {
                let group: Document = fields.iter().map(|(p, v)| (p.clone(), v.clone())).collect();
                (op.clone(), Value::Document(group))
            })
            .collect()
    }

    /// BSON-encoded update document, ready to submit as a partial update.
    pub fn to_bson(&self) -> DiffResult<Vec<u8>> {
        Ok(encode_document(&self.update_document())?)
    }

    /// Each array filter BSON-encoded, in order.
    pub fn array_filters_bson(&self) -> DiffResult<Vec<Vec<u8>>> {
        self.array_filters
            .iter()
            .map(|f| encode_document(f).map_err(Into::into))
            .collect()
    }
}
