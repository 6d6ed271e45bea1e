//! Struct comparison: per-field recursion with name resolution and ignores.

use docpatch_types::{Field, NodeKind};

use super::Differ;
use crate::error::{DiffError, DiffResult};
use crate::path;

impl Differ<'_> {
    /// Resolve a field's path, or `None` if it is tagged `-` or ignored.
    fn field_path(&self, field: &Field, base: &str) -> Option<String> {
        let external = field.external_name()?;
        let full = path::join(base, &external);
        if self.config.is_ignored(field.name, &external, &full) {
            return None;
        }
        Some(full)
    }

    /// Diff two structs of the same type field by field.
    pub(crate) fn compare_struct(&mut self, old: &[Field], new: &[Field], base: &str) -> DiffResult<()> {
        if old.len() != new.len() {
            return Err(DiffError::TypeMismatch {
                path: base.to_string(),
                old_type: format!("struct with {} fields", old.len()),
                new_type: format!("struct with {} fields", new.len()),
            });
        }
        for (old_field, new_field) in old.iter().zip(new) {
            let Some(child) = self.field_path(new_field, base) else {
                continue;
            };
            self.compare(Some(&old_field.value), Some(&new_field.value), &child)?;
        }
        Ok(())
    }

    /// Diff each field of a newly present struct against its zero value.
    pub(crate) fn add_fields(&mut self, fields: &[Field], base: &str) -> DiffResult<()> {
        for field in fields {
            let Some(child) = self.field_path(field, base) else {
                continue;
            };
            let zero = field.value.zeroed();
            self.compare(Some(&zero), Some(&field.value), &child)?;
        }
        Ok(())
    }

    /// `$unset` every non-zero field of a struct that went away.
    ///
    /// Nested structs and struct pointees recurse to their leaves; maps unset
    /// entry by entry; everything else is unset whole.
    pub(crate) fn remove_fields(&mut self, fields: &[Field], base: &str) {
        for field in fields {
            if field.value.is_zero() {
                continue;
            }
            let Some(child) = self.field_path(field, base) else {
                continue;
            };
            match &field.value.kind {
                NodeKind::Struct(inner) => self.remove_fields(inner, &child),
                NodeKind::Pointer(pointer) => {
                    if let Some(pointee) = &pointer.pointee {
                        self.remove(pointee, &child);
                    }
                }
                NodeKind::Map(entries) => {
                    for (key, value) in entries {
                        let entry = path::join(&child, key);
                        if value.is_nil() || self.config.is_ignored(key, key, &entry) {
                            continue;
                        }
                        self.remove(value, &entry);
                    }
                }
                _ => self.unset(&child),
            }
        }
    }
}
