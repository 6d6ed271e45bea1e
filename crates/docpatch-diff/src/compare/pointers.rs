//! Pointer comparison.
//!
//! Pointers are transparent in paths: a struct behind a pointer is diffed at
//! the pointer's own path.

use docpatch_types::{NodeKind, Pointer};

use super::Differ;
use crate::error::DiffResult;

impl Differ<'_> {
    pub(crate) fn compare_pointer(&mut self, old: &Pointer, new: &Pointer, path: &str) -> DiffResult<()> {
        match (&old.pointee, &new.pointee) {
            (None, None) => Ok(()),
            (None, Some(new_pointee)) => self.add(new_pointee, path),
            (Some(old_pointee), None) => {
                self.remove(old_pointee, path);
                Ok(())
            }
            (Some(old_pointee), Some(new_pointee)) => {
                if old.address.is_some() && old.address == new.address {
                    return Ok(());
                }
                match (&old_pointee.kind, &new_pointee.kind) {
                    (NodeKind::Struct(old_fields), NodeKind::Struct(new_fields)) => {
                        self.compare_struct(old_fields, new_fields, path)
                    }
                    _ => {
                        if old_pointee.is_nil() || new_pointee.is_nil() {
                            return self.compare(Some(old_pointee), Some(new_pointee), path);
                        }
                        self.compare_scalar(old_pointee, new_pointee, path);
                        Ok(())
                    }
                }
            }
        }
    }
}
