//! The diff entry points and the recursive dispatcher.
//!
//! [`diff`] introspects both values, optionally records their pointers, and
//! hands the trees to a [`Differ`], which routes each pair of nodes to the
//! comparator for its kind and accumulates operations into a [`Patch`].
//!
//! Dispatch rules, with `nil` meaning an absent side or a dynamic null:
//!
//! | old   | new   | action |
//! |-------|-------|--------|
//! | nil   | nil   | nothing |
//! | nil   | value | struct: per-field diff against the zero struct; otherwise `$set` |
//! | value | nil   | struct: `$unset` each non-zero field; otherwise `$unset` |
//! | value | value | same type: by kind; different type: [`DiffError::TypeMismatch`] |

mod arrays;
mod maps;
mod pointers;
mod scalar;
mod structs;

use tracing::debug;

use docpatch_types::{Introspect, Node, NodeKind, Value};

use crate::config::DiffConfig;
use crate::error::{DiffError, DiffResult};
use crate::filters::ArrayFilterIdentifier;
use crate::patch::{Patch, SET, UNSET};
use crate::tracker::{PointerTracker, Side};

/// Diff two values with the default configuration.
///
/// `None` stands for an absent value. Both sides absent is
/// [`DiffError::NilPair`].
pub fn diff<A, B>(old: Option<&A>, new: Option<&B>) -> DiffResult<Patch>
where
    A: Introspect + ?Sized,
    B: Introspect + ?Sized,
{
    diff_with_config(old, new, &DiffConfig::default())
}

/// Diff two values with an explicit configuration.
pub fn diff_with_config<A, B>(
    old: Option<&A>,
    new: Option<&B>,
    config: &DiffConfig,
) -> DiffResult<Patch>
where
    A: Introspect + ?Sized,
    B: Introspect + ?Sized,
{
    let old = old.map(Introspect::introspect);
    let new = new.map(Introspect::introspect);
    diff_nodes(old.as_ref(), new.as_ref(), config)
}

/// Diff two already-introspected trees.
pub fn diff_nodes(old: Option<&Node>, new: Option<&Node>, config: &DiffConfig) -> DiffResult<Patch> {
    let old = old.filter(|n| !n.is_nil());
    let new = new.filter(|n| !n.is_nil());
    if old.is_none() && new.is_none() {
        return Err(DiffError::NilPair);
    }

    let tracker = config.detects_pointer_sharing().then(|| {
        let mut tracker = PointerTracker::new();
        if let Some(old) = old {
            tracker.track(old, Side::Old);
        }
        if let Some(new) = new {
            tracker.track(new, Side::New);
        }
        tracker
    });

    let mut differ = Differ::new(config);
    differ.compare(old, new, "")?;

    if let Some(shared) = tracker.as_ref().and_then(PointerTracker::find_shared) {
        debug!(
            address = shared.address,
            path = %shared.new_path,
            "pointer sharing detected"
        );
        return Err(DiffError::PointerSharing {
            address: shared.address,
            old_path: shared.old_path,
            new_path: shared.new_path,
        });
    }

    let patch = differ.finish();
    debug!(
        operations = patch.len(),
        array_filters = patch.array_filters().len(),
        total_changes = patch.metadata().total_changes,
        "diff complete"
    );
    Ok(patch)
}

/// Per-call traversal state.
pub(crate) struct Differ<'c> {
    config: &'c DiffConfig,
    patch: Patch,
    filters: ArrayFilterIdentifier,
}

impl<'c> Differ<'c> {
    pub(crate) fn new(config: &'c DiffConfig) -> Self {
        Self {
            config,
            patch: Patch::new(),
            filters: ArrayFilterIdentifier::new(),
        }
    }

    pub(crate) fn finish(self) -> Patch {
        self.patch
    }

    /// Route a pair of possibly-absent nodes.
    pub(crate) fn compare(&mut self, old: Option<&Node>, new: Option<&Node>, path: &str) -> DiffResult<()> {
        let old = old.filter(|n| !n.is_nil());
        let new = new.filter(|n| !n.is_nil());
        match (old, new) {
            (None, None) => Ok(()),
            (None, Some(new)) => self.add(new, path),
            (Some(old), None) => {
                self.remove(old, path);
                Ok(())
            }
            (Some(old), Some(new)) => self.compare_values(old, new, path),
        }
    }

    fn compare_values(&mut self, old: &Node, new: &Node, path: &str) -> DiffResult<()> {
        if old.type_name != new.type_name {
            return Err(DiffError::TypeMismatch {
                path: path.to_string(),
                old_type: old.type_name.to_string(),
                new_type: new.type_name.to_string(),
            });
        }

        if let Some(comparer) = self.config.comparer(path) {
            return match comparer(old, new) {
                Ok(true) => Ok(()),
                Ok(false) => {
                    self.patch.add_operation(SET, path, new.to_value());
                    Ok(())
                }
                Err(message) => Err(DiffError::Comparer {
                    path: path.to_string(),
                    message,
                }),
            };
        }

        match (&old.kind, &new.kind) {
            (NodeKind::Struct(old_fields), NodeKind::Struct(new_fields)) => {
                self.compare_struct(old_fields, new_fields, path)
            }
            (NodeKind::Seq(old_items), NodeKind::Seq(new_items)) => {
                self.compare_array(old_items, new_items, path);
                Ok(())
            }
            (NodeKind::Map(old_entries), NodeKind::Map(new_entries)) => {
                self.compare_map(old_entries, new_entries, path)
            }
            (NodeKind::Pointer(old_ptr), NodeKind::Pointer(new_ptr)) => {
                self.compare_pointer(old_ptr, new_ptr, path)
            }
            _ => {
                self.compare_scalar(old, new, path);
                Ok(())
            }
        }
    }

    /// A value appeared where there was none.
    pub(crate) fn add(&mut self, new: &Node, path: &str) -> DiffResult<()> {
        match &new.kind {
            NodeKind::Struct(fields) => self.add_fields(fields, path),
            _ => {
                self.patch.add_operation(SET, path, new.to_value());
                Ok(())
            }
        }
    }

    /// A value disappeared.
    pub(crate) fn remove(&mut self, old: &Node, path: &str) {
        match &old.kind {
            NodeKind::Struct(fields) => self.remove_fields(fields, path),
            _ => self.unset(path),
        }
    }

    pub(crate) fn unset(&mut self, path: &str) {
        self.patch.add_operation(UNSET, path, Value::String(String::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docpatch_types::introspect_struct;

    #[derive(Clone)]
    struct User {
        name: String,
        age: i32,
    }

    struct Player {
        name: String,
        age: i32,
    }

    introspect_struct!(User { name, age });
    introspect_struct!(Player { name, age });

    fn user(name: &str, age: i32) -> User {
        User {
            name: name.into(),
            age,
        }
    }

    #[test]
    fn both_nil_is_an_error() {
        assert_eq!(diff::<User, User>(None, None), Err(DiffError::NilPair));
    }

    #[test]
    fn json_nulls_count_as_nil() {
        let null = serde_json::Value::Null;
        assert_eq!(diff(Some(&null), Some(&null)), Err(DiffError::NilPair));
    }

    #[test]
    fn single_field_change() {
        let patch = diff(Some(&user("John", 25)), Some(&user("John", 26))).unwrap();
        assert_eq!(patch.get(SET, "age"), Some(&Value::Int(26)));
        assert_eq!(patch.len(), 1);
    }

    #[test]
    fn distinct_types_are_rejected() {
        let player = Player {
            name: "John".into(),
            age: 25,
        };
        let err = diff(Some(&user("John", 25)), Some(&player)).unwrap_err();
        assert!(matches!(err, DiffError::TypeMismatch { ref path, .. } if path.is_empty()));
    }

    #[test]
    fn nil_to_struct_sets_non_zero_leaves() {
        let patch = diff::<User, User>(None, Some(&user("Ann", 0))).unwrap();
        assert_eq!(patch.get(SET, "name"), Some(&Value::from("Ann")));
        assert!(patch.get(SET, "age").is_none());
    }

    #[test]
    fn struct_to_nil_unsets_non_zero_leaves() {
        let patch = diff(Some(&user("Ann", 3)), None::<&User>).unwrap();
        assert!(patch.get(UNSET, "name").is_some());
        assert!(patch.get(UNSET, "age").is_some());
        assert_eq!(patch.len(), 2);
    }

    #[test]
    fn top_level_scalar_is_set_directly() {
        let patch = diff::<i64, i64>(None, Some(&5)).unwrap();
        assert_eq!(patch.get(SET, ""), Some(&Value::Int(5)));
    }

    #[test]
    fn comparer_equal_suppresses_change() {
        let config = DiffConfig::new().custom_comparer("name", |_, _| Ok(true));
        let patch =
            diff_with_config(Some(&user("a", 1)), Some(&user("b", 1)), &config).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn comparer_unequal_replaces_field() {
        let config = DiffConfig::new().custom_comparer("age", |_, _| Ok(false));
        let patch =
            diff_with_config(Some(&user("a", 1)), Some(&user("a", 1)), &config).unwrap();
        assert_eq!(patch.get(SET, "age"), Some(&Value::Int(1)));
    }

    #[test]
    fn comparer_failure_aborts() {
        let config = DiffConfig::new().custom_comparer("age", |_, _| Err("boom".into()));
        let err =
            diff_with_config(Some(&user("a", 1)), Some(&user("b", 2)), &config).unwrap_err();
        assert_eq!(
            err,
            DiffError::Comparer {
                path: "age".into(),
                message: "boom".into()
            }
        );
    }
}
