//! Pointer-sharing detection.
//!
//! The tracker walks the old and new trees independently and records the
//! address and path of every non-nil heap pointer. If one address shows up on
//! both sides, old and new alias the same memory and "changed" cannot be told
//! apart from "unchanged".
//!
//! Each side's address map doubles as its visited set: a pointer seen before
//! on the same side is not descended into again.

use std::collections::HashMap;

use tracing::trace;

use docpatch_types::{Node, NodeKind};

use crate::path;

/// Which tree a pointer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
}

/// An address reachable from both trees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedPointer {
    pub address: usize,
    pub old_path: String,
    pub new_path: String,
}

/// Address → field path, per side.
#[derive(Debug, Default)]
pub struct PointerTracker {
    old_pointers: HashMap<usize, String>,
    new_pointers: HashMap<usize, String>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every pointer reachable from `root`.
    pub fn track(&mut self, root: &Node, side: Side) {
        let pointers = match side {
            Side::Old => &mut self.old_pointers,
            Side::New => &mut self.new_pointers,
        };
        walk(pointers, root, "");
    }

    pub fn old_pointers(&self) -> &HashMap<usize, String> {
        &self.old_pointers
    }

    pub fn new_pointers(&self) -> &HashMap<usize, String> {
        &self.new_pointers
    }

    /// The shared address with the lexicographically smallest new-side path.
    pub fn find_shared(&self) -> Option<SharedPointer> {
        self.new_pointers
            .iter()
            .filter_map(|(address, new_path)| {
                self.old_pointers.get(address).map(|old_path| SharedPointer {
                    address: *address,
                    old_path: old_path.clone(),
                    new_path: new_path.clone(),
                })
            })
            .min_by(|a, b| a.new_path.cmp(&b.new_path).then(a.address.cmp(&b.address)))
    }
}

fn walk(pointers: &mut HashMap<usize, String>, node: &Node, at: &str) {
    match &node.kind {
        NodeKind::Pointer(pointer) => {
            let Some(pointee) = &pointer.pointee else {
                return;
            };
            if let Some(address) = pointer.address {
                if pointers.contains_key(&address) {
                    return;
                }
                trace!(address, path = at, "tracked pointer");
                pointers.insert(address, at.to_string());
            }
            walk(pointers, pointee, at);
        }
        NodeKind::Struct(fields) => {
            for field in fields {
                if let Some(name) = field.external_name() {
                    walk(pointers, &field.value, &path::join(at, &name));
                }
            }
        }
        NodeKind::Seq(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(pointers, item, &path::index(at, i));
            }
        }
        NodeKind::Map(entries) => {
            for (key, value) in entries {
                walk(pointers, value, &path::join(at, key));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docpatch_types::{introspect_struct, Introspect};
    use std::collections::BTreeMap;
    use std::rc::Rc;

    struct Settings {
        theme: String,
    }

    struct Account {
        settings: Rc<Settings>,
        backups: Vec<Rc<Settings>>,
        by_name: BTreeMap<String, Rc<Settings>>,
    }

    introspect_struct!(Settings { theme });
    introspect_struct!(Account { settings, backups, by_name });

    fn settings(theme: &str) -> Rc<Settings> {
        Rc::new(Settings { theme: theme.into() })
    }

    #[test]
    fn records_paths_for_fields_elements_and_entries() {
        let account = Account {
            settings: settings("dark"),
            backups: vec![settings("a"), settings("b")],
            by_name: BTreeMap::from([("main".to_string(), settings("c"))]),
        };
        let mut tracker = PointerTracker::new();
        tracker.track(&account.introspect(), Side::Old);

        let mut paths: Vec<_> = tracker.old_pointers().values().cloned().collect();
        paths.sort();
        assert_eq!(paths, vec!["backups[0]", "backups[1]", "by_name.main", "settings"]);
        assert!(tracker.new_pointers().is_empty());
    }

    #[test]
    fn disjoint_trees_share_nothing() {
        let old = Account {
            settings: settings("dark"),
            backups: vec![],
            by_name: BTreeMap::new(),
        };
        let new = Account {
            settings: settings("dark"),
            backups: vec![],
            by_name: BTreeMap::new(),
        };
        let mut tracker = PointerTracker::new();
        tracker.track(&old.introspect(), Side::Old);
        tracker.track(&new.introspect(), Side::New);
        assert!(tracker.find_shared().is_none());
    }

    #[test]
    fn shared_rc_is_reported_with_both_paths() {
        let shared = settings("dark");
        let old = Account {
            settings: shared.clone(),
            backups: vec![],
            by_name: BTreeMap::new(),
        };
        let new = Account {
            settings: settings("light"),
            backups: vec![shared],
            by_name: BTreeMap::new(),
        };
        let mut tracker = PointerTracker::new();
        tracker.track(&old.introspect(), Side::Old);
        tracker.track(&new.introspect(), Side::New);

        let shared = tracker.find_shared().expect("sharing should be detected");
        assert_eq!(shared.old_path, "settings");
        assert_eq!(shared.new_path, "backups[0]");
    }

    #[test]
    fn separate_empty_boxes_are_not_shared() {
        struct Marker {}
        struct Holder {
            marker: Box<Marker>,
            label: Box<str>,
        }
        introspect_struct!(Marker {});
        introspect_struct!(Holder { marker, label });

        let holder = || Holder {
            marker: Box::new(Marker {}),
            label: "".into(),
        };
        let mut tracker = PointerTracker::new();
        tracker.track(&holder().introspect(), Side::Old);
        tracker.track(&holder().introspect(), Side::New);
        assert!(tracker.old_pointers().is_empty());
        assert!(tracker.find_shared().is_none());
    }

    #[test]
    fn repeated_pointer_on_one_side_is_visited_once() {
        let shared = settings("x");
        let account = Account {
            settings: shared.clone(),
            backups: vec![shared.clone(), shared],
            by_name: BTreeMap::new(),
        };
        let mut tracker = PointerTracker::new();
        tracker.track(&account.introspect(), Side::New);
        assert_eq!(tracker.new_pointers().len(), 1);
        assert_eq!(tracker.new_pointers().values().next().unwrap(), "settings");
    }
}
