//! Array and slice reconciliation.
//!
//! The strategy is fixed for the whole call and applied to every sequence.
//! Equal sequences never produce an operation. Whenever a strategy cannot
//! express a change safely it falls back to [`ArrayStrategy::Replace`]; a
//! single path never mixes positional `$set`s with a whole-array operation.

use tracing::debug;

use docpatch_types::{Document, Node, NodeKind, Value};

use super::Differ;
use crate::config::ArrayStrategy;
use crate::patch::{EACH, PUSH, SET};
use crate::path;

/// Identifier field names for merge pairing, in priority order. Matched
/// case-insensitively, so `ID`/`Id` and `UUID`/`Uuid` are both covered.
const IDENTIFIER_FIELDS: [&str; 4] = ["id", "key", "name", "uuid"];

/// The first populated identifier field of a struct element.
struct Identifier<'a> {
    field: &'static str,
    external: String,
    value: &'a Node,
}

fn identifier(element: &Node) -> Option<Identifier<'_>> {
    let NodeKind::Struct(fields) = &element.deref().kind else {
        return None;
    };
    IDENTIFIER_FIELDS.iter().find_map(|candidate| {
        fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(candidate) && !f.value.is_zero())
            .and_then(|f| {
                f.external_name().map(|external| Identifier {
                    field: f.name,
                    external,
                    value: f.value.deref(),
                })
            })
    })
}

fn sequences_equal(old: &[Node], new: &[Node]) -> bool {
    old.len() == new.len() && old.iter().zip(new).all(|(a, b)| a.same_value(b))
}

impl Differ<'_> {
    pub(crate) fn compare_array(&mut self, old: &[Node], new: &[Node], path: &str) {
        if sequences_equal(old, new) {
            return;
        }
        match self.config.strategy() {
            ArrayStrategy::Replace => self.replace_array(new, path),
            ArrayStrategy::Append => self.append_array(old, new, path),
            ArrayStrategy::Smart => self.smart_array(old, new, path),
            ArrayStrategy::Merge => self.merge_array(old, new, path),
        }
    }

    fn replace_array(&mut self, new: &[Node], path: &str) {
        let items = new.iter().map(Node::to_value).collect();
        self.patch.add_operation(SET, path, Value::Array(items));
    }

    fn fall_back(&mut self, new: &[Node], path: &str, reason: &str) {
        debug!(
            path,
            strategy = ?self.config.strategy(),
            reason,
            "array strategy fell back to replace"
        );
        self.replace_array(new, path);
    }

    /// `$push` one value, or several through `$each`.
    fn push_elements<'n, I>(&mut self, items: I, path: &str)
    where
        I: IntoIterator<Item = &'n Node>,
    {
        let mut values: Vec<Value> = items.into_iter().map(Node::to_value).collect();
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            Value::Document(Document::new().with(EACH, Value::Array(values)))
        };
        self.patch.add_operation(PUSH, path, value);
    }

    /// `$set base.$[label]` with a filter selecting the target element.
    ///
    /// The filter key is the bare label, or `label.suffix` when the element is
    /// selected by one of its fields.
    fn positional_set(&mut self, base: &str, suffix: Option<&str>, selector: Value, new: &Node) {
        let label = self.filters.next_label();
        let key = match suffix {
            Some(suffix) => format!("{label}.{suffix}"),
            None => label.clone(),
        };
        self.patch.add_array_filter(Document::new().with(key, selector));
        self.patch
            .add_operation(SET, &path::positional(base, &label), new.to_value());
    }

    fn append_array(&mut self, old: &[Node], new: &[Node], path: &str) {
        let is_prefix = new.len() >= old.len() && old.iter().zip(new).all(|(a, b)| a.same_value(b));
        if !is_prefix {
            return self.fall_back(new, path, "old sequence is not a prefix of new");
        }
        self.push_elements(&new[old.len()..], path);
    }

    fn smart_array(&mut self, old: &[Node], new: &[Node], path: &str) {
        if old.is_empty() || new.is_empty() {
            return self.fall_back(new, path, "empty side");
        }
        let longer = old.len().max(new.len());
        if old.len().abs_diff(new.len()) * 2 > longer {
            return self.fall_back(new, path, "length delta exceeds half the larger length");
        }
        if old[0].deref().is_primitive() || new[0].deref().is_primitive() {
            return self.fall_back(new, path, "primitive elements");
        }

        let overlap = old.len().min(new.len());
        let changed: Vec<usize> = (0..overlap)
            .filter(|&i| !old[i].same_value(&new[i]))
            .collect();

        if changed.is_empty() {
            if new.len() > old.len() {
                self.push_elements(&new[old.len()..], path);
            } else {
                self.fall_back(new, path, "sequence shrank");
            }
        } else if old.len() == new.len() {
            for i in changed {
                self.positional_set(path, None, old[i].to_value(), &new[i]);
            }
        } else {
            self.fall_back(new, path, "interior and length changes together");
        }
    }

    fn merge_array(&mut self, old: &[Node], new: &[Node], path: &str) {
        if !old.iter().chain(new).all(|n| n.deref().is_struct()) {
            return self.fall_back(new, path, "elements are not structs");
        }

        let old_ids: Vec<Option<Identifier<'_>>> = old.iter().map(identifier).collect();
        let mut used = vec![false; old.len()];
        let mut updates: Vec<(usize, &Node, Identifier<'_>)> = Vec::new();
        let mut additions: Vec<&Node> = Vec::new();

        for element in new {
            let Some(id) = identifier(element) else {
                additions.push(element);
                continue;
            };
            let matched = old_ids.iter().enumerate().position(|(i, old_id)| {
                !used[i]
                    && old_id
                        .as_ref()
                        .is_some_and(|o| o.field == id.field && o.value.same_value(id.value))
            });
            match matched {
                Some(i) => {
                    used[i] = true;
                    if !old[i].same_value(element) {
                        updates.push((i, element, id));
                    }
                }
                None => additions.push(element),
            }
        }

        let removals = used.iter().filter(|u| !**u).count();
        if removals > 0 {
            return self.fall_back(new, path, "elements removed");
        }
        if !additions.is_empty() && !updates.is_empty() {
            return self.fall_back(new, path, "updates mixed with additions");
        }
        if !additions.is_empty() {
            return self.push_elements(additions, path);
        }

        updates.sort_by_key(|(i, _, _)| *i);
        for (_, element, id) in updates {
            self.positional_set(path, Some(&id.external), id.value.to_value(), element);
        }
    }
}
