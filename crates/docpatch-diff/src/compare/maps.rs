//! String-keyed map comparison.

use std::collections::{BTreeMap, BTreeSet};

use docpatch_types::Node;

use super::Differ;
use crate::error::DiffResult;
use crate::path;

impl Differ<'_> {
    /// Diff the union of both key sets. Each key extends the path as
    /// `base.key`, and absent sides follow the dispatcher's nil rules.
    pub(crate) fn compare_map(
        &mut self,
        old: &BTreeMap<String, Node>,
        new: &BTreeMap<String, Node>,
        base: &str,
    ) -> DiffResult<()> {
        let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
        for key in keys {
            let child = path::join(base, key);
            if self.config.is_ignored(key, key, &child) {
                continue;
            }
            self.compare(old.get(key), new.get(key), &child)?;
        }
        Ok(())
    }
}
