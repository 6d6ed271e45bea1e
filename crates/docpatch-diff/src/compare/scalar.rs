//! Leaf comparison and the zero-value policy.

use docpatch_types::Node;

use super::Differ;
use crate::config::ZeroValueHandling;
use crate::patch::SET;

impl Differ<'_> {
    /// Compare two leaves (or any values compared as a whole).
    ///
    /// Equal values produce nothing. A change to the type's zero value follows
    /// the configured [`ZeroValueHandling`]; any other change is a `$set`.
    pub(crate) fn compare_scalar(&mut self, old: &Node, new: &Node, path: &str) {
        if old.same_value(new) {
            return;
        }
        if new.is_zero() {
            match self.config.zero_handling() {
                ZeroValueHandling::AsUnset => self.unset(path),
                ZeroValueHandling::AsSet => self.patch.add_operation(SET, path, new.to_value()),
                ZeroValueHandling::Ignore => {}
            }
            return;
        }
        self.patch.add_operation(SET, path, new.to_value());
    }
}
