//! Array filter placeholder labels.

/// Hands out unique placeholder labels (`elem0`, `elem1`, ...) for one diff
/// call. The same label names both the filter document and the positional
/// path segment `$[label]`.
#[derive(Debug, Default)]
pub struct ArrayFilterIdentifier {
    next: usize,
}

impl ArrayFilterIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fresh label.
    pub fn next_label(&mut self) -> String {
        let label = format!("elem{}", self.next);
        self.next += 1;
        label
    }

    /// Number of labels issued so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_sequential() {
        let mut ids = ArrayFilterIdentifier::new();
        assert_eq!(ids.next_label(), "elem0");
        assert_eq!(ids.next_label(), "elem1");
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn each_identifier_starts_at_zero() {
        let mut a = ArrayFilterIdentifier::new();
        a.next_label();
        let mut b = ArrayFilterIdentifier::new();
        assert_eq!(b.next_label(), "elem0");
    }
}
