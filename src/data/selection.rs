use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// SelectionIndex – the brushed row indices
// ---------------------------------------------------------------------------

/// Row indices picked by the brush. Storage only: deciding what to recompute
/// after a change is up to [`crate::state::DatasetState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionIndex {
    rows: BTreeSet<usize>,
}

impl SelectionIndex {
    /// Replace the whole selection.
    pub fn replace(&mut self, indices: BTreeSet<usize>) {
        self.rows = indices;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Empty, or covering every row. The overlay is suppressed for both.
    pub fn is_trivial(&self, total_rows: usize) -> bool {
        self.is_empty() || self.len() == total_rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_is_wholesale() {
        let mut sel = SelectionIndex::default();
        sel.replace([1, 2, 3].into_iter().collect());
        sel.replace([7].into_iter().collect());
        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_trivial_boundaries() {
        let mut sel = SelectionIndex::default();
        assert!(sel.is_trivial(5));

        sel.replace([0, 1].into_iter().collect());
        assert!(!sel.is_trivial(5));

        sel.replace((0..5).collect());
        assert!(sel.is_trivial(5));

        sel.clear();
        assert!(sel.is_trivial(5));
        assert!(sel.is_empty());
    }
}
