use crate::Cell;
use crate::error::{InferenceError, Result};
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement: exactly `count` of `cells` are mines.
///
/// Cells are kept in an ordered set, so two sentences over the same cells
/// compare and hash equal no matter how they were built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Sentence<C: Cell> {
    cells: BTreeSet<C>,
    count: i64,
}

impl<C: Cell> Sentence<C> {
    pub fn new(cells: impl IntoIterator<Item = C>, count: i64) -> Self {
        Sentence {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    pub fn cells(&self) -> &BTreeSet<C> {
        &self.cells
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &C) -> bool {
        self.cells.contains(cell)
    }

    /// Every cell is a mine when the count covers the whole set.
    pub fn known_mines(&self) -> BTreeSet<C> {
        if self.cells.len() as i64 == self.count {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when the count is zero.
    pub fn known_safes(&self) -> BTreeSet<C> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// True when direct resolution would classify at least one cell.
    pub fn is_resolvable(&self) -> bool {
        !self.cells.is_empty() && (self.count == 0 || self.cells.len() as i64 == self.count)
    }

    /// True when `0 <= count <= |cells|`.
    pub fn is_consistent(&self) -> bool {
        (0..=self.cells.len() as i64).contains(&self.count)
    }

    /// Removes a cell now known to be a mine, taking one off the count.
    /// Returns whether the cell was present.
    pub fn resolve_as_mine(&mut self, cell: &C) -> Result<bool, C> {
        if !self.cells.contains(cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(InferenceError::NegativeCount {
                cell: cell.clone(),
                count: self.count - 1,
            });
        }
        self.cells.remove(cell);
        self.count -= 1;
        Ok(true)
    }

    /// Removes a cell now known to be safe. The count is untouched.
    pub fn resolve_as_safe(&mut self, cell: &C) -> bool {
        self.cells.remove(cell)
    }

    pub fn is_strict_subset_of(&self, other: &Sentence<C>) -> bool {
        self.cells.len() < other.cells.len() && self.cells.is_subset(&other.cells)
    }

    /// `self - other`: the cells of `self` outside `other`, holding the
    /// remaining mines. Only meaningful when `other` is a subset of `self`.
    pub fn subtract(&self, other: &Sentence<C>) -> Sentence<C> {
        Sentence {
            cells: self.cells.difference(&other.cells).cloned().collect(),
            count: self.count - other.count,
        }
    }

    pub(crate) fn contradiction(&self) -> InferenceError<C> {
        InferenceError::Contradiction {
            cells: self.cells.iter().cloned().collect(),
            count: self.count,
        }
    }
}

impl<C: Cell> fmt::Display for Sentence<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} = {}",
            self.cells.iter().map(|c| format!("{c:?}")).join(", "),
            self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mines_when_count_covers_all_cells() {
        let sentence = Sentence::new(['a', 'b'], 2);
        assert_eq!(sentence.known_mines(), BTreeSet::from(['a', 'b']));
        assert!(sentence.known_safes().is_empty());
    }

    #[test]
    fn test_known_safes_when_count_is_zero() {
        let sentence = Sentence::new(['a', 'b', 'c'], 0);
        assert_eq!(sentence.known_safes(), BTreeSet::from(['a', 'b', 'c']));
        assert!(sentence.known_mines().is_empty());
    }

    #[test]
    fn test_undetermined_sentence_yields_nothing() {
        let sentence = Sentence::new(['a', 'b', 'c'], 1);
        assert!(sentence.known_mines().is_empty());
        assert!(sentence.known_safes().is_empty());
        assert!(!sentence.is_resolvable());
    }

    #[test]
    fn test_empty_sentence_is_harmless() {
        // Both rules fire on {} = 0 but produce nothing.
        let sentence: Sentence<char> = Sentence::new([], 0);
        assert!(sentence.known_mines().is_empty());
        assert!(sentence.known_safes().is_empty());
        assert!(!sentence.is_resolvable());
    }

    #[test]
    fn test_resolve_as_mine_decrements_count() {
        let mut sentence = Sentence::new(['a', 'b', 'c'], 2);
        assert!(sentence.resolve_as_mine(&'a').unwrap());
        assert_eq!(sentence, Sentence::new(['b', 'c'], 1));

        // Absent cells are a no-op.
        assert!(!sentence.resolve_as_mine(&'z').unwrap());
        assert_eq!(sentence, Sentence::new(['b', 'c'], 1));
    }

    #[test]
    fn test_resolve_as_mine_rejects_negative_count() {
        let mut sentence = Sentence::new(['a', 'b'], 0);
        let err = sentence.resolve_as_mine(&'a').unwrap_err();
        assert_eq!(err, InferenceError::NegativeCount { cell: 'a', count: -1 });
        // Nothing changed.
        assert_eq!(sentence, Sentence::new(['a', 'b'], 0));
    }

    #[test]
    fn test_resolve_as_safe_keeps_count() {
        let mut sentence = Sentence::new(['a', 'b', 'c'], 1);
        assert!(sentence.resolve_as_safe(&'c'));
        assert_eq!(sentence, Sentence::new(['a', 'b'], 1));
        assert!(!sentence.resolve_as_safe(&'c'));
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        assert_eq!(Sentence::new(['c', 'a', 'b'], 1), Sentence::new(['a', 'b', 'c'], 1));
        assert_ne!(Sentence::new(['a', 'b'], 1), Sentence::new(['a', 'b'], 2));
    }

    #[test]
    fn test_strict_subset() {
        let small = Sentence::new(['a', 'b'], 1);
        let large = Sentence::new(['a', 'b', 'c'], 1);
        assert!(small.is_strict_subset_of(&large));
        assert!(!large.is_strict_subset_of(&small));
        // Equal sets are not strict subsets.
        assert!(!small.is_strict_subset_of(&Sentence::new(['a', 'b'], 0)));
        // Incomparable sets.
        assert!(!small.is_strict_subset_of(&Sentence::new(['b', 'c', 'd'], 1)));
    }

    #[test]
    fn test_subtract() {
        let small = Sentence::new(['a', 'b'], 1);
        let large = Sentence::new(['a', 'b', 'c', 'd'], 3);
        assert_eq!(large.subtract(&small), Sentence::new(['c', 'd'], 2));
    }

    #[test]
    fn test_consistency_bounds() {
        assert!(Sentence::new(['a'], 0).is_consistent());
        assert!(Sentence::new(['a'], 1).is_consistent());
        assert!(!Sentence::new(['a'], 2).is_consistent());
        assert!(!Sentence::new(['a'], -1).is_consistent());
    }

    #[test]
    fn test_display() {
        assert_eq!(Sentence::new(['b', 'a'], 1).to_string(), "{'a', 'b'} = 1");
    }
}
