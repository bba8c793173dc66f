use crate::Cell;
use crate::error::{Classification, InferenceError, Result};
use crate::sentence::Sentence;
use std::collections::{BTreeSet, HashSet};

/// Every fact known about one game: the live sentences, plus the cells
/// already classified and the cells already played.
///
/// No sentence ever mentions a classified cell. Classifying a cell removes
/// it from every sentence at once, so `known_mines` and `known_safes` stay
/// disjoint from the sentence cells and from each other.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase<C: Cell> {
    sentences: Vec<Sentence<C>>,
    mines: BTreeSet<C>,
    safes: BTreeSet<C>,
    moves_made: BTreeSet<C>,
}

impl<C: Cell> Default for KnowledgeBase<C> {
    fn default() -> Self {
        KnowledgeBase {
            sentences: Vec::new(),
            mines: BTreeSet::new(),
            safes: BTreeSet::new(),
            moves_made: BTreeSet::new(),
        }
    }
}

impl<C: Cell> KnowledgeBase<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live sentences in insertion order.
    pub fn sentences(&self) -> &[Sentence<C>] {
        &self.sentences
    }

    pub fn known_mines(&self) -> &BTreeSet<C> {
        &self.mines
    }

    pub fn known_safes(&self) -> &BTreeSet<C> {
        &self.safes
    }

    pub fn moves_made(&self) -> &BTreeSet<C> {
        &self.moves_made
    }

    pub fn is_known_mine(&self, cell: &C) -> bool {
        self.mines.contains(cell)
    }

    pub fn is_known_safe(&self, cell: &C) -> bool {
        self.safes.contains(cell)
    }

    pub fn is_classified(&self, cell: &C) -> bool {
        self.is_known_mine(cell) || self.is_known_safe(cell)
    }

    /// Records a played cell. Returns false if it was already played.
    pub fn record_move(&mut self, cell: C) -> bool {
        self.moves_made.insert(cell)
    }

    /// Known safe cells that have not been played yet.
    pub fn safe_moves(&self) -> BTreeSet<C> {
        self.safes.difference(&self.moves_made).cloned().collect()
    }

    pub fn all_mines_found(&self, total_mines: usize) -> bool {
        self.mines.len() == total_mines
    }

    /// Classifies `cell` as a mine and resolves it out of every sentence.
    /// Returns false if the cell was already a known mine.
    pub fn mark_mine(&mut self, cell: C) -> Result<bool, C> {
        if self.safes.contains(&cell) {
            return Err(InferenceError::ConflictingClassification {
                cell,
                known_as: Classification::Safe,
            });
        }
        if self.mines.contains(&cell) {
            return Ok(false);
        }
        for sentence in &mut self.sentences {
            sentence.resolve_as_mine(&cell)?;
        }
        self.mines.insert(cell);
        Ok(true)
    }

    /// Classifies `cell` as safe and resolves it out of every sentence.
    /// Returns false if the cell was already known safe.
    pub fn mark_safe(&mut self, cell: C) -> Result<bool, C> {
        if self.mines.contains(&cell) {
            return Err(InferenceError::ConflictingClassification {
                cell,
                known_as: Classification::Mine,
            });
        }
        if !self.safes.insert(cell.clone()) {
            return Ok(false);
        }
        for sentence in &mut self.sentences {
            sentence.resolve_as_safe(&cell);
        }
        Ok(true)
    }

    /// Stores a sentence unless it is empty or already known.
    ///
    /// Classified cells are resolved out first, so the stored sentence only
    /// mentions unknown cells. Returns whether a new sentence was stored.
    pub fn add_sentence(&mut self, sentence: Sentence<C>) -> Result<bool, C> {
        let sentence = self.normalize(sentence);
        if !sentence.is_consistent() {
            return Err(sentence.contradiction());
        }
        if sentence.is_empty() || self.sentences.contains(&sentence) {
            return Ok(false);
        }
        self.sentences.push(sentence);
        Ok(true)
    }

    /// Drops sentences with no cells left and sentences that have become
    /// duplicates of an earlier one. Returns how many were dropped.
    ///
    /// Fails on any sentence whose count no longer fits its cells, including
    /// an empty sentence that still claims mines.
    pub fn prune_satisfied(&mut self) -> Result<usize, C> {
        if let Some(bad) = self.sentences.iter().find(|s| !s.is_consistent()) {
            return Err(bad.contradiction());
        }
        let before = self.sentences.len();
        let mut seen = HashSet::with_capacity(before);
        self.sentences
            .retain(|sentence| !sentence.is_empty() && seen.insert(sentence.clone()));
        Ok(before - self.sentences.len())
    }

    fn normalize(&self, sentence: Sentence<C>) -> Sentence<C> {
        if !sentence.cells().iter().any(|cell| self.is_classified(cell)) {
            return sentence;
        }
        let mines = sentence
            .cells()
            .iter()
            .filter(|cell| self.is_known_mine(cell))
            .count() as i64;
        Sentence::new(
            sentence
                .cells()
                .iter()
                .filter(|cell| !self.is_classified(cell))
                .cloned(),
            sentence.count() - mines,
        )
    }
}
