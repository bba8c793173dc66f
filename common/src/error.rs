use std::fmt::Debug;

/// Which of the two fact sets a cell already belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Mine,
    Safe,
}

/// A logical-consistency failure. Every variant means the knowledge base was
/// handed facts that cannot all be true, so inference must stop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError<C: Debug> {
    /// The observed count does not fit the cells still left unclassified.
    #[error(
        "observation at {cell:?} reports {count} mines, which leaves {adjusted} for {candidates} unclassified neighbors"
    )]
    InconsistentObservation {
        cell: C,
        count: u32,
        adjusted: i64,
        candidates: usize,
    },

    /// Resolving a mine out of a sentence whose count is already zero.
    #[error("marking {cell:?} as a mine drives a sentence count to {count}")]
    NegativeCount { cell: C, count: i64 },

    /// A cell was classified both ways.
    #[error("{cell:?} is already known as {known_as:?}")]
    ConflictingClassification { cell: C, known_as: Classification },

    /// A sentence whose count is outside `0..=|cells|`.
    #[error("contradictory sentence {cells:?} = {count}")]
    Contradiction { cells: Vec<C>, count: i64 },
}

pub type Result<T, C> = std::result::Result<T, InferenceError<C>>;
