use crate::Cell;
use crate::error::{Classification, InferenceError, Result};
use crate::inference::{FixpointReport, InferenceConfig, InferenceEngine};
use crate::knowledge::KnowledgeBase;
use crate::sentence::Sentence;
use std::collections::BTreeSet;

/// A player's knowledge of one game.
///
/// Observations go in through [`Reasoner::observe`]; each one is processed
/// to a complete fixpoint before it returns, so every query sees a settled
/// knowledge base. Holding `&mut self` for the whole call is the only
/// locking it needs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Reasoner<C: Cell> {
    knowledge: KnowledgeBase<C>,
    engine: InferenceEngine,
}

impl<C: Cell> Default for Reasoner<C> {
    fn default() -> Self {
        Reasoner::new(InferenceConfig::default())
    }
}

impl<C: Cell> Reasoner<C> {
    pub fn new(config: InferenceConfig) -> Self {
        Reasoner {
            knowledge: KnowledgeBase::new(),
            engine: InferenceEngine::new(config),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase<C> {
        &self.knowledge
    }

    /// Called when the board tells us that `cell` is safe and that `count`
    /// of its neighbors are mines.
    ///
    /// This function:
    /// 1. Checks the count against what is already known. An impossible
    ///    count is rejected before anything changes.
    /// 2. Marks `cell` as played and safe.
    /// 3. Stores a sentence over the neighbors still unclassified, with the
    ///    count reduced by the neighbors already known to be mines.
    /// 4. Runs inference to a fixpoint.
    pub fn observe<F, I>(
        &mut self,
        cell: C,
        count: u32,
        neighbors_of: F,
    ) -> Result<FixpointReport, C>
    where
        F: FnOnce(&C) -> I,
        I: IntoIterator<Item = C>,
    {
        tracing::debug!(?cell, count, "observe");

        if self.knowledge.is_known_mine(&cell) {
            tracing::warn!(?cell, "observed a cell already deduced to be a mine");
            return Err(InferenceError::ConflictingClassification {
                cell,
                known_as: Classification::Mine,
            });
        }

        let mut candidates: BTreeSet<C> = neighbors_of(&cell)
            .into_iter()
            .filter(|neighbor| *neighbor != cell && !self.knowledge.is_known_safe(neighbor))
            .collect();
        let already_mines = candidates
            .iter()
            .filter(|neighbor| self.knowledge.is_known_mine(neighbor))
            .count();
        candidates.retain(|neighbor| !self.knowledge.is_known_mine(neighbor));

        let adjusted = i64::from(count) - already_mines as i64;
        if adjusted < 0 || adjusted > candidates.len() as i64 {
            tracing::warn!(?cell, count, adjusted, "observation contradicts knowledge");
            return Err(InferenceError::InconsistentObservation {
                cell,
                count,
                adjusted,
                candidates: candidates.len(),
            });
        }

        self.knowledge.record_move(cell.clone());
        self.knowledge.mark_safe(cell)?;
        self.knowledge.add_sentence(Sentence::new(candidates, adjusted))?;

        self.engine.run_to_fixpoint(&mut self.knowledge)
    }

    pub fn is_known_mine(&self, cell: &C) -> bool {
        self.knowledge.is_known_mine(cell)
    }

    pub fn is_known_safe(&self, cell: &C) -> bool {
        self.knowledge.is_known_safe(cell)
    }

    /// Cells proven safe that have not been played yet.
    pub fn safe_moves(&self) -> BTreeSet<C> {
        self.knowledge.safe_moves()
    }

    pub fn all_mines_found(&self, total_mines: usize) -> bool {
        self.knowledge.all_mines_found(total_mines)
    }
}

impl<C> Reasoner<C>
where
    C: Cell + serde::Serialize + serde::de::DeserializeOwned,
{
    /// Encodes the whole reasoner state.
    pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, bcs::Error> {
        bcs::to_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, bcs::Error> {
        bcs::from_bytes(bytes)
    }
}
