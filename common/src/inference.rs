use crate::Cell;
use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::sentence::Sentence;
use itertools::Itertools;
use std::collections::{BTreeSet, HashSet};

/// How far subset resolution runs within one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SubsetStrategy {
    /// Compare every pair once per round, then hand back to direct resolution.
    #[default]
    SinglePass,
    /// Keep comparing until no pass derives anything new.
    Saturate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InferenceConfig {
    pub subset_strategy: SubsetStrategy,
}

/// What a fixpoint run did. A run that changes nothing is still a success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixpointReport {
    pub rounds: usize,
    /// Cells newly classified as mine or safe.
    pub classified: usize,
    /// Sentences newly derived by subset resolution.
    pub derived: usize,
}

/// The two derivation rules and the loop that drives them to a fixpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InferenceEngine {
    config: InferenceConfig,
}

impl InferenceEngine {
    pub fn new(config: InferenceConfig) -> Self {
        InferenceEngine { config }
    }

    pub fn config(&self) -> InferenceConfig {
        self.config
    }

    /// Alternates direct and subset resolution until a round neither
    /// classifies a cell nor derives a sentence.
    ///
    /// Terminates because classification only ever grows the known sets and
    /// the sentences over a finite set of cells are finite and deduplicated.
    pub fn run_to_fixpoint<C: Cell>(
        &self,
        kb: &mut KnowledgeBase<C>,
    ) -> Result<FixpointReport, C> {
        let mut report = FixpointReport::default();
        loop {
            let classified = self.direct_resolution(kb)?;
            let derived = match self.config.subset_strategy {
                SubsetStrategy::SinglePass => self.subset_resolution(kb)?,
                SubsetStrategy::Saturate => {
                    let mut total = 0;
                    loop {
                        let derived = self.subset_resolution(kb)?;
                        if derived == 0 {
                            break total;
                        }
                        total += derived;
                    }
                }
            };

            report.rounds += 1;
            report.classified += classified;
            report.derived += derived;
            tracing::trace!(
                round = report.rounds,
                classified,
                derived,
                sentences = kb.sentences().len(),
                "inference round"
            );

            if classified == 0 && derived == 0 {
                break;
            }
        }

        tracing::debug!(
            rounds = report.rounds,
            classified = report.classified,
            derived = report.derived,
            mines = kb.known_mines().len(),
            safes = kb.known_safes().len(),
            "reached fixpoint"
        );
        Ok(report)
    }

    /// Rule A: any sentence whose count is zero, or equals its size,
    /// classifies all of its cells. Repeats until a pass classifies nothing,
    /// since each classification shrinks other sentences.
    ///
    /// Returns the number of cells newly classified.
    pub fn direct_resolution<C: Cell>(&self, kb: &mut KnowledgeBase<C>) -> Result<usize, C> {
        let mut total = 0;
        loop {
            let mut mines = BTreeSet::new();
            let mut safes = BTreeSet::new();
            for sentence in kb.sentences().iter().filter(|s| s.is_resolvable()) {
                mines.extend(sentence.known_mines());
                safes.extend(sentence.known_safes());
            }

            let mut newly = 0;
            for cell in mines {
                if kb.mark_mine(cell)? {
                    newly += 1;
                }
            }
            for cell in safes {
                if kb.mark_safe(cell)? {
                    newly += 1;
                }
            }
            kb.prune_satisfied()?;

            if newly == 0 {
                return Ok(total);
            }
            total += newly;
        }
    }

    /// Rule B: whenever one sentence's cells are a strict subset of
    /// another's, the difference holds the difference of their counts.
    ///
    /// Derivations come from a frozen view of the current sentences and are
    /// appended once the pass ends. Returns the number of sentences added.
    pub fn subset_resolution<C: Cell>(&self, kb: &mut KnowledgeBase<C>) -> Result<usize, C> {
        let fresh = {
            let known: HashSet<&Sentence<C>> = kb.sentences().iter().collect();
            let mut pending = HashSet::new();
            let mut fresh = Vec::new();
            for (a, b) in kb.sentences().iter().tuple_combinations() {
                let derived = if a.is_strict_subset_of(b) {
                    b.subtract(a)
                } else if b.is_strict_subset_of(a) {
                    a.subtract(b)
                } else {
                    continue;
                };
                if !known.contains(&derived) && pending.insert(derived.clone()) {
                    fresh.push(derived);
                }
            }
            fresh
        };

        let mut added = 0;
        for sentence in fresh {
            if kb.add_sentence(sentence)? {
                added += 1;
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;

    fn kb_with(sentences: &[(&str, i64)]) -> KnowledgeBase<char> {
        let mut kb = KnowledgeBase::new();
        for (cells, count) in sentences {
            kb.add_sentence(Sentence::new(cells.chars(), *count)).unwrap();
        }
        kb
    }

    #[test]
    fn test_direct_resolution_all_mines() {
        let mut kb = kb_with(&[("ab", 2)]);
        let engine = InferenceEngine::default();
        assert_eq!(engine.direct_resolution(&mut kb).unwrap(), 2);
        assert_eq!(kb.known_mines(), &BTreeSet::from(['a', 'b']));
        assert!(kb.sentences().is_empty());
    }

    #[test]
    fn test_direct_resolution_cascades() {
        // b safe turns {b, c} = 1 into {c} = 1, which then makes c a mine,
        // which turns {c, d} = 1 into {d} = 0.
        let mut kb = kb_with(&[("ab", 0), ("bc", 1), ("cd", 1)]);
        let engine = InferenceEngine::default();
        assert_eq!(engine.direct_resolution(&mut kb).unwrap(), 4);
        assert_eq!(kb.known_safes(), &BTreeSet::from(['a', 'b', 'd']));
        assert_eq!(kb.known_mines(), &BTreeSet::from(['c']));
        assert!(kb.sentences().is_empty());
    }

    #[test]
    fn test_direct_resolution_without_progress() {
        let mut kb = kb_with(&[("abc", 1)]);
        let engine = InferenceEngine::default();
        assert_eq!(engine.direct_resolution(&mut kb).unwrap(), 0);
        assert_eq!(kb.sentences(), &[Sentence::new(['a', 'b', 'c'], 1)]);
    }

    #[test]
    fn test_subset_resolution_derives_difference() {
        let mut kb = kb_with(&[("abc", 1), ("ab", 1)]);
        let engine = InferenceEngine::default();
        assert_eq!(engine.subset_resolution(&mut kb).unwrap(), 1);
        assert_eq!(kb.sentences()[2], Sentence::new(['c'], 0));

        // Running again derives nothing new.
        assert_eq!(engine.subset_resolution(&mut kb).unwrap(), 0);
        assert_eq!(kb.sentences().len(), 3);
    }

    #[test]
    fn test_subset_resolution_ignores_equal_and_incomparable_sets() {
        let mut kb = kb_with(&[("ab", 1), ("ab", 2), ("bc", 1)]);
        let engine = InferenceEngine::default();
        assert_eq!(engine.subset_resolution(&mut kb).unwrap(), 0);
        assert_eq!(kb.sentences().len(), 3);
    }

    #[test]
    fn test_subset_resolution_dedups_within_a_pass() {
        // {b, c} = 1 and {d} = 1 each come out of two different pairs.
        let mut kb = kb_with(&[("a", 0), ("abc", 1), ("ad", 1), ("abcd", 2)]);
        let engine = InferenceEngine::default();
        assert_eq!(engine.subset_resolution(&mut kb).unwrap(), 3);
        assert_eq!(
            &kb.sentences()[4..],
            &[
                Sentence::new(['b', 'c'], 1),
                Sentence::new(['d'], 1),
                Sentence::new(['b', 'c', 'd'], 2)
            ]
        );
    }

    #[test]
    fn test_fixpoint_subset_then_direct() {
        let mut kb = kb_with(&[("abc", 1), ("ab", 1)]);
        let report = InferenceEngine::default().run_to_fixpoint(&mut kb).unwrap();
        assert!(kb.is_known_safe(&'c'));
        assert_eq!(kb.sentences(), &[Sentence::new(['a', 'b'], 1)]);
        assert_eq!(report.classified, 1);
        assert_eq!(report.derived, 1);
    }

    #[test]
    fn test_fixpoint_direct_resolution() {
        let mut kb = kb_with(&[("ab", 2)]);
        InferenceEngine::default().run_to_fixpoint(&mut kb).unwrap();
        assert!(kb.is_known_mine(&'a'));
        assert!(kb.is_known_mine(&'b'));
    }

    #[test]
    fn test_fixpoint_without_new_information() {
        let mut kb = kb_with(&[("abc", 1), ("cde", 1)]);
        let report = InferenceEngine::default().run_to_fixpoint(&mut kb).unwrap();
        assert_eq!(
            report,
            FixpointReport {
                rounds: 1,
                classified: 0,
                derived: 0
            }
        );
        assert_eq!(kb.sentences().len(), 2);
    }

    #[test]
    fn test_strategies_reach_same_fixpoint() {
        let sentences = [("abcd", 2), ("abc", 1), ("ab", 1), ("def", 2), ("fg", 1)];
        let mut single = kb_with(&sentences);
        let mut saturate = kb_with(&sentences);

        InferenceEngine::default().run_to_fixpoint(&mut single).unwrap();
        InferenceEngine::new(InferenceConfig {
            subset_strategy: SubsetStrategy::Saturate,
        })
        .run_to_fixpoint(&mut saturate)
        .unwrap();

        assert_eq!(single.known_mines(), saturate.known_mines());
        assert_eq!(single.known_safes(), saturate.known_safes());
        // c safe, d mine, then {e, f} = 1 stays open.
        assert!(single.is_known_safe(&'c'));
        assert!(single.is_known_mine(&'d'));
    }

    #[test]
    fn test_fixpoint_surfaces_contradiction() {
        // {a, b} = 1 and {a, b, c} = 0 cannot both hold.
        let mut kb = kb_with(&[("ab", 1), ("abc", 0)]);
        let err = InferenceEngine::default().run_to_fixpoint(&mut kb).unwrap_err();
        assert!(matches!(err, InferenceError::Contradiction { .. }));
    }
}
