//! Knowledge-based deduction for minesweeper-style games.
//!
//! A [`Reasoner`] collects observations of the form "this cell is safe and
//! `n` of its neighbors are mines" as [`Sentence`]s in a [`KnowledgeBase`],
//! then runs the [`InferenceEngine`] until nothing new follows:
//! - direct resolution: a sentence with count zero makes all its cells safe,
//!   and a sentence whose count equals its size makes all its cells mines;
//! - subset resolution: if one sentence's cells are a strict subset of
//!   another's, their difference holds the difference of their counts.
//!
//! Cells are opaque. The engine never assumes a grid; [`Grid`] is one
//! neighbor policy a caller may supply.

pub mod error;
pub mod grid;
pub mod inference;
pub mod knowledge;
pub mod reasoner;
pub mod sentence;

use std::fmt::Debug;
use std::hash::Hash;

pub use error::{Classification, InferenceError};
pub use grid::{Grid, Point};
pub use inference::{FixpointReport, InferenceConfig, InferenceEngine, SubsetStrategy};
pub use knowledge::KnowledgeBase;
pub use reasoner::Reasoner;
pub use sentence::Sentence;

/// Anything usable as a cell identifier.
pub trait Cell: Clone + Eq + Ord + Hash + Debug {}
impl<T: Clone + Eq + Ord + Hash + Debug> Cell for T {}
