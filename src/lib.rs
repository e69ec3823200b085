//! riptide: a parallel alpha-beta chess engine.
//!
//! The crate is built around four pieces: a static evaluator
//! ([`eval::evaluate`]), a shared transposition table
//! ([`search::TranspositionTable`]), the search kernel ([`search::Search`],
//! iterative-deepening negamax with a quiescence extension and a root split
//! across worker threads), and the [`engine::Engine`] facade that ties them
//! together. Board rules (move generation, FEN, hashing) come from the
//! `chess` crate.

pub mod cli;
pub mod engine;
pub mod error;
pub mod eval;
pub mod search;
pub mod tables;
pub mod types;

pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use search::{Search, SearchConfig, StopHandle, TranspositionTable};
