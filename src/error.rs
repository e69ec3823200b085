//! Error types for the outer surface.
//!
//! The search itself never fails: terminal nodes score as mate or draw, and
//! cancellation unwinds cooperatively. Errors only arise where user input
//! enters the system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// FEN string the board interface refused to parse.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// Move that is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// Input line that matches no known command.
    #[error("unrecognized command: {0}")]
    UnknownCommand(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
