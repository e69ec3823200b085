//! Line-oriented command loop.
//!
//! A deliberately small surface for driving the engine from a terminal or a
//! parent process: set a position, ask for a move, inspect the static
//! evaluation. One command per line, one reply per command.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, MoveGen};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::eval;
use crate::search::SearchConfig;

/// A parsed input line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// `position startpos | position fen <FEN>`, optionally followed by
    /// `moves <uci>...` to play out from there.
    Position { fen: Option<String>, moves: Vec<String> },
    /// Search the current position and report the best move.
    Go,
    /// Report the static evaluation of the current position.
    Eval,
    /// Print the current position as FEN.
    Display,
    Quit,
}

/// Parse one input line.
pub fn parse_command(line: &str) -> EngineResult<Command> {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("position") => {
            let mut rest: Vec<&str> = tokens.collect();
            let fen = if rest.first() == Some(&"startpos") {
                rest.remove(0);
                None
            } else if rest.first() == Some(&"fen") {
                rest.remove(0);
                let end = rest
                    .iter()
                    .position(|&t| t == "moves")
                    .unwrap_or(rest.len());
                let fen: Vec<&str> = rest.drain(..end).collect();
                if fen.is_empty() {
                    return Err(EngineError::InvalidFen(String::new()));
                }
                Some(fen.join(" "))
            } else {
                return Err(EngineError::UnknownCommand(line.trim().to_string()));
            };
            let moves = match rest.first() {
                Some(&"moves") => rest[1..].iter().map(|s| s.to_string()).collect(),
                Some(_) => return Err(EngineError::UnknownCommand(line.trim().to_string())),
                None => Vec::new(),
            };
            Ok(Command::Position { fen, moves })
        }
        Some("go") => Ok(Command::Go),
        Some("eval") => Ok(Command::Eval),
        Some("display") | Some("d") => Ok(Command::Display),
        Some("quit") => Ok(Command::Quit),
        _ => Err(EngineError::UnknownCommand(line.trim().to_string())),
    }
}

/// Resolve a move given in coordinate notation against the legal moves of
/// `board`.
pub fn parse_move(board: &Board, text: &str) -> EngineResult<ChessMove> {
    MoveGen::new_legal(board)
        .find(|m| m.to_string() == text)
        .ok_or_else(|| EngineError::IllegalMove(text.to_string()))
}

/// Command handler owning the engine and the current position.
pub struct Handler {
    engine: Engine,
    board: Board,
    quit: bool,
}

impl Handler {
    pub fn new(config: SearchConfig) -> Self {
        let board = Board::default();
        Handler {
            engine: Engine::with_config(config, board.clone()),
            board,
            quit: false,
        }
    }

    /// Run the blocking read-eval loop over stdin.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if let Err(err) = self.handle_line(&line) {
                println!("error: {}", err);
            }
            io::stdout().flush().ok();
            if self.quit {
                break;
            }
        }
    }

    /// Handle one input line.
    pub fn handle_line(&mut self, line: &str) -> EngineResult<()> {
        match parse_command(line)? {
            Command::Position { fen, moves } => self.cmd_position(fen.as_deref(), &moves),
            Command::Go => {
                self.cmd_go();
                Ok(())
            }
            Command::Eval => {
                println!("eval {}", eval::evaluate(&self.board));
                Ok(())
            }
            Command::Display => {
                println!("{}", self.board);
                Ok(())
            }
            Command::Quit => {
                self.quit = true;
                Ok(())
            }
        }
    }

    fn cmd_position(&mut self, fen: Option<&str>, moves: &[String]) -> EngineResult<()> {
        let mut board = match fen {
            Some(fen) => {
                Board::from_str(fen).map_err(|_| EngineError::InvalidFen(fen.to_string()))?
            }
            None => Board::default(),
        };
        for text in moves {
            let mv = parse_move(&board, text)?;
            board = board.make_move_new(mv);
        }
        self.engine.set_position(board.clone());
        self.board = board;
        Ok(())
    }

    fn cmd_go(&mut self) {
        match self.board.status() {
            BoardStatus::Checkmate => {
                println!("result checkmate");
                return;
            }
            BoardStatus::Stalemate => {
                println!("result stalemate");
                return;
            }
            BoardStatus::Ongoing => {}
        }

        match self.engine.best_move(self.board.clone()) {
            Some(mv) => {
                let pv: Vec<String> = self
                    .engine
                    .principal_variation()
                    .iter()
                    .map(|m| m.to_string())
                    .collect();
                println!(
                    "info depth {} eval {} pv {}",
                    self.engine.completed_depth(),
                    self.engine.best_eval(),
                    pv.join(" ")
                );
                println!("bestmove {}", mv);
            }
            None => println!("bestmove none"),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
}
