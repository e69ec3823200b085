//! Engine facade.
//!
//! The only public surface callers need: construct with a position and a
//! configuration, hand in positions, receive moves. The engine owns the
//! transposition table and the search; the search shares the table with its
//! root workers.

use std::sync::Arc;

use chess::{Board, ChessMove};

use crate::search::{Search, SearchConfig, StatsSnapshot, StopHandle, TranspositionTable};

pub struct Engine {
    tt: Arc<TranspositionTable>,
    search: Search,
    position: Board,
}

impl Engine {
    /// Engine searching to a fixed depth.
    pub fn new(max_depth: i32, position: Board) -> Self {
        let config = SearchConfig {
            depth: max_depth,
            use_fixed_depth: true,
            ..Default::default()
        };
        Self::with_config(config, position)
    }

    pub fn with_config(config: SearchConfig, position: Board) -> Self {
        let tt = Arc::new(TranspositionTable::new(config.tt_entries));
        let search = Search::new(config, Arc::clone(&tt));
        Engine {
            tt,
            search,
            position,
        }
    }

    pub fn set_position(&mut self, position: Board) {
        self.position = position;
    }

    pub fn position(&self) -> &Board {
        &self.position
    }

    /// Search the position and return the best move found, or `None` when
    /// the side to move has no legal moves.
    ///
    /// Blocks until the search finishes deepening, hits its deadline, or is
    /// cancelled through [`Engine::stop_handle`].
    pub fn best_move(&mut self, position: Board) -> Option<ChessMove> {
        self.position = position;
        log::debug!("searching for {:?}", self.position.side_to_move());

        self.search.start_search(self.position.clone());
        let (best_move, best_eval) = self.search.search_result();

        match best_move {
            Some(mv) => log::info!(
                "best move {} eval {} (depth {})",
                mv,
                best_eval,
                self.search.completed_depth()
            ),
            None => log::info!("no legal moves"),
        }
        best_move
    }

    /// Evaluation committed alongside the last best move.
    pub fn best_eval(&self) -> i32 {
        self.search.search_result().1
    }

    /// Depth of the last completed iteration.
    pub fn completed_depth(&self) -> i32 {
        self.search.completed_depth()
    }

    /// Expected line from the last search.
    pub fn principal_variation(&self) -> Vec<ChessMove> {
        self.search.principal_variation()
    }

    /// Counters from the last search.
    pub fn search_stats(&self) -> StatsSnapshot {
        self.search.stats().snapshot()
    }

    /// Handle for cancelling a blocking [`Engine::best_move`] call.
    pub fn stop_handle(&self) -> StopHandle {
        self.search.stop_handle()
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.tt
    }
}
