//! Search module.
//!
//! # Architecture
//! - `Search`: controller owning per-invocation state, the iterative
//!   deepening loop, and the parallel root split
//! - `negamax`: fail-hard alpha-beta recursion
//! - `qsearch`: quiescence extension at the horizon
//! - `ordering`: capture-first move ordering
//! - `tt`: shared transposition table
//!
//! Each depth iteration splits the root: the first move is searched on the
//! calling thread to establish a credible alpha, then one worker thread per
//! remaining root move races against the shared window. Workers are joined
//! before the iteration's result is committed, so the next depth always sees
//! a fully flushed table.

mod negamax;
mod ordering;
mod qsearch;
pub mod tt;

pub use tt::{Bound, TranspositionTable, TtEntry};

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use chess::{Board, ChessMove, MoveGen};

use crate::types::score::{is_mate_score, plies_to_mate, NEGATIVE_INFINITY};
use crate::types::NodeCount;

/// Iterations at or past this depth are skipped once the soft deadline has
/// been spent. Shallower iterations always run to completion.
const DEADLINE_MIN_DEPTH: i32 = 6;

/// Tunable search options, fixed at construction.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Target depth when `use_fixed_depth` is set.
    pub depth: i32,
    /// Deepen one ply at a time instead of searching the target depth cold.
    pub use_iterative_deepening: bool,
    /// Empty the transposition table at the start of every search.
    pub clear_tt_each_move: bool,
    /// Stop at `depth` instead of searching until the deadline.
    pub use_fixed_depth: bool,
    /// Wall-clock budget consulted between iterations.
    pub soft_deadline_ms: u64,
    /// Transposition table capacity.
    pub tt_entries: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: 4,
            use_iterative_deepening: true,
            clear_tt_each_move: true,
            use_fixed_depth: false,
            soft_deadline_ms: 3500,
            tt_entries: 1 << 20,
        }
    }
}

/// Node counters, shared by all root workers of a search.
#[derive(Debug, Default)]
pub struct SearchStats {
    pub(crate) nodes: AtomicU64,
    pub(crate) qnodes: AtomicU64,
    pub(crate) cutoffs: AtomicU64,
    pub(crate) tt_hits: AtomicU64,
}

impl SearchStats {
    fn reset(&self) {
        self.nodes.store(0, Ordering::Relaxed);
        self.qnodes.store(0, Ordering::Relaxed);
        self.cutoffs.store(0, Ordering::Relaxed);
        self.tt_hits.store(0, Ordering::Relaxed);
    }

    /// Read all counters at once.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            nodes: self.nodes.load(Ordering::Relaxed),
            qnodes: self.qnodes.load(Ordering::Relaxed),
            cutoffs: self.cutoffs.load(Ordering::Relaxed),
            tt_hits: self.tt_hits.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of the search counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatsSnapshot {
    pub nodes: NodeCount,
    pub qnodes: NodeCount,
    pub cutoffs: NodeCount,
    pub tt_hits: NodeCount,
}

/// Cancels a blocking search from another thread.
#[derive(Clone)]
pub struct StopHandle {
    abort: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.abort.store(true, Ordering::SeqCst);
    }
}

/// Search controller.
///
/// Owns the per-invocation state; the transposition table is shared with the
/// owning engine and with the root workers.
pub struct Search {
    config: SearchConfig,
    tt: Arc<TranspositionTable>,
    root: Board,
    best_move: Option<ChessMove>,
    best_eval: i32,
    completed_depth: i32,
    abort: Arc<AtomicBool>,
    stats: SearchStats,
}

impl Search {
    pub fn new(config: SearchConfig, tt: Arc<TranspositionTable>) -> Self {
        Search {
            config,
            tt,
            root: Board::default(),
            best_move: None,
            best_eval: 0,
            completed_depth: 0,
            abort: Arc::new(AtomicBool::new(false)),
            stats: SearchStats::default(),
        }
    }

    /// Search the given position, blocking until every depth is exhausted,
    /// the deadline passes, or the search is cancelled.
    ///
    /// The committed result always belongs to the last fully completed
    /// iteration; an interrupted iteration is discarded.
    pub fn start_search(&mut self, root: Board) {
        self.abort.store(false, Ordering::SeqCst);
        self.stats.reset();
        self.root = root;
        self.best_move = None;
        self.best_eval = 0;
        self.completed_depth = 0;
        if self.config.clear_tt_each_move {
            self.tt.clear();
        }

        let started = Instant::now();

        if self.config.use_iterative_deepening {
            let target_depth = if self.config.use_fixed_depth {
                self.config.depth
            } else {
                i32::MAX
            };

            for depth in 1..=target_depth {
                let elapsed = started.elapsed().as_millis() as u64;
                if depth >= DEADLINE_MIN_DEPTH && elapsed > self.config.soft_deadline_ms {
                    log::debug!(
                        "deadline spent after {} ms, answering from depth {}",
                        elapsed,
                        self.completed_depth
                    );
                    break;
                }

                let result = self.root_search(depth);
                if self.aborted() {
                    break;
                }
                let Some((mv, eval)) = result else {
                    break; // no legal moves at the root
                };
                self.commit(depth, mv, eval);
                log::debug!(
                    "depth {} in {} ms: {} eval {}",
                    depth,
                    started.elapsed().as_millis(),
                    mv,
                    eval
                );
            }
        } else {
            let result = self.root_search(self.config.depth);
            if !self.aborted() {
                if let Some((mv, eval)) = result {
                    self.commit(self.config.depth, mv, eval);
                }
            }
        }

        if self.best_move.is_none() {
            // Not even depth 1 completed; any legal move beats no answer.
            self.best_move = MoveGen::new_legal(&self.root).next();
        }

        self.announce_mate();
        let stats = self.stats.snapshot();
        log::debug!(
            "searched {} nodes, {} qnodes, {} cutoffs, {} table hits",
            stats.nodes,
            stats.qnodes,
            stats.cutoffs,
            stats.tt_hits
        );
    }

    /// Raise the abort flag; in-flight recursion observes it at the top of
    /// each call and unwinds.
    pub fn end_search(&self) {
        self.abort.store(true, Ordering::SeqCst);
    }

    /// Handle for cancelling this search from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            abort: Arc::clone(&self.abort),
        }
    }

    /// Best move and evaluation of the last completed iteration.
    pub fn search_result(&self) -> (Option<ChessMove>, i32) {
        (self.best_move, self.best_eval)
    }

    /// Depth of the last fully completed iteration.
    pub fn completed_depth(&self) -> i32 {
        self.completed_depth
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Expected line, reconstructed by walking stored moves from the root.
    pub fn principal_variation(&self) -> Vec<ChessMove> {
        let mut line = Vec::new();
        let mut board = self.root.clone();
        while (line.len() as i32) < self.completed_depth {
            let Some(mv) = self.tt.stored_move(board.get_hash()) else {
                break;
            };
            if !board.legal(mv) {
                break;
            }
            line.push(mv);
            board = board.make_move_new(mv);
        }
        line
    }

    fn aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    fn commit(&mut self, depth: i32, mv: ChessMove, eval: i32) {
        self.best_move = Some(mv);
        self.best_eval = eval;
        self.completed_depth = depth;
        // Seed the root slot so the next iteration and the variation walk
        // both start from this move.
        self.tt
            .store(self.root.get_hash(), depth as u8, 0, eval, Bound::Exact, Some(mv));
    }

    /// One depth iteration, split across the root moves.
    ///
    /// Move 0 runs on the calling thread and seeds the shared alpha before
    /// the sibling workers start; each worker reads whatever alpha has been
    /// committed so far (stale reads only widen its window, never narrow
    /// it). The provisional best triple is only touched under the mutex.
    fn root_search(&self, depth: i32) -> Option<(ChessMove, i32)> {
        let root = self.root.clone();
        let mut moves: Vec<ChessMove> = MoveGen::new_legal(&root).collect();
        if moves.is_empty() {
            return None;
        }
        ordering::order_moves(&root, &mut moves);

        let shared_alpha = AtomicI32::new(NEGATIVE_INFINITY);
        let provisional: Mutex<Option<(ChessMove, i32)>> = Mutex::new(None);

        let first = moves[0];
        let child = root.make_move_new(first);
        let eval = -negamax::search_moves(
            self,
            &child,
            depth - 1,
            1,
            NEGATIVE_INFINITY,
            -shared_alpha.load(Ordering::Relaxed),
        );
        {
            let mut best = provisional.lock().unwrap();
            *best = Some((first, eval));
            shared_alpha.store(eval, Ordering::Relaxed);
        }

        thread::scope(|scope| {
            for &mv in &moves[1..] {
                let shared_alpha = &shared_alpha;
                let provisional = &provisional;
                let root = &root;
                scope.spawn(move || {
                    let child = root.make_move_new(mv);
                    let alpha = shared_alpha.load(Ordering::Relaxed);
                    let eval = -negamax::search_moves(
                        self,
                        &child,
                        depth - 1,
                        1,
                        NEGATIVE_INFINITY,
                        -alpha,
                    );

                    let mut best = provisional.lock().unwrap();
                    if eval > shared_alpha.load(Ordering::Relaxed) {
                        shared_alpha.store(eval, Ordering::Relaxed);
                        *best = Some((mv, eval));
                    }
                });
            }
        });

        provisional.into_inner().unwrap()
    }

    fn announce_mate(&self) {
        if !is_mate_score(self.best_eval) {
            return;
        }
        let plies = plies_to_mate(self.best_eval);
        let moves = (plies + 1) / 2;
        let winner = if self.best_eval > 0 {
            self.root.side_to_move()
        } else {
            !self.root.side_to_move()
        };
        log::info!(
            "{:?} mates in {} move{}",
            winner,
            moves,
            if moves == 1 { "" } else { "s" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn fixed_depth_search(depth: i32) -> Search {
        let config = SearchConfig {
            depth,
            use_fixed_depth: true,
            ..Default::default()
        };
        let tt = Arc::new(TranspositionTable::new(config.tt_entries));
        Search::new(config, tt)
    }

    #[test]
    fn finds_a_legal_move_from_the_start_position() {
        let mut search = fixed_depth_search(2);
        search.start_search(Board::default());

        let (mv, _) = search.search_result();
        let mv = mv.expect("a move from the starting position");
        assert!(Board::default().legal(mv));
        assert_eq!(search.completed_depth(), 2);
        assert!(search.stats().snapshot().nodes > 0);
    }

    #[test]
    fn no_legal_moves_yields_no_result() {
        // Checkmate already on the board.
        let board = Board::from_str("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        let mut search = fixed_depth_search(3);
        search.start_search(board);
        assert_eq!(search.search_result().0, None);
        assert_eq!(search.completed_depth(), 0);
    }

    #[test]
    fn principal_variation_starts_with_the_best_move() {
        let mut search = fixed_depth_search(3);
        search.start_search(Board::default());

        let (mv, _) = search.search_result();
        let pv = search.principal_variation();
        assert_eq!(pv.first().copied(), mv);
    }

    #[test]
    fn single_shot_search_commits_its_depth() {
        let config = SearchConfig {
            depth: 2,
            use_iterative_deepening: false,
            use_fixed_depth: true,
            ..Default::default()
        };
        let tt = Arc::new(TranspositionTable::new(config.tt_entries));
        let mut search = Search::new(config, tt);
        search.start_search(Board::default());
        assert!(search.search_result().0.is_some());
        assert_eq!(search.completed_depth(), 2);
    }

    #[test]
    fn deeper_searches_keep_finding_mate_in_one() {
        // Iteration results stay committed across depths.
        let board = Board::from_str("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mut search = fixed_depth_search(4);
        search.start_search(board);
        let (mv, eval) = search.search_result();
        assert_eq!(mv, Some(ChessMove::new(chess::Square::A1, chess::Square::A8, None)));
        assert!(is_mate_score(eval));
        assert_eq!(plies_to_mate(eval), 1);
    }
}
