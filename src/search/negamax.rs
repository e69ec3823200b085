//! Negamax alpha-beta recursion.
//!
//! Fail-hard: every return value is clamped into the caller's window. Each
//! recursive frame works on its own copy of the position produced by
//! clone-and-apply, so no unmake bookkeeping is needed.

use std::sync::atomic::Ordering;

use chess::{Board, ChessMove, MoveGen, EMPTY};

use super::{ordering, qsearch, tt::Bound, Search};
use crate::types::score::{mated_in, DRAW_SCORE};

pub(super) fn search_moves(
    search: &Search,
    board: &Board,
    depth: i32,
    ply_from_root: i32,
    mut alpha: i32,
    beta: i32,
) -> i32 {
    if search.aborted() {
        // The caller discards this iteration, so the value is irrelevant.
        return 0;
    }

    if depth <= 0 {
        return qsearch::quiescence(search, board, alpha, beta);
    }

    let hash = board.get_hash();
    if let Some(value) = search
        .tt
        .probe(hash, depth as u8, ply_from_root, alpha, beta)
    {
        search.stats.tt_hits.fetch_add(1, Ordering::Relaxed);
        return value;
    }

    let mut moves: Vec<ChessMove> = MoveGen::new_legal(board).collect();
    if moves.is_empty() {
        return if *board.checkers() != EMPTY {
            mated_in(ply_from_root)
        } else {
            DRAW_SCORE
        };
    }
    ordering::order_moves(board, &mut moves);

    let mut bound = Bound::Upper;
    let mut best_move: Option<ChessMove> = None;

    for mv in moves {
        let child = board.make_move_new(mv);
        let eval = -search_moves(search, &child, depth - 1, ply_from_root + 1, -beta, -alpha);
        search.stats.nodes.fetch_add(1, Ordering::Relaxed);

        if eval >= beta {
            search.stats.cutoffs.fetch_add(1, Ordering::Relaxed);
            search
                .tt
                .store(hash, depth as u8, ply_from_root, beta, Bound::Lower, Some(mv));
            return beta;
        }
        if eval > alpha {
            alpha = eval;
            bound = Bound::Exact;
            best_move = Some(mv);
        }
    }

    search
        .tt
        .store(hash, depth as u8, ply_from_root, alpha, bound, best_move);
    alpha
}
