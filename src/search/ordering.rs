//! Move ordering.
//!
//! Good ordering is what makes alpha-beta prune: captures are tried before
//! quiet moves, and the most valuable victim first. The sort is stable, so
//! the generator's natural order is the secondary key.

use chess::{Board, ChessMove};

use crate::types::{piece_value, Value};

/// Value of the piece a move captures, zero for quiet moves.
#[inline]
pub fn captured_value(board: &Board, mv: ChessMove) -> Value {
    board
        .piece_on(mv.get_dest())
        .map(piece_value)
        .unwrap_or(0)
}

/// Sort moves in place: captures first, higher captured value first.
pub fn order_moves(board: &Board, moves: &mut [ChessMove]) {
    moves.sort_by_key(|&mv| {
        let rank = if board.piece_on(mv.get_dest()).is_some() {
            1 + captured_value(board, mv)
        } else {
            0
        };
        std::cmp::Reverse(rank)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{Board, MoveGen};
    use std::str::FromStr;

    #[test]
    fn captures_come_before_quiet_moves() {
        // White can capture the d5 pawn with the e4 pawn or play quietly.
        let board =
            Board::from_str("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let mut moves: Vec<ChessMove> = MoveGen::new_legal(&board).collect();
        order_moves(&board, &mut moves);

        assert!(board.piece_on(moves[0].get_dest()).is_some());
        let first_quiet = moves
            .iter()
            .position(|&m| board.piece_on(m.get_dest()).is_none())
            .unwrap();
        assert!(moves[first_quiet..]
            .iter()
            .all(|&m| board.piece_on(m.get_dest()).is_none()));
    }

    #[test]
    fn bigger_victims_sort_first() {
        // The b5 knight can take the a7 rook or the c7 pawn.
        let board = Board::from_str("r3k3/r1p5/8/1N6/8/8/8/4K3 w - - 0 1").unwrap();
        let mut moves: Vec<ChessMove> = MoveGen::new_legal(&board).collect();
        order_moves(&board, &mut moves);

        assert_eq!(captured_value(&board, moves[0]), 500);
        assert_eq!(captured_value(&board, moves[1]), 100);
    }

    #[test]
    fn stable_sort_keeps_generator_order_among_quiets() {
        let board = Board::default();
        let generated: Vec<ChessMove> = MoveGen::new_legal(&board).collect();
        let mut ordered = generated.clone();
        order_moves(&board, &mut ordered);
        // No captures exist in the starting position, so nothing moves.
        assert_eq!(generated, ordered);
    }
}
