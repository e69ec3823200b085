//! Static evaluation.
//!
//! Material, piece placement, and an endgame mop-up term, scored for white
//! and black independently and returned from the side-to-move's perspective.
//! Pure function of the position: no I/O, no caching, total over legal
//! positions.

pub mod pst;

use chess::{Board, Color, Piece};

use crate::tables::GEOMETRY;
use crate::types::{piece_value, Value, BISHOP_VALUE, KNIGHT_VALUE, PAWN_VALUE, ROOK_VALUE};

/// Non-pawn material at which the endgame phase begins to count.
pub const ENDGAME_MATERIAL_START: Value = ROOK_VALUE * 2 + BISHOP_VALUE + KNIGHT_VALUE;

/// Evaluate the position from the side-to-move's perspective.
pub fn evaluate(board: &Board) -> i32 {
    let white_material = count_material(board, Color::White);
    let black_material = count_material(board, Color::Black);

    let white_pawns = piece_count(board, Piece::Pawn, Color::White) * PAWN_VALUE;
    let black_pawns = piece_count(board, Piece::Pawn, Color::Black) * PAWN_VALUE;
    let white_endgame_weight = endgame_phase_weight(white_material - white_pawns);
    let black_endgame_weight = endgame_phase_weight(black_material - black_pawns);

    let mut white_eval = white_material;
    let mut black_eval = black_material;

    white_eval += mop_up(
        board,
        Color::White,
        white_material,
        black_material,
        black_endgame_weight,
    );
    black_eval += mop_up(
        board,
        Color::Black,
        black_material,
        white_material,
        white_endgame_weight,
    );

    white_eval += piece_square_score(board, Color::White, black_endgame_weight);
    black_eval += piece_square_score(board, Color::Black, white_endgame_weight);

    let perspective = if board.side_to_move() == Color::White {
        1
    } else {
        -1
    };
    (white_eval - black_eval) * perspective
}

/// Endgame phase as a weight in [0, 1]: 0 until the opponent sheds material,
/// 1 once only pawns remain.
#[inline]
fn endgame_phase_weight(material_without_pawns: Value) -> f32 {
    1.0 - (material_without_pawns as f32 / ENDGAME_MATERIAL_START as f32).min(1.0)
}

#[inline]
fn piece_count(board: &Board, piece: Piece, colour: Color) -> Value {
    (board.pieces(piece) & board.color_combined(colour)).popcnt() as Value
}

fn count_material(board: &Board, colour: Color) -> Value {
    let mut material = 0;
    for piece in [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
    ] {
        material += piece_count(board, piece, colour) * piece_value(piece);
    }
    material
}

/// Reward cornering the opposing king and closing in with our own once we are
/// clearly winning and the opponent is in the endgame.
fn mop_up(
    board: &Board,
    us: Color,
    friendly_material: Value,
    opponent_material: Value,
    endgame_weight: f32,
) -> i32 {
    if friendly_material <= opponent_material + PAWN_VALUE * 2 || endgame_weight <= 0.0 {
        return 0;
    }

    let our_king = board.king_square(us);
    let their_king = board.king_square(!us);

    let mut score = GEOMETRY.centre_manhattan_distance[their_king.to_index()] * 10;
    score += (14 - GEOMETRY.rook_moves_between(our_king, their_king)) * 4;

    (score as f32 * endgame_weight) as i32
}

fn piece_square_score(board: &Board, colour: Color, opponent_endgame_weight: f32) -> i32 {
    let is_white = colour == Color::White;
    let mut value = 0;

    for (piece, table) in [
        (Piece::Pawn, &pst::PAWNS),
        (Piece::Knight, &pst::KNIGHTS),
        (Piece::Bishop, &pst::BISHOPS),
        (Piece::Rook, &pst::ROOKS),
        (Piece::Queen, &pst::QUEENS),
    ] {
        for square in board.pieces(piece) & board.color_combined(colour) {
            value += pst::read(table, square, is_white);
        }
    }

    // The king's middle-game placement stops mattering as the opponent runs
    // out of attacking material.
    let king_early = pst::read(&pst::KING_MIDDLE, board.king_square(colour), is_white);
    value += (king_early as f32 * (1.0 - opponent_endgame_weight)) as i32;

    value
}
