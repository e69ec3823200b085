//! Score domain for search.
//!
//! Scores are plain `i32` centipawns from the side-to-move's perspective.
//! Mate scores encode distance-to-mate: a mate delivered `n` plies from the
//! current node scores `IMMEDIATE_MATE_SCORE - n`, and being mated in `n`
//! plies scores `-IMMEDIATE_MATE_SCORE + n`.
//!
//! The predicates and the transposition-table normalisation live here as free
//! functions so that both the search and the table can use them without
//! depending on each other.

/// Score for a checkmate delivered on this move.
pub const IMMEDIATE_MATE_SCORE: i32 = 100_000;

/// Upper bound for alpha-beta windows. Strictly greater than any mate score.
pub const POSITIVE_INFINITY: i32 = 9_999_999;

/// Lower bound for alpha-beta windows.
pub const NEGATIVE_INFINITY: i32 = -POSITIVE_INFINITY;

/// Score returned for stalemate and other drawn terminal nodes.
pub const DRAW_SCORE: i32 = 0;

/// Longest mate distance (in plies) the mate encoding can represent.
pub const MAX_MATE_DEPTH: i32 = 100;

/// Check whether a score encodes a forced mate (for either side).
#[inline]
pub const fn is_mate_score(score: i32) -> bool {
    score.abs() > IMMEDIATE_MATE_SCORE - MAX_MATE_DEPTH
}

/// Number of plies until mate encoded in a mate score.
#[inline]
pub const fn plies_to_mate(score: i32) -> i32 {
    IMMEDIATE_MATE_SCORE - score.abs()
}

/// Terminal score for the side to move being checkmated `ply` plies from the
/// root.
#[inline]
pub const fn mated_in(ply: i32) -> i32 {
    -IMMEDIATE_MATE_SCORE + ply
}

/// Adjust a mate score for storage in the transposition table.
///
/// Stored mate scores are relative to the entry's own position rather than to
/// the root of the search that produced them, so an entry survives being
/// found again at a different ply of a later search.
#[inline]
pub const fn to_tt(score: i32, ply: i32) -> i32 {
    if is_mate_score(score) {
        score.signum() * (score.abs() + ply)
    } else {
        score
    }
}

/// Re-anchor a stored mate score to the probing node's ply.
#[inline]
pub const fn from_tt(score: i32, ply: i32) -> i32 {
    if is_mate_score(score) {
        score.signum() * (score.abs() - ply)
    } else {
        score
    }
}
