//! Transposition table for caching search results.
//!
//! # Design
//! - Sharded concurrent map: root workers read and write without a global
//!   lock, and an entry's fields become visible together or not at all.
//! - Bounded: keys are reduced to a slot index modulo the configured
//!   capacity, so the table never grows past its construction size. Each
//!   entry carries its full 64-bit hash; a slot holding a different hash is
//!   treated as a miss.
//! - Always-replace on store.
//! - Mate scores are stored relative to the entry's own position and
//!   re-anchored to the probing node's ply on retrieval.

use std::sync::atomic::{AtomicBool, Ordering};

use chess::ChessMove;
use dashmap::DashMap;

use crate::types::score;
use crate::types::Hash;

/// What the stored value bounds at the window it was searched with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// Searched with a full window; the value is the node's true score.
    Exact,
    /// Fail-high: the value is a lower bound (score >= beta).
    Lower,
    /// Fail-low: the value is an upper bound (score <= alpha).
    Upper,
}

/// A single table entry.
#[derive(Clone, Copy, Debug)]
pub struct TtEntry {
    /// Full Zobrist hash of the position the entry was computed for.
    pub key: Hash,
    /// Score, mate-normalised for storage.
    pub value: i32,
    /// Depth of the search that produced the value.
    pub depth: u8,
    pub bound: Bound,
    /// Best or refutation move, if one was found.
    pub mv: Option<ChessMove>,
}

pub struct TranspositionTable {
    map: DashMap<Hash, TtEntry>,
    capacity: usize,
    enabled: AtomicBool,
}

impl TranspositionTable {
    /// Create a table bounded to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        log::debug!("transposition table sized to {} entries", capacity);
        TranspositionTable {
            // Allocation hint only; the slot bound enforces the capacity.
            map: DashMap::with_capacity(capacity.min(1 << 16)),
            capacity,
            enabled: AtomicBool::new(true),
        }
    }

    /// Slot index for a hash.
    #[inline]
    fn slot(&self, hash: Hash) -> Hash {
        hash % self.capacity as Hash
    }

    /// Empty the table.
    pub fn clear(&self) {
        self.map.clear();
    }

    /// Turn probing and storing off (and back on). A disabled table behaves
    /// as if every probe misses.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Record a search result for the position `hash`, overwriting whatever
    /// occupied its slot.
    pub fn store(
        &self,
        hash: Hash,
        depth: u8,
        ply_from_root: i32,
        value: i32,
        bound: Bound,
        mv: Option<ChessMove>,
    ) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        let entry = TtEntry {
            key: hash,
            value: score::to_tt(value, ply_from_root),
            depth,
            bound,
            mv,
        };
        self.map.insert(self.slot(hash), entry);
    }

    /// Look up a usable score for the position `hash` at the caller's window.
    ///
    /// Returns `None` unless the slot holds this exact hash, was searched to
    /// at least `depth`, and the stored bound permits a cutoff: an exact
    /// value always does, an upper bound only when it fails low against
    /// `alpha`, a lower bound only when it fails high against `beta`.
    pub fn probe(
        &self,
        hash: Hash,
        depth: u8,
        ply_from_root: i32,
        alpha: i32,
        beta: i32,
    ) -> Option<i32> {
        if !self.enabled.load(Ordering::Relaxed) {
            return None;
        }
        let entry = *self.map.get(&self.slot(hash))?;
        if entry.key != hash || entry.depth < depth {
            return None;
        }

        let value = score::from_tt(entry.value, ply_from_root);
        match entry.bound {
            Bound::Exact => Some(value),
            Bound::Upper if value <= alpha => Some(value),
            Bound::Lower if value >= beta => Some(value),
            _ => None,
        }
    }

    /// The move recorded for a position, for move ordering and variation
    /// reconstruction.
    pub fn stored_move(&self, hash: Hash) -> Option<ChessMove> {
        if !self.enabled.load(Ordering::Relaxed) {
            return None;
        }
        let entry = *self.map.get(&self.slot(hash))?;
        if entry.key != hash {
            return None;
        }
        entry.mv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::score::IMMEDIATE_MATE_SCORE;
    use chess::{ChessMove, Square};

    const HASH: Hash = 0x9D39_247E_3377_6D41;

    #[test]
    fn store_then_probe_exact() {
        let tt = TranspositionTable::new(1024);
        assert!(tt.probe(HASH, 4, 0, -100, 100).is_none());

        tt.store(HASH, 4, 0, 42, Bound::Exact, None);
        assert_eq!(tt.probe(HASH, 4, 0, -100, 100), Some(42));
        // An exact value is returned regardless of the window.
        assert_eq!(tt.probe(HASH, 4, 0, 50, 100), Some(42));
    }

    #[test]
    fn shallower_entries_do_not_satisfy_deeper_probes() {
        let tt = TranspositionTable::new(1024);
        tt.store(HASH, 3, 0, 42, Bound::Exact, None);
        assert!(tt.probe(HASH, 4, 0, -100, 100).is_none());
        assert_eq!(tt.probe(HASH, 2, 0, -100, 100), Some(42));
    }

    #[test]
    fn bound_gating_at_the_window() {
        let tt = TranspositionTable::new(1024);

        tt.store(HASH, 4, 0, 10, Bound::Upper, None);
        // Usable only as a fail-low: value <= alpha.
        assert_eq!(tt.probe(HASH, 4, 0, 10, 100), Some(10));
        assert!(tt.probe(HASH, 4, 0, 0, 100).is_none());

        tt.store(HASH, 4, 0, 90, Bound::Lower, None);
        // Usable only as a fail-high: value >= beta.
        assert_eq!(tt.probe(HASH, 4, 0, 0, 90), Some(90));
        assert!(tt.probe(HASH, 4, 0, 0, 100).is_none());
    }

    #[test]
    fn slot_collision_with_different_hash_is_a_miss() {
        let tt = TranspositionTable::new(64);
        let colliding = HASH + 64; // same slot, different key
        tt.store(HASH, 4, 0, 42, Bound::Exact, None);
        assert!(tt.probe(colliding, 1, 0, -100, 100).is_none());
        assert!(tt.stored_move(colliding).is_none());

        // The later store evicts the earlier one.
        tt.store(colliding, 4, 0, 7, Bound::Exact, None);
        assert!(tt.probe(HASH, 1, 0, -100, 100).is_none());
        assert_eq!(tt.probe(colliding, 4, 0, -100, 100), Some(7));
    }

    #[test]
    fn mate_scores_reanchor_to_the_probing_ply() {
        let tt = TranspositionTable::new(1024);
        // Mate in 3 plies seen at ply 5.
        let score = IMMEDIATE_MATE_SCORE - 8;
        tt.store(HASH, 6, 5, score, Bound::Exact, None);
        // The entry itself is mate in 3; probed at ply 1 that is mate in 4
        // from the new root.
        assert_eq!(
            tt.probe(HASH, 6, 1, -IMMEDIATE_MATE_SCORE, IMMEDIATE_MATE_SCORE),
            Some(IMMEDIATE_MATE_SCORE - 4)
        );
        // Probed at the ply it was stored from, it round-trips.
        assert_eq!(
            tt.probe(HASH, 6, 5, -IMMEDIATE_MATE_SCORE, IMMEDIATE_MATE_SCORE),
            Some(score)
        );
    }

    #[test]
    fn stored_move_survives_for_ordering() {
        let tt = TranspositionTable::new(1024);
        let mv = ChessMove::new(Square::E2, Square::E4, None);
        tt.store(HASH, 4, 0, 42, Bound::Exact, Some(mv));
        assert_eq!(tt.stored_move(HASH), Some(mv));
        assert_eq!(tt.stored_move(HASH ^ 1), None);
    }

    #[test]
    fn clear_empties_the_table() {
        let tt = TranspositionTable::new(1024);
        tt.store(HASH, 4, 0, 42, Bound::Exact, None);
        assert!(!tt.is_empty());
        tt.clear();
        assert!(tt.is_empty());
        assert!(tt.probe(HASH, 1, 0, -100, 100).is_none());
    }

    #[test]
    fn disabled_table_misses_everything() {
        let tt = TranspositionTable::new(1024);
        tt.set_enabled(false);
        tt.store(HASH, 4, 0, 42, Bound::Exact, None);
        assert!(tt.probe(HASH, 1, 0, -100, 100).is_none());
        tt.set_enabled(true);
        assert!(tt.probe(HASH, 1, 0, -100, 100).is_none());
    }
}
