//! Probing a book for a live position.
//!
//! Stored move codes only name squares, so each candidate entry is matched
//! against the position's legal moves to recover a playable move. Entries
//! that match nothing (hash collisions, stale books) are dropped.

use super::index::PolyglotBook;
use super::position::{BookMove, BookPosition};
use super::record::RawEntry;
use rand::Rng;
use std::collections::BTreeMap;

/// A legal move together with its book weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedMove<M> {
    pub mv: M,
    pub weight: u32,
}

impl PolyglotBook {
    /// Get the book moves for a position, heaviest first.
    ///
    /// `legal_moves` must be the complete legal move list of `position`. An
    /// empty result means the book has nothing to suggest, whether the
    /// position is missing or none of its entries are legal here.
    pub fn lookup<P: BookPosition>(
        &self,
        position: &P,
        legal_moves: &[P::Move],
    ) -> Vec<WeightedMove<P::Move>> {
        let Some(key) = position.polyglot_key() else {
            log::debug!("position has no polyglot key, skipping book");
            return Vec::new();
        };

        let entries = self.entries(key);
        if entries.is_empty() {
            return Vec::new();
        }

        let mut moves = match_entries(entries, position, legal_moves);
        // Stable: equal weights keep book order
        moves.sort_by(|a, b| b.weight.cmp(&a.weight));
        moves
    }

    /// Same as [`PolyglotBook::lookup`], generating the legal moves from the position
    pub fn lookup_moves<P: BookPosition>(&self, position: &P) -> Vec<WeightedMove<P::Move>> {
        self.lookup(position, &position.legal_moves())
    }

    /// Book moves keyed by UCI notation
    pub fn lookup_map<P: BookPosition>(&self, position: &P) -> BTreeMap<String, u32> {
        self.lookup_moves(position)
            .into_iter()
            .map(|wm| (wm.mv.notation(), wm.weight))
            .collect()
    }

    /// Get the best move (highest weight) from the book
    pub fn best_move<P: BookPosition>(&self, position: &P) -> Option<P::Move> {
        self.lookup_moves(position).first().map(|wm| wm.mv)
    }

    /// Get a weighted random move from the book for a position.
    ///
    /// Each move is drawn with probability proportional to its weight. If all
    /// weights are zero the heaviest-ranked move (the first) is returned.
    pub fn pick_move<P: BookPosition, R: Rng + ?Sized>(
        &self,
        position: &P,
        rng: &mut R,
    ) -> Option<P::Move> {
        let moves = self.lookup_moves(position);
        let first = moves.first()?.mv;

        let total: u64 = moves.iter().map(|wm| wm.weight as u64).sum();
        if total == 0 {
            return Some(first);
        }

        let random = rng.random_range(0..total);
        let mut cumulative = 0u64;
        for wm in &moves {
            cumulative += wm.weight as u64;
            if random < cumulative {
                return Some(wm.mv);
            }
        }
        Some(first)
    }
}

/// Resolve raw entries into legal moves, in entry order
fn match_entries<P: BookPosition>(
    entries: &[RawEntry],
    position: &P,
    legal_moves: &[P::Move],
) -> Vec<WeightedMove<P::Move>> {
    let mut matched = Vec::with_capacity(entries.len());

    for entry in entries {
        let decoded = entry.decode();
        let decoded = decoded.resolve_castling(position.occupant(decoded.from));

        let found = legal_moves.iter().find(|m| {
            m.source() == decoded.from
                && m.dest() == decoded.to
                && m.promotion() == decoded.promotion
        });

        match found {
            Some(&mv) => matched.push(WeightedMove {
                mv,
                weight: entry.weight as u32,
            }),
            None => log::trace!(
                "book move {}{} (raw {:#06x}) is not legal here, dropped",
                decoded.from,
                decoded.to,
                entry.raw_move
            ),
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::encode_move;
    use crate::book::fixtures::book_image;
    use crate::types::{Board, Color, Key, Move, Piece, Square};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::str::FromStr;

    const LASKER_TRAP: &str = "rnbqk1nr/ppp2ppp/8/4P3/1bPp4/4P3/PP1B1PPP/RN1QKBNR b KQkq - 0 1";

    fn board(fen: &str) -> Board {
        Board::from_str(fen).expect("valid fen")
    }

    fn key(board: &Board) -> Key {
        board.polyglot_key().expect("hashable")
    }

    fn book(records: &[(Key, u16, u16)]) -> PolyglotBook {
        PolyglotBook::from_bytes(&book_image(records)).expect("aligned")
    }

    fn notations<M: BookMove>(moves: &[WeightedMove<M>]) -> Vec<(String, u32)> {
        moves.iter().map(|wm| (wm.mv.notation(), wm.weight)).collect()
    }

    #[test]
    fn test_lookup_pawn_capture() {
        let pos = board(LASKER_TRAP);
        let book = book(&[(key(&pos), encode_move(Square::D4, Square::E3, None), 2)]);

        let moves = book.lookup(&pos, &pos.legal_moves());
        assert_eq!(notations(&moves), vec![("d4e3".to_string(), 2)]);
        assert_eq!(moves[0].mv, Move::new(Square::D4, Square::E3, None));
    }

    #[test]
    fn test_lookup_en_passant_capture() {
        // 1.e4 d5 2.e5 f5, book answer exf6 e.p.
        let pos = board("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert_eq!(key(&pos), 0x22a48b5a8e47ff78);
        let book = book(&[(key(&pos), encode_move(Square::E5, Square::F6, None), 6)]);

        let moves = book.lookup_moves(&pos);
        assert_eq!(notations(&moves), vec![("e5f6".to_string(), 6)]);
    }

    #[test]
    fn test_lookup_ranks_by_weight() {
        let pos = Board::default();
        let book = book(&[
            (key(&pos), encode_move(Square::D2, Square::D4, None), 5),
            (key(&pos), encode_move(Square::E2, Square::E4, None), 10),
        ]);

        let moves = book.lookup_moves(&pos);
        assert_eq!(
            notations(&moves),
            vec![("e2e4".to_string(), 10), ("d2d4".to_string(), 5)]
        );
    }

    #[test]
    fn test_equal_weights_keep_book_order() {
        let pos = Board::default();
        let book = book(&[
            (key(&pos), encode_move(Square::G1, Square::F3, None), 7),
            (key(&pos), encode_move(Square::C2, Square::C4, None), 7),
            (key(&pos), encode_move(Square::B1, Square::C3, None), 7),
        ]);

        let order: Vec<String> =
            book.lookup_moves(&pos).iter().map(|wm| wm.mv.notation()).collect();
        assert_eq!(order, vec!["g1f3", "c2c4", "b1c3"]);
    }

    #[test]
    fn test_unknown_position_is_empty() {
        let book = book(&[(1, encode_move(Square::E2, Square::E4, None), 10)]);
        assert!(book.lookup_moves(&Board::default()).is_empty());
        assert!(PolyglotBook::new().lookup_moves(&Board::default()).is_empty());
    }

    #[test]
    fn test_illegal_entries_are_dropped() {
        let pos = Board::default();
        let book = book(&[
            (key(&pos), encode_move(Square::E2, Square::E5, None), 40),
            (key(&pos), encode_move(Square::E2, Square::E4, None), 1),
        ]);

        assert_eq!(notations(&book.lookup_moves(&pos)), vec![("e2e4".to_string(), 1)]);
    }

    #[test]
    fn test_lookup_uses_given_legal_moves() {
        let pos = Board::default();
        let book = book(&[(key(&pos), encode_move(Square::E2, Square::E4, None), 3)]);

        assert!(book.lookup(&pos, &[]).is_empty());
        let only_e4 = [Move::new(Square::E2, Square::E4, None)];
        assert_eq!(book.lookup(&pos, &only_e4).len(), 1);
    }

    #[test]
    fn test_white_castling_resolved() {
        let pos = board("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let book = book(&[
            (key(&pos), encode_move(Square::E1, Square::H1, None), 8),
            (key(&pos), encode_move(Square::E1, Square::A1, None), 4),
        ]);

        let moves = book.lookup_moves(&pos);
        assert_eq!(
            notations(&moves),
            vec![("e1g1".to_string(), 8), ("e1c1".to_string(), 4)]
        );
    }

    #[test]
    fn test_black_castling_resolved() {
        let pos = board("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1");
        let book = book(&[
            (key(&pos), encode_move(Square::E8, Square::A8, None), 6),
            (key(&pos), encode_move(Square::E8, Square::H8, None), 3),
        ]);

        assert_eq!(
            notations(&book.lookup_moves(&pos)),
            vec![("e8c8".to_string(), 6), ("e8g8".to_string(), 3)]
        );
    }

    #[test]
    fn test_king_step_is_not_castling() {
        // King on e1 with a plain f1 step; no rook-square remap should occur
        let pos = board("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let book = book(&[(key(&pos), encode_move(Square::E1, Square::F1, None), 2)]);
        assert_eq!(notations(&book.lookup_moves(&pos)), vec![("e1f1".to_string(), 2)]);
    }

    #[test]
    fn test_promotion_must_match() {
        let pos = board("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let book = book(&[
            (key(&pos), encode_move(Square::A7, Square::A8, Some(Piece::Knight)), 3),
            (key(&pos), encode_move(Square::A7, Square::A8, Some(Piece::Queen)), 9),
            // Without a promotion piece the pawn push matches nothing
            (key(&pos), encode_move(Square::A7, Square::A8, None), 20),
        ]);

        let moves = book.lookup_moves(&pos);
        assert_eq!(
            notations(&moves),
            vec![("a7a8q".to_string(), 9), ("a7a8n".to_string(), 3)]
        );
        assert_eq!(moves[0].mv.get_promotion(), Some(Piece::Queen));
    }

    #[test]
    fn test_lookup_map() {
        let pos = Board::default();
        let book = book(&[
            (key(&pos), encode_move(Square::E2, Square::E4, None), 10),
            (key(&pos), encode_move(Square::D2, Square::D4, None), 5),
        ]);

        let map = book.lookup_map(&pos);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("e2e4"), Some(&10));
        assert_eq!(map.get("d2d4"), Some(&5));
    }

    #[test]
    fn test_best_move() {
        let pos = Board::default();
        let book = book(&[
            (key(&pos), encode_move(Square::D2, Square::D4, None), 5),
            (key(&pos), encode_move(Square::E2, Square::E4, None), 10),
        ]);

        assert_eq!(book.best_move(&pos), Some(Move::new(Square::E2, Square::E4, None)));
        assert_eq!(PolyglotBook::new().best_move(&pos), None);
    }

    #[test]
    fn test_pick_move_follows_weights() {
        let pos = Board::default();
        let book = book(&[
            (key(&pos), encode_move(Square::E2, Square::E4, None), 1),
            (key(&pos), encode_move(Square::D2, Square::D4, None), 0),
        ]);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            // d2d4 has no weight and can never be drawn
            assert_eq!(
                book.pick_move(&pos, &mut rng),
                Some(Move::new(Square::E2, Square::E4, None))
            );
        }
    }

    #[test]
    fn test_pick_move_zero_weights_falls_back_to_first() {
        let pos = Board::default();
        let book = book(&[
            (key(&pos), encode_move(Square::G1, Square::F3, None), 0),
            (key(&pos), encode_move(Square::E2, Square::E4, None), 0),
        ]);

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(book.pick_move(&pos, &mut rng), Some(Move::new(Square::G1, Square::F3, None)));
        assert_eq!(PolyglotBook::new().pick_move(&pos, &mut rng), None);
    }

    #[test]
    fn test_pick_move_reaches_every_weighted_move() {
        let pos = Board::default();
        let book = book(&[
            (key(&pos), encode_move(Square::E2, Square::E4, None), 50),
            (key(&pos), encode_move(Square::D2, Square::D4, None), 50),
        ]);

        let mut rng = StdRng::seed_from_u64(42);
        let picks: Vec<Move> = (0..200).filter_map(|_| book.pick_move(&pos, &mut rng)).collect();
        assert!(picks.contains(&Move::new(Square::E2, Square::E4, None)));
        assert!(picks.contains(&Move::new(Square::D2, Square::D4, None)));
    }

    #[test]
    fn test_concurrent_lookups_share_book() {
        let pos = Board::default();
        let book = book(&[
            (key(&pos), encode_move(Square::E2, Square::E4, None), 10),
            (key(&pos), encode_move(Square::D2, Square::D4, None), 5),
        ]);

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| notations(&book.lookup_moves(&Board::default()))))
                .collect();
            for handle in handles {
                let moves = handle.join().expect("lookup thread");
                assert_eq!(moves, vec![("e2e4".to_string(), 10), ("d2d4".to_string(), 5)]);
            }
        });
    }

    #[test]
    fn test_castling_occupant_comes_from_position() {
        // Same e1h1 code, but a rook stands on e1: h1 is a real rook destination
        let pos = board("7k/8/8/8/8/8/8/K3R3 w - - 0 1");
        let book = book(&[(key(&pos), encode_move(Square::E1, Square::H1, None), 1)]);
        let moves = book.lookup_moves(&pos);
        assert_eq!(notations(&moves), vec![("e1h1".to_string(), 1)]);
        assert_eq!(pos.occupant(Square::E1), Some((Piece::Rook, Color::White)));
    }
}
