//! Position capability required for book lookups.
//!
//! The book never generates moves or hashes boards itself. Anything that can
//! produce a Polyglot key, name the piece on a square and list its legal
//! moves can be looked up in a book; `chess::Board` is provided out of the box.

use crate::types::{promotion_char, Board, Color, Key, Move, MoveGen, Piece, Square, ToShakmaty};
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::EnPassantMode;

/// A legal move as seen by the book
pub trait BookMove: Copy {
    fn source(&self) -> Square;
    fn dest(&self) -> Square;
    fn promotion(&self) -> Option<Piece>;

    /// UCI notation (e.g. "e2e4", "e7e8q")
    fn notation(&self) -> String {
        let mut s = format!("{}{}", self.source(), self.dest());
        if let Some(promo) = self.promotion() {
            s.push(promotion_char(promo));
        }
        s
    }
}

/// A position that can be looked up in a book
pub trait BookPosition {
    type Move: BookMove;

    /// Polyglot key of the position, `None` if it cannot be hashed
    fn polyglot_key(&self) -> Option<Key>;

    /// Piece and colour standing on `square`
    fn occupant(&self, square: Square) -> Option<(Piece, Color)>;

    /// Every legal move in the position
    fn legal_moves(&self) -> Vec<Self::Move>;
}

impl BookMove for Move {
    #[inline]
    fn source(&self) -> Square {
        self.get_source()
    }

    #[inline]
    fn dest(&self) -> Square {
        self.get_dest()
    }

    #[inline]
    fn promotion(&self) -> Option<Piece> {
        self.get_promotion()
    }
}

impl BookPosition for Board {
    type Move = Move;

    fn polyglot_key(&self) -> Option<Key> {
        polyglot_hash(self)
    }

    #[inline]
    fn occupant(&self, square: Square) -> Option<(Piece, Color)> {
        self.piece_on(square).zip(self.color_on(square))
    }

    fn legal_moves(&self) -> Vec<Move> {
        MoveGen::new_legal(self).collect()
    }
}

/// Compute the Polyglot Zobrist key of a board.
///
/// The `chess` crate's own hash is not Polyglot compatible, so the board is
/// handed to shakmaty, whose Zobrist64 values follow the Polyglot tables.
/// The en passant file only counts when a capture is actually possible.
pub fn polyglot_hash(board: &Board) -> Option<Key> {
    let pos = board.to_shakmaty()?;
    let hash: Zobrist64 = pos.zobrist_hash(EnPassantMode::Legal);
    Some(hash.0)
}
