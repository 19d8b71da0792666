//! Core types for the opening book.
//!
//! This module provides the types shared by the book reader and its adapters:
//! - `chess` crate types (squares, pieces, legal move generation)
//! - `shakmaty` conversion for Polyglot key derivation
//!
//! # Design Principles
//! - Re-export chess crate types as the canonical source for board/move types
//! - Provide conversion traits to bridge with shakmaty types
//! - Define book-specific aliases (Key, Weight) for the record fields

mod convert;

pub use convert::ToShakmaty;

// Re-export chess crate types as canonical types
pub use chess::{
    Board,
    ChessMove as Move,
    Square,
    Piece,
    Color,
    File,
    Rank,
    MoveGen,
};

/// Polyglot position key (Zobrist hash as defined by the Polyglot format)
pub type Key = u64;

/// Raw weight stored in a book record
pub type Weight = u16;

/// Promotion pieces in Polyglot code order (code 0 is "no promotion")
pub const PROMOTION_PIECES: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

/// Get the lowercase UCI suffix for a promotion piece
#[inline]
pub const fn promotion_char(piece: Piece) -> char {
    match piece {
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
        Piece::Pawn => 'p',
    }
}
