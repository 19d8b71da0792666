//! Conversion traits between `chess` crate and `shakmaty` crate types.
//!
//! The `chess` crate drives move generation while `shakmaty` carries the
//! Polyglot Zobrist tables. Squares, pieces and colours map one to one; a
//! board is rebuilt square by square as a shakmaty `Setup`.

use chess::{Board, Color as ChessColor, Piece as ChessPiece, Square as ChessSquare, ALL_SQUARES};
use shakmaty::{
    Bitboard, CastlingMode, Chess, Color as ShakColor, FromSetup, Piece as ShakPiece, PositionError,
    Role, Setup, Square as ShakSquare,
};

/// Trait for converting chess crate types to shakmaty types.
pub trait ToShakmaty {
    type Output;
    fn to_shakmaty(self) -> Self::Output;
}

impl ToShakmaty for &Board {
    /// `None` when shakmaty refuses the setup (e.g. a malformed board built by hand).
    type Output = Option<Chess>;

    fn to_shakmaty(self) -> Option<Chess> {
        let mut setup = Setup::empty();

        for sq in ALL_SQUARES {
            if let (Some(piece), Some(color)) = (self.piece_on(sq), self.color_on(sq)) {
                let piece = ShakPiece {
                    color: color.to_shakmaty(),
                    role: piece.to_shakmaty(),
                };
                setup.board.set_piece_at(sq.to_shakmaty(), piece);
            }
        }

        let turn = self.side_to_move();
        setup.turn = turn.to_shakmaty();
        setup.castling_rights = castling_rooks(self);

        // The chess crate stores the capturable pawn, shakmaty wants the square behind it
        setup.ep_square = self
            .en_passant()
            .and_then(|pawn| match turn {
                ChessColor::White => pawn.up(),
                ChessColor::Black => pawn.down(),
            })
            .map(ToShakmaty::to_shakmaty);

        Chess::from_setup(setup, CastlingMode::Standard)
            .or_else(PositionError::ignore_too_much_material)
            .or_else(PositionError::ignore_impossible_check)
            .ok()
    }
}

/// Rook squares of the remaining castling rights, as shakmaty stores them
fn castling_rooks(board: &Board) -> Bitboard {
    let mut rooks = Bitboard::EMPTY;
    for (color, kingside, queenside) in [
        (ChessColor::White, ShakSquare::H1, ShakSquare::A1),
        (ChessColor::Black, ShakSquare::H8, ShakSquare::A8),
    ] {
        let rights = board.castle_rights(color);
        if rights.has_kingside() {
            rooks.add(kingside);
        }
        if rights.has_queenside() {
            rooks.add(queenside);
        }
    }
    rooks
}

impl ToShakmaty for ChessSquare {
    type Output = ShakSquare;

    #[inline]
    fn to_shakmaty(self) -> ShakSquare {
        // Both crates use A1=0, H8=63 ordering
        ShakSquare::new(self.to_index() as u32)
    }
}

impl ToShakmaty for ChessPiece {
    type Output = Role;

    #[inline]
    fn to_shakmaty(self) -> Role {
        match self {
            ChessPiece::Pawn => Role::Pawn,
            ChessPiece::Knight => Role::Knight,
            ChessPiece::Bishop => Role::Bishop,
            ChessPiece::Rook => Role::Rook,
            ChessPiece::Queen => Role::Queen,
            ChessPiece::King => Role::King,
        }
    }
}

impl ToShakmaty for ChessColor {
    type Output = ShakColor;

    #[inline]
    fn to_shakmaty(self) -> ShakColor {
        match self {
            ChessColor::White => ShakColor::White,
            ChessColor::Black => ShakColor::Black,
        }
    }
}
