//! Line-oriented command shell over a loaded book.
//!
//! Reads one command per line, replies on the output stream. The book is
//! borrowed immutably; load everything before starting the shell.

mod handler;
mod parser;

pub use handler::BookShell;
pub use parser::{parse_command, ShellCommand};

use crate::types::{Board, Move, MoveGen, Piece, Square};
use std::str::FromStr;

/// Errors reported back to the shell user; the loop keeps running
#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid fen: {0}")]
    InvalidFen(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// Parse a FEN string into a board
pub fn parse_fen(fen: &str) -> Result<Board, ShellError> {
    Board::from_str(fen.trim())
        .map_err(|e| ShellError::InvalidFen(format!("{} ({:?})", fen.trim(), e)))
}

/// Parse a move string (e.g., "e2e4", "e7e8q") into a Move for the given board
pub fn parse_move(board: &Board, move_str: &str) -> Option<Move> {
    let move_str = move_str.trim();
    if move_str.len() < 4 || !move_str.is_ascii() {
        return None;
    }

    let from = Square::from_str(&move_str[0..2]).ok()?;
    let to = Square::from_str(&move_str[2..4]).ok()?;

    let promo = match move_str.chars().nth(4) {
        None => None,
        Some('q' | 'Q') => Some(Piece::Queen),
        Some('r' | 'R') => Some(Piece::Rook),
        Some('b' | 'B') => Some(Piece::Bishop),
        Some('n' | 'N') => Some(Piece::Knight),
        Some(_) => return None,
    };

    MoveGen::new_legal(board)
        .find(|m| m.get_source() == from && m.get_dest() == to && m.get_promotion() == promo)
}

/// Set up a board from an optional FEN and a list of moves in UCI notation
pub fn setup_board<S: AsRef<str>>(fen: Option<&str>, moves: &[S]) -> Result<Board, ShellError> {
    let mut board = match fen {
        Some(f) => parse_fen(f)?,
        None => Board::default(),
    };

    for move_str in moves {
        let move_str = move_str.as_ref();
        let m = parse_move(&board, move_str)
            .ok_or_else(|| ShellError::IllegalMove(move_str.to_string()))?;
        board = board.make_move_new(m);
    }

    Ok(board)
}
