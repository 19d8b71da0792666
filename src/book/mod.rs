//! Opening book support.
//!
//! This module reads Polyglot format opening books (.bin files) into memory
//! and answers "which moves does the book know here, and how strong are they".
//!
//! # Usage
//!
//! ```ignore
//! use polybook::book::PolyglotBook;
//!
//! let mut book = PolyglotBook::load("Human.bin")?;
//! book.ingest_file("Performance.bin")?; // merged into the same book
//! let board = Board::default();
//!
//! for wm in book.lookup_moves(&board) {
//!     println!("{} {}", wm.mv, wm.weight);
//! }
//! ```

mod error;
mod index;
mod lookup;
mod position;
mod record;

pub use error::{BookError, BookResult};
pub use index::PolyglotBook;
pub use lookup::WeightedMove;
pub use position::{polyglot_hash, BookMove, BookPosition};
pub use record::{
    castling_destination, decode_move, encode_move, DecodedMove, RawEntry, Record, RecordReader,
    ENTRY_SIZE,
};
