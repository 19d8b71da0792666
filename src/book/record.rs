//! Polyglot record decoding.
//!
//! A book is a flat run of 16-byte big-endian records with no header,
//! footer or padding:
//!
//! | offset | size | field              |
//! |--------|------|--------------------|
//! | 0      | 8    | position key       |
//! | 8      | 2    | move code          |
//! | 10     | 2    | weight             |
//! | 12     | 4    | learn counter      |

use super::error::{BookError, BookResult};
use crate::types::{Color, File, Key, Piece, Rank, Square, Weight, PROMOTION_PIECES};
use binread::{BinRead, BinResult};
use std::io::{self, Cursor, Read};

/// Size of a single Polyglot record in bytes
pub const ENTRY_SIZE: usize = 16;

/// One decoded 16-byte record, key included
#[derive(BinRead, Debug, Clone, Copy, PartialEq, Eq)]
#[br(big)]
pub struct Record {
    /// Polyglot key the move belongs to
    pub key: Key,
    /// Packed from/to/promotion, see [`decode_move`]
    pub raw_move: u16,
    pub weight: Weight,
    /// Carried through untouched; lookups ignore it
    pub learn: u32,
}

impl Record {
    /// Parse a record from raw bytes (big-endian format)
    pub fn from_bytes(bytes: &[u8; ENTRY_SIZE]) -> BinResult<Self> {
        Self::read(&mut Cursor::new(&bytes[..]))
    }

    /// The record without its key, as stored in the index
    #[inline]
    pub fn entry(&self) -> RawEntry {
        RawEntry {
            raw_move: self.raw_move,
            weight: self.weight,
            learn: self.learn,
        }
    }
}

/// A book entry as stored under its key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry {
    pub raw_move: u16,
    pub weight: Weight,
    pub learn: u32,
}

impl RawEntry {
    /// Unpack the move code into squares and promotion
    #[inline]
    pub fn decode(&self) -> DecodedMove {
        decode_move(self.raw_move)
    }
}

/// Origin, destination and promotion unpacked from a move code.
///
/// The destination is the raw book destination; castling still uses the
/// king-takes-rook form until [`DecodedMove::resolve_castling`] is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl DecodedMove {
    /// Rewrite a king-takes-rook castling move to the king's real destination.
    ///
    /// `occupant` is the piece standing on `from` in the position being looked up.
    #[inline]
    pub fn resolve_castling(self, occupant: Option<(Piece, Color)>) -> Self {
        Self {
            to: castling_destination(self.from, self.to, occupant),
            ..self
        }
    }
}

/// Decode a raw move code.
///
/// A raw move is a bit field (bit 0 is the least significant bit):
///
/// | bits   | meaning         |
/// |--------|-----------------|
/// | 0-2    | to file         |
/// | 3-5    | to rank         |
/// | 6-8    | from file       |
/// | 9-11   | from rank       |
/// | 12-14  | promotion piece |
pub fn decode_move(raw_move: u16) -> DecodedMove {
    let to_file = (raw_move & 0x7) as usize;
    let to_rank = ((raw_move >> 3) & 0x7) as usize;
    let from_file = ((raw_move >> 6) & 0x7) as usize;
    let from_rank = ((raw_move >> 9) & 0x7) as usize;
    let promo = ((raw_move >> 12) & 0x7) as usize;

    let from = Square::make_square(Rank::from_index(from_rank), File::from_index(from_file));
    let to = Square::make_square(Rank::from_index(to_rank), File::from_index(to_file));

    DecodedMove {
        from,
        to,
        promotion: promotion_from_code(promo),
    }
}

/// Promotion: 0=none, 1=knight, 2=bishop, 3=rook, 4=queen
fn promotion_from_code(code: usize) -> Option<Piece> {
    match code {
        0 => None,
        1..=4 => Some(PROMOTION_PIECES[code - 1]),
        _ => {
            // No known generator writes 5-7; read them as a plain move.
            log::trace!("promotion code {} read as no promotion", code);
            None
        }
    }
}

/// Pack squares and promotion back into a move code (inverse of [`decode_move`])
pub fn encode_move(from: Square, to: Square, promotion: Option<Piece>) -> u16 {
    let promo = match promotion {
        Some(piece) => PROMOTION_PIECES
            .iter()
            .position(|&p| p == piece)
            .map_or(0, |i| i + 1),
        None => 0,
    } as u16;

    (to.get_file().to_index() as u16)
        | (to.get_rank().to_index() as u16) << 3
        | (from.get_file().to_index() as u16) << 6
        | (from.get_rank().to_index() as u16) << 9
        | promo << 12
}

/// Castling as stored in books: (king square, rook square, king colour, real destination)
const CASTLING_MOVES: [(Square, Square, Color, Square); 4] = [
    (Square::E1, Square::H1, Color::White, Square::G1),
    (Square::E1, Square::A1, Color::White, Square::C1),
    (Square::E8, Square::H8, Color::Black, Square::G8),
    (Square::E8, Square::A8, Color::Black, Square::C8),
];

/// Return the real destination square if the move is a castling.
///
/// Polyglot writes castling as the king capturing its own rook
/// (e1h1, e1a1, e8h8, e8a8). Only a king of the matching colour on its home
/// square is remapped; everything else passes through.
pub fn castling_destination(from: Square, to: Square, occupant: Option<(Piece, Color)>) -> Square {
    CASTLING_MOVES
        .iter()
        .find(|&&(king, rook, color, _)| {
            from == king && to == rook && occupant == Some((Piece::King, color))
        })
        .map_or(to, |&(_, _, _, dest)| dest)
}

/// Splits a byte stream into consecutive records.
///
/// Yields `MalformedRecord` once if the stream ends inside a record, then stops.
pub struct RecordReader<R> {
    inner: R,
    offset: u64,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            done: false,
        }
    }

    /// Bytes consumed by fully decoded records so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next record, `None` on a clean end of stream
    pub fn next_record(&mut self) -> BookResult<Option<Record>> {
        let mut buf = [0u8; ENTRY_SIZE];
        let mut filled = 0;

        while filled < ENTRY_SIZE {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        match filled {
            0 => Ok(None),
            ENTRY_SIZE => {
                let record = Record::from_bytes(&buf)?;
                self.offset += ENTRY_SIZE as u64;
                Ok(Some(record))
            }
            trailing => Err(BookError::MalformedRecord {
                offset: self.offset,
                trailing,
            }),
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = BookResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
