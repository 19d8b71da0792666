//! In-memory Polyglot book index.
//!
//! Records are grouped by position key as they are read. Several streams may
//! be ingested into the same book; their entries accumulate.

use super::error::{BookError, BookResult};
use super::record::{RawEntry, Record, RecordReader};
use crate::types::{Key, Weight};
use std::collections::HashMap;
use std::fs::File as FsFile;
use std::io::{BufReader, Read};
use std::path::Path;

/// Polyglot opening book
#[derive(Debug, Clone)]
pub struct PolyglotBook {
    /// Entries per position key, in ingestion order
    positions: HashMap<Key, Vec<RawEntry>>,
    /// Smallest weight seen (u16::MAX until something is ingested)
    min: Weight,
    /// Largest weight seen (0 until something is ingested)
    max: Weight,
    /// Total number of entries across all keys
    entry_count: usize,
}

impl Default for PolyglotBook {
    fn default() -> Self {
        Self::new()
    }
}

impl PolyglotBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            min: Weight::MAX,
            max: 0,
            entry_count: 0,
        }
    }

    /// Build a book from an in-memory `.bin` image
    pub fn from_bytes(data: &[u8]) -> BookResult<Self> {
        let mut book = Self::new();
        book.ingest(data)?;
        Ok(book)
    }

    /// Load a Polyglot book from a file
    pub fn load<P: AsRef<Path>>(path: P) -> BookResult<Self> {
        let mut book = Self::new();
        book.ingest_file(path)?;
        Ok(book)
    }

    /// Merge a Polyglot book file into this one
    pub fn ingest_file<P: AsRef<Path>>(&mut self, path: P) -> BookResult<usize> {
        let path = path.as_ref();
        let file = FsFile::open(path)?;
        log::debug!("reading book {}", path.display());
        self.ingest(BufReader::new(file))
    }

    /// Read every record of `reader` into the book.
    ///
    /// May be called several times with different books; entries are merged
    /// and weights are kept as is, so it is up to the caller to keep their
    /// scales consistent. Stops at the first malformed record; whatever was
    /// read before it stays in the book. Returns the number of records read.
    pub fn ingest<R: Read>(&mut self, reader: R) -> BookResult<usize> {
        let mut records = RecordReader::new(reader);
        let mut count = 0;

        for record in records.by_ref() {
            match record {
                Ok(record) => {
                    self.insert(record);
                    count += 1;
                }
                Err(e) => {
                    if let BookError::MalformedRecord { offset, trailing } = &e {
                        log::warn!(
                            "book ingestion stopped at byte {} ({} trailing bytes), kept {} records",
                            offset, trailing, count
                        );
                    }
                    return Err(e);
                }
            }
        }

        log::debug!(
            "ingested {} records ({} bytes), book now {} entries over {} keys, weights {:?}",
            count,
            records.offset(),
            self.entry_count,
            self.positions.len(),
            self.bounds()
        );
        Ok(count)
    }

    /// Add a single decoded record
    pub fn insert(&mut self, record: Record) {
        self.min = self.min.min(record.weight);
        self.max = self.max.max(record.weight);
        self.positions.entry(record.key).or_default().push(record.entry());
        self.entry_count += 1;
    }

    /// Smallest and largest weight over all entries.
    ///
    /// An empty book reports `(65535, 0)`: min above max means "no data".
    pub fn bounds(&self) -> (u32, u32) {
        (self.min as u32, self.max as u32)
    }

    /// All entries stored under `key`, empty if the key is unknown
    #[inline]
    pub fn entries(&self, key: Key) -> &[RawEntry] {
        self.positions.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Records ingested so far, summed over all keys
    pub fn len(&self) -> usize {
        self.entry_count
    }

    /// Number of distinct position keys
    pub fn key_count(&self) -> usize {
        self.positions.len()
    }

    /// True until the first record is ingested
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}
