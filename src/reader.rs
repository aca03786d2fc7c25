//! Buffer preparation: padded, over-readable source buffers
//!
//! The scanning loop loads fixed-width lane groups, including one group
//! of lookahead past the current chunk. To make every such load safe the
//! backing storage is padded to a multiple of the lane width plus one
//! full guard lane, null-terminated at the logical length, and zero
//! filled beyond it. Zero padding can never open a literal, extend an
//! escape run, or match a punctuator, so the padding is invisible to the
//! classifiers.

use std::fs;
use std::path::Path;

use crate::error::LexerError;
use crate::lanes::{LANE_WIDTH, Lanes};

/// A source buffer padded for safe lane-group over-reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    data: Vec<u8>,
    len: usize,
}

impl SourceBuffer {
    /// Reads `path` into a padded buffer.
    ///
    /// Any I/O failure is returned as [`LexerError::Io`]; lexing must not
    /// proceed without a buffer.
    pub fn from_path(path: &Path) -> Result<Self, LexerError> {
        let data = fs::read(path).map_err(|source| LexerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(data))
    }

    /// Wraps in-memory source bytes in a padded buffer.
    pub fn from_bytes(mut data: Vec<u8>) -> Self {
        let len = data.len();
        debug_assert!(u32::try_from(len).is_ok(), "source exceeds u32 offsets");
        // Logical bytes + null terminator, rounded up to the lane width,
        // plus one guard lane for lookahead loads.
        let padded = (len + 1).div_ceil(LANE_WIDTH) * LANE_WIDTH + LANE_WIDTH;
        data.resize(padded, 0);
        Self { data, len }
    }

    /// Logical length of the source in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The logical source bytes, without padding.
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Total storage size including padding and the guard lane.
    pub fn padded_len(&self) -> usize {
        self.data.len()
    }

    /// Loads the lane group at byte offset `base`, with whitespace
    /// normalized to the zero separator sentinel.
    ///
    /// Separators and consumed punctuator bytes share one sentinel, so
    /// the identifier and number classifiers only need a single
    /// "previous byte is zero" test.
    pub(crate) fn lanes_at(&self, base: usize) -> Lanes {
        let lanes = Lanes::load(&self.data, base);
        let whitespace = lanes.in_range(0x09, 0x0D) | lanes.eq_byte(b' ');
        lanes.clear(whitespace)
    }
}

impl From<&str> for SourceBuffer {
    fn from(text: &str) -> Self {
        Self::from_bytes(text.as_bytes().to_vec())
    }
}

impl From<&[u8]> for SourceBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes.to_vec())
    }
}
