//! Error types for buffer preparation and token rendering
//!
//! Lexing itself is infallible once a buffer exists: every byte either
//! starts a token or does not. The failure modes live at the edges:
//! loading the file, and decoding a raw tag back into a known token kind.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the lexer crate.
#[derive(Debug, Error)]
pub enum LexerError {
    /// The source file could not be read into a padded buffer.
    ///
    /// Fatal to the invocation: no token array is produced.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored token code does not map to any known [`TokenKind`].
    ///
    /// This is a defect in the classifier that produced the tag, surfaced
    /// at the render boundary. Rendering degrades to an empty label and
    /// the scan result is otherwise unaffected.
    ///
    /// [`TokenKind`]: crate::tokens::TokenKind
    #[error("unknown token type code {code} for token {index}")]
    UnknownTokenType { code: u8, index: usize },
}
