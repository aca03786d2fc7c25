//! A SIMD-style C tokenizer built on fixed-width lane-group byte
//! classification.
//!
//! Instead of a byte-at-a-time state machine, the scanner processes the
//! source in 32-byte lane groups. Each group is classified by a short,
//! branch-light pipeline of whole-group comparisons and bitmask scans:
//! multi-byte punctuators first (longest match wins by consuming its
//! bytes), then one-byte punctuators, then identifier and number starts,
//! then quote-delimited literal regions which veto everything inside
//! them. The sparse per-byte tags are compacted into a
//! structure-of-arrays token store, and one final pass reclassifies
//! identifiers that spell a reserved word.
//!
//! Token type codes are arithmetic over the punctuator's own bytes, so
//! the classifiers compute them with lane additions rather than table
//! lookups; see [`tokens`] for the scheme.
//!
//! # Example
//!
//! ```
//! use simd_c_lexer::{SourceBuffer, TokenKind, lex};
//!
//! let buf = SourceBuffer::from("return x->next;");
//! let tokens = lex(&buf);
//! let kinds: Vec<TokenKind> = tokens
//!     .tokens()
//!     .map(|t| t.map(|t| t.kind))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(
//!     kinds,
//!     [
//!         TokenKind::Return,
//!         TokenKind::Ident,
//!         TokenKind::Arrow,
//!         TokenKind::Ident,
//!         TokenKind::Semi,
//!         TokenKind::Eof,
//!     ]
//! );
//! ```

pub mod error;
pub mod keywords;
pub mod lanes;
pub mod lexer;
pub mod reader;
pub mod tokens;

pub use error::LexerError;
pub use keywords::keyword_kind;
pub use lanes::{LANE_WIDTH, LaneMask, Lanes};
pub use lexer::{Carry, lex, lex_file};
pub use reader::SourceBuffer;
pub use tokens::{Token, TokenArray, TokenKind, print_tokens};
