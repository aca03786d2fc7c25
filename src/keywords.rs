//! Keyword resolution pass
//!
//! The scan tags every alphabetic token start as a generic identifier.
//! A second pass over the finished token array reclassifies the exact
//! keyword matches. Lookup hashes the first eight bytes of the lexeme
//! (zero padded for shorter lexemes) into a 256-slot table; a slot hit
//! still requires a full lexeme comparison before reclassifying, since
//! non-keywords may collide. The table is process-wide, built exactly
//! once, and immutable afterwards.

use std::sync::LazyLock;

use crate::tokens::{TokenArray, TokenKind, is_ident_continue};

/// All C11 keywords with their token kinds.
const KEYWORDS: [(&str, TokenKind); 44] = [
    ("auto", TokenKind::Auto),
    ("break", TokenKind::Break),
    ("case", TokenKind::Case),
    ("char", TokenKind::Char),
    ("const", TokenKind::Const),
    ("continue", TokenKind::Continue),
    ("default", TokenKind::Default),
    ("do", TokenKind::Do),
    ("double", TokenKind::Double),
    ("else", TokenKind::Else),
    ("enum", TokenKind::Enum),
    ("extern", TokenKind::Extern),
    ("float", TokenKind::Float),
    ("for", TokenKind::For),
    ("goto", TokenKind::Goto),
    ("if", TokenKind::If),
    ("inline", TokenKind::Inline),
    ("int", TokenKind::Int),
    ("long", TokenKind::Long),
    ("register", TokenKind::Register),
    ("restrict", TokenKind::Restrict),
    ("return", TokenKind::Return),
    ("short", TokenKind::Short),
    ("signed", TokenKind::Signed),
    ("sizeof", TokenKind::Sizeof),
    ("static", TokenKind::Static),
    ("struct", TokenKind::Struct),
    ("switch", TokenKind::Switch),
    ("typedef", TokenKind::Typedef),
    ("union", TokenKind::Union),
    ("unsigned", TokenKind::Unsigned),
    ("void", TokenKind::Void),
    ("volatile", TokenKind::Volatile),
    ("while", TokenKind::While),
    ("_Alignas", TokenKind::Alignas),
    ("_Alignof", TokenKind::Alignof),
    ("_Atomic", TokenKind::Atomic),
    ("_Bool", TokenKind::Bool),
    ("_Complex", TokenKind::Complex),
    ("_Generic", TokenKind::Generic),
    ("_Imaginary", TokenKind::Imaginary),
    ("_Noreturn", TokenKind::Noreturn),
    ("_Static_assert", TokenKind::StaticAssert),
    ("_Thread_local", TokenKind::ThreadLocal),
];

const TABLE_SIZE: usize = 256;

/// Fixed-size keyword hash table with linear probing.
struct KeywordTable {
    slots: [Option<(&'static str, TokenKind)>; TABLE_SIZE],
}

static KEYWORD_TABLE: LazyLock<KeywordTable> = LazyLock::new(KeywordTable::build);

impl KeywordTable {
    fn build() -> Self {
        let mut slots = [None; TABLE_SIZE];
        for (word, kind) in KEYWORDS {
            let mut slot = hash8(word.as_bytes()) as usize;
            while slots[slot].is_some() {
                slot = (slot + 1) % TABLE_SIZE;
            }
            slots[slot] = Some((word, kind));
        }
        Self { slots }
    }

    /// Looks up a lexeme; `None` means it is a plain identifier.
    fn lookup(&self, lexeme: &[u8]) -> Option<TokenKind> {
        let mut slot = hash8(lexeme) as usize;
        loop {
            match self.slots[slot] {
                None => return None,
                Some((word, kind)) if word.as_bytes() == lexeme => return Some(kind),
                Some(_) => slot = (slot + 1) % TABLE_SIZE,
            }
        }
    }
}

/// Multiply-shift hash of the first eight lexeme bytes, zero padded.
fn hash8(lexeme: &[u8]) -> u8 {
    let mut first8 = [0u8; 8];
    let n = lexeme.len().min(8);
    first8[..n].copy_from_slice(&lexeme[..n]);
    (u64::from_le_bytes(first8).wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 56) as u8
}

/// Checks whether `lexeme` is a reserved word.
pub fn keyword_kind(lexeme: &[u8]) -> Option<TokenKind> {
    KEYWORD_TABLE.lookup(lexeme)
}

/// Reclassifies identifier tokens that exactly match a reserved word.
///
/// Mutates token kinds only; locations are untouched. `src` must be the
/// logical source bytes the tokens were produced from.
pub(crate) fn resolve_keywords(tokens: &mut TokenArray, src: &[u8]) {
    for index in 0..tokens.len() {
        if tokens.code(index) != TokenKind::Ident.code() {
            continue;
        }
        let start = tokens.loc(index) as usize;
        let mut end = start;
        while end < src.len() && is_ident_continue(src[end]) {
            end += 1;
        }
        if let Some(kind) = keyword_kind(&src[start..end]) {
            tokens.set_code(index, kind.code());
        }
    }
}
