//! Token model: kinds, the structure-of-arrays token store, and rendering
//!
//! Token type codes are not arbitrary. Each punctuator's code is a fixed
//! arithmetic function of the ASCII codes of its bytes:
//!
//! - one-byte punctuators: the ASCII code itself,
//! - two-byte punctuators: `(b0 + b1 - 2) mod 256`,
//! - three-byte punctuators: `(b0 + b1 + b2) mod 256`.
//!
//! This lets the lane classifiers derive a token's code by adding matched
//! byte lanes instead of branching into a table. Keyword codes fill the
//! small values the punctuator scheme leaves unused; keywords only appear
//! after the resolution pass, never as raw scan tags. Literal kinds take
//! the free codes 64 and 65.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::LexerError;

/// Closed enumeration of token types.
///
/// Discriminants follow the arithmetic scheme described in the module
/// docs, so converting between raw scan tags and kinds is a cast in one
/// direction and a checked lookup in the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenKind {
    Eof = 0,
    Ident = 1,
    Num = 2,

    // Keywords. Codes fill gaps left by the punctuator scheme.
    Auto = 3,
    Break = 4,
    Case = 5,
    Char = 6,
    Const = 7,
    Continue = 8,
    Default = 9,
    Do = 10,
    Double = 11,
    Else = 12,
    Enum = 13,
    Extern = 14,
    Float = 15,
    For = 16,
    Goto = 17,
    If = 18,
    Inline = 19,
    Int = 20,
    Long = 21,
    Register = 22,
    Restrict = 23,
    Return = 24,
    Short = 25,
    Signed = 26,
    Sizeof = 27,
    Static = 28,
    Struct = 29,
    Switch = 30,
    Typedef = 31,
    Union = 32,
    Unsigned = 34,
    Void = 35,
    Volatile = 36,
    While = 39,
    Alignas = 48,
    Alignof = 49,
    Atomic = 50,
    Bool = 51,
    Complex = 52,
    Generic = 53,
    Imaginary = 54,
    Noreturn = 55,
    StaticAssert = 56,
    ThreadLocal = 57,

    // Quoted literals. 64 and 65 are unused by every other class.
    CharLit = 64,
    StrLit = 65,

    // One-byte punctuators: code == ASCII. `#` is deliberately absent,
    // it belongs to preprocessing.
    Exclaim = 33,  // !
    Percent = 37,  // %
    Amp = 38,      // &
    LParen = 40,   // (
    RParen = 41,   // )
    Star = 42,     // *
    Plus = 43,     // +
    Comma = 44,    // ,
    Minus = 45,    // -
    Period = 46,   // .
    Slash = 47,    // /
    Colon = 58,    // :
    Semi = 59,     // ;
    Less = 60,     // <
    Equal = 61,    // =
    Greater = 62,  // >
    Question = 63, // ?
    LSquare = 91,  // [
    RSquare = 93,  // ]
    Caret = 94,    // ^
    LBrace = 123,  // {
    Pipe = 124,    // |
    RBrace = 125,  // }
    Tilde = 126,   // ~

    // Two-byte punctuators: code == b0 + b1 - 2.
    AmpAmp = 74,         // &&
    PlusPlus = 84,       // ++
    MinusMinus = 88,     // --
    ExclaimEqual = 92,   // !=
    PercentEqual = 96,   // %=
    AmpEqual = 97,       // &=
    StarEqual = 101,     // *=
    PlusEqual = 102,     // +=
    MinusEqual = 104,    // -=
    Arrow = 105,         // ->
    SlashEqual = 106,    // /=
    LessLess = 118,      // <<
    LessEqual = 119,     // <=
    EqualEqual = 120,    // ==
    GreaterEqual = 121,  // >=
    GreaterGreater = 122, // >>
    CaretEqual = 153,    // ^=
    PipeEqual = 183,     // |=
    PipePipe = 246,      // ||

    // Three-byte punctuators: code == b0 + b1 + b2 (mod 256).
    Ellipsis = 138,            // ...
    LessLessEqual = 181,       // <<=
    GreaterGreaterEqual = 185, // >>=
}

impl TokenKind {
    /// Checked conversion from a raw scan tag.
    ///
    /// Returns `None` for codes outside the closed enumeration.
    pub const fn from_code(code: u8) -> Option<Self> {
        use TokenKind::*;
        Some(match code {
            0 => Eof,
            1 => Ident,
            2 => Num,
            3 => Auto,
            4 => Break,
            5 => Case,
            6 => Char,
            7 => Const,
            8 => Continue,
            9 => Default,
            10 => Do,
            11 => Double,
            12 => Else,
            13 => Enum,
            14 => Extern,
            15 => Float,
            16 => For,
            17 => Goto,
            18 => If,
            19 => Inline,
            20 => Int,
            21 => Long,
            22 => Register,
            23 => Restrict,
            24 => Return,
            25 => Short,
            26 => Signed,
            27 => Sizeof,
            28 => Static,
            29 => Struct,
            30 => Switch,
            31 => Typedef,
            32 => Union,
            33 => Exclaim,
            34 => Unsigned,
            35 => Void,
            36 => Volatile,
            37 => Percent,
            38 => Amp,
            39 => While,
            40 => LParen,
            41 => RParen,
            42 => Star,
            43 => Plus,
            44 => Comma,
            45 => Minus,
            46 => Period,
            47 => Slash,
            48 => Alignas,
            49 => Alignof,
            50 => Atomic,
            51 => Bool,
            52 => Complex,
            53 => Generic,
            54 => Imaginary,
            55 => Noreturn,
            56 => StaticAssert,
            57 => ThreadLocal,
            58 => Colon,
            59 => Semi,
            60 => Less,
            61 => Equal,
            62 => Greater,
            63 => Question,
            64 => CharLit,
            65 => StrLit,
            74 => AmpAmp,
            84 => PlusPlus,
            88 => MinusMinus,
            91 => LSquare,
            92 => ExclaimEqual,
            93 => RSquare,
            94 => Caret,
            96 => PercentEqual,
            97 => AmpEqual,
            101 => StarEqual,
            102 => PlusEqual,
            104 => MinusEqual,
            105 => Arrow,
            106 => SlashEqual,
            118 => LessLess,
            119 => LessEqual,
            120 => EqualEqual,
            121 => GreaterEqual,
            122 => GreaterGreater,
            123 => LBrace,
            124 => Pipe,
            125 => RBrace,
            126 => Tilde,
            138 => Ellipsis,
            153 => CaretEqual,
            181 => LessLessEqual,
            183 => PipeEqual,
            185 => GreaterGreaterEqual,
            246 => PipePipe,
            _ => return None,
        })
    }

    /// Raw code of this kind, as written into the tag lane.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Fixed source text for punctuators and keywords.
    ///
    /// Identifier, number, literal, and end-of-file kinds have no fixed
    /// text; their lexeme lives in the source buffer.
    pub const fn fixed_str(self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            Auto => "auto",
            Break => "break",
            Case => "case",
            Char => "char",
            Const => "const",
            Continue => "continue",
            Default => "default",
            Do => "do",
            Double => "double",
            Else => "else",
            Enum => "enum",
            Extern => "extern",
            Float => "float",
            For => "for",
            Goto => "goto",
            If => "if",
            Inline => "inline",
            Int => "int",
            Long => "long",
            Register => "register",
            Restrict => "restrict",
            Return => "return",
            Short => "short",
            Signed => "signed",
            Sizeof => "sizeof",
            Static => "static",
            Struct => "struct",
            Switch => "switch",
            Typedef => "typedef",
            Union => "union",
            Unsigned => "unsigned",
            Void => "void",
            Volatile => "volatile",
            While => "while",
            Alignas => "_Alignas",
            Alignof => "_Alignof",
            Atomic => "_Atomic",
            Bool => "_Bool",
            Complex => "_Complex",
            Generic => "_Generic",
            Imaginary => "_Imaginary",
            Noreturn => "_Noreturn",
            StaticAssert => "_Static_assert",
            ThreadLocal => "_Thread_local",
            Exclaim => "!",
            Percent => "%",
            Amp => "&",
            LParen => "(",
            RParen => ")",
            Star => "*",
            Plus => "+",
            Comma => ",",
            Minus => "-",
            Period => ".",
            Slash => "/",
            Colon => ":",
            Semi => ";",
            Less => "<",
            Equal => "=",
            Greater => ">",
            Question => "?",
            LSquare => "[",
            RSquare => "]",
            Caret => "^",
            LBrace => "{",
            Pipe => "|",
            RBrace => "}",
            Tilde => "~",
            AmpAmp => "&&",
            PlusPlus => "++",
            MinusMinus => "--",
            ExclaimEqual => "!=",
            PercentEqual => "%=",
            AmpEqual => "&=",
            StarEqual => "*=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            Arrow => "->",
            SlashEqual => "/=",
            LessLess => "<<",
            LessEqual => "<=",
            EqualEqual => "==",
            GreaterEqual => ">=",
            GreaterGreater => ">>",
            CaretEqual => "^=",
            PipeEqual => "|=",
            PipePipe => "||",
            Ellipsis => "...",
            LessLessEqual => "<<=",
            GreaterGreaterEqual => ">>=",
            Eof | Ident | Num | CharLit | StrLit => return None,
        })
    }

    /// True for the keyword kinds produced by the resolution pass.
    pub const fn is_keyword(self) -> bool {
        matches!(
            self.code(),
            3..=32 | 34..=36 | 39 | 48..=57
        )
    }
}

/// A single typed, located token.
///
/// `loc` is a byte offset into the source buffer. For fixed-text tokens
/// it is informational; for identifiers, numbers, and literals it is the
/// offset of the first lexeme byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: u32,
}

impl Token {
    pub const fn new(kind: TokenKind, loc: u32) -> Self {
        Self { kind, loc }
    }

    /// Renders the token's source text.
    ///
    /// Punctuators and keywords return their fixed spelling. Identifier
    /// and number lexemes run from `loc` to the next separator; literals
    /// run through their closing delimiter, or to the end of input when
    /// unterminated.
    pub fn text<'s>(&self, src: &'s [u8]) -> Cow<'s, str> {
        if let Some(fixed) = self.kind.fixed_str() {
            return Cow::Borrowed(fixed);
        }
        let loc = self.loc as usize;
        let bytes: &[u8] = match self.kind {
            TokenKind::Eof => &[],
            TokenKind::Ident => lexeme_run(src, loc, is_ident_continue),
            TokenKind::Num => lexeme_run(src, loc, is_number_continue),
            TokenKind::CharLit | TokenKind::StrLit => literal_run(src, loc),
            _ => &[],
        };
        String::from_utf8_lossy(bytes)
    }
}

/// Lexeme bytes starting at `loc` while `cont` holds.
fn lexeme_run(src: &[u8], loc: usize, cont: fn(u8) -> bool) -> &[u8] {
    let mut end = loc;
    while end < src.len() && cont(src[end]) {
        end += 1;
    }
    &src[loc..end]
}

/// Literal bytes from the opening delimiter through its unescaped match.
fn literal_run(src: &[u8], loc: usize) -> &[u8] {
    if loc >= src.len() {
        return &[];
    }
    let delim = src[loc];
    let mut i = loc + 1;
    while i < src.len() {
        match src[i] {
            b'\\' => i += 2,
            b if b == delim => return &src[loc..=i],
            _ => i += 1,
        }
    }
    &src[loc..]
}

pub(crate) fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_number_continue(b: u8) -> bool {
    is_ident_continue(b) || b == b'.'
}

/// Growable structure-of-arrays token store.
///
/// Parallel `codes` and `locs` sequences, insertion ordered. Pre-sized to
/// input length plus one so the hot scanning loop never reallocates: a
/// token start needs at least one byte, so token count is bounded by byte
/// count, plus the end-of-file token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenArray {
    codes: Vec<u8>,
    locs: Vec<u32>,
}

impl TokenArray {
    /// Creates an empty array with room for `capacity` tokens.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            codes: Vec::with_capacity(capacity),
            locs: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Appends a raw (code, location) pair.
    pub(crate) fn push_raw(&mut self, code: u8, loc: u32) {
        self.codes.push(code);
        self.locs.push(loc);
    }

    /// Raw type code at `index`.
    pub fn code(&self, index: usize) -> u8 {
        self.codes[index]
    }

    /// Byte offset at `index`.
    pub fn loc(&self, index: usize) -> u32 {
        self.locs[index]
    }

    /// Rewrites the type code at `index`. Used by the keyword pass only;
    /// locations are never mutated after the scan.
    pub(crate) fn set_code(&mut self, index: usize, code: u8) {
        self.codes[index] = code;
    }

    /// Checked typed view of the token at `index`.
    pub fn token(&self, index: usize) -> Result<Token, LexerError> {
        let code = self.codes[index];
        TokenKind::from_code(code)
            .map(|kind| Token::new(kind, self.locs[index]))
            .ok_or(LexerError::UnknownTokenType { code, index })
    }

    /// Iterates checked typed tokens in insertion order.
    pub fn tokens(&self) -> impl Iterator<Item = Result<Token, LexerError>> + '_ {
        (0..self.len()).map(|i| self.token(i))
    }
}

/// Prints one rendered token label per line.
///
/// An unknown type code is reported to stderr and rendered as an empty
/// label; it never aborts the dump.
pub fn print_tokens(tokens: &TokenArray, src: &[u8]) {
    for entry in tokens.tokens() {
        match entry {
            Ok(token) => println!("{}", token.text(src)),
            Err(err) => {
                eprintln!("{err}");
                println!();
            }
        }
    }
}
