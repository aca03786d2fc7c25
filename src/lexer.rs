//! Lane-group driver and the vectorized classifier pipeline
//!
//! The driver walks the padded buffer one lane group at a time, double
//! buffering the current and next group so punctuators may look one or
//! two bytes past the chunk boundary. Each step runs the classifiers as
//! a pure function of `(current, next, carry)`:
//!
//! 1. three-byte punctuators, 2. two-byte punctuators, 3. one-byte
//!    punctuators (longest first, each zeroing the bytes it consumes so
//!    shorter matches cannot re-claim them),
//! 4. identifier and number starts (a "separator immediately before"
//!    rule over the zeroed working copy),
//! 5. quoted-literal regions, which suppress every tag inside them.
//!
//! The result is a sparse tag lane group (non-zero byte = token start
//! carrying its type code) compacted into the token array. The only
//! state that survives a chunk boundary is the lookahead group itself
//! and the scalar [`Carry`]. Chunks must therefore be processed in
//! strict order; the carried literal and escape state makes chunk
//! results depend on every chunk before them.

use std::path::Path;

use smallvec::SmallVec;

use crate::error::LexerError;
use crate::keywords::resolve_keywords;
use crate::lanes::{
    LANE_WIDTH, LaneMask, Lanes, byte_set, escaped_positions, prefix_xor, select_leftmost,
};
use crate::reader::SourceBuffer;
use crate::tokens::{TokenArray, TokenKind};

/// Scalar state threaded between successive chunk iterations.
///
/// `last_byte` holds the working-copy value of the previous chunk's
/// final byte (zero when it was whitespace or a consumed punctuator), so
/// the separator rule works across the boundary. The literal flags seed
/// the next chunk's region and escape scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Carry {
    pub last_byte: u8,
    pub literal_open: bool,
    pub escape_pending: bool,
}

const THREE_BYTE_OPS: [[u8; 3]; 3] = [*b"...", *b"<<=", *b">>="];

const TWO_BYTE_OPS: [[u8; 2]; 19] = [
    *b"&&", *b"||", *b"==", *b"!=", *b"<=", *b">=", *b"+=", *b"-=", *b"*=", *b"/=", *b"%=",
    *b"&=", *b"^=", *b"|=", *b"++", *b"--", *b"<<", *b">>", *b"->",
];

// One-byte punctuators outside the ASCII range 40..=47, excluding `#`
// (preprocessing territory).
static ONE_BYTE_PUNCT: [bool; 256] = byte_set(b"!%&:;<=>?[]^{|}~");

/// Tokenizes a prepared buffer into a token array terminated by one
/// end-of-file token at the logical length.
pub fn lex(buf: &SourceBuffer) -> TokenArray {
    let len = buf.len();
    let mut tokens = TokenArray::with_capacity(len + 1);
    let mut carry = Carry::default();
    let mut cur = buf.lanes_at(0);

    let mut base = 0;
    while base < len {
        let mut next = buf.lanes_at(base + LANE_WIDTH);
        let (tags, carry_out) = classify(&mut cur, &mut next, carry);
        compact_into(&mut tokens, &tags, base as u32);
        cur = next;
        carry = carry_out;
        base += LANE_WIDTH;
    }

    tokens.push_raw(TokenKind::Eof.code(), len as u32);
    resolve_keywords(&mut tokens, buf.bytes());
    tokens
}

/// Reads and tokenizes a file.
///
/// Returns the buffer alongside the tokens; rendering needs the source
/// text to extract lexemes.
pub fn lex_file(path: &Path) -> Result<(SourceBuffer, TokenArray), LexerError> {
    let buf = SourceBuffer::from_path(path)?;
    let tokens = lex(&buf);
    Ok((buf, tokens))
}

/// Runs the classifier pipeline over one chunk.
///
/// `cur` and `next` are working copies; consumed bytes are zeroed in
/// place, including lookahead bytes in `next`, which suppresses stale
/// matches when `next` becomes the current chunk.
fn classify(cur: &mut Lanes, next: &mut Lanes, carry: Carry) -> (Lanes, Carry) {
    let mut tags = Lanes::zero();

    three_byte_punct(cur, next, &mut tags);
    two_byte_punct(cur, next, &mut tags);

    // A period adjacent to a decimal digit belongs to a numeric
    // constant, not to the period punctuator. Adjacency is tested across
    // the chunk boundary on both sides.
    let digits = cur.in_range(b'0', b'9');
    let prev_digit = (digits << 1) | LaneMask::from(carry.last_byte.is_ascii_digit());
    let next_digit =
        (digits >> 1) | (LaneMask::from(next.byte(0).is_ascii_digit()) << (LANE_WIDTH - 1));
    let numeric_period = cur.eq_byte(b'.') & (prev_digit | next_digit);

    one_byte_punct(cur, numeric_period, &mut tags);
    ident_and_num_starts(cur, numeric_period, carry, &mut tags);
    let (literal_open, escape_pending) = literal_regions(cur, carry, &mut tags);

    let carry_out = Carry {
        last_byte: cur.byte(LANE_WIDTH - 1),
        literal_open,
        escape_pending,
    };
    (tags, carry_out)
}

/// Detects `...`, `<<=`, `>>=` and writes their byte-sum codes at the
/// first matched byte.
fn three_byte_punct(cur: &mut Lanes, next: &mut Lanes, tags: &mut Lanes) {
    let sh1 = cur.shift_in(next, 1);
    let sh2 = cur.shift_in(next, 2);

    let mut candidates: LaneMask = 0;
    for op in THREE_BYTE_OPS {
        candidates |= cur.eq_byte(op[0]) & sh1.eq_byte(op[1]) & sh2.eq_byte(op[2]);
    }
    if candidates == 0 {
        return;
    }

    let keep = select_leftmost(candidates, 3);
    let codes = cur.wrapping_add(&sh1).wrapping_add(&sh2);
    *tags = tags.blend(&codes, keep);

    let consumed = u64::from(keep) | (u64::from(keep) << 1) | (u64::from(keep) << 2);
    *cur = cur.clear(consumed as LaneMask);
    *next = next.clear((consumed >> LANE_WIDTH) as LaneMask);
}

/// Detects the 19 two-byte operators and writes their byte-sum-minus-two
/// codes at the first matched byte.
fn two_byte_punct(cur: &mut Lanes, next: &mut Lanes, tags: &mut Lanes) {
    let sh1 = cur.shift_in(next, 1);

    let mut candidates: LaneMask = 0;
    for op in TWO_BYTE_OPS {
        candidates |= cur.eq_byte(op[0]) & sh1.eq_byte(op[1]);
    }

    // A candidate at the final byte consumes into the next group. When a
    // three-byte operator begins at that first lookahead byte it must
    // yield: the next step's longest-first pass claims the operator, and
    // the stream comes out the same as with the seam anywhere else.
    if candidates >> (LANE_WIDTH - 1) == 1 && starts_three_byte(next) {
        candidates &= !(1 << (LANE_WIDTH - 1));
    }
    if candidates == 0 {
        return;
    }

    let keep = select_leftmost(candidates, 2);
    let codes = cur.wrapping_add(&sh1).wrapping_sub_splat(2);
    *tags = tags.blend(&codes, keep);

    let consumed = u64::from(keep) | (u64::from(keep) << 1);
    *cur = cur.clear(consumed as LaneMask);
    *next = next.clear((consumed >> LANE_WIDTH) as LaneMask);
}

/// True when the group's first three bytes spell a three-byte operator.
fn starts_three_byte(lanes: &Lanes) -> bool {
    THREE_BYTE_OPS
        .iter()
        .any(|op| [lanes.byte(0), lanes.byte(1), lanes.byte(2)] == *op)
}

/// Tags the remaining one-byte punctuators with their own ASCII code.
fn one_byte_punct(cur: &mut Lanes, numeric_period: LaneMask, tags: &mut Lanes) {
    let mask =
        (cur.in_range(40, 47) | cur.in_set(&ONE_BYTE_PUNCT)) & !numeric_period;
    if mask == 0 {
        return;
    }
    *tags = tags.blend(cur, mask);
    *cur = cur.clear(mask);
}

/// Tags identifier and numeric-constant starts.
///
/// A start is a byte of the right class whose preceding working byte is
/// the zero separator sentinel; extent is never scanned here, it is
/// implied by the position of the next token start.
fn ident_and_num_starts(cur: &Lanes, numeric_period: LaneMask, carry: Carry, tags: &mut Lanes) {
    let prev_separator = (cur.eq_byte(0) << 1) | LaneMask::from(carry.last_byte == 0);

    let alpha = cur.in_range(b'a', b'z') | cur.in_range(b'A', b'Z') | cur.eq_byte(b'_');
    let digits = cur.in_range(b'0', b'9');

    let ident_starts = alpha & prev_separator;
    let num_starts = (digits | numeric_period) & prev_separator;

    *tags = tags.blend(&Lanes::splat(TokenKind::Ident.code()), ident_starts);
    *tags = tags.blend(&Lanes::splat(TokenKind::Num.code()), num_starts);
}

/// Tracks quote-delimited literal regions and suppresses every other tag
/// inside them.
///
/// Escaped delimiters (preceded by an odd-length backslash run) do not
/// toggle. The per-byte open/closed mask is a prefix-parity scan over
/// the unescaped delimiter toggles, seeded by the carried open flag. A
/// literal is closed by the next unescaped quote of either kind; an
/// unterminated literal swallows the rest of the input.
fn literal_regions(cur: &Lanes, carry: Carry, tags: &mut Lanes) -> (bool, bool) {
    let backslashes = cur.eq_byte(b'\\');
    let mut pending = carry.escape_pending;
    let escaped = escaped_positions(backslashes, &mut pending);

    let singles = cur.eq_byte(b'\'');
    let doubles = cur.eq_byte(b'"');
    let toggles = (singles | doubles) & !escaped;

    let seed = if carry.literal_open { LaneMask::MAX } else { 0 };
    let region = prefix_xor(toggles) ^ seed;

    // Literal bodies are opaque: clear everything the other classifiers
    // produced in the region, then tag the opening delimiters.
    let openings = toggles & region;
    *tags = tags.clear(region);
    *tags = tags.blend(&Lanes::splat(TokenKind::CharLit.code()), openings & singles);
    *tags = tags.blend(&Lanes::splat(TokenKind::StrLit.code()), openings & doubles);

    let literal_open = region >> (LANE_WIDTH - 1) == 1;
    (literal_open, pending)
}

/// Compacts the sparse tag lane group into dense (code, location) pairs.
///
/// Gathers the indices of non-zero lanes in ascending order without a
/// per-byte conditional over the whole group, then appends them offset
/// by the chunk base.
fn compact_into(tokens: &mut TokenArray, tags: &Lanes, base: u32) {
    let indices = token_indices(tags.nonzero());
    for &i in &indices {
        tokens.push_raw(tags.byte(i as usize), base + u32::from(i));
    }
}

/// Indices of set bits, in ascending order.
fn token_indices(mask: LaneMask) -> SmallVec<[u8; LANE_WIDTH]> {
    let mut indices = SmallVec::new();
    let mut m = mask;
    while m != 0 {
        indices.push(m.trailing_zeros() as u8);
        m &= m - 1;
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_str(src: &str) -> Vec<(TokenKind, u32)> {
        let buf = SourceBuffer::from(src);
        let tokens = lex(&buf);
        tokens
            .tokens()
            .map(|t| {
                let t = t.expect("scan produced unknown token code");
                (t.kind, t.loc)
            })
            .collect()
    }

    #[test]
    fn empty_input_yields_only_eof() {
        assert_eq!(lex_str(""), vec![(TokenKind::Eof, 0)]);
    }

    #[test]
    fn ident_plus_ident() {
        assert_eq!(
            lex_str("a+b"),
            vec![
                (TokenKind::Ident, 0),
                (TokenKind::Plus, 1),
                (TokenKind::Ident, 2),
                (TokenKind::Eof, 3),
            ]
        );
    }

    #[test]
    fn assignment_with_float_constant() {
        assert_eq!(
            lex_str("x = 3.14;"),
            vec![
                (TokenKind::Ident, 0),
                (TokenKind::Equal, 2),
                (TokenKind::Num, 4),
                (TokenKind::Semi, 8),
                (TokenKind::Eof, 9),
            ]
        );
    }

    #[test]
    fn maximal_munch_prefers_three_byte_operator() {
        assert_eq!(
            lex_str("a>>=b"),
            vec![
                (TokenKind::Ident, 0),
                (TokenKind::GreaterGreaterEqual, 1),
                (TokenKind::Ident, 4),
                (TokenKind::Eof, 5),
            ]
        );
    }

    #[test]
    fn shift_without_assign_is_two_byte() {
        assert_eq!(
            lex_str("a>>b"),
            vec![
                (TokenKind::Ident, 0),
                (TokenKind::GreaterGreater, 1),
                (TokenKind::Ident, 3),
                (TokenKind::Eof, 4),
            ]
        );
    }

    #[test]
    fn overlapping_two_byte_candidates_resolve_leftmost() {
        // `===` is `==` then `=`, never `=` `==`.
        assert_eq!(
            lex_str("==="),
            vec![
                (TokenKind::EqualEqual, 0),
                (TokenKind::Equal, 2),
                (TokenKind::Eof, 3),
            ]
        );
        // `====` is two `==`.
        assert_eq!(
            lex_str("===="),
            vec![
                (TokenKind::EqualEqual, 0),
                (TokenKind::EqualEqual, 2),
                (TokenKind::Eof, 4),
            ]
        );
        // `a+++++b` follows the same rule: `++ ++ +`.
        assert_eq!(
            lex_str("a+++++b"),
            vec![
                (TokenKind::Ident, 0),
                (TokenKind::PlusPlus, 1),
                (TokenKind::PlusPlus, 3),
                (TokenKind::Plus, 5),
                (TokenKind::Ident, 6),
                (TokenKind::Eof, 7),
            ]
        );
    }

    #[test]
    fn ellipsis_and_surrounding_periods() {
        assert_eq!(
            lex_str("f(a,...)"),
            vec![
                (TokenKind::Ident, 0),
                (TokenKind::LParen, 1),
                (TokenKind::Ident, 2),
                (TokenKind::Comma, 3),
                (TokenKind::Ellipsis, 4),
                (TokenKind::RParen, 7),
                (TokenKind::Eof, 8),
            ]
        );
    }

    #[test]
    fn member_access_period_stays_a_punctuator() {
        assert_eq!(
            lex_str("s.f"),
            vec![
                (TokenKind::Ident, 0),
                (TokenKind::Period, 1),
                (TokenKind::Ident, 2),
                (TokenKind::Eof, 3),
            ]
        );
    }

    #[test]
    fn period_between_identifier_and_digit_emits_nothing() {
        // The period is numeric by adjacency to the digit, but a numeric
        // start also needs a separator before it, which `x` denies. No
        // token covers `.5`.
        assert_eq!(
            lex_str("x.5"),
            vec![(TokenKind::Ident, 0), (TokenKind::Eof, 3)]
        );
    }

    #[test]
    fn leading_period_float_is_numeric() {
        assert_eq!(
            lex_str(".5"),
            vec![(TokenKind::Num, 0), (TokenKind::Eof, 2)]
        );
    }

    #[test]
    fn keywords_are_resolved_after_the_scan() {
        assert_eq!(
            lex_str("return 0;"),
            vec![
                (TokenKind::Return, 0),
                (TokenKind::Num, 7),
                (TokenKind::Semi, 8),
                (TokenKind::Eof, 9),
            ]
        );
    }

    #[test]
    fn escaped_quote_inside_char_literal() {
        assert_eq!(
            lex_str(r"'\''"),
            vec![(TokenKind::CharLit, 0), (TokenKind::Eof, 4)]
        );
    }

    #[test]
    fn string_literal_body_is_opaque() {
        assert_eq!(
            lex_str(r#"x = "a->b + c";"#),
            vec![
                (TokenKind::Ident, 0),
                (TokenKind::Equal, 2),
                (TokenKind::StrLit, 4),
                (TokenKind::Semi, 14),
                (TokenKind::Eof, 15),
            ]
        );
    }

    #[test]
    fn adjacent_literals_open_separately() {
        assert_eq!(
            lex_str("'a''b'"),
            vec![
                (TokenKind::CharLit, 0),
                (TokenKind::CharLit, 3),
                (TokenKind::Eof, 6),
            ]
        );
    }

    #[test]
    fn unterminated_literal_swallows_the_rest() {
        assert_eq!(
            lex_str("\"abc def + 1"),
            vec![(TokenKind::StrLit, 0), (TokenKind::Eof, 12)]
        );
    }

    #[test]
    fn two_byte_operator_straddles_the_lane_boundary() {
        // 31 identifier bytes put `-` at the last byte of the first lane
        // group and `>` at the first byte of the second.
        let src = format!("{}->x", "a".repeat(31));
        let buf = SourceBuffer::from(src.as_str());
        let tokens = lex(&buf);
        let kinds: Vec<_> = tokens.tokens().map(|t| t.unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Arrow,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens.loc(1), 31);
        assert_eq!(tokens.loc(2), 33);
    }

    #[test]
    fn three_byte_operator_straddles_the_lane_boundary() {
        for pad in [30, 31] {
            let src = format!("{}<<=y", "x".repeat(pad));
            let kinds: Vec<_> = lex_str(&src).into_iter().map(|(k, _)| k).collect();
            assert_eq!(
                kinds,
                vec![
                    TokenKind::Ident,
                    TokenKind::LessLessEqual,
                    TokenKind::Ident,
                    TokenKind::Eof,
                ],
                "pad {pad}"
            );
        }
    }

    #[test]
    fn token_count_never_exceeds_byte_count_plus_eof() {
        let src = "+-*/%=<>!&|^~.,;:?()[]{}";
        let tokens = lex_str(src);
        assert!(tokens.len() <= src.len() + 1);
    }

    #[test]
    fn carry_state_round_trips_through_classify() {
        // A chunk ending mid-literal with a trailing backslash reports
        // both flags; feeding them into the next chunk keeps the region
        // open across the boundary.
        let mut bytes = [b'x'; LANE_WIDTH];
        bytes[0] = b'"';
        bytes[LANE_WIDTH - 1] = b'\\';
        let mut cur = Lanes::from_array(bytes);
        let mut next = Lanes::from_array([b'"'; LANE_WIDTH]);
        let (tags, carry) = classify(&mut cur, &mut next, Carry::default());
        assert_eq!(tags.nonzero().count_ones(), 1);
        assert!(carry.literal_open);
        assert!(carry.escape_pending);
    }
}
