use simd_c_lexer::{SourceBuffer, Token, TokenKind, lex};

fn scan(src: &str) -> Vec<(TokenKind, u32)> {
    let buf = SourceBuffer::from(src);
    lex(&buf)
        .tokens()
        .map(|t| t.map(|t| (t.kind, t.loc)))
        .collect::<Result<_, _>>()
        .expect("scan produced an unknown token code")
}

fn scan_texts(src: &str) -> Vec<String> {
    let buf = SourceBuffer::from(src);
    lex(&buf)
        .tokens()
        .map(|t| t.expect("unknown token code").text(buf.bytes()).into_owned())
        .collect()
}

#[test]
fn expression_with_operators_and_identifiers() {
    assert_eq!(
        scan("a+b"),
        [
            (TokenKind::Ident, 0),
            (TokenKind::Plus, 1),
            (TokenKind::Ident, 2),
            (TokenKind::Eof, 3),
        ]
    );
}

#[test]
fn assignment_statement_with_float() {
    assert_eq!(
        scan("x = 3.14;"),
        [
            (TokenKind::Ident, 0),
            (TokenKind::Equal, 2),
            (TokenKind::Num, 4),
            (TokenKind::Semi, 8),
            (TokenKind::Eof, 9),
        ]
    );
}

#[test]
fn compound_shift_assignment() {
    assert_eq!(
        scan("a>>=b"),
        [
            (TokenKind::Ident, 0),
            (TokenKind::GreaterGreaterEqual, 1),
            (TokenKind::Ident, 4),
            (TokenKind::Eof, 5),
        ]
    );
}

#[test]
fn return_statement_resolves_the_keyword() {
    assert_eq!(
        scan("return 0;"),
        [
            (TokenKind::Return, 0),
            (TokenKind::Num, 7),
            (TokenKind::Semi, 8),
            (TokenKind::Eof, 9),
        ]
    );
}

#[test]
fn escaped_quote_in_char_literal() {
    assert_eq!(
        scan(r"'\''"),
        [(TokenKind::CharLit, 0), (TokenKind::Eof, 4)]
    );
}

#[test]
fn keyword_prefix_stays_an_identifier() {
    assert_eq!(
        scan("continues continue intx int"),
        [
            (TokenKind::Ident, 0),
            (TokenKind::Continue, 10),
            (TokenKind::Ident, 19),
            (TokenKind::Int, 24),
            (TokenKind::Eof, 27),
        ]
    );
}

#[test]
fn underscore_keywords_resolve() {
    assert_eq!(
        scan("_Bool b; _Static_assert(1, \"ok\");")
            .into_iter()
            .map(|(k, _)| k)
            .collect::<Vec<_>>(),
        [
            TokenKind::Bool,
            TokenKind::Ident,
            TokenKind::Semi,
            TokenKind::StaticAssert,
            TokenKind::LParen,
            TokenKind::Num,
            TokenKind::Comma,
            TokenKind::StrLit,
            TokenKind::RParen,
            TokenKind::Semi,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn realistic_function_renders_every_lexeme() {
    let src = "int main(void) {\n    int count = 0;\n    count += 10;\n    return count;\n}\n";
    assert_eq!(
        scan_texts(src),
        [
            "int", "main", "(", "void", ")", "{", "int", "count", "=", "0", ";", "count", "+=",
            "10", ";", "return", "count", ";", "}", "",
        ]
    );
}

#[test]
fn pointer_chasing_expression() {
    assert_eq!(
        scan_texts("p->next->prev = &node;"),
        ["p", "->", "next", "->", "prev", "=", "&", "node", ";", ""]
    );
}

#[test]
fn string_literal_suppresses_interior_tokens() {
    assert_eq!(
        scan(r#"puts("a + b == c");"#),
        [
            (TokenKind::Ident, 0),
            (TokenKind::LParen, 4),
            (TokenKind::StrLit, 5),
            (TokenKind::RParen, 17),
            (TokenKind::Semi, 18),
            (TokenKind::Eof, 19),
        ]
    );
}

#[test]
fn unterminated_string_swallows_remaining_input() {
    assert_eq!(
        scan("int x; \"oops int y;"),
        [
            (TokenKind::Int, 0),
            (TokenKind::Ident, 4),
            (TokenKind::Semi, 5),
            (TokenKind::StrLit, 7),
            (TokenKind::Eof, 19),
        ]
    );
}

#[test]
fn token_count_is_bounded_by_input_length() {
    let src = "a=b+c*d-e/f%g;h++;i--;j<<=1;k>>=2;";
    assert!(scan(src).len() <= src.len() + 1);
}

#[test]
fn leading_whitespace_shifts_locations_only() {
    let src = "while (n >= 10) { n -= base[i]; }";
    let reference = scan(src);
    for pad in 1..=33 {
        let padded = format!("{}{src}", " ".repeat(pad));
        let shifted = scan(&padded);
        assert_eq!(shifted.len(), reference.len(), "pad {pad}");
        for ((kind, loc), (ref_kind, ref_loc)) in shifted.iter().zip(&reference) {
            assert_eq!(kind, ref_kind, "pad {pad}");
            assert_eq!(*loc, ref_loc + pad as u32, "pad {pad}");
        }
    }
}

#[test]
fn tokens_serialize_to_json() {
    let buf = SourceBuffer::from("x;");
    let typed: Vec<Token> = lex(&buf)
        .tokens()
        .collect::<Result<_, _>>()
        .expect("unknown token code");
    let json = serde_json::to_value(&typed).expect("serialization failed");
    assert_eq!(json[0]["kind"], "Ident");
    assert_eq!(json[0]["loc"], 0);
    assert_eq!(json[2]["kind"], "Eof");
    assert_eq!(json[2]["loc"], 2);

    let back: Vec<Token> = serde_json::from_value(json).expect("deserialization failed");
    assert_eq!(back, typed);
}
