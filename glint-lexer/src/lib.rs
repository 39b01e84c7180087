//! Lexical analysis (C1): source text to a finite token stream with
//! trivia and precise locations, tolerant of malformed input via
//! diagnostic recovery.

pub mod escape;
pub mod location;
pub mod token_kind;
pub mod trivia;

use glint_diagnostics::{error_codes, Diagnostic, Span};
use location::{LineColumnTracker, SourceRange};
use logos::Logos;
pub use token_kind::TokenKind;
pub use trivia::{Trivia, TriviaKind};

#[derive(Debug, Clone)]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Null,
}

/// A single substantive (non-trivia) token together with its source
/// range, raw text, and the trivia attached on either side (§3).
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub range: SourceRange,
    pub text: String,
    pub literal: Option<LiteralValue>,
    pub leading_trivia: Vec<Trivia>,
    pub trailing_trivia: Vec<Trivia>,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfFile)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LexOptions {
    pub tab_width: u32,
    pub keep_trivia: bool,
    pub file_id: u32,
}

impl Default for LexOptions {
    fn default() -> Self {
        Self {
            tab_width: 4,
            keep_trivia: true,
            file_id: 0,
        }
    }
}

/// `tokenize(source, options) → TokenStream ∪ Diagnostics` (§4.1).
///
/// Always returns a finite token vector ending in exactly one
/// `EndOfFile` token (P1), plus any diagnostics raised along the way.
/// Tokenization never aborts early: a malformed literal or a stray
/// character is reported and lexing resumes at the next position.
pub fn tokenize(source: &str, file_name: &str, options: LexOptions) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    let mut tracker = LineColumnTracker::new(options.tab_width);
    let mut inner = TokenKind::lexer(source);
    let mut pending_leading: Vec<Trivia> = Vec::new();

    while let Some(result) = inner.next() {
        let span = inner.span();
        let text = &source[span.clone()];
        let (start_line, start_column) = tracker.position();
        let range = SourceRange {
            file_id: options.file_id,
            start_offset: span.start,
            start_line,
            start_column,
            width: span.len(),
        };
        tracker.advance(text);

        let kind = match result {
            Ok(kind) => kind,
            Err(()) => {
                diagnostics.push(Diagnostic::error(
                    error_codes::SYNTAX_ERROR,
                    format!("stray character `{text}`"),
                    range.to_diagnostic_span(file_name),
                ));
                continue;
            }
        };

        if kind.is_trivia() {
            if !options.keep_trivia {
                continue;
            }
            let trivia_kind = match kind {
                TokenKind::Newline => TriviaKind::Newline,
                TokenKind::LineComment => TriviaKind::LineComment,
                TokenKind::BlockComment => TriviaKind::BlockComment,
                TokenKind::DocLineComment => TriviaKind::DocLineComment,
                TokenKind::DocBlockComment => TriviaKind::DocBlockComment,
                _ => unreachable!("is_trivia() only returns these kinds"),
            };
            let trivia = Trivia {
                kind: trivia_kind,
                text: text.to_string(),
                range,
            };

            if let Some(last) = tokens.last_mut() {
                attach_trailing_or_buffer(last, trivia, &mut pending_leading);
            } else {
                pending_leading.push(trivia);
            }
            continue;
        }

        let (kind, literal, kind_diag) = classify_literal(kind, text, range, file_name);
        if let Some(diag) = kind_diag {
            diagnostics.push(diag);
        }

        let leading = std::mem::take(&mut pending_leading);
        tokens.push(Token {
            kind,
            range,
            text: text.to_string(),
            literal,
            leading_trivia: leading,
            trailing_trivia: Vec::new(),
        });
    }

    let (eof_line, eof_column) = tracker.position();
    tokens.push(Token {
        kind: TokenKind::EndOfFile,
        range: SourceRange {
            file_id: options.file_id,
            start_offset: source.len(),
            start_line: eof_line,
            start_column: eof_column,
            width: 0,
        },
        text: String::new(),
        literal: None,
        leading_trivia: std::mem::take(&mut pending_leading),
        trailing_trivia: Vec::new(),
    });

    (tokens, diagnostics)
}

/// Trailing trivia belongs to the *previous* substantive token up to and
/// including the first newline; anything after that newline becomes
/// leading trivia for the *next* substantive token.
fn attach_trailing_or_buffer(last: &mut Token, trivia: Trivia, pending_leading: &mut Vec<Trivia>) {
    let already_crossed_newline = last
        .trailing_trivia
        .iter()
        .any(|t| t.kind == TriviaKind::Newline);
    if !already_crossed_newline && pending_leading.is_empty() {
        last.trailing_trivia.push(trivia);
    } else {
        pending_leading.push(trivia);
    }
}

fn classify_literal(
    kind: TokenKind,
    text: &str,
    range: SourceRange,
    file_name: &str,
) -> (TokenKind, Option<LiteralValue>, Option<Diagnostic>) {
    let span = || range.to_diagnostic_span(file_name);
    match kind {
        TokenKind::IntLiteral => match parse_int(text, 10) {
            Ok(v) => (kind, Some(LiteralValue::Integer(v)), None),
            Err(e) => (kind, None, Some(bad_literal(e, span()))),
        },
        TokenKind::HexLiteral => match parse_int(strip_prefix(text, 2), 16) {
            Ok(v) => (kind, Some(LiteralValue::Integer(v)), None),
            Err(e) => (kind, None, Some(bad_literal(e, span()))),
        },
        TokenKind::BinaryLiteral => match parse_int(strip_prefix(text, 2), 2) {
            Ok(v) => (kind, Some(LiteralValue::Integer(v)), None),
            Err(e) => (kind, None, Some(bad_literal(e, span()))),
        },
        TokenKind::OctalLiteral => match parse_int(strip_prefix(text, 2), 8) {
            Ok(v) => (kind, Some(LiteralValue::Integer(v)), None),
            Err(e) => (kind, None, Some(bad_literal(e, span()))),
        },
        TokenKind::FloatLiteral | TokenKind::FloatLiteralExp => {
            let cleaned: String = text.chars().filter(|c| *c != '_').collect();
            match cleaned.parse::<f64>() {
                Ok(v) => (TokenKind::FloatLiteral, Some(LiteralValue::Float(v)), None),
                Err(_) => (
                    TokenKind::FloatLiteral,
                    None,
                    Some(bad_literal("malformed float literal".to_string(), span())),
                ),
            }
        }
        TokenKind::StringLiteral => {
            let body = &text[1..text.len() - 1];
            match escape::unescape(body) {
                Ok(s) => (kind, Some(LiteralValue::Str(s)), None),
                Err((_, e)) => (kind, None, Some(bad_literal(e.to_string(), span()))),
            }
        }
        TokenKind::UnterminatedStringLiteral => (
            TokenKind::StringLiteral,
            None,
            Some(bad_literal("unterminated string literal".to_string(), span())),
        ),
        TokenKind::CharLiteral => {
            let body = &text[1..text.len() - 1];
            match escape::unescape(body) {
                Ok(s) => {
                    let mut chars = s.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => (kind, Some(LiteralValue::Char(c)), None),
                        (Some(_), Some(_)) => (
                            kind,
                            None,
                            Some(bad_literal("multi-character char literal".to_string(), span())),
                        ),
                        (None, _) => (
                            kind,
                            None,
                            Some(bad_literal("empty char literal".to_string(), span())),
                        ),
                    }
                }
                Err((_, e)) => (kind, None, Some(bad_literal(e.to_string(), span()))),
            }
        }
        TokenKind::UnterminatedCharLiteral => (
            TokenKind::CharLiteral,
            None,
            Some(bad_literal("unterminated char literal".to_string(), span())),
        ),
        TokenKind::True => (kind, Some(LiteralValue::Bool(true)), None),
        TokenKind::False => (kind, Some(LiteralValue::Bool(false)), None),
        TokenKind::Null => (kind, Some(LiteralValue::Null), None),
        other => (other, None, None),
    }
}

fn bad_literal(message: String, span: Span) -> Diagnostic {
    Diagnostic::error(error_codes::INVALID_LITERAL, message, span)
}

fn strip_prefix(text: &str, n: usize) -> &str {
    text.get(n..).unwrap_or("")
}

fn parse_int(digits: &str, radix: u32) -> Result<i64, String> {
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    i64::from_str_radix(&cleaned, radix).map_err(|_| format!("malformed integer literal `{digits}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diags) = tokenize(source, "test.gl", LexOptions::default());
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn ends_with_exactly_one_eof() {
        let ks = kinds("fn Main() {}");
        assert_eq!(ks.last(), Some(&TokenKind::EndOfFile));
        assert_eq!(ks.iter().filter(|k| **k == TokenKind::EndOfFile).count(), 1);
    }

    #[test]
    fn keywords_and_identifiers() {
        let ks = kinds("class Dog : Animal { virtual fn speak(): i32 { return 2; } }");
        assert_eq!(
            ks,
            vec![
                TokenKind::KwClass,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Ident,
                TokenKind::LBrace,
                TokenKind::KwVirtual,
                TokenKind::KwFn,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Colon,
                TokenKind::KwI32,
                TokenKind::LBrace,
                TokenKind::KwReturn,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::RBrace,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn numeric_literal_bases() {
        let (tokens, diags) = tokenize("0x1A 0b101 0o17 42 3.14 1e10", "t.gl", LexOptions::default());
        assert!(diags.is_empty());
        let literals: Vec<_> = tokens.iter().filter_map(|t| t.literal.clone()).collect();
        assert!(matches!(literals[0], LiteralValue::Integer(26)));
        assert!(matches!(literals[1], LiteralValue::Integer(5)));
        assert!(matches!(literals[2], LiteralValue::Integer(15)));
        assert!(matches!(literals[3], LiteralValue::Integer(42)));
        assert!(matches!(literals[4], LiteralValue::Float(f) if (f - 3.14).abs() < 1e-9));
        assert!(matches!(literals[5], LiteralValue::Float(f) if (f - 1e10).abs() < 1.0));
    }

    #[test]
    fn string_literal_with_escapes() {
        let (tokens, diags) = tokenize(r#""x=\n\t""#, "t.gl", LexOptions::default());
        assert!(diags.is_empty());
        match &tokens[0].literal {
            Some(LiteralValue::Str(s)) => assert_eq!(s, "x=\n\t"),
            other => panic!("expected string literal, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_reports_diagnostic_and_recovers() {
        let (tokens, diags) = tokenize("\"oops\nfn x", "t.gl", LexOptions::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, error_codes::INVALID_LITERAL);
        // lexing continues past the error and still finds `fn x`
        assert!(tokens.iter().any(|t| t.kind == TokenKind::KwFn));
    }

    #[test]
    fn multi_character_char_literal_is_an_error() {
        let (_, diags) = tokenize("'ab'", "t.gl", LexOptions::default());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("multi-character"));
    }

    #[test]
    fn stray_character_recovers_one_char_at_a_time() {
        let (tokens, diags) = tokenize("@ fn", "t.gl", LexOptions::default());
        assert_eq!(diags.len(), 1);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::KwFn));
    }

    #[test]
    fn trivia_is_attached_when_requested() {
        let (tokens, _) = tokenize("fn /* c */ Main", "t.gl", LexOptions::default());
        let fn_tok = &tokens[0];
        assert!(!fn_tok.trailing_trivia.is_empty());
    }

    #[test]
    fn trivia_dropped_when_not_requested() {
        let mut opts = LexOptions::default();
        opts.keep_trivia = false;
        let (tokens, _) = tokenize("fn /* c */ Main", "t.gl", opts);
        assert!(tokens.iter().all(|t| t.leading_trivia.is_empty() && t.trailing_trivia.is_empty()));
    }

    #[test]
    fn shift_operator_is_a_single_token() {
        let ks = kinds("Vec<Vec<i32>>");
        assert!(ks.contains(&TokenKind::RShift));
    }
}
