use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EscapeError {
    #[error("unknown escape sequence `\\{0}`")]
    UnknownEscape(char),
    #[error("incomplete `\\x` escape")]
    IncompleteHexEscape,
    #[error("invalid `\\x` escape: not valid hex digits")]
    InvalidHexEscape,
    #[error("dangling escape at end of literal")]
    DanglingEscape,
}

/// Interpret the escape sequences listed in §4.1
/// (`\n \t \r \b \f \v \a \0 \\ \' \" \xHH`) inside `body` (the literal's
/// text with surrounding quotes already stripped). Returns the
/// interpreted text, or the first escape error encountered together with
/// the byte offset (relative to `body`) where it starts.
pub fn unescape(body: &str) -> Result<String, (usize, EscapeError)> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            None => return Err((idx, EscapeError::DanglingEscape)),
            Some((_, esc)) => match esc {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{0008}'),
                'f' => out.push('\u{000C}'),
                'v' => out.push('\u{000B}'),
                'a' => out.push('\u{0007}'),
                '0' => out.push('\0'),
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                'x' => {
                    let mut hex = String::with_capacity(2);
                    for _ in 0..2 {
                        match chars.peek() {
                            Some((_, c)) if c.is_ascii_hexdigit() => {
                                hex.push(*c);
                                chars.next();
                            }
                            _ => break,
                        }
                    }
                    if hex.len() != 2 {
                        return Err((idx, EscapeError::IncompleteHexEscape));
                    }
                    let byte = u8::from_str_radix(&hex, 16)
                        .map_err(|_| (idx, EscapeError::InvalidHexEscape))?;
                    out.push(byte as char);
                }
                other => return Err((idx, EscapeError::UnknownEscape(other))),
            },
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_common_escapes() {
        assert_eq!(unescape(r"a\nb\tc").unwrap(), "a\nb\tc");
        assert_eq!(unescape(r#"\"quoted\""#).unwrap(), "\"quoted\"");
    }

    #[test]
    fn decodes_hex_escape() {
        assert_eq!(unescape(r"\x41").unwrap(), "A");
    }

    #[test]
    fn rejects_unknown_escape() {
        assert!(unescape(r"\q").is_err());
    }

    #[test]
    fn rejects_incomplete_hex_escape() {
        assert!(unescape(r"\x4").is_err());
    }
}
