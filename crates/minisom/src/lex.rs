//! Lexer for SOM-family source.
//!
//! Produces a flat token list with line/column positions for diagnostics.
//! Comments are double-quoted and skipped. The only context sensitivity is
//! the minus sign: `-` directly before a digit starts a negative integer
//! literal unless the previous token could end an expression, so `3 - 4`
//! stays a binary send while `x := -5` lexes a literal.

use std::fmt;

use crate::parse::ParseError;

/// A lexical token with its source position (1-based).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Identifier(String),
    /// An identifier with a trailing colon, e.g. `at:`.
    Keyword(String),
    /// A run of binary-selector characters, e.g. `+` or `<=`.
    Operator(String),
    Integer(i64),
    Str(String),
    /// `#foo`, `#at:put:` or `#+`, without the `#`.
    SymbolLit(String),
    /// `#(`, opening an array literal.
    PoundParen,
    LParen,
    RParen,
    LBracket,
    RBracket,
    /// `|`, delimiting variable lists and block parameters.
    Vertical,
    /// `:`, introducing a block parameter.
    Colon,
    Caret,
    Period,
    /// `:=`
    Assign,
    /// `----`, separating instance-side from class-side methods.
    Separator,
    Eof,
}

impl TokenKind {
    /// True when this token can end an expression, which rules out a
    /// following negative-integer literal.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_)
                | Self::Integer(_)
                | Self::Str(_)
                | Self::SymbolLit(_)
                | Self::RParen
                | Self::RBracket
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) => write!(f, "identifier '{s}'"),
            Self::Keyword(s) => write!(f, "keyword '{s}'"),
            Self::Operator(s) => write!(f, "operator '{s}'"),
            Self::Integer(v) => write!(f, "integer {v}"),
            Self::Str(_) => write!(f, "string literal"),
            Self::SymbolLit(s) => write!(f, "symbol #{s}"),
            Self::PoundParen => write!(f, "'#('"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::Vertical => write!(f, "'|'"),
            Self::Colon => write!(f, "':'"),
            Self::Caret => write!(f, "'^'"),
            Self::Period => write!(f, "'.'"),
            Self::Assign => write!(f, "':='"),
            Self::Separator => write!(f, "'----'"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '~' | '<' | '>' | '=' | '&' | '%' | '@' | ',' | '?' | '!')
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }
}

/// Tokenizes `source`, appending a final [`TokenKind::Eof`].
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lx = Lexer::new(source);
    let mut tokens: Vec<Token> = Vec::new();

    loop {
        // Skip whitespace and comments.
        loop {
            match lx.peek() {
                Some(c) if c.is_whitespace() => {
                    lx.bump();
                }
                Some('"') => {
                    let (line, column) = (lx.line, lx.column);
                    lx.bump();
                    loop {
                        match lx.bump() {
                            Some('"') => break,
                            Some(_) => {}
                            None => {
                                return Err(ParseError {
                                    line,
                                    column,
                                    message: "unterminated comment".to_owned(),
                                });
                            }
                        }
                    }
                }
                _ => break,
            }
        }

        let (line, column) = (lx.line, lx.column);
        let Some(c) = lx.peek() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                column,
            });
            return Ok(tokens);
        };

        let prev_ends_operand = tokens.last().is_some_and(|t| t.kind.ends_operand());

        let kind = if is_ident_start(c) {
            let mut text = String::new();
            while let Some(c) = lx.peek() {
                if is_ident_char(c) {
                    text.push(c);
                    lx.bump();
                } else {
                    break;
                }
            }
            // `name:` is a keyword token unless the colon begins `:=`.
            if lx.peek() == Some(':') {
                let mut ahead = lx.chars.clone();
                ahead.next();
                if ahead.peek() != Some(&'=') {
                    lx.bump();
                    text.push(':');
                    TokenKind::Keyword(text)
                } else {
                    TokenKind::Identifier(text)
                }
            } else {
                TokenKind::Identifier(text)
            }
        } else if c.is_ascii_digit() {
            lex_integer(&mut lx, false)?
        } else if c == '-' && !prev_ends_operand && digit_follows_minus(&mut lx) {
            lx.bump();
            lex_integer(&mut lx, true)?
        } else if is_operator_char(c) {
            let mut text = String::new();
            while let Some(c) = lx.peek() {
                if is_operator_char(c) {
                    text.push(c);
                    lx.bump();
                } else {
                    break;
                }
            }
            if text.len() >= 4 && text.bytes().all(|b| b == b'-') {
                TokenKind::Separator
            } else {
                TokenKind::Operator(text)
            }
        } else {
            match c {
                '\'' => lex_string(&mut lx)?,
                '#' => {
                    lx.bump();
                    match lx.peek() {
                        Some('(') => {
                            lx.bump();
                            TokenKind::PoundParen
                        }
                        Some(c) if is_ident_start(c) => {
                            let mut text = String::new();
                            while let Some(c) = lx.peek() {
                                if is_ident_char(c) || c == ':' {
                                    text.push(c);
                                    lx.bump();
                                } else {
                                    break;
                                }
                            }
                            TokenKind::SymbolLit(text)
                        }
                        Some(c) if is_operator_char(c) => {
                            let mut text = String::new();
                            while let Some(c) = lx.peek() {
                                if is_operator_char(c) {
                                    text.push(c);
                                    lx.bump();
                                } else {
                                    break;
                                }
                            }
                            TokenKind::SymbolLit(text)
                        }
                        _ => return Err(lx.error("expected a symbol or '(' after '#'")),
                    }
                }
                '(' => {
                    lx.bump();
                    TokenKind::LParen
                }
                ')' => {
                    lx.bump();
                    TokenKind::RParen
                }
                '[' => {
                    lx.bump();
                    TokenKind::LBracket
                }
                ']' => {
                    lx.bump();
                    TokenKind::RBracket
                }
                '|' => {
                    lx.bump();
                    TokenKind::Vertical
                }
                '^' => {
                    lx.bump();
                    TokenKind::Caret
                }
                '.' => {
                    lx.bump();
                    TokenKind::Period
                }
                ':' => {
                    lx.bump();
                    if lx.peek() == Some('=') {
                        lx.bump();
                        TokenKind::Assign
                    } else {
                        TokenKind::Colon
                    }
                }
                other => return Err(lx.error(format!("unexpected character '{other}'"))),
            }
        };

        tokens.push(Token { kind, line, column });
    }
}

fn digit_follows_minus(lx: &mut Lexer<'_>) -> bool {
    let mut ahead = lx.chars.clone();
    ahead.next();
    ahead.peek().is_some_and(char::is_ascii_digit)
}

fn lex_integer(lx: &mut Lexer<'_>, negative: bool) -> Result<TokenKind, ParseError> {
    let mut text = String::new();
    if negative {
        text.push('-');
    }
    while let Some(c) = lx.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            lx.bump();
        } else {
            break;
        }
    }
    text.parse::<i64>()
        .map(TokenKind::Integer)
        .map_err(|_| lx.error(format!("integer literal '{text}' out of range")))
}

fn lex_string(lx: &mut Lexer<'_>) -> Result<TokenKind, ParseError> {
    let (line, column) = (lx.line, lx.column);
    lx.bump();
    let mut text = String::new();
    loop {
        match lx.bump() {
            Some('\'') => return Ok(TokenKind::Str(text)),
            Some('\\') => match lx.bump() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('\'') => text.push('\''),
                Some('\\') => text.push('\\'),
                Some(other) => return Err(lx.error(format!("unknown escape '\\{other}'"))),
                None => return Err(lx.error("unterminated string literal")),
            },
            Some(c) => text.push(c),
            None => {
                return Err(ParseError {
                    line,
                    column,
                    message: "unterminated string literal".to_owned(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn idents_keywords_and_operators() {
        assert_eq!(
            kinds("x at: 1 put: y + 2"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Keyword("at:".into()),
                TokenKind::Integer(1),
                TokenKind::Keyword("put:".into()),
                TokenKind::Identifier("y".into()),
                TokenKind::Operator("+".into()),
                TokenKind::Integer(2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn assign_is_not_a_keyword() {
        assert_eq!(
            kinds("x := 3"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::Integer(3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn minus_binds_to_digits_only_in_literal_position() {
        assert_eq!(
            kinds("3 - 4"),
            vec![
                TokenKind::Integer(3),
                TokenKind::Operator("-".into()),
                TokenKind::Integer(4),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("x := -4"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::Integer(-4),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn four_dashes_separate_class_sides() {
        assert_eq!(kinds("----"), vec![TokenKind::Separator, TokenKind::Eof]);
        assert_eq!(kinds("--"), vec![TokenKind::Operator("--".into()), TokenKind::Eof]);
    }

    #[test]
    fn symbols_and_arrays() {
        assert_eq!(
            kinds("#at:put: #+ #(1 2)"),
            vec![
                TokenKind::SymbolLit("at:put:".into()),
                TokenKind::SymbolLit("+".into()),
                TokenKind::PoundParen,
                TokenKind::Integer(1),
                TokenKind::Integer(2),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds("'it\\'s\\n'"),
            vec![TokenKind::Str("it's\n".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn comments_are_skipped_and_positions_tracked() {
        let tokens = tokenize("\"note\"\n  run").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier("run".into()));
        assert_eq!((tokens[0].line, tokens[0].column), (2, 3));
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let err = tokenize("\"oops").unwrap_err();
        assert!(err.message.contains("unterminated comment"));
    }

    #[test]
    fn block_parameter_colon() {
        assert_eq!(
            kinds("[:x | x]"),
            vec![
                TokenKind::LBracket,
                TokenKind::Colon,
                TokenKind::Identifier("x".into()),
                TokenKind::Vertical,
                TokenKind::Identifier("x".into()),
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }
}
