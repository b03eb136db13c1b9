//! Token cursor over shader description text.
//!
//! Words are runs of non-whitespace characters that are not `{`, `}` or `:`,
//! so an array declaration such as `bones[16]` arrives as a single word and is
//! split later by the parser. Reading a token always succeeds (end of input is
//! `Token::Eof`); the `expect_*` primitives return a `Result` and leave no
//! sticky failure state behind, so the caller simply stops on the first `Err`.
use std::fmt;

use thiserror::Error;

/// 1-based position inside the grammar text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'s> {
    Word(&'s str),
    LBrace,
    RBrace,
    Colon,
    Eof,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => write!(f, "'{word}'"),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::Colon => f.write_str("':'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned<'s> {
    pub token: Token<'s>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        location: Location,
    },
    #[error("missing closing '}}' for block opened at {opened}")]
    UnterminatedBody { opened: Location },
}

impl ScanError {
    pub fn location(&self) -> Location {
        match self {
            ScanError::Expected { location, .. } => *location,
            ScanError::UnterminatedBody { opened } => *opened,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scanner<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'s> Scanner<'s> {
    pub fn new(src: &'s str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn location(&self) -> Location {
        Location {
            line: self.line,
            col: self.col,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        // A lone '\r' ends a line too; in "\r\n" the '\n' does.
        if ch == '\n' || (ch == '\r' && self.peek_char() != Some('\n')) {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// True once only whitespace remains.
    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.src.len()
    }

    pub fn next_token(&mut self) -> Spanned<'s> {
        self.skip_whitespace();
        let location = self.location();
        let token = match self.peek_char() {
            None => Token::Eof,
            Some('{') => {
                self.advance();
                Token::LBrace
            }
            Some('}') => {
                self.advance();
                Token::RBrace
            }
            Some(':') => {
                self.advance();
                Token::Colon
            }
            Some(_) => {
                let start = self.pos;
                while matches!(self.peek_char(), Some(c) if !c.is_whitespace() && !is_punct(c)) {
                    self.advance();
                }
                Token::Word(&self.src[start..self.pos])
            }
        };
        Spanned { token, location }
    }

    /// Looks at the next token without consuming it.
    pub fn peek_token(&self) -> Spanned<'s> {
        self.clone().next_token()
    }

    /// Consumes the next non-whitespace character when it equals `expected`.
    pub fn expect_char(&mut self, expected: char) -> Result<(), ScanError> {
        self.skip_whitespace();
        let location = self.location();
        match self.peek_char() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            other => Err(ScanError::Expected {
                expected: format!("'{expected}'"),
                found: describe_char(other),
                location,
            }),
        }
    }

    /// Consumes the next word when it is exactly `keyword`.
    pub fn expect_keyword(&mut self, keyword: &str) -> Result<(), ScanError> {
        let next = self.peek_token();
        match next.token {
            Token::Word(word) if word == keyword => {
                self.next_token();
                Ok(())
            }
            other => Err(ScanError::Expected {
                expected: format!("'{keyword}'"),
                found: other.to_string(),
                location: next.location,
            }),
        }
    }

    /// Consumes the next token, which must be a word.
    pub fn expect_word(&mut self, what: &str) -> Result<(&'s str, Location), ScanError> {
        let next = self.next_token();
        match next.token {
            Token::Word(word) => Ok((word, next.location)),
            other => Err(ScanError::Expected {
                expected: what.to_string(),
                found: other.to_string(),
                location: next.location,
            }),
        }
    }

    /// Copies everything up to the first `}` verbatim, consuming the brace.
    ///
    /// Line endings are normalised to `\n`. Nested braces are not tracked.
    pub fn read_raw_body(&mut self, opened: Location) -> Result<String, ScanError> {
        let mut body = String::new();
        loop {
            match self.advance() {
                None => return Err(ScanError::UnterminatedBody { opened }),
                Some('}') => return Ok(body),
                Some('\r') => {
                    if self.peek_char() == Some('\n') {
                        self.advance();
                    }
                    body.push('\n');
                }
                Some(c) => body.push(c),
            }
        }
    }
}

fn is_punct(c: char) -> bool {
    matches!(c, '{' | '}' | ':')
}

fn describe_char(ch: Option<char>) -> String {
    match ch {
        Some(c) => format!("{c:?}"),
        None => "end of input".to_string(),
    }
}
