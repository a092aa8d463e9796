pub mod token;

use thiserror::Error;
use tracing::trace;

pub use token::{Token, TokenKind};

/// Upper bound on tokens per line unless configured otherwise.
pub const DEFAULT_MAX_TOKENS: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LexError {
    #[error("too many tokens (limit is {limit})")]
    TooManyTokens { limit: usize },
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Splits a whole line into tokens.
    ///
    /// Scanning stops at the first `#`; the rest of the line is a comment.
    /// A line producing more than `max_tokens` tokens is rejected rather than
    /// truncated.
    pub fn tokenize(line: &str, max_tokens: usize) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(line);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token() {
            if tokens.len() == max_tokens {
                return Err(LexError::TooManyTokens { limit: max_tokens });
            }
            tokens.push(token);
        }
        trace!(count = tokens.len(), "tokenized line");
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Option<Token> {
        let bytes = self.input.as_bytes();

        while self.pos < bytes.len() && is_space(bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos >= bytes.len() || bytes[self.pos] == b'#' {
            // Comment: nothing after it is ever looked at again.
            self.pos = bytes.len();
            return None;
        }

        let start = self.pos;
        let kind = match bytes[start] {
            b'|' => Some(TokenKind::Pipe),
            b'<' => Some(TokenKind::RedirectIn),
            b'>' => Some(TokenKind::RedirectOut),
            _ => None,
        };
        if let Some(kind) = kind {
            self.pos += 1;
            return Some(Token {
                kind,
                lexeme: self.input[start..self.pos].to_string(),
                span: (start, self.pos),
            });
        }

        while self.pos < bytes.len() && !is_word_boundary(bytes[self.pos]) {
            self.pos += 1;
        }
        Some(Token {
            kind: TokenKind::Word,
            lexeme: self.input[start..self.pos].to_string(),
            span: (start, self.pos),
        })
    }
}

/// Like `is_ascii_whitespace`, plus vertical tab.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

// All boundaries are ASCII, so slicing at them never splits a UTF-8 sequence.
fn is_word_boundary(b: u8) -> bool {
    is_space(b) || matches!(b, b'|' | b'<' | b'>' | b'#')
}
