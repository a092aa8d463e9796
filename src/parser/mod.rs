pub mod default;

use thiserror::Error;
use crate::ast::Job;
use crate::lexer::{Lexer, LexError, DEFAULT_MAX_TOKENS};

pub use default::JobParser;

pub const DEFAULT_MAX_ARGS: usize = 64;
pub const DEFAULT_MAX_STAGES: usize = 64;

pub trait Parser {
    fn parse(&mut self) -> Result<ParsedLine, ParseError>;
}

/// Result of parsing one line that is not a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Blank or comment-only line.
    Empty,
    Job(Job),
}

/// Size bounds enforced while parsing. Exceeding any of them is a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_tokens: usize,
    pub max_args: usize,
    pub max_stages: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        ParseLimits {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_args: DEFAULT_MAX_ARGS,
            max_stages: DEFAULT_MAX_STAGES,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("conditional must be followed by a command")]
    ConditionalWithoutCommand,
    #[error("conditionals may not appear after a pipe")]
    ConditionalAfterPipe,
    #[error("empty command before pipe '|'")]
    EmptyCommandBeforePipe,
    #[error("empty command at end of line")]
    EmptyCommandAtEnd,
    #[error("too many commands in pipeline (limit is {limit})")]
    TooManyStages { limit: usize },
    #[error("too many arguments for command (limit is {limit})")]
    TooManyArguments { limit: usize },
    #[error("redirection '{op}' requires a filename")]
    MissingRedirectTarget { op: char },
    #[error("multiple input redirections")]
    MultipleInputRedirections,
    #[error("multiple output redirections")]
    MultipleOutputRedirections,
    #[error("redirection cannot be combined with a pipeline")]
    RedirectionInPipeline,
}

/// Tokenizes and parses a single line.
pub fn parse_line(line: &str, limits: &ParseLimits) -> Result<ParsedLine, ParseError> {
    let tokens = Lexer::tokenize(line, limits.max_tokens)?;
    JobParser::new(&tokens, *limits).parse()
}
