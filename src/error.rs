use std::io;
use thiserror::Error;
use crate::config::ConfigError;
use crate::lexer::LexError;
use crate::parser::ParseError;

/// Errors that can stop the shell before or outside a single job.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{path}: {source}")]
    Script {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),
    #[error("syntax error: conditional cannot appear on first command")]
    ConditionalOnFirstCommand,
}

impl From<LexError> for ShellError {
    fn from(e: LexError) -> Self {
        ShellError::Parse(ParseError::Lex(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_is_a_syntax_error() {
        let err: ShellError = LexError::TooManyTokens { limit: 3 }.into();
        assert_eq!(err.to_string(), "syntax error: too many tokens (limit is 3)");
    }

    #[test]
    fn test_config_error_converts() {
        let err: ShellError = ConfigError::Parse { line: 4, msg: "unknown key: x".to_string() }.into();
        assert_eq!(err.to_string(), "config: line 4: unknown key: x");
    }

    #[test]
    fn test_script_error_names_path() {
        let err = ShellError::Script {
            path: "run.sh".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "run.sh: not found");
    }
}
