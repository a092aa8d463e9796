use tracing::debug;
use crate::ast::{Condition, Job, ProcessSpec, RedirectKind};
use crate::lexer::{Token, TokenKind};
use crate::parser::{ParseError, ParseLimits, ParsedLine, Parser};

/// Single-pass parser turning a token stream into a [`Job`].
///
/// Partially built stages live in locals owned by `parse`, so an early error
/// return releases them without any cleanup code.
pub struct JobParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    limits: ParseLimits,
}

impl<'a> JobParser<'a> {
    pub fn new(tokens: &'a [Token], limits: ParseLimits) -> Self {
        Self { tokens, pos: 0, limits }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_condition(&mut self) -> Condition {
        let condition = self
            .peek()
            .filter(|t| t.kind == TokenKind::Word)
            .and_then(|t| Condition::from_word(&t.lexeme))
            .unwrap_or_default();
        if condition != Condition::None {
            self.pos += 1;
        }
        condition
    }

    // The token after `<` / `>` is taken as the file name whatever its kind.
    fn expect_target(&mut self, op: char) -> Result<String, ParseError> {
        match self.next() {
            Some(tok) => Ok(tok.lexeme.clone()),
            None => Err(ParseError::MissingRedirectTarget { op }),
        }
    }
}

impl<'a> Parser for JobParser<'a> {
    fn parse(&mut self) -> Result<ParsedLine, ParseError> {
        if self.tokens.is_empty() {
            return Ok(ParsedLine::Empty);
        }

        let condition = self.parse_condition();
        if condition != Condition::None && self.peek().is_none() {
            return Err(ParseError::ConditionalWithoutCommand);
        }

        let mut stages: Vec<ProcessSpec> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut input = None;
        let mut output = None;

        while let Some(tok) = self.next() {
            match tok.kind {
                TokenKind::Pipe => {
                    let Some(stage) = ProcessSpec::new(std::mem::take(&mut current)) else {
                        return Err(ParseError::EmptyCommandBeforePipe);
                    };
                    if stages.len() + 2 > self.limits.max_stages {
                        return Err(ParseError::TooManyStages { limit: self.limits.max_stages });
                    }
                    stages.push(stage);
                }
                TokenKind::RedirectIn | TokenKind::RedirectOut => {
                    let (kind, op, slot) = if tok.kind == TokenKind::RedirectIn {
                        (RedirectKind::In, '<', &mut input)
                    } else {
                        (RedirectKind::Out, '>', &mut output)
                    };
                    let target = self.expect_target(op)?;
                    if slot.is_some() {
                        return Err(match kind {
                            RedirectKind::In => ParseError::MultipleInputRedirections,
                            RedirectKind::Out => ParseError::MultipleOutputRedirections,
                        });
                    }
                    *slot = Some(target);
                }
                TokenKind::Word => {
                    if current.is_empty()
                        && !stages.is_empty()
                        && Condition::from_word(&tok.lexeme).is_some()
                    {
                        return Err(ParseError::ConditionalAfterPipe);
                    }
                    if current.len() == self.limits.max_args {
                        return Err(ParseError::TooManyArguments { limit: self.limits.max_args });
                    }
                    current.push(tok.lexeme.clone());
                }
            }
        }

        let Some(last) = ProcessSpec::new(current) else {
            return Err(ParseError::EmptyCommandAtEnd);
        };
        stages.push(last);

        if stages.len() > 1 && (input.is_some() || output.is_some()) {
            return Err(ParseError::RedirectionInPipeline);
        }

        let job = Job { stages, input, output, condition };
        debug!(stages = job.stages.len(), condition = ?job.condition, "parsed job");
        Ok(ParsedLine::Job(job))
    }
}
