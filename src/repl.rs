use std::io::{self, BufRead};
use tracing::{debug, warn};
use crate::ast::{Condition, Job};
use crate::error::ShellError;
use crate::executor::{ControlAction, Executor, STATUS_FAILURE};
use crate::io::LineReader;
use crate::parser::{parse_line, ParseLimits, ParsedLine};
use crate::prompt::ShellPrompt;

/// Exit code of the shell after `exit` or end of input.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code of the shell after `die`.
pub const EXIT_FAILURE: i32 = 1;

/// State carried from one line to the next.
pub struct Session<E: Executor> {
    executor: E,
    limits: ParseLimits,
    interactive: bool,
    prompt: ShellPrompt,
    last_status: i32,
    seen_command: bool,
}

impl<E: Executor> Session<E> {
    pub fn new(executor: E, limits: ParseLimits, interactive: bool) -> Self {
        Session {
            executor,
            limits,
            interactive,
            prompt: ShellPrompt::default(),
            last_status: 0,
            seen_command: false,
        }
    }

    pub fn with_prompt(mut self, prompt: ShellPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Handles one line. Returns `Some(code)` when the shell should stop.
    pub fn run_line(&mut self, line: &str) -> Option<i32> {
        let job = match parse_line(line, &self.limits) {
            Ok(ParsedLine::Empty) => return None,
            Ok(ParsedLine::Job(job)) => job,
            Err(e) => {
                self.syntax_error(e.into());
                return None;
            }
        };
        if !self.seen_command && job.condition != Condition::None {
            self.syntax_error(ShellError::ConditionalOnFirstCommand);
            return None;
        }
        self.seen_command = true;
        self.run_job(&job)
    }

    fn run_job(&mut self, job: &Job) -> Option<i32> {
        if !job.condition.should_run(self.last_status) {
            debug!(condition = ?job.condition, last_status = self.last_status, "job skipped");
            return None;
        }
        let outcome = self.executor.execute(job, self.interactive);
        self.last_status = outcome.exit_status;
        match outcome.control {
            ControlAction::Continue => None,
            ControlAction::RequestExit => Some(EXIT_SUCCESS),
            ControlAction::RequestAbort => Some(EXIT_FAILURE),
        }
    }

    fn syntax_error(&mut self, err: ShellError) {
        eprintln!("pipesh: {}", err);
        self.last_status = STATUS_FAILURE;
    }

    /// Reads and runs lines until input ends or a job asks the shell to
    /// stop. Returns the shell's exit code.
    pub fn run<R: BufRead>(&mut self, input: R) -> i32 {
        let mut reader = LineReader::new(input);
        let mut stdout = io::stdout();
        if self.interactive {
            let _ = self.prompt.show_welcome(&mut stdout);
        }
        let code = loop {
            if self.interactive {
                let _ = self.prompt.show_prompt(&mut stdout);
            }
            match reader.read_line() {
                Ok(Some(line)) => {
                    if let Some(code) = self.run_line(&line) {
                        break code;
                    }
                }
                Ok(None) => break EXIT_SUCCESS,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "failed to read input");
                    eprintln!("pipesh: read: {}", e);
                    break EXIT_SUCCESS;
                }
            }
        };
        if self.interactive {
            let _ = self.prompt.show_farewell(&mut stdout);
        }
        code
    }
}
