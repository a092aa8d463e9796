use std::io;
use thiserror::Error;
use crate::ast::Job;

/// Exit status of a stage whose command could not be found or executed.
pub const STATUS_NOT_FOUND: i32 = 127;
/// Generic failure status.
pub const STATUS_FAILURE: i32 = 1;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{call}: {source}")]
    Sys {
        call: &'static str,
        #[source]
        source: nix::Error,
    },
    #[error("no such builtin command: {0}")]
    NoSuchBuiltin(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ExecError {
    pub fn sys(call: &'static str) -> impl FnOnce(nix::Error) -> ExecError {
        move |source| ExecError::Sys { call, source }
    }
}

/// What the session should do once a job has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlAction {
    #[default]
    Continue,
    RequestExit,
    RequestAbort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub exit_status: i32,
    pub control: ControlAction,
}

impl ExecutionOutcome {
    pub fn new(exit_status: i32, control: ControlAction) -> Self {
        ExecutionOutcome { exit_status, control }
    }

    #[cfg(test)]
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

pub trait Executor {
    /// Runs `job` to completion. `interactive` tells whether the session's
    /// input comes from a terminal.
    fn execute(&mut self, job: &Job, interactive: bool) -> ExecutionOutcome;
}
