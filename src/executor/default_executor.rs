use std::path::PathBuf;
use tracing::{debug, warn};
use crate::ast::{Job, ProcessSpec};
use crate::executor::{ControlAction, ExecError, ExecutionOutcome, Executor, STATUS_FAILURE};
use super::builtin::{BuiltinContext, BuiltinManager, BuiltinOutcome, ExecMode};
use super::path_resolver::{PathResolver, DEFAULT_SEARCH_PATH};
use super::pipeline::PipelineHandler;
use super::redirect::{FdWriter, StdioGuard};

pub struct JobExecutor {
    builtins: BuiltinManager,
    resolver: PathResolver,
}

impl JobExecutor {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        let builtins = BuiltinManager::new();
        let resolver = PathResolver::new(search_dirs, builtins.names());
        debug!(dirs = ?resolver.search_dirs(), "command search path");
        JobExecutor { builtins, resolver }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// A job that mentions `die` or `exit` in any stage ends the session once
    /// it has run, even when that stage is not the one whose status counts.
    fn requested_control(job: &Job) -> ControlAction {
        let names = || job.stages.iter().map(ProcessSpec::name);
        if names().any(|name| name == "die") {
            ControlAction::RequestAbort
        } else if names().any(|name| name == "exit") {
            ControlAction::RequestExit
        } else {
            ControlAction::Continue
        }
    }

    /// Runs a lone builtin inside the shell so `cd` sticks. Redirection is
    /// undone when the guard goes out of scope.
    fn run_in_process(&self, spec: &ProcessSpec, input: Option<&str>, output: Option<&str>) -> BuiltinOutcome {
        let _guard = match StdioGuard::redirect(input, output) {
            Ok(guard) => guard,
            Err(e) => {
                report(&e);
                return BuiltinOutcome::status(STATUS_FAILURE);
            }
        };
        let mut stdout = FdWriter::stdout();
        let mut stderr = FdWriter::stderr();
        let mut ctx = BuiltinContext {
            mode: ExecMode::InProcess,
            resolver: &self.resolver,
            stdout: &mut stdout,
            stderr: &mut stderr,
        };
        match self.builtins.execute(spec.name(), spec.args(), &mut ctx) {
            Ok(outcome) => outcome,
            Err(e) => {
                report(&e);
                BuiltinOutcome::status(STATUS_FAILURE)
            }
        }
    }
}

impl Default for JobExecutor {
    fn default() -> Self {
        JobExecutor::new(DEFAULT_SEARCH_PATH.iter().map(PathBuf::from).collect())
    }
}

impl Executor for JobExecutor {
    fn execute(&mut self, job: &Job, interactive: bool) -> ExecutionOutcome {
        let requested = Self::requested_control(job);

        let lone_builtin = job
            .stages
            .first()
            .filter(|spec| !job.is_pipeline() && self.builtins.is_builtin(spec.name()));
        if let Some(spec) = lone_builtin {
            debug!(command = spec.name(), "running builtin in process");
            let outcome = self.run_in_process(spec, job.input.as_deref(), job.output.as_deref());
            let control = match outcome.control {
                ControlAction::Continue => requested,
                own => own,
            };
            return ExecutionOutcome::new(outcome.status, control);
        }

        let status = match PipelineHandler::new(&self.builtins, &self.resolver).run(job, interactive) {
            Ok(status) => status,
            Err(e) => {
                report(&e);
                STATUS_FAILURE
            }
        };
        ExecutionOutcome::new(status, requested)
    }
}

fn report(err: &ExecError) {
    warn!(error = %err, "job failed");
    eprintln!("pipesh: {}", err);
}
