use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use tracing::{debug, warn};
use crate::ast::{Job, ProcessSpec};
use crate::executor::{ExecError, PathResolver, STATUS_FAILURE, STATUS_NOT_FOUND};
use crate::executor::builtin::{BuiltinContext, BuiltinManager, ExecMode};
use crate::executor::redirect::{self, FdWriter, STDIN_FD, STDOUT_FD};

/// Everything a stage needs after `fork`, computed beforehand so the child
/// does not have to allocate or search the filesystem.
struct StagePlan<'a> {
    spec: &'a ProcessSpec,
    builtin: bool,
    program: Option<CString>,
    argv: Vec<CString>,
}

impl<'a> StagePlan<'a> {
    fn prepare(spec: &'a ProcessSpec, builtins: &BuiltinManager, resolver: &PathResolver) -> Self {
        if builtins.is_builtin(spec.name()) {
            return StagePlan { spec, builtin: true, program: None, argv: Vec::new() };
        }
        // Words with an interior NUL cannot be passed to execv.
        let argv: Option<Vec<CString>> = spec
            .argv()
            .iter()
            .map(|arg| CString::new(arg.as_bytes()).ok())
            .collect();
        let program = resolver
            .resolve(spec.name())
            .and_then(|path| CString::new(path.as_os_str().as_bytes()).ok());
        match argv {
            Some(argv) => StagePlan { spec, builtin: false, program, argv },
            None => StagePlan { spec, builtin: false, program: None, argv: Vec::new() },
        }
    }
}

/// Runs every stage of a job in its own child process.
pub struct PipelineHandler<'a> {
    builtins: &'a BuiltinManager,
    resolver: &'a PathResolver,
}

impl<'a> PipelineHandler<'a> {
    pub fn new(builtins: &'a BuiltinManager, resolver: &'a PathResolver) -> Self {
        PipelineHandler { builtins, resolver }
    }

    /// Returns the exit status of the last stage.
    ///
    /// If a pipe or a fork fails, every descriptor created so far is closed and
    /// the children already started are reaped before the error is returned.
    pub fn run(&self, job: &Job, interactive: bool) -> Result<i32, ExecError> {
        let n = job.stages.len();
        let plans: Vec<StagePlan<'_>> = job
            .stages
            .iter()
            .map(|spec| StagePlan::prepare(spec, self.builtins, self.resolver))
            .collect();

        let mut pipes: Vec<(OwnedFd, OwnedFd)> = Vec::with_capacity(n.saturating_sub(1));
        for _ in 1..n {
            pipes.push(unistd::pipe().map_err(ExecError::sys("pipe"))?);
        }

        // Children must not inherit (and later repeat) anything still buffered.
        io::stdout().flush()?;

        let mut children: Vec<Pid> = Vec::with_capacity(n);
        for (i, plan) in plans.iter().enumerate() {
            // SAFETY: the child only rewires descriptors, then execs or runs a
            // builtin and leaves through `_exit`.
            match unsafe { unistd::fork() } {
                Ok(ForkResult::Child) => self.run_stage(i, plan, job, &pipes, interactive),
                Ok(ForkResult::Parent { child }) => {
                    debug!(stage = i, pid = child.as_raw(), command = plan.spec.name(), "forked stage");
                    children.push(child);
                }
                Err(e) => {
                    drop(pipes);
                    for pid in children {
                        wait_for(pid);
                    }
                    return Err(ExecError::Sys { call: "fork", source: e });
                }
            }
        }

        // Readers only see end-of-file once every write end is closed here.
        drop(pipes);

        let mut status = STATUS_FAILURE;
        for (i, pid) in children.into_iter().enumerate() {
            let stage_status = wait_for(pid);
            debug!(stage = i, pid = pid.as_raw(), status = stage_status, "stage finished");
            if i == n - 1 {
                status = stage_status;
            }
        }
        Ok(status)
    }

    fn run_stage(
        &self,
        i: usize,
        plan: &StagePlan<'_>,
        job: &Job,
        pipes: &[(OwnedFd, OwnedFd)],
        interactive: bool,
    ) -> ! {
        let mut stderr = FdWriter::stderr();
        // The shell ignores SIGPIPE, and an ignored disposition survives
        // exec. A producer behind a closed pipe has to die from it.
        // SAFETY: SIG_DFL installs no handler code.
        if let Err(e) = unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
            let _ = writeln!(stderr, "pipesh: signal: {}", e);
        }
        let status = match wire_stage(i, job, pipes, interactive) {
            Ok(()) => self.exec_stage(plan, &mut stderr),
            Err(e) => {
                let _ = writeln!(stderr, "pipesh: {}", e);
                STATUS_FAILURE
            }
        };
        // SAFETY: terminates the forked child without running the parent's
        // destructors or atexit handlers a second time.
        unsafe { libc::_exit(status) }
    }

    fn exec_stage(&self, plan: &StagePlan<'_>, stderr: &mut FdWriter) -> i32 {
        let name = plan.spec.name();
        if plan.builtin {
            let mut stdout = FdWriter::stdout();
            let mut ctx = BuiltinContext {
                mode: ExecMode::Child,
                resolver: self.resolver,
                stdout: &mut stdout,
                stderr,
            };
            // Exit/abort requests stay inside this child.
            return match self.builtins.execute(name, plan.spec.args(), &mut ctx) {
                Ok(outcome) => outcome.status,
                Err(e) => {
                    let _ = writeln!(FdWriter::stderr(), "pipesh: {}", e);
                    STATUS_FAILURE
                }
            };
        }

        let Some(program) = &plan.program else {
            let _ = writeln!(stderr, "{}: command not found", name);
            return STATUS_NOT_FOUND;
        };
        let err = match unistd::execv(program, &plan.argv) {
            Ok(never) => match never {},
            Err(err) => err,
        };
        let _ = writeln!(stderr, "{}: {}", name, err.desc());
        STATUS_NOT_FOUND
    }
}

/// Child side: batch stdin first, then explicit redirection or pipe ends,
/// then every pipe descriptor closed.
fn wire_stage(
    i: usize,
    job: &Job,
    pipes: &[(OwnedFd, OwnedFd)],
    interactive: bool,
) -> Result<(), ExecError> {
    let n = job.stages.len();
    redirect::apply_batch_stdin(interactive)?;

    if let Some(path) = job.input.as_deref() {
        let file = redirect::open_input(path)?;
        redirect::install(&file, STDIN_FD)?;
    }
    if let Some(path) = job.output.as_deref() {
        let file = redirect::open_output(path)?;
        redirect::install(&file, STDOUT_FD)?;
    }
    if i > 0 {
        redirect::install(&pipes[i - 1].0, STDIN_FD)?;
    }
    if i + 1 < n {
        redirect::install(&pipes[i].1, STDOUT_FD)?;
    }

    for (read, write) in pipes {
        let _ = unistd::close(read.as_raw_fd());
        let _ = unistd::close(write.as_raw_fd());
    }
    Ok(())
}

/// Blocks until `pid` terminates. Death by signal counts as plain failure.
fn wait_for(pid: Pid) -> i32 {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return code,
            Ok(WaitStatus::Signaled(_, sig, _)) => {
                debug!(pid = pid.as_raw(), signal = ?sig, "stage killed by signal");
                return STATUS_FAILURE;
            }
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(e) => {
                warn!(pid = pid.as_raw(), error = %e, "waitpid failed");
                return STATUS_FAILURE;
            }
        }
    }
}
