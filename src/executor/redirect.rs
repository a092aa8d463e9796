use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use nix::unistd;
use tracing::warn;
use crate::executor::ExecError;

pub const STDIN_FD: RawFd = libc::STDIN_FILENO;
pub const STDOUT_FD: RawFd = libc::STDOUT_FILENO;
pub const STDERR_FD: RawFd = libc::STDERR_FILENO;

/// rw-r-----
const OUTPUT_MODE: u32 = 0o640;

pub fn open_input(path: &str) -> Result<File, ExecError> {
    File::open(path).map_err(|source| ExecError::Redirect { path: path.to_string(), source })
}

pub fn open_output(path: &str) -> Result<File, ExecError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(OUTPUT_MODE)
        .open(path)
        .map_err(|source| ExecError::Redirect { path: path.to_string(), source })
}

/// Makes `target` refer to the same open file as `fd`.
pub fn install(fd: &impl AsRawFd, target: RawFd) -> Result<(), ExecError> {
    unistd::dup2(fd.as_raw_fd(), target).map_err(ExecError::sys("dup2"))?;
    Ok(())
}

/// Batch stdin policy: without a terminal, a stage that nobody feeds reads
/// end-of-file instead of competing for the script's input.
pub fn apply_batch_stdin(interactive: bool) -> Result<(), ExecError> {
    if interactive {
        return Ok(());
    }
    let null = open_input("/dev/null")?;
    install(&null, STDIN_FD)
}

/// Unbuffered, lock-free writer straight onto a descriptor. Safe to use in a
/// freshly forked child, and always follows whatever fd 1/2 currently point at.
#[derive(Debug, Clone, Copy)]
pub struct FdWriter(RawFd);

impl FdWriter {
    pub fn stdout() -> Self {
        FdWriter(STDOUT_FD)
    }

    pub fn stderr() -> Self {
        FdWriter(STDERR_FD)
    }
}

impl Write for FdWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            // SAFETY: `buf` is valid for `buf.len()` bytes.
            let n = unsafe { libc::write(self.0, buf.as_ptr().cast(), buf.len()) };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Temporarily points stdin/stdout of the shell itself at files.
///
/// The original descriptors are duplicated first and put back when the guard
/// is dropped, including when `redirect` fails half way through.
#[derive(Debug, Default)]
pub struct StdioGuard {
    saved_stdin: Option<OwnedFd>,
    saved_stdout: Option<OwnedFd>,
}

impl StdioGuard {
    pub fn redirect(input: Option<&str>, output: Option<&str>) -> Result<Self, ExecError> {
        let mut guard = StdioGuard::default();
        if let Some(path) = input {
            guard.saved_stdin = Some(dup_owned(STDIN_FD)?);
            let file = open_input(path)?;
            install(&file, STDIN_FD)?;
        }
        if let Some(path) = output {
            guard.saved_stdout = Some(dup_owned(STDOUT_FD)?);
            let file = open_output(path)?;
            io::stdout().flush()?;
            install(&file, STDOUT_FD)?;
        }
        Ok(guard)
    }
}

impl Drop for StdioGuard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved_stdout.take() {
            let _ = io::stdout().flush();
            if let Err(e) = install(&saved, STDOUT_FD) {
                warn!(error = %e, "failed to restore stdout");
            }
        }
        if let Some(saved) = self.saved_stdin.take() {
            if let Err(e) = install(&saved, STDIN_FD) {
                warn!(error = %e, "failed to restore stdin");
            }
        }
    }
}

fn dup_owned(fd: RawFd) -> Result<OwnedFd, ExecError> {
    let copy = unistd::dup(fd).map_err(ExecError::sys("dup"))?;
    // SAFETY: `dup` returned a fresh descriptor that nothing else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(copy) })
}
