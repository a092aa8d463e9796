use std::env;
use std::io::Write;
use tracing::debug;
use crate::executor::{ControlAction, STATUS_FAILURE};
use crate::executor::builtin::manager::{BuiltinCommand, BuiltinContext, BuiltinOutcome, ExecMode};

pub struct CdCommand;

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }
    fn run(&self, args: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        let [target] = args else {
            let _ = writeln!(ctx.stderr, "cd: expected 1 argument");
            return BuiltinOutcome::status(STATUS_FAILURE);
        };
        if ctx.mode == ExecMode::Child {
            debug!(target = %target, "cd inside a pipeline only affects that stage");
        }
        match env::set_current_dir(target) {
            Ok(_) => BuiltinOutcome::status(0),
            Err(e) => {
                let _ = writeln!(ctx.stderr, "cd: {}: {}", target, e);
                BuiltinOutcome::status(STATUS_FAILURE)
            }
        }
    }
}

pub struct PwdCommand;

impl BuiltinCommand for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }
    fn run(&self, args: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        if !args.is_empty() {
            let _ = writeln!(ctx.stderr, "pwd: too many arguments");
            return BuiltinOutcome::status(STATUS_FAILURE);
        }
        let cwd = match env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                let _ = writeln!(ctx.stderr, "pwd: {}", e);
                return BuiltinOutcome::status(STATUS_FAILURE);
            }
        };
        match writeln!(ctx.stdout, "{}", cwd.display()) {
            Ok(_) => BuiltinOutcome::status(0),
            Err(_) => BuiltinOutcome::status(STATUS_FAILURE),
        }
    }
}

/// Prints where an external command lives. Silent on every failure.
pub struct WhichCommand;

impl BuiltinCommand for WhichCommand {
    fn name(&self) -> &'static str {
        "which"
    }
    fn run(&self, args: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        let [name] = args else {
            return BuiltinOutcome::status(STATUS_FAILURE);
        };
        // The resolver refuses builtin names on its own.
        let Some(path) = ctx.resolver.resolve(name) else {
            return BuiltinOutcome::status(STATUS_FAILURE);
        };
        match writeln!(ctx.stdout, "{}", path.display()) {
            Ok(_) => BuiltinOutcome::status(0),
            Err(_) => BuiltinOutcome::status(STATUS_FAILURE),
        }
    }
}

pub struct ExitCommand;

impl BuiltinCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }
    fn run(&self, _args: &[String], _ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        BuiltinOutcome { status: 0, control: ControlAction::RequestExit }
    }
}

pub struct DieCommand;

impl BuiltinCommand for DieCommand {
    fn name(&self) -> &'static str {
        "die"
    }
    fn run(&self, args: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        if !args.is_empty() {
            let _ = writeln!(ctx.stderr, "{}", args.join(" "));
        }
        BuiltinOutcome { status: STATUS_FAILURE, control: ControlAction::RequestAbort }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::PathResolver;
    use crate::executor::builtin::BuiltinManager;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    struct Captured {
        outcome: BuiltinOutcome,
        stdout: String,
        stderr: String,
    }

    fn run_with(resolver: &PathResolver, mode: ExecMode, name: &str, args: &[&str]) -> Captured {
        let mgr = BuiltinManager::new();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let outcome = {
            let mut ctx = BuiltinContext {
                mode,
                resolver,
                stdout: &mut out,
                stderr: &mut err,
            };
            mgr.execute(name, &args, &mut ctx).unwrap()
        };
        Captured {
            outcome,
            stdout: String::from_utf8(out).unwrap(),
            stderr: String::from_utf8(err).unwrap(),
        }
    }

    fn run(name: &str, args: &[&str]) -> Captured {
        let resolver = PathResolver::new(vec![], BuiltinManager::new().names());
        run_with(&resolver, ExecMode::InProcess, name, args)
    }

    #[test]
    fn test_die_with_arguments() {
        let c = run("die", &["a", "b"]);
        assert_eq!(c.stderr, "a b\n");
        assert_eq!(c.stdout, "");
        assert_ne!(c.outcome.status, 0);
        assert_eq!(c.outcome.control, ControlAction::RequestAbort);
    }

    #[test]
    fn test_die_without_arguments() {
        let c = run("die", &[]);
        assert_eq!(c.stderr, "");
        assert_ne!(c.outcome.status, 0);
        assert_eq!(c.outcome.control, ControlAction::RequestAbort);
    }

    #[test]
    fn test_exit_ignores_arguments() {
        for args in [&[][..], &["3"][..], &["a", "b"][..]] {
            let c = run("exit", args);
            assert_eq!(c.outcome, BuiltinOutcome { status: 0, control: ControlAction::RequestExit });
            assert_eq!(c.stdout, "");
            assert_eq!(c.stderr, "");
        }
    }

    #[test]
    fn test_which_builtin_names_fail_silently() {
        let dir = TempDir::new().unwrap();
        for name in ["cd", "pwd", "which", "exit", "die"] {
            // Even an executable with that name on the search path is ignored.
            let path = dir.path().join(name);
            fs::write(&path, "").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        let resolver = PathResolver::new(vec![dir.path().to_path_buf()], BuiltinManager::new().names());
        for name in ["cd", "pwd", "which", "exit", "die"] {
            let c = run_with(&resolver, ExecMode::InProcess, "which", &[name]);
            assert_ne!(c.outcome.status, 0, "which {}", name);
            assert_eq!(c.stdout, "");
            assert_eq!(c.stderr, "");
        }
    }

    #[test]
    fn test_which_prints_resolved_path() {
        let resolver = PathResolver::new(vec![], BuiltinManager::new().names());
        let c = run_with(&resolver, ExecMode::InProcess, "which", &["/bin/sh"]);
        assert_eq!(c.outcome.status, 0);
        assert_eq!(c.stdout, "/bin/sh\n");
    }

    #[test]
    fn test_which_wrong_arity_and_unknown() {
        assert_ne!(run("which", &[]).outcome.status, 0);
        assert_ne!(run("which", &["a", "b"]).outcome.status, 0);
        let c = run("which", &["no-such-program-anywhere"]);
        assert_ne!(c.outcome.status, 0);
        assert_eq!(c.stdout, "");
    }

    #[test]
    #[serial]
    fn test_pwd_prints_cwd() {
        let c = run("pwd", &[]);
        assert_eq!(c.outcome.status, 0);
        assert_eq!(c.stdout, format!("{}\n", env::current_dir().unwrap().display()));
        assert_ne!(run("pwd", &["extra"]).outcome.status, 0);
    }

    #[test]
    #[serial]
    fn test_cd_changes_directory() {
        let original = env::current_dir().unwrap();
        let dir = TempDir::new().unwrap();
        let target = dir.path().canonicalize().unwrap();

        let c = run("cd", &[target.to_str().unwrap()]);
        assert_eq!(c.outcome.status, 0);
        assert_eq!(env::current_dir().unwrap(), target);

        env::set_current_dir(original).unwrap();
    }

    #[test]
    #[serial]
    fn test_cd_failures() {
        let original = env::current_dir().unwrap();
        assert_ne!(run("cd", &[]).outcome.status, 0);
        assert_ne!(run("cd", &["/tmp", "/"]).outcome.status, 0);
        let c = run("cd", &["/no/such/directory"]);
        assert_ne!(c.outcome.status, 0);
        assert!(c.stderr.starts_with("cd: /no/such/directory:"));
        assert_eq!(env::current_dir().unwrap(), original);
    }
}
