use std::collections::HashMap;
use std::io::Write;
use crate::executor::{ControlAction, ExecError, PathResolver};
use crate::executor::builtin::commands::{
    CdCommand,
    DieCommand,
    ExitCommand,
    PwdCommand,
    WhichCommand,
};

/// Where a builtin is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Inside the shell process itself; side effects persist.
    InProcess,
    /// Inside a forked pipeline stage; side effects die with the child.
    Child,
}

pub struct BuiltinContext<'a> {
    pub mode: ExecMode,
    pub resolver: &'a PathResolver,
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinOutcome {
    pub status: i32,
    pub control: ControlAction,
}

impl BuiltinOutcome {
    pub fn status(status: i32) -> Self {
        BuiltinOutcome { status, control: ControlAction::Continue }
    }
}

pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    /// `args` excludes the command name.
    fn run(&self, args: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome;
}

pub struct BuiltinManager {
    commands: HashMap<String, Box<dyn BuiltinCommand>>,
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
        };
        mgr.register(Box::new(CdCommand {}));
        mgr.register(Box::new(PwdCommand {}));
        mgr.register(Box::new(WhichCommand {}));
        mgr.register(Box::new(ExitCommand {}));
        mgr.register(Box::new(DieCommand {}));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn execute(
        &self,
        name: &str,
        args: &[String],
        ctx: &mut BuiltinContext<'_>,
    ) -> Result<BuiltinOutcome, ExecError> {
        let cmd = self
            .commands
            .get(name)
            .ok_or_else(|| ExecError::NoSuchBuiltin(name.to_string()))?;
        let outcome = cmd.run(args, ctx);
        // Nothing buffered may outlive a redirection or a child's _exit.
        let _ = ctx.stdout.flush();
        let _ = ctx.stderr.flush();
        Ok(outcome)
    }
}

impl Default for BuiltinManager {
    fn default() -> Self {
        Self::new()
    }
}
