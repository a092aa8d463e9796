mod commands;
mod manager;

pub use commands::{CdCommand, DieCommand, ExitCommand, PwdCommand, WhichCommand};
pub use manager::{BuiltinCommand, BuiltinContext, BuiltinManager, BuiltinOutcome, ExecMode};
