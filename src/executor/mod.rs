mod executor;
mod default_executor;
mod pipeline;
mod redirect;
pub mod builtin;
pub mod path_resolver;

pub use executor::{
    ControlAction, ExecError, ExecutionOutcome, Executor, STATUS_FAILURE, STATUS_NOT_FOUND,
};
pub use default_executor::JobExecutor;
pub use path_resolver::PathResolver;
