use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use pipesh::config::{Config, ConfigLoader};
use pipesh::error::ShellError;
use pipesh::executor::JobExecutor;
use pipesh::prompt::ShellPrompt;
use pipesh::repl::Session;

/// pipesh - a small shell for pipelines and redirection
#[derive(Parser, Debug)]
#[command(name = "pipesh")]
#[command(version, about, long_about = None)]
struct Args {
    /// Read settings from a key=value file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run commands from this file instead of standard input
    #[arg()]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(args) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("pipesh: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr and stay off unless `PIPESH_LOG` asks for them.
fn init_logging() {
    let filter = EnvFilter::try_from_env("PIPESH_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<i32, ShellError> {
    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => Config::default(),
    };
    let executor = JobExecutor::new(config.search_path.clone());
    let prompt = ShellPrompt::new(&config);

    match args.script {
        Some(path) => {
            let file = File::open(&path).map_err(|source| ShellError::Script {
                path: path.display().to_string(),
                source,
            })?;
            let mut session = Session::new(executor, config.limits, false).with_prompt(prompt);
            Ok(session.run(BufReader::new(file)))
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            let mut session = Session::new(executor, config.limits, interactive).with_prompt(prompt);
            Ok(session.run(stdin.lock()))
        }
    }
}
