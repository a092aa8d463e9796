use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::executor::path_resolver::DEFAULT_SEARCH_PATH;
use crate::parser::ParseLimits;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub welcome: String,
    pub farewell: String,
    pub limits: ParseLimits,
    pub search_path: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            prompt: "pipesh> ".to_string(),
            welcome: "Welcome to my shell!".to_string(),
            farewell: "Exiting my shell.".to_string(),
            limits: ParseLimits::default(),
            search_path: DEFAULT_SEARCH_PATH.iter().map(PathBuf::from).collect(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let src = fs::read_to_string(path)?;
        Self::load_from_str(&src)
    }

    /// Reads `key=value` lines. Blank lines and lines starting with `#` are
    /// skipped; the value is everything after the first `=`, kept verbatim so
    /// a prompt may end in a space.
    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = Self::default_config();

        for (idx, line) in src.lines().enumerate() {
            let lineno = idx + 1;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse { line: lineno, msg: format!("no '=' found: {}", line) });
            };

            match key.trim() {
                "prompt" => config.prompt = value.to_string(),
                "welcome" => config.welcome = value.to_string(),
                "farewell" => config.farewell = value.to_string(),
                "max_tokens" => config.limits.max_tokens = parse_limit(lineno, value)?,
                "max_args" => config.limits.max_args = parse_limit(lineno, value)?,
                "max_stages" => config.limits.max_stages = parse_limit(lineno, value)?,
                "search_path" => {
                    config.search_path = value
                        .trim()
                        .split(':')
                        .filter(|dir| !dir.is_empty())
                        .map(PathBuf::from)
                        .collect();
                }
                other => {
                    return Err(ConfigError::Parse { line: lineno, msg: format!("unknown key: {}", other) });
                }
            }
        }
        Ok(config)
    }
}

fn parse_limit(line: usize, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Parse { line, msg: format!("expected a positive integer: {}", value.trim()) }),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: {msg}")]
    Parse { line: usize, msg: String },
}
