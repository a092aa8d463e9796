use std::io::{self, Write};
use crate::config::Config;

/// What an interactive session prints around the commands it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellPrompt {
    prompt: String,
    welcome: String,
    farewell: String,
}

impl ShellPrompt {
    pub fn new(config: &Config) -> Self {
        ShellPrompt {
            prompt: config.prompt.clone(),
            welcome: config.welcome.clone(),
            farewell: config.farewell.clone(),
        }
    }

    pub fn show_welcome(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.welcome)?;
        out.flush()
    }

    pub fn show_prompt(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{}", self.prompt)?;
        out.flush()
    }

    pub fn show_farewell(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.farewell)?;
        out.flush()
    }
}

impl Default for ShellPrompt {
    fn default() -> Self {
        ShellPrompt::new(&Config::default())
    }
}
