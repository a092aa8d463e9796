use std::collections::HashSet;
use std::path::{Path, PathBuf};
use nix::unistd::{access, AccessFlags};
use tracing::trace;

pub const DEFAULT_SEARCH_PATH: &[&str] = &["/usr/local/bin", "/usr/bin", "/bin"];

/// Maps a command name to the executable that should run it.
#[derive(Debug, Clone)]
pub struct PathResolver {
    search_dirs: Vec<PathBuf>,
    builtins: HashSet<String>,
}

impl PathResolver {
    pub fn new<I, S>(search_dirs: Vec<PathBuf>, builtins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PathResolver {
            search_dirs,
            builtins: builtins.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Names containing `/` are used verbatim. Builtin names never resolve.
    /// Anything else is looked up in the search directories, in order.
    pub fn resolve(&self, command: &str) -> Option<PathBuf> {
        if command.contains('/') {
            return Some(PathBuf::from(command));
        }
        if command.is_empty() || self.builtins.contains(command) {
            return None;
        }

        let found = self
            .search_dirs
            .iter()
            .map(|dir| dir.join(command))
            .find(|candidate| is_executable(candidate));
        trace!(command, found = ?found, "resolved command");
        found
    }
}

fn is_executable(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}
