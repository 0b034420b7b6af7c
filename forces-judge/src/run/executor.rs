use serde_derive::Serialize;
use std::{
    fmt,
    path::{Path, PathBuf},
    process::Command,
};

const SHELL_PATH: &str = "/bin/sh";

/// What to launch for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Executor {
    /// Invoked directly, the path is never interpreted by a shell.
    Program(PathBuf),
    /// A command line handed to `/bin/sh -c`.
    Shell(String),
}

impl Executor {
    pub fn program(path: impl Into<PathBuf>) -> Self {
        Executor::Program(path.into())
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Executor::Shell(command.into())
    }

    pub fn is_shell(&self) -> bool {
        matches!(self, Executor::Shell(_))
    }

    pub fn build_command(&self) -> Command {
        match self {
            Executor::Program(path) => Command::new(program_path(path)),
            Executor::Shell(command) => {
                let mut cmd = Command::new(SHELL_PATH);
                cmd.arg("-c").arg(command);
                cmd
            }
        }
    }
}

impl fmt::Display for Executor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Executor::Program(path) => write!(f, "{}", path.display()),
            Executor::Shell(command) => write!(f, "sh -c {:?}", command),
        }
    }
}

// `Command::new("a")` would search PATH, the judged binary lives in the
// working directory instead.
fn program_path(path: &Path) -> PathBuf {
    if path.is_relative() && path.components().count() == 1 {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}
