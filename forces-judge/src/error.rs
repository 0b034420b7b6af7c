use nix::errno::Errno;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum JudgeCoreError {
    #[error("Failed to launch {program}: {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("IO Error: {0}")]
    IOError(#[from] io::Error),
    #[error("Nix Errno: {0}")]
    NixErrno(#[from] Errno),
}

impl JudgeCoreError {
    /// Launch failures belong to the single testcase being judged,
    /// every other variant is a fault of the judging environment.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, JudgeCoreError::LaunchFailed { .. })
    }
}

pub fn launch_failed(program: impl Into<String>, source: io::Error) -> JudgeCoreError {
    JudgeCoreError::LaunchFailed {
        program: program.into(),
        source,
    }
}
