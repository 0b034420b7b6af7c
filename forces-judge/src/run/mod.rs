use serde_derive::Serialize;
use std::{fs, io, path::PathBuf, time::Instant};

use crate::error::JudgeCoreError;

pub mod executor;
pub mod sandbox;

use executor::Executor;

/// A byte stream read from disk or held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StreamSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl StreamSource {
    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match self {
            StreamSource::File(path) => fs::read(path),
            StreamSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }

    pub fn read_text(&self) -> io::Result<String> {
        Ok(String::from_utf8_lossy(&self.read_bytes()?).into_owned())
    }
}

impl From<&str> for StreamSource {
    fn from(text: &str) -> Self {
        StreamSource::Bytes(text.as_bytes().to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Exited(i32),
    Signaled(i32),
}

impl ExitStatus {
    /// Signal deaths are reported as the negated signal number.
    pub fn return_code(&self) -> i32 {
        match *self {
            ExitStatus::Exited(code) => code,
            ExitStatus::Signaled(signal) => -signal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Platform hooks the judge needs to supervise one child process.
pub trait Supervisor {
    type Process;

    /// Launch the executor with `input` on its stdin, stdout and stderr captured.
    fn spawn(&self, executor: &Executor, input: &StreamSource)
        -> Result<Self::Process, JudgeCoreError>;

    /// Block until the process terminates or `deadline` passes.
    /// Returns `None` if the deadline passed first.
    fn wait_until(
        &self,
        process: &mut Self::Process,
        deadline: Instant,
    ) -> Result<Option<ExitStatus>, JudgeCoreError>;

    /// Forcibly terminate the process and whatever it spawned.
    fn kill(&self, process: &mut Self::Process) -> Result<(), JudgeCoreError>;

    /// Peak resident memory in bytes of a terminated process and its
    /// terminated children, if the platform reported one.
    fn peak_memory_of(&self, process: &Self::Process) -> Option<u64>;

    /// Collect everything the process wrote, once it has terminated.
    /// Returns `None` if its pipes were still open when `deadline` passed.
    fn take_output(
        &self,
        process: Self::Process,
        deadline: Instant,
    ) -> Result<Option<CapturedOutput>, JudgeCoreError>;
}
