use serde::Serializer;
use serde_derive::Serialize;
use std::{fmt, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub peak_bytes: u64,
    pub exceeded: bool,
}

impl MemoryUsage {
    pub fn new(peak_bytes: u64, memory_limit_bytes: u64) -> Self {
        Self {
            peak_bytes,
            exceeded: peak_bytes > memory_limit_bytes,
        }
    }
}

/// How the judged process ended. Launching failures never get here,
/// they are reported as `JudgeCoreError::LaunchFailed` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// The process terminated on its own. `memory` is `None` when the
    /// resource usage could not be read.
    Completed {
        return_code: i32,
        memory: Option<MemoryUsage>,
    },
    /// The process was killed after the time limit.
    TimedOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub outcome: ExecutionOutcome,
    #[serde(serialize_with = "serialize_seconds")]
    pub execution_time: Duration,
    pub passed: bool,
    pub reason: String,
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl ExecutionResult {
    pub fn return_code(&self) -> Option<i32> {
        match self.outcome {
            ExecutionOutcome::Completed { return_code, .. } => Some(return_code),
            ExecutionOutcome::TimedOut => None,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.outcome == ExecutionOutcome::TimedOut
    }

    /// `None` when the process timed out, since it never returned.
    pub fn runtime_error(&self) -> Option<bool> {
        self.return_code().map(|code| code != 0)
    }

    pub fn peak_memory_bytes(&self) -> Option<u64> {
        self.memory().map(|memory| memory.peak_bytes)
    }

    pub fn memory_exceeded(&self) -> Option<bool> {
        self.memory().map(|memory| memory.exceeded)
    }

    fn memory(&self) -> Option<MemoryUsage> {
        match self.outcome {
            ExecutionOutcome::Completed { memory, .. } => memory,
            ExecutionOutcome::TimedOut => None,
        }
    }

    pub fn verdict(&self) -> JudgeVerdict {
        match self.outcome {
            ExecutionOutcome::TimedOut => JudgeVerdict::TimeLimitExceeded,
            ExecutionOutcome::Completed { return_code, .. } if return_code != 0 => {
                JudgeVerdict::RuntimeError
            }
            ExecutionOutcome::Completed { .. } if self.passed => JudgeVerdict::Accepted,
            ExecutionOutcome::Completed { .. } => JudgeVerdict::WrongAnswer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JudgeVerdict {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    RuntimeError,
}

impl fmt::Display for JudgeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
