use serde_derive::Serialize;
use std::time::Duration;

use crate::error::JudgeCoreError;
use crate::run::{executor::Executor, StreamSource};

pub mod common;
pub mod compare;
pub mod result;

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(2);
pub const DEFAULT_MEMORY_LIMIT_BYTES: u64 = 512 * 1024 * 1024;

/// Everything needed to judge one program against one testcase.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRequest {
    pub executor: Executor,
    pub time_limit: Duration,
    pub memory_limit_bytes: u64,
    pub input: StreamSource,
    pub answer: StreamSource,
}

impl ExecutionRequest {
    /// A request with the default time and memory limits.
    pub fn new(executor: Executor, input: StreamSource, answer: StreamSource) -> Self {
        Self {
            executor,
            time_limit: DEFAULT_TIME_LIMIT,
            memory_limit_bytes: DEFAULT_MEMORY_LIMIT_BYTES,
            input,
            answer,
        }
    }

    pub fn with_limits(mut self, time_limit: Duration, memory_limit_bytes: u64) -> Self {
        self.time_limit = time_limit;
        self.memory_limit_bytes = memory_limit_bytes;
        self
    }

    pub fn validate(&self) -> Result<(), JudgeCoreError> {
        if self.time_limit.is_zero() {
            return Err(JudgeCoreError::InvalidRequest(
                "time limit must be positive".to_owned(),
            ));
        }
        if self.memory_limit_bytes == 0 {
            return Err(JudgeCoreError::InvalidRequest(
                "memory limit must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
