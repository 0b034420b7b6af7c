use std::time::{Duration, Instant};

use super::compare::compare_output;
use super::result::{ExecutionOutcome, ExecutionResult, MemoryUsage};
use super::ExecutionRequest;
use crate::error::JudgeCoreError;
use crate::run::{sandbox::NativeSupervisor, CapturedOutput, Supervisor};

/// Runs one program against one testcase and classifies the run.
#[derive(Debug, Clone, Default)]
pub struct Judge<S = NativeSupervisor> {
    supervisor: S,
}

impl Judge<NativeSupervisor> {
    pub fn native() -> Self {
        Self::new(NativeSupervisor)
    }
}

impl<S: Supervisor> Judge<S> {
    pub fn new(supervisor: S) -> Self {
        Self { supervisor }
    }

    pub fn supervisor(&self) -> &S {
        &self.supervisor
    }

    /// Timeouts, runtime errors and wrong answers all come back as an
    /// `ExecutionResult`. Errors are reserved for a program that could not be
    /// launched and for faults of the environment itself.
    pub fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, JudgeCoreError> {
        request.validate()?;

        let begin_time = Instant::now();
        log::debug!("Spawning {}", request.executor);
        let mut process = self.supervisor.spawn(&request.executor, &request.input)?;

        log::debug!("Waiting with time limit {:?}", request.time_limit);
        let deadline = begin_time + request.time_limit;
        let exit_status = match self.supervisor.wait_until(&mut process, deadline)? {
            Some(exit_status) => exit_status,
            None => {
                self.supervisor.kill(&mut process)?;
                let execution_time = begin_time.elapsed();
                log::info!("{} exceeded the time limit", request.executor);
                return Ok(time_limit_exceeded(execution_time));
            }
        };
        let execution_time = begin_time.elapsed();

        let memory = self
            .supervisor
            .peak_memory_of(&process)
            .map(|peak_bytes| MemoryUsage::new(peak_bytes, request.memory_limit_bytes));
        if memory.is_none() {
            log::warn!("Peak memory of {} is unknown", request.executor);
        }
        let output = match self.supervisor.take_output(process, deadline)? {
            Some(output) => output,
            None => {
                let execution_time = begin_time.elapsed();
                log::info!("{} held its output open past the time limit", request.executor);
                return Ok(time_limit_exceeded(execution_time));
            }
        };

        let return_code = exit_status.return_code();
        if return_code != 0 {
            log::info!("{} exited with code {}", request.executor, return_code);
            return Ok(runtime_error(return_code, memory, execution_time, &output));
        }

        let answer = request.answer.read_text()?;
        let comparison = compare_output(&output.stdout_text(), &answer);
        if let Some(memory) = memory.filter(|memory| memory.exceeded) {
            log::warn!(
                "{} used {} bytes, over the limit of {} bytes",
                request.executor,
                memory.peak_bytes,
                request.memory_limit_bytes
            );
        }
        log::info!("{} finished: {}", request.executor, comparison.reason);

        Ok(ExecutionResult {
            outcome: ExecutionOutcome::Completed {
                return_code,
                memory,
            },
            execution_time,
            passed: comparison.passed,
            reason: comparison.reason,
        })
    }
}

fn time_limit_exceeded(execution_time: Duration) -> ExecutionResult {
    ExecutionResult {
        outcome: ExecutionOutcome::TimedOut,
        execution_time,
        passed: false,
        reason: format!(
            "Time limit exceeded: {:.3} seconds",
            execution_time.as_secs_f64()
        ),
    }
}

fn runtime_error(
    return_code: i32,
    memory: Option<MemoryUsage>,
    execution_time: Duration,
    output: &CapturedOutput,
) -> ExecutionResult {
    let stderr = output.stderr_text();
    let stderr = stderr.trim();
    let reason = if stderr.is_empty() {
        "Runtime error".to_owned()
    } else {
        format!("Runtime error: {}", stderr)
    };
    ExecutionResult {
        outcome: ExecutionOutcome::Completed {
            return_code,
            memory,
        },
        execution_time,
        passed: false,
        reason,
    }
}
