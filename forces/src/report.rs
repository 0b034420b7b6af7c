use forces_judge::{error::JudgeCoreError, judge::result::ExecutionResult};
use serde_derive::Serialize;

const MIB: f64 = 1024.0 * 1024.0;

/// Exit status shared by every failure that is not a runtime error.
pub const GENERIC_FAILURE: i32 = 1;

pub type TestOutcome = Result<ExecutionResult, JudgeCoreError>;

/// Keeps the tally over all testcases and the exit status of the run.
#[derive(Debug, Default)]
pub struct TestSummary {
    pub judged: usize,
    pub passed: usize,
    exit_code: i32,
}

impl TestSummary {
    pub fn record(&mut self, outcome: &TestOutcome) {
        self.judged += 1;
        match outcome {
            Ok(result) if result.passed => self.passed += 1,
            // the last failure decides the exit status
            Ok(result) => {
                self.exit_code = match result.return_code() {
                    Some(code) if code != 0 => exit_status_of(code),
                    _ => GENERIC_FAILURE,
                }
            }
            Err(_) => self.exit_code = GENERIC_FAILURE,
        }
    }

    /// Finding no testcase at all is a failure too.
    pub fn exit_code(&self) -> i32 {
        if self.judged == 0 {
            GENERIC_FAILURE
        } else {
            self.exit_code
        }
    }
}

/// Fit a return code into a process exit status, signal deaths become
/// `128 + signal` the way shells report them.
fn exit_status_of(return_code: i32) -> i32 {
    if return_code < 0 {
        128i32.saturating_sub(return_code).min(255)
    } else {
        return_code.clamp(GENERIC_FAILURE, 255)
    }
}

pub fn render_text(index: usize, outcome: &TestOutcome) -> Vec<String> {
    match outcome {
        Ok(result) if result.passed => {
            let memory = match result.peak_memory_bytes() {
                Some(bytes) => format!("{:.2}MB", bytes as f64 / MIB),
                None => "?MB".to_owned(),
            };
            let mut lines = vec![format!(
                "#{} Passed...  {:.2}s, {}",
                index,
                result.execution_time.as_secs_f64(),
                memory
            )];
            if result.memory_exceeded() == Some(true) {
                lines.push("...But memory exceeded".to_owned());
            }
            lines
        }
        Ok(result) => vec![format!("#{} Failed... {}", index, result.reason)],
        Err(e) => vec![format!("#{} Failed... {}", index, e)],
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RecordBody<'a> {
    Judged(&'a ExecutionResult),
    Failed { error: String },
}

#[derive(Debug, Serialize)]
pub struct TestRecord<'a> {
    index: usize,
    #[serde(flatten)]
    body: RecordBody<'a>,
}

impl<'a> TestRecord<'a> {
    pub fn new(index: usize, outcome: &'a TestOutcome) -> Self {
        let body = match outcome {
            Ok(result) => RecordBody::Judged(result),
            Err(e) => RecordBody::Failed {
                error: e.to_string(),
            },
        };
        Self { index, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forces_judge::{
        error::launch_failed,
        judge::result::{ExecutionOutcome, MemoryUsage},
    };
    use std::{io, time::Duration};

    fn completed(return_code: i32, passed: bool, memory: Option<MemoryUsage>) -> TestOutcome {
        Ok(ExecutionResult {
            outcome: ExecutionOutcome::Completed {
                return_code,
                memory,
            },
            execution_time: Duration::from_millis(120),
            passed,
            reason: (if passed { "Passed" } else { "Expected 3 on line 0, found 4" }).to_owned(),
        })
    }

    fn timed_out() -> TestOutcome {
        Ok(ExecutionResult {
            outcome: ExecutionOutcome::TimedOut,
            execution_time: Duration::from_secs(2),
            passed: false,
            reason: "Time limit exceeded: 2.000 seconds".to_owned(),
        })
    }

    fn not_found() -> TestOutcome {
        Err(launch_failed("./a", io::Error::from(io::ErrorKind::NotFound)))
    }

    #[test]
    fn test_all_passed() {
        let mut summary = TestSummary::default();
        summary.record(&completed(0, true, None));
        summary.record(&completed(0, true, None));
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.passed, 2);
    }

    #[test]
    fn test_no_testcases_is_failure() {
        assert_eq!(TestSummary::default().exit_code(), GENERIC_FAILURE);
    }

    #[test]
    fn test_last_failure_decides() {
        let mut summary = TestSummary::default();
        summary.record(&completed(3, false, None));
        assert_eq!(summary.exit_code(), 3);
        summary.record(&completed(0, false, None));
        assert_eq!(summary.exit_code(), GENERIC_FAILURE);
        summary.record(&completed(0, true, None));
        assert_eq!(summary.exit_code(), GENERIC_FAILURE);
        summary.record(&completed(-11, false, None));
        assert_eq!(summary.exit_code(), 139);
        summary.record(&timed_out());
        assert_eq!(summary.exit_code(), GENERIC_FAILURE);
        summary.record(&not_found());
        assert_eq!(summary.exit_code(), GENERIC_FAILURE);
        assert_eq!(summary.judged, 6);
        assert_eq!(summary.passed, 1);
    }

    #[test]
    fn test_exit_status_range() {
        assert_eq!(exit_status_of(1), 1);
        assert_eq!(exit_status_of(255), 255);
        assert_eq!(exit_status_of(300), 255);
        assert_eq!(exit_status_of(-9), 137);
        assert_eq!(exit_status_of(i32::MIN), 255);
    }

    #[test]
    fn test_render_passed() {
        let memory = MemoryUsage::new(3 * 1024 * 1024, 1024);
        let lines = render_text(1, &completed(0, true, Some(memory)));
        assert_eq!(lines, ["#1 Passed...  0.12s, 3.00MB", "...But memory exceeded"]);

        let lines = render_text(2, &completed(0, true, None));
        assert_eq!(lines, ["#2 Passed...  0.12s, ?MB"]);
    }

    #[test]
    fn test_render_failed() {
        assert_eq!(
            render_text(3, &completed(0, false, None)),
            ["#3 Failed... Expected 3 on line 0, found 4"]
        );
        assert_eq!(
            render_text(4, &timed_out()),
            ["#4 Failed... Time limit exceeded: 2.000 seconds"]
        );
        let lines = render_text(5, &not_found());
        assert!(lines[0].starts_with("#5 Failed... Failed to launch ./a"));
    }

    #[test]
    fn test_json_record() {
        let outcome = completed(0, true, None);
        let value = serde_json::to_value(TestRecord::new(1, &outcome)).unwrap();
        assert_eq!(value["index"], 1);
        assert_eq!(value["passed"], true);
        assert_eq!(value["outcome"]["status"], "completed");

        let outcome = not_found();
        let value = serde_json::to_value(TestRecord::new(2, &outcome)).unwrap();
        assert_eq!(value["index"], 2);
        assert!(value["error"].as_str().unwrap().contains("Failed to launch"));
    }
}
