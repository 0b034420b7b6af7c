use std::{
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use forces_judge::{
    judge::{common::Judge, result::JudgeVerdict, ExecutionRequest},
    run::{executor::Executor, StreamSource},
    testcase::discover_testcases,
};

const TEST_DATA_PATH: &str = "tests/data";
const ADD_TWO_NUMBERS: &str = "read a b; echo $((a + b))";

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn shell_request(command: &str, input: &str, answer: &str) -> ExecutionRequest {
    ExecutionRequest::new(Executor::shell(command), input.into(), answer.into())
}

#[test]
fn test_run_judge() {
    init();
    let request = shell_request(ADD_TWO_NUMBERS, "1 2\n", "3\n");
    let result = Judge::native().execute(&request).unwrap();
    log::debug!("{:?}", result);
    assert!(result.passed, "{}", result.reason);
    assert_eq!(result.return_code(), Some(0));
    assert!(result.peak_memory_bytes().unwrap() > 0);
    assert_eq!(result.memory_exceeded(), Some(false));
}

#[test]
fn test_run_program_without_shell() {
    init();
    let request = ExecutionRequest::new(
        Executor::program("/bin/cat"),
        "Yes\n".into(),
        "YES\n".into(),
    );
    let result = Judge::native().execute(&request).unwrap();
    assert!(result.passed, "{}", result.reason);
}

#[test]
fn test_run_wrong_answer() {
    init();
    let request = shell_request(ADD_TWO_NUMBERS, "1 2\n", "4\n");
    let result = Judge::native().execute(&request).unwrap();
    assert!(!result.passed);
    assert_eq!(result.verdict(), JudgeVerdict::WrongAnswer);
    assert_eq!(result.reason, "Expected 4 on line 0, found 3");
}

#[test]
fn test_run_tle() {
    init();
    let time_limit = Duration::from_millis(500);
    let request = shell_request("sleep 5", "", "").with_limits(time_limit, 512 * 1024 * 1024);
    let result = Judge::native().execute(&request).unwrap();
    log::debug!("{:?}", result);
    assert!(result.timed_out());
    assert!(!result.passed);
    assert_eq!(result.return_code(), None);
    assert_eq!(result.peak_memory_bytes(), None);
    assert!(result.execution_time >= time_limit);
    assert!(result.execution_time < Duration::from_secs(2));
    assert!(result.reason.starts_with("Time limit exceeded"));
}

#[test]
fn test_background_descendant_is_killed() {
    init();
    let marker = std::env::temp_dir().join(format!("forces-judge-{}-marker", std::process::id()));
    let _ = std::fs::remove_file(&marker);
    let command = format!("(sleep 1; touch {}) & echo 3", marker.display());
    let time_limit = Duration::from_millis(500);
    let request = shell_request(&command, "", "3\n").with_limits(time_limit, 512 * 1024 * 1024);

    let begin = Instant::now();
    let result = Judge::native().execute(&request).unwrap();
    log::debug!("{:?}", result);
    assert!(begin.elapsed() < time_limit);
    assert!(result.passed, "{}", result.reason);

    thread::sleep(Duration::from_millis(1500));
    assert!(!marker.exists());
}

#[test]
fn test_busy_descendant_does_not_hang() {
    init();
    let time_limit = Duration::from_millis(500);
    let request = shell_request("(while :; do :; done) & echo 3", "", "3\n")
        .with_limits(time_limit, 512 * 1024 * 1024);
    let begin = Instant::now();
    let result = Judge::native().execute(&request).unwrap();
    assert!(begin.elapsed() < Duration::from_secs(2));
    assert!(result.passed, "{}", result.reason);
}

#[test]
fn test_escaped_descendant_holding_output_times_out() {
    init();
    // a new session leaves the process group, so only the deadline can stop it
    if !Path::new("/usr/bin/setsid").exists() && !Path::new("/bin/setsid").exists() {
        return;
    }
    let time_limit = Duration::from_millis(500);
    let request = shell_request("setsid sleep 4 & sleep 0.2; echo 3", "", "3\n")
        .with_limits(time_limit, 512 * 1024 * 1024);
    let begin = Instant::now();
    let result = Judge::native().execute(&request).unwrap();
    log::debug!("{:?}", result);
    assert!(begin.elapsed() < Duration::from_secs(2));
    assert!(result.timed_out());
    assert!(!result.passed);
    assert!(result.execution_time >= time_limit);
}

#[test]
fn test_run_runtime_error() {
    init();
    let request = shell_request("echo segfault >&2; exit 1", "", "");
    let result = Judge::native().execute(&request).unwrap();
    assert_eq!(result.runtime_error(), Some(true));
    assert_eq!(result.return_code(), Some(1));
    assert!(!result.passed);
    assert!(result.reason.contains("segfault"));
    assert!(result.memory_exceeded().is_some());
}

#[test]
fn test_run_killed_by_signal() {
    init();
    let request = shell_request("kill -SEGV $$", "", "");
    let result = Judge::native().execute(&request).unwrap();
    // SIGSEGV
    assert_eq!(result.return_code(), Some(-11));
    assert_eq!(result.verdict(), JudgeVerdict::RuntimeError);
}

#[test]
fn test_run_mle_still_passes() {
    init();
    // every process needs more than one kilobyte resident
    let request = shell_request("cat", "42\n", "42\n").with_limits(Duration::from_secs(2), 1024);
    let result = Judge::native().execute(&request).unwrap();
    assert!(result.passed, "{}", result.reason);
    assert_eq!(result.memory_exceeded(), Some(true));
}

#[test]
fn test_run_large_output() {
    init();
    let answer = "1\n".repeat(200_000);
    let request = shell_request("seq 200000 | sed 's/.*/1/'", "", &answer);
    let result = Judge::native().execute(&request).unwrap();
    assert!(result.passed, "{}", result.reason);
}

#[test]
fn test_run_large_input_left_unread() {
    init();
    let input = "x".repeat(1 << 20);
    let request = shell_request("echo done", &input, "done\n");
    let result = Judge::native().execute(&request).unwrap();
    assert!(result.passed, "{}", result.reason);
}

#[test]
fn test_run_large_input_consumed() {
    init();
    let input = "x".repeat(1 << 20);
    let request = shell_request("cat > /dev/null; echo done", &input, "done\n");
    let result = Judge::native().execute(&request).unwrap();
    assert!(result.passed, "{}", result.reason);
}

#[test]
fn test_launch_missing_program() {
    init();
    let request = ExecutionRequest::new(
        Executor::program("/nonexistent/solution"),
        "".into(),
        "".into(),
    );
    let error = Judge::native().execute(&request).unwrap_err();
    assert!(error.is_launch_failure(), "{:?}", error);
}

#[test]
fn test_launch_not_executable() {
    init();
    let not_executable = PathBuf::from(TEST_DATA_PATH).join("two_cases/in1.txt");
    let request = ExecutionRequest::new(Executor::program(not_executable), "".into(), "".into());
    let error = Judge::native().execute(&request).unwrap_err();
    assert!(error.is_launch_failure(), "{:?}", error);
}

#[test]
fn test_run_discovered_testcases() {
    init();
    let judge = Judge::native();
    let testcases = discover_testcases(&PathBuf::from(TEST_DATA_PATH).join("two_cases"));
    assert_eq!(testcases.len(), 2);
    for testcase in testcases {
        let request = ExecutionRequest::new(
            Executor::shell(ADD_TWO_NUMBERS),
            testcase.input(),
            testcase.answer(),
        );
        let result = judge.execute(&request).unwrap();
        assert!(result.passed, "#{}: {}", testcase.index, result.reason);
    }
}

#[test]
fn test_missing_input_file() {
    init();
    let request = ExecutionRequest::new(
        Executor::shell("cat"),
        StreamSource::File(PathBuf::from(TEST_DATA_PATH).join("missing.txt")),
        "".into(),
    );
    let error = Judge::native().execute(&request).unwrap_err();
    assert!(!error.is_launch_failure());
}
