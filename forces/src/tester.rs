use anyhow::Context;
use forces_judge::{judge::common::Judge, judge::ExecutionRequest, testcase::discover_testcases};

use crate::{
    option::TestArgs,
    report::{render_text, TestOutcome, TestRecord, TestSummary, GENERIC_FAILURE},
    resolve::resolve_executor,
};

/// Judge the resolved program against every testcase found in `args.dir`
/// and return the exit status of the run.
pub fn run_tests(args: &TestArgs) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let executor = resolve_executor(args.file.as_deref(), args.command.as_deref(), &cwd)?;

    let testcases = discover_testcases(&args.dir);
    if testcases.is_empty() {
        println!("No testcases found, please parse them first");
        return Ok(GENERIC_FAILURE);
    }
    log::info!("Judging {} against {} testcases", executor, testcases.len());

    let judge = Judge::native();
    let mut summary = TestSummary::default();
    for testcase in testcases {
        let request = ExecutionRequest::new(executor.clone(), testcase.input(), testcase.answer())
            .with_limits(args.time_limit.0, args.memory_limit.0);
        let outcome: TestOutcome = match judge.execute(&request) {
            // a program that cannot start only fails its own testcase
            Err(e) if !e.is_launch_failure() => {
                return Err(e)
                    .with_context(|| format!("Failed to judge testcase #{}", testcase.index));
            }
            outcome => outcome,
        };

        summary.record(&outcome);
        if args.json {
            let record = TestRecord::new(testcase.index, &outcome);
            println!("{}", serde_json::to_string(&record)?);
        } else {
            for line in render_text(testcase.index, &outcome) {
                println!("{}", line);
            }
        }
    }

    log::info!("{}/{} testcases passed", summary.passed, summary.judged);
    Ok(summary.exit_code())
}
