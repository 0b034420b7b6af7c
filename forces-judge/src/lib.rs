pub mod error;
/// Running one program against one testcase and judging its output
pub mod judge;
/// Process supervision under a wall-clock limit
pub mod run;
pub mod testcase;
pub mod utils;
