use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_derive::Serialize;

lazy_static! {
    static ref YES_NO: Regex = Regex::new(r"(?i)\b(yes|no)\b").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub passed: bool,
    pub reason: String,
}

impl ComparisonResult {
    fn passed() -> Self {
        Self {
            passed: true,
            reason: "Passed".to_owned(),
        }
    }

    fn failed(reason: String) -> Self {
        Self {
            passed: false,
            reason,
        }
    }
}

fn lowercase_yes_no(text: &str) -> String {
    YES_NO
        .replace_all(text, |caps: &Captures| caps[1].to_lowercase())
        .into_owned()
}

/// `\r\n` and a lone `\r` both end a line.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Compare the program output with the expected answer.
///
/// Trailing whitespace is ignored, both for the whole text and for every line.
/// When the answer mentions a whole-word `yes` or `no` in any case, every such
/// word is lowercased on both sides first, so `YES` and `yes` are equal.
/// Everything else is an exact line-by-line match.
pub fn compare_output(output: &str, answer: &str) -> ComparisonResult {
    let mut output = normalize_newlines(output).trim_end().to_owned();
    let mut answer = normalize_newlines(answer).trim_end().to_owned();

    if YES_NO.is_match(&answer) {
        log::info!("Found 'Yes or No' type problem, performing case replacement");
        output = lowercase_yes_no(&output);
        answer = lowercase_yes_no(&answer);
    }

    let output_lines: Vec<&str> = output.lines().collect();
    let answer_lines: Vec<&str> = answer.lines().collect();
    if output_lines.len() != answer_lines.len() {
        return ComparisonResult::failed(format!(
            "Expected {} lines, found {} lines",
            answer_lines.len(),
            output_lines.len()
        ));
    }

    for (ln, (line_out, line_ans)) in output_lines.iter().zip(answer_lines.iter()).enumerate() {
        let line_out = line_out.trim_end();
        let line_ans = line_ans.trim_end();
        if line_out != line_ans {
            return ComparisonResult::failed(format!(
                "Expected {} on line {}, found {}",
                line_ans, ln, line_out
            ));
        }
    }
    ComparisonResult::passed()
}
