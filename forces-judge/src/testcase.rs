use serde_derive::Serialize;
use std::path::{Path, PathBuf};

use crate::run::StreamSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Testcase {
    /// 1-based, as in the file names.
    pub index: usize,
    pub input_path: PathBuf,
    pub answer_path: PathBuf,
}

impl Testcase {
    pub fn input(&self) -> StreamSource {
        StreamSource::File(self.input_path.clone())
    }

    pub fn answer(&self) -> StreamSource {
        StreamSource::File(self.answer_path.clone())
    }
}

/// Collect `in1.txt`/`ans1.txt`, `in2.txt`/`ans2.txt`, ... from `dir`,
/// stopping at the first index where either file is missing.
pub fn discover_testcases(dir: &Path) -> Vec<Testcase> {
    let mut testcases = Vec::new();
    for index in 1.. {
        let input_path = dir.join(format!("in{}.txt", index));
        let answer_path = dir.join(format!("ans{}.txt", index));
        if !input_path.is_file() || !answer_path.is_file() {
            break;
        }
        testcases.push(Testcase {
            index,
            input_path,
            answer_path,
        });
    }
    log::debug!("Found {} testcases in {}", testcases.len(), dir.display());
    testcases
}
