use std::path::PathBuf;

use forces_judge::error::JudgeCoreError;

#[derive(Debug, thiserror::Error)]
pub enum ForcesError {
    #[error("File {0:?} not found, please test with  -f <file>")]
    SourceNotFound(PathBuf),
    #[error("Other languages are not supported yet: {0:?}")]
    UnsupportedLanguage(PathBuf),
    #[error("Judge Core Error: {0}")]
    JudgeError(#[from] JudgeCoreError),
}
