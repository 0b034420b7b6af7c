use std::{
    env::consts::EXE_SUFFIX,
    ffi::OsStr,
    path::{Path, PathBuf},
};

use forces_judge::run::executor::Executor;

use crate::error::ForcesError;

/// Pick what to judge: an explicit shell command, the executable built from
/// `source`, or the executable of `<current dir name>.cpp`.
pub fn resolve_executor(
    source: Option<&Path>,
    command: Option<&str>,
    cwd: &Path,
) -> Result<Executor, ForcesError> {
    if let Some(command) = command {
        return Ok(Executor::shell(command));
    }
    let source = match source {
        Some(source) => source.to_path_buf(),
        None => current_cpp_file(cwd)?,
    };
    if source.extension() != Some(OsStr::new("cpp")) {
        return Err(ForcesError::UnsupportedLanguage(source));
    }
    let executable = executable_path(&source);
    log::debug!("Judging {} built from {}", executable.display(), source.display());
    Ok(Executor::program(executable))
}

fn current_cpp_file(cwd: &Path) -> Result<PathBuf, ForcesError> {
    let mut name = cwd.file_name().unwrap_or_default().to_os_string();
    name.push(".cpp");
    let file = PathBuf::from(name);
    if cwd.join(&file).is_file() {
        return Ok(file);
    }
    log::warn!("File {:?} not found", file);
    Err(ForcesError::SourceNotFound(file))
}

fn executable_path(source: &Path) -> PathBuf {
    let mut name = source.file_stem().unwrap_or_default().to_os_string();
    name.push(EXE_SUFFIX);
    source.with_file_name(name)
}
