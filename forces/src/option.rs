use std::{io::Write, path::PathBuf};

use chrono::Local;
use clap::{Args, Parser, Subcommand};

use crate::types::{ByteSize, TimeLimit};

#[derive(Parser, Debug, Clone)]
#[command(name = "forces", author, version, about, long_about = None)]
pub struct ForcesOpt {
    /// For loading Opt from .env file
    #[arg(long, default_value = ".env")]
    pub env_path: PathBuf,
    /// Log filter, falls back to RUST_LOG
    #[arg(long, env = "FORCES_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub cmd: ForcesCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ForcesCommand {
    /// Judge a program against the local testcases
    Test(TestArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    /// C++ source whose executable should be judged
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Shell command line to judge instead of an executable
    #[arg(long, conflicts_with = "file")]
    pub command: Option<String>,
    /// Directory holding in{N}.txt and ans{N}.txt
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,
    /// Wall-clock limit per testcase, in seconds or like `1500ms`
    #[arg(short, long, env = "FORCES_TIME_LIMIT", default_value = "2")]
    pub time_limit: TimeLimit,
    /// Peak memory limit per testcase, like `256M`
    #[arg(short, long, env = "FORCES_MEMORY_LIMIT", default_value = "512M")]
    pub memory_limit: ByteSize,
    /// Print one JSON record per testcase
    #[arg(long)]
    pub json: bool,
}

/// Try to load env from a .env file, then parse the args again so that the
/// loaded variables act as defaults.
pub fn load_option() -> ForcesOpt {
    // First load env_path from Args
    let opt = ForcesOpt::parse();
    if opt.env_path.exists() {
        dotenv::from_path(&opt.env_path).ok();
    }

    let opt = ForcesOpt::parse();
    setup_logger(opt.log_level.as_deref());
    log::debug!("load opt: {:?}", opt);
    opt
}

fn setup_logger(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:5} [{}:{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.file().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                &record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Result<ForcesOpt, clap::Error> {
        ForcesOpt::try_parse_from(std::iter::once("forces").chain(args.iter().copied()))
    }

    fn test_args(opt: ForcesOpt) -> TestArgs {
        match opt.cmd {
            ForcesCommand::Test(args) => args,
        }
    }

    #[test]
    fn test_parse_test_flags() {
        let opt = parse(&["test", "-f", "a.cpp", "-d", "cases", "-t", "1.5", "-m", "256M"]).unwrap();
        assert_eq!(opt.env_path, PathBuf::from(".env"));
        let args = test_args(opt);
        assert_eq!(args.file, Some(PathBuf::from("a.cpp")));
        assert_eq!(args.command, None);
        assert_eq!(args.dir, PathBuf::from("cases"));
        assert_eq!(args.time_limit, TimeLimit(Duration::from_millis(1500)));
        assert_eq!(args.memory_limit, ByteSize(256 * 1024 * 1024));
        assert!(!args.json);
    }

    #[test]
    fn test_parse_command_and_json() {
        let opt = parse(&["test", "--command", "python3 a.py", "--json"]).unwrap();
        let args = test_args(opt);
        assert_eq!(args.command.as_deref(), Some("python3 a.py"));
        assert!(args.json);
    }

    #[test]
    fn test_file_conflicts_with_command() {
        assert!(parse(&["test", "-f", "a.cpp", "--command", "./a"]).is_err());
    }

    #[test]
    fn test_invalid_limits_rejected() {
        assert!(parse(&["test", "-t", "0"]).is_err());
        assert!(parse(&["test", "-m", "lots"]).is_err());
    }
}
