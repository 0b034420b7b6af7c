use libc::{c_int, pid_t, rusage, wait4, WEXITSTATUS, WIFSIGNALED, WNOHANG, WTERMSIG};
use nix::{
    errno::Errno,
    sys::signal::{killpg, Signal},
    unistd::Pid,
};
use serde_derive::Serialize;
use std::{
    fs::File,
    io, mem,
    os::unix::process::CommandExt,
    process::{Child, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use super::{executor::Executor, CapturedOutput, ExitStatus, StreamSource, Supervisor};
use crate::error::{launch_failed, JudgeCoreError};
use crate::utils::io::{join_pipe_thread_until, spawn_pipe_reader, spawn_pipe_writer};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Runs programs as plain child processes, each in its own process group,
/// and reads resource usage from `wait4`.
#[derive(Debug, Clone, Default)]
pub struct NativeSupervisor;

pub struct NativeProcess {
    child: Child,
    stdin_writer: Option<JoinHandle<io::Result<()>>>,
    stdout_reader: Option<JoinHandle<io::Result<Vec<u8>>>>,
    stderr_reader: Option<JoinHandle<io::Result<Vec<u8>>>>,
    resource_usage: Option<Rusage>,
    reaped: bool,
}

impl NativeProcess {
    pub fn pid(&self) -> pid_t {
        self.child.id() as pid_t
    }

    pub fn resource_usage(&self) -> Option<&Rusage> {
        self.resource_usage.as_ref()
    }

    fn record_exit(&mut self, usage: rusage) {
        let usage = Rusage::from(usage);
        log::debug!("Process pid={} resource usage: {:?}", self.pid(), usage);
        self.resource_usage = Some(usage);
        self.reaped = true;
    }

    /// Kill whatever the reaped leader left running in its group, so no
    /// descendant outlives the run or holds the output pipes open.
    fn kill_descendants(&self) {
        match killpg(Pid::from_raw(self.pid()), Signal::SIGKILL) {
            Ok(()) => log::info!("Killed leftover processes in pgid={}", self.pid()),
            Err(Errno::ESRCH) => {}
            Err(e) => log::warn!("Failed to kill process group pgid={}: {}", self.pid(), e),
        }
    }

    fn kill_group(&mut self) -> Result<(), JudgeCoreError> {
        match killpg(Pid::from_raw(self.pid()), Signal::SIGKILL) {
            Ok(()) => log::info!("Killed process group pgid={}", self.pid()),
            // the whole group is gone already, the leader is a zombie
            Err(Errno::ESRCH) => {}
            Err(e) => return Err(e.into()),
        }
        loop {
            match wait_pid(self.pid(), 0) {
                Ok(Some((_, usage))) => {
                    self.record_exit(usage);
                    return Ok(());
                }
                Ok(None) | Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for NativeProcess {
    fn drop(&mut self) {
        if !self.reaped {
            if let Err(e) = self.kill_group() {
                log::error!("Failed to clean up process pid={}: {}", self.pid(), e);
            }
        }
    }
}

impl Supervisor for NativeSupervisor {
    type Process = NativeProcess;

    fn spawn(
        &self,
        executor: &Executor,
        input: &StreamSource,
    ) -> Result<NativeProcess, JudgeCoreError> {
        let mut command = executor.build_command();
        command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);
        let pending_input = match input {
            StreamSource::File(path) => {
                log::debug!("Opening input file path={}", path.display());
                command.stdin(Stdio::from(File::open(path)?));
                None
            }
            StreamSource::Bytes(bytes) => {
                command.stdin(Stdio::piped());
                Some(bytes.clone())
            }
        };

        let mut child = command
            .spawn()
            .map_err(|e| launch_failed(executor.to_string(), e))?;
        log::info!("Spawned pid={} for {}", child.id(), executor);

        let stdin_writer = match (child.stdin.take(), pending_input) {
            (Some(stdin), Some(data)) => Some(spawn_pipe_writer(stdin, data)),
            _ => None,
        };
        let stdout_reader = child.stdout.take().map(spawn_pipe_reader);
        let stderr_reader = child.stderr.take().map(spawn_pipe_reader);

        Ok(NativeProcess {
            child,
            stdin_writer,
            stdout_reader,
            stderr_reader,
            resource_usage: None,
            reaped: false,
        })
    }

    fn wait_until(
        &self,
        process: &mut NativeProcess,
        deadline: Instant,
    ) -> Result<Option<ExitStatus>, JudgeCoreError> {
        loop {
            match wait_pid(process.pid(), WNOHANG) {
                Ok(Some((status, usage))) => {
                    log::info!("Detected process pid={} exit", process.pid());
                    process.record_exit(usage);
                    process.kill_descendants();
                    return Ok(Some(decode_status(status)));
                }
                Ok(None) | Err(Errno::EINTR) => {}
                Err(e) => return Err(e.into()),
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            thread::sleep(WAIT_POLL_INTERVAL.min(deadline - now));
        }
    }

    fn kill(&self, process: &mut NativeProcess) -> Result<(), JudgeCoreError> {
        if process.reaped {
            return Ok(());
        }
        process.kill_group()
    }

    fn peak_memory_of(&self, process: &NativeProcess) -> Option<u64> {
        process.resource_usage().and_then(Rusage::max_rss_bytes)
    }

    fn take_output(
        &self,
        mut process: NativeProcess,
        deadline: Instant,
    ) -> Result<Option<CapturedOutput>, JudgeCoreError> {
        if let Some(writer) = process.stdin_writer.take() {
            match join_pipe_thread_until(writer, deadline) {
                Ok(Some(())) => {}
                Ok(None) => log::warn!("Input pipe of pid={} is still open", process.pid()),
                Err(e) => log::warn!("Failed to feed input to pid={}: {}", process.pid(), e),
            }
        }
        let stdout = match process.stdout_reader.take() {
            Some(reader) => join_pipe_thread_until(reader, deadline)?,
            None => Some(Vec::new()),
        };
        let stderr = match process.stderr_reader.take() {
            Some(reader) => join_pipe_thread_until(reader, deadline)?,
            None => Some(Vec::new()),
        };
        match (stdout, stderr) {
            (Some(stdout), Some(stderr)) => Ok(Some(CapturedOutput { stdout, stderr })),
            _ => {
                log::warn!(
                    "Output pipes of pid={} were still open at the deadline",
                    process.pid()
                );
                Ok(None)
            }
        }
    }
}

fn wait_pid(pid: pid_t, options: c_int) -> Result<Option<(c_int, rusage)>, Errno> {
    let mut status: c_int = 0;
    let mut usage: rusage = unsafe { mem::zeroed() };
    let ret = unsafe { wait4(pid, &mut status, options, &mut usage) };
    match ret {
        -1 => Err(Errno::last()),
        0 => Ok(None),
        _ => Ok(Some((status, usage))),
    }
}

fn decode_status(status: c_int) -> ExitStatus {
    if WIFSIGNALED(status) {
        ExitStatus::Signaled(WTERMSIG(status))
    } else {
        ExitStatus::Exited(WEXITSTATUS(status))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Rusage {
    pub user_time: Duration,
    pub system_time: Duration,
    pub max_rss: i64,
}

impl Rusage {
    /// `ru_maxrss` is in kilobytes, except on Apple platforms where it is in bytes.
    pub fn max_rss_bytes(&self) -> Option<u64> {
        if self.max_rss <= 0 {
            return None;
        }
        let max_rss = self.max_rss as u64;
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Some(max_rss)
        } else {
            Some(max_rss * 1024)
        }
    }
}

impl From<rusage> for Rusage {
    fn from(rusage: rusage) -> Self {
        Self {
            user_time: Duration::new(
                rusage.ru_utime.tv_sec as u64,
                rusage.ru_utime.tv_usec as u32 * 1000,
            ),
            system_time: Duration::new(
                rusage.ru_stime.tv_sec as u64,
                rusage.ru_stime.tv_usec as u32 * 1000,
            ),
            max_rss: rusage.ru_maxrss as i64,
        }
    }
}
