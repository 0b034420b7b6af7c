use std::{
    io::{self, Read, Write},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Drain `pipe` on a separate thread until EOF.
pub fn spawn_pipe_reader<R>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        log::debug!("read {} bytes from pipe", buffer.len());
        Ok(buffer)
    })
}

/// Write `data` into `pipe` on a separate thread, then close it.
///
/// A child is free to exit without consuming its input, so a broken pipe
/// counts as done.
pub fn spawn_pipe_writer<W>(mut pipe: W, data: Vec<u8>) -> JoinHandle<io::Result<()>>
where
    W: Write + Send + 'static,
{
    thread::spawn(move || {
        match pipe.write_all(&data) {
            Ok(()) => log::debug!("wrote {} bytes to pipe", data.len()),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                log::debug!("pipe closed before all input was written");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    })
}

pub fn join_pipe_thread<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "pipe thread panicked")))
}

/// Join a pipe thread, giving up once `deadline` passes.
///
/// Returns `None` on timeout. The thread is left detached and ends when the
/// last holder of the other pipe end goes away.
pub fn join_pipe_thread_until<T>(
    handle: JoinHandle<io::Result<T>>,
    deadline: Instant,
) -> io::Result<Option<T>> {
    loop {
        if handle.is_finished() {
            return join_pipe_thread(handle).map(Some);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(JOIN_POLL_INTERVAL.min(deadline - now));
    }
}
