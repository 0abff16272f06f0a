//! Run a child process and capture its output.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, Receiver};

/// How often the child is polled when a timeout is set.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to wait for the pipes to close after the child was killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Exited(ExitStatus),
    TimedOut,
}

#[derive(Debug)]
pub struct Captured {
    pub outcome: Outcome,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run `program` and wait until it exits, or until `timeout` expires. In the
/// latter case the process and everything it started are killed.
///
/// Returns an error only if the process can not be spawned or waited.
pub fn run(program: &Path, args: &[OsString], timeout: Option<Duration>) -> io::Result<Captured> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // With its own process group, the child can be killed along with any
    // process it forks (`cvlc` is usually a wrapper script).
    #[cfg(unix)]
    if timeout.is_some() {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command.spawn()?;

    // Both pipes are drained in their own threads, so the child never blocks
    // on a full pipe while we wait for it.
    let stdout = drain(child.stdout.take(), "stdout");
    let stderr = drain(child.stderr.take(), "stderr");

    let outcome = match timeout {
        None => Outcome::Exited(child.wait()?),
        Some(timeout) => wait_timeout(&mut child, timeout)?,
    };

    // A killed child may leave descendants that still hold the pipes.
    let grace = (outcome == Outcome::TimedOut).then_some(DRAIN_GRACE);

    Ok(Captured {
        outcome,
        stdout: collect(stdout, grace),
        stderr: collect(stderr, grace),
    })
}

fn wait_timeout(child: &mut Child, timeout: Duration) -> io::Result<Outcome> {
    let ticker = crossbeam_channel::tick(POLL_INTERVAL);
    let deadline = crossbeam_channel::after(timeout);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Outcome::Exited(status)),
            Ok(None) => (),
            Err(e) => {
                terminate(child);
                return Err(e);
            }
        }

        let expired = select! {
            recv(ticker) -> _ => false,
            recv(deadline) -> _ => true,
        };

        if expired {
            break;
        }
    }

    // The child may have exited between the last poll and the deadline.
    match child.try_wait() {
        Ok(Some(status)) => return Ok(Outcome::Exited(status)),
        Ok(None) => (),
        Err(e) => {
            terminate(child);
            return Err(e);
        }
    }

    tracing::debug!(pid = child.id(), ?timeout, "killing process group");

    kill_group(child)?;
    child.wait()?;

    Ok(Outcome::TimedOut)
}

/// Kill the process group of `child`, which was spawned as its leader.
#[cfg(unix)]
fn kill_group(child: &mut Child) -> io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) -> io::Result<()> {
    match child.kill() {
        Err(e) if e.kind() != io::ErrorKind::InvalidInput => Err(e),
        _ => Ok(()),
    }
}

/// Best effort to not leave the child running when it can not be waited.
fn terminate(child: &mut Child) {
    if let Err(e) = kill_group(child) {
        tracing::debug!(pid = child.id(), "can't kill process: {e}");
    }

    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>, name: &'static str) -> Option<Receiver<Vec<u8>>> {
    let mut pipe = pipe?;
    let (tx, rx) = crossbeam_channel::bounded(1);

    thread::spawn(move || {
        let mut data = Vec::with_capacity(4096);
        if let Err(e) = pipe.read_to_end(&mut data) {
            tracing::debug!(pipe = name, read = data.len(), "output truncated: {e}");
        }

        let _ = tx.send(data);
    });

    Some(rx)
}

/// Output read from a pipe. With `grace`, stop waiting after that time.
fn collect(rx: Option<Receiver<Vec<u8>>>, grace: Option<Duration>) -> Vec<u8> {
    let Some(rx) = rx else {
        return Vec::new();
    };

    let data = match grace {
        None => rx.recv().ok(),
        Some(grace) => rx.recv_timeout(grace).ok(),
    };

    data.unwrap_or_default()
}
