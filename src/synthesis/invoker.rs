//! External synthesis tool invocation.
//!
//! The tool runs as a child process with
//! `[--verbose, --file, <topology>, <algorithm args>...]`. Both streams are
//! captured as text. Failures are returned to the caller, which logs them
//! and moves on; nothing here retries.
//!
//! With a timeout set, the whole invocation is bounded: waiting for the
//! child and reading its output share one deadline. A descendant that keeps
//! the pipes open after the tool exits cannot stall the sweep.

use log::{debug, warn};
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// How long output is still read after a timed-out child is killed
const KILL_GRACE: Duration = Duration::from_millis(200);

/// Captured output of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stdout: String,
    pub stderr: String,
}

/// Reasons a single invocation produced no usable output
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("executable not found: {path}")]
    NotFound { path: String },

    #[error("failed to start {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed while waiting for {path}: {source}")]
    Wait {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{path} failed with {status}")]
    NonZeroExit {
        path: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{path} did not finish within {after:?} and was killed")]
    TimedOut {
        path: String,
        after: Duration,
        /// Whatever the tool wrote to stderr before it was killed
        stderr: String,
    },
}

impl InvokeError {
    /// Captured stderr, when the process got far enough to produce any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::NonZeroExit { stderr, .. } | Self::TimedOut { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Anything that can run the synthesis tool on a topology file
pub trait Synthesizer {
    fn synthesize(&self, topology_file: &Path, args: &[String]) -> Result<Invocation, InvokeError>;
}

/// The synthesis tool as an external executable
#[derive(Debug, Clone)]
pub struct ExternalTool {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl ExternalTool {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
        }
    }

    /// Kill invocations that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Argument vector passed to the tool
    pub fn arguments(topology_file: &Path, args: &[String]) -> Vec<String> {
        let mut argv = vec![
            "--verbose".to_string(),
            "--file".to_string(),
            topology_file.to_string_lossy().to_string(),
        ];
        argv.extend(args.iter().cloned());
        argv
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

enum PipeEvent {
    Data(Stream, Vec<u8>),
    Closed(Stream),
}

/// Forward a pipe in chunks from its own thread so neither stream can fill up
fn forward<R: Read + Send + 'static>(pipe: Option<R>, stream: Stream, tx: Sender<PipeEvent>) {
    let Some(mut pipe) = pipe else {
        let _ = tx.send(PipeEvent::Closed(stream));
        return;
    };
    thread::spawn(move || {
        let mut buf = [0u8; 8192];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(PipeEvent::Data(stream, buf[..n].to_vec())).is_err() {
                        // Receiver gone: the invocation already returned
                        return;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Failed to read synthesis tool {}: {}", stream, e);
                    break;
                }
            }
        }
        let _ = tx.send(PipeEvent::Closed(stream));
    });
}

/// Output collected from the child's pipes
struct Capture {
    rx: Receiver<PipeEvent>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    open: usize,
}

impl Capture {
    fn start(child: &mut Child) -> Self {
        let (tx, rx) = mpsc::channel();
        forward(child.stdout.take(), Stream::Stdout, tx.clone());
        forward(child.stderr.take(), Stream::Stderr, tx);
        Self {
            rx,
            stdout: Vec::new(),
            stderr: Vec::new(),
            open: 2,
        }
    }

    fn apply(&mut self, event: PipeEvent) {
        match event {
            PipeEvent::Data(Stream::Stdout, data) => self.stdout.extend_from_slice(&data),
            PipeEvent::Data(Stream::Stderr, data) => self.stderr.extend_from_slice(&data),
            PipeEvent::Closed(_) => self.open = self.open.saturating_sub(1),
        }
    }

    /// Read until both pipes close or `deadline` passes.
    ///
    /// Returns false if the deadline passed with a pipe still open.
    fn collect(&mut self, deadline: Option<Instant>) -> bool {
        while self.open > 0 {
            let event = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(remaining) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => return false,
                        Err(RecvTimeoutError::Disconnected) => return true,
                    }
                }
                None => match self.rx.recv() {
                    Ok(event) => event,
                    Err(_) => return true,
                },
            };
            self.apply(event);
        }
        true
    }

    fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

impl Synthesizer for ExternalTool {
    fn synthesize(&self, topology_file: &Path, args: &[String]) -> Result<Invocation, InvokeError> {
        let path = self.executable.display().to_string();
        let argv = Self::arguments(topology_file, args);
        debug!("Running {} {}", path, argv.join(" "));

        let started = Instant::now();
        let mut child = Command::new(&self.executable)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => InvokeError::NotFound { path: path.clone() },
                _ => InvokeError::Spawn {
                    path: path.clone(),
                    source,
                },
            })?;

        let mut capture = Capture::start(&mut child);

        let status = match self.timeout {
            Some(limit) => match child.wait_timeout(limit) {
                Ok(Some(status)) => status,
                Ok(None) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    capture.collect(Some(Instant::now() + KILL_GRACE));
                    return Err(InvokeError::TimedOut {
                        path,
                        after: limit,
                        stderr: capture.stderr_text(),
                    });
                }
                Err(source) => return Err(InvokeError::Wait { path, source }),
            },
            None => child
                .wait()
                .map_err(|source| InvokeError::Wait { path: path.clone(), source })?,
        };

        let deadline = self.timeout.map(|limit| started + limit);
        if !capture.collect(deadline) {
            warn!(
                "{} exited but its output pipes were still open after {:?}; using the output read so far",
                path,
                started.elapsed()
            );
        }

        if !status.success() {
            return Err(InvokeError::NonZeroExit {
                path,
                status,
                stderr: capture.stderr_text(),
            });
        }
        Ok(Invocation {
            stdout: capture.stdout_text(),
            stderr: capture.stderr_text(),
        })
    }
}
