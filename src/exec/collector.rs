// src/exec/collector.rs

//! Output collection.
//!
//! Each child pipe gets its own Tokio task that reads line by line, appends to
//! the shared [`OutputBuffer`] and logs the line as it arrives. The poller only
//! ever reads the buffer, so it sees a growing prefix of the final output.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::OrchestratorError;
use crate::exec::OutputStream;

/// Prefix marking lines that came from stderr.
pub const STDERR_PREFIX: &str = "ERROR: ";

/// Append-only text buffer shared between the readers and the poller.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    inner: Arc<RwLock<String>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line (without its terminator).
    pub fn append_line(&self, stream: OutputStream, line: &str) {
        let mut text = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if stream == OutputStream::Stderr {
            text.push_str(STDERR_PREFIX);
        }
        text.push_str(line);
        text.push('\n');
    }

    pub fn snapshot(&self) -> String {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First marker (in the given order) that occurs anywhere in the output.
    pub fn find_marker<'m>(&self, markers: &'m [String]) -> Option<&'m str> {
        let text = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        markers
            .iter()
            .find(|m| text.contains(m.as_str()))
            .map(String::as_str)
    }
}

/// Handles to the running stream readers of one run.
#[derive(Debug)]
pub struct Collector {
    name: String,
    readers: Vec<(OutputStream, JoinHandle<()>)>,
}

impl Collector {
    /// Start draining both streams into `buffer`.
    pub fn spawn<O, E>(name: &str, stdout: O, stderr: E, buffer: OutputBuffer) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        let readers = vec![
            (
                OutputStream::Stdout,
                tokio::spawn(read_stream(
                    name.to_string(),
                    OutputStream::Stdout,
                    stdout,
                    buffer.clone(),
                )),
            ),
            (
                OutputStream::Stderr,
                tokio::spawn(read_stream(
                    name.to_string(),
                    OutputStream::Stderr,
                    stderr,
                    buffer,
                )),
            ),
        ];

        Self {
            name: name.to_string(),
            readers,
        }
    }

    /// Wait for both readers to hit end-of-stream, bounded by `grace`.
    ///
    /// Readers still running at the deadline are aborted. Returns `true` when
    /// everything was drained.
    pub async fn drain(self, grace: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + grace;
        let mut complete = true;

        for (stream, mut handle) in self.readers {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(run = %self.name, %stream, error = %err, "output reader task failed");
                    complete = false;
                }
                Err(_) => {
                    warn!(
                        run = %self.name,
                        %stream,
                        grace_ms = grace.as_millis() as u64,
                        "output still open after drain grace; abandoning reader"
                    );
                    handle.abort();
                    complete = false;
                }
            }
        }

        complete
    }
}

async fn read_stream<R>(name: String, stream: OutputStream, reader: R, buffer: OutputBuffer)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&raw);
                let line = text.trim_end_matches(['\n', '\r']);
                buffer.append_line(stream, line);
                info!(run = %name, %stream, "{}", line);
            }
            Err(source) => {
                let err = OrchestratorError::StreamRead {
                    name: name.clone(),
                    stream,
                    source,
                };
                warn!(error = %err, "stopped reading output stream");
                break;
            }
        }
    }

    debug!(run = %name, %stream, "output stream closed");
}
