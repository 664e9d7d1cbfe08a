// src/exec/drainer.rs

//! Stream drainers: one task per child output stream.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::exec::watchdog::Rendezvous;

const CHUNK_SIZE: usize = 8 * 1024;

/// Append-only byte buffer filled by exactly one drainer.
///
/// Cloning shares the underlying bytes; the executor keeps a clone so it
/// can snapshot partial output after a timeout.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().clone()
    }

    fn extend(&self, chunk: &[u8]) {
        self.lock().extend_from_slice(chunk);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Why a drainer stopped before EOF.
#[derive(Error, Debug)]
pub enum DrainError {
    /// The read failed after the watchdog declared a timeout; part of the
    /// timeout outcome rather than an I/O failure of its own.
    #[error("{stream} read aborted after timeout")]
    TimedOut { stream: &'static str },

    #[error("reading child {stream}: {source}")]
    Io {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Spawn a task copying `reader` into `buffer` until EOF.
///
/// Resolves to the number of bytes copied.
pub fn spawn_drainer<R>(
    stream: &'static str,
    mut reader: R,
    buffer: OutputBuffer,
    rendezvous: Arc<Rendezvous>,
) -> JoinHandle<Result<usize, DrainError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut total = 0usize;

        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => {
                    buffer.extend(&chunk[..n]);
                    total += n;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) if rendezvous.timed_out() => {
                    debug!(stream, error = %e, "drainer stopped after timeout");
                    return Err(DrainError::TimedOut { stream });
                }
                Err(source) => return Err(DrainError::Io { stream, source }),
            }
        }

        debug!(stream, bytes = total, "stream drained");
        Ok(total)
    })
}
