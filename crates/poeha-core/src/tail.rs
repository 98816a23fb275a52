//! Following the client log from its live end, like `tail -f`.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};

/// Default wait between checks when no new data is available.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors that end tailing.
#[derive(Debug, Error)]
pub enum TailError {
    /// The log file does not exist.
    #[error("log file not found at {}", .path.display())]
    NotFound { path: PathBuf },
    /// The log file exists but could not be opened or positioned.
    #[error("failed to open log file {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading from the open file failed.
    #[error("failed to read log file: {0}")]
    Read(#[source] std::io::Error),
    /// The file was removed while being tailed.
    #[error("log file {} was removed", .path.display())]
    Removed { path: PathBuf },
}

/// A one-shot reader over lines appended to a file after it was opened.
///
/// Content already present at [`LogTail::open`] is skipped. Lines are only
/// yielded once their terminator has been written; a line written in several
/// pieces is buffered until it is complete.
#[derive(Debug)]
pub struct LogTail {
    path: PathBuf,
    reader: BufReader<File>,
    pending: Vec<u8>,
    poll_interval: Duration,
}

impl LogTail {
    /// Opens `path` and positions the cursor at its current end.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TailError> {
        let path = path.as_ref().to_path_buf();
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(TailError::NotFound { path }),
            Err(source) => return Err(TailError::Open { path, source }),
        };

        let mut reader = BufReader::new(file);
        let offset = match reader.seek(SeekFrom::End(0)).await {
            Ok(offset) => offset,
            Err(source) => return Err(TailError::Open { path, source }),
        };
        tracing::debug!(path = %path.display(), offset, "seeked to end of log file");

        Ok(Self {
            path,
            reader,
            pending: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Overrides the idle wait between checks for new data.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits for the next complete line and returns it with surrounding
    /// whitespace (including `\r\n`) removed.
    ///
    /// Sleeps for the poll interval whenever the end of file is reached.
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Cancel safety
    ///
    /// Cancel-safe: bytes of an unfinished line are kept in an internal
    /// buffer and completed by the next call.
    pub async fn next_line(&mut self) -> Result<String, TailError> {
        loop {
            let read = self
                .reader
                .read_until(b'\n', &mut self.pending)
                .await
                .map_err(TailError::Read)?;

            if self.pending.last() == Some(&b'\n') {
                let line = String::from_utf8_lossy(&self.pending).trim().to_string();
                self.pending.clear();
                return Ok(line);
            }

            if read == 0 {
                self.ensure_present().await?;
                tokio::time::sleep(self.poll_interval).await;
            }
        }
    }

    async fn ensure_present(&self) -> Result<(), TailError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(TailError::Removed {
                path: self.path.clone(),
            }),
            Err(e) => Err(TailError::Read(e)),
        }
    }
}
