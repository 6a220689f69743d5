//! Append-only event logs of opaque binary records.
//!
//! On disk every record is one frame: a little-endian `u32` payload length followed
//! by the payload. A torn final frame (crash mid-append) is dropped on read and cut
//! off when the file is reopened; a failed append truncates back to where it started.

use super::PublishError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

const LEN_PREFIX: usize = 4;

#[async_trait]
pub trait EventLog: Send + Sync {
    async fn append(&self, record: Vec<u8>) -> Result<(), PublishError>;

    /// Every record in append order.
    async fn read_all(&self) -> Result<Vec<Vec<u8>>, PublishError>;
}

pub fn frame(payload: &[u8]) -> Result<Vec<u8>, PublishError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| PublishError::Encode(format!("record of {} bytes", payload.len())))?;
    let mut out = Vec::with_capacity(LEN_PREFIX + payload.len());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Length of the prefix of `bytes` made of whole frames.
fn whole_frames_len(bytes: &[u8]) -> usize {
    let mut offset = 0;
    while let Some(prefix) = bytes.get(offset..offset + LEN_PREFIX) {
        let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        let end = offset + LEN_PREFIX + len;
        if end > bytes.len() {
            break;
        }
        offset = end;
    }
    offset
}

pub fn split_frames(bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut records = Vec::new();
    let mut rest = bytes;
    while rest.len() >= LEN_PREFIX {
        let (prefix, tail) = rest.split_at(LEN_PREFIX);
        let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        if tail.len() < len {
            break;
        }
        let (payload, tail) = tail.split_at(len);
        records.push(payload.to_vec());
        rest = tail;
    }
    if !rest.is_empty() {
        warn!(dropped = rest.len(), "Ignoring torn record at end of log");
    }
    records
}

/// File-backed log. Appends are serialized by an async mutex and flushed before
/// returning.
pub struct FileEventLog {
    path: PathBuf,
    file: tokio::sync::Mutex<File>,
}

impl FileEventLog {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PublishError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await?;

        let existing = tokio::fs::read(&path).await?;
        let whole = whole_frames_len(&existing);
        if whole < existing.len() {
            warn!(path = %path.display(), dropped = existing.len() - whole, "Cutting torn record off the log");
            file.set_len(whole as u64).await?;
        }
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventLog for FileEventLog {
    async fn append(&self, record: Vec<u8>) -> Result<(), PublishError> {
        let framed = frame(&record)?;
        let mut file = self.file.lock().await;
        let start = file.metadata().await?.len();
        if let Err(e) = write_frame(&mut file, &framed).await {
            truncate_to(&mut file, start).await;
            return Err(e.into());
        }
        debug!(path = %self.path.display(), bytes = framed.len(), "Appended");
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Vec<u8>>, PublishError> {
        // Hold the writer lock so no append interleaves with the read.
        let _guard = self.file.lock().await;
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(split_frames(&bytes))
    }
}

async fn write_frame(file: &mut File, framed: &[u8]) -> std::io::Result<()> {
    file.write_all(framed).await?;
    file.flush().await
}

/// Drops whatever a failed append left behind so the next frame starts on a boundary.
async fn truncate_to(file: &mut File, len: u64) {
    if let Err(e) = file.set_len(len).await {
        error!(error = %e, len, "Could not cut a partial record off the log");
    }
}

/// In-process log with switchable failures.
#[derive(Default)]
pub struct MemoryEventLog {
    records: Mutex<Vec<Vec<u8>>>,
    fail_next: AtomicU32,
    unavailable: AtomicBool,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` appends fail.
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Every append fails until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventLog for MemoryEventLog {
    async fn append(&self, record: Vec<u8>) -> Result<(), PublishError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PublishError::Unavailable("log switched off".into()));
        }
        let injected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(PublishError::Unavailable("injected failure".into()));
        }
        self.records.lock().push(record);
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Vec<u8>>, PublishError> {
        Ok(self.records.lock().clone())
    }
}
