use crate::domain::{NewBook, PendingKey};
use crate::ports::pending_queue::{PendingEntry, PendingQueue as PendingQueueTrait, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

/// File name prefix of pending entries
const ENTRY_PREFIX: &str = "book-";
/// File name suffix of pending entries
const ENTRY_SUFFIX: &str = ".json";
/// How many fresh keys to try before giving up on a collision
const MAX_KEY_ATTEMPTS: usize = 16;

/// File-backed implementation of PendingQueue
///
/// Each entry is one JSON file named `book-<epoch-millis>-<seq>.json` in the
/// queue directory. Files are created with create-new semantics so an entry
/// is never overwritten, and are never modified or removed by this adapter.
pub struct PendingQueue {
    dir: PathBuf,
    sequence: AtomicU64,
}

impl PendingQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generate a key from the current time and a process-wide sequence
    fn next_key(&self) -> PendingKey {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        PendingKey::new(format!(
            "{}{}-{:06}",
            ENTRY_PREFIX,
            Utc::now().timestamp_millis(),
            seq
        ))
    }

    fn path_for(&self, key: &PendingKey) -> PathBuf {
        self.dir.join(format!("{}{}", key.as_str(), ENTRY_SUFFIX))
    }

    /// Extract the key from a file name, if it looks like a pending entry
    fn key_from_file_name(name: &str) -> Option<PendingKey> {
        name.strip_suffix(ENTRY_SUFFIX)
            .filter(|stem| stem.starts_with(ENTRY_PREFIX))
            .map(PendingKey::new)
    }

    /// Write and flush a freshly created entry file
    ///
    /// On failure the file is removed so that a registration reported as
    /// failed never shows up in the listing.
    async fn write_or_discard(
        path: &Path,
        mut file: tokio::fs::File,
        contents: &[u8],
    ) -> std::io::Result<()> {
        // flush surfaces errors of the buffered background write
        let written = async {
            file.write_all(contents).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(path).await {
                tracing::warn!(
                    file = %path.display(),
                    "Could not remove incomplete pending entry: {}",
                    remove_err
                );
            }
            return Err(e);
        }

        Ok(())
    }

    async fn read_entry(path: &Path, key: PendingKey) -> Result<PendingEntry> {
        let contents = tokio::fs::read_to_string(path).await?;
        let book: NewBook = serde_json::from_str(&contents)?;
        Ok(PendingEntry { key, book })
    }
}

#[async_trait]
impl PendingQueueTrait for PendingQueue {
    /// Append a book as a new immutable entry
    ///
    /// The file is flushed to disk before the key is returned.
    async fn append(&self, book: &NewBook) -> Result<PendingKey> {
        let mut contents = serde_json::to_vec(book)?;
        contents.push(b'\n');

        tokio::fs::create_dir_all(&self.dir).await?;

        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = self.next_key();
            let path = self.path_for(&key);

            let file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(%key, "Pending key already taken, generating another");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            Self::write_or_discard(&path, file, &contents).await?;

            return Ok(key);
        }

        Err(format!(
            "could not allocate a unique pending key after {} attempts",
            MAX_KEY_ATTEMPTS
        )
        .into())
    }

    /// List every entry that can be parsed, ordered by key
    ///
    /// Unreadable or malformed files (including ones still being written)
    /// are skipped with a warning. A missing directory is an empty queue.
    async fn list_pending(&self) -> Result<Vec<PendingEntry>> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        loop {
            let dir_entry = match dir.next_entry().await {
                Ok(Some(dir_entry)) => dir_entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Stopping pending queue scan early: {}", e);
                    break;
                }
            };

            let file_name = dir_entry.file_name();
            let Some(key) = file_name.to_str().and_then(Self::key_from_file_name) else {
                continue;
            };

            match Self::read_entry(&dir_entry.path(), key).await {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(
                        file = %dir_entry.path().display(),
                        "Skipping unreadable pending entry: {}",
                        e
                    );
                }
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
