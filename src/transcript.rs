//! Append-only transcript persistence with read-modify-write semantics.
//!
//! The transcript is a single JSON document holding an ordered array of
//! utterance records. Every append reads the whole document back, pushes one
//! record, and overwrites the file. The store never creates the document: an
//! absent file is reported as [`StoreError::Missing`] and the caller decides
//! what to do with the record (the pipeline logs and drops it).

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Wall-clock format used for every persisted record.
pub const DATETIME_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// One recognized utterance and the wall-clock time it was finalized.
///
/// Records are immutable after creation; the store only ever appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtteranceRecord {
    pub datetime: String,
    pub text: String,
}

impl UtteranceRecord {
    /// Builds a record stamped with the current local time. Stamping happens
    /// per utterance, at finalization, not once per session.
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            datetime: Local::now().format(DATETIME_FORMAT).to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The transcript document does not exist. Non-fatal by design; the
    /// store never creates it.
    #[error("transcript file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read or write transcript: {0}")]
    Io(#[from] io::Error),
    #[error("transcript document is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Append-only store over a single JSON document.
///
/// Single-writer only: nothing here locks across processes, and the
/// recognition pump is assumed to be the sole writer for the lifetime of the
/// process.
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and deserializes the full record sequence.
    ///
    /// # Errors
    ///
    /// [`StoreError::Missing`] when the document is absent,
    /// [`StoreError::Format`] when it does not parse as a record array.
    pub fn load(&self) -> Result<Vec<UtteranceRecord>, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                StoreError::Missing(self.path.clone())
            } else {
                StoreError::Io(err)
            }
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Appends one record via full read-modify-write.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::Missing`] when the document is absent; the
    /// file is never created here and the record is not persisted.
    pub fn append(&self, record: &UtteranceRecord) -> Result<(), StoreError> {
        let mut records = self.load()?;
        records.push(record.clone());
        fs::write(&self.path, serde_json::to_string(&records)?)?;
        Ok(())
    }
}
