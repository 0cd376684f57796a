// compat-suite-core/src/device/info_store.rs
// ============================================================================
// Module: Device Info Store
// Description: Multi-stream JSON results file written on the device.
// Purpose: Persist per-stream results so several tests can share one file.
// Dependencies: serde_json, tempfile, thiserror
// ============================================================================

//! ## Overview
//! The store file is one JSON object keyed by stream name. Opening a store
//! reads any existing streams, recording accumulates into a fresh object for
//! this store's stream, and closing rewrites the whole document through a
//! temporary file renamed over the target. No file handle is held between
//! calls.
//!
//! Invariants:
//! - Stream order in the file is preserved across open/close cycles.
//! - A stream whose name already exists is replaced in place on close.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::io::Write;
use std::mem;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name suffix appended to the report name.
pub const REPORT_FILE_SUFFIX: &str = ".reportlog.json";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Lifecycle state of a store.
#[derive(Debug)]
enum StoreState {
    /// Not accepting results.
    Closed,
    /// Accepting results for the current stream.
    Open {
        /// Streams read from the existing file.
        streams: Map<String, Value>,
        /// Results recorded for this store's stream.
        current: Map<String, Value>,
    },
}

/// On-device results file holding one JSON object per stream.
#[derive(Debug)]
pub struct DeviceInfoStore {
    /// Target file.
    path: PathBuf,
    /// Stream this store writes.
    stream_name: String,
    /// Open/closed state.
    state: StoreState,
}

impl DeviceInfoStore {
    /// Creates a closed store for `stream_name` in the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, stream_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            stream_name: stream_name.into(),
            state: StoreState::Closed,
        }
    }

    /// Creates a closed store at `dir/<report_name>.reportlog.json`.
    #[must_use]
    pub fn for_report(dir: &Path, report_name: &str, stream_name: impl Into<String>) -> Self {
        Self::new(dir.join(format!("{report_name}{REPORT_FILE_SUFFIX}")), stream_name)
    }

    /// Reads every stream stored in `dir/<report_name>.reportlog.json`.
    ///
    /// # Errors
    ///
    /// Returns [`InfoStoreError::NotFound`] when the file does not exist,
    /// [`InfoStoreError::Corrupt`] when it is not a complete JSON object, and
    /// [`InfoStoreError::Io`] on read failures.
    pub fn read_report(dir: &Path, report_name: &str) -> Result<Map<String, Value>, InfoStoreError> {
        let path = dir.join(format!("{report_name}{REPORT_FILE_SUFFIX}"));
        if !path.is_file() {
            return Err(InfoStoreError::NotFound(path.display().to_string()));
        }
        read_streams(&path)
    }

    /// Returns the target file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stream name.
    #[must_use]
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Returns true while the store accepts results.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, StoreState::Open { .. })
    }

    /// Opens the store, loading any streams already in the file.
    ///
    /// # Errors
    ///
    /// Returns [`InfoStoreError::AlreadyOpen`] when open,
    /// [`InfoStoreError::Corrupt`] when the existing file is not a complete
    /// JSON object, and [`InfoStoreError::Io`] on read failures.
    pub fn open(&mut self) -> Result<(), InfoStoreError> {
        if self.is_open() {
            return Err(InfoStoreError::AlreadyOpen(self.stream_name.clone()));
        }
        let streams = read_streams(&self.path)?;
        self.state = StoreState::Open {
            streams,
            current: Map::new(),
        };
        Ok(())
    }

    /// Records a scalar result under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InfoStoreError::NotOpen`] when the store is closed.
    pub fn add_result(&mut self, name: &str, value: impl Into<Value>) -> Result<(), InfoStoreError> {
        let current = self.current_mut()?;
        current.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Records an array result under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InfoStoreError::NotOpen`] when the store is closed.
    pub fn add_array_result<V: Into<Value>>(
        &mut self,
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<(), InfoStoreError> {
        let current = self.current_mut()?;
        let array = values.into_iter().map(Into::into).collect();
        current.insert(name.to_string(), Value::Array(array));
        Ok(())
    }

    /// Closes the store and rewrites the file with this stream included.
    ///
    /// The store is closed even when the write fails.
    ///
    /// # Errors
    ///
    /// Returns [`InfoStoreError::NotOpen`] when already closed and
    /// [`InfoStoreError::Io`] when the file cannot be written.
    pub fn close(&mut self) -> Result<(), InfoStoreError> {
        let StoreState::Open {
            mut streams,
            current,
        } = mem::replace(&mut self.state, StoreState::Closed)
        else {
            return Err(InfoStoreError::NotOpen(self.stream_name.clone()));
        };
        streams.insert(self.stream_name.clone(), Value::Object(current));
        let bytes = serde_json::to_vec_pretty(&Value::Object(streams))
            .map_err(|err| InfoStoreError::Io(err.to_string()))?;
        write_atomic(&self.path, &bytes).map_err(|err| InfoStoreError::Io(err.to_string()))
    }

    /// Returns the open stream's results.
    fn current_mut(&mut self) -> Result<&mut Map<String, Value>, InfoStoreError> {
        match &mut self.state {
            StoreState::Open {
                current, ..
            } => Ok(current),
            StoreState::Closed => Err(InfoStoreError::NotOpen(self.stream_name.clone())),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Device info store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfoStoreError {
    /// `open` was called on an open store.
    #[error("info store for stream {0} is already open")]
    AlreadyOpen(String),
    /// A result or `close` arrived while closed.
    #[error("info store for stream {0} is not open")]
    NotOpen(String),
    /// The existing file is not a complete JSON object.
    #[error("info store file {path} is corrupt: {reason}")]
    Corrupt {
        /// File that failed to load.
        path: String,
        /// What was wrong with it.
        reason: String,
    },
    /// The report file does not exist.
    #[error("info store file not found: {0}")]
    NotFound(String),
    /// Filesystem failure.
    #[error("info store io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads the stream map from an existing file, or an empty map.
fn read_streams(path: &Path) -> Result<Map<String, Value>, InfoStoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(err) => return Err(InfoStoreError::Io(err.to_string())),
    };
    let corrupt = |reason: String| InfoStoreError::Corrupt {
        path: path.display().to_string(),
        reason,
    };
    let trimmed = content.trim();
    if !trimmed.ends_with('}') {
        return Err(corrupt("content does not end with '}'".to_string()));
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(streams)) => Ok(streams),
        Ok(_) => Err(corrupt("top-level value is not an object".to_string())),
        Err(err) => Err(corrupt(err.to_string())),
    }
}

/// Writes `bytes` to a sibling temporary file and renames it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().filter(|parent| !parent.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
