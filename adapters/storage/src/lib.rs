#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistent record store for completed test results.
//!
//! Records live in a single named slot as one JSON array. The whole array is
//! rewritten on every append; the slot abstraction lets tests and embedders
//! substitute an in-memory backend for the file system.

use std::{
    cell::RefCell,
    fs, io,
    path::{Path, PathBuf},
};

use aura_core::{StatsReport, TestId, TestMode, TestResult};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the storage slot that holds the serialised records.
pub const SLOT_NAME: &str = "auraTestResults.json";

/// Errors surfaced by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing slot failed.
    #[error("storage slot {path} is not accessible")]
    Io {
        /// Location of the slot.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The slot holds data that is not a valid record array.
    #[error("stored records are corrupt")]
    Corrupt(#[source] serde_json::Error),
    /// Records could not be serialised.
    #[error("failed to encode records")]
    Encode(#[source] serde_json::Error),
    /// A record with the same identifier is already stored.
    #[error("a record with id {0} already exists")]
    DuplicateId(TestId),
}

/// Backing storage of the serialised record array.
pub trait Slot {
    /// Returns the slot contents, or `None` when nothing was ever written.
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the slot contents.
    fn write(&self, contents: &str) -> Result<(), StoreError>;
}

/// Slot persisted as a file on disk.
#[derive(Clone, Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Creates a slot at the provided file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the standard slot inside `directory`.
    #[must_use]
    pub fn in_directory(directory: impl AsRef<Path>) -> Self {
        Self::new(directory.as_ref().join(SLOT_NAME))
    }

    /// Location of the slot on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Slot for FileSlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(error)),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
            }
        }
        fs::write(&self.path, contents).map_err(|error| self.io_error(error))
    }
}

/// Slot held in memory, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: RefCell<Option<String>>,
}

impl MemorySlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot pre-populated with raw contents.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: RefCell::new(Some(contents.into())),
        }
    }

    /// Raw contents of the slot.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        let _ = self.contents.replace(Some(contents.to_owned()));
        Ok(())
    }
}

/// Ordering applied when listing records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    /// Most recent timestamp first.
    #[default]
    NewestFirst,
    /// Oldest timestamp first.
    OldestFirst,
}

/// Ordered collection of completed results mirrored into a slot.
#[derive(Debug)]
pub struct RecordStore<S> {
    slot: S,
    records: Vec<TestResult>,
}

impl<S: Slot> RecordStore<S> {
    /// Creates an empty store over the slot without reading it.
    #[must_use]
    pub fn new(slot: S) -> Self {
        Self {
            slot,
            records: Vec::new(),
        }
    }

    /// Creates a store and loads the records currently held by the slot.
    pub fn open(slot: S) -> Result<Self, StoreError> {
        let mut store = Self::new(slot);
        let _ = store.load()?;
        Ok(store)
    }

    /// Replaces the in-memory records with the slot contents.
    ///
    /// An absent or blank slot yields an empty store.
    pub fn load(&mut self) -> Result<usize, StoreError> {
        self.records = match self.slot.read()? {
            Some(contents) if !contents.trim().is_empty() => {
                serde_json::from_str(&contents).map_err(StoreError::Corrupt)?
            }
            _ => Vec::new(),
        };
        debug!(records = self.records.len(), "loaded stored results");
        Ok(self.records.len())
    }

    /// Appends a result and persists the full record array.
    ///
    /// The in-memory store is left unchanged when persisting fails.
    pub fn append(&mut self, result: TestResult) -> Result<(), StoreError> {
        if self.records.iter().any(|record| record.id() == result.id()) {
            return Err(StoreError::DuplicateId(result.id().clone()));
        }

        self.records.push(result);
        if let Err(error) = self.persist() {
            let _ = self.records.pop();
            return Err(error);
        }

        if let Some(record) = self.records.last() {
            info!(id = %record.id(), grade = %record.grade(), "stored test result");
        }
        Ok(())
    }

    /// Lists every record in the requested order.
    #[must_use]
    pub fn list(&self, order: Order) -> Vec<TestResult> {
        let mut records = self.records.clone();
        sort(&mut records, order);
        records
    }

    /// Lists the records produced in `mode`, newest first.
    #[must_use]
    pub fn list_by_mode(&self, mode: TestMode) -> Vec<TestResult> {
        let mut records: Vec<TestResult> = self
            .records
            .iter()
            .filter(|record| record.mode() == mode)
            .cloned()
            .collect();
        sort(&mut records, Order::NewestFirst);
        records
    }

    /// Records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[TestResult] {
        &self.records
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate statistics over the stored records.
    #[must_use]
    pub fn stats(&self) -> StatsReport {
        aura_system_analytics::summarize(&self.records)
    }

    /// Backing slot of the store.
    #[must_use]
    pub fn slot(&self) -> &S {
        &self.slot
    }

    fn persist(&self) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&self.records).map_err(StoreError::Encode)?;
        self.slot.write(&encoded)
    }
}

fn sort(records: &mut [TestResult], order: Order) {
    match order {
        Order::NewestFirst => records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp())),
        Order::OldestFirst => records.sort_by_key(TestResult::timestamp),
    }
}
