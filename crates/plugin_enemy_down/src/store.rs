//! # Score Records
//!
//! Finished runs are appended to a [`ScoreStore`] and never modified again.
//! The store assigns ids and registration timestamps at insert time.
//!
//! Two stores are provided:
//! - [`JsonLinesScoreStore`]: one JSON record per line in a file; survives restarts
//! - [`MemoryScoreStore`]: a `Vec` behind a mutex, for tests and throwaway servers

use crate::difficulty::Difficulty;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Timestamp format used when listing records.
pub const REGISTERED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A persisted result of one finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: u64,
    pub player_name: String,
    pub score: u32,
    pub difficulty: String,
    pub registered_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// `id | player_name | score | difficulty | yyyy-MM-dd HH:mm:ss` in local time.
    pub fn display_line(&self) -> String {
        self.display_line_in(&Local)
    }

    pub fn display_line_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        format!(
            "{} | {} | {} | {} | {}",
            self.id,
            self.player_name,
            self.score,
            self.difficulty,
            self.registered_at.with_timezone(tz).format(REGISTERED_AT_FORMAT)
        )
    }
}

/// The fields a caller supplies when recording a result.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScoreRecord {
    pub player_name: String,
    pub score: u32,
    pub difficulty: Difficulty,
}

impl NewScoreRecord {
    fn into_record(self, id: u64) -> ScoreRecord {
        ScoreRecord {
            id,
            player_name: self.player_name,
            score: self.score,
            difficulty: self.difficulty.token().to_string(),
            registered_at: Utc::now(),
        }
    }
}

/// Append-only storage for score records.
pub trait ScoreStore: Send + Sync + Debug {
    /// Appends a record and returns it with its assigned id and timestamp.
    fn insert(&self, record: NewScoreRecord) -> Result<ScoreRecord, StoreError>;

    /// Every record, in storage order.
    fn select_all(&self) -> Result<Vec<ScoreRecord>, StoreError>;
}

/// Score store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt record on line {line}: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    records: Mutex<Vec<ScoreRecord>>,
    unavailable: AtomicBool,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with [`StoreError::Unavailable`] (or work again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

impl ScoreStore for MemoryScoreStore {
    fn insert(&self, record: NewScoreRecord) -> Result<ScoreRecord, StoreError> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let id = records.last().map_or(1, |last| last.id + 1);
        let record = record.into_record(id);
        records.push(record.clone());
        Ok(record)
    }

    fn select_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        self.check_available()?;
        Ok(self.records.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}

/// File-backed store writing one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesScoreStore {
    path: PathBuf,
    /// Next id to assign; the lock also serializes appends.
    next_id: Mutex<u64>,
}

impl JsonLinesScoreStore {
    /// Opens the store at `path`, creating an empty file if needed.
    ///
    /// Fails if the parent directory does not exist or an existing file
    /// holds a line that is not a valid record.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(StoreError::Unavailable(format!(
                    "directory {} does not exist",
                    parent.display()
                )));
            }
        }

        OpenOptions::new().create(true).append(true).open(&path)?;
        let records = read_records(&path)?;
        let next_id = records.iter().map(|record| record.id).max().unwrap_or(0) + 1;

        info!("💾 Score store opened at {} ({} records)", path.display(), records.len());
        Ok(Self {
            path,
            next_id: Mutex::new(next_id),
        })
    }
}

fn read_records(path: &Path) -> Result<Vec<ScoreRecord>, StoreError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| StoreError::Corrupt {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

impl ScoreStore for JsonLinesScoreStore {
    fn insert(&self, record: NewScoreRecord) -> Result<ScoreRecord, StoreError> {
        let mut next_id = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
        let record = record.into_record(*next_id);

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        *next_id += 1;
        debug!("💾 Stored score record {} for {}", record.id, record.player_name);
        Ok(record)
    }

    fn select_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        // Hold the id lock so a concurrent append is never read half-written.
        let _guard = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
        read_records(&self.path)
    }
}
