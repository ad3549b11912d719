use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// class → date → count. One JSON document holds everything.
pub type Ledger = BTreeMap<String, BTreeMap<String, i64>>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to initialize attendance ledger at {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write attendance ledger: {0}")]
    Write(#[source] io::Error),
}

/// An upsert request, as posted by clients.
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    #[serde(rename = "class")]
    pub class_name: String,
    pub date: String,
    pub count: i64,
}

/// Flat-file attendance ledger.
///
/// Every write rewrites the whole document through a temp file and an
/// atomic rename, so a failed write never corrupts what was already
/// stored. Last write for a given (class, date) wins; there is no
/// concurrency control beyond that.
pub struct AttendanceStore {
    path: PathBuf,
}

impl AttendanceStore {
    /// Opens the ledger, creating an empty document if none exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            fs::write(&path, "{}").map_err(|e| StoreError::Init {
                path: path.clone(),
                source: e,
            })?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole document. An unreadable or corrupt file reads as an
    /// empty ledger rather than an error.
    pub fn load(&self) -> Ledger {
        match fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("attendance ledger is corrupt, treating as empty: {e}");
                Ledger::new()
            }),
            Err(e) => {
                log::warn!("attendance ledger unreadable, treating as empty: {e}");
                Ledger::new()
            }
        }
    }

    /// Upserts one (class, date) count and rewrites the document.
    pub fn record(&self, request: &RecordRequest) -> Result<(), StoreError> {
        let mut ledger = self.load();
        ledger
            .entry(request.class_name.clone())
            .or_default()
            .insert(request.date.clone(), request.count);
        self.save(&ledger)
    }

    /// date → count for one class; empty when the class is unknown.
    pub fn class_counts(&self, class_name: &str) -> BTreeMap<String, i64> {
        self.load().remove(class_name).unwrap_or_default()
    }

    /// class → count summed across all dates.
    pub fn totals(&self) -> BTreeMap<String, i64> {
        self.load()
            .into_iter()
            .map(|(class_name, dates)| (class_name, dates.values().sum()))
            .collect()
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(ledger)
            .map_err(|e| StoreError::Write(io::Error::other(e)))?;
        let temp_path = self.path.with_extension("part");
        fs::write(&temp_path, text).map_err(StoreError::Write)?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StoreError::Write(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (AttendanceStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = AttendanceStore::open(tmp.path().join("attendance.json")).unwrap();
        (store, tmp)
    }

    fn request(class_name: &str, date: &str, count: i64) -> RecordRequest {
        RecordRequest {
            class_name: class_name.to_string(),
            date: date.to_string(),
            count,
        }
    }

    #[test]
    fn test_open_creates_empty_document() {
        let (store, _tmp) = store();
        assert!(store.path().exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_record_then_read_back() {
        let (store, _tmp) = store();
        store.record(&request("A", "2024-01-01", 5)).unwrap();

        let counts = store.class_counts("A");
        assert_eq!(counts.get("2024-01-01"), Some(&5));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let (store, _tmp) = store();
        store.record(&request("A", "2024-01-01", 5)).unwrap();
        store.record(&request("A", "2024-01-01", 7)).unwrap();

        assert_eq!(store.class_counts("A").get("2024-01-01"), Some(&7));
        assert_eq!(store.totals().get("A"), Some(&7));
    }

    #[test]
    fn test_totals_sum_across_dates() {
        let (store, _tmp) = store();
        store.record(&request("A", "2024-01-01", 5)).unwrap();
        store.record(&request("A", "2024-01-02", 3)).unwrap();
        store.record(&request("B", "2024-01-01", 2)).unwrap();

        let totals = store.totals();
        assert_eq!(totals.get("A"), Some(&8));
        assert_eq!(totals.get("B"), Some(&2));
    }

    #[test]
    fn test_unknown_class_reads_empty() {
        let (store, _tmp) = store();
        assert!(store.class_counts("nope").is_empty());
    }

    #[test]
    fn test_corrupt_document_reads_empty() {
        let (store, _tmp) = store();
        fs::write(store.path(), "not json {{{").unwrap();
        assert!(store.load().is_empty());
        // And the next write recovers a valid document.
        store.record(&request("A", "2024-01-01", 1)).unwrap();
        assert_eq!(store.totals().get("A"), Some(&1));
    }

    #[test]
    fn test_write_replaces_document_atomically() {
        let (store, _tmp) = store();
        store.record(&request("A", "2024-01-01", 5)).unwrap();
        // No temp file left behind after a successful write.
        assert!(!store.path().with_extension("part").exists());
        // Document on disk is valid standalone JSON.
        let text = fs::read_to_string(store.path()).unwrap();
        let parsed: Ledger = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.get("A").unwrap().get("2024-01-01"), Some(&5));
    }
}
