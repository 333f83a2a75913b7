//! Append-only run-history ledger.
//!
//! The ledger is an ordered sequence of [`RunRecord`]s persisted as a JSON
//! array document. It is read fully at the start of a run, appended to
//! exactly once per run, and rewritten at the end. A missing or corrupt
//! store loads as empty history (fresh start), never a fatal error.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use litscout_shared::{LitScoutError, Result, RunRecord};

/// In-memory ledger bound to its on-disk document.
pub struct Ledger {
    path: PathBuf,
    records: Vec<RunRecord>,
}

impl Ledger {
    /// Load the ledger from `path`. Missing or malformed files yield an
    /// empty ledger bound to the same path.
    pub fn load(path: &Path) -> Self {
        let records = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<RunRecord>>(&content) {
                Ok(records) => {
                    debug!(?path, runs = records.len(), "loaded run history");
                    records
                }
                Err(e) => {
                    warn!(?path, error = %e, "run history malformed, starting empty");
                    Vec::new()
                }
            },
            Err(e) => {
                debug!(?path, error = %e, "no run history found, starting empty");
                Vec::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            records,
        }
    }

    /// Create an empty in-memory ledger (tests, dry runs).
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            records: Vec::new(),
        }
    }

    /// All records in append order.
    pub fn all(&self) -> &[RunRecord] {
        &self.records
    }

    /// The most recent `n` records, oldest first.
    pub fn last(&self, n: usize) -> &[RunRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// Number of recorded runs.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no run has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The run number the next append will receive (1-based, no gaps).
    pub fn next_run_number(&self) -> u32 {
        self.records.len() as u32 + 1
    }

    /// Append a record. The ledger owns run numbering: whatever number the
    /// caller staged is overwritten with `len + 1` so a failed run between
    /// appends can never create a gap or a reuse.
    pub fn append(&mut self, mut record: RunRecord) -> u32 {
        record.run_number = self.next_run_number();
        let run_number = record.run_number;
        self.records.push(record);
        run_number
    }

    /// Rewrite the on-disk document from the in-memory records.
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LitScoutError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(&self.records)
            .map_err(|e| LitScoutError::Storage(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| LitScoutError::io(&self.path, e))?;
        debug!(path = ?self.path, runs = self.records.len(), "run history persisted");
        Ok(())
    }
}
