//! Per-symbol alert cooldown backed by a flat JSON file.
//!
//! The file holds a single object mapping symbol to the epoch seconds of the
//! last alert actually delivered for it. Reads are permissive; writes replace
//! the whole file through a temp-file rename.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Last-alert times keyed by symbol.
pub type CooldownRecord = BTreeMap<String, f64>;

/// Loaded cooldown state plus the path it is committed back to.
#[derive(Debug, Clone)]
pub struct CooldownStore {
    path: PathBuf,
    entries: CooldownRecord,
}

impl CooldownStore {
    /// Load the record at `path`.
    ///
    /// A missing file is an empty record. An unreadable or malformed file is
    /// also treated as empty, with a warning; it is overwritten on the next
    /// successful alert.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<CooldownRecord>(&text) {
                Ok(entries) => {
                    debug!(path = ?path, entries = entries.len(), "Loaded cooldown record");
                    entries
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "Cooldown file is malformed, starting empty");
                    CooldownRecord::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CooldownRecord::new(),
            Err(e) => {
                warn!(path = ?path, error = %e, "Cooldown file is unreadable, starting empty");
                CooldownRecord::new()
            }
        };

        Self { path, entries }
    }

    /// Start an empty record that will be written to `path`.
    pub fn empty<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            entries: CooldownRecord::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &CooldownRecord {
        &self.entries
    }

    /// Epoch seconds of the last alert for `symbol`, or 0 if never alerted.
    pub fn last_alert(&self, symbol: &str) -> f64 {
        self.entries.get(symbol).copied().unwrap_or(0.0)
    }

    /// Whether a new alert for `symbol` is allowed at `now`.
    pub fn can_send(&self, symbol: &str, interval_hours: u32, now: f64) -> bool {
        now - self.last_alert(symbol) >= f64::from(interval_hours) * 3600.0
    }

    /// Seconds left until `symbol` leaves cooldown (0 when eligible).
    pub fn remaining_secs(&self, symbol: &str, interval_hours: u32, now: f64) -> f64 {
        let until = self.last_alert(symbol) + f64::from(interval_hours) * 3600.0;
        (until - now).max(0.0)
    }

    /// Mark `symbol` as alerted at `now`, in memory only.
    ///
    /// An existing later timestamp is kept; entries never move backwards.
    pub fn record(&mut self, symbol: &str, now: f64) {
        let entry = self.entries.entry(symbol.to_string()).or_insert(now);
        if now > *entry {
            *entry = now;
        }
    }

    /// Drop every entry, in memory only.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write the full record to disk atomically.
    pub fn persist(&self) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(&self.entries).context("Failed to serialize cooldown record")?;
        write_atomic(&self.path, &bytes)?;

        info!(
            path = ?self.path,
            entries = self.entries.len(),
            "💾 [COOLDOWN] Record saved"
        );
        Ok(())
    }
}

/// Write to a sibling temp file, sync, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;
        file.write_all(bytes)
            .with_context(|| format!("Failed to write temp file: {:?}", temp_path))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync temp file: {:?}", temp_path))?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", temp_path, path))?;

    Ok(())
}
