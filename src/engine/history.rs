use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::game::RoundSummary;
use crate::error::Result;

/// One finished round as persisted on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: u64,
    /// Unix seconds.
    pub date: i64,
    /// Seconds.
    pub duration: u64,
    pub clicks: u32,
}

/// Inclusive bounds in unix seconds. Either side may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct DateFilter {
    start: Option<i64>,
    end: Option<i64>,
}

impl DateFilter {
    fn accepts(&self, date: i64) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Ordered log of won rounds plus the current view settings.
#[derive(Debug, Default)]
pub struct GameHistory {
    path: Option<PathBuf>,
    records: Vec<HistoryRecord>,
    limit: Option<usize>,
    date_filter: Option<DateFilter>,
}

impl GameHistory {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the log at `path`. Missing or unreadable storage starts an empty log.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = load_records(&path);
        debug!("loaded {} history records from {}", records.len(), path.display());
        GameHistory {
            path: Some(path),
            records,
            limit: None,
            date_filter: None,
        }
    }

    pub fn add_record(&mut self, summary: &RoundSummary) -> Result<HistoryRecord> {
        let mut id = summary.finished_at_ms;
        if let Some(last) = self.records.iter().map(|r| r.id).max()
            && id <= last
        {
            id = last + 1;
        }
        let record = HistoryRecord {
            id,
            date: (summary.finished_at_ms / 1000) as i64,
            duration: summary.elapsed_secs,
            clicks: summary.clicks,
        };
        self.records.push(record.clone());
        self.save()?;
        Ok(record)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.save()
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn set_date_filter(&mut self, start: Option<i64>, end: Option<i64>) {
        self.date_filter = Some(DateFilter { start, end });
    }

    pub fn clear_filters(&mut self) {
        self.date_filter = None;
        self.limit = None;
    }

    /// Insertion order, unfiltered.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Best first (shortest time, then fewest clicks), filtered by date, then limited.
    pub fn view(&self) -> Vec<&HistoryRecord> {
        let mut sorted: Vec<&HistoryRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| {
            a.duration
                .cmp(&b.duration)
                .then_with(|| a.clicks.cmp(&b.clicks))
        });
        if let Some(filter) = self.date_filter {
            sorted.retain(|record| filter.accepts(record.date));
        }
        if let Some(limit) = self.limit
            && limit > 0
        {
            sorted.truncate(limit);
        }
        sorted
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.records)?)?;
        Ok(())
    }
}

fn load_records(path: &Path) -> Vec<HistoryRecord> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            warn!("cannot read history {}: {}", path.display(), err);
            return Vec::new();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!("discarding corrupt history {}: {}", path.display(), err);
        Vec::new()
    })
}
