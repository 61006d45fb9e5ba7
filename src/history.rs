//! ═══════════════════════════════════════════════════════════════════════════════
//! HISTORY — Day-Grouped Review Lists
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! The review screen shows the most recent summarized readings grouped
//! by calendar day, newest day first. The backend hands entries back
//! newest-first with a hard cap; this module only shapes them.
//! ═══════════════════════════════════════════════════════════════════════════════

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SensorKind;

/// How many entries the review list shows at most.
pub const REVIEW_LIMIT: usize = 50;

/// One summarized reading as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: SensorKind,
    pub avg_value: f64,
    pub safe: bool,
    pub recorded_at: DateTime<Utc>,
}

/// All entries recorded on one calendar day, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub entries: Vec<HistoryEntry>,
}

/// Shape entries into day groups: sort newest first, cap at
/// `REVIEW_LIMIT`, then bucket by UTC calendar day. Group order
/// follows entry order, so the newest day comes first.
pub fn group_by_day(mut entries: Vec<HistoryEntry>) -> Vec<DayGroup> {
    entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    entries.truncate(REVIEW_LIMIT);

    let mut groups: Vec<DayGroup> = Vec::new();
    for entry in entries {
        let day = entry.recorded_at.date_naive();
        match groups.last_mut() {
            Some(group) if group.day == day => group.entries.push(entry),
            _ => groups.push(DayGroup {
                day,
                entries: vec![entry],
            }),
        }
    }
    groups
}
