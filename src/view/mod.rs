use clap::ValueEnum;
use icu_collator::{Collator, CollatorOptions};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::wire::{Recurrence, ScheduleRecord};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Title,
    Email,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }
}

/// Root-locale collation of titles; exact string order only breaks ties.
///
/// Falls back to a caseless comparison when no collation data is available.
struct TitleOrder(Option<Collator>);

impl TitleOrder {
    fn new() -> Self {
        match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(c) => Self(Some(c)),
            Err(e) => {
                tracing::warn!(error = ?e, "collator unavailable, sorting titles caselessly");
                Self(None)
            }
        }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let ord = match &self.0 {
            Some(c) => c.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        ord.then_with(|| a.cmp(b))
    }
}

fn matches(record: &ScheduleRecord, mode: SearchMode, needle: &str) -> bool {
    match mode {
        SearchMode::Title => record.email_title.to_lowercase().contains(needle),
        SearchMode::Email => record.emails.iter().any(|e| e.to_lowercase().contains(needle)),
    }
}

/// Records matching `query` under `mode`, ordered by title.
///
/// An empty query keeps everything. Always recomputed from `records`.
pub fn filter_and_sort<'a>(
    records: &'a [ScheduleRecord],
    mode: SearchMode,
    query: &str,
    order: SortOrder,
) -> Vec<&'a ScheduleRecord> {
    let needle = query.to_lowercase();
    let mut out: Vec<&ScheduleRecord> = records
        .iter()
        .filter(|r| needle.is_empty() || matches(r, mode, &needle))
        .collect();
    let titles = TitleOrder::new();
    out.sort_by(|a, b| {
        let ord = titles.compare(&a.email_title, &b.email_title);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    out
}

/// Human description of when a record fires.
pub fn schedule_text(record: &ScheduleRecord) -> String {
    let rec = &record.schedule;
    let when = format!("at {} ({})", rec.time(), rec.timezone());
    let mut s = match rec {
        Recurrence::Daily { .. } => format!("Daily {when}"),
        Recurrence::Weekly { days, .. } => {
            let days = if days.is_empty() {
                "monday".to_string()
            } else {
                days.iter().map(|d| d.as_str()).collect::<Vec<_>>().join(", ")
            };
            format!("Weekly on {days} {when}")
        }
    };
    if let Some(start) = record.start_date {
        s.push_str(&format!(" from {start}"));
    }
    if let Some(end) = record.end_date {
        s.push_str(&format!(" until {end}"));
    }
    s
}
