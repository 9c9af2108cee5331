// src/events/models.rs
use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Time value used when a block names no time of day.
pub const TIME_TBD: &str = "TBD";

/// Text pulled out of one candidate block, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFieldSignals {
    pub name_text: Option<String>,
    pub date_text: Option<String>,
    pub time_text: Option<String>,
    pub category_text: Option<String>,
}

impl RawFieldSignals {
    /// Name, date and category are all required; time is not.
    pub fn is_complete(&self) -> bool {
        self.name_text.is_some() && self.date_text.is_some() && self.category_text.is_some()
    }
}

/// `end` is only set when the text named two dates. It is passed through as
/// found: it may precede `start` or fall outside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

/// One output row. Field order and renames are the export column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    #[serde(rename = "Event Name")]
    pub event_name: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    /// Empty when the source gave a single date.
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Venue/Organization")]
    pub venue_organization: String,
    #[serde(rename = "Website")]
    pub source_website: String,
    #[serde(rename = "Flag for Review", serialize_with = "yes_no")]
    pub review_flag: bool,
}

/// Column headers of the exported table, in order.
pub const EVENT_COLUMNS: [&str; 7] = [
    "Event Name",
    "Start Date",
    "End Date",
    "Time",
    "Venue/Organization",
    "Website",
    "Flag for Review",
];

fn yes_no<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "Yes" } else { "No" })
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
