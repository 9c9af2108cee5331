// src/events/window.rs
use chrono::{Datelike, NaiveDate};

use crate::utils::error::ConfigError;

/// Inclusive on both ends.
pub fn in_window(date: NaiveDate, window_start: NaiveDate, window_end: NaiveDate) -> bool {
    window_start <= date && date <= window_end
}

/// The active reporting window. Only an event's start date is tested against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportingWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        in_window(date, self.start, self.end)
    }

    /// Year given to dates written without one ("March 15").
    pub fn reporting_year(&self) -> i32 {
        self.start.year()
    }
}
