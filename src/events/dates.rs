// src/events/dates.rs
use std::str::FromStr;

use chrono::{Month, NaiveDate};
use regex::Regex;

use crate::events::models::ResolvedDateRange;
use crate::utils::error::{DateError, ExtractError};

/// Turns "<Month> <Day>" fragments into calendar dates.
///
/// Matching is lexical: the regex accepts any one- or two-digit day, and the
/// calendar check only happens when the date is built. Text carries no year,
/// so the caller passes one in.
#[derive(Debug, Clone)]
pub struct DateTextResolver {
    month_day_re: Regex,
    months: Vec<(String, u32)>, // lowercase name -> month number
}

impl DateTextResolver {
    pub fn new<S: AsRef<str>>(month_names: &[S]) -> Result<Self, ExtractError> {
        if month_names.is_empty() {
            return Err(ExtractError::EmptyVocabulary("months"));
        }

        let mut months = Vec::with_capacity(month_names.len());
        for name in month_names {
            let name = name.as_ref().trim();
            let month = Month::from_str(name)
                .map_err(|_| ExtractError::InvalidVocabulary(format!("'{}' is not a month name", name)))?;
            months.push((name.to_lowercase(), month.number_from_month()));
        }

        let alternation = months
            .iter()
            .map(|(name, _)| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let month_day_re = Regex::new(&format!(r"(?i)\b({})\s(\d{{1,2}})\b", alternation))
            .map_err(|e| ExtractError::RegexError(e.to_string()))?;

        Ok(Self { month_day_re, months })
    }

    pub fn pattern(&self) -> &str {
        self.month_day_re.as_str()
    }

    /// Like [`try_resolve`](Self::try_resolve), with every failure collapsed into "no date".
    pub fn resolve(&self, text: &str, year: i32) -> Option<ResolvedDateRange> {
        match self.try_resolve(text, year) {
            Ok(range) => Some(range),
            Err(e) => {
                tracing::trace!("No usable date in '{}': {}", text, e);
                None
            }
        }
    }

    /// First match in the text is the start date, the second the end date,
    /// anything after that is ignored. A bad day in either of the first two
    /// matches fails the whole fragment.
    pub fn try_resolve(&self, text: &str, year: i32) -> Result<ResolvedDateRange, DateError> {
        let mut dates = self
            .month_day_re
            .captures_iter(text)
            .take(2)
            .map(|caps| self.build_date(&caps[1], &caps[2], year));

        let start = dates.next().ok_or(DateError::NoDate)??;
        let end = dates.next().transpose()?;

        Ok(ResolvedDateRange { start, end })
    }

    fn build_date(&self, month_text: &str, day_text: &str, year: i32) -> Result<NaiveDate, DateError> {
        let lowered = month_text.to_lowercase();
        let month = self
            .months
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, number)| *number)
            .ok_or_else(|| DateError::UnknownMonth(month_text.to_string()))?;

        let invalid_day = || DateError::InvalidDay {
            month: month_text.to_string(),
            day: day_text.to_string(),
        };
        let day: u32 = day_text.parse().map_err(|_| invalid_day())?;

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid_day)
    }
}
