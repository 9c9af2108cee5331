// src/config.rs
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::events::window::ReportingWindow;
use crate::utils::error::ConfigError;

/// Top-level run configuration. Every section falls back to its defaults,
/// so an empty JSON object `{}` is a valid config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub categories: CategoryConfig,
    pub vocabulary: VocabularyConfig,
    pub fetch: FetchConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap_or_default(),
        }
    }
}

/// Organization categories that are in scope, plus the one that gets flagged.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub relevant: Vec<String>,
    pub review: String,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            relevant: [
                "Theater",
                "Museums",
                "Book Readings",
                "Tours",
                "Panel Discussions",
                "Seasonal Outdoor Festivals",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            review: "Misc".to_string(),
        }
    }
}

/// Words the block extractor looks for in page content.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Month names accepted in date text (full English names).
    pub months: Vec<String>,
    /// Event-type words a block must mention somewhere.
    pub event_categories: Vec<String>,
    /// Tokens matched against a node's class attribute to mark a candidate block.
    pub block_markers: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|s| s.to_string()).collect();
        Self {
            months: owned(&["March", "April", "May"]),
            event_categories: owned(&[
                "theater",
                "museum",
                "book reading",
                "tour",
                "panel discussion",
                "festival",
            ]),
            block_markers: owned(&["event", "listing", "schedule"]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Pause before every request, in milliseconds.
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            request_delay_ms: 0,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResolverMode {
    /// Use the filled-in query URL itself as the website.
    Query,
    /// Fetch the query URL and follow the first external result link.
    Search,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub mode: ResolverMode,
    /// URL template; `{query}` is replaced by the organization name.
    pub query_template: String,
    /// Links containing this domain are never taken as an organization's site.
    pub search_domain: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            mode: ResolverMode::Query,
            query_template: "https://www.google.com/search?q={query}+official+website".to_string(),
            search_domain: "google.com".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads a JSON config file; missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        tracing::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Builds the reporting window, rejecting inverted bounds.
    pub fn reporting_window(&self) -> Result<ReportingWindow, ConfigError> {
        let window = ReportingWindow::new(self.window.start, self.window.end)?;
        if self.window.start.year() != self.window.end.year() {
            tracing::warn!(
                "Window {} - {} spans a year boundary; partial dates are back-filled with {}",
                self.window.start,
                self.window.end,
                window.reporting_year()
            );
        }
        Ok(window)
    }
}

/// Parses a `YYYY-MM-DD` command-line date.
pub fn parse_cli_date(text: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(text.to_string()))
}
