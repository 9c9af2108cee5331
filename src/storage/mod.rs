// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::events::models::EVENT_COLUMNS;
use crate::events::{EventRecord, ReportingWindow};
use crate::pipeline::{OrganizationStatus, PipelineReport};
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Default export name derived from the window, e.g. `events_2025-03-01_2025-05-31.csv`.
    pub fn default_file_name(window: &ReportingWindow) -> String {
        format!("events_{}_{}.csv", window.start(), window.end())
    }

    /// Writes the event table as CSV. The header row is written even for an empty table.
    pub fn save_events(&self, events: &[EventRecord], file_name: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(file_name);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&file_path)?;
        writer.write_record(EVENT_COLUMNS)?;
        for event in events {
            writer.serialize(event)?;
        }
        writer.flush().map_err(StorageError::IoError)?;

        tracing::info!("Saved {} events to {}", events.len(), file_path.display());

        Ok(file_path)
    }

    /// Saves a JSON summary of the run next to the table.
    pub fn save_run_metadata(
        &self,
        report: &PipelineReport,
        window: &ReportingWindow,
        organizations: usize,
        file_name: &str,
    ) -> Result<PathBuf, StorageError> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("events");
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));

        let metadata = serde_json::json!({
            "window_start": window.start().to_string(),
            "window_end": window.end().to_string(),
            "organizations": organizations,
            "events": report.events.len(),
            "flagged_events": report.events.iter().filter(|e| e.review_flag).count(),
            "extracted": report.count(|s| matches!(s, OrganizationStatus::Extracted(_))),
            "no_website": report.count(|s| matches!(s, OrganizationStatus::NoWebsite)),
            "no_content": report.count(|s| matches!(s, OrganizationStatus::NoContent)),
            "fetch_failed": report.count(|s| matches!(s, OrganizationStatus::FetchFailed(_))),
            "events_file": file_name,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::OrganizationOutcome;
    use chrono::NaiveDate;

    fn temp_storage(tag: &str) -> StorageManager {
        let dir = std::env::temp_dir().join(format!("spring_events_storage_{}_{}", tag, std::process::id()));
        StorageManager::new(&dir).unwrap()
    }

    fn window() -> ReportingWindow {
        ReportingWindow::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
        )
        .unwrap()
    }

    fn gala(flag: bool) -> EventRecord {
        EventRecord {
            event_name: "Spring Gala, Part 2".into(),
            start_date: "2025-03-15".into(),
            end_date: "".into(),
            time: "TBD".into(),
            venue_organization: "Village Green".into(),
            source_website: "https://green.example".into(),
            review_flag: flag,
        }
    }

    #[test]
    fn test_table_columns_and_flag_rendering() {
        let storage = temp_storage("table");
        let path = storage.save_events(&[gala(true), gala(false)], "events.csv").unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = written.lines().collect();

        assert_eq!(
            lines[0],
            "Event Name,Start Date,End Date,Time,Venue/Organization,Website,Flag for Review"
        );
        assert_eq!(
            lines[1],
            "\"Spring Gala, Part 2\",2025-03-15,,TBD,Village Green,https://green.example,Yes"
        );
        assert!(lines[2].ends_with(",No"));

        fs::remove_dir_all(storage.base_dir()).ok();
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let storage = temp_storage("empty");
        let path = storage.save_events(&[], "events.csv").unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.starts_with("Event Name,"));

        fs::remove_dir_all(storage.base_dir()).ok();
    }

    #[test]
    fn test_metadata_counts() {
        let storage = temp_storage("meta");
        let report = PipelineReport {
            events: vec![gala(true)],
            outcomes: vec![
                OrganizationOutcome {
                    organization: "Village Green".into(),
                    website: Some("https://green.example".into()),
                    status: OrganizationStatus::Extracted(1),
                },
                OrganizationOutcome {
                    organization: "Nowhere".into(),
                    website: None,
                    status: OrganizationStatus::NoWebsite,
                },
            ],
        };
        let file_name = StorageManager::default_file_name(&window());
        assert_eq!(file_name, "events_2025-03-01_2025-05-31.csv");

        let path = storage.save_run_metadata(&report, &window(), 2, &file_name).unwrap();
        assert!(path.ends_with("events_2025-03-01_2025-05-31_meta.json"));

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["events"], 1);
        assert_eq!(json["flagged_events"], 1);
        assert_eq!(json["no_website"], 1);
        assert_eq!(json["fetch_failed"], 0);
        assert_eq!(json["window_start"], "2025-03-01");

        fs::remove_dir_all(storage.base_dir()).ok();
    }
}
