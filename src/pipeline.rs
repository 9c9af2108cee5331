// src/pipeline.rs
use std::path::{Path, PathBuf};

use crate::events::{EventBlockExtractor, EventRecord};
use crate::orgs::OrganizationRecord;
use crate::utils::html_debug;
use crate::web::{PageFetcher, WebsiteResolver};

/// What happened for one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationStatus {
    /// Page fetched and scanned; number of events kept.
    Extracted(usize),
    /// The resolver found no website.
    NoWebsite,
    /// The site answered without usable content (non-success status).
    NoContent,
    /// Resolution or fetch failed; the message is the error text.
    FetchFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationOutcome {
    pub organization: String,
    pub website: Option<String>,
    pub status: OrganizationStatus,
}

/// Everything a run produced, events in processing order.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub events: Vec<EventRecord>,
    pub outcomes: Vec<OrganizationOutcome>,
}

impl PipelineReport {
    pub fn count(&self, predicate: impl Fn(&OrganizationStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}

/// Runs organizations one at a time: resolve website, fetch, extract.
pub struct ExtractionPipeline<R: WebsiteResolver, F: PageFetcher> {
    resolver: R,
    fetcher: F,
    extractor: EventBlockExtractor,
    debug_dir: Option<PathBuf>,
}

impl<R: WebsiteResolver, F: PageFetcher> ExtractionPipeline<R, F> {
    pub fn new(resolver: R, fetcher: F, extractor: EventBlockExtractor) -> Self {
        Self { resolver, fetcher, extractor, debug_dir: None }
    }

    /// Save every fetched page, raw and annotated, under `dir/<org-slug>/`.
    pub fn with_debug_dir(mut self, dir: PathBuf) -> Self {
        self.debug_dir = Some(dir);
        self
    }

    pub async fn run(&self, organizations: &[OrganizationRecord]) -> PipelineReport {
        let mut report = PipelineReport::default();
        let window = self.extractor.window();
        tracing::info!(
            "Scanning {} organizations for events starting {} to {}",
            organizations.len(),
            window.start(),
            window.end()
        );

        for (idx, org) in organizations.iter().enumerate() {
            tracing::info!(
                "[{}/{}] Processing '{}' ({})",
                idx + 1,
                organizations.len(),
                org.name,
                org.category
            );
            let (outcome, events) = self.process_organization(org).await;
            report.events.extend(events);
            report.outcomes.push(outcome);
        }

        tracing::info!(
            "Pipeline finished: {} events from {} organizations",
            report.events.len(),
            organizations.len()
        );
        report
    }

    /// Never fails: every error is folded into the returned outcome.
    async fn process_organization(&self, org: &OrganizationRecord) -> (OrganizationOutcome, Vec<EventRecord>) {
        let outcome = |website: Option<String>, status| OrganizationOutcome {
            organization: org.name.clone(),
            website,
            status,
        };

        let website = match self.resolver.resolve(&org.name).await {
            Ok(Some(website)) => website,
            Ok(None) => {
                tracing::info!("No website found for '{}'", org.name);
                return (outcome(None, OrganizationStatus::NoWebsite), Vec::new());
            }
            Err(e) => {
                tracing::warn!("Website lookup failed for '{}': {}", org.name, e);
                return (outcome(None, OrganizationStatus::FetchFailed(e.to_string())), Vec::new());
            }
        };

        let page = match self.fetcher.fetch(&website).await {
            Ok(Some(page)) => page,
            Ok(None) => {
                tracing::warn!("No content from {} for '{}'", website, org.name);
                return (outcome(Some(website), OrganizationStatus::NoContent), Vec::new());
            }
            Err(e) => {
                tracing::warn!("Error scraping {} for '{}': {}", website, org.name, e);
                return (
                    outcome(Some(website), OrganizationStatus::FetchFailed(e.to_string())),
                    Vec::new(),
                );
            }
        };

        if let Some(dir) = &self.debug_dir {
            self.save_debug_page(dir, &org.name, &page);
        }

        let mut events = self.extractor.extract(&page, &org.name, &website);
        for event in &mut events {
            event.review_flag = org.review_flag;
        }
        tracing::info!("Kept {} events for '{}'", events.len(), org.name);

        (outcome(Some(website), OrganizationStatus::Extracted(events.len())), events)
    }

    fn save_debug_page(&self, dir: &Path, organization: &str, page: &str) {
        let org_dir = dir.join(slugify(organization));
        if let Err(e) = std::fs::create_dir_all(&org_dir) {
            tracing::warn!("Failed to create debug directory {}: {}", org_dir.display(), e);
            return;
        }
        if let Err(e) = std::fs::write(org_dir.join("raw_page.html"), page) {
            tracing::warn!("Failed to save raw page for '{}': {}", organization, e);
        }
        let annotated = org_dir.join("page_annotated.html");
        match html_debug::create_debug_html(page, &annotated, &self.extractor.debug_patterns()) {
            Ok(()) => tracing::info!("Created annotated debug HTML: {}", annotated.display()),
            Err(e) => tracing::warn!("Failed to create debug HTML: {}", e),
        }
    }
}

/// Lowercase ASCII alphanumerics, everything else collapsed to single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() { "organization".to_string() } else { trimmed.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VocabularyConfig;
    use crate::events::ReportingWindow;
    use crate::utils::error::FetchError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    /// Maps an organization name to a fixed URL, or to nothing.
    struct TableResolver(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl WebsiteResolver for TableResolver {
        async fn resolve(&self, organization: &str) -> Result<Option<String>, FetchError> {
            Ok(self.0.get(organization).map(|url| url.to_string()))
        }
    }

    enum Canned {
        Page(&'static str),
        NotFound,
        Broken,
    }

    struct CannedFetcher(HashMap<&'static str, Canned>);

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
            match self.0.get(url) {
                Some(Canned::Page(html)) => Ok(Some(html.to_string())),
                Some(Canned::NotFound) | None => Ok(None),
                Some(Canned::Broken) => Err(FetchError::InvalidUrl(url.to_string())),
            }
        }
    }

    const GALA_PAGE: &str = r#"<html><body>
        <div class="schedule">
          <h2>Spring Gala</h2>
          <p>March 15</p>
          <p>Annual festival on the green</p>
        </div>
    </body></html>"#;

    const TOUR_PAGE: &str = r#"<html><body>
        <ul>
          <li class="event-item"><h3>Lighthouse Tour</h3><p>April 5 - April 6</p><p>10:00 AM</p><p>Guided tour</p></li>
          <li class="event-item"><h3>Summer Tour</h3><p>June 5</p><p>tour</p></li>
        </ul>
    </body></html>"#;

    fn extractor() -> EventBlockExtractor {
        let window = ReportingWindow::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
        )
        .unwrap();
        EventBlockExtractor::new(&VocabularyConfig::default(), window).unwrap()
    }

    fn org(name: &str, review_flag: bool) -> OrganizationRecord {
        OrganizationRecord {
            name: name.to_string(),
            category: if review_flag { "Misc" } else { "Theater" }.to_string(),
            review_flag,
        }
    }

    #[tokio::test]
    async fn test_single_schedule_block_end_to_end() {
        let resolver = TableResolver(HashMap::from([("Village Green", "https://green.example")]));
        let fetcher = CannedFetcher(HashMap::from([("https://green.example", Canned::Page(GALA_PAGE))]));
        let pipeline = ExtractionPipeline::new(resolver, fetcher, extractor());

        let report = pipeline.run(&[org("Village Green", true)]).await;

        assert_eq!(
            report.events,
            vec![EventRecord {
                event_name: "Spring Gala".into(),
                start_date: "2025-03-15".into(),
                end_date: "".into(),
                time: "TBD".into(),
                venue_organization: "Village Green".into(),
                source_website: "https://green.example".into(),
                review_flag: true,
            }]
        );
        assert_eq!(report.outcomes[0].status, OrganizationStatus::Extracted(1));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_organizations() {
        let resolver = TableResolver(HashMap::from([
            ("Broken Site", "https://broken.example"),
            ("Gone Site", "https://gone.example"),
            ("Lighthouse", "https://lighthouse.example"),
        ]));
        let fetcher = CannedFetcher(HashMap::from([
            ("https://broken.example", Canned::Broken),
            ("https://gone.example", Canned::NotFound),
            ("https://lighthouse.example", Canned::Page(TOUR_PAGE)),
        ]));
        let pipeline = ExtractionPipeline::new(resolver, fetcher, extractor());

        let orgs = [
            org("Broken Site", false),
            org("Nowhere", false),
            org("Gone Site", false),
            org("Lighthouse", false),
        ];
        let report = pipeline.run(&orgs).await;

        let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status.clone()).collect();
        assert!(matches!(statuses[0], OrganizationStatus::FetchFailed(_)));
        assert_eq!(statuses[1], OrganizationStatus::NoWebsite);
        assert_eq!(statuses[2], OrganizationStatus::NoContent);
        assert_eq!(statuses[3], OrganizationStatus::Extracted(1));
        assert_eq!(report.outcomes[1].website, None);

        assert_eq!(report.events.len(), 1);
        let tour = &report.events[0];
        assert_eq!(tour.event_name, "Lighthouse Tour");
        assert_eq!(tour.start_date, "2025-04-05");
        assert_eq!(tour.end_date, "2025-04-06");
        assert_eq!(tour.time, "10:00 AM");
        assert!(!tour.review_flag);

        assert_eq!(report.count(|s| matches!(s, OrganizationStatus::Extracted(_))), 1);
    }

    #[tokio::test]
    async fn test_flag_follows_owning_organization() {
        let resolver = TableResolver(HashMap::from([
            ("Flagged", "https://green.example"),
            ("Plain", "https://green.example"),
        ]));
        let fetcher = CannedFetcher(HashMap::from([("https://green.example", Canned::Page(GALA_PAGE))]));
        let pipeline = ExtractionPipeline::new(resolver, fetcher, extractor());

        let report = pipeline.run(&[org("Flagged", true), org("Plain", false)]).await;
        let flags: Vec<_> = report
            .events
            .iter()
            .map(|e| (e.venue_organization.as_str(), e.review_flag))
            .collect();
        assert_eq!(flags, vec![("Flagged", true), ("Plain", false)]);
    }

    #[tokio::test]
    async fn test_debug_pages_are_written() {
        let dir = std::env::temp_dir().join(format!("spring_events_pipeline_{}", std::process::id()));
        let resolver = TableResolver(HashMap::from([("Village Green", "https://green.example")]));
        let fetcher = CannedFetcher(HashMap::from([("https://green.example", Canned::Page(GALA_PAGE))]));
        let pipeline = ExtractionPipeline::new(resolver, fetcher, extractor()).with_debug_dir(dir.clone());

        pipeline.run(&[org("Village Green", false)]).await;

        let org_dir = dir.join("village-green");
        assert!(org_dir.join("raw_page.html").exists());
        let annotated = std::fs::read_to_string(org_dir.join("page_annotated.html")).unwrap();
        assert!(annotated.contains("highlight-date\" title"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Cape Cod Museum of Art"), "cape-cod-museum-of-art");
        assert_eq!(slugify("  A & B's Place! "), "a-b-s-place");
        assert_eq!(slugify("***"), "organization");
    }
}
