// src/events/block.rs

// --- Imports ---
use crate::config::VocabularyConfig;
use crate::events::dates::DateTextResolver;
use crate::events::models::{format_iso, EventRecord, RawFieldSignals, TIME_TBD};
use crate::events::window::ReportingWindow;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
// Anything carrying a class attribute may be a candidate block
static CLASSED_ELEMENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[class]").expect("Failed to compile CLASSED_ELEMENT_SELECTOR")
});

// Event title: primary heading, then the fallback
static PRIMARY_HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h2").expect("Failed to compile PRIMARY_HEADING_SELECTOR")
});

static SECONDARY_HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h3").expect("Failed to compile SECONDARY_HEADING_SELECTOR")
});

// --- Regex Patterns ---
// "7:30 PM", "10:00am"
pub(crate) static TIME_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d{1,2}:\d{2}\s?(AM|PM)").expect("Failed to compile TIME_TEXT_RE")
});

/// Builds a case-insensitive alternation over literal words.
fn word_alternation<S: AsRef<str>>(
    words: &[S],
    vocabulary: &'static str,
    word_bounded: bool,
) -> Result<Regex, ExtractError> {
    let escaped: Vec<String> = words
        .iter()
        .map(|w| w.as_ref().trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return Err(ExtractError::EmptyVocabulary(vocabulary));
    }
    let pattern = if word_bounded {
        format!(r"(?i)\b({})\b", escaped.join("|"))
    } else {
        format!(r"(?i)({})", escaped.join("|"))
    };
    Regex::new(&pattern).map_err(|e| ExtractError::RegexError(e.to_string()))
}

/// Text of an element with each text node trimmed, joined by single spaces.
fn clean_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First descendant text node the pattern matches, trimmed.
fn first_matching_fragment(block: ElementRef, pattern: &Regex) -> Option<String> {
    block
        .text()
        .find(|fragment| pattern.is_match(fragment))
        .map(|fragment| fragment.trim().to_string())
}

// --- Strategy Trait ---
/// Pulls raw field text out of one candidate block.
///
/// The extractor only cares that a strategy fills in [`RawFieldSignals`];
/// site-specific or structured-data-aware strategies can be swapped in with
/// [`EventBlockExtractor::with_strategy`].
pub trait FieldStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract_fields(&self, block: ElementRef<'_>) -> RawFieldSignals;
}

/// Default strategy: independent keyword/regex searches over the block's text nodes.
#[derive(Debug, Clone)]
pub struct LexicalFieldStrategy {
    month_re: Regex,
    category_re: Regex,
}

impl LexicalFieldStrategy {
    pub fn new(vocabulary: &VocabularyConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            month_re: word_alternation(&vocabulary.months, "months", true)?,
            category_re: word_alternation(&vocabulary.event_categories, "event_categories", false)?,
        })
    }

    /// First primary heading with text, else the first secondary heading with text.
    fn heading_text(block: ElementRef) -> Option<String> {
        let first_with_text = |selector: &Selector| {
            block
                .select(selector)
                .next()
                .map(clean_text)
                .filter(|text| !text.is_empty())
        };
        first_with_text(&*PRIMARY_HEADING_SELECTOR)
            .or_else(|| first_with_text(&*SECONDARY_HEADING_SELECTOR))
    }
}

impl FieldStrategy for LexicalFieldStrategy {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn extract_fields(&self, block: ElementRef<'_>) -> RawFieldSignals {
        RawFieldSignals {
            name_text: Self::heading_text(block),
            date_text: first_matching_fragment(block, &self.month_re),
            time_text: first_matching_fragment(block, &TIME_TEXT_RE),
            category_text: first_matching_fragment(block, &self.category_re),
        }
    }
}

// --- Main Extractor ---
/// Finds candidate event blocks in a page and turns the ones that resolve to
/// an in-window date into [`EventRecord`]s.
pub struct EventBlockExtractor {
    marker_re: Regex,
    category_re: Regex,
    strategy: Box<dyn FieldStrategy>,
    dates: DateTextResolver,
    window: ReportingWindow,
}

impl EventBlockExtractor {
    pub fn new(vocabulary: &VocabularyConfig, window: ReportingWindow) -> Result<Self, ExtractError> {
        Ok(Self {
            marker_re: word_alternation(&vocabulary.block_markers, "block_markers", false)?,
            category_re: word_alternation(&vocabulary.event_categories, "event_categories", false)?,
            strategy: Box::new(LexicalFieldStrategy::new(vocabulary)?),
            dates: DateTextResolver::new(&vocabulary.months)?,
            window,
        })
    }

    /// Replaces the field strategy, keeping block detection, date resolution and the window.
    #[allow(dead_code)]
    pub fn with_strategy(mut self, strategy: Box<dyn FieldStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn window(&self) -> ReportingWindow {
        self.window
    }

    /// Runs one pass over a page. `review_flag` on the returned records is
    /// `false`; the caller stamps the owning organization's flag.
    pub fn extract(&self, page_html: &str, organization: &str, website: &str) -> Vec<EventRecord> {
        let document = Html::parse_document(page_html);
        let blocks = self.candidate_blocks(&document);
        tracing::debug!(
            "Found {} candidate blocks for '{}' ({} strategy)",
            blocks.len(),
            organization,
            self.strategy.name()
        );

        blocks
            .into_iter()
            .filter_map(|block| {
                let signals = self.strategy.extract_fields(block);
                self.record_from_signals(&signals, organization, website)
            })
            .collect()
    }

    /// Elements whose class attribute mentions one of the block markers, in document order.
    fn candidate_blocks<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document
            .select(&CLASSED_ELEMENT_SELECTOR)
            .filter(|el| {
                el.value()
                    .attr("class")
                    .is_some_and(|class| self.marker_re.is_match(class))
            })
            .collect()
    }

    /// Applies the completeness, date and window checks to one block's signals.
    pub fn record_from_signals(
        &self,
        signals: &RawFieldSignals,
        organization: &str,
        website: &str,
    ) -> Option<EventRecord> {
        if !signals.is_complete() {
            tracing::trace!("Discarding incomplete block: {:?}", signals);
            return None;
        }
        let name = signals.name_text.as_deref()?;
        let date_text = signals.date_text.as_deref()?;

        let range = self.dates.resolve(date_text, self.window.reporting_year())?;
        if !self.window.contains(range.start) {
            tracing::trace!("'{}' starts {} outside the window, dropped", name, range.start);
            return None;
        }

        Some(EventRecord {
            event_name: name.to_string(),
            start_date: format_iso(range.start),
            end_date: range.end.map(format_iso).unwrap_or_default(),
            time: signals
                .time_text
                .clone()
                .unwrap_or_else(|| TIME_TBD.to_string()),
            venue_organization: organization.to_string(),
            source_website: website.to_string(),
            review_flag: false,
        })
    }

    /// Regex/label pairs for the annotated debug page.
    pub fn debug_patterns(&self) -> Vec<(String, &'static str)> {
        vec![
            (
                format!(r#"(?i)class="[^"]*(?:{})[^"]*""#, self.marker_re.as_str().trim_start_matches("(?i)")),
                "block",
            ),
            (self.dates.pattern().to_string(), "date"),
            (TIME_TEXT_RE.as_str().to_string(), "time"),
            (self.category_re.as_str().to_string(), "category"),
        ]
    }
}
