// src/web/resolver.rs
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{Html, Selector};

use crate::config::ResolverConfig;
use crate::web::client::PageFetcher;
use crate::utils::error::FetchError;

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to compile LINK_SELECTOR")
});

/// Finds the website to scrape for an organization.
///
/// `Ok(None)` means nothing usable was found; the pipeline reports that
/// organization as having no website.
#[async_trait]
pub trait WebsiteResolver: Send + Sync {
    async fn resolve(&self, organization: &str) -> Result<Option<String>, FetchError>;
}

/// Fills the organization name into a URL template whose query string holds a
/// `{query}` placeholder. The query is re-encoded, so reserved characters in
/// the name (`&`, `#`, ...) stay inside the parameter value.
pub fn build_query_url(template: &str, organization: &str) -> Result<String, FetchError> {
    let mut url = Url::parse(template)
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", template, e)))?;

    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    if !pairs.iter().any(|(_, value)| value.contains("{query}")) {
        return Err(FetchError::InvalidUrl(format!(
            "{}: no {{query}} placeholder in the query string",
            template
        )));
    }

    let name = organization.trim();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(key, value)| (key, value.replace("{query}", name))));
    Ok(url.to_string())
}

/// Uses the templated query URL itself as the website.
#[derive(Debug, Clone)]
pub struct QueryTemplateResolver {
    template: String,
}

impl QueryTemplateResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self { template: config.query_template.clone() }
    }
}

#[async_trait]
impl WebsiteResolver for QueryTemplateResolver {
    async fn resolve(&self, organization: &str) -> Result<Option<String>, FetchError> {
        build_query_url(&self.template, organization).map(Some)
    }
}

/// Fetches the search results page and takes the first external link.
pub struct SearchLinkResolver<F: PageFetcher> {
    fetcher: F,
    template: String,
    search_domain: String,
}

impl<F: PageFetcher> SearchLinkResolver<F> {
    pub fn new(fetcher: F, config: &ResolverConfig) -> Self {
        Self {
            fetcher,
            template: config.query_template.clone(),
            search_domain: config.search_domain.clone(),
        }
    }
}

#[async_trait]
impl<F: PageFetcher> WebsiteResolver for SearchLinkResolver<F> {
    async fn resolve(&self, organization: &str) -> Result<Option<String>, FetchError> {
        // Built fresh from this organization's name on every call.
        let query_url = build_query_url(&self.template, organization)?;
        tracing::debug!("Searching for '{}' via {}", organization, query_url);

        let Some(results_page) = self.fetcher.fetch(&query_url).await? else {
            return Ok(None);
        };
        Ok(first_external_link(&results_page, &query_url, &self.search_domain))
    }
}

/// First `href` that contains "http" and not the search engine's own domain.
/// Redirect links of the form `/url?q=<target>&...` on the search host are
/// unwrapped to their target first.
pub fn first_external_link(results_html: &str, search_url: &str, search_domain: &str) -> Option<String> {
    let base = Url::parse(search_url).ok();
    let document = Html::parse_document(results_html);
    document
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| match &base {
            Some(base) => unwrap_redirect(base, href),
            None => href.to_string(),
        })
        .find(|href| href.contains("http") && !href.contains(search_domain))
}

fn unwrap_redirect(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(joined) if joined.path() == "/url" && joined.host_str() == base.host_str() => joined
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, target)| target.into_owned())
            .unwrap_or_else(|| href.to_string()),
        _ => href.to_string(),
    }
}
