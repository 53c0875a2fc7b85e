//! Timestamp marker scraping from the video page

use crate::error::{ConfigError, PageFetchError};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

/// Anchors pointing at the page itself, which is how description time-links render
pub const PLACEHOLDER_LINKS: &str = r##"a[href="#"]"##;

/// Strategy turning a page into its ordered list of raw timestamp markers
pub trait MarkerExtractor {
    fn extract(&self, html: &str) -> Vec<String>;
}

/// Text of every element matching a CSS selector, in document order
#[derive(Debug, Clone)]
pub struct SelectorMarkers {
    selector: Selector,
}

impl SelectorMarkers {
    pub fn new(css: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(css).map_err(|e| {
            ConfigError::InvalidValue(format!("invalid marker selector {css:?}: {e}"))
        })?;
        Ok(Self { selector })
    }

    pub fn placeholder_links() -> Self {
        Self {
            selector: Selector::parse(PLACEHOLDER_LINKS).expect("static selector is valid"),
        }
    }
}

impl Default for SelectorMarkers {
    fn default() -> Self {
        Self::placeholder_links()
    }
}

impl MarkerExtractor for SelectorMarkers {
    fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .collect()
    }
}

/// Downloads video pages
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, PageFetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(PageFetchError::Client)?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<String, PageFetchError> {
        debug!("GET {}", url);

        let request_error = |source| PageFetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageFetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(request_error)
    }

    /// Fetch the page and apply `extractor` to it
    pub async fn fetch_timestamp_markers(
        &self,
        url: &str,
        extractor: &dyn MarkerExtractor,
    ) -> Result<Vec<String>, PageFetchError> {
        let html = self.fetch(url).await?;
        let markers = extractor.extract(&html);
        info!("Found {} timestamp markers", markers.len());
        Ok(markers)
    }
}
