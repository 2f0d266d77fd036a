//! Fetches a web page and reduces it to the text a reader would see.

use std::time::Duration;

use reqwest::{Client, Url};
use scraper::{Html, Node};

use super::ExtractError;
use crate::core::config::service::WebConfig;

/// Elements whose text content is never rendered.
const HIDDEN_ELEMENTS: [&str; 6] = ["head", "script", "style", "noscript", "template", "iframe"];

#[derive(Clone)]
pub struct WebExtractor {
    client: Client,
}

impl WebExtractor {
    pub fn new(config: &WebConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ExtractError::Fetch(e.to_string()))?;
        Ok(Self { client })
    }

    /// Downloads `url` and returns its visible text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ExtractError> {
        let parsed = parse_http_url(url)?;

        tracing::debug!(url = %parsed, "Fetching web page");
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ExtractError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Fetch(format!("HTTP status {}", status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ExtractError::Fetch(e.to_string()))?;

        // CPU-bound; runs on the blocking pool.
        tokio::task::spawn_blocking(move || html_to_text(&html))
            .await
            .map_err(|e| ExtractError::Fetch(format!("parse task failed: {}", e)))
    }
}

fn parse_http_url(url: &str) -> Result<Url, ExtractError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ExtractError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ExtractError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            other
        ))),
    }
}

/// Strips markup, scripts and styles, keeping one trimmed line per text run.
///
/// The tree is walked with an explicit stack, so nesting depth is bounded by
/// heap rather than by the thread's stack.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();
    let mut pending = vec![document.tree.root()];

    while let Some(node) = pending.pop() {
        match node.value() {
            Node::Element(element) if HIDDEN_ELEMENTS.contains(&element.name()) => continue,
            Node::Text(text) => lines.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            ),
            _ => {}
        }
        pending.extend(node.children().rev());
    }

    lines.join("\n")
}
