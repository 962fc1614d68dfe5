//! Web search tool backed by the Brave Search API.
//!
//! Offered to the model only when an API key is configured.

use async_trait::async_trait;
use memoh_core::error::ToolError;
use memoh_core::tool::{Tool, ToolResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Credentials and limits for the web search capability.
#[derive(Clone, Default)]
pub struct WebSearchSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_results: usize,
}

impl WebSearchSettings {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: "https://api.search.brave.com/res/v1".into(),
            max_results: 5,
        }
    }

    /// The tool, if a non-empty key is configured.
    pub fn tool(&self) -> Option<BraveSearchTool> {
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        Some(BraveSearchTool::new(key, &self.base_url, self.max_results))
    }
}

impl std::fmt::Debug for WebSearchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish()
    }
}

pub struct BraveSearchTool {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_results: usize,
}

impl BraveSearchTool {
    pub fn new(api_key: impl Into<String>, base_url: &str, max_results: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_results: max_results.max(1),
        }
    }

    fn failed(&self, reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: "web-search".into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tool for BraveSearchTool {
    fn name(&self) -> &str {
        "web-search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns a list of relevant results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return",
                    "default": self.max_results
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let count = arguments["num_results"]
            .as_u64()
            .map_or(self.max_results, |n| n as usize)
            .clamp(1, 20);

        debug!(query, count, "Brave web search");
        let count_param = count.to_string();

        let response = self
            .client
            .get(format!("{}/web/search", self.base_url))
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query), ("count", count_param.as_str())])
            .send()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Brave search returned error");
            return Err(self.failed(format!("search API returned {status}")));
        }

        let body: BraveResponse = response
            .json()
            .await
            .map_err(|e| self.failed(format!("Failed to parse search response: {e}")))?;

        let results = body.into_results(count);
        if results.is_empty() {
            return Ok(ToolResult::text(format!("No results found for '{query}'.")));
        }

        let data = serde_json::to_value(&results).map_err(|e| self.failed(e.to_string()))?;
        Ok(ToolResult::json(data))
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

impl BraveResponse {
    fn into_results(self, count: usize) -> Vec<SearchResult> {
        self.web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .take(count)
            .map(|r| SearchResult {
                title: r.title,
                url: r.url,
                snippet: r.description,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_key_means_no_tool() {
        assert!(WebSearchSettings::new(None).tool().is_none());
        assert!(WebSearchSettings::new(Some("  ".into())).tool().is_none());
        assert!(WebSearchSettings::new(Some("key".into())).tool().is_some());
    }

    #[test]
    fn debug_redacts_key() {
        let settings = WebSearchSettings::new(Some("brave-secret".into()));
        assert!(!format!("{settings:?}").contains("brave-secret"));
    }

    #[test]
    fn parses_brave_response() {
        let body: BraveResponse = serde_json::from_value(serde_json::json!({
            "type": "search",
            "web": {
                "results": [
                    { "title": "Rust", "url": "https://www.rust-lang.org", "description": "A language" },
                    { "title": "Crates", "url": "https://crates.io" },
                    { "title": "Docs", "url": "https://docs.rs", "description": "Docs" }
                ]
            }
        }))
        .unwrap();

        let results = body.into_results(2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "A language");
        assert!(results[1].snippet.is_empty());
    }

    #[test]
    fn missing_web_section_yields_nothing() {
        let body: BraveResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(body.into_results(5).is_empty());
    }

    #[tokio::test]
    async fn missing_query_is_rejected() {
        let tool = BraveSearchTool::new("key", "http://127.0.0.1:9", 3);
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
