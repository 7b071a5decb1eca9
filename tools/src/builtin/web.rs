//! Web capabilities: search, news search and content fetching.

use anyhow::Result;
use async_trait::async_trait;
use cotools_core::ToolParams;

use crate::capability::{get_num, get_str, ToolCapability};

/// Simulated result pool depth
const AVAILABLE_RESULTS: usize = 3;

/// Percent-encode a query string for inclusion in a URL, spaces as `+`
fn quote_plus(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// Simulated web search returning titled results with URLs and snippets
pub struct WebSearch;

#[async_trait]
impl ToolCapability for WebSearch {
    fn name(&self) -> &str {
        "WebSearch"
    }

    async fn call(&self, params: &ToolParams) -> Result<String> {
        let query = get_str(params, "query").unwrap_or("");
        let num_results = get_num(params, "num_results").unwrap_or(5.0).max(0.0) as usize;
        let encoded = quote_plus(query);

        let ordinals = ["first", "second", "third"];
        let extras = [
            "It contains relevant information about the topic.",
            "It contains additional information about the topic.",
            "It provides a different perspective on the topic.",
        ];

        let mut formatted = format!("Search results for '{query}':\n");
        for i in 0..AVAILABLE_RESULTS.min(num_results) {
            formatted.push_str(&format!(
                "\n{}. Result {} for {query}\n   URL: https://example.com/search?q={encoded}&id={}\n   This is the {} result for {query}. {}\n",
                i + 1,
                i + 1,
                i + 1,
                ordinals[i],
                extras[i],
            ));
        }
        Ok(formatted)
    }
}

/// Simulated news search with an optional date window
pub struct NewsSearch;

#[async_trait]
impl ToolCapability for NewsSearch {
    fn name(&self) -> &str {
        "NewsSearch"
    }

    async fn call(&self, params: &ToolParams) -> Result<String> {
        let query = get_str(params, "query").unwrap_or("");
        let start_date = get_str(params, "start_date");
        let end_date = get_str(params, "end_date");
        let num_results = get_num(params, "num_results").unwrap_or(5.0).max(0.0) as usize;
        let encoded = quote_plus(query);

        let date_filter = match (start_date, end_date) {
            (Some(start), Some(end)) => format!(" from {start} to {end}"),
            (Some(start), None) => format!(" from {start}"),
            (None, Some(end)) => format!(" until {end}"),
            (None, None) => String::new(),
        };

        let articles = [
            ("published recently", "2025-03-30"),
            ("published last week", "2025-03-25"),
            ("", "2025-03-15"),
        ];

        let mut formatted = format!("News search results for '{query}'{date_filter}:\n");
        for (i, (recency, date)) in articles
            .iter()
            .take(AVAILABLE_RESULTS.min(num_results))
            .enumerate()
        {
            let description = if recency.is_empty() {
                format!("This is an older news article about {query}.")
            } else {
                format!("This is a news article about {query} {recency}.")
            };
            formatted.push_str(&format!(
                "\n{}. News {} about {query} ({date})\n   URL: https://news-example.com/article?q={encoded}&id={}\n   {description}\n",
                i + 1,
                i + 1,
                i + 1,
            ));
        }
        Ok(formatted)
    }
}

/// Simulated URL content fetcher
pub struct WebContentFetcher;

impl WebContentFetcher {
    fn extract_url(text: &str) -> Option<&str> {
        text.split_whitespace()
            .find(|token| token.starts_with("http://") || token.starts_with("https://"))
            .map(|token| token.trim_end_matches(&[',', '.', ')', ';'][..]))
    }
}

#[async_trait]
impl ToolCapability for WebContentFetcher {
    fn name(&self) -> &str {
        "WebContentFetcher"
    }

    async fn call(&self, params: &ToolParams) -> Result<String> {
        let url = get_str(params, "url").or_else(|| {
            get_str(params, "query")
                .and_then(Self::extract_url)
                .or_else(|| get_str(params, "context").and_then(Self::extract_url))
        });

        let Some(url) = url else {
            return Ok("Unable to fetch content: no URL was provided.".to_string());
        };

        Ok(if url.contains("example.com") {
            format!(
                "Content from {url}:\n\nThis is a simulated webpage content for {url}. It contains \
                 information that would typically be found on a webpage at this URL. The page \
                 discusses various aspects of the topic and provides useful information to the user."
            )
        } else if url.contains("news-example.com") {
            format!(
                "News article from {url}:\n\nThis is a simulated news article from {url}. It \
                 contains the latest information about the topic, including recent developments, \
                 expert opinions, and relevant facts."
            )
        } else {
            format!(
                "Unable to fetch content from {url}. The URL may be invalid or the content may \
                 not be accessible."
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cotools_core::ParamValue;

    fn query_params(query: &str) -> ToolParams {
        let mut params = ToolParams::new();
        params.insert("query".to_string(), ParamValue::from(query));
        params
    }

    #[test]
    fn quote_plus_encodes_spaces_and_reserved_bytes() {
        assert_eq!(quote_plus("current events in Paris"), "current+events+in+Paris");
        assert_eq!(quote_plus("a&b=c"), "a%26b%3Dc");
    }

    #[tokio::test]
    async fn web_search_lists_numbered_results() {
        let result = WebSearch.call(&query_params("rust agents")).await.unwrap();
        assert!(result.starts_with("Search results for 'rust agents':"));
        assert!(result.contains("1. Result 1 for rust agents"));
        assert!(result.contains("q=rust+agents&id=3"));
    }

    #[tokio::test]
    async fn web_search_honors_num_results() {
        let mut params = query_params("rust");
        params.insert("num_results".to_string(), ParamValue::from(1.0));
        let result = WebSearch.call(&params).await.unwrap();
        assert!(result.contains("1. Result 1"));
        assert!(!result.contains("2. Result 2"));
    }

    #[tokio::test]
    async fn news_search_formats_the_date_window() {
        let mut params = query_params("Paris news");
        params.insert("start_date".to_string(), ParamValue::from("2025-03-25"));
        params.insert("end_date".to_string(), ParamValue::from("2025-04-02"));
        let result = NewsSearch.call(&params).await.unwrap();
        assert!(result.starts_with(
            "News search results for 'Paris news' from 2025-03-25 to 2025-04-02:"
        ));
        assert!(result.contains("(2025-03-30)"));
    }

    #[tokio::test]
    async fn fetcher_extracts_url_from_query() {
        let result = WebContentFetcher
            .call(&query_params("summarize https://example.com/paris-guide please"))
            .await
            .unwrap();
        assert!(result.starts_with("Content from https://example.com/paris-guide:"));
    }

    #[tokio::test]
    async fn fetcher_reports_unreachable_hosts() {
        let result = WebContentFetcher
            .call(&query_params("fetch https://unknown-host.invalid/page"))
            .await
            .unwrap();
        assert!(result.starts_with("Unable to fetch content from"));
    }

    #[tokio::test]
    async fn fetcher_without_url_reports_soft_miss() {
        let result = WebContentFetcher.call(&query_params("no links here")).await.unwrap();
        assert_eq!(result, "Unable to fetch content: no URL was provided.");
    }
}
