//! Generic web search capability.

use anyhow::Result;
use async_trait::async_trait;
use cotools_core::ToolParams;

use crate::capability::{get_str, ToolCapability};

/// Simulated information search
pub struct SearchApi;

#[async_trait]
impl ToolCapability for SearchApi {
    fn name(&self) -> &str {
        "SearchAPI"
    }

    async fn call(&self, params: &ToolParams) -> Result<String> {
        let query = get_str(params, "query").unwrap_or("");
        Ok(format!(
            "Search results for '{query}': Found relevant information about {query}."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cotools_core::ParamValue;

    #[tokio::test]
    async fn result_echoes_the_query() {
        let mut params = ToolParams::new();
        params.insert("query".to_string(), ParamValue::from("weather in Paris"));
        let result = SearchApi.call(&params).await.unwrap();
        assert!(result.starts_with("Search results for 'weather in Paris'"));
    }
}
