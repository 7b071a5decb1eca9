//! The tool executor: the invocation boundary implementation.
//!
//! Resolves tool names to registered capabilities, enforces the per-call
//! timeout and wraps capability failures into the typed boundary errors. No
//! retries happen here; retry policy belongs to the caller, and the reasoning
//! loop chooses not to retry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cotools_core::{InvokeError, ToolInvoker, ToolParams};
use tracing::{debug, warn};

use crate::builtin::{
    CalculatorApi, CapitalApi, NewsSearch, ProjectFileProcessor, SearchApi, TranslateApi,
    WeatherApi, WebContentFetcher, WebSearch,
};
use crate::capability::ToolCapability;

/// Registry of capabilities keyed by tool name
pub struct ToolExecutor {
    capabilities: HashMap<String, Arc<dyn ToolCapability>>,
    timeout: Duration,
}

impl ToolExecutor {
    /// Create an empty executor with the given per-call timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            capabilities: HashMap::new(),
            timeout,
        }
    }

    /// Create an executor with every built-in capability registered.
    ///
    /// The registered names match the default catalogue entries.
    pub fn with_builtin_tools(timeout: Duration) -> Self {
        let mut executor = Self::new(timeout);
        executor.register(Arc::new(WeatherApi));
        executor.register(Arc::new(CapitalApi));
        executor.register(Arc::new(SearchApi));
        executor.register(Arc::new(CalculatorApi));
        executor.register(Arc::new(TranslateApi));
        executor.register(Arc::new(WebSearch));
        executor.register(Arc::new(NewsSearch));
        executor.register(Arc::new(WebContentFetcher));
        executor.register(Arc::new(ProjectFileProcessor));
        executor
    }

    /// Register a capability under its own name, replacing any previous one
    pub fn register(&mut self, capability: Arc<dyn ToolCapability>) {
        let name = capability.name().to_string();
        if self.capabilities.insert(name.clone(), capability).is_some() {
            warn!("Replaced previously registered capability '{name}'");
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.capabilities.keys().map(String::as_str).collect()
    }
}

#[async_trait]
impl ToolInvoker for ToolExecutor {
    async fn invoke(&self, tool_name: &str, params: &ToolParams) -> Result<String, InvokeError> {
        let capability = self
            .capabilities
            .get(tool_name)
            .ok_or_else(|| InvokeError::UnknownTool(tool_name.to_string()))?;

        debug!(tool = tool_name, "Executing tool");
        match tokio::time::timeout(self.timeout, capability.call(params)).await {
            Err(_) => Err(InvokeError::Timeout {
                tool: tool_name.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(InvokeError::Execution {
                tool: tool_name.to_string(),
                message: format!("{e:#}"),
            }),
            Ok(Ok(result)) => {
                debug!(tool = tool_name, chars = result.len(), "Tool finished");
                Ok(result)
            }
        }
    }
}

impl std::fmt::Debug for ToolExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolExecutor")
            .field("capabilities", &self.names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use cotools_core::ParamValue;

    struct SlowCapability;

    #[async_trait]
    impl ToolCapability for SlowCapability {
        fn name(&self) -> &str {
            "SlowAPI"
        }

        async fn call(&self, _params: &ToolParams) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    struct BrokenCapability;

    #[async_trait]
    impl ToolCapability for BrokenCapability {
        fn name(&self) -> &str {
            "BrokenAPI"
        }

        async fn call(&self, _params: &ToolParams) -> Result<String> {
            Err(anyhow!("upstream rejected the request"))
        }
    }

    fn params_with_query(query: &str) -> ToolParams {
        let mut params = ToolParams::new();
        params.insert("query".to_string(), ParamValue::from(query));
        params
    }

    #[tokio::test]
    async fn unknown_tool_yields_typed_error() {
        let executor = ToolExecutor::new(Duration::from_secs(1));
        let err = executor
            .invoke("NoSuchAPI", &ToolParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::UnknownTool(name) if name == "NoSuchAPI"));
    }

    #[tokio::test]
    async fn capability_failure_is_wrapped_with_cause() {
        let mut executor = ToolExecutor::new(Duration::from_secs(1));
        executor.register(Arc::new(BrokenCapability));
        let err = executor
            .invoke("BrokenAPI", &ToolParams::new())
            .await
            .unwrap_err();
        match err {
            InvokeError::Execution { tool, message } => {
                assert_eq!(tool, "BrokenAPI");
                assert!(message.contains("upstream rejected"));
            }
            other => panic!("expected execution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_capability_times_out() {
        let mut executor = ToolExecutor::new(Duration::from_millis(50));
        executor.register(Arc::new(SlowCapability));
        let err = executor
            .invoke("SlowAPI", &ToolParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Timeout { tool, .. } if tool == "SlowAPI"));
    }

    #[tokio::test]
    async fn builtin_set_covers_default_catalogue_names() {
        let executor = ToolExecutor::with_builtin_tools(Duration::from_secs(5));
        for (name, _) in cotools_core::DEFAULT_TOOLS {
            assert!(executor.has(name), "missing capability for '{name}'");
        }
    }

    #[tokio::test]
    async fn builtin_weather_call_goes_through_the_boundary() {
        let executor = ToolExecutor::with_builtin_tools(Duration::from_secs(5));
        let result = executor
            .invoke("WeatherAPI", &params_with_query("weather in Paris yesterday"))
            .await
            .unwrap();
        assert!(result.contains("Paris"));
    }
}
