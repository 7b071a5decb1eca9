//! The capability contract and parameter access helpers.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use cotools_core::{ParamValue, ToolParams};

/// A concrete tool capability invocable through the boundary.
///
/// Capabilities receive the step parameters built by the reasoning loop
/// (always the original `query`, usually a `context` tail, optionally
/// tool-specific keys) and extract what they need. Soft conditions a user can
/// act on (missing file, unsupported format) are reported as result text, the
/// way an external API would; hard failures return errors and are wrapped by
/// the executor.
#[async_trait]
pub trait ToolCapability: Send + Sync {
    /// The name the capability is registered and invoked by
    fn name(&self) -> &str;

    /// Execute the capability with the given parameters
    async fn call(&self, params: &ToolParams) -> Result<String>;
}

/// String parameter by key, if present and a string
pub fn get_str<'a>(params: &'a ToolParams, key: &str) -> Option<&'a str> {
    match params.get(key) {
        Some(ParamValue::Str(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// Numeric parameter by key, if present and a number
pub fn get_num(params: &ToolParams, key: &str) -> Option<f64> {
    match params.get(key) {
        Some(ParamValue::Num(n)) => Some(*n),
        _ => None,
    }
}

/// String parameter by key, or a missing-argument error
pub fn require_str<'a>(params: &'a ToolParams, key: &str, tool: &str) -> Result<&'a str> {
    get_str(params, key)
        .ok_or_else(|| anyhow!("Missing required argument '{key}' for tool '{tool}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_distinguish_value_kinds() {
        let mut params = ToolParams::new();
        params.insert("query".to_string(), ParamValue::from("weather"));
        params.insert("count".to_string(), ParamValue::from(3.0));

        assert_eq!(get_str(&params, "query"), Some("weather"));
        assert_eq!(get_str(&params, "count"), None);
        assert_eq!(get_num(&params, "count"), Some(3.0));
        assert!(require_str(&params, "query", "T").is_ok());
        let err = require_str(&params, "missing", "T").unwrap_err();
        assert!(err.to_string().contains("Missing required argument"));
    }
}
