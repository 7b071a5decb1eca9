//! Country capital lookup capability.

use anyhow::Result;
use async_trait::async_trait;
use cotools_core::ToolParams;

use crate::builtin::title_case;
use crate::capability::{get_str, ToolCapability};

/// Sample capital data
const CAPITALS: &[(&str, &str)] = &[
    ("france", "Paris"),
    ("germany", "Berlin"),
    ("italy", "Rome"),
    ("spain", "Madrid"),
    ("united kingdom", "London"),
    ("usa", "Washington D.C."),
    ("canada", "Ottawa"),
    ("japan", "Tokyo"),
    ("china", "Beijing"),
    ("australia", "Canberra"),
];

/// Capital city lookup over a fixed country table
pub struct CapitalApi;

impl CapitalApi {
    fn detect_country(text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        CAPITALS
            .iter()
            .map(|&(country, _)| country)
            .find(|country| lower.contains(country))
    }

    fn lookup(country: &str) -> String {
        let key = country.to_lowercase();
        match CAPITALS.iter().find(|&&(name, _)| name == key) {
            Some(&(_, capital)) => {
                format!("The capital of {} is {}", title_case(&key), capital)
            }
            None => format!("Capital information for {} not found", title_case(&key)),
        }
    }
}

#[async_trait]
impl ToolCapability for CapitalApi {
    fn name(&self) -> &str {
        "CapitalAPI"
    }

    async fn call(&self, params: &ToolParams) -> Result<String> {
        if let Some(country) = get_str(params, "country") {
            return Ok(Self::lookup(country));
        }
        let query = get_str(params, "query").unwrap_or("");
        let context = get_str(params, "context").unwrap_or("");
        match Self::detect_country(query).or_else(|| Self::detect_country(context)) {
            Some(country) => Ok(Self::lookup(country)),
            None => Ok("Capital information not found: no country was named".to_string()),
        }
    }
}
