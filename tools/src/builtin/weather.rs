//! Weather lookup capability.

use anyhow::Result;
use async_trait::async_trait;
use cotools_core::ToolParams;

use crate::builtin::title_case;
use crate::capability::{get_str, ToolCapability};

/// Simulated weather information for a location and date
pub struct WeatherApi;

impl WeatherApi {
    /// Pull a location out of free text: the word following an "in".
    fn guess_location(query: &str) -> Option<String> {
        let lower = query.to_lowercase();
        let idx = lower.find(" in ")?;
        let token = lower[idx + 4..].split_whitespace().next()?;
        let cleaned: String = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_string();
        if cleaned.is_empty() {
            None
        } else {
            Some(title_case(&cleaned))
        }
    }
}

#[async_trait]
impl ToolCapability for WeatherApi {
    fn name(&self) -> &str {
        "WeatherAPI"
    }

    async fn call(&self, params: &ToolParams) -> Result<String> {
        let query = get_str(params, "query").unwrap_or("");
        let location = get_str(params, "location")
            .map(str::to_string)
            .or_else(|| Self::guess_location(query))
            .unwrap_or_else(|| "your destination".to_string());
        let date = get_str(params, "date").map(str::to_string).unwrap_or_else(|| {
            let lower = query.to_lowercase();
            if lower.contains("today") {
                "today".to_string()
            } else {
                "yesterday".to_string()
            }
        });

        Ok(match date.as_str() {
            "yesterday" => format!("Weather in {location} yesterday: Cloudy, 65°F"),
            "today" => format!("Weather in {location} today: Sunny, 72°F"),
            other => format!("Weather in {location} on {other}: Data not available"),
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

    #[tokio::test]
    async fn location_is_guessed_from_the_query() {
        let result = WeatherApi
            .call(&query_params("What was the weather in Paris yesterday?"))
            .await
            .unwrap();
        assert_eq!(result, "Weather in Paris yesterday: Cloudy, 65°F");
    }

    #[tokio::test]
    async fn explicit_parameters_take_precedence() {
        let mut params = query_params("irrelevant");
        params.insert("location".to_string(), ParamValue::from("Berlin"));
        params.insert("date".to_string(), ParamValue::from("today"));
        let result = WeatherApi.call(&params).await.unwrap();
        assert_eq!(result, "Weather in Berlin today: Sunny, 72°F");
    }

    #[tokio::test]
    async fn unknown_dates_report_no_data() {
        let mut params = query_params("weather in Rome");
        params.insert("date".to_string(), ParamValue::from("2025-01-01"));
        let result = WeatherApi.call(&params).await.unwrap();
        assert!(result.contains("Data not available"));
    }
}
