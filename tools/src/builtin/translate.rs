//! Translation capability.

use anyhow::Result;
use async_trait::async_trait;
use cotools_core::ToolParams;

use crate::capability::{get_str, ToolCapability};

/// Languages recognized in free text, mapped to display names
const LANGUAGES: &[(&str, &str)] = &[
    ("french", "French"),
    ("spanish", "Spanish"),
    ("german", "German"),
    ("italian", "Italian"),
    ("japanese", "Japanese"),
];

/// Simulated text translation
pub struct TranslateApi;

impl TranslateApi {
    fn detect_language(text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        LANGUAGES
            .iter()
            .find(|(key, _)| lower.contains(key))
            .map(|&(_, display)| display)
    }
}

#[async_trait]
impl ToolCapability for TranslateApi {
    fn name(&self) -> &str {
        "TranslateAPI"
    }

    async fn call(&self, params: &ToolParams) -> Result<String> {
        let query = get_str(params, "query").unwrap_or("");
        let text = get_str(params, "text").unwrap_or(query);
        let source = get_str(params, "source_lang").unwrap_or("auto");
        let target = get_str(params, "target_lang")
            .map(str::to_string)
            .or_else(|| Self::detect_language(query).map(str::to_string))
            .unwrap_or_else(|| "English".to_string());

        Ok(format!(
            "Translation of '{text}' from {source} to {target}: [translated text would appear here]"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cotools_core::ParamValue;

    #[tokio::test]
    async fn target_language_is_detected_from_the_query() {
        let mut params = ToolParams::new();
        params.insert(
            "query".to_string(),
            ParamValue::from("translate hello to french"),
        );
        let result = TranslateApi.call(&params).await.unwrap();
        assert!(result.contains("to French"));
    }

    #[tokio::test]
    async fn explicit_languages_take_precedence() {
        let mut params = ToolParams::new();
        params.insert("text".to_string(), ParamValue::from("bonjour"));
        params.insert("source_lang".to_string(), ParamValue::from("fr"));
        params.insert("target_lang".to_string(), ParamValue::from("en"));
        let result = TranslateApi.call(&params).await.unwrap();
        assert_eq!(
            result,
            "Translation of 'bonjour' from fr to en: [translated text would appear here]"
        );
    }
}
