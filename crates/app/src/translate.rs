//! Line-by-line machine translation over HTTP

use overlay::assist::AssistError;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_TARGET_LANG: &str = "zh-CN";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Translator {
    client: Client,
    target_lang: String,
}

impl Translator {
    pub fn new(target_lang: impl Into<String>) -> Result<Self, AssistError> {
        let client = Client::builder()
            .user_agent(concat!("refscrn/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AssistError::Network(e.to_string()))?;
        Ok(Self { client, target_lang: target_lang.into() })
    }

    /// Translate one piece of text with source language detection
    pub fn translate(&self, text: &str) -> Result<String, AssistError> {
        let body = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| AssistError::Network(e.to_string()))?;
        parse_response(&body)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The body is a nested array whose first element lists
/// `[translated, original, ...]` segments.
pub fn parse_response(body: &str) -> Result<String, AssistError> {
    let root: Value = serde_json::from_str(body).map_err(|e| AssistError::Parse(e.to_string()))?;
    let segments = root
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| AssistError::Parse("missing segment list".into()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(AssistError::Parse("no translated segments".into()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_segments() {
        let body = r#"[[["你好，","Hello, ",null,null,10],["世界","world",null,null,10]],null,"en"]"#;
        assert_eq!(parse_response(body).unwrap(), "你好，世界");
    }

    #[test]
    fn skips_malformed_segments() {
        let body = r#"[[["一",null],[null,"x"],["二","two"]],null,"en"]"#;
        assert_eq!(parse_response(body).unwrap(), "一二");
    }

    #[test]
    fn rejects_unexpected_shapes() {
        assert!(matches!(parse_response("not json"), Err(AssistError::Parse(_))));
        assert!(matches!(parse_response(r#"{"a":1}"#), Err(AssistError::Parse(_))));
        assert!(matches!(parse_response("[null]"), Err(AssistError::Parse(_))));
        assert!(matches!(parse_response("[[]]"), Err(AssistError::Parse(_))));
    }
}
