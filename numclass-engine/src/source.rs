//! 规则源解析（分类配置 JSON）
//! 文档格式：{ "categories": [ { "label": "<string>", "rule": "<string>" }, ... ] }
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnalysisError, AnalysisResult};

/// 单条规则定义（标签 + 规则源码）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleSpec {
    pub label: String,
    pub rule: String,
}

impl RuleSpec {
    pub fn new(label: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rule: rule.into(),
        }
    }
}

/// 分类配置文档（categories 顺序即规则声明顺序）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleDocument {
    pub categories: Vec<RuleSpec>,
}

/// 解析后的配置：原始 JSON 值 + 强类型文档
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    /// 原样保留的解析结果，用于与源文件做往返比对
    pub raw: Value,
    pub document: RuleDocument,
}

impl ParsedConfig {
    pub fn specs(&self) -> &[RuleSpec] {
        &self.document.categories
    }
}

/// 分类配置解析器
#[derive(Debug, Clone, Default)]
pub struct RuleSourceParser;

impl RuleSourceParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析 JSON 文本；语法错误与结构错误均原样携带 serde_json 诊断信息
    pub fn parse_from_str(&self, content: &str) -> AnalysisResult<ParsedConfig> {
        let raw: Value = serde_json::from_str(content).map_err(malformed)?;
        self.parse_from_value(raw)
    }

    pub fn parse_from_bytes(&self, bytes: &[u8]) -> AnalysisResult<ParsedConfig> {
        let raw: Value = serde_json::from_slice(bytes).map_err(malformed)?;
        self.parse_from_value(raw)
    }

    pub fn parse_from_value(&self, raw: Value) -> AnalysisResult<ParsedConfig> {
        let document = RuleDocument::deserialize(&raw).map_err(malformed)?;
        Ok(ParsedConfig { raw, document })
    }
}

fn malformed(err: serde_json::Error) -> AnalysisError {
    AnalysisError::ConfigurationMalformed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_document() {
        let content = r#"{"categories": [{"label": "Prime", "rule": "prime"}, {"label": "Div5", "rule": "lambda x: x % 5 == 0"}]}"#;
        let parsed = RuleSourceParser::new().parse_from_str(content).unwrap();

        assert_eq!(
            parsed.specs(),
            &[
                RuleSpec::new("Prime", "prime"),
                RuleSpec::new("Div5", "lambda x: x % 5 == 0"),
            ]
        );
        assert_eq!(parsed.raw, serde_json::from_str::<Value>(content).unwrap());
    }

    #[test]
    fn test_extra_fields_are_kept_in_raw() {
        let raw = json!({
            "version": 2,
            "categories": [{"label": "Even", "rule": "even", "note": "built-in"}]
        });
        let parsed = RuleSourceParser::new().parse_from_value(raw.clone()).unwrap();
        assert_eq!(parsed.raw, raw);
        assert_eq!(parsed.specs().len(), 1);
    }

    #[test]
    fn test_invalid_json_reports_position() {
        let content = r#"{"categories": [{"label": "Even","rule"= "even"}]}"#;
        let err = RuleSourceParser::new().parse_from_str(content).unwrap_err();
        let message = err.to_string();

        assert!(matches!(err, AnalysisError::ConfigurationMalformed(_)));
        assert!(message.starts_with("config file could not be read: "));
        assert!(message.contains("expected `:`"), "{}", message);
        assert!(message.contains("line 1 column"), "{}", message);
    }

    #[test]
    fn test_missing_categories() {
        let err = RuleSourceParser::new().parse_from_str(r#"{"rules": []}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `categories`"));
    }

    #[test]
    fn test_wrong_rule_type() {
        let err = RuleSourceParser::new()
            .parse_from_bytes(br#"{"categories": [{"label": "X", "rule": 5}]}"#)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ConfigurationMalformed(_)));
    }
}
