use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;
use strum::{
    Display,
    EnumString,
};
use url::Url;

/// One polled rate source.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Label of the source, written as the `source` tag.
    pub name: String,
    pub endpoint: Url,
    pub rule: ExtractionRule,
    /// Partner id sent to JSON API sources. Falls back to the global partner id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_credential: Option<String>,
    /// Whether points of this source carry the `source` tag.
    #[serde(default = "default_tagged")]
    pub tagged: bool,
}

fn default_tagged() -> bool {
    true
}

fn default_duration_days() -> u32 {
    1
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint.as_str())
            .field("rule", &self.rule)
            .field("api_credential", &self.api_credential.as_ref().map(|_| "<redacted>"))
            .field("tagged", &self.tagged)
            .finish()
    }
}

impl SourceConfig {
    pub fn kind(&self) -> SourceKind {
        match self.rule {
            ExtractionRule::HtmlPattern { .. } => SourceKind::HtmlPattern,
            ExtractionRule::JsonApi { .. } => SourceKind::JsonApi,
        }
    }
}

/// How the rate is located in a fetched response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionRule {
    /// Regular expression whose first capture group is the rate, applied to the page text.
    HtmlPattern {
        pattern: String,
        #[serde(default)]
        strategy: TextStrategy,
    },
    /// Dotted path into a JSON document, numeric segments index arrays.
    JsonApi {
        path: String,
        #[serde(default = "default_duration_days")]
        duration_days: u32,
    },
}

#[derive(Debug, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    HtmlPattern,
    JsonApi,
}

/// Which text of an HTML document the pattern is matched against.
#[derive(Debug, Default, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TextStrategy {
    /// All text nodes of the document concatenated. Survives markup that splits the phrase across elements.
    #[default]
    FullText,
    /// Every text node on its own, the first matching node wins.
    TextNodes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_both_rule_kinds() {
        let sources: Vec<SourceConfig> = serde_yml::from_str(
            r#"
- name: Bank
  endpoint: https://bank.example/
  tagged: false
  rule:
    kind: html_pattern
    pattern: 'as low as (\d+\.\d+)%'
    strategy: text_nodes
- name: Api
  endpoint: https://api.example/rates
  api_credential: secret
  rule:
    kind: json_api
    path: rates.0.apr
"#,
        )
        .unwrap();

        assert_eq!(sources[0].kind(), SourceKind::HtmlPattern);
        assert!(!sources[0].tagged);
        assert_eq!(
            sources[0].rule,
            ExtractionRule::HtmlPattern {
                pattern: r"as low as (\d+\.\d+)%".to_string(),
                strategy: TextStrategy::TextNodes,
            }
        );

        assert_eq!(sources[1].kind(), SourceKind::JsonApi);
        assert!(sources[1].tagged);
        assert_eq!(
            sources[1].rule,
            ExtractionRule::JsonApi {
                path: "rates.0.apr".to_string(),
                duration_days: 1,
            }
        );
    }

    #[test]
    fn debug_output_hides_the_credential() {
        let source = SourceConfig {
            name: "Api".to_string(),
            endpoint: "https://api.example/".parse().unwrap(),
            rule: ExtractionRule::JsonApi {
                path: "apr".to_string(),
                duration_days: 1,
            },
            api_credential: Some("very-secret".to_string()),
            tagged: true,
        };
        let debug = format!("{source:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn strategy_names() {
        assert_eq!(TextStrategy::FullText.to_string(), "full_text");
        assert_eq!("text_nodes".parse::<TextStrategy>().unwrap(), TextStrategy::TextNodes);
        assert_eq!(SourceKind::JsonApi.to_string(), "json_api");
    }
}
