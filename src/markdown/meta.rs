//! Page metadata from YAML (`---`) or TOML (`+++`) frontmatter.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::utils::date::DateTimeUtc;

/// Extra frontmatter fields, kept as raw JSON.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Deserialize tags, treating `null` as empty vec
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Post metadata.
///
/// | Field     | Type          | Description                   |
/// |-----------|---------------|-------------------------------|
/// | `title`   | `String`      | Post title                    |
/// | `summary` | `String`      | Short description             |
/// | `date`    | `String`      | Publication date (ISO 8601)   |
/// | `update`  | `String`      | Last update date              |
/// | `author`  | `String`      | Author name                   |
/// | `draft`   | `bool`        | Draft status (default: false) |
/// | `tags`    | `Vec<String>` | Categorization tags           |
///
/// Any other key lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PageMeta {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub date: Option<String>,
    pub update: Option<String>,
    pub author: Option<String>,
    pub draft: bool,
    #[serde(deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl PageMeta {
    /// Parsed publication date, if present and well-formed.
    pub fn published(&self) -> Option<DateTimeUtc> {
        self.date.as_deref().and_then(DateTimeUtc::parse)
    }
}

/// Splits frontmatter from the markdown body.
pub struct MarkdownMetaExtractor;

impl MarkdownMetaExtractor {
    /// Extract frontmatter and return (metadata, body).
    ///
    /// `Ok(None)` when the content has no frontmatter.
    pub fn extract_frontmatter<'a>(&self, content: &'a str) -> Result<Option<(PageMeta, &'a str)>> {
        let Some((fm, body, is_toml)) = Self::detect_frontmatter(content) else {
            return Ok(None);
        };

        let meta = if is_toml {
            toml::from_str(fm).map_err(|e| anyhow!("invalid TOML frontmatter: {e}"))?
        } else {
            Self::parse_yaml_like(fm)
        };
        Ok(Some((meta, body)))
    }

    /// Frontmatter and body, defaulting to empty metadata.
    pub fn split<'a>(&self, content: &'a str) -> Result<(PageMeta, &'a str)> {
        Ok(self
            .extract_frontmatter(content)?
            .unwrap_or_else(|| (PageMeta::default(), content)))
    }

    /// Parse simple YAML-like frontmatter (`key: value` per line).
    fn parse_yaml_like(content: &str) -> PageMeta {
        let mut meta = PageMeta::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = unquote(value.trim());

            match key.trim().to_lowercase().as_str() {
                "title" => meta.title = Some(value.to_string()),
                "summary" | "description" => meta.summary = Some(value.to_string()),
                "date" => meta.date = Some(value.to_string()),
                "update" => meta.update = Some(value.to_string()),
                "author" => meta.author = Some(value.to_string()),
                "draft" => meta.draft = value.eq_ignore_ascii_case("true"),
                "tags" => {
                    meta.tags = value
                        .trim_start_matches('[')
                        .trim_end_matches(']')
                        .split(',')
                        .map(|s| unquote(s.trim()).to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
                _ => {
                    // Custom field (preserve original key case)
                    meta.extra
                        .insert(key.trim().to_string(), parse_yaml_value(value));
                }
            }
        }

        meta
    }

    /// Returns `(frontmatter, body, is_toml)` if found.
    fn detect_frontmatter(content: &str) -> Option<(&str, &str, bool)> {
        let trimmed = content.trim_start();

        for (fence, is_toml) in [("---", false), ("+++", true)] {
            let Some(rest) = trimmed.strip_prefix(fence) else {
                continue;
            };
            let close = format!("\n{fence}");
            let end = rest.find(&close)?;
            let fm = rest[..end].trim();
            let body = rest[end + close.len()..].trim_start_matches(['\r', '\n']);
            return Some((fm, body, is_toml));
        }

        None
    }
}

/// Strip one pair of matching quotes.
fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

/// Parse a YAML-like scalar: bool, null, number, comma list, else string.
fn parse_yaml_value(s: &str) -> serde_json::Value {
    use serde_json::Value;

    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if s.eq_ignore_ascii_case("null") || s == "~" {
        return Value::Null;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = s.parse::<f64>()
        && let Some(num) = serde_json::Number::from_f64(n)
    {
        return Value::Number(num);
    }
    if s.contains(',') {
        return Value::Array(
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        );
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_frontmatter() {
        let content = "---\ntitle: Hello\ndate: 2024-01-01\ntags: a, b\n---\n\n# Body";
        let (meta, body) = MarkdownMetaExtractor.extract_frontmatter(content).unwrap().unwrap();

        assert_eq!(meta.title.as_deref(), Some("Hello"));
        assert_eq!(meta.date.as_deref(), Some("2024-01-01"));
        assert_eq!(meta.tags, vec!["a", "b"]);
        assert!(body.starts_with("# Body"));
    }

    #[test]
    fn test_yaml_quoted_values_and_bracket_tags() {
        let content = "---\ntitle: \"松叶: notes\"\ntags: [rust, 'web']\ndraft: true\n---\nbody";
        let (meta, body) = MarkdownMetaExtractor.split(content).unwrap();

        assert_eq!(meta.title.as_deref(), Some("松叶: notes"));
        assert_eq!(meta.tags, vec!["rust", "web"]);
        assert!(meta.draft);
        assert_eq!(body, "body");
    }

    #[test]
    fn test_toml_frontmatter() {
        let content = "+++\ntitle = \"Hello\"\ntags = [\"a\", \"b\"]\ncustom = 42\n+++\n\n# Body";
        let (meta, body) = MarkdownMetaExtractor.extract_frontmatter(content).unwrap().unwrap();

        assert_eq!(meta.title.as_deref(), Some("Hello"));
        assert_eq!(meta.tags, vec!["a", "b"]);
        assert_eq!(meta.extra.get("custom"), Some(&serde_json::json!(42)));
        assert!(body.starts_with("# Body"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let content = "+++\ntitle = \n+++\n";
        assert!(MarkdownMetaExtractor.extract_frontmatter(content).is_err());
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just content";
        assert!(MarkdownMetaExtractor.extract_frontmatter(content).unwrap().is_none());

        let (meta, body) = MarkdownMetaExtractor.split(content).unwrap();
        assert_eq!(meta, PageMeta::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_frontmatter_is_body() {
        let content = "---\ntitle: x\n";
        assert!(MarkdownMetaExtractor.extract_frontmatter(content).unwrap().is_none());
    }

    #[test]
    fn test_yaml_extra_fields() {
        let content = "---\ncustom: world\ncount: 42\nflag: true\nitems: x, y, z\n---\n";
        let (meta, _) = MarkdownMetaExtractor.split(content).unwrap();

        assert_eq!(meta.extra.get("custom"), Some(&serde_json::json!("world")));
        assert_eq!(meta.extra.get("count"), Some(&serde_json::json!(42)));
        assert_eq!(meta.extra.get("flag"), Some(&serde_json::json!(true)));
        assert_eq!(
            meta.extra.get("items"),
            Some(&serde_json::json!(["x", "y", "z"]))
        );
    }

    #[test]
    fn test_published_date() {
        let meta = PageMeta {
            date: Some("2024-06-15".into()),
            ..Default::default()
        };
        let date = meta.published().unwrap();
        assert_eq!((date.year, date.month, date.day), (2024, 6, 15));

        let bad = PageMeta {
            date: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(bad.published().is_none());
    }
}
