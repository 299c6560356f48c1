//! Core types for the BookStack tool

use crate::convert::html_to_plain;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output format for single-page retrieval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// Native markdown, falling back to sanitized HTML
    #[default]
    Markdown,
    /// Plain text extracted from HTML
    Text,
    /// Raw HTML, verbatim
    Html,
}

impl FromStr for PageFormat {
    type Err = crate::BookStackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" => Ok(PageFormat::Markdown),
            "text" => Ok(PageFormat::Text),
            "html" => Ok(PageFormat::Html),
            other => Err(crate::BookStackError::InvalidFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for PageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageFormat::Markdown => write!(f, "markdown"),
            PageFormat::Text => write!(f, "text"),
            PageFormat::Html => write!(f, "html"),
        }
    }
}

/// One entry from the search endpoint
///
/// Deserialized leniently: unknown fields are ignored and optional fields
/// default, since BookStack versions vary in what they include.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Entity id
    pub id: u64,
    /// Title
    #[serde(default)]
    pub name: String,
    /// Link into the BookStack UI
    #[serde(default)]
    pub url: String,
    /// Entity type: "page", "book", "chapter", ...
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Short server-provided summary snippet
    #[serde(default)]
    pub excerpt: Option<String>,
}

impl SearchResult {
    /// True for leaf pages, the only type with retrievable body content
    pub fn is_page(&self) -> bool {
        self.kind == "page"
    }

    /// Excerpt with entities decoded and whitespace collapsed
    pub fn clean_excerpt(&self) -> String {
        html_to_plain(self.excerpt.as_deref().unwrap_or(""))
    }
}

/// Page detail payload from `GET /api/pages/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page id
    pub id: u64,
    /// Page title
    #[serde(default)]
    pub name: String,
    /// Link into the BookStack UI, when the server includes it
    #[serde(default)]
    pub url: Option<String>,
    /// Native markdown body, when the page was authored in markdown
    #[serde(default)]
    pub markdown: Option<String>,
    /// HTML body
    #[serde(default)]
    pub html: Option<String>,
}

impl PageMeta {
    /// Markdown body if present and non-empty
    pub fn markdown_body(&self) -> Option<&str> {
        self.markdown.as_deref().filter(|s| !s.is_empty())
    }

    /// HTML body, defaulting to empty
    pub fn html_body(&self) -> &str {
        self.html.as_deref().unwrap_or("")
    }
}

/// Input for the `search` operation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// Free-text search term
    pub query: String,
    /// Maximum number of pages to fully retrieve (default: 4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,
}

/// Input for the `get_page` operation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageRequest {
    /// Id of the page to retrieve
    pub page_id: u64,
    /// Output format: markdown, text, or html (default: markdown)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<PageFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_format_from_str() {
        assert_eq!(PageFormat::from_str("markdown").unwrap(), PageFormat::Markdown);
        assert_eq!(PageFormat::from_str("TEXT").unwrap(), PageFormat::Text);
        assert_eq!(PageFormat::from_str("Html").unwrap(), PageFormat::Html);
        assert!(PageFormat::from_str("pdf").is_err());
        assert!(PageFormat::from_str("").is_err());
    }

    #[test]
    fn test_page_format_display() {
        assert_eq!(PageFormat::Markdown.to_string(), "markdown");
        assert_eq!(PageFormat::Text.to_string(), "text");
        assert_eq!(PageFormat::Html.to_string(), "html");
    }

    #[test]
    fn test_search_result_lenient_deserialization() {
        let json = serde_json::json!({
            "id": 42,
            "name": "Backups",
            "url": "https://docs.example.com/books/ops/page/backups",
            "type": "page",
            "preview_html": {"name": "ignored"}
        });
        let result: SearchResult = serde_json::from_value(json).unwrap();
        assert!(result.is_page());
        assert_eq!(result.excerpt, None);
        assert_eq!(result.clean_excerpt(), "");
    }

    #[test]
    fn test_search_result_container_types() {
        let json = serde_json::json!({"id": 1, "name": "Ops", "type": "book"});
        let result: SearchResult = serde_json::from_value(json).unwrap();
        assert!(!result.is_page());
        assert_eq!(result.url, "");
    }

    #[test]
    fn test_clean_excerpt() {
        let result = SearchResult {
            id: 1,
            name: "Page".to_string(),
            url: String::new(),
            kind: "page".to_string(),
            excerpt: Some("Tom &amp; Jerry\n  run   fast".to_string()),
        };
        assert_eq!(result.clean_excerpt(), "Tom & Jerry run fast");
    }

    #[test]
    fn test_page_meta_bodies() {
        let meta: PageMeta = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Setup",
            "markdown": "",
            "html": "<p>hi</p>"
        }))
        .unwrap();
        // Empty markdown counts as absent
        assert_eq!(meta.markdown_body(), None);
        assert_eq!(meta.html_body(), "<p>hi</p>");

        let meta: PageMeta = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Setup",
            "markdown": "# Setup"
        }))
        .unwrap();
        assert_eq!(meta.markdown_body(), Some("# Setup"));
        assert_eq!(meta.html_body(), "");
    }
}
