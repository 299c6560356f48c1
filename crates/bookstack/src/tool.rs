//! Tool contract and search/retrieve orchestration
//!
//! [`Tool`] exposes the two host-facing operations: `search` runs a query,
//! filters results to pages, and fetches each body sequentially; `get_page`
//! retrieves one page in a requested format. Per-page failures are reported
//! inline and never abort a search - partial success is the normal case.

use crate::client::ApiClient;
use crate::config::Config;
use crate::convert::{html_to_markdownish, html_to_plain};
use crate::error::BookStackError;
use crate::events::{CitationData, CitationMetadata, CitationSource, Event, EventSink};
use crate::query::optimize_query;
use crate::types::{PageFormat, PageMeta, PageRequest, SearchRequest, SearchResult};
use crate::{TOOL_DESCRIPTION, TOOL_LLMTXT};
use chrono::{SecondsFormat, Utc};
use schemars::schema_for;
use serde_json::Value;
use tracing::debug;

/// Default number of pages fully retrieved per search
pub const DEFAULT_MAX_PAGES: usize = 4;

/// Raw search results considered before page filtering
///
/// Configurable via [`ToolBuilder::result_cap`].
pub const DEFAULT_RESULT_CAP: usize = 10;

/// Citation preview length for single-page retrieval
pub const CITATION_PREVIEW_LEN: usize = 500;

/// Builder for configuring the BookStack tool
#[derive(Debug, Clone)]
pub struct ToolBuilder {
    config: Config,
    result_cap: usize,
}

impl ToolBuilder {
    /// Create a builder with default caps
    pub fn new(config: Config) -> Self {
        Self {
            config,
            result_cap: DEFAULT_RESULT_CAP,
        }
    }

    /// Cap on raw search results before page filtering
    pub fn result_cap(mut self, cap: usize) -> Self {
        self.result_cap = cap;
        self
    }

    /// Build the tool, validating configuration
    pub fn build(self) -> Result<Tool, BookStackError> {
        Ok(Tool {
            client: ApiClient::new(&self.config)?,
            result_cap: self.result_cap,
        })
    }
}

/// Configured BookStack tool
#[derive(Debug, Clone)]
pub struct Tool {
    client: ApiClient,
    result_cap: usize,
}

impl Tool {
    /// Create a tool with default caps
    pub fn new(config: Config) -> Result<Self, BookStackError> {
        ToolBuilder::new(config).build()
    }

    /// Create a tool builder
    pub fn builder(config: Config) -> ToolBuilder {
        ToolBuilder::new(config)
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Input schema for the `search` operation
    pub fn search_input_schema(&self) -> Value {
        serde_json::to_value(schema_for!(SearchRequest)).unwrap_or_default()
    }

    /// Input schema for the `get_page` operation
    pub fn page_input_schema(&self) -> Value {
        serde_json::to_value(schema_for!(PageRequest)).unwrap_or_default()
    }

    /// Search BookStack and retrieve full content of the most relevant pages
    ///
    /// Returns a single formatted string with one section per page. Events
    /// describing progress and citations go to `sink`. Only configuration
    /// errors and a failing search call itself abort the operation;
    /// per-page failures become inline sections.
    pub async fn search(
        &self,
        query: &str,
        max_pages: usize,
        sink: &dyn EventSink,
    ) -> Result<String, BookStackError> {
        let optimized = optimize_query(query);

        let search_msg = if optimized != query {
            format!("Searching for: {optimized}")
        } else {
            "Searching BookStack...".to_string()
        };
        sink.emit(Event::status(search_msg, false)).await;

        let data = self
            .client
            .get("search", &[("query", optimized.as_str())])
            .await?;
        let results: Vec<SearchResult> = data
            .get("data")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .take(self.result_cap)
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        if results.is_empty() {
            sink.emit(Event::status("No results found", true)).await;

            let mut msg = format!("**No results found** for '{query}'");
            if optimized != query {
                msg.push_str(&format!("\n\n_Searched for: '{optimized}'_"));
                msg.push_str(
                    "\n\n💡 **Tip:** Try a different search term or use specific keywords from the documentation.",
                );
            }
            return Ok(msg);
        }

        // Books and chapters are containers without retrievable body content
        let pages: Vec<&SearchResult> = results.iter().filter(|r| r.is_page()).take(max_pages).collect();

        if pages.is_empty() {
            let mut lines = vec!["**No pages found, but these results were found:**\n".to_string()];
            for (i, r) in results.iter().enumerate() {
                lines.push(format!(
                    "{}. **{}** ({}, ID: {})",
                    i + 1,
                    display_title(&r.name),
                    r.kind,
                    r.id
                ));
                lines.push(format!("   🔗 [Open in BookStack]({})\n", r.url));
            }

            sink.emit(Event::status("Only books/chapters found", true)).await;
            return Ok(lines.join("\n"));
        }

        let mut page_titles = pages
            .iter()
            .take(2)
            .map(|p| truncate_chars(display_title(&p.name), 30))
            .collect::<Vec<_>>()
            .join(", ");
        if pages.len() > 2 {
            page_titles.push_str("...");
        }
        sink.emit(Event::status(format!("Found: {page_titles}"), false)).await;

        let query_info = if optimized != query {
            format!("'{query}' (searched for: '{optimized}')")
        } else {
            format!("'{query}'")
        };
        let mut lines = vec![format!(
            "**Found {} relevant page(s) for {}:**\n",
            pages.len(),
            query_info
        )];

        let mut success_count = 0usize;
        let mut permission_error = false;

        for (i, page) in pages.iter().enumerate() {
            let idx = i + 1;
            let title = display_title(&page.name);
            let excerpt = page.clean_excerpt();

            sink.emit(Event::status(format!("Retrieving: {title}..."), false)).await;

            match self.fetch_page_body(page.id).await {
                Ok((content, meta_url)) => {
                    let full_url = meta_url.unwrap_or_else(|| page.url.clone());

                    lines.push(format!("\n---\n## Page {idx}: {title} (ID: {})\n", page.id));
                    lines.push(format!("🔗 [Open in BookStack]({full_url})\n"));
                    lines.push(format!("\n{content}\n"));

                    sink.emit(citation(&content, title, &full_url, "bookstack_page", page.id, None))
                        .await;

                    success_count += 1;
                }
                Err(BookStackError::Api { status: 403, message }) => {
                    permission_error = true;
                    let details = error_details(page.id, 403, &message);

                    lines.push(format!("\n---\n## Page {idx}: {title} (ID: {})\n", page.id));
                    lines.push(format!("🔗 [Open in BookStack]({})\n", page.url));
                    lines.push("\n⚠️ **No access to full page** (403 Forbidden)\n".to_string());
                    lines.push(format!("Debug: {details}\n"));
                    if !excerpt.is_empty() {
                        lines.push(format!("\n**Summary:** {excerpt}\n"));
                    }

                    let document = if excerpt.is_empty() { title } else { excerpt.as_str() };
                    sink.emit(citation(
                        document,
                        title,
                        &page.url,
                        "bookstack_page_excerpt",
                        page.id,
                        Some("Full content not available (API permission)"),
                    ))
                    .await;
                }
                Err(BookStackError::Api { status: 404, message }) => {
                    let details = error_details(page.id, 404, &message);

                    lines.push(format!("\n---\n## Page {idx}: {title} (ID: {})\n", page.id));
                    lines.push(format!("🔗 [Open in BookStack]({})\n", page.url));
                    lines.push("\n⚠️ **Page not found** (404 Not Found)\n".to_string());
                    lines.push(format!("Debug: {details}\n"));
                    lines.push("Possible issue: Page ID from search does not match API\n".to_string());
                    if !excerpt.is_empty() {
                        lines.push(format!("\n**Summary:** {excerpt}\n"));
                    }
                }
                Err(BookStackError::Api { status, message }) => {
                    let details = error_details(page.id, status, &message);

                    lines.push(format!("\n---\n## Page {idx}: {title} (ID: {})\n", page.id));
                    lines.push(format!("🔗 [Open in BookStack]({})\n", page.url));
                    lines.push("\n⚠️ **API Error**\n".to_string());
                    lines.push(format!("Debug: {details}\n"));
                    if !excerpt.is_empty() {
                        lines.push(format!("\n**Summary:** {excerpt}\n"));
                    }
                }
                Err(err) => {
                    lines.push(format!("\n---\n## Page {idx}: {title} (ID: {})\n", page.id));
                    lines.push(format!("🔗 [Open in BookStack]({})\n", page.url));
                    lines.push("\n⚠️ **Unexpected error**\n".to_string());
                    lines.push(format!("Details: {err}\n"));
                    if !excerpt.is_empty() {
                        lines.push(format!("\n**Summary:** {excerpt}\n"));
                    }
                }
            }
        }

        if permission_error {
            lines.push("\n\n---\n".to_string());
            lines.push("⚠️ **API Permission Issue Detected**\n\n".to_string());
            lines.push("The BookStack API token does not have permission to retrieve full pages.\n".to_string());
            lines.push("Only summaries (excerpts) are available.\n\n".to_string());
            lines.push("**Solution:**\n".to_string());
            lines.push("1. Go to your BookStack profile → API Tokens\n".to_string());
            lines.push("2. Check the token permissions\n".to_string());
            lines.push("3. Ensure the token has 'View' permissions for Pages\n".to_string());
            lines.push("4. Or ask the administrator for a token with more permissions\n".to_string());
        }

        let status_msg = if success_count > 0 {
            format!("✓ {success_count} page(s) successfully retrieved")
        } else {
            "Search completed (only summaries available)".to_string()
        };
        sink.emit(Event::status(status_msg, true)).await;

        Ok(lines.join("\n"))
    }

    /// Retrieve one page in the requested format
    ///
    /// Emits a citation with a preview truncated to
    /// [`CITATION_PREVIEW_LEN`] characters; the returned string carries the
    /// full body after a title heading, link line and separator.
    pub async fn get_page(
        &self,
        page_id: u64,
        format: PageFormat,
        sink: &dyn EventSink,
    ) -> Result<String, BookStackError> {
        sink.emit(Event::status("Retrieving page...", false)).await;

        let meta = self.fetch_page_meta(page_id).await?;
        let title = if meta.name.is_empty() {
            "Unknown page".to_string()
        } else {
            meta.name.clone()
        };
        let url = meta.url.clone().unwrap_or_default();

        let content = match format {
            PageFormat::Markdown => meta
                .markdown_body()
                .map(str::to_string)
                .unwrap_or_else(|| html_to_markdownish(meta.html_body())),
            PageFormat::Text => html_to_plain(meta.html_body()),
            PageFormat::Html => meta.html_body().to_string(),
        };
        debug!(page_id, %format, chars = content.chars().count(), "page retrieved");

        let preview = truncate_preview(&content);
        sink.emit(citation(&preview, &title, &url, "bookstack_page", page_id, None))
            .await;
        sink.emit(Event::status("Page loaded!", true)).await;

        Ok(format!(
            "# {title}\n\n🔗 [Open in BookStack]({url})\n\n---\n\n{content}"
        ))
    }

    /// Fetch page metadata for `get_page`
    async fn fetch_page_meta(&self, page_id: u64) -> Result<PageMeta, BookStackError> {
        let data = self.client.get(&format!("pages/{page_id}"), &[]).await?;
        serde_json::from_value(data)
            .map_err(|e| BookStackError::Transport(format!("Unexpected page payload: {e}")))
    }

    /// Fetch a page body for search: markdown if present, else sanitized
    /// HTML; an empty body is a retrieval failure
    ///
    /// Returns the body and the page URL from metadata when the server
    /// includes one.
    async fn fetch_page_body(
        &self,
        page_id: u64,
    ) -> Result<(String, Option<String>), BookStackError> {
        let meta = self.fetch_page_meta(page_id).await?;

        let content = match meta.markdown_body() {
            Some(markdown) => markdown.to_string(),
            None => html_to_markdownish(meta.html_body()),
        };

        if content.is_empty() {
            return Err(BookStackError::EmptyPage(page_id));
        }

        Ok((content, meta.url.filter(|u| !u.is_empty())))
    }
}

/// Title for display, with a placeholder when the server omits one
fn display_title(name: &str) -> &str {
    if name.is_empty() {
        "No title"
    } else {
        name
    }
}

/// Debug detail line for a failed page fetch
fn error_details(page_id: u64, status: u16, message: &str) -> String {
    format!("Page ID: {page_id}, Status: {status}, Error: {message}")
}

/// Truncate to at most `max` characters
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Truncate a citation preview, appending an ellipsis marker when cut
fn truncate_preview(content: &str) -> String {
    if content.chars().count() > CITATION_PREVIEW_LEN {
        let mut preview: String = content.chars().take(CITATION_PREVIEW_LEN).collect();
        preview.push_str("...");
        preview
    } else {
        content.to_string()
    }
}

/// Build a citation event
fn citation(
    document: &str,
    title: &str,
    url: &str,
    kind: &str,
    page_id: u64,
    note: Option<&str>,
) -> Event {
    Event::Citation(CitationData {
        document: vec![document.to_string()],
        metadata: vec![CitationMetadata {
            date_accessed: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            source: title.to_string(),
            url: url.to_string(),
            kind: kind.to_string(),
            page_id,
            note: note.map(str::to_string),
        }],
        source: CitationSource {
            name: title.to_string(),
            url: url.to_string(),
        },
    })
}
