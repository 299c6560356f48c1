//! BookStack - AI-friendly BookStack search and retrieval library
//!
//! This crate lets an AI assistant host search a BookStack documentation
//! server and pull full page content as context. It wraps the BookStack
//! REST API with an authenticated client, optimizes free-text queries,
//! converts HTML bodies to readable text, and reports progress and
//! citations through an injectable event sink.

mod client;
mod config;
mod convert;
mod error;
mod events;
mod query;
mod tool;
mod types;

pub use client::ApiClient;
pub use config::Config;
pub use convert::{html_to_markdownish, html_to_plain};
pub use error::BookStackError;
pub use events::{
    CitationData, CitationMetadata, CitationSource, Event, EventSink, MemorySink, NullSink,
    StatusData,
};
pub use query::optimize_query;
pub use tool::{Tool, ToolBuilder, CITATION_PREVIEW_LEN, DEFAULT_MAX_PAGES, DEFAULT_RESULT_CAP};
pub use types::{PageFormat, PageMeta, PageRequest, SearchRequest, SearchResult};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Everruns BookStack-Tool/0.1";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Searches a BookStack documentation server and retrieves full page content.

- Optimizes free-text queries before searching
- Fetches page bodies as markdown, falling back to sanitized HTML
- Reports progress and citations to the host
- Partial failures never abort a search"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# BookStack Tool

Searches BookStack and automatically retrieves the full content of the most
relevant pages, so the assistant can answer questions directly from the
documentation.

## Capabilities
- Stopword-stripping query optimization (English and Dutch)
- Search with automatic full-page retrieval
- Single page retrieval as markdown, plain text, or raw HTML
- Citation events with source metadata for every retrieved page
- Graceful handling of permission errors (falls back to excerpts)

## Operations

### search
- `query` (required): free-text search term
- `max_pages` (optional): maximum pages to fully retrieve (default: 4)

### get_page
- `page_id` (required): numeric page id
- `format` (optional): "markdown", "text", or "html" (default: markdown)

## Configuration
- `BOOKSTACK_URL`: base URL without trailing slash (required)
- `BOOKSTACK_TOKEN_ID`: API token id (required)
- `BOOKSTACK_TOKEN_SECRET`: API token secret (required)

## Error Handling
- Missing configuration fails before any network call
- Per-page API errors are reported inline; the search continues
- 403 responses fall back to search excerpts and add a permission notice
"#;
