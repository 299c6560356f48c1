//! Events emitted to the host runtime
//!
//! The host is notified through an injected [`EventSink`]: status updates
//! while a search progresses, and citation events carrying retrieved text
//! plus source metadata the host can attach to an AI response. Delivery is
//! fire-and-forget; a missing consumer never changes returned results, so
//! [`NullSink`] is the default rather than a special case in control flow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Event sent to the host runtime
///
/// Serializes to `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Event {
    /// Progress update
    Status(StatusData),
    /// Retrieved content with source metadata
    Citation(CitationData),
}

impl Event {
    /// Create a status event
    pub fn status(description: impl Into<String>, done: bool) -> Self {
        Event::Status(StatusData {
            description: description.into(),
            done,
        })
    }

    /// True for status events marking the end of an operation
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Status(data) if data.done)
    }
}

/// Payload of a status event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusData {
    /// Human-readable progress description
    pub description: String,
    /// True once the operation has finished
    pub done: bool,
}

/// Payload of a citation event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationData {
    /// Retrieved document text
    pub document: Vec<String>,
    /// Metadata entry per document
    pub metadata: Vec<CitationMetadata>,
    /// Source the citation points at
    pub source: CitationSource,
}

/// Source metadata for one cited document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationMetadata {
    /// ISO-8601 timestamp of retrieval
    pub date_accessed: String,
    /// Source title
    pub source: String,
    /// Source URL
    pub url: String,
    /// Kind of citation, e.g. "bookstack_page"
    #[serde(rename = "type")]
    pub kind: String,
    /// BookStack page id
    pub page_id: u64,
    /// Optional note, e.g. why only an excerpt is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Name and link of the cited source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationSource {
    pub name: String,
    pub url: String,
}

/// Asynchronous sink for events emitted during tool execution
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Accept one event; completion means delivery was attempted
    async fn emit(&self, event: Event);
}

/// Sink that discards every event
///
/// The null-object default for callers without an event consumer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn emit(&self, _event: Event) {}
}

/// Sink that buffers events in memory
///
/// Useful for hosts that drain events after the call, and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all buffered events
    pub async fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().await)
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn emit(&self, event: Event) {
        self.events.lock().await.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_event_wire_shape() {
        let event = Event::status("Searching BookStack...", false);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["data"]["description"], "Searching BookStack...");
        assert_eq!(json["data"]["done"], false);
    }

    #[test]
    fn test_citation_event_wire_shape() {
        let event = Event::Citation(CitationData {
            document: vec!["body text".to_string()],
            metadata: vec![CitationMetadata {
                date_accessed: "2024-01-01T00:00:00Z".to_string(),
                source: "Page".to_string(),
                url: "https://docs.example.com/p".to_string(),
                kind: "bookstack_page".to_string(),
                page_id: 12,
                note: None,
            }],
            source: CitationSource {
                name: "Page".to_string(),
                url: "https://docs.example.com/p".to_string(),
            },
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "citation");
        assert_eq!(json["data"]["document"][0], "body text");
        assert_eq!(json["data"]["metadata"][0]["type"], "bookstack_page");
        assert_eq!(json["data"]["metadata"][0]["page_id"], 12);
        // Absent note is omitted from the wire format
        assert!(json["data"]["metadata"][0].get("note").is_none());
        assert_eq!(json["data"]["source"]["name"], "Page");
    }

    #[test]
    fn test_is_terminal() {
        assert!(Event::status("done", true).is_terminal());
        assert!(!Event::status("working", false).is_terminal());
    }

    #[tokio::test]
    async fn test_memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        sink.emit(Event::status("one", false)).await;
        sink.emit(Event::status("two", true)).await;

        let events = sink.take().await;
        assert_eq!(events.len(), 2);
        assert!(events[1].is_terminal());
        assert!(sink.take().await.is_empty());
    }
}
