//! Crawl instrumentation events
//!
//! Events are fire-and-forget: a scraper with no sink behaves exactly like one
//! with a sink, it just reports nothing.

use std::fmt;
use std::sync::Arc;

/// A notable moment of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A crawl started with this frontier
    Running { urls: Vec<String> },
    /// URLs newly admitted to the frontier
    Queued { urls: Vec<String> },
    /// A response is about to run through the pipeline
    ProcessResponse { url: String },
    /// A response was not processed
    IgnoreResponse { url: String, status: u16 },
    /// A page failed and was skipped
    Error { url: String, message: String },
    Info { message: String },
}

impl CrawlEvent {
    /// Dotted event name, as used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Running { .. } => "running.scraper",
            Self::Queued { .. } => "queued.scraper",
            Self::ProcessResponse { .. } => "process_response.scraper",
            Self::IgnoreResponse { .. } => "ignore_response.scraper",
            Self::Error { .. } => "error.doc",
            Self::Info { .. } => "info.doc",
        }
    }
}

/// Receives crawl events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &CrawlEvent);
}

/// Sink that forwards every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::Running { urls } => {
                tracing::info!(event = event.name(), count = urls.len(), "Crawl running");
            }
            CrawlEvent::Queued { urls } => {
                tracing::debug!(event = event.name(), count = urls.len(), "Queued {:?}", urls);
            }
            CrawlEvent::ProcessResponse { url } => {
                tracing::debug!(event = event.name(), "Processing {}", url);
            }
            CrawlEvent::IgnoreResponse { url, status } => {
                tracing::debug!(event = event.name(), status, "Ignored {}", url);
            }
            CrawlEvent::Error { url, message } => {
                tracing::error!(event = event.name(), "Failed to process {}: {}", url, message);
            }
            CrawlEvent::Info { message } => {
                tracing::info!(event = event.name(), "{}", message);
            }
        }
    }
}

/// Optional sink shared by the crawl loop and its workers
#[derive(Clone, Default)]
pub struct Instrumenter {
    sink: Option<Arc<dyn EventSink>>,
}

impl Instrumenter {
    pub fn new(sink: Option<Arc<dyn EventSink>>) -> Self {
        Self { sink }
    }

    pub fn emit(&self, event: CrawlEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(&event);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }
}

impl fmt::Debug for Instrumenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumenter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: std::sync::Mutex<Vec<CrawlEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in emission order
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &CrawlEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrumenter_without_sink_is_silent() {
        let instrumenter = Instrumenter::default();
        assert!(!instrumenter.is_enabled());
        instrumenter.emit(CrawlEvent::Info {
            message: "nobody listens".to_string(),
        });
    }

    #[test]
    fn test_recording_sink() {
        let sink = Arc::new(RecordingSink::new());
        let instrumenter = Instrumenter::new(Some(sink.clone()));
        instrumenter.emit(CrawlEvent::Queued {
            urls: vec!["https://example.com/a".to_string()],
        });
        instrumenter.emit(CrawlEvent::Error {
            url: "https://example.com/b".to_string(),
            message: "boom".to_string(),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].name(), "error.doc");
    }
}
