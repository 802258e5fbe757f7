//! Fire-and-forget progress notifications.
//!
//! The pipeline reports what it is doing through a [`ProgressSink`]. Sinks
//! must not block and may drop events; nothing waits on them.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    Start,
    Progress,
    Saving,
    Error,
}

impl ProgressKind {
    /// Event name used in structured logs.
    pub fn event_kind(self) -> &'static str {
        match self {
            ProgressKind::Start => "scrape.start",
            ProgressKind::Progress => "scrape.progress",
            ProgressKind::Saving => "scrape.saving",
            ProgressKind::Error => "scrape.error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u8>,
}

impl ProgressEvent {
    pub fn new(kind: ProgressKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            percent: None,
        }
    }

    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = Some(percent);
        self
    }
}

pub trait ProgressSink {
    fn emit(&self, event: ProgressEvent);
}

/// Writes every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&self, event: ProgressEvent) {
        let event_kind = event.kind.event_kind();
        match event.kind {
            ProgressKind::Error => warn!(event_kind, message = %event.message, "Scrape progress"),
            _ => info!(event_kind, percent = ?event.percent, message = %event.message, "Scrape progress"),
        }
    }
}

/// Forwards events to a channel; a closed receiver is ignored.
impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

impl<T: ProgressSink + ?Sized> ProgressSink for &T {
    fn emit(&self, event: ProgressEvent) {
        (**self).emit(event);
    }
}
