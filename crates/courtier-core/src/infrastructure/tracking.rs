//! Tracking sinks

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::events::TrackingEvent;
use crate::ports::outbound::{TrackingError, TrackingSink};

/// Emits each event as a structured log line
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTrackingSink;

#[async_trait]
impl TrackingSink for LogTrackingSink {
    async fn track(&self, event: &TrackingEvent) -> Result<(), TrackingError> {
        let payload = serde_json::to_string(event).map_err(|e| TrackingError(e.to_string()))?;
        tracing::info!(
            event = event.name(),
            form_id = event.form_id(),
            payload = %payload,
            "Tracking event"
        );
        Ok(())
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingTrackingSink {
    events: Mutex<Vec<TrackingEvent>>,
    failing: bool,
}

impl RecordingTrackingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records events but reports every call as failed
    pub fn failing() -> Self {
        Self { events: Mutex::default(), failing: true }
    }

    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(TrackingEvent::name).collect()
    }
}

#[async_trait]
impl TrackingSink for RecordingTrackingSink {
    async fn track(&self, event: &TrackingEvent) -> Result<(), TrackingError> {
        self.events.lock().push(event.clone());
        if self.failing {
            return Err(TrackingError("collector unavailable".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::AttributionParams;

    #[tokio::test]
    async fn test_recording_sink() {
        let sink = RecordingTrackingSink::new();
        let event = TrackingEvent::FormStarted {
            form_id: "default-form".into(),
            page_slug: None,
            utm: AttributionParams::default(),
        };

        sink.track(&event).await.unwrap();
        assert_eq!(sink.names(), vec!["form_started"]);
        assert!(LogTrackingSink.track(&event).await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_sink_still_records() {
        let sink = RecordingTrackingSink::failing();
        let event = TrackingEvent::FormStarted {
            form_id: "f".into(),
            page_slug: None,
            utm: AttributionParams::default(),
        };

        assert!(sink.track(&event).await.is_err());
        assert_eq!(sink.events().len(), 1);
    }
}
