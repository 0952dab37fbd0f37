//! Domain events
//!
//! Inbound provider notifications and outbound tracking events.

pub mod provider;
pub mod tracking;

pub use provider::{ProviderEvent, ProviderEventKind};
pub use tracking::TrackingEvent;
