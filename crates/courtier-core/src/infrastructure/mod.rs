//! Infrastructure layer
//!
//! Concrete adapters for the outbound ports.

pub mod memory;
pub mod postgrest;
pub mod tracking;

pub use memory::{InMemoryDataStore, StoreCall};
pub use postgrest::{RestDataStore, RestStoreConfig};
pub use tracking::{LogTrackingSink, RecordingTrackingSink};
