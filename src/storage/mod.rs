//! Per-user storage of uploaded events

pub mod event_store;

pub use event_store::{EventStore, EventUpload, StoredEvent, UserId};
