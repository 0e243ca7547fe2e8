//! Shared machinery of the editable-transaction models.
//!
//! Holds the typed change-notification events, the entry defaults passed
//! explicitly into every model, and the calculation core that keeps shares,
//! quote, lump sum, exchange rate, converted lump sum, fees, taxes and
//! total mutually consistent under single-field edits.

mod editor_events;
mod editor_model;


pub use editor_events::{
    EntryEvent, EntryEventRegistry, EntryEventSink, EntryField, NoOpEntryEventSink,
    RecordingEntryEventSink,
};
pub use editor_model::{EntryDefaults, SecurityEntryCalc};
