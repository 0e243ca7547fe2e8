use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::validation::ValidationStatus;

/// The named fields an editing model republishes changes for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryField {
    Security,
    Account,
    SourceAccount,
    TargetAccount,
    Portfolio,
    SourcePortfolio,
    TargetPortfolio,
    Date,
    Shares,
    Quote,
    LumpSum,
    ExchangeRate,
    ConvertedLumpSum,
    ForeignAmount,
    Fees,
    Taxes,
    Total,
    Amount,
    TargetAmount,
    Note,
    Name,
    Interval,
    StartDate,
    AutoGenerate,
    SecurityCurrency,
    TransactionCurrency,
}

/// Change notifications emitted by the editing models.
///
/// One listener observes many named fields; hosts bind a field event back
/// to the widget displaying it and the status event to the confirm button.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryEvent {
    FieldChanged(EntryField),
    StatusChanged(ValidationStatus),
}

/// Trait for receiving entry events.
///
/// `on_event` must be fast and free of re-entrant mutation; models emit
/// synchronously in the middle of their fan-out.
pub trait EntryEventSink: Send + Sync {
    fn on_event(&self, event: &EntryEvent);
}

/// No-op implementation for models nobody listens to.
#[derive(Clone, Default)]
pub struct NoOpEntryEventSink;

impl EntryEventSink for NoOpEntryEventSink {
    fn on_event(&self, _event: &EntryEvent) {
        // Intentionally empty - events are discarded
    }
}

/// Collects emitted events, for tests and event-order assertions.
#[derive(Clone, Default)]
pub struct RecordingEntryEventSink {
    events: Arc<Mutex<Vec<EntryEvent>>>,
}

impl RecordingEntryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<EntryEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns only the field-change events, in emission order.
    pub fn fields(&self) -> Vec<EntryField> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EntryEvent::FieldChanged(field) => Some(*field),
                EntryEvent::StatusChanged(_) => None,
            })
            .collect()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl EntryEventSink for RecordingEntryEventSink {
    fn on_event(&self, event: &EntryEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Fan-out registry: one model, many sinks.
#[derive(Clone, Default)]
pub struct EntryEventRegistry {
    sinks: Vec<Arc<dyn EntryEventSink>>,
}

impl EntryEventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sink: Arc<dyn EntryEventSink>) {
        self.sinks.push(sink);
    }

    pub fn emit(&self, event: &EntryEvent) {
        for sink in &self.sinks {
            sink.on_event(event);
        }
    }

    pub fn emit_field(&self, field: EntryField) {
        self.emit(&EntryEvent::FieldChanged(field));
    }

    pub fn emit_status(&self, status: &ValidationStatus) {
        self.emit(&EntryEvent::StatusChanged(status.clone()));
    }
}
