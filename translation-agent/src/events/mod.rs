//! Event emission for observability.
//!
//! The pipeline reports its lifecycle to an injected [`EventSink`]. Event
//! types are listed in [`types`].

mod event;
mod sink;

pub use event::{types, TranslationEvent};
pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
