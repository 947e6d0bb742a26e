// File: ./src/model/mod.rs
// Aggregates the split model files
pub mod adapter;
pub mod event;
pub mod occurrence;
pub mod recurrence;
pub mod window;

pub use event::{CalendarDocument, EventDefinition, EventTime};
pub use occurrence::{Candidate, Occurrence};
pub use recurrence::{Bound, ByDay, Frequency, Recurrence, RecurrenceError};
pub use window::ExpansionWindow;
