pub mod agenda;
pub mod config;
pub mod density;
pub mod diagnostics;
pub mod error;
pub mod expand;
pub mod model;
pub mod normalize;
pub mod rank;

pub use agenda::{Agenda, build_agenda};
pub use density::Density;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::AgendaError;
pub use model::{CalendarDocument, EventDefinition, EventTime, ExpansionWindow, Occurrence};
