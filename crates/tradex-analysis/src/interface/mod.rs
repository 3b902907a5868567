//! View-facing layer
//!
//! The form state users edit, the display mapping of results and the
//! renderers that print them.

pub mod display;
pub mod form;
pub mod formatter;

pub use display::{
    DisplayModel, Field, InterpretationStatus, Section, Tone, format_score, present,
};
pub use form::{AnalysisForm, Chip};
pub use formatter::{
    Formatter, FormatterFactory, JsonFormatter, OutputFormat, TableFormatter, status_line,
};
