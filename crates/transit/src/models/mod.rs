//! Timetable data models and types.

pub mod line;
pub mod types;

// Re-exports for convenience
pub use line::{Line, Stop};
pub use types::{Result, TransitError, TransportKind};
