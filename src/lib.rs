//! colorbisect: find the line whose color code causes a visible effect
//!
//! This library exposes the search machinery for integration and
//! property-based tests. The binary is at src/main.rs.

pub mod bisect;
pub mod cli;
pub mod color_replacer;
pub mod config;
pub mod dialog;
pub mod error_helpers;
pub mod interrupt;
pub mod logger;
pub mod report;
pub mod snapshot;
pub mod window;

// Re-export commonly used types for convenience
pub use bisect::{BisectState, Bisector, Outcome, Probe, Response, Step};
pub use color_replacer::{ColorReplacer, SENTINEL_COLOR};
pub use dialog::{DialogSession, FeedbackDialog, PlainDialog, TerminalDialog};
pub use interrupt::Interrupted;
pub use snapshot::Snapshot;
pub use window::WindowDialog;
