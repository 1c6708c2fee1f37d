pub mod collect;
pub mod config;
pub mod diff;
pub mod editor;
pub mod error;
pub mod git;
pub mod marker;
pub mod profiling;
pub mod scan;
pub mod style;
pub mod ui;

// Re-exports
pub use collect::{aggregate, changed_markers, Collected};
pub use marker::{MarkerEntry, Markers};
pub use profiling::Profile;
