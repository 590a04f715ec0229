// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. span::SpanSet)
    clippy::module_name_repetitions
)]

//! # Richnote
//!
//! Rich-text editing core for a notes app.
//!
//! A note body is plain text plus character-range style spans (bold,
//! italic, underline, strikethrough). Richnote keeps those spans consistent
//! while text is typed, deleted and restyled, and stores them as a small
//! HTML-like markup string.
//!
//! ## Modules
//!
//! - [`editor`]: Span model, typing style and line-prefix helpers
//! - [`note`]: Stored-format detection, statistics and sharing
//! - [`script`]: Edit scripts that drive an editor
//! - [`render`]: Terminal rendering of styled text
//! - [`config`]: Saved command-line defaults

pub mod config;
pub mod editor;
pub mod note;
pub mod render;
pub mod script;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{FormatSpan, PendingStyle, SpanEditor, SpanKind, Style, StyleSet};
    pub use crate::note::NoteStats;
    pub use crate::script::{Command, parse_script, run_script};
}
