//! # RMDraw
//!
//! Editing core for a vector drawing and page layout program:
//! nested shape trees, selection and super-selection, direct manipulation
//! with proximity guides, and coalesced undo.
//!
//! ## Architecture
//!
//! RMDraw is organized as a workspace with multiple crates:
//!
//! 1. **rmdraw-core** - Geometry, node identifiers, editor events, errors
//! 2. **rmdraw-settings** - Editor, snapping and history configuration
//! 3. **rmdraw-editor** - Shape tree, selection state machine, tools, undo
//! 4. **rmdraw** - This crate: logging setup and the gesture script runner
//!
//! The binary replays a JSON gesture script against an editor session and
//! prints the resulting document as JSON; see [`script`].

pub mod script;

pub use rmdraw_core::{EditorEvent, Error, EventFilter, NodeId, Point, Rect, Result, Size};
pub use rmdraw_editor::{
    DropPayload, Editor, EditorError, Key, KeyEvent, Modifiers, NodeKind, Outcome, PointerEvent,
    ShapeTree, ToolKind,
};
pub use rmdraw_settings::Config;
pub use script::{replay, Report, Script};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, leaving stdout for reports
/// - RUST_LOG environment variable support (default `info`)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
