//! OpenTelemetry tracing with file-based OTLP export.
//!
//! ```text
//! tracing → tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → medshelf-otlp.json
//! ```
//!
//! Spans land in `~/.local/share/zellij/medshelf/medshelf-otlp.json`, one
//! OTLP JSON document per line. The file rotates at 10 MB into `.1`, `.2`
//! and `.3` backups. The level comes from the `trace_level` plugin option
//! and defaults to `info`.
//!
//! Plugin and worker run in separate WASM instances, so each installs its
//! own subscriber. Worker messages carry the caller's trace context to link
//! the two sides.
//!
//! - [`init`]: Subscriber setup
//! - `exporter`: Span exporter and OTLP JSON serialization
//! - `rotation`: Size-rotated line file

mod exporter;
pub mod init;
mod rotation;

pub use init::{init_tracing, TRACE_FILE_NAME};
