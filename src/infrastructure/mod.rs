//! Infrastructure layer for filesystem and environment interactions.
//!
//! Path utilities for the Zellij plugin sandbox, where the host filesystem is
//! mounted under `/host`.

pub mod paths;

pub use paths::{catalog_file, get_data_dir, host_relative, media_dir, sandbox_path};
