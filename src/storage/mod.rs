//! Local persistence for the catalog cache and uploaded media.
//!
//! # Modules
//!
//! - `backend`: Storage trait over the cached catalog
//! - `json`: JSON file implementation with atomic writes
//! - `media`: Directory-backed media uploader

pub mod backend;
pub mod json;
pub mod media;

pub use backend::Storage;
pub use json::JsonStorage;
pub use media::DirectoryMediaStore;
