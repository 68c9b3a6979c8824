//! Domain layer for the medshelf plugin.
//!
//! Catalog types and the crate error, independent of Zellij APIs.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`model`]: Catalog records and feed model cards

pub mod error;
pub mod model;

pub use error::{MedshelfError, Result};
pub use model::{Model, ModelStatus, ProductRecord, RelatedModel};
