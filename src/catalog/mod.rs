//! Catalog service contract.
//!
//! - `wire`: response envelopes and list decoding
//! - `submission`: validation, media upload and record creation
//! - `profile`: per-user grouping of uploads by review status

pub mod profile;
pub mod submission;
pub mod wire;

pub use profile::ProfileModels;
pub use submission::{
    create_product, try_create_product, MediaFile, MediaKind, MediaUploader, ProductDraft,
    ProductStore, ProductSubmission,
};
pub use wire::{endpoint, parse_list_response, CreateResponse, ListResponse, LIST_PATH};
