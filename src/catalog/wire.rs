//! Catalog service wire format.
//!
//! Both endpoints answer HTTP 200 with a `success` envelope; failures carry a
//! `message` instead of a payload.
//!
//! ```json
//! {"success": true, "products": [ ... ]}
//! {"success": true, "model": { ... }}
//! {"success": false, "message": "Missing required field: title"}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::error::{MedshelfError, Result};
use crate::domain::ProductRecord;

/// Path of the list endpoint relative to the service base URL.
pub const LIST_PATH: &str = "/api/product/list";

/// Response of `GET /api/product/list`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ProductRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of creating a product, in the create endpoint's envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ProductRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CreateResponse {
    #[must_use]
    pub const fn created(model: ProductRecord) -> Self {
        Self {
            success: true,
            model: Some(model),
            message: None,
        }
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            model: None,
            message: Some(message.into()),
        }
    }
}

/// Joins the service base URL and an endpoint path.
#[must_use]
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Decodes a list response from its HTTP status and body.
///
/// # Errors
///
/// Returns [`MedshelfError::Catalog`] for non-2xx statuses, unreadable
/// bodies, and `success: false` envelopes.
pub fn parse_list_response(status: u16, body: &[u8]) -> Result<Vec<ProductRecord>> {
    if !(200..300).contains(&status) {
        return Err(MedshelfError::Catalog(format!(
            "catalog service answered HTTP {status}"
        )));
    }

    let response: ListResponse = serde_json::from_slice(body)
        .map_err(|e| MedshelfError::Catalog(format!("unreadable product list: {e}")))?;

    if response.success {
        Ok(response.products)
    } else {
        Err(MedshelfError::Catalog(
            response
                .message
                .unwrap_or_else(|| "catalog service reported a failure".to_string()),
        ))
    }
}
