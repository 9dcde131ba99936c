//! API request and response types

use serde::{Deserialize, Serialize};

/// One dialogue turn from the caller
#[derive(Debug, Deserialize)]
pub struct AffirmationRequest {
    pub user_text: String,
    /// Omitted on first contact; the response carries the issued id
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Reply for one dialogue turn
#[derive(Debug, Serialize)]
pub struct AffirmationResponse {
    pub message: String,
    pub session_id: String,
    /// Set on the final step when the user wants a selfie
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selfie_url: Option<String>,
}

/// Plain message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for a stored selfie
#[derive(Debug, Serialize)]
pub struct SelfieResponse {
    pub message: String,
    pub file_path: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
