//! HTTP request handlers

use super::types::{
    AffirmationRequest, AffirmationResponse, ErrorResponse, MessageResponse, SelfieResponse,
};
use super::AppState;
use crate::runtime::DialogueError;
use crate::selfie::StorageError;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Multipart field carrying the image
const PHOTO_FIELD: &str = "photo";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;
    Router::new()
        // Liveness
        .route("/", get(read_root))
        // Dialogue turns
        .route("/generate-affirmation", post(generate_affirmation))
        // Selfie upload
        .route(
            "/take-selfie",
            post(take_selfie).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

async fn read_root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to Mirror, Mirror API".to_string(),
    })
}

// ============================================================
// Dialogue
// ============================================================

async fn generate_affirmation(
    State(state): State<AppState>,
    Json(input): Json<AffirmationRequest>,
) -> Result<Json<AffirmationResponse>, AppError> {
    let turn = state
        .sessions
        .advance(input.session_id.as_deref(), input.user_text)
        .await?;

    Ok(Json(AffirmationResponse {
        message: turn.message,
        session_id: turn.session_id,
        selfie_url: turn.selfie_hint,
    }))
}

// ============================================================
// Selfies
// ============================================================

async fn take_selfie(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SelfieResponse>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(AppError::from)? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| AppError::BadRequest("Photo upload has no filename".to_string()))?;
        let bytes = field.bytes().await.map_err(AppError::from)?;

        let stored = state.selfies.save(&file_name, &bytes).await?;
        return Ok(Json(SelfieResponse {
            message: "Selfie saved successfully!".to_string(),
            file_path: stored.path.display().to_string(),
        }));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field {PHOTO_FIELD:?}"
    )))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Conflict(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl From<DialogueError> for AppError {
    fn from(e: DialogueError) -> Self {
        match e {
            DialogueError::Busy => AppError::Conflict(e.to_string()),
            DialogueError::Upstream(_) | DialogueError::Internal(_) => {
                tracing::error!(error = %e, "Dialogue turn failed");
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        let message = format!("Error saving selfie: {e}");
        if e.is_client_error() {
            AppError::BadRequest(message)
        } else {
            tracing::error!(error = %e, "Selfie write failed");
            AppError::Internal(message)
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::BadRequest(e.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
