mod ai;
mod feedback;
mod health;
mod opinions;
mod report;
mod search;
mod stats;
mod suppress_keywords;

pub use ai::{ai_insight, ai_summary};
pub use feedback::feedback_endpoint;
pub use health::health_check;
pub use opinions::{get_opinion, list_opinions};
pub use report::{download_report, generate_report};
pub use search::search_opinions;
pub use stats::{get_stats, get_trend};
pub use suppress_keywords::{get_suppress_keywords, set_suppress_keywords};

use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::configuration::FeedbackSettings;

/// Constant-time byte comparison; same rationale as `hmac::Mac::verify_slice`
/// but for a plain bearer token rather than a MAC.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// The `{error:{code,message}}` envelope every `/api/*` error response uses.
#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not implemented")]
    NotImplemented,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(e: crate::store::StoreError) -> Self {
        match e {
            crate::store::StoreError::NotFound => ApiError::NotFound,
            other => ApiError::Unexpected(other.into()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            ApiError::NotFound => "not_found",
            ApiError::Unauthorized => "unauthorized",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotImplemented => "not_implemented",
            ApiError::Unexpected(_) => "internal_error",
        };
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            error: ErrorBody { code, message: self.to_string() },
        })
    }
}

/// Borrowed from the teacher's error-chain formatter (src/routes/mod.rs in
/// the original): prints the full `source()` chain, not just the top error.
pub fn error_chain_fmt(e: &impl std::error::Error, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}

/// Checks `Authorization: Bearer <token>` against `feedback.admin_token` in
/// constant time, per §9's "compare HMACs [and tokens] in constant time".
pub fn require_admin(req: &HttpRequest, feedback: &FeedbackSettings) -> Result<(), ApiError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let provided = header.strip_prefix("Bearer ").unwrap_or("");
    let expected = feedback.admin_token.expose_secret();
    if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}
