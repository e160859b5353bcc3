use actix_web::web::{Data, Query};
use actix_web::HttpResponse;
use serde::Deserialize;
use serde_json::json;

use crate::context::AppContext;
use crate::feedback::{on_feedback, FeedbackError};
use crate::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct FeedbackParams {
    queue_id: u64,
    sentiment_id: String,
    expiry: i64,
    sig: String,
    judgement: bool,
    #[serde(rename = "type")]
    feedback_type: String,
    text: Option<String>,
}

impl From<FeedbackError> for ApiError {
    fn from(e: FeedbackError) -> Self {
        match e {
            FeedbackError::InvalidSignature => ApiError::Unauthorized,
            FeedbackError::Store(e) => e.into(),
        }
    }
}

/// Entry point for the signed link a webhook recipient clicks; registered
/// for both GET and POST since either can carry the query string.
pub async fn feedback_endpoint(
    ctx: Data<AppContext>,
    params: Query<FeedbackParams>,
) -> Result<HttpResponse, ApiError> {
    on_feedback(
        &ctx.store,
        &ctx.settings.feedback,
        params.queue_id,
        &params.sentiment_id,
        params.expiry,
        &params.sig,
        params.judgement,
        &params.feedback_type,
        params.text.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({"status": "recorded"})))
}
