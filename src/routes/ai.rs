use actix_web::web::{Data, Json};
use actix_web::HttpResponse;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct OpinionInput {
    title: String,
    hospital: String,
    severity: String,
    reason: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    opinions: Vec<OpinionInput>,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    summary: String,
}

fn render_summary_prompt(opinions: &[OpinionInput]) -> String {
    let mut prompt = String::from(
        "You are briefing a hospital communications team on recent negative \
         coverage. Summarize the common themes, the most affected hospitals, \
         and the overall severity trend across these items in three short \
         paragraphs:\n\n",
    );
    for (i, o) in opinions.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. [{}] {} — {} ({})\n",
            i + 1,
            o.severity,
            o.hospital,
            o.title,
            o.reason
        ));
    }
    prompt
}

pub async fn ai_summary(
    ctx: Data<AppContext>,
    body: Json<SummaryRequest>,
) -> Result<HttpResponse, ApiError> {
    if body.opinions.is_empty() {
        return Err(ApiError::BadRequest("opinions must not be empty".into()));
    }
    let prompt = render_summary_prompt(&body.opinions);
    let summary = ctx
        .llm_client
        .complete(&prompt)
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))?;
    Ok(HttpResponse::Ok().json(SummaryResponse { summary }))
}

#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    opinion: InsightTarget,
}

#[derive(Debug, Deserialize)]
pub struct InsightTarget {
    sentiment_id: String,
}

#[derive(Debug, Serialize)]
struct InsightResponse {
    sentiment_id: String,
    insight: String,
}

fn render_insight_prompt(sentiment: &crate::store::SentimentRow) -> String {
    format!(
        "Give a deeper analysis of this hospital reputation item than the one-line \
         reason already recorded. Cover likely public impact, whether it looks \
         like an isolated incident or a pattern, and a suggested response angle.\n\n\
         Hospital: {}\nTitle: {}\nReason: {}\nSeverity: {}\nContent: {}\n",
        sentiment.hospital_name, sentiment.title, sentiment.reason, sentiment.severity, sentiment.content
    )
}

/// Per-item deep analysis; the result is cached onto `Sentiment.insight` so a
/// repeat request for the same item is a cache read rather than a fresh LLM call.
pub async fn ai_insight(
    ctx: Data<AppContext>,
    body: Json<InsightRequest>,
) -> Result<HttpResponse, ApiError> {
    let sentiment = ctx.store.get_sentiment(&body.opinion.sentiment_id).await?;
    if let Some(cached) = &sentiment.insight {
        return Ok(HttpResponse::Ok().json(InsightResponse {
            sentiment_id: sentiment.sentiment_id,
            insight: cached.clone(),
        }));
    }

    let prompt = render_insight_prompt(&sentiment);
    let insight = ctx
        .llm_client
        .complete(&prompt)
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))?;
    ctx.store
        .set_insight(&sentiment.sentiment_id, &insight, Utc::now().naive_utc())
        .await?;

    Ok(HttpResponse::Ok().json(InsightResponse { sentiment_id: sentiment.sentiment_id, insight }))
}
