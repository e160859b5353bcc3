use actix_web::web::{Data, Path, Query};
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::routes::ApiError;
use crate::store::{SentimentFilter, SentimentRow};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    hospital: Option<String>,
    #[serde(default)]
    compact: bool,
    #[serde(default)]
    preview: Option<usize>,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Serialize)]
struct CompactSentiment {
    sentiment_id: String,
    event_id: Option<u64>,
    hospital_name: String,
    title: String,
    source: String,
    content: String,
    reason: String,
    severity: String,
    url: String,
    status: String,
}

fn compact(row: SentimentRow, preview: Option<usize>) -> CompactSentiment {
    let content = match preview {
        Some(n) => row.content.chars().take(n).collect(),
        None => row.content,
    };
    CompactSentiment {
        sentiment_id: row.sentiment_id,
        event_id: row.event_id,
        hospital_name: row.hospital_name,
        title: row.title,
        source: row.source,
        content,
        reason: row.reason,
        severity: row.severity,
        url: row.url,
        status: row.status,
    }
}

pub async fn list_opinions(
    ctx: Data<AppContext>,
    params: Query<ListParams>,
) -> Result<HttpResponse, ApiError> {
    let status = match params.status.as_deref() {
        Some("all") | None => None,
        Some(other) => Some(other.to_string()),
    };
    let filter = SentimentFilter {
        hospital: params.hospital.clone(),
        status,
        limit: params.limit,
        offset: params.offset,
        ..Default::default()
    };
    let rows = ctx.store.list_sentiments(&filter).await?;

    if params.compact {
        let out: Vec<CompactSentiment> = rows.into_iter().map(|r| compact(r, params.preview)).collect();
        Ok(HttpResponse::Ok().json(out))
    } else {
        Ok(HttpResponse::Ok().json(rows))
    }
}

pub async fn get_opinion(ctx: Data<AppContext>, path: Path<String>) -> Result<HttpResponse, ApiError> {
    let sentiment = ctx.store.get_sentiment(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(sentiment))
}
