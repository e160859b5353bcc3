use actix_web::web::{Data, Query};
use actix_web::HttpResponse;
use serde::Deserialize;

use crate::context::AppContext;
use crate::routes::ApiError;
use crate::store::SentimentFilter;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: String,
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

pub async fn search_opinions(
    ctx: Data<AppContext>,
    params: Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    if params.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()));
    }
    let filter = SentimentFilter {
        query: Some(params.query.clone()),
        limit: params.limit,
        offset: params.offset,
        ..Default::default()
    };
    let rows = ctx.store.list_sentiments(&filter).await?;

    if params.compact {
        let out: Vec<_> = rows
            .into_iter()
            .map(|mut r| {
                if let Some(n) = params.preview {
                    r.content = r.content.chars().take(n).collect();
                }
                r
            })
            .collect();
        Ok(HttpResponse::Ok().json(out))
    } else {
        Ok(HttpResponse::Ok().json(rows))
    }
}
