use actix_web::web::{Data, Json};
use actix_web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::routes::{require_admin, ApiError};

#[derive(Debug, Serialize)]
struct KeywordsResponse {
    keywords: Vec<String>,
}

pub async fn get_suppress_keywords(req: HttpRequest, ctx: Data<AppContext>) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &ctx.settings.feedback)?;
    let rows = ctx.store.list_suppress_keywords().await?;
    Ok(HttpResponse::Ok().json(KeywordsResponse {
        keywords: rows.into_iter().map(|r| r.keyword).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SetKeywordsRequest {
    keywords: Vec<String>,
}

pub async fn set_suppress_keywords(
    req: HttpRequest,
    ctx: Data<AppContext>,
    body: Json<SetKeywordsRequest>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &ctx.settings.feedback)?;
    ctx.store.replace_suppress_keywords(&body.keywords).await?;
    Ok(HttpResponse::Ok().json(KeywordsResponse { keywords: body.keywords.clone() }))
}
