use actix_web::web::Data;
use actix_web::HttpResponse;
use serde_json::json;

use crate::context::AppContext;
use crate::routes::ApiError;

pub async fn health_check(ctx: Data<AppContext>) -> Result<HttpResponse, ApiError> {
    ctx.store.health_check().await?;
    Ok(HttpResponse::Ok().json(json!({"status": "ok"})))
}
