use actix_web::web::{Data, Query};
use actix_web::HttpResponse;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::routes::ApiError;

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    #[serde(default)]
    hospital: Option<String>,
    #[serde(default = "default_range")]
    range: String,
}

fn default_range() -> String {
    "7d".to_string()
}

/// `(hours, bucket_format)`; the bucket format feeds `DATE_FORMAT` directly.
fn range_to_window(range: &str) -> Result<(i64, &'static str), ApiError> {
    match range {
        "24h" => Ok((24, "%H:00")),
        "7d" => Ok((7 * 24, "%m-%d")),
        "30d" => Ok((30 * 24, "%m-%d")),
        other => Err(ApiError::BadRequest(format!("unsupported range '{other}'"))),
    }
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    by_hospital: Vec<crate::store::HospitalStats>,
    by_source: Vec<crate::store::SourceStats>,
    total: i64,
    high: i64,
    active: i64,
    dismissed: i64,
    avg_score: f64,
}

pub async fn get_stats(ctx: Data<AppContext>, params: Query<RangeParams>) -> Result<HttpResponse, ApiError> {
    let (hours, _) = range_to_window(&params.range)?;
    let since = Utc::now().naive_utc() - chrono::Duration::hours(hours);
    let hospital = params.hospital.as_deref();

    let by_hospital = ctx.store.compute_stats(hospital, Some(since)).await?;
    let by_source = ctx.store.compute_source_stats(hospital, Some(since)).await?;
    let overall = ctx.store.compute_overall_stats(hospital, Some(since)).await?;

    Ok(HttpResponse::Ok().json(StatsResponse {
        by_hospital,
        by_source,
        total: overall.total,
        high: overall.high,
        active: overall.active,
        dismissed: overall.dismissed,
        avg_score: overall.avg_score,
    }))
}

pub async fn get_trend(ctx: Data<AppContext>, params: Query<RangeParams>) -> Result<HttpResponse, ApiError> {
    let (hours, bucket_format) = range_to_window(&params.range)?;
    let points = ctx
        .store
        .trend(params.hospital.as_deref(), hours, bucket_format)
        .await?;
    Ok(HttpResponse::Ok().json(points))
}
