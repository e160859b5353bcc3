use actix_web::web::{Data, Json, Path};
use actix_web::{HttpRequest, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::reports::{build_report_bundle, resolve_report_path, write_report, DownloadError};
use crate::routes::{require_admin, ApiError};

#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    hospital: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "markdown".to_string()
}

#[derive(Debug, Serialize)]
struct GenerateReportResponse {
    filename: String,
}

pub async fn generate_report(
    req: HttpRequest,
    ctx: Data<AppContext>,
    body: Json<GenerateReportRequest>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &ctx.settings.feedback)?;

    match body.format.as_str() {
        "markdown" => {}
        "word" => return Err(ApiError::NotImplemented),
        other => return Err(ApiError::BadRequest(format!("unsupported format '{other}'"))),
    }

    let bundle = build_report_bundle(&ctx.store, &body.hospital, body.start_date, body.end_date).await?;
    let filename = write_report(&ctx.settings.reports.output_dir, &bundle)
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))?;
    Ok(HttpResponse::Ok().json(GenerateReportResponse { filename }))
}

pub async fn download_report(
    req: HttpRequest,
    ctx: Data<AppContext>,
    path: Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req, &ctx.settings.feedback)?;

    let resolved = resolve_report_path(&ctx.settings.reports.output_dir, &path.into_inner())
        .map_err(|e| match e {
            DownloadError::InvalidFilename => ApiError::BadRequest(e.to_string()),
            DownloadError::Io(io) => ApiError::Unexpected(io.into()),
        })?;
    let contents = tokio::fs::read_to_string(&resolved)
        .await
        .map_err(|_| ApiError::NotFound)?;
    Ok(HttpResponse::Ok().content_type("text/markdown").body(contents))
}
