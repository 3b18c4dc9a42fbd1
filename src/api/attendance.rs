use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use utoipa::IntoParams;

use crate::api::client_environment;
use crate::config::Config;
use crate::error::SubmitError;
use crate::model::attendance::AttendanceInput;
#[allow(unused_imports)]
use crate::model::statistics::{DailyStatistics, RemoteTotals};
#[allow(unused_imports)]
use crate::models::{BackupEntry, SubmissionResult};
use crate::remote::RemotePersistenceClient;
use crate::service::{StatisticsService, SubmissionService};
use crate::store::LocalRecordStore;
use crate::utils::time::{DATE_FORMAT, parse_date};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Day to summarize (`YYYY-MM-DD`), defaults to today
    pub date: Option<String>,
}

/// Submit a check-in or check-out
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceInput,
    responses(
        (status = 200, description = "Record stored (remotely, or locally in degraded mode)", body = SubmissionResult),
        (status = 422, description = "One or more fields are invalid", body = Object, example = json!({
            "error": "Please correct the highlighted fields",
            "fieldErrors": [
                {"field": "employeeName", "message": "This field is required"},
                {"field": "attendanceDate", "message": "Date cannot be in the future"}
            ]
        })),
        (status = 503, description = "Remote and local persistence both failed", body = Object, example = json!({
            "error": "Submission failed, please try again later"
        }))
    ),
    tag = "Attendance"
)]
pub async fn submit_attendance(
    req: HttpRequest,
    service: web::Data<SubmissionService>,
    config: web::Data<Config>,
    payload: web::Json<AttendanceInput>,
) -> Result<HttpResponse, SubmitError> {
    let env = client_environment(&req, &config.default_timezone);
    let result = service.submit(&payload, &env).await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Daily check-in / check-out counts and listing
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Summary from the remote table, or local records when it is unreachable", body = DailyStatistics),
        (status = 400, description = "Malformed date", body = Object, example = json!({
            "error": "date must be YYYY-MM-DD"
        }))
    ),
    tag = "Attendance"
)]
pub async fn daily_summary(
    stats: web::Data<StatisticsService>,
    query: web::Query<SummaryQuery>,
) -> impl Responder {
    let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => match parse_date(raw) {
            Some(d) => d,
            None => {
                return HttpResponse::BadRequest().json(json!({
                    "error": "date must be YYYY-MM-DD"
                }));
            }
        },
        None => Local::now().date_naive(),
    };

    let summary = stats.daily_summary(&date.format(DATE_FORMAT).to_string()).await;
    HttpResponse::Ok().json(summary)
}

/// Table-wide totals from the remote store
#[utoipa::path(
    get,
    path = "/api/attendance/statistics",
    responses(
        (status = 200, description = "Remote totals", body = RemoteTotals),
        (status = 503, description = "Remote store unavailable")
    ),
    tag = "Attendance"
)]
pub async fn remote_statistics(remote: web::Data<RemotePersistenceClient>) -> impl Responder {
    let today = Local::now().date_naive().format(DATE_FORMAT).to_string();

    match remote.totals(&today).await {
        Ok(totals) => HttpResponse::Ok().json(totals),
        Err(e) => {
            error!(error = %e, "Failed to load remote statistics");
            HttpResponse::ServiceUnavailable().json(json!({
                "error": "Statistics are temporarily unavailable"
            }))
        }
    }
}

/// Index of local JSON backups
#[utoipa::path(
    get,
    path = "/api/attendance/backups",
    responses(
        (status = 200, description = "Backup index, oldest first", body = [BackupEntry]),
        (status = 500, description = "Local storage unavailable")
    ),
    tag = "Attendance"
)]
pub async fn list_backups(store: web::Data<LocalRecordStore>) -> impl Responder {
    match store.backups().await {
        Ok(index) => HttpResponse::Ok().json(index),
        Err(e) => {
            error!(error = %e, "Failed to read backup index");
            HttpResponse::InternalServerError().json(json!({
                "error": "Local storage unavailable"
            }))
        }
    }
}
