use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::remote::{InitState, RemotePersistenceClient};
use crate::store::LocalRecordStore;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub remote: InitState,
    #[schema(example = 17)]
    pub local_records: usize,
}

/// Remote client state and local record count. Does not trigger initialization.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health(
    remote: web::Data<RemotePersistenceClient>,
    store: web::Data<LocalRecordStore>,
) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        remote: remote.state(),
        local_records: store.len().await,
    })
}
