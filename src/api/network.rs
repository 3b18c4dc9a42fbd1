use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api;
use crate::model::network_info::or_unknown;
use crate::resolver::SOURCE_SERVER_API;

#[derive(Serialize, ToSchema)]
pub struct ClientIp {
    #[schema(example = "203.0.113.7")]
    pub ip: String,
    #[schema(example = "server_api")]
    pub source: String,
}

/// Caller's address as seen by this server
///
/// Reports the client address recorded with submissions. Honors `Forwarded` /
/// `X-Forwarded-For` when running behind a proxy.
#[utoipa::path(
    get,
    path = "/api/ip",
    responses(
        (status = 200, description = "Caller address", body = ClientIp)
    ),
    tag = "Network"
)]
pub async fn client_ip(req: HttpRequest) -> impl Responder {
    let ip = or_unknown(Some(&api::client_ip(&req)));

    HttpResponse::Ok().json(ClientIp {
        ip,
        source: SOURCE_SERVER_API.to_string(),
    })
}
