use crate::{
    api::{attendance, health, network},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond((60_000 / requests_per_min as u64).max(1))
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("limiter period and burst are non-zero");
        Governor::new(&cfg)
    }

    let submit_limiter = Arc::new(build_limiter(config.rate_submit_per_min));
    let public_limiter = Arc::new(build_limiter(config.rate_public_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::resource("/attendance")
                    .wrap(submit_limiter)
                    .route(web::post().to(attendance::submit_attendance)),
            )
            .service(
                web::scope("")
                    .wrap(public_limiter)
                    .route("/attendance/summary", web::get().to(attendance::daily_summary))
                    .route("/attendance/statistics", web::get().to(attendance::remote_statistics))
                    .route("/attendance/backups", web::get().to(attendance::list_backups))
                    .route("/ip", web::get().to(network::client_ip))
                    .route("/health", web::get().to(health::health)),
            ),
    );
}

// POST /api/attendance
//  ├─ validate (422 with every bad field)
//  ├─ resolve network info (never fails)
//  ├─ remote insert ──ok──► local backup copy ─► remote: true
//  └─ remote failed ─────► local append ───────► remote: false, fallbackReason
//                                 └─ failed ───► 503
