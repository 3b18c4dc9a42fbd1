//! Attendance check-in service.
//!
//! Submissions are validated, enriched with best-effort network metadata, stored in
//! a remote table and kept locally as a backup (or as the only copy when the remote
//! store is unreachable). Daily statistics prefer remote data and fall back to the
//! local store.

pub mod api;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod models;
pub mod remote;
pub mod resolver;
pub mod routes;
pub mod service;
pub mod store;
pub mod utils;
