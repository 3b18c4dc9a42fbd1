pub mod attendance;
pub mod health;
pub mod network;

use std::net::IpAddr;

use actix_web::HttpRequest;
use actix_web::http::header::{ACCEPT_LANGUAGE, USER_AGENT};

use crate::resolver::ClientEnvironment;

/// Optional header a client can send with its IANA timezone.
pub const TIMEZONE_HEADER: &str = "X-Timezone";

/// `host:8080` → `host`, `[::1]:8080` → `::1`.
pub fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        // more than one colon means a bare IPv6 address
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

fn header<'a>(req: &'a HttpRequest, name: impl actix_web::http::header::AsHeaderName) -> &'a str {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Caller address: the forwarded client when behind a proxy, otherwise the peer.
/// Empty when it is not a valid IP.
pub fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(strip_port)
        .and_then(|addr| addr.parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
        .unwrap_or_default()
}

/// Ambient client signals taken from the request. `Host` only feeds the hostname
/// heuristics and is never used to build an outbound URL.
pub fn client_environment(req: &HttpRequest, default_timezone: &str) -> ClientEnvironment {
    let host = req.connection_info().host().to_string();

    let locale = header(req, ACCEPT_LANGUAGE)
        .split([',', ';'])
        .next()
        .unwrap_or("")
        .trim()
        .to_string();

    let timezone = match header(req, TIMEZONE_HEADER).trim() {
        "" => default_timezone.to_string(),
        tz => tz.to_string(),
    };

    ClientEnvironment {
        hostname: strip_port(&host).to_string(),
        client_ip: client_ip(req),
        user_agent: header(req, USER_AGENT).to_string(),
        locale,
        timezone,
    }
}
