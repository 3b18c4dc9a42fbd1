use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::model::network_info::{NetworkInfo, or_unknown};
use crate::resolver::{
    ClientEnvironment, ResolutionStrategy, SOURCE_IP_API_COM, SOURCE_IPAPI_CO, SOURCE_SERVER_API,
};

/// Placeholder substituted with the client address in lookup URL templates.
pub const IP_PLACEHOLDER: &str = "{ip}";

/// Single GET with its own timeout. Transport errors, timeouts, non-2xx statuses and
/// unparsable bodies all collapse to `None`.
async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Option<T> {
    let response = match client
        .get(url)
        .header(ACCEPT, "application/json")
        .timeout(timeout)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            debug!(url, error = %e, "Lookup request failed");
            return None;
        }
    };

    if !response.status().is_success() {
        debug!(url, status = %response.status(), "Lookup returned error status");
        return None;
    }

    match response.json::<T>().await {
        Ok(body) => Some(body),
        Err(e) => {
            debug!(url, error = %e, "Lookup returned unparsable body");
            None
        }
    }
}

fn stamp(info: NetworkInfo) -> NetworkInfo {
    NetworkInfo {
        timestamp: Utc::now().to_rfc3339(),
        ..info
    }
}

/// Address the submission arrived from, if it is a valid IP.
fn client_addr(env: &ClientEnvironment) -> Option<IpAddr> {
    env.client_ip.trim().parse().ok()
}

/// Routable on the public internet, so a geolocation service can say something about it.
pub fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00 // unique local
                || (first & 0xffc0) == 0xfe80) // link local
        }
    }
}

/// Fills the template with `ip`. Templates without the placeholder are refused so a
/// lookup can never describe this server instead of the client.
fn lookup_url(template: &str, ip: IpAddr) -> Option<String> {
    template
        .contains(IP_PLACEHOLDER)
        .then(|| template.replace(IP_PLACEHOLDER, &ip.to_string()))
}

/// Public client address to geolocate, or `None` when there is nothing to look up.
fn lookup_target(env: &ClientEnvironment) -> Option<IpAddr> {
    client_addr(env).filter(|ip| is_public(*ip))
}

// -------------------- request address --------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressScope {
    NonPublic,
    Any,
}

/// The client address as observed by this server (`Forwarded` / `X-Forwarded-For`
/// aware). No outbound request is made.
///
/// Placed before the geolocation services it only accepts private and loopback
/// addresses, which those services cannot describe; placed after them it echoes any
/// address with the remaining fields left `unknown`.
pub struct RequestAddress {
    scope: AddressScope,
}

impl RequestAddress {
    pub fn non_public() -> Self {
        Self {
            scope: AddressScope::NonPublic,
        }
    }

    pub fn any() -> Self {
        Self {
            scope: AddressScope::Any,
        }
    }
}

#[async_trait]
impl ResolutionStrategy for RequestAddress {
    fn name(&self) -> &'static str {
        SOURCE_SERVER_API
    }

    async fn resolve(&self, env: &ClientEnvironment) -> Option<NetworkInfo> {
        let ip = client_addr(env)?;
        if self.scope == AddressScope::NonPublic && is_public(ip) {
            return None;
        }

        Some(stamp(NetworkInfo {
            ip: ip.to_string(),
            timezone: or_unknown(Some(&env.timezone)),
            source: SOURCE_SERVER_API.to_string(),
            ..NetworkInfo::unknown()
        }))
    }
}

// -------------------- service A --------------------

#[derive(Deserialize)]
struct IpapiCoResponse {
    ip: Option<String>,
    country_name: Option<String>,
    city: Option<String>,
    region: Option<String>,
    org: Option<String>,
    timezone: Option<String>,
    #[serde(default)]
    error: bool,
}

/// ipapi.co lookup of the client address (`https://ipapi.co/{ip}/json/`).
pub struct IpapiCoLookup {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl IpapiCoLookup {
    pub fn new(client: reqwest::Client, url: &str, timeout: Duration) -> Self {
        Self {
            client,
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ResolutionStrategy for IpapiCoLookup {
    fn name(&self) -> &'static str {
        SOURCE_IPAPI_CO
    }

    async fn resolve(&self, env: &ClientEnvironment) -> Option<NetworkInfo> {
        let target = lookup_target(env)?;
        let url = lookup_url(&self.url, target)?;
        let body: IpapiCoResponse = get_json(&self.client, &url, self.timeout).await?;

        // reserved ranges and rate limits come back as 200 with `error: true`
        if body.error {
            return None;
        }

        Some(stamp(NetworkInfo {
            ip: body.ip.unwrap_or_else(|| target.to_string()),
            country: or_unknown(body.country_name.as_deref()),
            city: or_unknown(body.city.as_deref()),
            region: or_unknown(body.region.as_deref()),
            isp: or_unknown(body.org.as_deref()),
            timezone: or_unknown(body.timezone.as_deref()),
            source: SOURCE_IPAPI_CO.to_string(),
            ..NetworkInfo::unknown()
        }))
    }
}

// -------------------- service B --------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiComResponse {
    status: Option<String>,
    query: Option<String>,
    country: Option<String>,
    city: Option<String>,
    region_name: Option<String>,
    isp: Option<String>,
    timezone: Option<String>,
}

/// ip-api.com lookup of the client address (`http://ip-api.com/json/{ip}`).
pub struct IpApiComLookup {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl IpApiComLookup {
    pub fn new(client: reqwest::Client, url: &str, timeout: Duration) -> Self {
        Self {
            client,
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ResolutionStrategy for IpApiComLookup {
    fn name(&self) -> &'static str {
        SOURCE_IP_API_COM
    }

    async fn resolve(&self, env: &ClientEnvironment) -> Option<NetworkInfo> {
        let target = lookup_target(env)?;
        let url = lookup_url(&self.url, target)?;
        let body: IpApiComResponse = get_json(&self.client, &url, self.timeout).await?;

        // ip-api reports failures in-band with a 200
        if body.status.as_deref() == Some("fail") {
            return None;
        }

        Some(stamp(NetworkInfo {
            ip: body.query.unwrap_or_else(|| target.to_string()),
            country: or_unknown(body.country.as_deref()),
            city: or_unknown(body.city.as_deref()),
            region: or_unknown(body.region_name.as_deref()),
            isp: or_unknown(body.isp.as_deref()),
            timezone: or_unknown(body.timezone.as_deref()),
            source: SOURCE_IP_API_COM.to_string(),
            ..NetworkInfo::unknown()
        }))
    }
}
