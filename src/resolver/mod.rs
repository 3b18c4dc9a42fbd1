//! Best-effort client network metadata.
//!
//! [`NetworkInfoResolver::resolve`] walks an ordered list of strategies and stops at
//! the first one that yields a usable IP. When every strategy comes up empty the
//! local environment heuristic produces the result, so resolution never fails.

pub mod environment;
pub mod lookup;
pub mod origin;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::Config;
use crate::model::network_info::NetworkInfo;

pub use environment::LocalEnvironment;
pub use lookup::{IpApiComLookup, IpapiCoLookup, RequestAddress};
pub use origin::OriginHint;

pub const SOURCE_SERVER_HOSTNAME: &str = "server_hostname";
pub const SOURCE_DOMAIN_DETECTION: &str = "domain_detection";
pub const SOURCE_SERVER_API: &str = "server_api";
pub const SOURCE_IPAPI_CO: &str = "ipapi.co";
pub const SOURCE_IP_API_COM: &str = "ip-api.com";
pub const SOURCE_LOCAL_ENVIRONMENT: &str = "local_environment";

/// Ambient signals about the submitting client.
#[derive(Debug, Clone, Default)]
pub struct ClientEnvironment {
    /// Host the client reached us on, without port.
    pub hostname: String,
    /// Client address as seen by this server, honoring `Forwarded` / `X-Forwarded-For`.
    /// Empty when unknown.
    pub client_ip: String,
    pub user_agent: String,
    pub locale: String,
    pub timezone: String,
}

/// Static metadata for the hosting institution.
#[derive(Debug, Clone)]
pub struct Institution {
    pub domain: String,
    pub name: String,
    pub city: String,
    pub region: String,
    pub country: String,
}

impl Institution {
    pub fn from_config(config: &Config) -> Self {
        Self {
            domain: config.institution_domain.clone(),
            name: config.institution_name.clone(),
            city: config.institution_city.clone(),
            region: config.institution_region.clone(),
            country: config.institution_country.clone(),
        }
    }

    pub fn matches(&self, hostname: &str) -> bool {
        !self.domain.is_empty() && hostname.ends_with(&self.domain)
    }
}

/// One step of the cascade. `None` means "try the next step".
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, env: &ClientEnvironment) -> Option<NetworkInfo>;
}

pub struct NetworkInfoResolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
    fallback: LocalEnvironment,
}

impl NetworkInfoResolver {
    pub fn new(strategies: Vec<Box<dyn ResolutionStrategy>>, fallback: LocalEnvironment) -> Self {
        Self {
            strategies,
            fallback,
        }
    }

    /// Origin hint, request address (private networks), ipapi.co, ip-api.com, request
    /// address (any).
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let institution = Institution::from_config(config);

        let strategies: Vec<Box<dyn ResolutionStrategy>> = vec![
            Box::new(OriginHint::new(institution.clone())),
            Box::new(RequestAddress::non_public()),
            Box::new(IpapiCoLookup::new(
                client.clone(),
                &config.lookup_a_url,
                Duration::from_secs(config.lookup_a_timeout_secs),
            )),
            Box::new(IpApiComLookup::new(
                client,
                &config.lookup_b_url,
                Duration::from_secs(config.lookup_timeout_secs),
            )),
            Box::new(RequestAddress::any()),
        ];

        Self::new(
            strategies,
            LocalEnvironment::new(institution, &config.default_timezone),
        )
    }

    pub async fn resolve(&self, env: &ClientEnvironment) -> NetworkInfo {
        for strategy in &self.strategies {
            match strategy.resolve(env).await {
                Some(info) if info.has_ip() => {
                    debug!(strategy = strategy.name(), ip = %info.ip, "Network info resolved");
                    return info;
                }
                Some(_) => debug!(strategy = strategy.name(), "Lookup returned no usable ip"),
                None => debug!(strategy = strategy.name(), "Lookup unavailable"),
            }
        }

        info!(hostname = %env.hostname, "All network lookups failed, using local environment");
        self.fallback.resolve(env)
    }
}
