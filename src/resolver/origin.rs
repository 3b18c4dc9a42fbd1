use std::net::IpAddr;

use async_trait::async_trait;
use chrono::Utc;

use crate::model::network_info::{NetworkInfo, or_unknown};
use crate::resolver::{
    ClientEnvironment, Institution, ResolutionStrategy, SOURCE_DOMAIN_DETECTION,
    SOURCE_SERVER_HOSTNAME,
};

const SERVER_LABEL: &str = "Server";

/// Synthesizes network info from the origin hostname alone; never touches the network.
pub struct OriginHint {
    institution: Institution,
}

impl OriginHint {
    pub fn new(institution: Institution) -> Self {
        Self { institution }
    }
}

#[async_trait]
impl ResolutionStrategy for OriginHint {
    fn name(&self) -> &'static str {
        "origin_hint"
    }

    async fn resolve(&self, env: &ClientEnvironment) -> Option<NetworkInfo> {
        let hostname = env.hostname.trim();
        let timezone = or_unknown(Some(&env.timezone));

        if hostname.parse::<IpAddr>().is_ok() {
            return Some(NetworkInfo {
                ip: hostname.to_string(),
                country: self.institution.country.clone(),
                city: SERVER_LABEL.to_string(),
                region: SERVER_LABEL.to_string(),
                isp: SERVER_LABEL.to_string(),
                timezone,
                source: SOURCE_SERVER_HOSTNAME.to_string(),
                timestamp: Utc::now().to_rfc3339(),
            });
        }

        if self.institution.matches(hostname) {
            return Some(NetworkInfo {
                ip: hostname.to_string(),
                country: self.institution.country.clone(),
                city: self.institution.city.clone(),
                region: self.institution.region.clone(),
                isp: self.institution.name.clone(),
                timezone,
                source: SOURCE_DOMAIN_DETECTION.to_string(),
                timestamp: Utc::now().to_rfc3339(),
            });
        }

        None
    }
}
