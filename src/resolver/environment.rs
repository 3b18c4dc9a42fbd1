use crate::model::network_info::{NetworkInfo, UNKNOWN, or_unknown};
use crate::resolver::{ClientEnvironment, Institution, SOURCE_LOCAL_ENVIRONMENT};

/// Hosting providers recognised from the origin hostname: (pattern, environment, location).
const KNOWN_HOSTS: &[(&str, &str, &str)] = &[
    ("localhost", "Local Development", "Local"),
    ("127.0.0.1", "Local Development", "Local"),
    ("github.io", "GitHub Pages", "GitHub"),
    ("vercel.app", "Vercel", "Vercel"),
    ("netlify.app", "Netlify", "Netlify"),
];

/// Last resort of the cascade: everything is inferred from local signals.
pub struct LocalEnvironment {
    institution: Institution,
    default_timezone: String,
}

impl LocalEnvironment {
    pub fn new(institution: Institution, default_timezone: &str) -> Self {
        Self {
            institution,
            default_timezone: default_timezone.to_string(),
        }
    }

    pub fn resolve(&self, env: &ClientEnvironment) -> NetworkInfo {
        let hostname = env.hostname.trim();

        let (environment, location, country) = if self.institution.matches(hostname) {
            (
                self.institution.name.clone(),
                self.institution.city.clone(),
                self.institution.country.clone(),
            )
        } else {
            let (environment, location) = KNOWN_HOSTS
                .iter()
                .find(|(pattern, _, _)| hostname.contains(pattern))
                .map(|(_, e, l)| (e.to_string(), l.to_string()))
                .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()));
            (environment, location, country_from_locale(&env.locale))
        };

        let timezone = if env.timezone.trim().is_empty() {
            or_unknown(Some(&self.default_timezone))
        } else {
            env.timezone.clone()
        };

        NetworkInfo {
            ip: or_unknown(Some(hostname)),
            country,
            city: location,
            region: environment.clone(),
            isp: environment,
            timezone,
            ..NetworkInfo::from_source(SOURCE_LOCAL_ENVIRONMENT)
        }
    }
}

/// Region subtag of a BCP 47 tag: `zh-TW` → `TW`.
fn country_from_locale(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .skip(1)
        .find(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|part| part.to_ascii_uppercase())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
