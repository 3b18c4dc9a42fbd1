use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub local_database_url: String,
    pub log_dir: String,
    pub log_level: tracing::Level,

    // Remote table (PostgREST / Supabase)
    pub remote_url: String,
    pub remote_key: String,
    pub remote_timeout_secs: u64,

    // Network info lookups; URLs are templates with an `{ip}` placeholder
    pub lookup_a_url: String,
    pub lookup_a_timeout_secs: u64,
    pub lookup_b_url: String,
    pub lookup_timeout_secs: u64,
    pub institution_domain: String,
    pub institution_name: String,
    pub institution_city: String,
    pub institution_region: String,
    pub institution_country: String,
    pub default_timezone: String,

    pub stats_refresh_secs: u64,
    pub rate_submit_per_min: u32,
    pub rate_public_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            local_database_url: var_or("LOCAL_DATABASE_URL", "sqlite://attendance.db?mode=rwc"),
            log_dir: var_or("LOG_DIR", "logs"),
            log_level: parse_or("LOG_LEVEL", tracing::Level::DEBUG),

            remote_url: var_or("REMOTE_URL", ""),
            remote_key: var_or("REMOTE_KEY", ""),
            remote_timeout_secs: parse_or("REMOTE_TIMEOUT_SECS", 10),

            lookup_a_url: var_or("LOOKUP_A_URL", "https://ipapi.co/{ip}/json/"),
            lookup_a_timeout_secs: parse_or("LOOKUP_A_TIMEOUT_SECS", 5),
            lookup_b_url: var_or("LOOKUP_B_URL", "http://ip-api.com/json/{ip}"),
            lookup_timeout_secs: parse_or("LOOKUP_TIMEOUT_SECS", 3),
            institution_domain: var_or("INSTITUTION_DOMAIN", "ccu.edu.tw"),
            institution_name: var_or("INSTITUTION_NAME", "National Chung Cheng University"),
            institution_city: var_or("INSTITUTION_CITY", "Chiayi"),
            institution_region: var_or("INSTITUTION_REGION", "Chiayi County"),
            institution_country: var_or("INSTITUTION_COUNTRY", "Taiwan"),
            default_timezone: var_or("DEFAULT_TIMEZONE", "Asia/Taipei"),

            stats_refresh_secs: parse_or("STATS_REFRESH_SECS", 30), // matches the form's poll
            rate_submit_per_min: parse_or("RATE_SUBMIT_PER_MIN", 30),
            rate_public_per_min: parse_or("RATE_PUBLIC_PER_MIN", 600),

            api_prefix: var_or("API_PREFIX", "/api"),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr + Copy + std::fmt::Debug>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, ?default, "Invalid config value, using default");
            default
        }),
        Err(_) => default,
    }
}
