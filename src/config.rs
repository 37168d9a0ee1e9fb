use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub jwt_secret: String,
    pub jwt_expires_in_hours: u64,
    pub cors_origin: String,
    pub trust_proxy: bool,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub srs: SrsEnvConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u64,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

/// Raw env values for the SRS engine; `srs::config::SrsConfig::from_env`
/// turns these into typed durations.
#[derive(Debug, Clone)]
pub struct SrsEnvConfig {
    pub review_cooldown_hours: u64,
    pub vocab_cooldown_mins: u64,
    pub trusted_horizon_days: u64,
    pub review_batch_size: usize,
    pub discovery_limit: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("enable_file_logs", &self.enable_file_logs)
            .field("log_dir", &self.log_dir)
            .field("sled_path", &self.sled_path)
            .field("jwt_secret", &"***REDACTED***")
            .field("jwt_expires_in_hours", &self.jwt_expires_in_hours)
            .field("cors_origin", &self.cors_origin)
            .field("trust_proxy", &self.trust_proxy)
            .field("rate_limit", &self.rate_limit)
            .field("cache", &self.cache)
            .field("srs", &self.srs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/kanji.sled"),
            jwt_secret: env_or(
                "JWT_SECRET",
                "change_me_to_random_64_chars_change_me_to_random_64_chars",
            ),
            jwt_expires_in_hours: env_or_parse("JWT_EXPIRES_IN_HOURS", 24_u64),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            trust_proxy: env_or_bool("TRUST_PROXY", false),
            rate_limit: RateLimitConfig {
                window_secs: env_or_parse("RATE_LIMIT_WINDOW_SECS", 900_u64),
                max_requests: env_or_parse("RATE_LIMIT_MAX", 500_u64),
            },
            cache: CacheConfig {
                ttl_secs: env_or_parse("RESPONSE_CACHE_TTL_SECS", 120_u64),
            },
            srs: SrsEnvConfig {
                review_cooldown_hours: env_or_parse("SRS_REVIEW_COOLDOWN_HOURS", 12_u64),
                vocab_cooldown_mins: env_or_parse("SRS_VOCAB_COOLDOWN_MINS", 60_u64),
                trusted_horizon_days: env_or_parse("SRS_TRUSTED_HORIZON_DAYS", 30_u64),
                review_batch_size: env_or_parse("SRS_REVIEW_BATCH_SIZE", 15_usize),
                discovery_limit: env_or_parse("SRS_DISCOVERY_LIMIT", 7_usize),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
