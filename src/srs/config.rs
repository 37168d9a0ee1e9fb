use chrono::Duration;

use crate::config::SrsEnvConfig;

#[derive(Debug, Clone)]
pub struct SrsConfig {
    /// Minimum idle time before a learning/known item can be retested.
    pub review_cooldown: Duration,
    /// Much shorter cooldown for vocabulary-context drills.
    pub vocab_cooldown: Duration,
    /// Idle time after which a trusted record's streak is softened to 6.
    pub trusted_horizon: Duration,
    pub review_batch_size: usize,
    pub discovery_limit: usize,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            review_cooldown: Duration::hours(12),
            vocab_cooldown: Duration::minutes(60),
            trusted_horizon: Duration::days(30),
            review_batch_size: 15,
            discovery_limit: 7,
        }
    }
}

impl SrsConfig {
    pub fn from_env(env: &SrsEnvConfig) -> Self {
        Self {
            review_cooldown: Duration::hours(env.review_cooldown_hours as i64),
            vocab_cooldown: Duration::minutes(env.vocab_cooldown_mins as i64),
            trusted_horizon: Duration::days(env.trusted_horizon_days as i64),
            review_batch_size: env.review_batch_size,
            discovery_limit: env.discovery_limit,
        }
    }
}
