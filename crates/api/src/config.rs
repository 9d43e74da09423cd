use std::fmt::Display;
use std::str::FromStr;

use gurmania_core::gating::GatingPolicy;
use gurmania_core::workshop::DEFAULT_JOIN_GRACE_MINS;

use crate::auth::jwt::JwtConfig;

/// Runtime settings, read once at startup.
///
/// | Env Var                    | Default                 |
/// |----------------------------|-------------------------|
/// | `HOST`                     | `0.0.0.0`               |
/// | `PORT`                     | `3000`                  |
/// | `CORS_ORIGINS`             | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
/// | `SHUTDOWN_TIMEOUT_SECS`    | `30`                    |
/// | `GATING_POLICY`            | `quizzes_passed`        |
/// | `WORKSHOP_JOIN_GRACE_MINS` | `15`                    |
/// | `JWT_SECRET`               | required                |
/// | `JWT_ACCESS_EXPIRY_MINS`   | `15`                    |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after SIGINT/SIGTERM.
    pub shutdown_timeout_secs: u64,
    /// Which achievements unlock the next module.
    pub gating_policy: GatingPolicy,
    /// Minutes past a workshop's scheduled end during which reserved
    /// learners may still join.
    pub workshop_join_grace_mins: i64,
    pub jwt: JwtConfig,
}

/// Parse `key` when set, else fall back to `default`.
///
/// Panics on an unparsable value so misconfiguration fails at startup.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key}={raw:?} is invalid: {e}")),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// # Panics
    ///
    /// On malformed values, a missing `JWT_SECRET`, or a negative join grace.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let gating_policy = std::env::var("GATING_POLICY")
            .map(|raw| {
                GatingPolicy::from_str_value(raw.trim())
                    .unwrap_or_else(|e| panic!("GATING_POLICY: {e}"))
            })
            .unwrap_or_default();

        let workshop_join_grace_mins = env_or("WORKSHOP_JOIN_GRACE_MINS", DEFAULT_JOIN_GRACE_MINS);
        assert!(
            workshop_join_grace_mins >= 0,
            "WORKSHOP_JOIN_GRACE_MINS must not be negative"
        );

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            gating_policy,
            workshop_join_grace_mins,
            jwt: JwtConfig::from_env(),
        }
    }
}
