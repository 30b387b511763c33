//! Server configuration loaded from environment variables

use crate::state::ScoringPolicy;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Allowed browser origin. None allows any origin.
    pub cors_origin: Option<String>,
    pub scoring: ScoringPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cors_origin: Some(DEFAULT_CORS_ORIGIN.to_string()),
            scoring: ScoringPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origin = match env_string("SONGFEST_CORS_ORIGIN") {
            Some(origin) if origin == "*" => {
                tracing::warn!("CORS is permissive - any origin may connect");
                None
            }
            Some(origin) => Some(origin),
            None => defaults.cors_origin,
        };

        let scoring = ScoringPolicy {
            rating_points: env_parse("SONGFEST_RATING_POINTS", defaults.scoring.rating_points),
            guess_base_points: env_parse(
                "SONGFEST_GUESS_BASE_POINTS",
                defaults.scoring.guess_base_points,
            ),
            guess_speed_points: env_parse(
                "SONGFEST_GUESS_SPEED_POINTS",
                defaults.scoring.guess_speed_points,
            ),
            guess_window_ms: env_parse("SONGFEST_GUESS_WINDOW_MS", defaults.scoring.guess_window_ms),
        };

        Self {
            bind: env_parse("SONGFEST_BIND", defaults.bind),
            port: env_parse("SONGFEST_PORT", defaults.port),
            cors_origin,
            scoring,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env_string(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value {:?} for {}, using default", raw, key);
            default
        }),
        None => default,
    }
}
