use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use tracing::warn;

use super::store::{MemoryStore, ScoreStore, UpstashStore};
use crate::error::ConfigError;

/// Store URL variables, most specific first
pub const URL_VARS: [&str; 3] = ["UPSTASH_REDIS_REST_URL", "KV_REST_API_URL", "REDIS_REST_URL"];
/// Store token variables, same priority as [`URL_VARS`]
pub const TOKEN_VARS: [&str; 3] = [
    "UPSTASH_REDIS_REST_TOKEN",
    "KV_REST_API_TOKEN",
    "REDIS_REST_TOKEN",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstashCredentials {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChoice {
    Upstash(UpstashCredentials),
    Memory,
    /// Data routes answer 500 until credentials are provided
    Unconfigured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub store: StoreChoice,
    /// `None` allows any origin
    pub allow_origin: Option<String>,
    pub enforce_bounds: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            store: StoreChoice::Unconfigured,
            allow_origin: None,
            enforce_bounds: false,
        }
    }
}

fn first_set<F>(get_env: &mut F, names: &[&str]) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    names.iter().copied().find_map(|name| {
        get_env(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

fn truthy(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("1") | Some("true") | Some("yes") | Some("on")
    )
}

impl ServerConfig {
    pub fn from_env<F>(mut get_env: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let store = match first_set(&mut get_env, &["HIGHSCORE_STORE"]).as_deref() {
            None | Some("upstash") => {
                match (
                    first_set(&mut get_env, &URL_VARS),
                    first_set(&mut get_env, &TOKEN_VARS),
                ) {
                    (Some(url), Some(token)) => StoreChoice::Upstash(UpstashCredentials { url, token }),
                    _ => StoreChoice::Unconfigured,
                }
            }
            Some("memory") => StoreChoice::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        Ok(Self {
            store,
            allow_origin: first_set(&mut get_env, &["HIGHSCORE_ALLOW_ORIGIN"]),
            enforce_bounds: truthy(get_env("HIGHSCORE_ENFORCE_BOUNDS")),
        })
    }

    /// Build the configured store. `None` when unconfigured or when the
    /// client cannot be built; requests then fail with a diagnostic.
    pub fn build_store(&self) -> Option<Arc<dyn ScoreStore>> {
        match &self.store {
            StoreChoice::Upstash(creds) => match UpstashStore::new(&creds.url, &creds.token) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    warn!("could not build store client: {}", e);
                    None
                }
            },
            StoreChoice::Memory => Some(Arc::new(MemoryStore::new())),
            StoreChoice::Unconfigured => None,
        }
    }

    pub fn allow_origin_header(&self) -> HeaderValue {
        match &self.allow_origin {
            Some(origin) => HeaderValue::from_str(origin).unwrap_or_else(|_| {
                warn!(origin = %origin, "invalid allowed origin, falling back to *");
                HeaderValue::from_static("*")
            }),
            None => HeaderValue::from_static("*"),
        }
    }
}

pub fn resolve_listen_addr<F>(mut get_env: F) -> SocketAddr
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(addr) = get_env("HIGHSCORE_ADDR").and_then(|v| v.parse().ok()) {
        return addr;
    }

    if let Some(port) = get_env("HIGHSCORE_PORT").and_then(|v| v.parse::<u16>().ok()) {
        return SocketAddr::from(([127, 0, 0, 1], port));
    }

    SocketAddr::from(([127, 0, 0, 1], 4000))
}
