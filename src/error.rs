use thiserror::Error;

/// Failures talking to the key-value store behind the high-score service
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("High score store is not configured: set UPSTASH_REDIS_REST_URL and UPSTASH_REDIS_REST_TOKEN (or KV_REST_API_URL and KV_REST_API_TOKEN)")]
    Unconfigured,
    #[error("High score store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("High score store returned an error: {0}")]
    Upstream(String),
}

/// Failures of the game's high-score client. Never surfaced to the player.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("high score request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("high score service answered {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("unknown HIGHSCORE_STORE '{0}' (expected 'upstash' or 'memory')")]
    UnknownStore(String),
}
