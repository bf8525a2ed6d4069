//! JSON bodies exchanged with the high-score endpoint

use serde::{Deserialize, Serialize};

pub const HIGHSCORE_PATH: &str = "/api/highscore";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreResponse {
    pub high_score: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub score: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}
