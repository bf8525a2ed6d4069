//! Best-effort client for the shared high score.
//!
//! The game never waits on the network: requests go to a worker thread that
//! owns a small tokio runtime, and fresh values come back as
//! [`GameEvent::HighScore`] on the game loop's channel. Failures are logged
//! and otherwise ignored, so the displayed world best just stays stale.

use std::io;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::engine::ScoreReporter;
use crate::error::ClientError;
use crate::protocol::{HighScoreResponse, ScoreSubmission};
use crate::runtime::GameEvent;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn fetch_high_score(client: &reqwest::Client, url: &str) -> Result<u64, ClientError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ClientError::Status(response.status()));
    }
    let body: HighScoreResponse = response.json().await?;
    Ok(body.high_score)
}

pub async fn submit_score(
    client: &reqwest::Client,
    url: &str,
    score: u64,
) -> Result<u64, ClientError> {
    let response = client
        .post(url)
        .json(&ScoreSubmission { score })
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(ClientError::Status(response.status()));
    }
    let body: HighScoreResponse = response.json().await?;
    Ok(body.high_score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Fetch,
    Submit(u64),
}

/// Handle to the high-score worker. Cheap to clone; the worker stops once
/// every handle is dropped.
#[derive(Debug, Clone)]
pub struct HighScoreClient {
    tx: UnboundedSender<Request>,
}

impl HighScoreClient {
    /// Start the worker. It fetches right away, then every `poll_interval`.
    pub fn spawn(
        url: String,
        poll_interval: Duration,
        updates: Sender<GameEvent>,
    ) -> io::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("highscore".into())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        warn!("high score worker could not start: {}", e);
                        return;
                    }
                };
                rt.block_on(run_worker(url, poll_interval, rx, updates));
            })?;

        Ok(Self { tx })
    }

    pub fn refresh(&self) {
        let _ = self.tx.send(Request::Fetch);
    }

    /// Offer a finished game's score. Returns immediately.
    pub fn submit(&self, score: u64) {
        let _ = self.tx.send(Request::Submit(score));
    }
}

impl ScoreReporter for HighScoreClient {
    fn report(&mut self, score: u32) {
        self.submit(u64::from(score));
    }
}

async fn run_worker(
    url: String,
    poll_interval: Duration,
    mut rx: UnboundedReceiver<Request>,
    updates: Sender<GameEvent>,
) {
    let client = match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("high score client could not be built: {}", e);
            return;
        }
    };

    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let outcome = tokio::select! {
            _ = poll.tick() => fetch_high_score(&client, &url).await,
            request = rx.recv() => match request {
                None => break,
                Some(Request::Fetch) => fetch_high_score(&client, &url).await,
                Some(Request::Submit(score)) => {
                    match submit_score(&client, &url, score).await {
                        Ok(best) => {
                            if updates.send(GameEvent::HighScore(best)).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(score, "score submission failed: {}", e),
                    }
                    fetch_high_score(&client, &url).await
                }
            },
        };

        match outcome {
            Ok(best) => {
                if updates.send(GameEvent::HighScore(best)).is_err() {
                    break;
                }
            }
            Err(e) => debug!("high score fetch failed: {}", e),
        }
    }
    debug!("high score worker stopped");
}
