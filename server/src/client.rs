//! HTTP client for the leaderboard endpoint, used by result screens and tools.

use aimtrainer_shared::protocol::{
    ErrorResponse, GameMode, LeaderboardEntry, SubmitResponse, SubmitScore,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
}

/// What a leaderboard panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardView {
    Entries(Vec<LeaderboardEntry>),
    /// Reachable, no scores yet
    Empty,
    /// Unreachable or answered with an error
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    http: reqwest::Client,
    base_url: String,
}

impl LeaderboardClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/leaderboard", self.base_url.trim_end_matches('/'))
    }

    pub async fn try_fetch(
        &self,
        mode: GameMode,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let resp = self
            .http
            .get(self.endpoint())
            .query(&[("mode", mode.as_str().to_string()), ("limit", limit.to_string())])
            .send()
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }

    /// Never fails; errors collapse into `BoardView::Unavailable`.
    pub async fn fetch(&self, mode: GameMode, limit: usize) -> BoardView {
        match self.try_fetch(mode, limit).await {
            Ok(entries) if entries.is_empty() => BoardView::Empty,
            Ok(entries) => BoardView::Entries(entries),
            Err(e) => {
                tracing::warn!("leaderboard fetch for {} failed: {}", mode.as_str(), e);
                BoardView::Unavailable
            }
        }
    }

    pub async fn submit(&self, score: &SubmitScore) -> Result<SubmitResponse, ClientError> {
        let resp = self.http.post(self.endpoint()).json(score).send().await?;
        Ok(check_status(resp).await?.json().await?)
    }

    /// Fire-and-forget submit. Returns the entry id on success.
    pub async fn submit_best_effort(&self, score: &SubmitScore) -> Option<String> {
        match self.submit(score).await {
            Ok(resp) => Some(resp.id),
            Err(e) => {
                tracing::warn!("score submit failed: {}", e);
                None
            }
        }
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match resp.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
    };
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
