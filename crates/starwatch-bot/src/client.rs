//! HTTP client for the upstream leaderboard API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, header};
use serde_json::Value;

use crate::config::BotConfig;

/// Fixed identifying user-agent, as the upstream asks of automated clients.
const USER_AGENT: &str = "starwatch-webhook-bot";

/// Bound on every remote call so a hung upstream cannot stall the scheduler.
pub(crate) const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct LeaderboardClient {
  client:  Client,
  url:     String,
  session: String,
}

impl LeaderboardClient {
  pub fn new(cfg: &BotConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(REMOTE_TIMEOUT)
      .user_agent(USER_AGENT)
      .build()
      .context("failed to build HTTP client")?;

    Ok(Self {
      client,
      url: cfg.leaderboard_url(),
      session: cfg.session.clone(),
    })
  }

  /// Fetch the raw leaderboard JSON, authenticated via the session cookie.
  /// Fails on any non-2xx status.
  pub async fn fetch(&self) -> Result<Value> {
    let resp = self
      .client
      .get(&self.url)
      .header(header::COOKIE, format!("session={}", self.session))
      .send()
      .await
      .context("leaderboard request failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("leaderboard fetch → {}", resp.status()));
    }
    resp
      .json()
      .await
      .context("deserialising leaderboard payload")
  }
}
