//! Best-effort webhook notifier.

use anyhow::{Context, Result};
use reqwest::Client;

use crate::{client::REMOTE_TIMEOUT, config::BotConfig};

pub struct Notifier {
  client:      Client,
  webhook_url: String,
}

impl Notifier {
  pub fn new(cfg: &BotConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(REMOTE_TIMEOUT)
      .build()
      .context("failed to build webhook client")?;

    Ok(Self {
      client,
      webhook_url: cfg.webhook_url.clone(),
    })
  }

  /// Deliver `text` as a `{"text": ...}` JSON body to the webhook.
  ///
  /// Delivery is best-effort: failures are logged and swallowed, so a flaky
  /// webhook can never abort the owning cycle or block the state save. A
  /// failed post for a genuinely new star is not retried.
  pub async fn post(&self, text: &str) {
    let body = serde_json::json!({ "text": text });
    match self.client.post(&self.webhook_url).json(&body).send().await {
      Ok(resp) if !resp.status().is_success() => {
        tracing::warn!(status = %resp.status(), "webhook rejected message");
      }
      Ok(_) => {}
      Err(e) => tracing::warn!(error = %e, "webhook delivery failed"),
    }
  }
}
