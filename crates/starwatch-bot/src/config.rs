//! Startup configuration.
//!
//! Built exactly once in `main` and passed by reference into every
//! component — no ambient lookups inside core logic. Sources: an optional
//! TOML file, overridden by environment variables with the `STARWATCH_`
//! prefix. Missing required values abort the process at startup.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{Datelike as _, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use starwatch_core::format::RankPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  /// Event year; the leaderboard URL embeds it.
  #[serde(default = "default_event_year")]
  pub event_year: i32,

  /// Private leaderboard identifier.
  pub leaderboard_id: String,

  /// Upstream session cookie value.
  pub session: String,

  /// Chat webhook announcements are delivered to.
  pub webhook_url: String,

  /// Display timezone for announcement times and the summary header.
  #[serde(default = "default_timezone")]
  pub timezone: Tz,

  /// Path of the snapshot state file.
  #[serde(default = "default_state_file")]
  pub state_file: PathBuf,

  /// Tie-break policy for the daily ranking.
  #[serde(default)]
  pub rank_policy: RankPolicy,

  /// Upstream base URL; overridable so tests can point at a local server.
  #[serde(default = "default_base_url")]
  pub leaderboard_base_url: String,
}

impl BotConfig {
  /// Full URL of the private leaderboard JSON endpoint.
  pub fn leaderboard_url(&self) -> String {
    format!(
      "{}/{}/leaderboard/private/view/{}.json",
      self.leaderboard_base_url.trim_end_matches('/'),
      self.event_year,
      self.leaderboard_id,
    )
  }
}

/// Load configuration from the optional file at `path` plus `STARWATCH_*`
/// environment variables (the latter win).
pub fn load(path: &Path) -> anyhow::Result<BotConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("STARWATCH"))
    .build()
    .context("failed to read configuration")?;

  settings.try_deserialize().context(
    "invalid configuration (required: leaderboard_id, session, webhook_url)",
  )
}

fn default_event_year() -> i32 {
  Utc::now().year()
}

fn default_timezone() -> Tz {
  chrono_tz::Europe::Berlin
}

fn default_state_file() -> PathBuf {
  PathBuf::from("/data/starwatch_state.json")
}

fn default_base_url() -> String {
  "https://adventofcode.com".to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn leaderboard_url_embeds_year_and_id() {
    let cfg = BotConfig {
      event_year:           2024,
      leaderboard_id:       "123456".into(),
      session:              "s".into(),
      webhook_url:          "https://hooks.example.com/x".into(),
      timezone:             default_timezone(),
      state_file:           default_state_file(),
      rank_policy:          RankPolicy::default(),
      leaderboard_base_url: "https://adventofcode.com/".into(),
    };
    assert_eq!(
      cfg.leaderboard_url(),
      "https://adventofcode.com/2024/leaderboard/private/view/123456.json"
    );
  }

  #[test]
  fn defaults_are_sane() {
    assert_eq!(default_timezone(), chrono_tz::Europe::Berlin);
    assert_eq!(
      default_state_file(),
      PathBuf::from("/data/starwatch_state.json")
    );
    assert_eq!(RankPolicy::default(), RankPolicy::Competition);
  }
}
