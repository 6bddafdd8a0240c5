//! starwatch — announces new leaderboard stars to a chat webhook.
//!
//! Polls a private Advent of Code leaderboard every 15 minutes, announces
//! newly-earned stars since the last check, and posts a ranked summary once
//! daily during December. State is a single flat snapshot file; on first
//! run it is seeded from the current leaderboard so historical stars are
//! never back-announced.

mod client;
mod config;
mod jobs;
mod notify;
mod schedule;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{NaiveTime, Utc};
use clap::Parser;
use starwatch_store::StateStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  client::LeaderboardClient,
  notify::Notifier,
  schedule::{Cadence, Task},
};

/// Scheduler polling tick.
const TICK: std::time::Duration = std::time::Duration::from_secs(5);

#[derive(Parser)]
#[command(author, version, about = "Leaderboard star announcer")]
struct Cli {
  /// Path to the TOML configuration file; `STARWATCH_*` env vars override.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = config::load(&cli.config)?;

  let store = StateStore::new(&cfg.state_file);
  let client = LeaderboardClient::new(&cfg)?;
  let notifier = Notifier::new(&cfg)?;

  // First run: seed from the current leaderboard. A malformed state file is
  // fatal here — silently resetting would mass-announce the backlog.
  if store
    .load()
    .context("reading state file at startup")?
    .is_none()
  {
    tracing::info!("no state file; seeding from current leaderboard");
    jobs::seed_state(&client, &store)
      .await
      .context("initial seeding")?;
  }

  let summary_at =
    NaiveTime::from_hms_opt(5, 59, 0).context("invalid summary time")?;

  let now = Utc::now();
  let mut check = Task::new(
    "check_new_stars",
    Cadence::Every(chrono::Duration::minutes(15)),
    cfg.timezone,
    now,
  );
  let mut summary = Task::new(
    "daily_summary",
    Cadence::DailyAt(summary_at),
    cfg.timezone,
    now,
  );

  tracing::info!(
    leaderboard = %cfg.leaderboard_id,
    year = cfg.event_year,
    "scheduler started"
  );

  loop {
    let now = Utc::now();

    if check.tick(now) {
      if let Err(e) =
        jobs::check_new_stars(&client, &store, &notifier, &cfg).await
      {
        tracing::error!(task = check.name, error = %e, "cycle failed; retrying next tick");
      }
    }

    if summary.tick(now) {
      if let Err(e) =
        jobs::daily_summary(&client, &notifier, &cfg, Utc::now()).await
      {
        tracing::error!(task = summary.name, error = %e, "cycle failed; retrying next tick");
      }
    }

    tokio::time::sleep(TICK).await;
  }
}
