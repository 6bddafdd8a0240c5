//! The two periodic cycles: change detection and the daily summary.
//!
//! Each cycle runs synchronously to completion or fails atomically: a
//! transient remote failure aborts via `?` without touching persisted
//! state, and the next scheduled tick retries from the last good snapshot.

use std::collections::BTreeMap;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Datelike as _, Utc};
use serde_json::Value;
use starwatch_core::{
  diff::diff,
  format,
  snapshot::{self, Snapshot},
};
use starwatch_store::StateStore;

use crate::{client::LeaderboardClient, config::BotConfig, notify::Notifier};

/// The event runs in December; the summary is a no-op in any other month.
const EVENT_MONTH: u32 = 12;

/// Persist the current remote snapshot without announcing anything.
///
/// Run on first boot (and if the state file vanishes mid-run) so an entire
/// event's historical backlog is never back-announced.
pub async fn seed_state(
  client: &LeaderboardClient,
  store: &StateStore,
) -> Result<()> {
  let raw = client.fetch().await?;
  let current = Snapshot::from_payload(&raw)?;
  store.save(&current).context("seeding state file")?;
  tracing::info!(
    facts = current.len(),
    "seeded state from current leaderboard"
  );
  Ok(())
}

/// Change-detection cycle: fetch, diff against the persisted snapshot,
/// announce each new star in order, then persist the new snapshot.
pub async fn check_new_stars(
  client: &LeaderboardClient,
  store: &StateStore,
  notifier: &Notifier,
  cfg: &BotConfig,
) -> Result<()> {
  let raw = client.fetch().await?;
  let current = Snapshot::from_payload(&raw)?;

  let Some(previous) = store.load()? else {
    tracing::warn!("state file missing mid-run; re-seeding without announcing");
    store.save(&current).context("re-seeding state file")?;
    return Ok(());
  };

  let new_facts = diff(&previous, &current);
  if new_facts.is_empty() {
    tracing::debug!("no new stars");
    return Ok(());
  }

  let names = display_names(&raw);
  for fact in &new_facts {
    let name = names
      .get(&fact.key.participant_id)
      .cloned()
      .unwrap_or_else(|| format!("Member {}", fact.key.participant_id));
    let message = format::render_fact(fact, &name, cfg.timezone);
    tracing::info!(%message, "announcing");
    notifier.post(&message).await;
  }

  // Saved even when deliveries failed: at-most-once announcement is favored
  // over guaranteed delivery.
  store.save(&current).context("persisting snapshot")?;
  Ok(())
}

/// Daily ranking summary.
pub async fn daily_summary(
  client: &LeaderboardClient,
  notifier: &Notifier,
  cfg: &BotConfig,
  now: DateTime<Utc>,
) -> Result<()> {
  let local = now.with_timezone(&cfg.timezone);
  if local.month() != EVENT_MONTH {
    tracing::debug!("outside the event month; skipping summary");
    return Ok(());
  }

  let raw = client.fetch().await?;
  let participants = snapshot::participants(&raw);
  let text =
    format::render_ranking(&participants, local, cfg.event_year, cfg.rank_policy);

  tracing::info!("posting daily summary");
  notifier.post(&text).await;
  Ok(())
}

/// Map participant id to display name for the current payload.
fn display_names(raw: &Value) -> BTreeMap<String, String> {
  snapshot::participants(raw)
    .into_iter()
    .map(|p| (p.id.clone(), p.display_name()))
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
