//! Rendering of star announcements and the daily ranking table.
//!
//! Both renderers are pure functions over already-fetched data; they never
//! touch the network or the clock.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{fact::Fact, snapshot::Participant};

/// Minimum name-column width so the table reads cleanly in a fixed-width
/// block even when every name is short.
const MIN_NAME_WIDTH: usize = 30;

// ─── Tie-break policy ────────────────────────────────────────────────────────

/// How tied scores are ranked in the daily summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankPolicy {
  /// Strict positional rank: 1, 2, 3, ... regardless of ties.
  Strict,
  /// Tied scores share a rank; the next distinct score jumps to the number
  /// of entries seen so far.
  #[default]
  Competition,
}

// ─── Star announcement ───────────────────────────────────────────────────────

/// Render one new star as a single announcement line, with the achievement
/// time in the configured display timezone when known.
pub fn render_fact(fact: &Fact, display_name: &str, tz: Tz) -> String {
  let day = fact.key.milestone;
  let part = fact.key.tier;
  match fact.achieved_at {
    Some(ts) => {
      let local = ts.with_timezone(&tz);
      format!(
        "{display_name} solved Day {day} Part {part} ⭐ at {}",
        local.format("%Y-%m-%d %H:%M:%S %Z")
      )
    }
    None => format!("{display_name} solved Day {day} Part {part} ⭐"),
  }
}

// ─── Ranking table ───────────────────────────────────────────────────────────

/// Render the ranked summary: a header line plus a fixed-width code block.
///
/// Participants are sorted by score descending, then display name ascending
/// so tied scores render in a deterministic order.
pub fn render_ranking(
  participants: &[Participant],
  as_of: DateTime<Tz>,
  year: i32,
  policy: RankPolicy,
) -> String {
  let mut ordered: Vec<&Participant> = participants.iter().collect();
  ordered.sort_by(|a, b| {
    b.score
      .cmp(&a.score)
      .then_with(|| a.display_name().cmp(&b.display_name()))
  });

  let name_width = ordered
    .iter()
    .map(|p| p.display_name().chars().count())
    .max()
    .unwrap_or(0)
    .max(MIN_NAME_WIDTH);

  let header = format!(
    "*Advent of Code {year} - standings as of {}*",
    as_of.format("%Y-%m-%d %H:%M")
  );

  let mut lines = Vec::with_capacity(ordered.len());
  for (rank, p) in assign_ranks(&ordered, policy).into_iter().zip(&ordered) {
    let name = p.display_name();
    lines.push(format!(
      "{rank:>3}. {name:<name_width$}: {stars:>3}* - {score:>5} pts",
      stars = p.stars,
      score = p.score,
    ));
  }

  format!("{header}\n\n```\n{}\n```", lines.join("\n"))
}

/// Assign a rank to each entry of an already score-sorted slice.
fn assign_ranks(ordered: &[&Participant], policy: RankPolicy) -> Vec<usize> {
  let mut ranks = Vec::with_capacity(ordered.len());
  let mut rank = 0usize;
  let mut prev_score: Option<i64> = None;

  for (idx, p) in ordered.iter().enumerate() {
    match policy {
      RankPolicy::Strict => rank = idx + 1,
      RankPolicy::Competition => {
        if prev_score != Some(p.score) {
          rank = idx + 1;
          prev_score = Some(p.score);
        }
      }
    }
    ranks.push(rank);
  }

  ranks
}

// ─── Tests ───────────────────────────────────────────────────────────────────
