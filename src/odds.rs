use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{OddsError, Result};
use crate::teams::TeamNameReplacements;

pub const DEFAULT_BOOKMAKER: &str = "pinnacle";

/// Provider event id. Kept in whatever JSON shape the provider used so the
/// cache file round-trips it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Text(s) => f.write_str(s),
            EventId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        EventId::Text(value.to_string())
    }
}

impl From<i64> for EventId {
    fn from(value: i64) -> Self {
        EventId::Number(value.into())
    }
}

/// One normalized match row, as stored in the league cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: EventId,
    pub home_team: String,
    pub away_team: String,
    pub bookie_home_odds: f64,
    pub bookie_draw_odds: f64,
    pub bookie_away_odds: f64,
}

/// Dedupe key for cache merges.
pub type RowKey = (EventId, String, String);

impl EventRow {
    pub fn key(&self) -> RowKey {
        (
            self.id.clone(),
            self.home_team.clone(),
            self.away_team.clone(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OddsResponse {
    pub data: Vec<OddsGame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OddsGame {
    pub id: EventId,
    pub home_team: String,
    pub teams: [String; 2],
    #[serde(default)]
    pub sites: Vec<OddsSite>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OddsSite {
    pub site_key: String,
    pub odds: SiteOdds,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteOdds {
    /// `[teams[0], teams[1], draw]`
    #[serde(default)]
    pub h2h: Vec<f64>,
}

pub fn parse_odds_response(raw: &str) -> Result<OddsResponse> {
    serde_json::from_str(raw).map_err(OddsError::Schema)
}

/// Picks the bookmaker to take odds from: the first preferred `site_key`
/// present (in preference order), else whichever site the provider listed
/// first.
pub fn select_bookmaker<'a>(game: &'a OddsGame, preferred: &[String]) -> Result<&'a OddsSite> {
    for key in preferred {
        if let Some(site) = game.sites.iter().find(|s| s.site_key == *key) {
            return Ok(site);
        }
    }
    game.sites.first().ok_or_else(|| OddsError::NoBookmaker {
        event_id: game.id.clone(),
    })
}

/// Reorders a provider h2h triple into `(away_team, [home, draw, away])`.
pub fn align_h2h(home_team: &str, teams: &[String; 2], h2h: [f64; 3]) -> (String, [f64; 3]) {
    if teams[0] == home_team {
        (teams[1].clone(), [h2h[0], h2h[2], h2h[1]])
    } else {
        (teams[0].clone(), [h2h[1], h2h[2], h2h[0]])
    }
}

pub fn normalize_game(
    game: &OddsGame,
    preferred: &[String],
    replacements: &TeamNameReplacements,
) -> Result<EventRow> {
    let site = select_bookmaker(game, preferred)?;
    let h2h = h2h_triple(&site.odds.h2h)?;

    if game.teams[0] != game.home_team && game.teams[1] != game.home_team {
        warn!(
            event_id = %game.id,
            home_team = %game.home_team,
            "home team not listed in teams; assuming teams[1] is home"
        );
    }
    let (away_team, [home, draw, away]) = align_h2h(&game.home_team, &game.teams, h2h);

    Ok(EventRow {
        id: game.id.clone(),
        home_team: replacements.canonical(&game.home_team).to_string(),
        away_team: replacements.canonical(&away_team).to_string(),
        bookie_home_odds: home,
        bookie_draw_odds: draw,
        bookie_away_odds: away,
    })
}

/// Normalizes every game into one table; the first failing game aborts.
pub fn normalize_games(
    games: &[OddsGame],
    preferred: &[String],
    replacements: &TeamNameReplacements,
) -> Result<Vec<EventRow>> {
    games
        .iter()
        .map(|game| normalize_game(game, preferred, replacements))
        .collect()
}

fn h2h_triple(h2h: &[f64]) -> Result<[f64; 3]> {
    match h2h {
        [a, b, c] => Ok([*a, *b, *c]),
        other => Err(OddsError::Schema(serde::de::Error::invalid_length(
            other.len(),
            &"an h2h array of 3 prices",
        ))),
    }
}
