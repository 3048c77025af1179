use std::fs;
use std::path::PathBuf;

use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::OddsApiConfig;
use crate::error::{OddsError, Result};
use crate::http_client::http_client;
use crate::leagues::LeagueDict;
use crate::odds::{EventRow, OddsGame, OddsResponse, normalize_games};
use crate::store;
use crate::teams::TeamNameReplacements;

const ERROR_BODY_SNIPPET: usize = 220;

/// Request quota reported by the provider on every response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quota {
    pub remaining: Option<u64>,
    pub used: Option<u64>,
}

impl Quota {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            remaining: quota_header(headers, "x-requests-remaining"),
            used: quota_header(headers, "x-requests-used"),
        }
    }
}

/// Header values may be integers or floats such as `"480.0"`.
fn quota_header(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sport {
    pub key: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub has_outrights: bool,
}

#[derive(Debug, Deserialize)]
struct SportsResponse {
    data: Vec<Sport>,
}

/// Raw result of one `/odds` request.
#[derive(Debug, Clone)]
pub struct OddsFetch {
    pub sport_key: String,
    pub games: Vec<OddsGame>,
    pub quota: Quota,
}

pub struct OddsApi {
    cfg: OddsApiConfig,
    client: &'static Client,
    leagues: LeagueDict,
    replacements: TeamNameReplacements,
}

impl OddsApi {
    /// Validates `cfg` and loads league and team-name tables from its config
    /// dir (built-in defaults when unset).
    pub fn new(cfg: OddsApiConfig) -> Result<Self> {
        let (leagues, replacements) = match cfg.config_dir() {
            Some(dir) => (LeagueDict::load(dir)?, TeamNameReplacements::load(dir)?),
            None => (LeagueDict::default(), TeamNameReplacements::default()),
        };
        Self::with_tables(cfg, leagues, replacements)
    }

    pub fn with_tables(
        cfg: OddsApiConfig,
        leagues: LeagueDict,
        replacements: TeamNameReplacements,
    ) -> Result<Self> {
        cfg.validate()?;
        if !cfg.no_store {
            fs::create_dir_all(&cfg.data_dir).map_err(|e| OddsError::io(&cfg.data_dir, e))?;
        }
        Ok(Self {
            client: http_client()?,
            cfg,
            leagues,
            replacements,
        })
    }

    pub fn config(&self) -> &OddsApiConfig {
        &self.cfg
    }

    pub fn leagues(&self) -> &LeagueDict {
        &self.leagues
    }

    pub fn cache_path(&self, league: &str) -> PathBuf {
        store::league_cache_path(&self.cfg.data_dir, league)
    }

    /// Cached rows for `league` without touching the network.
    pub fn read_cached(&self, league: &str) -> Result<Option<Vec<EventRow>>> {
        store::read_rows(&self.cache_path(league))
    }

    /// In-season sports listing. Does not count against the request quota.
    pub fn get_sports(&self) -> Result<Vec<Sport>> {
        let (resp, _) = self.get_json::<SportsResponse>("sports", &[])?;
        Ok(resp.data)
    }

    /// One `/odds` request for the league's sport key.
    pub fn fetch_odds(&self, league: &str) -> Result<OddsFetch> {
        let sport_key = self.leagues.sport_key(league)?.to_string();
        let (resp, quota) = self.get_json::<OddsResponse>(
            "odds",
            &[
                ("sport", sport_key.as_str()),
                ("region", self.cfg.region.as_str()),
                ("mkt", self.cfg.market.as_str()),
            ],
        )?;
        debug!(league, sport_key = %sport_key, events = resp.data.len(), "fetched odds");
        Ok(OddsFetch {
            sport_key,
            games: resp.data,
            quota,
        })
    }

    /// Bookmaker odds for `league`, merged with the league cache file.
    ///
    /// With `force_cache` set and a cache file present the file is returned
    /// as is. Otherwise the odds are fetched and normalized, merged over the
    /// cached rows (newest wins per `(id, home_team, away_team)`) and, unless
    /// `no_store` is set, written back once.
    pub fn read_bookie_odds(&self, league: &str) -> Result<Vec<EventRow>> {
        let path = self.cache_path(league);
        if self.cfg.force_cache {
            if let Some(rows) = store::read_rows(&path)? {
                debug!(league, rows = rows.len(), "serving forced cache");
                return Ok(rows);
            }
            debug!(league, "forced cache requested but no cache file yet");
        }

        let fetch = self.fetch_odds(league)?;
        let new_rows = normalize_games(
            &fetch.games,
            &self.cfg.preferred_bookmakers,
            &self.replacements,
        )?;

        let merged = match store::read_rows(&path)? {
            Some(existing) => {
                let before = existing.len();
                let merged = store::merge_rows(existing, new_rows);
                debug!(league, cached = before, merged = merged.len(), "merged with cache");
                merged
            }
            None => new_rows,
        };

        if self.cfg.no_store {
            debug!(league, "no_store set; cache not written");
        } else {
            store::write_rows(&path, &merged)?;
            info!(league, rows = merged.len(), path = %path.display(), "odds cache updated");
        }
        Ok(merged)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<(T, Quota)> {
        let url = format!("{}/{endpoint}", self.cfg.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(&url)
            .query(&[("api_key", self.cfg.api_key.as_str())])
            .query(query)
            .send()
            .map_err(|e| OddsError::Http(e.without_url()))?;

        let status = resp.status();
        let quota = Quota::from_headers(resp.headers());
        if quota.remaining.is_some() || quota.used.is_some() {
            info!(
                endpoint,
                remaining = ?quota.remaining,
                used = ?quota.used,
                "odds api quota"
            );
        }

        let body = resp.text().map_err(|e| OddsError::Http(e.without_url()))?;
        if !status.is_success() {
            return Err(OddsError::Status {
                status,
                body: snippet(&body),
            });
        }
        let parsed = serde_json::from_str(&body).map_err(OddsError::Schema)?;
        Ok((parsed, quota))
    }
}

fn snippet(body: &str) -> String {
    body.trim()
        .replace(['\n', '\r'], " ")
        .chars()
        .take(ERROR_BODY_SNIPPET)
        .collect()
}
