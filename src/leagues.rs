use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use crate::error::{OddsError, Result};

pub const LEAGUE_DICT_FILE: &str = "league_dict.json";

const DEFAULT_LEAGUES: &[(&str, &str)] = &[
    ("ENG-Premier League", "soccer_epl"),
    ("ESP-La Liga", "soccer_spain_la_liga"),
    ("GER-Bundesliga", "soccer_germany_bundesliga"),
    ("ITA-Serie A", "soccer_italy_serie_a"),
    ("FRA-Ligue 1", "soccer_france_ligue_one"),
];

/// One league entry of `league_dict.json`. Other data sources keep their own
/// ids in the same object; only the OddsApi key matters here.
#[derive(Debug, Deserialize)]
struct LeagueEntry {
    #[serde(rename = "OddsApi")]
    odds_api: Option<String>,
}

/// League name → OddsApi sport key.
#[derive(Debug, Clone)]
pub struct LeagueDict {
    sport_keys: BTreeMap<String, String>,
}

impl Default for LeagueDict {
    fn default() -> Self {
        Self {
            sport_keys: DEFAULT_LEAGUES
                .iter()
                .map(|(league, key)| (league.to_string(), key.to_string()))
                .collect(),
        }
    }
}

impl LeagueDict {
    /// Built-in leagues plus any overrides from `league_dict.json` in
    /// `config_dir`.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let mut dict = Self::default();
        let path = config_dir.join(LEAGUE_DICT_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => dict.merge_json(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(OddsError::io(path, err)),
        }
        Ok(dict)
    }

    pub fn merge_json(&mut self, raw: &str) -> Result<()> {
        let entries: HashMap<String, LeagueEntry> = serde_json::from_str(raw)
            .map_err(|e| OddsError::Config(format!("invalid league dict: {e}")))?;
        for (league, entry) in entries {
            if let Some(key) = entry.odds_api.filter(|k| !k.trim().is_empty()) {
                self.sport_keys.insert(league, key);
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, league: impl Into<String>, sport_key: impl Into<String>) {
        self.sport_keys.insert(league.into(), sport_key.into());
    }

    pub fn sport_key(&self, league: &str) -> Result<&str> {
        self.sport_keys
            .get(league)
            .map(String::as_str)
            .ok_or_else(|| OddsError::UnknownLeague(league.to_string()))
    }

    pub fn leagues(&self) -> impl Iterator<Item = &str> {
        self.sport_keys.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::LeagueDict;
    use crate::error::OddsError;

    #[test]
    fn defaults_cover_big_five() {
        let dict = LeagueDict::default();
        assert_eq!(dict.sport_key("ENG-Premier League").unwrap(), "soccer_epl");
        assert_eq!(dict.leagues().count(), 5);
    }

    #[test]
    fn unknown_league_is_error() {
        let err = LeagueDict::default().sport_key("NED-Eredivisie").unwrap_err();
        assert!(matches!(err, OddsError::UnknownLeague(name) if name == "NED-Eredivisie"));

        let mut dict = LeagueDict::default();
        dict.insert("NED-Eredivisie", "soccer_netherlands_eredivisie");
        assert!(dict.sport_key("NED-Eredivisie").is_ok());
    }

    #[test]
    fn overrides_add_and_skip_entries_without_key() {
        let mut dict = LeagueDict::default();
        dict.merge_json(
            r#"{
                "NED-Eredivisie": {"ClubElo": "NED_1", "OddsApi": "soccer_netherlands_eredivisie"},
                "SCO-Premiership": {"ClubElo": "SCO_1"}
            }"#,
        )
        .expect("valid dict");
        assert_eq!(
            dict.sport_key("NED-Eredivisie").unwrap(),
            "soccer_netherlands_eredivisie"
        );
        assert!(dict.sport_key("SCO-Premiership").is_err());
    }
}
