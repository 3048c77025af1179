use std::env;
use std::path::{Path, PathBuf};

use crate::error::{OddsError, Result};
use crate::odds::DEFAULT_BOOKMAKER;

pub const ODDSAPI_URL: &str = "https://api.the-odds-api.com/v3";
pub const DEFAULT_REGION: &str = "eu";
pub const DEFAULT_MARKET: &str = "h2h";

const ODDSAPI_DATA_SUBDIR: &str = "OddsApi";

#[derive(Debug, Clone)]
pub struct OddsApiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Directory holding one `<league>.json` cache file per league.
    pub data_dir: PathBuf,
    /// Directory with `league_dict.json` / `teamname_replacements.json`.
    /// `None` means built-in tables only.
    pub config_dir: Option<PathBuf>,
    pub region: String,
    pub market: String,
    /// Bookmaker `site_key`s in preference order.
    pub preferred_bookmakers: Vec<String>,
    /// Serve an existing cache file without hitting the network.
    pub force_cache: bool,
    /// Never write cache files.
    pub no_store: bool,
}

impl OddsApiConfig {
    pub fn new(api_key: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ODDSAPI_URL.to_string(),
            data_dir: data_dir.into(),
            config_dir: None,
            region: DEFAULT_REGION.to_string(),
            market: DEFAULT_MARKET.to_string(),
            preferred_bookmakers: vec![DEFAULT_BOOKMAKER.to_string()],
            force_cache: false,
            no_store: false,
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = env::var("ODDSAPI_KEY")
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let root = soccerdata_dir()?;

        let mut cfg = Self::new(api_key, root.join("data").join(ODDSAPI_DATA_SUBDIR));
        cfg.config_dir = Some(root.join("config"));
        if let Some(url) = env_string("ODDSAPI_URL") {
            cfg.base_url = url;
        }
        if let Some(region) = env_string("ODDSAPI_REGION") {
            cfg.region = region.to_ascii_lowercase();
        }
        if let Some(market) = env_string("ODDSAPI_MARKET") {
            cfg.market = market.to_ascii_lowercase();
        }
        if let Ok(raw) = env::var("ODDSAPI_BOOKMAKERS") {
            cfg.preferred_bookmakers = parse_list(&raw);
        }
        cfg.force_cache = env_bool("SOCCERDATA_FORCE_CACHE", false);
        cfg.no_store = env_bool("SOCCERDATA_NOSTORE", false);

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    pub fn with_bookmakers<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_bookmakers = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_force_cache(mut self, force_cache: bool) -> Self {
        self.force_cache = force_cache;
        self
    }

    pub fn with_no_store(mut self, no_store: bool) -> Self {
        self.no_store = no_store;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(OddsError::Config("ODDSAPI_KEY missing".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(OddsError::Config(format!(
                "odds api url must be http(s), got {:?}",
                self.base_url
            )));
        }
        if self.region.trim().is_empty() || self.market.trim().is_empty() {
            return Err(OddsError::Config(
                "odds region and market must be non-empty".to_string(),
            ));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(OddsError::Config("data dir must be set".to_string()));
        }
        Ok(())
    }

    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }
}

/// `$SOCCERDATA_DIR`, falling back to `~/soccerdata`.
pub fn soccerdata_dir() -> Result<PathBuf> {
    if let Some(dir) = env_string("SOCCERDATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    env_string("HOME")
        .map(|home| PathBuf::from(home).join("soccerdata"))
        .ok_or_else(|| OddsError::Config("neither SOCCERDATA_DIR nor HOME is set".to_string()))
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> bool {
    let t = raw.trim().to_ascii_lowercase();
    !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
