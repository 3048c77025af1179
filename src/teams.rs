use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{OddsError, Result};

pub const TEAMNAME_REPLACEMENTS_FILE: &str = "teamname_replacements.json";

/// Alias → canonical team name lookup.
#[derive(Debug, Clone, Default)]
pub struct TeamNameReplacements {
    aliases: HashMap<String, String>,
}

impl TeamNameReplacements {
    pub fn from_pairs<I, A, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        Self {
            aliases: pairs
                .into_iter()
                .map(|(alias, canonical)| (alias.into(), canonical.into()))
                .collect(),
        }
    }

    /// Parses `{"Canonical": ["Alias 1", "Alias 2"]}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let by_canonical: HashMap<String, Vec<String>> = serde_json::from_str(raw)
            .map_err(|e| OddsError::Config(format!("invalid team name replacements: {e}")))?;
        let mut aliases = HashMap::new();
        for (canonical, names) in by_canonical {
            for alias in names {
                aliases.insert(alias, canonical.clone());
            }
        }
        Ok(Self { aliases })
    }

    /// Loads `teamname_replacements.json` from `config_dir`; a missing file
    /// yields an empty table.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(TEAMNAME_REPLACEMENTS_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => Self::from_json(&raw),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(OddsError::io(path, err)),
        }
    }

    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
