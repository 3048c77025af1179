use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::odds::EventId;

#[derive(Debug, Error)]
pub enum OddsError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown league {0:?} (no OddsApi sport key configured)")]
    UnknownLeague(String),

    #[error("odds request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("odds http {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("odds response did not match schema: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("event {event_id} has no bookmaker odds")]
    NoBookmaker { event_id: EventId },

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cache record in {} line {line}: {source}", .path.display())]
    CacheRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize cache rows: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl OddsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OddsError>;
