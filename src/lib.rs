pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod leagues;
pub mod odds;
pub mod store;
pub mod teams;

pub use client::{OddsApi, OddsFetch, Quota, Sport};
pub use config::OddsApiConfig;
pub use error::{OddsError, Result};
pub use odds::{EventId, EventRow};
