use std::{env, path::PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::shared::time::Duration;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// How walking edges between stops are materialised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferMode {
    /// Stops sharing the configured node column are mutually reachable.
    ByNodeId,
    /// Stops sharing a parent station are mutually reachable.
    ByParentStation,
    /// Unqualified records of transfers.txt define the walking edges.
    ByTransfersTxt,
    /// No walking edges; only waiting at the same stop is possible.
    #[default]
    None,
}

impl TransferMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "by_node_id" => Some(Self::ByNodeId),
            "by_parent_station" => Some(Self::ByParentStation),
            "by_transfers_txt" => Some(Self::ByTransfersTxt),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Runtime options of the engine, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Directory or `.zip` archive holding the dataset.
    pub dataset_path: PathBuf,
    /// Search horizon; values above 24 h are accepted but not guaranteed
    /// correct.
    pub max_search_time: Duration,
    pub transfer_mode: TransferMode,
    /// Name of the stops.txt column carrying the transfer node key;
    /// required in [`TransferMode::ByNodeId`].
    pub transfer_node_id: Option<String>,
    /// Lower bound applied to every walking transfer.
    pub min_transfer_time: Duration,
    /// Enables per-query profiling of the search.
    pub profile: bool,
}

impl Config {
    /// A configuration with the default horizon and transfer settings for
    /// the given dataset.
    pub fn new<P: Into<PathBuf>>(dataset_path: P) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            max_search_time: Duration::from_hours(24),
            ..Default::default()
        }
    }

    /// Reads the configuration from the environment:
    /// `DATASET_PATH` (required), `MAX_SEARCH_TIME_HOURS`, `TRANSFER_MODE`,
    /// `TRANSFER_NODE_ID`, `MIN_TRANSFER_TIME_SECONDS` and `PROFILE`.
    pub fn from_env() -> Result<Self, Error> {
        let dataset_path: PathBuf = env::var("DATASET_PATH")
            .map_err(|_| Error::Missing("DATASET_PATH"))?
            .into();

        let hours: u32 = match env::var("MAX_SEARCH_TIME_HOURS") {
            Ok(value) => value.parse().map_err(|_| Error::Invalid {
                key: "MAX_SEARCH_TIME_HOURS",
                value,
            })?,
            Err(_) => 24,
        };
        if hours > 24 {
            warn!(
                "MAX_SEARCH_TIME_HOURS={hours}: correctness is not guaranteed for search \
                 horizons above 24 h"
            );
        }

        let transfer_mode = match env::var("TRANSFER_MODE") {
            Ok(value) => TransferMode::parse(&value).ok_or(Error::Invalid {
                key: "TRANSFER_MODE",
                value,
            })?,
            Err(_) => TransferMode::default(),
        };

        let transfer_node_id = env::var("TRANSFER_NODE_ID").ok().filter(|v| !v.is_empty());
        if transfer_mode == TransferMode::ByNodeId && transfer_node_id.is_none() {
            return Err(Error::Missing("TRANSFER_NODE_ID"));
        }

        let min_transfer_time: u32 = match env::var("MIN_TRANSFER_TIME_SECONDS") {
            Ok(value) => value.parse().map_err(|_| Error::Invalid {
                key: "MIN_TRANSFER_TIME_SECONDS",
                value,
            })?,
            Err(_) => 0,
        };

        let profile = match env::var("PROFILE") {
            Ok(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(Error::Invalid {
                        key: "PROFILE",
                        value,
                    });
                }
            },
            Err(_) => false,
        };

        Ok(Self {
            dataset_path,
            max_search_time: Duration::from_hours(hours),
            transfer_mode,
            transfer_node_id,
            min_transfer_time: Duration::from_seconds(min_transfer_time),
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_mode_parsing() {
        assert_eq!(TransferMode::parse("by_node_id"), Some(TransferMode::ByNodeId));
        assert_eq!(
            TransferMode::parse("by_parent_station"),
            Some(TransferMode::ByParentStation)
        );
        assert_eq!(
            TransferMode::parse("by_transfers_txt"),
            Some(TransferMode::ByTransfersTxt)
        );
        assert_eq!(TransferMode::parse("none"), Some(TransferMode::None));
        assert_eq!(TransferMode::parse("By_Node_Id"), None);
    }

    #[test]
    fn new_defaults_to_a_day_of_horizon() {
        let config = Config::new("data/gtfs");
        assert_eq!(config.max_search_time, Duration::from_hours(24));
        assert_eq!(config.transfer_mode, TransferMode::None);
        assert_eq!(config.min_transfer_time, Duration::from_seconds(0));
        assert!(!config.profile);
    }
}
