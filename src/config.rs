use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Public odds sheet maintained by the trading desk.
pub const SHEET_ID: &str = "1nqZq5SltAVtZj7suTed2QHxHnvKdS3cpD6JnMdldNik";
pub const SHEET_BASE_URL: &str = "https://docs.google.com";

pub const API_HOST: &str = "0.0.0.0";
pub const API_PORT: u16 = 5002;

/// Upper bound on a single sheet export round trip (seconds). 0 = no timeout.
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Metadata stamped on fixtures that have no catalog entry.
pub mod placeholder {
    pub const MATCH_TIME: &str = "TBD";
    pub const SEASON: &str = "2025";
    pub const SPORT: &str = "Kabaddi";
    pub const TOURNAMENT_NAME: &str = "Pro Kabaddi League";
    pub const VENUE_CITY: &str = "TBD";
    pub const VENUE_STADIUM: &str = "TBD";
}

/// How fetched match codes are reconciled with the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Catalog entries are enriched with fetched odds; codes without an
    /// entry fall back to a placeholder fixture. Nothing fetched is dropped.
    #[default]
    Enrich,
    /// Only codes present in the catalog are emitted.
    CatalogOnly,
    /// Every fetched code becomes a placeholder fixture; the catalog is ignored.
    FeedOnly,
}

impl FromStr for MergePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "enrich" => Ok(MergePolicy::Enrich),
            "catalog-only" | "catalog_only" => Ok(MergePolicy::CatalogOnly),
            "feed-only" | "feed_only" => Ok(MergePolicy::FeedOnly),
            other => Err(AppError::Config(format!(
                "MERGE_POLICY must be enrich, catalog-only or feed-only (got {other:?})"
            ))),
        }
    }
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MergePolicy::Enrich => "enrich",
            MergePolicy::CatalogOnly => "catalog-only",
            MergePolicy::FeedOnly => "feed-only",
        };
        write!(f, "{s}")
    }
}

/// What a request does when the sheet cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Respond with the error envelope and a 500.
    #[default]
    Error,
    /// Log the failure and continue with zero rows.
    Degrade,
}

impl FromStr for FetchFailurePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(FetchFailurePolicy::Error),
            "degrade" => Ok(FetchFailurePolicy::Degrade),
            other => Err(AppError::Config(format!(
                "ON_FETCH_FAILURE must be error or degrade (got {other:?})"
            ))),
        }
    }
}

impl std::fmt::Display for FetchFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailurePolicy::Error => write!(f, "error"),
            FetchFailurePolicy::Degrade => write!(f, "degrade"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sheet_id: String,
    /// Scheme and host the export path is appended to (SHEET_BASE_URL).
    pub sheet_base_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub log_level: String,
    pub fetch_timeout_secs: u64,
    /// JSON catalog replacing the embedded one (CATALOG_PATH).
    pub catalog_path: Option<PathBuf>,
    pub merge_policy: MergePolicy,
    pub on_fetch_failure: FetchFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_id: SHEET_ID.to_string(),
            sheet_base_url: SHEET_BASE_URL.to_string(),
            api_host: API_HOST.to_string(),
            api_port: API_PORT,
            log_level: "info".to_string(),
            fetch_timeout_secs: FETCH_TIMEOUT_SECS,
            catalog_path: None,
            merge_policy: MergePolicy::default(),
            on_fetch_failure: FetchFailurePolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            sheet_id: std::env::var("SHEET_ID").unwrap_or(defaults.sheet_id),
            sheet_base_url: std::env::var("SHEET_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.sheet_base_url),
            api_host: std::env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: match std::env::var("API_PORT") {
                Ok(v) => v.parse::<u16>().map_err(|_| {
                    AppError::Config("API_PORT must be a valid port number".to_string())
                })?,
                Err(_) => defaults.api_port,
            },
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            fetch_timeout_secs: match std::env::var("FETCH_TIMEOUT_SECS") {
                Ok(v) => v.parse::<u64>().map_err(|_| {
                    AppError::Config("FETCH_TIMEOUT_SECS must be a whole number of seconds".to_string())
                })?,
                Err(_) => defaults.fetch_timeout_secs,
            },
            catalog_path: std::env::var("CATALOG_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            merge_policy: match std::env::var("MERGE_POLICY") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.merge_policy,
            },
            on_fetch_failure: match std::env::var("ON_FETCH_FAILURE") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.on_fetch_failure,
            },
        })
    }

    /// CSV export endpoint for the configured sheet.
    pub fn sheet_export_url(&self) -> String {
        format!(
            "{}/spreadsheets/d/{}/gviz/tq?tqx=out:csv",
            self.sheet_base_url, self.sheet_id
        )
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}
