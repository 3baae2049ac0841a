//! Read-only catalog of known fixtures (venue, rosters, player odds), keyed by
//! match code. Loaded once at startup and shared across requests.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::Fixture;

const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Clone, Default)]
pub struct FixtureCatalog {
    fixtures: HashMap<i64, Fixture>,
}

impl FixtureCatalog {
    /// Catalog compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Parse a JSON array of fixtures. Duplicate match codes are rejected.
    pub fn from_json(text: &str) -> Result<Self> {
        let list: Vec<Fixture> = serde_json::from_str(text)?;
        Self::from_fixtures(list)
    }

    pub fn from_fixtures(list: Vec<Fixture>) -> Result<Self> {
        let mut fixtures = HashMap::with_capacity(list.len());
        for fixture in list {
            let code = fixture.match_code;
            if fixtures.insert(code, fixture).is_some() {
                return Err(AppError::Catalog(format!("duplicate match_code {code}")));
            }
        }
        Ok(Self { fixtures })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
            .map_err(|e| AppError::Catalog(format!("{}: {e}", path.display())))
    }

    /// File from `CATALOG_PATH` if set, otherwise the embedded catalog.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let catalog = match &cfg.catalog_path {
            Some(path) => Self::load(path)?,
            None => Self::embedded()?,
        };
        info!(
            fixtures = catalog.len(),
            source = %cfg
                .catalog_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "embedded".to_string()),
            "Fixture catalog loaded",
        );
        Ok(catalog)
    }

    pub fn get(&self, match_code: i64) -> Option<&Fixture> {
        self.fixtures.get(&match_code)
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}
