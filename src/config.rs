use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::view::{Filter, SortMode};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// env_logger filter, e.g. "warn" or "tm=debug"
    pub log_level: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub seed_demo: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewConfig {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub show_details: Option<bool>,
}

impl Config {
    /// Load config from `path`.
    /// Returns default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
        };
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        self.filter()
            .with_context(|| format!("failed to parse {}: view.filter", path.display()))?;
        self.sort()
            .with_context(|| format!("failed to parse {}: view.sort", path.display()))?;
        Ok(())
    }

    pub fn seed_demo(&self) -> bool {
        self.store.seed_demo.unwrap_or(true)
    }

    pub fn show_details(&self) -> bool {
        self.view.show_details.unwrap_or(true)
    }

    pub fn filter(&self) -> Result<Filter> {
        self.view
            .filter
            .as_deref()
            .map_or(Ok(Filter::default()), str::parse)
    }

    pub fn sort(&self) -> Result<SortMode> {
        self.view
            .sort
            .as_deref()
            .map_or(Ok(SortMode::default()), str::parse)
    }
}
