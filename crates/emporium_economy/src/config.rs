//! # Shop Configuration
//!
//! The server-side config file: three ordered string lists.
//!
//! ```toml
//! currencies = ["minecraft:emerald", "minecraft:gold_ingot"]
//! categories = ["produce", "tools"]
//! offers = [
//!     "minecraft:apple|produce|minecraft:emerald=2",
//!     "minecraft:iron_pickaxe|tools|minecraft:emerald=5,minecraft:gold_ingot=1",
//! ]
//! ```
//!
//! A missing key falls back to the shipped default. Individual bad entries are
//! not rejected here; [`crate::catalog::Catalog::parse`] filters them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ShopError, ShopResult};

/// Raw shop configuration, before any registry lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Items usable as currency, `namespace:item`.
    pub currencies: Vec<String>,
    /// Categories in display order.
    pub categories: Vec<String>,
    /// Offers, `item|category|currency=price[,currency=price]`.
    pub offers: Vec<String>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            currencies: vec![
                "minecraft:emerald".to_string(),
                "minecraft:gold_ingot".to_string(),
            ],
            categories: vec!["cat1".to_string(), "cat2".to_string(), "cat3".to_string()],
            offers: vec![
                "minecraft:apple|cat1|minecraft:emerald=1".to_string(),
                "minecraft:bread|cat1|minecraft:gold_ingot=2".to_string(),
            ],
        }
    }
}

impl ShopConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidConfig` if the text is not valid TOML or a
    /// key has the wrong type.
    pub fn from_toml_str(text: &str) -> ShopResult<Self> {
        toml::from_str(text).map_err(|e| ShopError::InvalidConfig(e.to_string()))
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::ConfigIo` if the file cannot be read, or
    /// `ShopError::InvalidConfig` if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> ShopResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ShopError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            currencies = config.currencies.len(),
            categories = config.categories.len(),
            offers = config.offers.len(),
            "loaded shop config"
        );
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidConfig` if serialization fails.
    pub fn to_toml_string(&self) -> ShopResult<String> {
        toml::to_string(self).map_err(|e| ShopError::InvalidConfig(e.to_string()))
    }
}
