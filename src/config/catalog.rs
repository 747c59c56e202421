// Panel catalog
//
// Pages of buttons, each mapped to a command id. The network layer never
// sees this: it only receives the resolved id string.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::constants::GRID_COLUMNS;

const DEFAULT_CATALOG_TOML: &str = include_str!("default_catalog.toml");

static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(|| {
    // Embedded at compile time and covered by tests
    Catalog::from_toml_str(DEFAULT_CATALOG_TOML).unwrap_or_default()
});

/// One button on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandButton {
    /// Command id sent to the server
    pub id: String,
    /// Text shown on the button
    pub label: String,
}

/// A titled page of buttons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub commands: Vec<CommandButton>,
}

impl Page {
    /// Buttons grouped into rows of `columns`; the last row may be short
    pub fn rows(&self, columns: usize) -> impl Iterator<Item = &[CommandButton]> {
        self.commands.chunks(columns.max(1))
    }

    /// Buttons grouped into the panel's standard grid
    pub fn grid(&self) -> impl Iterator<Item = &[CommandButton]> {
        self.rows(GRID_COLUMNS)
    }

    /// Find a button by 1-based position or by command id (case-insensitive)
    pub fn button(&self, key: &str) -> Option<&CommandButton> {
        let key = key.trim();
        if let Ok(index) = key.parse::<usize>() {
            return index.checked_sub(1).and_then(|i| self.commands.get(i));
        }
        self.commands
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(key))
    }
}

/// Ordered set of pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Catalog {
    /// Catalog compiled into the binary
    pub fn builtin() -> Catalog {
        DEFAULT_CATALOG.clone()
    }

    pub fn from_toml_str(contents: &str) -> Result<Catalog> {
        let catalog: Catalog = toml::from_str(contents).context("Failed to parse catalog")?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Catalog> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Catalog::from_toml_str(&contents)
            .with_context(|| format!("Invalid catalog: {}", path.display()))
    }

    /// Load `path` if given, else ~/.hotkeyndq/catalog.toml if present,
    /// else the built-in catalog
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Catalog> {
        if let Some(path) = path {
            return Catalog::load(path);
        }

        let user_catalog = super::loader::config_dir()?.join("catalog.toml");
        if user_catalog.exists() {
            tracing::debug!(path = %user_catalog.display(), "Using user catalog");
            return Catalog::load(&user_catalog);
        }

        Ok(Catalog::builtin())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            bail!("Catalog has no pages");
        }

        let mut seen = HashSet::new();
        for page in &self.pages {
            if page.id.trim().is_empty() {
                bail!("Page '{}' has an empty id", page.title);
            }
            if !seen.insert(page.id.to_ascii_lowercase()) {
                bail!("Duplicate page id '{}'", page.id);
            }
            if let Some(pos) = page.commands.iter().position(|c| c.id.trim().is_empty()) {
                bail!("Page '{}': button {} has an empty command id", page.id, pos + 1);
            }
        }
        Ok(())
    }

    /// Find a page by id (case-insensitive) or 1-based position
    pub fn page(&self, key: &str) -> Option<&Page> {
        let key = key.trim();
        if let Ok(index) = key.parse::<usize>() {
            return index.checked_sub(1).and_then(|i| self.pages.get(i));
        }
        self.pages.iter().find(|p| p.id.eq_ignore_ascii_case(key))
    }
}
