//! Local key-value preferences: favorites, history and hidden columns.
//!
//! Values are flat strings; lists are stored comma-delimited. The whole map
//! is written back to a JSON file on every change.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::warn;

/// Entries kept in each history list.
pub const HISTORY_DEPTH: usize = 5;

const DELIMITER: &str = ",";

/// Preference store backed by a JSON file.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// Load preferences from `path`; a missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(err) => {
                warn!("ignoring preferences at {}: {err:#}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            values,
        }
    }

    /// Preferences that are never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Raw value of `key`, or `default` when unset.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Store `value` under `key` and persist.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.values.insert(key.to_string(), value.into());
        self.persist()
    }

    /// Delimited list stored under `key`.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .split(DELIMITER)
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_list<S: AsRef<str>>(&mut self, key: &str, items: &[S]) -> Result<()> {
        let joined = items
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(DELIMITER);
        self.set(key, joined)
    }

    fn ids(&self, key: &str) -> Vec<u32> {
        self.list(key)
            .iter()
            .filter_map(|item| item.parse().ok())
            .collect()
    }

    /// Favorite ids of a record kind.
    pub fn favorites(&self, scope: &str) -> Vec<u32> {
        self.ids(&favorites_key(scope))
    }

    /// Whether `id` is a favorite.
    pub fn is_favorite(&self, scope: &str, id: u32) -> bool {
        self.favorites(scope).contains(&id)
    }

    /// Add or remove `id` from the favorites. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, scope: &str, id: u32) -> Result<bool> {
        let mut favorites = self.favorites(scope);
        let added = match favorites.iter().position(|favorite| *favorite == id) {
            Some(index) => {
                favorites.remove(index);
                false
            }
            None => {
                favorites.push(id);
                true
            }
        };
        let items: Vec<String> = favorites.iter().map(u32::to_string).collect();
        self.set_list(&favorites_key(scope), &items)?;
        Ok(added)
    }

    /// Recently visited ids, most recent first.
    pub fn history(&self, scope: &str) -> Vec<u32> {
        self.ids(&history_key(scope))
    }

    /// Record a visit; revisits move to the front and the oldest entry is evicted.
    pub fn visit(&mut self, scope: &str, id: u32) -> Result<()> {
        let mut history = self.history(scope);
        history.retain(|entry| *entry != id);
        history.insert(0, id);
        history.truncate(HISTORY_DEPTH);
        let items: Vec<String> = history.iter().map(u32::to_string).collect();
        self.set_list(&history_key(scope), &items)
    }

    /// Titles of the hidden columns of `table`, if any were saved.
    pub fn hidden_columns(&self, table: &str) -> Option<Vec<String>> {
        self.get(&hidden_key(table))?;
        Some(self.list(&hidden_key(table)))
    }

    /// Save the hidden columns of `table`.
    pub fn set_hidden_columns<S: AsRef<str>>(&mut self, table: &str, titles: &[S]) -> Result<()> {
        self.set_list(&hidden_key(table), titles)
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialised = serde_json::to_vec_pretty(&self.values)?;
        fs::write(path, serialised).with_context(|| format!("failed to write {}", path.display()))
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn favorites_key(scope: &str) -> String {
    format!("favorites.{scope}")
}

fn history_key(scope: &str) -> String {
    format!("history.{scope}")
}

fn hidden_key(table: &str) -> String {
    format!("hidden_columns.{table}")
}
