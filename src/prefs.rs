//! Small persisted key/value preferences.
//!
//! Only the API key lives here today. The file is read when a session
//! starts and written back when it ends.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Preference key under which the completion API key is stored.
pub const API_KEY_PREF: &str = "scenegpt.api_key";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefsFile {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct Preferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// Load preferences from `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences {}", path.display()))?;
            toml::from_str::<PrefsFile>(&content)
                .with_context(|| format!("Invalid preferences file {}", path.display()))?
                .values
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Stored API key, if any and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.get(API_KEY_PREF)
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, key: &str) {
        self.set(API_KEY_PREF, key.trim());
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&PrefsFile {
            values: self.values.clone(),
        })?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences {}", self.path.display()))?;

        // the file holds a credential
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

/// Mask a secret for display: keep a short prefix and suffix.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(tmp.path().join("preferences.toml")).unwrap();
        assert!(prefs.api_key().is_none());
    }

    #[test]
    fn api_key_survives_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("preferences.toml");

        let mut prefs = Preferences::load(&path).unwrap();
        prefs.set_api_key("  sk-abc123  ");
        prefs.save().unwrap();

        let reloaded = Preferences::load(&path).unwrap();
        assert_eq!(reloaded.api_key(), Some("sk-abc123"));
        assert_eq!(reloaded.get(API_KEY_PREF), Some("sk-abc123"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut prefs = Preferences::load(tmp.path().join("p.toml")).unwrap();
        prefs.set_api_key("   ");
        assert!(prefs.api_key().is_none());
    }

    #[test]
    fn remove_clears_key() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("p.toml");
        let mut prefs = Preferences::load(&path).unwrap();
        prefs.set_api_key("sk-1");
        assert_eq!(prefs.remove(API_KEY_PREF).as_deref(), Some("sk-1"));
        prefs.save().unwrap();
        assert!(Preferences::load(&path).unwrap().api_key().is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("p.toml");
        fs::write(&path, "values = 3").unwrap();
        assert!(Preferences::load(&path).is_err());
    }

    #[test]
    fn secrets_are_masked() {
        assert_eq!(mask_secret("sk-1234567890abcd"), "sk-...abcd");
        assert_eq!(mask_secret("short"), "*****");
        assert_eq!(mask_secret(""), "");
    }
}
