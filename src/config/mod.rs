use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::executor::ExecutorOptions;
use crate::paths::Paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resolved XDG-compliant paths (not serialized)
    #[serde(skip)]
    pub paths: Paths,

    /// File this config was read from, when not the default location
    #[serde(skip)]
    pub source: Option<PathBuf>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub scene: SceneConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Fallback API key; the stored preference and `SCENEGPT_API_KEY` win over it.
    /// Accepts `${ENV_VAR}` references, kept unexpanded so `save` never writes
    /// the secret itself. Use [`ProviderConfig::resolved_api_key`] to read it.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens for the completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on one request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Instantiation is refused beyond this many objects
    #[serde(default = "default_max_objects")]
    pub max_objects: usize,

    #[serde(default = "default_true")]
    pub select_on_create: bool,

    #[serde(default = "default_true")]
    pub frame_on_create: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f32 {
    0.2
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_objects() -> usize {
    10_000
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_objects: default_max_objects(),
            select_on_create: default_true(),
            frame_on_create: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ProviderConfig {
    /// The configured key with any `${ENV_VAR}` reference expanded.
    /// An unset variable yields an empty key.
    pub fn resolved_api_key(&self) -> String {
        expand_env(self.api_key.trim()).trim().to_string()
    }
}

impl SceneConfig {
    pub fn executor_options(&self) -> ExecutorOptions {
        ExecutorOptions {
            select_on_create: self.select_on_create,
            frame_on_create: self.frame_on_create,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path` if given, otherwise from the default location
    /// (creating it from the template on first run).
    pub fn load_from(path: Option<&std::path::Path>) -> Result<Self> {
        let paths = Paths::resolve()?;
        paths.ensure_dirs()?;

        if let Some(path) = path {
            let mut config = Self::from_file(path)?;
            config.paths = paths;
            config.source = Some(path.to_path_buf());
            return Ok(config);
        }

        let path = paths.config_file();
        if !path.exists() {
            // Create default config file on first run
            let config = Config {
                paths,
                ..Config::default()
            };
            config.save_with_template()?;
            return Ok(config);
        }

        let mut config = Self::from_file(&path)?;
        config.paths = paths;
        Ok(config)
    }

    /// Parse a config file without touching the filesystem elsewhere.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Path `save` writes to.
    pub fn file_path(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| self.paths.config_file())
    }

    pub fn save(&self) -> Result<()> {
        let path = self.file_path();

        // Create parent directories
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;

        Ok(())
    }

    /// Save config with a helpful template (for first-time setup)
    pub fn save_with_template(&self) -> Result<()> {
        let path = self.paths.config_file();

        // Create parent directories
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        eprintln!("Created default config at {}", path.display());

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let paths = Paths::resolve()?;
        Ok(paths.config_file())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["provider", "base_url"] => Ok(self.provider.base_url.clone()),
            ["provider", "model"] => Ok(self.provider.model.clone()),
            ["provider", "max_tokens"] => Ok(self.provider.max_tokens.to_string()),
            ["provider", "temperature"] => Ok(self.provider.temperature.to_string()),
            ["provider", "timeout_secs"] => Ok(self.provider.timeout_secs.to_string()),
            ["scene", "max_objects"] => Ok(self.scene.max_objects.to_string()),
            ["scene", "select_on_create"] => Ok(self.scene.select_on_create.to_string()),
            ["scene", "frame_on_create"] => Ok(self.scene.frame_on_create.to_string()),
            ["logging", "level"] => Ok(self.logging.level.clone()),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["provider", "base_url"] => self.provider.base_url = value.to_string(),
            ["provider", "model"] => self.provider.model = value.to_string(),
            ["provider", "max_tokens"] => self.provider.max_tokens = value.parse()?,
            ["provider", "temperature"] => self.provider.temperature = value.parse()?,
            ["provider", "timeout_secs"] => self.provider.timeout_secs = value.parse()?,
            ["scene", "max_objects"] => self.scene.max_objects = value.parse()?,
            ["scene", "select_on_create"] => self.scene.select_on_create = value.parse()?,
            ["scene", "frame_on_create"] => self.scene.frame_on_create = value.parse()?,
            ["logging", "level"] => self.logging.level = value.to_string(),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }

        Ok(())
    }
}

fn expand_env(s: &str) -> String {
    let var_name = s
        .strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .or_else(|| s.strip_prefix('$'));
    if let Some(var_name) = var_name {
        std::env::var(var_name).unwrap_or_default()
    } else {
        s.to_string()
    }
}

/// Default config template with helpful comments (used for first-time setup)
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# SceneGPT Configuration
# Auto-created on first run. Edit as needed.

[provider]
# OpenAI-compatible chat-completion endpoint
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
max_tokens = 500
temperature = 0.2
timeout_secs = 60

# Prefer `scenegpt key set <KEY>`; this is only a fallback.
# api_key = "${OPENAI_API_KEY}"

[scene]
max_objects = 10000
select_on_create = true
frame_on_create = true

[logging]
level = "info"
"#;
