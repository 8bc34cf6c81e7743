pub mod apply;
pub mod ask;
pub mod chat;
pub mod config;
pub mod key;
pub mod paths;
#[cfg(feature = "viewer")]
pub mod viewer;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::chat::ChatSession;
use crate::config::Config;
use crate::executor::CommandExecutor;
use crate::gateway::OpenAIGateway;
use crate::prefs::Preferences;
use crate::scene::EditorScene;

#[derive(Parser)]
#[command(name = "scenegpt")]
#[command(author, version, about = "Describe a scene object in words, get it built")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "SCENEGPT_CONFIG")]
    pub config: Option<String>,

    /// API key for the completion service (overrides the stored key)
    #[arg(long, global = true, env = "SCENEGPT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive scene-editing session
    Chat(chat::ChatArgs),

    /// Turn one request into one scene edit
    Ask(ask::AskArgs),

    /// Execute command JSON from a file or stdin, without calling the model
    Apply(apply::ApplyArgs),

    /// Manage the stored API key
    Key(key::KeyArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Show resolved XDG directory paths
    Paths,

    /// Open a window that mirrors the scene (Bevy renderer)
    #[cfg(feature = "viewer")]
    Viewer(viewer::ViewerArgs),
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let path = self
            .config
            .as_deref()
            .map(|p| shellexpand::tilde(p).into_owned());
        Config::load_from(path.as_deref().map(Path::new))
    }
}

/// Pick the API key: explicit flag/env, then the stored preference, then config.
pub fn resolve_api_key(flag: Option<&str>, prefs: &Preferences, config: &Config) -> String {
    flag.map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| prefs.api_key())
        .map(str::to_string)
        .unwrap_or_else(|| config.provider.resolved_api_key())
}

/// Wire the gateway, executor and a fresh editor scene into a session.
pub fn build_session(config: &Config, api_key: String) -> ChatSession {
    ChatSession::new(
        Box::new(OpenAIGateway::new(&config.provider)),
        CommandExecutor::new(config.scene.executor_options()),
        EditorScene::new(config.scene.max_objects),
        api_key,
    )
}

/// `RUST_LOG` wins, then `--verbose`, then `logging.level` from an existing config.
pub fn init_logging(cli: &Cli) {
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        configured_level(cli).unwrap_or_else(|| "info".to_string())
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}

// Reads the file without creating it, so `config init` still works on a fresh machine.
fn configured_level(cli: &Cli) -> Option<String> {
    let path = match &cli.config {
        Some(path) => PathBuf::from(shellexpand::tilde(path).into_owned()),
        None => Config::config_path().ok()?,
    };
    if !path.exists() {
        return None;
    }
    Config::from_file(&path).ok().map(|c| c.logging.level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs_with(key: Option<&str>) -> (tempfile::TempDir, Preferences) {
        let tmp = tempfile::tempdir().unwrap();
        let mut prefs = Preferences::load(tmp.path().join("preferences.toml")).unwrap();
        if let Some(key) = key {
            prefs.set_api_key(key);
        }
        (tmp, prefs)
    }

    #[test]
    fn flag_beats_stored_key() {
        let (_tmp, prefs) = prefs_with(Some("sk-stored"));
        let config = Config::default();
        assert_eq!(resolve_api_key(Some("sk-flag"), &prefs, &config), "sk-flag");
    }

    #[test]
    fn stored_key_beats_config() {
        let (_tmp, prefs) = prefs_with(Some("sk-stored"));
        let mut config = Config::default();
        config.provider.api_key = "sk-config".into();
        assert_eq!(resolve_api_key(Some("  "), &prefs, &config), "sk-stored");
    }

    #[test]
    fn config_key_is_last_resort() {
        let (_tmp, prefs) = prefs_with(None);
        let mut config = Config::default();
        assert_eq!(resolve_api_key(None, &prefs, &config), "");
        config.provider.api_key = "sk-config".into();
        assert_eq!(resolve_api_key(None, &prefs, &config), "sk-config");
    }

    #[test]
    fn unresolved_config_reference_is_no_key() {
        let (tmp, prefs) = prefs_with(None);
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[provider]\napi_key = \"${SCENEGPT_TEST_SURELY_UNSET_VAR}\"\n",
        )
        .unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(resolve_api_key(None, &prefs, &config), "");
    }

    #[tokio::test]
    async fn unresolved_reference_fails_auth_before_sending() {
        let (_tmp, prefs) = prefs_with(None);
        let mut config = Config::default();
        config.provider.api_key = "${SCENEGPT_TEST_SURELY_UNSET_VAR}".into();
        // nothing listens here; reaching the network would be a Network error
        config.provider.base_url = "http://127.0.0.1:9".into();

        let session = build_session(&config, resolve_api_key(None, &prefs, &config));
        let err = session.submit("a cube").await.unwrap_err();
        assert!(matches!(
            err,
            crate::chat::PipelineError::Gateway(crate::gateway::GatewayError::Auth)
        ));
    }

    #[test]
    fn log_level_comes_from_existing_config_only() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let path_arg = path.to_string_lossy().into_owned();

        let cli =
            Cli::try_parse_from(["scenegpt", "--config", path_arg.as_str(), "paths"]).unwrap();
        assert_eq!(configured_level(&cli), None);
        assert!(!path.exists());

        std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(configured_level(&cli).as_deref(), Some("warn"));
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "scenegpt",
            "ask",
            "a red cube",
            "--api-key",
            "sk-x",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.api_key.as_deref(), Some("sk-x"));
        assert!(matches!(cli.command, Commands::Ask(ref a) if a.request == "a red cube"));
    }
}
