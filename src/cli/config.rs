use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::Cli;
use crate::config::{Config, DEFAULT_CONFIG_TEMPLATE};
use crate::prefs::mask_secret;

#[derive(Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Output format: toml (default) or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },

    /// Get a configuration value
    Get {
        /// Config key (e.g., provider.model)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Config key (e.g., provider.model)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,

    /// Initialize default config file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, cli: &Cli) -> Result<()> {
    match args.command {
        ConfigCommands::Show { format } => show_config(cli, &format),
        ConfigCommands::Get { key } => get_config(cli, &key),
        ConfigCommands::Set { key, value } => set_config(cli, &key, &value),
        ConfigCommands::Path => show_path(cli),
        ConfigCommands::Init { force } => init_config(cli, force),
    }
}

fn show_config(cli: &Cli, format: &str) -> Result<()> {
    let mut config = cli.load_config()?;
    // `${VAR}` references are not secrets; literal keys are
    if !config.provider.api_key.is_empty() && !config.provider.api_key.starts_with('$') {
        config.provider.api_key = mask_secret(&config.provider.api_key);
    }

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        _ => {
            let toml = toml::to_string_pretty(&config)?;
            println!("{}", toml);
        }
    }

    Ok(())
}

fn get_config(cli: &Cli, key: &str) -> Result<()> {
    let config = cli.load_config()?;
    let value = config.get_value(key)?;
    println!("{}", value);
    Ok(())
}

fn set_config(cli: &Cli, key: &str, value: &str) -> Result<()> {
    let mut config = cli.load_config()?;
    config.set_value(key, value)?;
    config.save()?;
    println!("Set {} = {}", key, value);
    Ok(())
}

/// `--config` if given, otherwise the default location.
fn target_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).into_owned())),
        None => Config::config_path(),
    }
}

fn show_path(cli: &Cli) -> Result<()> {
    println!("{}", target_path(cli)?.display());
    Ok(())
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = target_path(cli)?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    // Create parent directories
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Write template config with comments
    std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;

    println!("Created config file at {}", path.display());
    Ok(())
}
