//! CLI subcommand: `scenegpt key`

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Cli;
use crate::prefs::{Preferences, mask_secret};

#[derive(Args, Clone)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommands,
}

#[derive(Subcommand, Clone)]
pub enum KeyCommands {
    /// Store an API key
    Set {
        /// The key to store
        value: String,
    },

    /// Remove the stored key
    Clear,

    /// Show the stored key (masked)
    Show,
}

pub fn run(args: KeyArgs, cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let mut prefs = Preferences::load(config.paths.preferences_file())?;

    match args.command {
        KeyCommands::Set { value } => {
            if value.trim().is_empty() {
                anyhow::bail!("Refusing to store an empty key");
            }
            prefs.set_api_key(&value);
            prefs.save()?;
            println!("Stored key {}", mask_secret(value.trim()));
        }
        KeyCommands::Clear => {
            prefs.remove(crate::prefs::API_KEY_PREF);
            prefs.save()?;
            println!("Cleared stored key");
        }
        KeyCommands::Show => match prefs.api_key() {
            Some(key) => println!("{}", mask_secret(key)),
            None => println!("(no key stored)"),
        },
    }

    Ok(())
}
