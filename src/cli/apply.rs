//! CLI subcommand: `scenegpt apply [FILE]`
//!
//! Runs command JSON through the parser and executor directly. Useful for
//! replaying a reply captured from `ask --format json` or for scripting.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

use super::{Cli, build_session};

#[derive(Args, Clone)]
pub struct ApplyArgs {
    /// File holding the command JSON (reads stdin when omitted or "-")
    pub file: Option<PathBuf>,

    /// Print the resulting scene as JSON
    #[arg(long)]
    pub scene: bool,
}

pub async fn run(args: ApplyArgs, cli: &Cli) -> Result<()> {
    let raw = match args.file.as_deref() {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read command from stdin")?;
            buf
        }
    };

    let config = cli.load_config()?;
    // no model call, so no key
    let session = build_session(&config, String::new());

    let result = session.submit_json(&raw).await?;
    println!("{}", result.message);

    if args.scene {
        println!("{}", serde_json::to_string_pretty(&session.snapshot().await)?);
    }

    if !result.success {
        anyhow::bail!("Command was not applied");
    }
    Ok(())
}
