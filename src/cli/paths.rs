//! CLI subcommand: `scenegpt paths`
//!
//! Prints all resolved XDG-compliant paths for debugging and scripting.

use anyhow::Result;

use crate::paths::Paths;

pub fn run() -> Result<()> {
    let paths = Paths::resolve()?;

    println!("SceneGPT Paths (XDG Base Directory)");
    println!("===================================");
    println!();
    println!("Config:     {}", paths.config_dir.display());
    println!("  config.toml:      {}", paths.config_file().display());
    println!();
    println!("Data:       {}", paths.data_dir.display());
    println!("  preferences:      {}", paths.preferences_file().display());
    println!();
    println!("State:      {}", paths.state_dir.display());
    println!("  chat history:     {}", paths.history_file().display());

    Ok(())
}
