use anyhow::Result;
use clap::Args;

use super::{Cli, build_session, resolve_api_key};
use crate::prefs::Preferences;

#[derive(Args, Clone)]
pub struct AskArgs {
    /// What to create, in plain words
    pub request: String,

    /// Model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn run(args: AskArgs, cli: &Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    if let Some(model) = args.model {
        config.provider.model = model;
    }

    let prefs = Preferences::load(config.paths.preferences_file())?;
    let api_key = resolve_api_key(cli.api_key.as_deref(), &prefs, &config);
    let session = build_session(&config, api_key);

    let result = session.submit(&args.request).await?;

    match args.format.as_str() {
        "json" => {
            let output = serde_json::json!({
                "request": args.request,
                "model": config.provider.model,
                "result": result,
                "scene": session.snapshot().await,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!("{}", result.message);
        }
    }

    if !result.success {
        anyhow::bail!("Request was not applied");
    }
    Ok(())
}
