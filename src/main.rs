use anyhow::Result;
use clap::Parser;

use scenegpt::cli::{self, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(&cli);

    // Viewer mode: Bevy must own the main thread (no tokio runtime here)
    #[cfg(feature = "viewer")]
    if let Commands::Viewer(ref args) = cli.command {
        return cli::viewer::run(args.clone(), &cli);
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Chat(ref args) => cli::chat::run(args.clone(), &cli).await,
        Commands::Ask(ref args) => cli::ask::run(args.clone(), &cli).await,
        Commands::Apply(ref args) => cli::apply::run(args.clone(), &cli).await,
        Commands::Key(ref args) => cli::key::run(args.clone(), &cli),
        Commands::Config(ref args) => cli::config::run(args.clone(), &cli),
        Commands::Paths => cli::paths::run(),
        #[cfg(feature = "viewer")]
        Commands::Viewer(_) => unreachable!("viewer is handled before tokio runtime starts"),
    }
}
