//! CLI subcommand for SceneGPT Viewer: the chat session plus a Bevy window.

use anyhow::Result;
use clap::Args;

use super::{Cli, build_session, resolve_api_key};
use crate::config::Config;
use crate::prefs::Preferences;
use crate::slash::Interface;
use crate::viewer;

#[derive(Args, Clone)]
pub struct ViewerArgs {
    /// Initial request to send (optional)
    pub prompt: Option<String>,
}

/// Launch the viewer: Bevy window on main thread, session on background tokio runtime.
pub fn run(args: ViewerArgs, cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let prefs = Preferences::load(config.paths.preferences_file())?;
    let api_key = resolve_api_key(cli.api_key.as_deref(), &prefs, &config);

    let (events, channels) = viewer::create_viewer_channels();

    // Bevy must own the main thread for windowing/GPU on macOS.
    // Dropping `events` when the session ends closes the window.
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to build tokio runtime for viewer session: {}", e);
                return;
            }
        };

        rt.block_on(async move {
            if let Err(e) = run_session(config, prefs, api_key, events, args.prompt).await {
                tracing::error!("Viewer session error: {}", e);
            }
        });
    });

    run_bevy_app(channels)
}

/// Set up and run the Bevy application on the main thread.
fn run_bevy_app(channels: viewer::ViewerChannels) -> Result<()> {
    use bevy::prelude::*;

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "SceneGPT Viewer".into(),
                    resolution: bevy::window::WindowResolution::new(1280.0, 720.0),
                    ..default()
                }),
                ..default()
            })
            .disable::<bevy::log::LogPlugin>(),
    );

    viewer::plugin::setup_viewer_app(&mut app, channels);

    app.run();

    Ok(())
}

async fn run_session(
    config: Config,
    mut prefs: Preferences,
    api_key: String,
    events: tokio::sync::mpsc::UnboundedSender<crate::scene::SceneEvent>,
    initial_prompt: Option<String>,
) -> Result<()> {
    let session = build_session(&config, api_key).with_events(events);

    if let Some(prompt) = initial_prompt {
        println!("\n> {}", prompt);
        match session.submit(&prompt).await {
            Ok(result) => println!("\n{}\n", result.message),
            Err(e) => eprintln!("\nError: {}\n", e),
        }
    }

    let history = config.paths.history_file();
    super::chat::repl(&session, &mut prefs, Some(&history), Interface::Viewer).await?;

    prefs.save()?;
    Ok(())
}
