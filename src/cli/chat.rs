use anyhow::Result;
use clap::Args;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::Path;

use super::{Cli, build_session, resolve_api_key};
use crate::chat::{ChatSession, EntryRole};
use crate::prefs::{Preferences, mask_secret};
use crate::scene::ObjectSnapshot;
use crate::slash::{self, Interface};

#[derive(Args, Clone)]
pub struct ChatArgs {
    /// Model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,
}

pub async fn run(args: ChatArgs, cli: &Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    if let Some(model) = args.model {
        config.provider.model = model;
    }

    let mut prefs = Preferences::load(config.paths.preferences_file())?;
    let api_key = resolve_api_key(cli.api_key.as_deref(), &prefs, &config);
    let session = build_session(&config, api_key);

    println!(
        "SceneGPT v{} | Model: {} | Max objects: {}\n",
        env!("CARGO_PKG_VERSION"),
        config.provider.model,
        config.scene.max_objects
    );
    if session.api_key().await.is_empty() {
        println!("No API key set. Use /key <value> or `scenegpt key set <value>`.\n");
    }
    println!("Describe an object to create. Type /help for commands, /quit to exit\n");

    let history = config.paths.history_file();
    repl(&session, &mut prefs, Some(&history), Interface::Chat).await?;

    prefs.save()?;
    Ok(())
}

/// Read lines until `/quit` or EOF, feeding each one to the session.
pub async fn repl(
    session: &ChatSession,
    prefs: &mut Preferences,
    history: Option<&Path>,
    iface: Interface,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    if let Some(history) = history {
        // first run has no history yet
        let _ = rl.load_history(history);
    }

    loop {
        let input = match rl.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break, // Ctrl+D
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(input);

        if let Some((name, arg)) = slash::split(input) {
            match handle_slash(session, prefs, iface, name, arg).await {
                SlashOutcome::Reply(text) => println!("\n{}\n", text),
                SlashOutcome::Quit => break,
            }
            continue;
        }

        match session.submit(input).await {
            Ok(result) => println!("\n{}\n", result.message),
            Err(e) => eprintln!("\nError: {}\n", e),
        }
    }

    if let Some(history) = history
        && let Err(e) = rl.save_history(history)
    {
        tracing::warn!("Failed to save chat history: {}", e);
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
pub enum SlashOutcome {
    Reply(String),
    Quit,
}

pub async fn handle_slash(
    session: &ChatSession,
    prefs: &mut Preferences,
    iface: Interface,
    name: &str,
    arg: &str,
) -> SlashOutcome {
    let Some(cmd) = slash::find(name).filter(|c| c.supports(iface)) else {
        return SlashOutcome::Reply(format!(
            "Unknown command: /{}. Type /help for commands.",
            name
        ));
    };

    let reply = match cmd.name {
        "help" => slash::format_help_text(iface),
        "quit" => return SlashOutcome::Quit,
        "scene" => {
            let snapshot = session.snapshot().await;
            if snapshot.objects.is_empty() {
                "Scene is empty.".to_string()
            } else {
                let mut lines = vec![format!("{} object(s):", snapshot.object_count)];
                for object in &snapshot.objects {
                    let marker = if snapshot.selection == Some(object.id) {
                        "*"
                    } else {
                        " "
                    };
                    lines.push(format!("{} {}", marker, describe_object(object)));
                }
                lines.join("\n")
            }
        }
        "history" => {
            let entries = session.history().await;
            if entries.is_empty() {
                "Nothing yet.".to_string()
            } else {
                entries
                    .iter()
                    .map(|e| {
                        let who = match e.role {
                            EntryRole::User => "you",
                            EntryRole::Assistant => "scene",
                            EntryRole::System => "system",
                            EntryRole::Error => "error",
                        };
                        format!("[{}] {}: {}", e.timestamp.format("%H:%M:%S"), who, e.content)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        "undo" => match session.undo().await {
            Some(record) => format!("Undid: {}", record.label),
            None => "Nothing to undo.".to_string(),
        },
        "key" => {
            if arg.is_empty() {
                let key = session.api_key().await;
                if key.is_empty() {
                    "No API key set.".to_string()
                } else {
                    format!("API key: {}", mask_secret(&key))
                }
            } else {
                session.set_api_key(arg).await;
                prefs.set_api_key(arg);
                format!("API key set: {}", mask_secret(arg))
            }
        }
        other => format!("/{} is not available here.", other),
    };
    SlashOutcome::Reply(reply)
}

/// One line per object, e.g. `#3 Ball (Sphere) at (0, 5, 0) [SphereCollider, Rigidbody]`.
pub fn describe_object(object: &ObjectSnapshot) -> String {
    let [x, y, z] = object.position;
    let components: Vec<&str> = object.components.iter().map(|c| c.kind.as_str()).collect();
    let mut line = format!(
        "{} {} ({}) at ({}, {}, {})",
        object.id,
        object.name,
        object.primitive.as_str(),
        x,
        y,
        z
    );
    if let Some(material) = &object.material {
        line.push_str(&format!(" {}", material.name));
    }
    if !components.is_empty() {
        line.push_str(&format!(" [{}]", components.join(", ")));
    }
    line
}
