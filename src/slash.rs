//! Slash command definitions shared by the chat REPL and the viewer console.

/// Which interfaces support a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interface {
    Chat,
    Viewer,
}

/// A slash command definition.
pub struct SlashCommand {
    pub name: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub interfaces: &'static [Interface],
}

impl SlashCommand {
    pub fn supports(&self, iface: Interface) -> bool {
        self.interfaces.contains(&iface)
    }

    fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }

    /// Format as a help line, e.g. "  /help, /h, /?     - Show this help"
    fn help_line(&self) -> String {
        let mut names = format!("/{}", self.name);
        for alias in self.aliases {
            names.push_str(&format!(", /{}", alias));
        }
        if !self.usage.is_empty() {
            names.push_str(&format!(" {}", self.usage));
        }
        format!("  {:<20}- {}", names, self.description)
    }
}

pub const COMMANDS: &[SlashCommand] = &[
    SlashCommand {
        name: "help",
        description: "Show available commands",
        aliases: &["h", "?"],
        usage: "",
        interfaces: &[Interface::Chat, Interface::Viewer],
    },
    SlashCommand {
        name: "quit",
        description: "Exit chat",
        aliases: &["exit", "q"],
        usage: "",
        interfaces: &[Interface::Chat, Interface::Viewer],
    },
    SlashCommand {
        name: "scene",
        description: "List objects in the scene",
        aliases: &["ls"],
        usage: "",
        interfaces: &[Interface::Chat, Interface::Viewer],
    },
    SlashCommand {
        name: "history",
        description: "Show the conversation log",
        aliases: &[],
        usage: "",
        interfaces: &[Interface::Chat, Interface::Viewer],
    },
    SlashCommand {
        name: "undo",
        description: "Remove the last created object",
        aliases: &[],
        usage: "",
        interfaces: &[Interface::Chat, Interface::Viewer],
    },
    SlashCommand {
        name: "key",
        description: "Show or set the API key",
        aliases: &[],
        usage: "[value]",
        interfaces: &[Interface::Chat, Interface::Viewer],
    },
];

/// Look up a command by name or alias (without the leading slash).
pub fn find(name: &str) -> Option<&'static SlashCommand> {
    COMMANDS.iter().find(|cmd| cmd.matches(name))
}

/// Split "/key sk-123" into ("key", "sk-123"). Returns `None` for plain text.
pub fn split(input: &str) -> Option<(&str, &str)> {
    let rest = input.trim().strip_prefix('/')?;
    match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => Some((name, arg.trim())),
        None => Some((rest, "")),
    }
}

/// Format help text for a given interface.
pub fn format_help_text(iface: Interface) -> String {
    let mut lines = vec!["Commands:".to_string()];
    for cmd in COMMANDS {
        if cmd.supports(iface) {
            lines.push(cmd.help_line());
        }
    }
    lines.join("\n")
}
