use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "farewell")]
#[command(author, version, about)]
#[command(long_about = "An animated farewell card.\n\n\
    Click the envelope to open it, then browse the messages with the arrow keys.\n\n\
    Examples:\n  \
    farewell                          Open the card (messages from the configured source)\n  \
    farewell --messages wishes.yaml   Use a local message file\n  \
    farewell fetch                    Print the messages without opening a window")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch fullscreen instead of in a window
    #[arg(long, global = false)]
    pub fullscreen: bool,

    /// Read messages from a local YAML/JSON file instead of the remote source
    #[arg(long, global = false)]
    pub messages: Option<PathBuf>,

    /// Reload the --messages file when it changes on disk
    #[arg(long, global = false, requires = "messages")]
    pub watch: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Load the messages once and print them
    Fetch {
        /// Read messages from a local YAML/JSON file instead of the remote source
        #[arg(long)]
        messages: Option<PathBuf>,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. source.url, card.heading, defaults.theme)
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the configuration file location
    Path,
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Fetch { messages }) => crate::commands::fetch::run(messages.as_deref()),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("farewell {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = &self.messages {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                }
                crate::app::run(crate::app::RunOptions {
                    fullscreen: self.fullscreen,
                    messages: self.messages,
                    watch: self.watch,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_watch_requires_messages() {
        assert!(Cli::try_parse_from(["farewell", "--watch"]).is_err());
        let cli = Cli::try_parse_from(["farewell", "--messages", "m.yaml", "--watch"]).unwrap();
        assert!(cli.watch);
        assert_eq!(cli.messages, Some(PathBuf::from("m.yaml")));
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["farewell", "-vv", "fetch"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Fetch { messages: None })));
    }

    #[test]
    fn test_global_flags_before_and_after_subcommand() {
        let cli = Cli::try_parse_from(["farewell", "-q", "--no-color", "config", "show"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.no_color);

        let cli = Cli::try_parse_from(["farewell", "fetch", "-v", "--messages", "m.yaml"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Some(Commands::Fetch { messages }) => {
                assert_eq!(messages, Some(PathBuf::from("m.yaml")));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_config_set_parses() {
        let cli = Cli::try_parse_from(["farewell", "config", "set", "defaults.theme", "night"])
            .unwrap();
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Set { key, value },
            }) => {
                assert_eq!(key, "defaults.theme");
                assert_eq!(value, "night");
            }
            _ => panic!("expected config set"),
        }
    }
}
