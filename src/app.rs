//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::config::get_config_path;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

/// Record raw thoughts now, and make sense of them later
#[derive(Parser)]
#[command(name = "murmur")]
#[command(version)]
#[command(about = "hey, what's up?\nrecord raw thoughts now, and make sense of it later")]
#[command(long_about = "hey, what's up?\nrecord raw thoughts now, and make sense of it later\n\nA terminal voice memo recorder. Memos are capped at 3 minutes and kept in a\nlocal database.\n\nDEFAULT COMMAND:\n    If no command is specified, the interactive memo screen opens.\n    r / Space starts or stops recording, Enter plays, d deletes, q quits.\n\nEXAMPLES:\n    # Open the memo screen\n    $ murmur\n\n    # Record one memo and exit once it is saved\n    $ murmur record\n\n    # List, play, and delete stored memos\n    $ murmur list\n    $ murmur play 3\n    $ murmur delete 3\n\n    # Start or stop recording from a hotkey daemon\n    $ pkill -USR1 murmur")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/murmur/murmur.toml\n    Recordings:         ~/.local/share/murmur/recordings.db\n    Logs:               ~/.local/state/murmur/murmur.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a single memo and exit once it is saved
    ///
    /// Recording stops on r, Space, q, Esc, Ctrl+C, or after 3 minutes.
    /// Every way of stopping saves the memo.
    #[command(visible_alias = "r")]
    Record,

    /// List stored memos, oldest first
    #[command(visible_alias = "ls")]
    List,

    /// Play a stored memo with the configured player
    ///
    /// Plays the most recent memo when no id is given.
    #[command(visible_alias = "p")]
    Play {
        /// Id of the memo, as shown by `murmur list`
        #[arg(value_name = "ID")]
        id: Option<i64>,
    },

    /// Delete a stored memo
    ///
    /// Deleting an id that does not exist is not an error.
    Delete {
        /// Id of the memo, as shown by `murmur list`
        #[arg(value_name = "ID")]
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Uses $VISUAL or $EDITOR, falling back to nano or vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in murmur.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   murmur completions bash > murmur.bash
    ///   murmur completions zsh > _murmur
    ///   murmur completions fish > murmur.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If the default configuration cannot be written
/// - If command execution fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // These neither log nor need a config file
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "murmur", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;

    crate::setup::ensure_config(&get_config_path()?)?;

    match cli.command {
        None => commands::handle_memos().await?,
        Some(Commands::Record) => commands::handle_record().await?,
        Some(Commands::List) => commands::handle_list()?,
        Some(Commands::Play { id }) => commands::handle_play(id)?,
        Some(Commands::Delete { id, yes }) => commands::handle_delete(id, yes)?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
