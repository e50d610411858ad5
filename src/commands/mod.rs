//! Application command handlers for murmur.
//!
//! # Commands
//! - `screen`: interactive memo screen (default) and its one-shot record mode
//! - `record`: record a single memo and exit
//! - `list`: print stored recordings
//! - `play`: play a recording by id
//! - `delete`: delete a recording by id
//! - `config`: open the configuration file in the user's editor
//! - `list_devices`: list audio input devices
//! - `logs`: show recent log entries

pub mod config;
pub mod delete;
pub mod list;
pub mod list_devices;
pub mod logs;
pub mod play;
pub mod record;
pub mod screen;

pub use config::handle_config;
pub use delete::handle_delete;
pub use list::handle_list;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use play::handle_play;
pub use record::{handle_memos, handle_record};

use crate::config::MurmurConfig;
use crate::library::{playback, Library, RecordingStore};

/// Loads configuration and every stored recording.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the data directory or database cannot be opened
pub(crate) fn open_library() -> anyhow::Result<(MurmurConfig, Library)> {
    let config = MurmurConfig::load()?;
    let library = load_library(&config)?;
    Ok((config, library))
}

/// Opens the recordings under the configured data directory.
///
/// # Errors
/// - If the data directory, its playback directory, or the database cannot be opened
pub(crate) fn load_library(config: &MurmurConfig) -> anyhow::Result<Library> {
    let data_dir = config.data_dir()?;
    let playback_dir = playback::playback_dir(&data_dir)?;
    Ok(Library::load(RecordingStore::new(&data_dir))?.with_playback_dir(playback_dir))
}
