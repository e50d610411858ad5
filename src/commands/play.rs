//! Plays a stored recording using the system audio player.

use super::open_library;
use anyhow::anyhow;

/// Plays the recording with the given id, or the most recent one.
///
/// # Errors
/// - If there are no recordings, or `id` does not exist
/// - If no audio player can be launched
pub fn handle_play(id: Option<i64>) -> anyhow::Result<()> {
    tracing::info!("=== murmur Play Command ===");

    let (config, library) = open_library()?;

    let recording = match id {
        Some(id) => library
            .get(id)
            .ok_or_else(|| anyhow!("No recording with id {id}. Run 'murmur list' to see ids."))?,
        None => library
            .latest()
            .ok_or_else(|| anyhow!("No recordings found"))?,
    };

    println!("Playing '{}'", recording.name);
    library.play(recording, config.playback.player.as_deref())
}
