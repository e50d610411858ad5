//! Prints stored recordings.

use super::open_library;
use crate::ui::memos::{format_date, format_size};

/// Prints every recording, oldest first, one per line.
///
/// # Errors
/// - If configuration or the recording store cannot be loaded
pub fn handle_list() -> anyhow::Result<()> {
    let (_, library) = open_library()?;

    if library.is_empty() {
        println!("No recordings yet. Run 'murmur record' to capture one.");
        return Ok(());
    }

    for recording in library.recordings() {
        println!(
            "{:>5}  {:<40}  {:<16}  {:>9}",
            recording.id,
            recording.name,
            format_date(&recording.created_at),
            format_size(recording.audio.len())
        );
    }

    tracing::debug!("Listed {} recordings", library.len());
    Ok(())
}
