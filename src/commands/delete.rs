//! Deletes a stored recording.

use super::open_library;
use crate::ui::memos::format_date;

/// Deletes the recording with the given id after confirmation.
///
/// Unknown ids are reported but are not an error.
///
/// # Errors
/// - If the recording store cannot be opened or the delete fails
/// - If the confirmation prompt is interrupted
pub fn handle_delete(id: i64, assume_yes: bool) -> anyhow::Result<()> {
    let (_, mut library) = open_library()?;

    let Some(recording) = library.get(id) else {
        println!("No recording with id {id}; nothing to delete.");
        return Ok(());
    };

    if !assume_yes {
        let confirmed = cliclack::confirm(format!(
            "Delete '{}' from {}?",
            recording.name,
            format_date(&recording.created_at)
        ))
        .initial_value(false)
        .interact()?;

        if !confirmed {
            cliclack::outro("Kept it.")?;
            return Ok(());
        }
    }

    if let Some(removed) = library.remove(id)? {
        println!("Deleted '{}'", removed.name);
    }
    Ok(())
}
