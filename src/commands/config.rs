//! Opens murmur.toml in the user's editor and checks it afterwards.

use crate::config::{get_config_path, MurmurConfig};
use anyhow::anyhow;
use std::process::Command;

/// Editors tried when neither $VISUAL nor $EDITOR is set.
const FALLBACK_EDITORS: [&str; 2] = ["nano", "vi"];

/// Opens the configuration file for editing, then validates what was saved.
///
/// The default template is written first if the file does not exist yet.
///
/// # Errors
/// - If no editor can be found or it exits with an error
/// - If the edited file no longer parses
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    crate::setup::ensure_config(&config_path)?;

    let editor = find_editor().ok_or_else(|| {
        anyhow!("No editor found. Please set the $EDITOR environment variable.")
    })?;
    tracing::info!("Editing {} with '{}'", config_path.display(), editor);

    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    let status = Command::new(program)
        .args(parts)
        .arg(&config_path)
        .status()
        .map_err(|e| anyhow!("Failed to open editor '{editor}': {e}"))?;

    if !status.success() {
        return Err(anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    match MurmurConfig::load_from(&config_path) {
        Ok(_) => {
            tracing::info!("Config file edited successfully");
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Edited config does not parse: {e}");
            Err(anyhow!("{e}\nRun 'murmur config' again to fix it."))
        }
    }
}

/// $VISUAL, then $EDITOR, then the first fallback editor on PATH.
fn find_editor() -> Option<String> {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .or_else(|| {
            FALLBACK_EDITORS
                .iter()
                .find(|editor| on_path(editor))
                .map(|editor| editor.to_string())
        })
}

fn on_path(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .output()
        .is_ok_and(|output| output.status.success())
}
