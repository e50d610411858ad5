//! First-run setup.
//!
//! Writes the commented default configuration if the user has none yet.

use std::path::Path;

/// Embedded default configuration template.
pub const DEFAULT_CONFIG: &str = include_str!("../../environments/murmur.toml");

/// Writes the default config to `config_path` unless a file already exists.
///
/// Returns whether a new file was written.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn ensure_config(config_path: &Path) -> anyhow::Result<bool> {
    if config_path.exists() {
        tracing::debug!("Config present at {}", config_path.display());
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, DEFAULT_CONFIG)?;

    tracing::info!("Wrote default config to {}", config_path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_config_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("murmur.toml");

        assert!(ensure_config(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        std::fs::write(&path, "[audio]\ndevice = \"1\"\n").unwrap();
        assert!(!ensure_config(&path).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("device = \"1\""));
    }
}
