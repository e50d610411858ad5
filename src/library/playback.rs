//! Plays a stored recording with an external audio player.
//!
//! Clips are written under a private `playback/` directory inside the data
//! directory, never to the shared temp dir. A player that is waited on gets a
//! throwaway file removed as soon as it exits. Handing a clip to the desktop
//! (`open`, `xdg-open`) needs a file that outlives the call, so that copy is
//! named `murmur-<id>.<ext>` and removed when the recording is deleted.

use super::Recording;
use anyhow::anyhow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

/// Players tried in order on Linux when `xdg-open` is missing.
#[cfg(target_os = "linux")]
const FALLBACK_PLAYERS: [&str; 4] = ["mpv", "ffplay", "paplay", "aplay"];

const PLAYBACK_DIR: &str = "playback";

/// File extension for a media type.
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/mp4" | "audio/m4a" => "m4a",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        "audio/webm" => "webm",
        "audio/flac" => "flac",
        _ => "bin",
    }
}

/// Returns `<data_dir>/playback`, created readable by the owner only.
///
/// # Errors
/// - If the directory cannot be created or its permissions set
pub fn playback_dir(data_dir: &Path) -> io::Result<PathBuf> {
    let dir = data_dir.join(PLAYBACK_DIR);
    create_private_dir(&dir)?;
    Ok(dir)
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)?;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Name of the clip kept for desktop handoff.
fn handoff_name(recording: &Recording) -> String {
    format!(
        "murmur-{}.{}",
        recording.id,
        extension_for(&recording.mime_type)
    )
}

/// Writes the clip to a 0600 temp file in `dir` that is deleted on drop.
///
/// # Errors
/// - If the file cannot be created or written
pub fn write_temp_clip(recording: &Recording, dir: &Path) -> io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(".play-")
        .suffix(&format!(".{}", extension_for(&recording.mime_type)))
        .tempfile_in(dir)?;
    file.write_all(&recording.audio)?;
    file.flush()?;

    tracing::debug!(
        "Wrote {} bytes for playback to {}",
        recording.audio.len(),
        file.path().display()
    );
    Ok(file)
}

/// Writes the clip as `murmur-<id>.<ext>` in `dir`, readable by the owner only.
///
/// # Errors
/// - If the file cannot be written
pub fn write_handoff_clip(recording: &Recording, dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(handoff_name(recording));

    // Replace rather than write through whatever is already there
    match fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&path)?;
    file.write_all(&recording.audio)?;

    tracing::debug!("Wrote handoff clip {}", path.display());
    Ok(path)
}

/// Removes every playback file kept for recording `id`.
///
/// A missing directory or file is not an error.
///
/// # Errors
/// - If the directory cannot be read or a file cannot be removed
pub fn remove_clips(dir: &Path, id: i64) -> io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    let prefix = format!("murmur-{id}.");
    for entry in entries {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            fs::remove_file(entry.path())?;
            tracing::debug!("Removed playback clip {}", entry.path().display());
        }
    }
    Ok(())
}

/// Plays a recording and waits for the player to exit.
///
/// Uses `player` if given (a command, optionally with arguments), otherwise the
/// platform default: `open` on macOS, `xdg-open` then common players on Linux.
///
/// # Errors
/// - If the clip cannot be written to `dir`
/// - If no player can be launched or the player fails
pub fn play(recording: &Recording, player: Option<&str>, dir: &Path) -> anyhow::Result<()> {
    tracing::info!(
        "Playing recording #{} from {}",
        recording.id,
        recording.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    match player {
        Some(command) => {
            let clip = write_temp_clip(recording, dir)?;
            run_player(command, clip.path())?;
        }
        None => run_default_player(recording, dir)?,
    }

    tracing::info!("Playback finished for recording #{}", recording.id);
    Ok(())
}

fn run_player(command: &str, path: &Path) -> anyhow::Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| anyhow!("Player command is empty"))?;

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| anyhow!("Failed to launch player '{program}': {e}"))?;

    check_exit(program, status)
}

fn check_exit(program: &str, status: std::process::ExitStatus) -> anyhow::Result<()> {
    if !status.success() {
        return Err(anyhow!(
            "Player '{program}' exited with code {}",
            status.code().unwrap_or(-1)
        ));
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn run_default_player(recording: &Recording, dir: &Path) -> anyhow::Result<()> {
    let path = write_handoff_clip(recording, dir)?;
    run_player("open", &path)
}

#[cfg(target_os = "linux")]
fn run_default_player(recording: &Recording, dir: &Path) -> anyhow::Result<()> {
    let path = write_handoff_clip(recording, dir)?;
    match Command::new("xdg-open").arg(&path).status() {
        Ok(status) => return check_exit("xdg-open", status),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("xdg-open not available, trying fallback players");
            fs::remove_file(&path)?;
        }
        Err(e) => return Err(anyhow!("Failed to launch xdg-open: {e}")),
    }

    let clip = write_temp_clip(recording, dir)?;
    for player in FALLBACK_PLAYERS {
        match Command::new(player).arg(clip.path()).status() {
            Ok(status) => {
                tracing::debug!("Played with fallback player {}", player);
                return check_exit(player, status);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(anyhow!("Failed to launch player '{player}': {e}")),
        }
    }

    Err(anyhow!(
        "No audio player found. Install mpv, ffplay, paplay, or aplay, or set [playback] player"
    ))
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn run_default_player(_recording: &Recording, _dir: &Path) -> anyhow::Result<()> {
    Err(anyhow!(
        "No default audio player on this platform. Set [playback] player in murmur.toml"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use tempfile::TempDir;

    fn clip(id: i64) -> Recording {
        Recording {
            id,
            name: "Recording test".to_string(),
            audio: b"RIFFdata".to_vec(),
            mime_type: "audio/wav".to_string(),
            created_at: Local::now(),
        }
    }

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("audio/wav"), "wav");
        assert_eq!(extension_for("audio/mp4"), "m4a");
        assert_eq!(extension_for("application/octet-stream"), "bin");
    }

    #[test]
    fn test_temp_clip_is_gone_after_drop() {
        let data = TempDir::new().unwrap();
        let dir = playback_dir(data.path()).unwrap();

        let file = write_temp_clip(&clip(7), &dir).unwrap();
        let path = file.path().to_path_buf();
        assert!(path.starts_with(&dir));
        assert_eq!(fs::read(&path).unwrap(), b"RIFFdata");

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_handoff_clip_replaces_existing_file() {
        let data = TempDir::new().unwrap();
        let dir = playback_dir(data.path()).unwrap();
        fs::write(dir.join("murmur-3.wav"), b"stale").unwrap();

        let path = write_handoff_clip(&clip(3), &dir).unwrap();
        assert_eq!(path, dir.join("murmur-3.wav"));
        assert_eq!(fs::read(&path).unwrap(), b"RIFFdata");
    }

    #[cfg(unix)]
    #[test]
    fn test_playback_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let data = TempDir::new().unwrap();
        let dir = playback_dir(data.path()).unwrap();
        let path = write_handoff_clip(&clip(1), &dir).unwrap();

        assert_eq!(fs::metadata(&dir).unwrap().permissions().mode() & 0o777, 0o700);
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_remove_clips_only_touches_matching_id() {
        let data = TempDir::new().unwrap();
        let dir = playback_dir(data.path()).unwrap();
        let one = write_handoff_clip(&clip(1), &dir).unwrap();
        let ten = write_handoff_clip(&clip(10), &dir).unwrap();

        remove_clips(&dir, 1).unwrap();
        assert!(!one.exists());
        assert!(ten.exists());

        remove_clips(&data.path().join("missing"), 1).unwrap();
    }

    #[test]
    fn test_empty_player_command_is_rejected() {
        let err = run_player("   ", Path::new("/nonexistent.wav")).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_player_is_reported() {
        let data = TempDir::new().unwrap();
        let dir = playback_dir(data.path()).unwrap();

        let err = play(&clip(2), Some("false"), &dir).unwrap_err();
        assert!(err.to_string().contains("exited with code 1"));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
}
