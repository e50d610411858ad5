//! One-shot recording.
//!
//! Opens the memo screen already recording and exits once the clip is saved.
//! r, Space, q, Ctrl+C, SIGUSR1, and the countdown running out all stop the
//! session, and every one of them saves the clip.

use super::screen::{run_screen, ScreenMode};

/// Records a single memo and prints where it was saved.
///
/// # Errors
/// - If the microphone is unavailable
/// - If the clip cannot be stored
pub async fn handle_record() -> anyhow::Result<()> {
    run_screen(ScreenMode::RecordOnce).await
}

/// Opens the interactive memo screen.
///
/// # Errors
/// - If configuration or storage cannot be loaded
/// - If the terminal fails
pub async fn handle_memos() -> anyhow::Result<()> {
    run_screen(ScreenMode::Browse).await
}
