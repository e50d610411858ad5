//! Interactive memo screen: browse, record, play, and delete.
//!
//! One loop owns the recorder (session plus library) and the terminal. Every
//! store operation happens on this loop, so inserts and deletes never overlap.
//! SIGUSR1 acts like pressing the record key, for external triggers.

use super::load_library;
use crate::config::MurmurConfig;
use crate::error::MurmurError;
use crate::recording::{AudioInput, CpalInput, Recorder, RecorderEvent};
use crate::ui::{show_fatal, MemoScreen, ScreenCommand};
use anyhow::{anyhow, Context};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound between redraws when nothing else happens.
const FRAME: Duration = Duration::from_millis(50);

/// How the screen behaves once opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMode {
    /// Stay open until the user quits
    Browse,
    /// Start recording immediately and exit once the clip is saved
    RecordOnce,
}

/// Opens the memo screen in the given mode.
///
/// # Errors
/// - If configuration or the recording store cannot be loaded
/// - In `RecordOnce` mode, if the microphone is unavailable or saving fails
/// - If the terminal fails
pub async fn run_screen(mode: ScreenMode) -> anyhow::Result<()> {
    tracing::info!("=== murmur {:?} started ===", mode);

    let config = match MurmurConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            show_fatal(
                "Configuration Error",
                &e.to_string(),
                "Please check ~/.config/murmur/murmur.toml and try again.",
            );
            return Err(e);
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz",
        config.audio.device,
        config.audio.sample_rate
    );

    let library = match load_library(&config) {
        Ok(library) => library,
        Err(e) => {
            tracing::error!("Failed to open recordings: {e}");
            show_fatal(
                "Storage Error",
                &e.to_string(),
                "Check that the data directory is writable.",
            );
            return Err(e);
        }
    };

    let input = CpalInput::new(config.audio.sample_rate, config.audio.device.clone());
    let mut app = ScreenApp {
        recorder: Recorder::new(input, library),
        screen: MemoScreen::new()?,
        player: config.playback.player.clone(),
        last_saved: None,
        save_error: None,
    };
    app.screen.select_last(app.recorder.library().len());

    let trigger = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&trigger))
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    if mode == ScreenMode::RecordOnce {
        if let Err(e) = app.recorder.start() {
            app.screen.cleanup()?;
            show_fatal(
                "Recording Error",
                &e.to_string(),
                "Check your microphone and [audio] device, then try again.",
            );
            return Err(e.into());
        }
    }

    let outcome = app.run(mode, &trigger).await;
    app.screen.cleanup()?;
    outcome?;

    if mode == ScreenMode::RecordOnce {
        if let Some(e) = app.save_error.take() {
            return Err(anyhow::Error::new(e).context("Recording was not saved"));
        }
        let (id, name) = app
            .last_saved
            .context("Recording was not saved")?;
        println!("Saved '{name}' (#{id})");
    }

    tracing::info!("=== murmur exited ===");
    Ok(())
}

struct ScreenApp<I: AudioInput> {
    recorder: Recorder<I>,
    screen: MemoScreen,
    player: Option<String>,
    /// Id and name of the last clip that reached the store
    last_saved: Option<(i64, String)>,
    /// Why the last finished session could not be stored
    save_error: Option<MurmurError>,
}

impl<I: AudioInput> ScreenApp<I> {
    async fn run(&mut self, mode: ScreenMode, trigger: &AtomicBool) -> anyhow::Result<()> {
        loop {
            if trigger.swap(false, Ordering::Relaxed) {
                tracing::info!("Received SIGUSR1: toggling recording");
                self.toggle_recording();
            }

            match self.screen.handle_input(self.recorder.library().len())? {
                ScreenCommand::ToggleRecording => self.toggle_recording(),
                ScreenCommand::Play => self.play_selected()?,
                ScreenCommand::Delete => self.delete_selected(),
                ScreenCommand::Quit => {
                    self.finish_session();
                    break;
                }
                ScreenCommand::Continue
                | ScreenCommand::SelectPrevious
                | ScreenCommand::SelectNext => {}
            }

            let recording = self.recorder.is_recording();
            tokio::select! {
                event = self.recorder.next_event(), if recording => match event {
                    Ok(Some(RecorderEvent::AutoSaved { id })) => self.saved(id),
                    Ok(Some(RecorderEvent::InputClosed)) => {
                        self.screen.set_error("Microphone stopped delivering audio");
                    }
                    Ok(Some(RecorderEvent::Progress)) | Ok(None) => {}
                    Err(e) => self.save_failed(e),
                },
                _ = tokio::time::sleep(FRAME) => {}
            }

            if mode == ScreenMode::RecordOnce && !self.recorder.is_recording() {
                break;
            }

            self.screen
                .render(self.recorder.library().recordings(), self.recorder.status())?;
        }

        Ok(())
    }

    fn toggle_recording(&mut self) {
        if self.recorder.is_recording() {
            self.finish_session();
            return;
        }

        match self.recorder.start() {
            Ok(()) => self.screen.clear_status(),
            Err(e) => self.report("Could not start recording", &e),
        }
    }

    /// Stops the active session, if any, and saves the clip.
    fn finish_session(&mut self) {
        match self.recorder.stop_and_save() {
            Ok(Some(saved)) => {
                let id = saved.id;
                self.saved(id);
            }
            Ok(None) => {}
            Err(e) => self.save_failed(e),
        }
    }

    fn saved(&mut self, id: i64) {
        let Some(name) = self.recorder.library().get(id).map(|r| r.name.clone()) else {
            return;
        };
        self.screen.set_info(format!("Saved '{name}'"));
        self.screen.select_last(self.recorder.library().len());
        self.last_saved = Some((id, name));
        self.save_error = None;
    }

    fn save_failed(&mut self, error: MurmurError) {
        self.report("Could not save recording", &error);
        self.save_error = Some(error);
    }

    fn play_selected(&mut self) -> anyhow::Result<()> {
        if self.recorder.is_recording() {
            self.screen.set_info("Stop recording before playing");
            return Ok(());
        }

        let library = self.recorder.library();
        let Some(recording) = self
            .screen
            .selected()
            .and_then(|index| library.recordings().get(index))
        else {
            return Ok(());
        };

        self.screen.suspend()?;
        let played = library.play(recording, self.player.as_deref());
        self.screen.resume()?;

        match played {
            Ok(()) => self.screen.set_info(format!("Played '{}'", recording.name)),
            Err(e) => {
                tracing::warn!("Playback failed: {}", e);
                self.screen.set_error(format!("Playback failed: {e}"));
            }
        }
        Ok(())
    }

    fn delete_selected(&mut self) {
        let Some(id) = self
            .screen
            .selected()
            .and_then(|index| self.recorder.library().recordings().get(index))
            .map(|recording| recording.id)
        else {
            return;
        };

        let library = self.recorder.library_mut();
        let outcome = library.remove(id);
        let len = library.len();
        match outcome {
            Ok(Some(removed)) => self.screen.set_info(format!("Deleted '{}'", removed.name)),
            Ok(None) => {}
            Err(e) => self.report("Could not delete recording", &e),
        }
        self.screen.clamp_selection(len);
    }

    fn report(&mut self, context: &str, error: &MurmurError) {
        tracing::warn!("{}: {}", context, error);
        let hint = if error.is_capture_unavailable() {
            " (check microphone access)"
        } else {
            ""
        };
        self.screen.set_error(format!("{context}: {error}{hint}"));
    }
}
