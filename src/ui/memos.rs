//! Main terminal screen: the list of recordings plus the record control.
//!
//! Shows every stored memo with its name and date, a countdown gauge while a
//! session is recording, and a one-line status for non-fatal errors.

use crate::library::Recording;
use crate::recording::{SessionStatus, MAX_RECORDING_SECS};
use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, HighlightSpacing, List, ListItem, ListState, Padding, Paragraph},
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

const FG: Color = Color::Rgb(40, 40, 40);
const BG: Color = Color::Rgb(255, 255, 255);
const MUTED_FG: Color = Color::Rgb(140, 140, 140);
const HIGHLIGHT_BG: Color = Color::Rgb(235, 235, 235);
const RECORD_RED: Color = Color::Rgb(239, 68, 68);

/// How long an informational status stays visible.
const STATUS_TTL: Duration = Duration::from_secs(4);

/// What the user asked for with the last key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCommand {
    /// Nothing to do (no key, or a navigation key already handled)
    Continue,
    /// Start recording, or stop and save (r / Space)
    ToggleRecording,
    /// Play the selected recording (Enter)
    Play,
    /// Delete the selected recording (d / Delete)
    Delete,
    /// Leave the screen; an active session is saved first (q / Esc / Ctrl+C)
    Quit,
    SelectPrevious,
    SelectNext,
}

struct Status {
    message: String,
    is_error: bool,
    shown_at: Instant,
}

/// Terminal UI for browsing and recording voice memos.
pub struct MemoScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    list_state: ListState,
    status: Option<Status>,
    active: bool,
}

impl MemoScreen {
    /// Creates the screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            list_state: ListState::default(),
            status: None,
            active: true,
        })
    }

    /// Index of the highlighted recording.
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Highlights the newest recording (bottom of the list).
    pub fn select_last(&mut self, len: usize) {
        self.list_state.select(len.checked_sub(1));
    }

    /// Keeps the selection inside a list that may have shrunk.
    pub fn clamp_selection(&mut self, len: usize) {
        match self.list_state.selected() {
            Some(index) if index >= len => self.select_last(len),
            None if len > 0 => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            message: message.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    /// Shows an error until the next status replaces it.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            message: message.into(),
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Polls the keyboard without blocking and applies list navigation.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, len: usize) -> anyhow::Result<ScreenCommand> {
        if !event::poll(Duration::ZERO)? {
            return Ok(ScreenCommand::Continue);
        }

        let Event::Key(key) = event::read()? else {
            return Ok(ScreenCommand::Continue);
        };

        let command = key_command(key);
        match command {
            ScreenCommand::SelectPrevious if len > 0 => self.list_state.select_previous(),
            ScreenCommand::SelectNext if len > 0 => {
                let next = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
                self.list_state.select(Some(next));
            }
            ScreenCommand::Continue => {}
            other => tracing::debug!("Screen command: {:?}", other),
        }
        Ok(command)
    }

    /// Draws the header, recordings list, record footer, and status line.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, recordings: &[Recording], session: SessionStatus) -> anyhow::Result<()> {
        if self
            .status
            .as_ref()
            .is_some_and(|s| !s.is_error && s.shown_at.elapsed() >= STATUS_TTL)
        {
            self.status = None;
        }

        let status_line = self.status.as_ref().map(|s| {
            let color = if s.is_error { RECORD_RED } else { MUTED_FG };
            Line::styled(s.message.clone(), Style::default().fg(color))
        });
        let list_state = &mut self.list_state;

        self.terminal.draw(|frame| {
            let area = frame.area();

            let page = Block::default()
                .padding(Padding::horizontal(2))
                .style(Style::default().fg(FG).bg(BG));
            frame.render_widget(&page, area);
            let inner = page.inner(area);

            let [header_area, list_area, footer_area, status_area] = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .areas(inner);

            let header = Paragraph::new(vec![
                Line::styled("hey, what's up?", Style::default().add_modifier(Modifier::BOLD)),
                Line::styled(
                    "record raw thoughts now, and make sense of it later",
                    Style::default().add_modifier(Modifier::ITALIC),
                ),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(header, header_area);

            let list_block = Block::default()
                .title(" your thoughts ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(MUTED_FG));

            if recordings.is_empty() {
                let empty = Paragraph::new(Line::styled(
                    "no recordings yet",
                    Style::default().fg(MUTED_FG).add_modifier(Modifier::ITALIC),
                ))
                .alignment(Alignment::Center)
                .block(list_block);
                frame.render_widget(empty, list_area);
            } else {
                let items: Vec<ListItem> = recordings
                    .iter()
                    .map(|recording| {
                        ListItem::new(vec![
                            Line::styled(
                                recording.name.clone(),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                            Line::styled(
                                format!(
                                    "{} · {}",
                                    format_date(&recording.created_at),
                                    format_size(recording.audio.len())
                                ),
                                Style::default().fg(MUTED_FG),
                            ),
                        ])
                    })
                    .collect();

                let list = List::new(items)
                    .block(list_block)
                    .highlight_style(Style::default().bg(HIGHLIGHT_BG))
                    .highlight_symbol("▸ ")
                    .highlight_spacing(HighlightSpacing::Always);
                frame.render_stateful_widget(list, list_area, list_state);
            }

            if session.recording {
                let label = format!(
                    "● {} left · {}",
                    format_remaining(session.remaining_seconds),
                    format_size(session.captured_bytes)
                );
                let gauge = Gauge::default()
                    .block(Block::default().borders(Borders::ALL))
                    .gauge_style(Style::default().fg(RECORD_RED).bg(HIGHLIGHT_BG))
                    .ratio(countdown_ratio(session.remaining_seconds))
                    .label(Span::styled(label, Style::default().fg(FG)));
                frame.render_widget(gauge, footer_area);
            } else {
                let help = Paragraph::new("r record · ↑↓ select · ↵ play · d delete · q quit")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(MUTED_FG))
                    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(MUTED_FG)));
                frame.render_widget(help, footer_area);
            }

            if let Some(line) = status_line {
                frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), status_area);
            }
        })?;

        Ok(())
    }

    /// Hands the terminal back to the shell (for an external player).
    ///
    /// # Errors
    /// - If terminal mode cannot be restored
    pub fn suspend(&mut self) -> anyhow::Result<()> {
        self.cleanup()
    }

    /// Re-enters the alternate screen after [`MemoScreen::suspend`].
    ///
    /// # Errors
    /// - If raw mode or the alternate screen cannot be entered
    pub fn resume(&mut self) -> anyhow::Result<()> {
        if self.active {
            return Ok(());
        }
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        self.terminal.clear()?;
        self.active = true;
        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        self.active = false;
        Ok(())
    }
}

impl Drop for MemoScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Maps a key press to a screen command.
pub fn key_command(key: KeyEvent) -> ScreenCommand {
    if key.kind != KeyEventKind::Press {
        return ScreenCommand::Continue;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => ScreenCommand::Quit,
        KeyCode::Char('r') | KeyCode::Char(' ') => ScreenCommand::ToggleRecording,
        KeyCode::Enter => ScreenCommand::Play,
        KeyCode::Char('d') | KeyCode::Delete => ScreenCommand::Delete,
        KeyCode::Char('q') | KeyCode::Esc => ScreenCommand::Quit,
        KeyCode::Up | KeyCode::Char('k') => ScreenCommand::SelectPrevious,
        KeyCode::Down | KeyCode::Char('j') => ScreenCommand::SelectNext,
        _ => ScreenCommand::Continue,
    }
}

/// Remaining time as `m:ss`.
pub fn format_remaining(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// List date, e.g. `Oct 18, 3:04 PM`.
pub fn format_date(at: &DateTime<Local>) -> String {
    at.format("%b %-d, %-I:%M %p").to_string()
}

/// Human-readable payload size.
pub fn format_size(bytes: usize) -> String {
    match bytes {
        0..=1023 => format!("{bytes} B"),
        1024..=1_048_575 => format!("{:.1} KB", bytes as f64 / 1024.0),
        _ => format!("{:.1} MB", bytes as f64 / 1_048_576.0),
    }
}

/// Fraction of the recording window still left, for the countdown gauge.
pub fn countdown_ratio(remaining_seconds: u32) -> f64 {
    (remaining_seconds as f64 / MAX_RECORDING_SECS as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_command(press(KeyCode::Char('r'))), ScreenCommand::ToggleRecording);
        assert_eq!(key_command(press(KeyCode::Char(' '))), ScreenCommand::ToggleRecording);
        assert_eq!(key_command(press(KeyCode::Enter)), ScreenCommand::Play);
        assert_eq!(key_command(press(KeyCode::Delete)), ScreenCommand::Delete);
        assert_eq!(key_command(press(KeyCode::Esc)), ScreenCommand::Quit);
        assert_eq!(
            key_command(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            ScreenCommand::Quit
        );
        assert_eq!(key_command(press(KeyCode::Char('x'))), ScreenCommand::Continue);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut key = press(KeyCode::Char('r'));
        key.kind = KeyEventKind::Release;
        assert_eq!(key_command(key), ScreenCommand::Continue);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(180), "3:00");
        assert_eq!(format_remaining(59), "0:59");
        assert_eq!(format_remaining(0), "0:00");
    }

    #[test]
    fn test_format_date() {
        let at = Local.with_ymd_and_hms(2026, 10, 18, 15, 4, 0).unwrap();
        assert_eq!(format_date(&at), "Oct 18, 3:04 PM");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1_048_576), "3.0 MB");
    }

    #[test]
    fn test_countdown_ratio_bounds() {
        assert_eq!(countdown_ratio(MAX_RECORDING_SECS), 1.0);
        assert_eq!(countdown_ratio(0), 0.0);
        assert!((countdown_ratio(90) - 0.5).abs() < f64::EPSILON);
    }
}
