//! Full-screen error display for failures that stop a command before it starts.
//!
//! Operation errors inside the memo screen go to its status line instead.

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

const ERROR_BG: Color = Color::Rgb(239, 68, 68);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Red full-screen message, dismissed with any key.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(ErrorScreen { terminal })
    }

    /// Shows `title`, the error `message`, and a `hint`, then waits for a key.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, title: &str, message: &str, hint: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                let style = Style::default().fg(ERROR_FG).bg(ERROR_BG);
                frame.render_widget(Paragraph::new("").style(style), area);

                let text = vec![
                    Line::styled(title, style.add_modifier(Modifier::BOLD)),
                    Line::raw(""),
                    Line::raw(message),
                    Line::raw(""),
                    Line::styled(hint, style.add_modifier(Modifier::ITALIC)),
                ];

                let [_, body, _] = Layout::horizontal([
                    Constraint::Percentage(10),
                    Constraint::Percentage(80),
                    Constraint::Percentage(10),
                ])
                .areas(area);
                let [_, centered] =
                    Layout::vertical([Constraint::Percentage(40), Constraint::Min(0)]).areas(body);

                let paragraph = Paragraph::new(text)
                    .style(style)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, centered);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Opens an error screen, shows the message, and restores the terminal.
///
/// Falls back to stderr if the terminal cannot be taken over.
pub fn show_fatal(title: &str, message: &str, hint: &str) {
    let shown = ErrorScreen::new().and_then(|mut screen| {
        screen.show_error(title, message, hint)?;
        screen.cleanup()
    });

    if let Err(e) = shown {
        tracing::warn!("Error screen unavailable: {}", e);
        eprintln!("{title}: {message}\n{hint}");
    }
}
