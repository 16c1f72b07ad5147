//! Runtime: terminal lifecycle and the blocking event loop for a form.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Block on `crossterm::event::read()` and route events to [`FormState`].
//! - Hand confirm and cancel to the [`FormCallbacks`] and honor their decision.
//!
//! The loop redraws after every event that can change what is on screen.
use std::io::Stdout;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use garg_engine::{ConfirmDecision, FormCallbacks};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::form::{FormAction, FormState, Severity};
use crate::theme::Theme;
use crate::view;

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Shows `state` until a confirm is accepted or the form is cancelled.
///
/// The terminal is restored even when the loop fails; the loop's error wins
/// over a cleanup error.
pub fn run_form(state: &mut FormState, theme: &dyn Theme, callbacks: &mut dyn FormCallbacks) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, state, theme, callbacks);
    let cleanup = cleanup_terminal(&mut terminal);
    result.and(cleanup)
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut FormState,
    theme: &dyn Theme,
    callbacks: &mut dyn FormCallbacks,
) -> Result<()> {
    terminal.draw(|frame| view::render(frame, frame.area(), state, theme))?;
    loop {
        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => state.handle_key(key),
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Moved => continue,
            Event::Mouse(mouse) => state.handle_mouse(mouse),
            Event::Resize(..) => FormAction::None,
            _ => continue,
        };
        if dispatch(action, state, callbacks) {
            return Ok(());
        }
        terminal.draw(|frame| view::render(frame, frame.area(), state, theme))?;
    }
}

/// Applies a form action. Returns true when the form should close.
pub(crate) fn dispatch(action: FormAction, state: &mut FormState, callbacks: &mut dyn FormCallbacks) -> bool {
    match action {
        FormAction::None => false,
        FormAction::Confirm => match callbacks.on_confirm(&*state) {
            ConfirmDecision::Close => true,
            ConfirmDecision::KeepOpen { message } => {
                debug!(%message, "confirm rejected, keeping form open");
                state.set_message(Severity::Error, message);
                false
            }
        },
        FormAction::Cancel => {
            callbacks.on_cancel();
            true
        }
    }
}
