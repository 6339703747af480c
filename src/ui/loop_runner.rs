//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background write outcomes and shutdown
//! signals.

use std::io::{self, Stdout};

use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::session::Session;
use crate::sync::SyncEvent;

use super::events::describe_sync_event;
use super::input::{handle_key, InputState};
use super::render::render;

/// Result of handling one key press or command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep reading input.
    Continue,
    /// Leave the loop. The caller shuts the session down.
    Quit,
}

/// Runs the TUI until `quit`, Ctrl-C, end of input, or a signal.
///
/// Uses `tokio::select!` over:
/// - **Signals**: SIGTERM / SIGINT end the loop like `quit`
/// - **Terminal input**: key presses from crossterm's async event stream
/// - **Write outcomes**: failed saves replace the message line as they arrive
///
/// # Panic Safety
///
/// Installs a panic hook that restores the terminal before unwinding.
pub async fn run(session: &mut Session, events: &mut mpsc::Receiver<SyncEvent>) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut state = InputState::default();
    state.set_message("Type `help` for commands, `edit` to change the page.");
    let mut needs_redraw = true;

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        if needs_redraw {
            terminal.draw(|f| render(f, session.app(), &state))?;
            needs_redraw = false;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down");
                break;
            }

            Some(event) = events.recv() => {
                if let Some(text) = describe_sync_event(&event) {
                    state.set_message(text);
                    needs_redraw = true;
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        needs_redraw = true;
                        if handle_key(session, &mut state, key.code, key.modifiers).await
                            == Action::Quit
                        {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(..))) => needs_redraw = true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Terminal input failed");
                        break;
                    }
                    None => {
                        tracing::debug!("End of input");
                        break;
                    }
                }
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
