// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, application events)
// - Rendering the UI
// - Routing keystrokes into the chat composer or the focused surface
//   component

pub mod app;
pub mod clipboard;
pub mod ui;

use crate::config::Config;
use crate::events::{AppEvent, ClientCommand};
use crate::logging::LogBuffer;
use crate::SharedStores;
use anyhow::{Context, Result};
use app::{App, Focus, InputEdit};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal when
/// done. The loop multiplexes keyboard input, timer ticks, and application
/// events from the transport task.
pub async fn run_tui(
    config: Config,
    session_id: String,
    stores: SharedStores,
    command_tx: mpsc::Sender<ClientCommand>,
    mut event_rx: mpsc::Receiver<AppEvent>,
    log_buffer: LogBuffer,
) -> Result<()> {
    // Set up terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(session_id, stores, command_tx, log_buffer);
    let log_pane_enabled = config.features.log_pane;

    // Run the event loop
    let result = run_event_loop(&mut terminal, &mut app, &mut event_rx, log_pane_enabled).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// tokio::select! waits on keyboard input, the application event channel,
/// and a redraw tick simultaneously, responding to whichever fires first.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::Receiver<AppEvent>,
    log_pane_enabled: bool,
) -> Result<()> {
    // Ticker for periodic redraws (spinner, cooldown re-arming)
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard input
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event, log_pane_enabled);
                    }
                }
            } => {}

            // Application events from the transport task
            Some(event) = event_rx.recv() => {
                app.handle_event(event);
            }

            // Timer tick
            _ = tick_interval.tick() => {
                app.on_tick();
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Route one key press to the focused pane
fn handle_key_event(app: &mut App, key: KeyEvent, log_pane_enabled: bool) {
    // Terminals send Release events on some platforms; act on Press only
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Global chords work regardless of focus
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('l') if log_pane_enabled => {
                app.show_logs = !app.show_logs;
                return;
            }
            _ => {}
        }
    }

    match app.focus {
        Focus::Composer => handle_composer_key(app, key),
        Focus::Surface => handle_surface_key(app, key),
    }
}

fn handle_composer_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_composer(),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Tab => {
            // Jump into the surface if it has anything to interact with
            app.refresh_interactive();
            if !app.interactive.is_empty() {
                app.focus = Focus::Surface;
            }
        }
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
}

fn handle_surface_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.focus = Focus::Composer,
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),
        KeyCode::Up => app.move_select_cursor(-1),
        KeyCode::Down => app.move_select_cursor(1),
        KeyCode::Enter => app.activate_focused(),
        KeyCode::Backspace => app.edit_focused_input(InputEdit::Backspace),
        KeyCode::Char(c) => app.surface_char(c),
        _ => {}
    }
}
