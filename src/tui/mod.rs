pub mod dispatch;
pub mod render;
pub mod state;

use crate::console::ConsoleState;
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use ratatui::prelude::*;
use state::ViewState;
use std::io::stdout;
use tokio::sync::{mpsc, watch};

/// Commands the TUI sends back to the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiCommand {
    Quit,
    CreateProject,
    RefreshProjects,
    RunProject(String),
    DeleteProject(String),
    FetchConfig,
    DraftPush(char),
    DraftPop,
}

/// Run the TUI until the user quits. Reads state from `state_rx`, sends
/// commands on `cmd_tx`.
///
/// Once raw mode is on, the terminal is handed back in its normal mode on
/// every exit path: a failed setup, a draw or input error, or a panic in
/// the loop.
pub async fn run_tui(
    state_rx: watch::Receiver<ConsoleState>,
    cmd_tx: mpsc::Sender<TuiCommand>,
    backend_url: &str,
) -> Result<()> {
    enable_raw_mode()?;
    let guard = TerminalGuard;
    let result = async move {
        stdout().execute(EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        tui_loop(&mut terminal, state_rx, cmd_tx, ViewState::new(backend_url)).await
    }
    .await;
    let restored = guard.restore();
    result.and(restored)
}

/// Leaves the alternate screen and raw mode when dropped. `restore` does the
/// same but reports failures.
struct TerminalGuard;

impl TerminalGuard {
    fn restore(self) -> Result<()> {
        std::mem::forget(self);
        restore_terminal()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal() {
            tracing::warn!(error = %e, "failed to restore terminal");
        }
    }
}

fn restore_terminal() -> Result<()> {
    // Both steps run even if the first fails
    let raw = disable_raw_mode();
    stdout().execute(LeaveAlternateScreen)?;
    raw?;
    Ok(())
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut state_rx: watch::Receiver<ConsoleState>,
    cmd_tx: mpsc::Sender<TuiCommand>,
    mut view: ViewState,
) -> Result<()> {
    let mut events = EventStream::new();
    loop {
        let state = state_rx.borrow_and_update().clone();
        view.clamp(state.projects.len());
        terminal.draw(|f| render::draw(f, &state, &view))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(cmd) = handle_key(&mut view, &state, key) {
                        let quit = cmd == TuiCommand::Quit;
                        if cmd_tx.send(cmd).await.is_err() || quit {
                            return Ok(());
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            changed = state_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

/// Map a key press to a command. Navigation and focus changes only touch `view`.
pub fn handle_key(view: &mut ViewState, state: &ConsoleState, key: KeyEvent) -> Option<TuiCommand> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(TuiCommand::Quit);
    }

    if view.editing {
        return match key.code {
            KeyCode::Enter => {
                view.editing = false;
                Some(TuiCommand::CreateProject)
            }
            KeyCode::Esc => {
                view.editing = false;
                None
            }
            KeyCode::Backspace => Some(TuiCommand::DraftPop),
            KeyCode::Char(c) => Some(TuiCommand::DraftPush(c)),
            _ => None,
        };
    }

    let selected_id = view.selected_project(state).map(|p| p.id.clone());
    match key.code {
        KeyCode::Char('q') => Some(TuiCommand::Quit),
        KeyCode::Char('i') | KeyCode::Char('n') => {
            view.editing = true;
            None
        }
        KeyCode::Char('r') | KeyCode::Enter => selected_id.map(TuiCommand::RunProject),
        KeyCode::Char('d') => selected_id.map(TuiCommand::DeleteProject),
        KeyCode::Char('l') | KeyCode::F(5) => Some(TuiCommand::RefreshProjects),
        KeyCode::Char('c') => Some(TuiCommand::FetchConfig),
        KeyCode::Down | KeyCode::Char('j') => {
            view.select_next(state.projects.len());
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view.select_prev();
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Project;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_with(names: &[&str]) -> ConsoleState {
        let mut state = ConsoleState::new();
        for (i, name) in names.iter().enumerate() {
            state.projects.push(Project {
                id: format!("id-{}", i + 1),
                name: name.to_string(),
            });
        }
        state
    }

    #[test]
    fn test_draft_mode_keys() {
        let state = ConsoleState::new();
        let mut view = ViewState::new("x");
        assert_eq!(handle_key(&mut view, &state, press(KeyCode::Char('i'))), None);
        assert!(view.editing);
        // 'q' is text while editing
        assert_eq!(
            handle_key(&mut view, &state, press(KeyCode::Char('q'))),
            Some(TuiCommand::DraftPush('q'))
        );
        assert_eq!(
            handle_key(&mut view, &state, press(KeyCode::Backspace)),
            Some(TuiCommand::DraftPop)
        );
        assert_eq!(
            handle_key(&mut view, &state, press(KeyCode::Enter)),
            Some(TuiCommand::CreateProject)
        );
        assert!(!view.editing);
    }

    #[test]
    fn test_escape_leaves_draft_mode() {
        let state = ConsoleState::new();
        let mut view = ViewState::new("x");
        view.editing = true;
        assert_eq!(handle_key(&mut view, &state, press(KeyCode::Esc)), None);
        assert!(!view.editing);
    }

    #[test]
    fn test_run_and_delete_target_selection() {
        let state = state_with(&["Alpha", "Beta"]);
        let mut view = ViewState::new("x");
        handle_key(&mut view, &state, press(KeyCode::Down));
        assert_eq!(
            handle_key(&mut view, &state, press(KeyCode::Char('r'))),
            Some(TuiCommand::RunProject("id-2".into()))
        );
        handle_key(&mut view, &state, press(KeyCode::Char('k')));
        assert_eq!(
            handle_key(&mut view, &state, press(KeyCode::Char('d'))),
            Some(TuiCommand::DeleteProject("id-1".into()))
        );
    }

    #[test]
    fn test_run_without_projects_is_noop() {
        let state = ConsoleState::new();
        let mut view = ViewState::new("x");
        assert_eq!(handle_key(&mut view, &state, press(KeyCode::Enter)), None);
        assert_eq!(handle_key(&mut view, &state, press(KeyCode::Char('d'))), None);
    }

    #[test]
    fn test_refresh_config_and_quit() {
        let state = ConsoleState::new();
        let mut view = ViewState::new("x");
        assert_eq!(
            handle_key(&mut view, &state, press(KeyCode::F(5))),
            Some(TuiCommand::RefreshProjects)
        );
        assert_eq!(
            handle_key(&mut view, &state, press(KeyCode::Char('c'))),
            Some(TuiCommand::FetchConfig)
        );
        assert_eq!(
            handle_key(&mut view, &state, press(KeyCode::Char('q'))),
            Some(TuiCommand::Quit)
        );
        view.editing = true;
        assert_eq!(
            handle_key(
                &mut view,
                &state,
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            Some(TuiCommand::Quit)
        );
    }
}
