//! Interactive dashboard on top of the controller.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rmg_dashboard::view::{self, ViewState};
use rmg_dashboard::{Command, Dashboard, DashboardHandle, DashboardState, Phase, SourceFilter};
use tracing::info;
use tui::{backend::CrosstermBackend, Terminal};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq)]
enum Action {
    Send(Command),
    Quit,
    None,
}

/// Translate a key press into a controller command, updating UI-local
/// state (search input, selection) along the way.
fn on_key(key: KeyEvent, state: &DashboardState, view: &mut ViewState) -> Action {
    if let Some(input) = view.editing.as_mut() {
        return match key.code {
            KeyCode::Enter => {
                let query = input.clone();
                view.editing = None;
                view.selected = 0;
                Action::Send(Command::Search(query))
            }
            KeyCode::Esc => {
                view.editing = None;
                Action::None
            }
            KeyCode::Backspace => {
                input.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                input.push(c);
                Action::None
            }
            _ => Action::None,
        };
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') if state.phase == Phase::Unavailable => Action::Send(Command::Retry),
        KeyCode::Char('r') => {
            view.selected = 0;
            Action::Send(Command::GoToPage(state.current_page))
        }
        KeyCode::Char('f') => {
            view.selected = 0;
            Action::Send(Command::FetchNews)
        }
        KeyCode::Char('/') => {
            view.editing = Some(state.query.clone());
            Action::None
        }
        KeyCode::Char('n') | KeyCode::PageDown => {
            view.selected = 0;
            Action::Send(Command::NextPage)
        }
        KeyCode::Char('p') | KeyCode::PageUp => {
            view.selected = 0;
            Action::Send(Command::PrevPage)
        }
        KeyCode::Right | KeyCode::Tab => {
            view.selected = 0;
            Action::Send(Command::SelectSource(cycle_source(state, 1)))
        }
        KeyCode::Left | KeyCode::BackTab => {
            view.selected = 0;
            Action::Send(Command::SelectSource(cycle_source(state, -1)))
        }
        KeyCode::Down => {
            if view.selected + 1 < state.articles.len() {
                view.selected += 1;
            }
            Action::None
        }
        KeyCode::Up => {
            view.selected = view.selected.saturating_sub(1);
            Action::None
        }
        _ => Action::None,
    }
}

fn cycle_source(state: &DashboardState, step: isize) -> SourceFilter {
    let tabs = state.source_tabs();
    let len = tabs.len() as isize;
    let next = (state.selected_tab() as isize + step).rem_euclid(len);
    tabs[next as usize].clone()
}

pub async fn run(dashboard: Dashboard) -> anyhow::Result<()> {
    let handle = rmg_dashboard::spawn(dashboard);
    handle.send(Command::Initialize).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &handle);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    handle.shutdown().await;
    info!("Dashboard closed");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: &DashboardHandle,
) -> anyhow::Result<()> {
    let mut view = ViewState::default();
    loop {
        let state = handle.state();
        terminal.draw(|frame| view::render(frame, &state, &view))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match on_key(key, &state, &mut view) {
                Action::Quit => return Ok(()),
                Action::Send(command) => {
                    if !handle.try_send(command) {
                        tracing::warn!("Dashboard busy, key press dropped");
                    }
                }
                Action::None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmg_core::Source;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ready() -> DashboardState {
        let mut state = DashboardState {
            phase: Phase::Ready,
            ..Default::default()
        };
        for id in ["bgmea", "textiletoday"] {
            state.sources.insert(
                id.to_string(),
                Source {
                    name: id.to_uppercase(),
                    url: format!("https://{}.example/news", id),
                    base_url: format!("https://{}.example", id),
                },
            );
        }
        state
    }

    #[test]
    fn test_search_input_submits_on_enter() {
        let state = ready();
        let mut view = ViewState::default();
        assert_eq!(on_key(key(KeyCode::Char('/')), &state, &mut view), Action::None);
        for c in "knit".chars() {
            on_key(key(KeyCode::Char(c)), &state, &mut view);
        }
        // 'q' is text while editing
        on_key(key(KeyCode::Char('q')), &state, &mut view);
        on_key(key(KeyCode::Backspace), &state, &mut view);
        assert_eq!(view.editing.as_deref(), Some("knit"));
        assert_eq!(
            on_key(key(KeyCode::Enter), &state, &mut view),
            Action::Send(Command::Search("knit".to_string()))
        );
        assert!(view.editing.is_none());
    }

    #[test]
    fn test_escape_cancels_search_before_quitting() {
        let state = ready();
        let mut view = ViewState::default();
        on_key(key(KeyCode::Char('/')), &state, &mut view);
        assert_eq!(on_key(key(KeyCode::Esc), &state, &mut view), Action::None);
        assert_eq!(on_key(key(KeyCode::Esc), &state, &mut view), Action::Quit);
    }

    #[test]
    fn test_source_tabs_wrap_around() {
        let mut state = ready();
        let mut view = ViewState::default();
        assert_eq!(
            on_key(key(KeyCode::Left), &state, &mut view),
            Action::Send(Command::SelectSource(SourceFilter::Source("textiletoday".to_string())))
        );
        state.source = SourceFilter::Source("textiletoday".to_string());
        assert_eq!(
            on_key(key(KeyCode::Right), &state, &mut view),
            Action::Send(Command::SelectSource(SourceFilter::All))
        );
    }

    #[test]
    fn test_retry_only_when_unavailable() {
        let mut state = ready();
        let mut view = ViewState::default();
        state.current_page = 2;
        assert_eq!(
            on_key(key(KeyCode::Char('r')), &state, &mut view),
            Action::Send(Command::GoToPage(2))
        );
        state.phase = Phase::Unavailable;
        assert_eq!(
            on_key(key(KeyCode::Char('r')), &state, &mut view),
            Action::Send(Command::Retry)
        );
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let state = ready();
        let mut view = ViewState::default();
        on_key(key(KeyCode::Down), &state, &mut view);
        assert_eq!(view.selected, 0);
        on_key(key(KeyCode::Up), &state, &mut view);
        assert_eq!(view.selected, 0);
    }
}
