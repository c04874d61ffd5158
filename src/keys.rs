use crate::app::{App, FeedPoller, MenuItem};
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    poller: &Arc<FeedPoller>,
) -> KeyOutcome {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => return KeyOutcome::Quit,

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Live),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Upcoming),
        (_, KeyCode::Tab, _) => guard.toggle_tab(),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Match list navigation
        (MenuItem::Live | MenuItem::Upcoming, Char('j') | KeyCode::Down, _) => guard.select_next(),
        (MenuItem::Live | MenuItem::Upcoming, Char('k') | KeyCode::Up, _) => guard.select_prev(),
        (MenuItem::Live | MenuItem::Upcoming, Char('s'), _) => guard.cycle_sport_filter(),

        // Manual refresh; runs alongside the schedule and is skipped if one is in flight.
        (_, Char('r'), _) => {
            drop(guard);
            info!("manual refresh requested");
            let poller = Arc::clone(poller);
            tokio::spawn(async move {
                poller.refresh().await;
            });
            return KeyOutcome::Continue;
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    KeyOutcome::Continue
}
