use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use match_feed::client::FeedSource;
use match_feed::poller::{MatchFeedPoller, PollerStatus};
use match_feed::{Match, Snapshot};
use tokio::sync::watch;

pub type FeedPoller = MatchFeedPoller<FeedSource>;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Live,
    Upcoming,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings, source_label: String) -> Self {
        let app = Self {
            state: AppState::new(source_label),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Poller updates, applied from main_ui_loop
    // -----------------------------------------------------------------------

    /// Subscribe to the poller and apply what it already holds. A refresh
    /// that completes before the receivers are first polled is still shown.
    pub fn attach(
        &mut self,
        poller: &FeedPoller,
    ) -> (watch::Receiver<Snapshot>, watch::Receiver<PollerStatus>) {
        let snapshots = poller.subscribe();
        let statuses = poller.subscribe_status();
        self.on_snapshot(snapshots.borrow().clone());
        self.on_status(statuses.borrow().clone());
        (snapshots, statuses)
    }

    pub fn on_snapshot(&mut self, snapshot: Snapshot) {
        self.state.feed.snapshot = snapshot;
        self.state.clamp_selections();
    }

    pub fn on_status(&mut self, status: PollerStatus) {
        self.state.feed.status = status;
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    /// Live ⇄ Upcoming; from Help, return to the previous tab.
    pub fn toggle_tab(&mut self) {
        match self.state.active_tab {
            MenuItem::Live => self.update_tab(MenuItem::Upcoming),
            MenuItem::Upcoming => self.update_tab(MenuItem::Live),
            MenuItem::Help => self.exit_help(),
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Match list navigation
    // -----------------------------------------------------------------------

    pub fn select_next(&mut self) {
        let tab = self.state.active_tab;
        let len = self.state.feed.view(tab).len();
        if let Some(list) = self.state.list_mut(tab) {
            list.next(len);
        }
    }

    pub fn select_prev(&mut self) {
        let tab = self.state.active_tab;
        if let Some(list) = self.state.list_mut(tab) {
            list.prev();
        }
    }

    pub fn cycle_sport_filter(&mut self) {
        self.state.feed.cycle_sport_filter();
        self.state.clamp_selections();
    }

    pub fn visible_matches(&self) -> Vec<&Match> {
        self.state.feed.view(self.state.active_tab)
    }

    pub fn selected_index(&self) -> usize {
        self.state
            .list(self.state.active_tab)
            .map(|l| l.selected)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use match_feed::Odds;
    use match_feed::sample::SampleFeed;
    use std::time::Duration;

    fn game(id: i64, is_live: bool) -> Match {
        Match {
            id,
            sport: if id % 2 == 0 { "🏀".into() } else { "⚽".into() },
            league: "L".into(),
            team1: "A".into(),
            team2: "B".into(),
            score1: None,
            score2: None,
            time: "20:00".into(),
            is_live,
            odds: Odds { win1: 2.0, draw: None, win2: 2.0 },
        }
    }

    fn app() -> App {
        App::new(AppSettings::default(), "test".into())
    }

    fn sample_poller() -> FeedPoller {
        MatchFeedPoller::new(FeedSource::Sample(SampleFeed::embedded()))
    }

    #[tokio::test]
    async fn attach_picks_up_a_refresh_that_already_landed() {
        let poller = sample_poller();
        poller.refresh().await;

        let mut app = app();
        let (snapshots, statuses) = app.attach(&poller);
        assert_eq!(app.state.feed.live_count(), 3);
        assert_eq!(app.state.feed.upcoming_count(), 2);
        assert_eq!(app.state.feed.status.successes, 1);
        assert!(!snapshots.has_changed().unwrap());
        assert!(!statuses.has_changed().unwrap());
    }

    #[tokio::test]
    async fn attach_before_start_sees_the_first_refresh() {
        let poller = sample_poller();
        let mut app = app();
        let (mut snapshots, _statuses) = app.attach(&poller);
        assert!(app.state.feed.snapshot.fetched_at().is_none());

        poller.start(Duration::from_secs(30));
        tokio::time::timeout(Duration::from_secs(5), snapshots.changed())
            .await
            .expect("first refresh should be published")
            .unwrap();
        app.on_snapshot(snapshots.borrow_and_update().clone());
        assert_eq!(app.state.feed.live_count(), 3);
        poller.stop();
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app();
        app.update_tab(MenuItem::Upcoming);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Upcoming);
    }

    #[test]
    fn toggle_tab_switches_between_views() {
        let mut app = app();
        app.toggle_tab();
        assert_eq!(app.state.active_tab, MenuItem::Upcoming);
        app.toggle_tab();
        assert_eq!(app.state.active_tab, MenuItem::Live);
    }

    #[test]
    fn selection_is_per_tab_and_survives_refresh() {
        let mut app = app();
        app.on_snapshot(Snapshot::new(
            vec![game(1, true), game(2, true), game(3, false)],
            Utc::now(),
        ));

        app.select_next();
        app.select_next();
        assert_eq!(app.selected_index(), 1);

        app.update_tab(MenuItem::Upcoming);
        assert_eq!(app.selected_index(), 0);

        app.on_snapshot(Snapshot::new(vec![game(1, true), game(5, true)], Utc::now()));
        app.update_tab(MenuItem::Live);
        assert_eq!(app.selected_index(), 1);
        assert!(app.state.feed.view(MenuItem::Upcoming).is_empty());
    }

    #[test]
    fn sport_filter_reclamps_selection() {
        let mut app = app();
        app.on_snapshot(Snapshot::new(
            vec![game(1, true), game(2, true), game(3, true)],
            Utc::now(),
        ));
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_index(), 2);

        // ⚽ first in sport order; the list shrinks to ids 1 and 3.
        app.cycle_sport_filter();
        assert_eq!(app.visible_matches().len(), 2);
        assert_eq!(app.selected_index(), 1);
    }
}
