use crate::app::MenuItem;
use match_feed::poller::PollerStatus;
use match_feed::{Match, Snapshot, Sport};

// ---------------------------------------------------------------------------
// Per-tab list state
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
pub struct ListState {
    pub selected: usize,
}

impl ListState {
    pub fn next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selection inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Feed state as last published by the poller
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FeedState {
    pub snapshot: Snapshot,
    pub status: PollerStatus,
    /// Where the matches come from, e.g. the feed URL.
    pub source_label: String,
    /// `None` shows every sport.
    pub sport_filter: Option<Sport>,
}

impl FeedState {
    pub fn view(&self, tab: MenuItem) -> Vec<&Match> {
        let in_filter = |m: &&Match| self.sport_filter.is_none_or(|s| m.sport_kind() == s);
        match tab {
            MenuItem::Live => self.snapshot.live().filter(in_filter).collect(),
            MenuItem::Upcoming => self.snapshot.upcoming().filter(in_filter).collect(),
            MenuItem::Help => Vec::new(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.snapshot.live().count()
    }

    pub fn upcoming_count(&self) -> usize {
        self.snapshot.upcoming().count()
    }

    /// Sports present in the snapshot, in a stable order.
    pub fn sports_present(&self) -> Vec<Sport> {
        Sport::ALL
            .into_iter()
            .filter(|s| self.snapshot.matches().iter().any(|m| m.sport_kind() == *s))
            .collect()
    }

    /// All → each sport present → All.
    pub fn cycle_sport_filter(&mut self) {
        let sports = self.sports_present();
        self.sport_filter = match self.sport_filter {
            None => sports.first().copied(),
            Some(current) => sports
                .iter()
                .position(|s| *s == current)
                .and_then(|i| sports.get(i + 1))
                .copied(),
        };
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub feed: FeedState,
    pub live_list: ListState,
    pub upcoming_list: ListState,
}

impl AppState {
    pub fn new(source_label: String) -> Self {
        Self {
            feed: FeedState {
                source_label,
                ..FeedState::default()
            },
            ..Self::default()
        }
    }

    pub fn list_mut(&mut self, tab: MenuItem) -> Option<&mut ListState> {
        match tab {
            MenuItem::Live => Some(&mut self.live_list),
            MenuItem::Upcoming => Some(&mut self.upcoming_list),
            MenuItem::Help => None,
        }
    }

    pub fn list(&self, tab: MenuItem) -> Option<ListState> {
        match tab {
            MenuItem::Live => Some(self.live_list),
            MenuItem::Upcoming => Some(self.upcoming_list),
            MenuItem::Help => None,
        }
    }

    /// Re-clamp both selections after the visible lists changed.
    pub fn clamp_selections(&mut self) {
        let live = self.feed.view(MenuItem::Live).len();
        let upcoming = self.feed.view(MenuItem::Upcoming).len();
        self.live_list.clamp(live);
        self.upcoming_list.clamp(upcoming);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use match_feed::Odds;

    fn game(id: i64, sport: &str, is_live: bool) -> Match {
        Match {
            id,
            sport: sport.into(),
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

    fn state_with(matches: Vec<Match>) -> AppState {
        let mut state = AppState::new("test".into());
        state.feed.snapshot = Snapshot::new(matches, Utc::now());
        state
    }

    #[test]
    fn views_follow_tab_and_sport_filter() {
        let mut state = state_with(vec![
            game(1, "⚽", true),
            game(2, "🏀", true),
            game(3, "⚽", false),
        ]);
        let ids = |v: Vec<&Match>| v.iter().map(|m| m.id).collect::<Vec<_>>();

        assert_eq!(ids(state.feed.view(MenuItem::Live)), vec![1, 2]);
        assert_eq!(ids(state.feed.view(MenuItem::Upcoming)), vec![3]);

        state.feed.sport_filter = Some(Sport::Basketball);
        assert_eq!(ids(state.feed.view(MenuItem::Live)), vec![2]);
        assert!(state.feed.view(MenuItem::Upcoming).is_empty());
        assert!(state.feed.view(MenuItem::Help).is_empty());
    }

    #[test]
    fn sport_filter_cycles_through_present_sports() {
        let mut state = state_with(vec![game(1, "🏒", false), game(2, "⚽", true), game(3, "🏒", true)]);
        assert_eq!(state.feed.sports_present(), vec![Sport::Soccer, Sport::IceHockey]);

        state.feed.cycle_sport_filter();
        assert_eq!(state.feed.sport_filter, Some(Sport::Soccer));
        state.feed.cycle_sport_filter();
        assert_eq!(state.feed.sport_filter, Some(Sport::IceHockey));
        state.feed.cycle_sport_filter();
        assert_eq!(state.feed.sport_filter, None);
    }

    #[test]
    fn stale_filter_resets_to_all() {
        let mut state = state_with(vec![game(1, "⚽", true)]);
        state.feed.sport_filter = Some(Sport::Tennis);
        state.feed.cycle_sport_filter();
        assert_eq!(state.feed.sport_filter, None);
    }

    #[test]
    fn selection_is_clamped_when_list_shrinks() {
        let mut state = state_with(vec![game(1, "⚽", true), game(2, "⚽", true), game(3, "⚽", true)]);
        state.live_list.selected = 2;
        state.feed.snapshot = Snapshot::new(vec![game(1, "⚽", true)], Utc::now());
        state.clamp_selections();
        assert_eq!(state.live_list.selected, 0);
    }

    #[test]
    fn list_navigation_stays_in_bounds() {
        let mut list = ListState::default();
        list.prev();
        assert_eq!(list.selected, 0);
        list.next(2);
        list.next(2);
        assert_eq!(list.selected, 1);
        list.clamp(0);
        assert_eq!(list.selected, 0);
    }
}
