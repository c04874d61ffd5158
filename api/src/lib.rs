pub mod client;
pub mod odds_api;
pub mod poller;
pub mod sample;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Domain types shared by the feed wire format and the UI
// ---------------------------------------------------------------------------

/// One sporting event as published by the match feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: i64,
    #[serde(default)]
    pub sport: String, // symbol key, "⚽" / "🏀" / ...
    #[serde(default)]
    pub league: String, // "Premier League", "NBA"
    #[serde(default)]
    pub team1: String,
    #[serde(default)]
    pub team2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score2: Option<u32>,
    /// Free-form label: "67'", "Q3 8:45", "Today 22:00". Not a timestamp.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub is_live: bool,
    pub odds: Odds,
}

impl Match {
    /// Score pair, only when both sides are present.
    pub fn score(&self) -> Option<(u32, u32)> {
        self.score1.zip(self.score2)
    }

    pub fn sport_kind(&self) -> Sport {
        Sport::from_symbol(&self.sport)
    }
}

/// Decimal odds. `draw` is absent for two-outcome sports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    pub win1: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<f64>,
    pub win2: f64,
}

/// Body of the match-feed endpoint. Everything but `matches` is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPayload {
    #[serde(default)]
    pub matches: Option<Vec<Match>>,
}

impl FeedPayload {
    pub fn into_matches(self) -> Vec<Match> {
        self.matches.unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Sport classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Sport {
    #[default]
    Soccer,
    Basketball,
    AmericanFootball,
    Baseball,
    IceHockey,
    Tennis,
    Cricket,
    Rugby,
    Other,
}

impl Sport {
    pub const ALL: [Sport; 9] = [
        Sport::Soccer,
        Sport::Basketball,
        Sport::AmericanFootball,
        Sport::Baseball,
        Sport::IceHockey,
        Sport::Tennis,
        Sport::Cricket,
        Sport::Rugby,
        Sport::Other,
    ];

    pub fn from_symbol(symbol: &str) -> Self {
        // Feeds sometimes append the emoji presentation selector.
        match symbol.trim().trim_end_matches('\u{fe0f}') {
            "⚽" => Sport::Soccer,
            "🏀" => Sport::Basketball,
            "🏈" => Sport::AmericanFootball,
            "⚾" => Sport::Baseball,
            "🏒" => Sport::IceHockey,
            "🎾" => Sport::Tennis,
            "🏏" => Sport::Cricket,
            "🏉" => Sport::Rugby,
            _ => Sport::Other,
        }
    }

    /// Classify an Odds API `sport_key` ("soccer_epl", "icehockey_nhl").
    /// Unknown keys fall back to soccer, which is what the feed backend does.
    pub fn from_sport_key(key: &str) -> Self {
        const KEYS: [(&str, Sport); 8] = [
            ("soccer", Sport::Soccer),
            ("basketball", Sport::Basketball),
            ("americanfootball", Sport::AmericanFootball),
            ("baseball", Sport::Baseball),
            ("icehockey", Sport::IceHockey),
            ("tennis", Sport::Tennis),
            ("cricket", Sport::Cricket),
            ("rugbyleague", Sport::Rugby),
        ];
        let key = key.to_lowercase();
        KEYS.iter()
            .find(|(k, _)| key.contains(k))
            .map(|(_, sport)| *sport)
            .unwrap_or(Sport::Soccer)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Sport::Soccer => "⚽",
            Sport::Basketball => "🏀",
            Sport::AmericanFootball => "🏈",
            Sport::Baseball => "⚾",
            Sport::IceHockey => "🏒",
            Sport::Tennis => "🎾",
            Sport::Cricket => "🏏",
            Sport::Rugby => "🏉",
            Sport::Other => "•",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sport::Soccer => "Football",
            Sport::Basketball => "Basketball",
            Sport::AmericanFootball => "American Football",
            Sport::Baseball => "Baseball",
            Sport::IceHockey => "Hockey",
            Sport::Tennis => "Tennis",
            Sport::Cricket => "Cricket",
            Sport::Rugby => "Rugby",
            Sport::Other => "Other",
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot: the current match list, replaced whole on every refresh
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    matches: Arc<[Match]>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(matches: Vec<Match>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            matches: matches.into(),
            fetched_at: Some(fetched_at),
        }
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// `None` until the first successful refresh.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn live(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| m.is_live)
    }

    pub fn upcoming(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| !m.is_live)
    }

    /// True when both snapshots share the same backing list.
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.matches, &other.matches)
    }
}

/// Split matches into (live, upcoming), preserving arrival order in each.
pub fn partition(matches: &[Match]) -> (Vec<Match>, Vec<Match>) {
    matches.iter().cloned().partition(|m| m.is_live)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64, is_live: bool) -> Match {
        Match {
            id,
            sport: "⚽".into(),
            league: "Premier League".into(),
            team1: "Home".into(),
            team2: "Away".into(),
            score1: is_live.then_some(1),
            score2: is_live.then_some(0),
            time: if is_live { "12'".into() } else { "Today 20:00".into() },
            is_live,
            odds: Odds { win1: 1.9, draw: Some(3.3), win2: 4.0 },
        }
    }

    #[test]
    fn match_deserializes_camel_case_and_optional_fields() {
        let raw = r#"{
            "id": 2, "sport": "🏀", "league": "NBA",
            "team1": "Lakers", "team2": "Warriors",
            "time": "Q3 8:45", "isLive": true,
            "score1": 88, "score2": 92,
            "odds": {"win1": 2.1, "win2": 1.7},
            "unknown": "ignored"
        }"#;
        let m: Match = serde_json::from_str(raw).unwrap();
        assert!(m.is_live);
        assert_eq!(m.score(), Some((88, 92)));
        assert_eq!(m.odds.draw, None);
        assert_eq!(m.sport_kind(), Sport::Basketball);
    }

    #[test]
    fn minimal_record_needs_only_id_and_odds() {
        let m: Match =
            serde_json::from_str(r#"{"id": 7, "odds": {"win1": 2.0, "draw": 3.0, "win2": 3.5}}"#)
                .unwrap();
        assert_eq!(m.id, 7);
        assert!(!m.is_live);
        assert_eq!(m.odds.draw, Some(3.0));
        assert!(m.team1.is_empty());
    }

    #[test]
    fn score_requires_both_sides() {
        let mut m = sample(1, true);
        m.score2 = None;
        assert_eq!(m.score(), None);
    }

    #[test]
    fn payload_without_matches_is_empty() {
        let payload: FeedPayload = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(payload.into_matches().is_empty());

        let payload: FeedPayload = serde_json::from_str(r#"{"matches": null}"#).unwrap();
        assert!(payload.into_matches().is_empty());
    }

    #[test]
    fn partition_is_exact_and_disjoint() {
        let all = vec![sample(1, true), sample(2, false), sample(3, true), sample(4, false)];
        let (live, upcoming) = partition(&all);

        assert!(live.iter().all(|m| m.is_live));
        assert!(upcoming.iter().all(|m| !m.is_live));
        assert_eq!(live.len() + upcoming.len(), all.len());
        assert_eq!(live.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(upcoming.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn snapshot_views_match_partition() {
        let snapshot = Snapshot::new(vec![sample(1, true), sample(2, false)], Utc::now());
        let live: Vec<i64> = snapshot.live().map(|m| m.id).collect();
        let upcoming: Vec<i64> = snapshot.upcoming().map(|m| m.id).collect();
        assert_eq!(live, vec![1]);
        assert_eq!(upcoming, vec![2]);
        assert!(snapshot.fetched_at().is_some());
        assert!(Snapshot::default().fetched_at().is_none());
    }

    #[test]
    fn sport_key_classification() {
        assert_eq!(Sport::from_sport_key("soccer_epl"), Sport::Soccer);
        assert_eq!(Sport::from_sport_key("icehockey_nhl"), Sport::IceHockey);
        assert_eq!(Sport::from_sport_key("americanfootball_nfl"), Sport::AmericanFootball);
        assert_eq!(Sport::from_sport_key("rugbyleague_nrl"), Sport::Rugby);
        assert_eq!(Sport::from_sport_key("mma_mixed_martial_arts"), Sport::Soccer);
    }

    #[test]
    fn symbols_round_trip_through_classification() {
        for sport in Sport::ALL.iter().filter(|s| **s != Sport::Other) {
            assert_eq!(Sport::from_symbol(sport.symbol()), *sport);
        }
        assert_eq!(Sport::from_symbol("?"), Sport::Other);
    }
}
