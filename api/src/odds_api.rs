//! The Odds API (v4) wire types and their mapping onto `Match`.
//!
//! Used when the feed is read straight from the odds provider instead of
//! through the match-feed endpoint.

use crate::client::{ApiError, ApiResult, MatchSource, REQUEST_TIMEOUT, build_http_client};
use crate::{Match, Odds, Sport};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

pub const ODDS_API_BASE: &str = "https://api.the-odds-api.com";
pub const DEFAULT_SPORT: &str = "soccer_epl";

/// Only the head of the provider list is shown.
const MAX_EVENTS: usize = 10;
const DEFAULT_PRICE: f64 = 2.0;
const DEFAULT_DRAW_PRICE: f64 = 3.0;
const LIVE_LABEL: &str = "45'";
const UNKNOWN_TIME_LABEL: &str = "Soon";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OddsEvent {
    pub id: Option<String>,
    pub sport_key: Option<String>,
    pub sport_title: Option<String>,
    pub commence_time: Option<String>, // ISO 8601
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    #[serde(default)]
    pub bookmakers: Vec<OddsBookmaker>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OddsBookmaker {
    pub key: Option<String>,
    #[serde(default)]
    pub markets: Vec<OddsMarket>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OddsMarket {
    pub key: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<OddsOutcome>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OddsOutcome {
    pub name: Option<String>,
    pub price: Option<f64>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OddsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    sport: String,
    timeout: Duration,
}

impl OddsApiClient {
    pub fn new(api_key: impl Into<String>, sport: impl Into<String>) -> ApiResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ApiError::Config("ODDS_API_KEY is empty".into()));
        }
        Ok(Self {
            client: build_http_client(),
            base_url: ODDS_API_BASE.to_owned(),
            api_key,
            sport: sport.into(),
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn sport(&self) -> &str {
        &self.sport
    }

    pub async fn fetch_matches(&self) -> ApiResult<Vec<Match>> {
        let url = format!("{}/v4/sports/{}/odds/", self.base_url, self.sport);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", "eu"),
                ("markets", "h2h"),
                ("oddsFormat", "decimal"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.without_url(), url.clone()))?;

        let events = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e.without_url(), url.clone()))?
            .json::<Vec<OddsEvent>>()
            .await
            .map_err(|e| ApiError::Parsing(e.without_url(), url.clone()))?;

        Ok(map_events(&events, Utc::now()))
    }
}

impl MatchSource for OddsApiClient {
    fn fetch_matches(&self) -> impl Future<Output = ApiResult<Vec<Match>>> + Send {
        OddsApiClient::fetch_matches(self)
    }

    fn describe(&self) -> String {
        format!("the-odds-api:{}", self.sport)
    }
}

// ---------------------------------------------------------------------------
// Mapping: provider events → Match
// ---------------------------------------------------------------------------

/// Map the first few provider events; events without a usable two-way market
/// are dropped.
pub fn map_events(events: &[OddsEvent], now: DateTime<Utc>) -> Vec<Match> {
    events
        .iter()
        .take(MAX_EVENTS)
        .filter_map(|event| map_event(event, now))
        .collect()
}

fn map_event(event: &OddsEvent, now: DateTime<Utc>) -> Option<Match> {
    let bookmaker = event.bookmakers.first()?;
    let outcomes = bookmaker
        .markets
        .first()
        .map(|m| m.outcomes.as_slice())
        .unwrap_or_default();
    if outcomes.len() < 2 {
        return None;
    }

    let price = |i: usize, default: f64| outcomes.get(i).and_then(|o| o.price).unwrap_or(default);
    let odds = Odds {
        win1: price(0, DEFAULT_PRICE),
        win2: price(1, DEFAULT_PRICE),
        draw: (outcomes.len() > 2).then(|| price(2, DEFAULT_DRAW_PRICE)),
    };

    let (is_live, time) = match event.commence_time.as_deref().and_then(parse_commence_time) {
        Some(start) if start < now => (true, LIVE_LABEL.to_owned()),
        Some(start) => (false, start.format("%H:%M").to_string()),
        None => (false, UNKNOWN_TIME_LABEL.to_owned()),
    };

    Some(Match {
        id: stable_id(event.id.as_deref().unwrap_or_default()),
        sport: Sport::from_sport_key(event.sport_key.as_deref().unwrap_or_default())
            .symbol()
            .to_owned(),
        league: event.sport_title.clone().unwrap_or_else(|| "Sport".into()),
        team1: event.home_team.clone().unwrap_or_else(|| "Team 1".into()),
        team2: event.away_team.clone().unwrap_or_else(|| "Team 2".into()),
        score1: None,
        score2: None,
        time,
        is_live,
        odds,
    })
}

fn parse_commence_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// FNV-1a over the provider id, so a match keeps its id across refreshes and
/// process restarts.
fn stable_id(raw: &str) -> i64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let hash = raw
        .bytes()
        .fold(OFFSET, |acc, b| (acc ^ u64::from(b)).wrapping_mul(PRIME));
    hash as i64
}
