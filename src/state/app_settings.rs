use log::LevelFilter;
use match_feed::client::{DEFAULT_FEED_URL, FeedClient, FeedSource};
use match_feed::odds_api::{DEFAULT_SPORT, OddsApiClient};
use match_feed::poller::DEFAULT_REFRESH_INTERVAL;
use match_feed::sample::SampleFeed;
use std::path::PathBuf;
use std::time::Duration;

const MIN_REFRESH_SECS: u64 = 5;
const MAX_REFRESH_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceKind {
    #[default]
    Remote,
    Sample,
    OddsApi,
}

impl SourceKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remote" | "feed" => Some(SourceKind::Remote),
            "sample" | "mock" => Some(SourceKind::Sample),
            "odds-api" | "odds_api" | "oddsapi" => Some(SourceKind::OddsApi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub source: SourceKind,
    pub feed_url: String,
    /// Local feed file used by the sample source instead of the embedded list.
    pub sample_path: Option<PathBuf>,
    pub refresh_interval: Duration,
    pub odds_api_key: Option<String>,
    pub odds_sport: String,
    /// Values that were present but unusable. Reported once a log sink exists.
    pub warnings: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            source: SourceKind::default(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            sample_path: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            odds_api_key: None,
            odds_sport: DEFAULT_SPORT.to_string(),
            warnings: Vec::new(),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        let mut warnings = Vec::new();

        let source = match var("BETFEED_SOURCE") {
            Some(raw) => SourceKind::parse(&raw).unwrap_or_else(|| {
                warnings.push(format!("unknown BETFEED_SOURCE {raw:?}, using remote feed"));
                SourceKind::Remote
            }),
            None => SourceKind::Remote,
        };

        let refresh_interval = match var("BETFEED_REFRESH_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS)),
                Err(_) => {
                    warnings.push(format!(
                        "BETFEED_REFRESH_SECS {raw:?} is not a number of seconds, using {}s",
                        defaults.refresh_interval.as_secs()
                    ));
                    defaults.refresh_interval
                }
            },
            None => defaults.refresh_interval,
        };

        let log_level = var("BETFEED_LOG").and_then(|raw| {
            let level = raw.parse::<LevelFilter>().ok();
            if level.is_none() {
                warnings.push(format!("unknown BETFEED_LOG level {raw:?}, using info"));
            }
            level
        });

        Self {
            full_screen: false,
            log_level,
            source,
            feed_url: var("BETFEED_FEED_URL").unwrap_or(defaults.feed_url),
            sample_path: var("BETFEED_SAMPLE_JSON").map(PathBuf::from),
            refresh_interval,
            odds_api_key: var("ODDS_API_KEY"),
            odds_sport: var("ODDS_SPORT").unwrap_or(defaults.odds_sport),
            warnings,
        }
    }

    /// Build the configured match source. The Odds API without a key falls
    /// back to the sample feed, as the feed backend does; the second value
    /// says why when that happens.
    pub fn build_source(&self) -> (FeedSource, Option<String>) {
        let sample = || match &self.sample_path {
            Some(path) => SampleFeed::from_path(path),
            None => SampleFeed::embedded(),
        };

        match self.source {
            SourceKind::Remote => (FeedSource::Remote(FeedClient::new(self.feed_url.clone())), None),
            SourceKind::Sample => (FeedSource::Sample(sample()), None),
            SourceKind::OddsApi => {
                let key = self.odds_api_key.clone().unwrap_or_default();
                match OddsApiClient::new(key, self.odds_sport.clone()) {
                    Ok(client) => (FeedSource::OddsApi(client), None),
                    Err(e) => (
                        FeedSource::Sample(sample()),
                        Some(format!("{e}; showing sample matches instead")),
                    ),
                }
            }
        }
    }
}
