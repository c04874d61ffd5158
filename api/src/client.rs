use crate::odds_api::OddsApiClient;
use crate::sample::SampleFeed;
use crate::{FeedPayload, Match};
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

/// Where the feed lives when nothing else is configured.
pub const DEFAULT_FEED_URL: &str = "http://127.0.0.1:8000/sports-api";
pub(crate) const USER_AGENT: &str = concat!("betfeed/", env!("CARGO_PKG_VERSION"));
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Decode(serde_json::Error, String),
    Config(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Decode(e, origin) => write!(f, "Invalid feed data in {origin}: {e}"),
            ApiError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            ApiError::Decode(e, _) => Some(e),
            ApiError::Config(_) => None,
        }
    }
}

/// Anything that can produce a full match list on demand.
pub trait MatchSource: Send + Sync + 'static {
    fn fetch_matches(&self) -> impl Future<Output = ApiResult<Vec<Match>>> + Send;

    /// Short human-readable origin, used in log lines and the status bar.
    fn describe(&self) -> String;
}

/// Client for the match-feed endpoint: a single GET returning `{"matches": [...]}`.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}

impl FeedClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            url: url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the feed once. Any non-success status is an error, even when the
    /// body carries a fallback list.
    pub async fn fetch_matches(&self) -> ApiResult<Vec<Match>> {
        let payload: FeedPayload = get_json(&self.client, &self.url, self.timeout).await?;
        Ok(payload.into_matches())
    }
}

impl MatchSource for FeedClient {
    fn fetch_matches(&self) -> impl Future<Output = ApiResult<Vec<Match>>> + Send {
        FeedClient::fetch_matches(self)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Runtime-selected source, so the binary can pick one from settings.
#[derive(Debug, Clone)]
pub enum FeedSource {
    Remote(FeedClient),
    OddsApi(OddsApiClient),
    Sample(SampleFeed),
}

impl MatchSource for FeedSource {
    async fn fetch_matches(&self) -> ApiResult<Vec<Match>> {
        match self {
            FeedSource::Remote(client) => client.fetch_matches().await,
            FeedSource::OddsApi(client) => client.fetch_matches().await,
            FeedSource::Sample(feed) => feed.fetch_matches().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            FeedSource::Remote(client) => client.describe(),
            FeedSource::OddsApi(client) => client.describe(),
            FeedSource::Sample(feed) => feed.describe(),
        }
    }
}

pub(crate) fn build_http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
}

pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> ApiResult<T> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| ApiError::Network(e, url.to_owned()))?;

    response
        .error_for_status()
        .map_err(|e| ApiError::Api(e, url.to_owned()))?
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parsing(e, url.to_owned()))
}
