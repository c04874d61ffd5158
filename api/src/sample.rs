use crate::client::{ApiError, ApiResult, MatchSource};
use crate::{FeedPayload, Match};
use std::path::PathBuf;

const EMBEDDED_FEED_JSON: &str = include_str!("../data/sample_feed.json");

/// Offline feed: the embedded sample list, or a local JSON file in the
/// match-feed format that is re-read on every fetch.
#[derive(Debug, Clone, Default)]
pub struct SampleFeed {
    path: Option<PathBuf>,
}

impl SampleFeed {
    pub fn embedded() -> Self {
        Self { path: None }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    pub fn load(&self) -> ApiResult<Vec<Match>> {
        let Some(path) = &self.path else {
            return parse_feed(EMBEDDED_FEED_JSON, "embedded sample feed");
        };
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("could not read {origin}: {e}")))?;
        parse_feed(&content, &origin)
    }
}

impl MatchSource for SampleFeed {
    async fn fetch_matches(&self) -> ApiResult<Vec<Match>> {
        self.load()
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("file:{}", path.display()),
            None => "sample".to_owned(),
        }
    }
}

fn parse_feed(content: &str, origin: &str) -> ApiResult<Vec<Match>> {
    serde_json::from_str::<FeedPayload>(content)
        .map(FeedPayload::into_matches)
        .map_err(|e| ApiError::Decode(e, origin.to_owned()))
}
