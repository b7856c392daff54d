use offers::{Offer, OfferId};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Offers to replay, and the ones the platform should refuse to act on.
#[derive(Debug, Default, Deserialize)]
pub struct Feed {
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub failing: HashSet<OfferId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedFile {
    Offers(Vec<Offer>),
    Full(Feed),
}

impl Feed {
    /// Accepts either a bare array of offers or `{"offers": [...], "failing": [...]}`.
    pub fn parse(text: &str) -> offers::Result<Self> {
        Ok(match serde_json::from_str(text)? {
            FeedFile::Offers(offers) => Feed {
                offers,
                failing: HashSet::new(),
            },
            FeedFile::Full(feed) => feed,
        })
    }

    pub async fn load(path: impl AsRef<Path>) -> offers::Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text)
    }
}
