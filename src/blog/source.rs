//! Upstream post sources.

use std::time::Duration;

use async_trait::async_trait;

use crate::blog::feed::parse_feed;
use crate::blog::types::{BlogError, BlogResult, Post};

/// Anything that can produce the current list of posts.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self) -> BlogResult<Vec<Post>>;
}

/// Reads posts from an RSS feed over HTTP.
#[derive(Clone)]
pub struct RssFeedSource {
    client: reqwest::Client,
    url: String,
}

impl RssFeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> BlogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("realty-site/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PostSource for RssFeedSource {
    async fn fetch_posts(&self) -> BlogResult<Vec<Post>> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/rss+xml, application/xml, text/xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BlogError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let posts = parse_feed(&body)?;
        tracing::debug!(url = %self.url, count = posts.len(), "Fetched blog feed");
        Ok(posts)
    }
}
