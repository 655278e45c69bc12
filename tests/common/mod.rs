//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use realty_site::blog::{BlogError, BlogResult, Post, PostSource};
use realty_site::config::SiteConfig;

pub const FEED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Market Notes</title>
    <item>
      <title>Spring Market Update</title>
      <link>https://blog.example.com/2024/03/spring-market-update/</link>
      <dc:creator>Dana Realtor</dc:creator>
      <pubDate>Tue, 12 Mar 2024 14:30:00 +0000</pubDate>
      <description><![CDATA[<p>Inventory is up.</p>]]></description>
    </item>
    <item>
      <title>Staging Tips</title>
      <link>http://localhost:3000/blog/staging-tips</link>
      <description>Declutter first.</description>
    </item>
  </channel>
</rss>"#;

/// Config suitable for tests: no processing delay, no secret, clients
/// told apart by `X-Forwarded-For`.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.blog.feed_url = "http://127.0.0.1:9/feed".to_string();
    config.forms.processing_delay_ms = 0;
    config.security.revalidate_secret = None;
    config.security.trust_proxy_headers = true;
    config
}

pub fn post(slug: &str) -> Post {
    Post {
        slug: slug.to_string(),
        title: format!("Post {slug}"),
        link: format!("https://blog.example.com/{slug}/"),
        date: None,
        date_modified: None,
        excerpt: String::new(),
        author: None,
        categories: Vec::new(),
    }
}

/// In-memory post source returning whatever was last set.
#[derive(Default)]
pub struct FakeSource {
    posts: Mutex<Option<Vec<Post>>>,
    calls: AtomicU32,
}

impl FakeSource {
    pub fn with_posts(slugs: &[&str]) -> Arc<Self> {
        let source = Self::default();
        source.set_posts(slugs);
        Arc::new(source)
    }

    pub fn set_posts(&self, slugs: &[&str]) {
        *self.posts.lock().unwrap() = Some(slugs.iter().map(|s| post(s)).collect());
    }

    /// Make every following fetch fail.
    pub fn fail(&self) {
        *self.posts.lock().unwrap() = None;
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostSource for FakeSource {
    async fn fetch_posts(&self) -> BlogResult<Vec<Post>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.posts
            .lock()
            .unwrap()
            .clone()
            .ok_or(BlogError::Status(503))
    }
}

/// Start a programmable HTTP backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that always serves [`FEED_XML`].
pub async fn start_feed_backend() -> SocketAddr {
    start_programmable_backend(|| async { (200, FEED_XML.to_string()) }).await
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
