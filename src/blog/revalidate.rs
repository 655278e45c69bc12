//! Page revalidation after a manual blog refresh.
//!
//! The site front end rebuilds cached pages when told which paths changed.
//! Revalidation is best effort: failures are logged and reported as
//! `false`, never raised.

use std::time::Duration;

use serde::Serialize;

#[derive(Serialize)]
struct RevalidateRequest<'a> {
    paths: &'a [String],
}

/// Notifies the front end that blog-backed pages are stale.
#[derive(Clone)]
pub struct Revalidator {
    client: reqwest::Client,
    webhook: Option<String>,
    paths: Vec<String>,
}

impl Revalidator {
    pub fn new(webhook: Option<String>, paths: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            webhook,
            paths,
        }
    }

    /// True only when a webhook is configured and acknowledged the paths.
    pub async fn revalidate(&self, secret: Option<&str>) -> bool {
        let Some(webhook) = &self.webhook else {
            tracing::debug!("No revalidation webhook configured");
            return false;
        };

        let mut request = self.client.post(webhook).json(&RevalidateRequest { paths: &self.paths });
        if let Some(secret) = secret {
            request = request.bearer_auth(secret);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(paths = ?self.paths, "Pages revalidated");
                true
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Revalidation webhook rejected request");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Revalidation webhook unreachable");
                false
            }
        }
    }
}
