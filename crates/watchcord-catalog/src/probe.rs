use std::time::Duration;

use crate::error::CatalogError;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Existence check for speculative image URLs: HEAD request, no body.
/// Anything but a clean 200 counts as absent. Results are not cached;
/// every enrichment pass re-probes (callers wanting fewer round trips
/// would add a TTL cache keyed by URL).
#[derive(Debug, Clone)]
pub struct ResourceProber {
    http: reqwest::Client,
}

impl ResourceProber {
    pub fn new() -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .user_agent("watchcord/0.1")
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        Ok(Self { http })
    }

    pub async fn exists(&self, url: &str) -> bool {
        match self.http.head(url).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                tracing::debug!(%url, status, "probed resource");
                status == 200
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "resource probe failed");
                false
            }
        }
    }
}
