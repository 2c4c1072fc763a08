//! Light-control connector
//!
//! Sends the light state as a bare `1`/`0` PUT; no response body is
//! consumed and failures are reported, not retried.

use async_trait::async_trait;

use crate::{Error, Result};

use super::LightSwitch;

/// Light control over HTTP
pub struct HttpLight {
    client: reqwest::Client,
    url: String,
}

impl HttpLight {
    /// Create a connector for the given control endpoint
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl LightSwitch for HttpLight {
    async fn set_light(&self, on: bool) -> Result<()> {
        let body = if on { "1" } else { "0" };

        let response = self
            .client
            .put(&self.url)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Device(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Device(format!(
                "light endpoint returned {}",
                response.status()
            )));
        }

        tracing::debug!(on, "light state set");
        Ok(())
    }
}
