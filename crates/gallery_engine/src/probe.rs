use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use gallery_logging::gallery_debug;

use crate::types::ProbeOutcome;

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Bounded-time reachability check for remote image sources.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

#[derive(Debug, Clone)]
pub struct ReqwestProber {
    settings: ProbeSettings,
}

impl ReqwestProber {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Option<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .ok()
    }
}

#[async_trait::async_trait]
impl Prober for ReqwestProber {
    /// Issues a GET and classifies the response from the status line and
    /// `Content-Type` header alone. The response is dropped without reading
    /// the body, aborting the transfer. Every failure mode (malformed URL,
    /// network error, timeout) classifies as unreachable.
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let parsed = match reqwest::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                gallery_debug!("probe {url}: invalid url: {err}");
                return ProbeOutcome::failed();
            }
        };
        let Some(client) = self.build_client() else {
            return ProbeOutcome::failed();
        };

        let response = match client.get(parsed).send().await {
            Ok(response) => response,
            Err(err) => {
                gallery_debug!("probe {url}: {err}");
                return ProbeOutcome::failed();
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let ok = status.is_success()
            && content_type
                .as_deref()
                .map(is_image_content_type)
                .unwrap_or(false);

        ProbeOutcome {
            ok,
            status: Some(status.as_u16()),
            content_type,
        }
    }
}

fn is_image_content_type(content_type: &str) -> bool {
    let ct = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    ct.to_ascii_lowercase().starts_with("image/")
}
