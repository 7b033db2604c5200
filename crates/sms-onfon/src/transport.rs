use async_trait::async_trait;
use sms_core::SmsError;

/// One provider round trip: POST a JSON body, read a JSON body back.
///
/// Any failure (connect, timeout, non-2xx, undecodable body) is an `Err`; the
/// dispatcher turns it into an in-band batch error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: String) -> Result<serde_json::Value, SmsError>;
}

/// Longest slice of an error body quoted back to the caller.
const BODY_EXCERPT: usize = 200;

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(feature = "reqwest")]
pub use self::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod http {
    use super::*;
    use reqwest::header::CONTENT_TYPE;
    use std::time::Duration;
    use tracing::debug;

    /// [`Transport`] backed by a shared `reqwest::Client`.
    #[derive(Clone, Debug, Default)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Client with a per-request timeout; `None` keeps reqwest's default.
        pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, SmsError> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let http = builder
                .build()
                .map_err(|e| SmsError::Http(format!("failed to build http client: {}", e)))?;
            Ok(Self { http })
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn post_json(&self, url: &str, body: String) -> Result<serde_json::Value, SmsError> {
            let res = self
                .http
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await
                .map_err(|e| SmsError::Http(e.to_string()))?;

            let status = res.status();
            debug!(%status, "provider responded");
            if !status.is_success() {
                let body = res.text().await.unwrap_or_default();
                return Err(SmsError::Provider(format!(
                    "HTTP {} for url {}: {}",
                    status,
                    url,
                    excerpt(&body)
                )));
            }

            let raw_text = res
                .text()
                .await
                .map_err(|e| SmsError::Http(e.to_string()))?;
            serde_json::from_str(&raw_text).map_err(|e| {
                SmsError::Decode(format!("{} (body: {})", e, excerpt(&raw_text)))
            })
        }
    }
}
