//! # Onfon SMS Provider
//!
//! Bulk SMS dispatch over the Onfon Media JSON API.
//!
//! Recipients are split into batches of at most 20, each batch becomes one
//! `POST` with a JSON body, and every response (or failure) is collected in
//! order. After every 40th batch the dispatcher pauses for a second.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::DispatchConfig;
//! use sms_onfon::OnfonClient;
//!
//! let client = OnfonClient::new(DispatchConfig {
//!     api_url: "https://api.onfonmedia.co.ke/v1/sms/SendBulkSMS".into(),
//!     client_id: "client".into(),
//!     api_key: "key".into(),
//!     sender_id: "SENDER".into(),
//! });
//! let results = client.dispatch(&recipients, "Hello from Onfon").await;
//! ```

use async_trait::async_trait;
use serde::Serialize;
use sms_core::{
    batches, BatchResult, BulkSendRequest, BulkSmsClient, DispatchConfig, DispatchSummary,
    SmsError,
};
use tracing::{debug, info, warn};

pub mod pacing;
pub mod transport;

pub use pacing::{Pacer, Pacing};
pub use transport::Transport;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;

/// Largest batch the provider accepts in one request.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// One entry of `MessageParameters`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageParameter<'a> {
    pub number: &'a str,
    pub text: &'a str,
}

/// Request body for a single batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OnfonSendRequest<'a> {
    pub sender_id: &'a str,
    pub message_parameters: Vec<MessageParameter<'a>>,
    pub api_key: &'a str,
    pub client_id: &'a str,
}

impl<'a> OnfonSendRequest<'a> {
    pub fn new(config: &'a DispatchConfig, batch: &'a [String], text: &'a str) -> Self {
        Self {
            sender_id: &config.sender_id,
            message_parameters: batch
                .iter()
                .map(|number| MessageParameter { number, text })
                .collect(),
            api_key: &config.api_key,
            client_id: &config.client_id,
        }
    }
}

/// Batching and pacing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    pub batch_size: usize,
    pub pacing: Pacing,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            pacing: Pacing::default(),
        }
    }
}

impl DispatchOptions {
    pub fn validate(&self) -> Result<(), SmsError> {
        if self.batch_size == 0 {
            return Err(SmsError::Invalid("batch_size must be at least 1".into()));
        }
        if self.pacing.every == 0 {
            return Err(SmsError::Invalid("pause_every must be at least 1".into()));
        }
        Ok(())
    }
}

/// Onfon bulk SMS client.
#[derive(Clone, Debug)]
pub struct OnfonClient<T = DefaultTransport> {
    config: DispatchConfig,
    options: DispatchOptions,
    transport: T,
}

#[cfg(feature = "reqwest")]
pub type DefaultTransport = ReqwestTransport;
#[cfg(not(feature = "reqwest"))]
pub type DefaultTransport = ();

#[cfg(feature = "reqwest")]
impl OnfonClient<ReqwestTransport> {
    pub fn new(config: DispatchConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T> OnfonClient<T> {
    pub fn with_transport(config: DispatchConfig, transport: T) -> Self {
        Self {
            config,
            options: DispatchOptions::default(),
            transport,
        }
    }

    /// Replace the batching/pacing options, rejecting zero sizes.
    pub fn with_options(mut self, options: DispatchOptions) -> Result<Self, SmsError> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }
}

impl<T: Transport> OnfonClient<T> {
    /// Send `text` to every recipient, one request per batch, strictly in order.
    ///
    /// Never fails as a whole: the result has one entry per batch, and a
    /// failed batch holds `{"error": ...}` while later batches still run.
    pub async fn dispatch(&self, recipients: &[String], text: &str) -> Vec<BatchResult> {
        if recipients.is_empty() {
            debug!("no recipients, nothing to dispatch");
            return Vec::new();
        }

        let total = recipients.len().div_ceil(self.options.batch_size);
        let mut results = Vec::with_capacity(total);
        let mut pacer = Pacer::new(self.options.pacing);

        for (index, batch) in batches(recipients, self.options.batch_size).enumerate() {
            debug!(batch = index + 1, of = total, size = batch.len(), "sending batch");
            let result: BatchResult = self.send_batch(batch, text).await.into();
            if let Some(error) = result.error() {
                warn!(batch = index + 1, error, "batch failed");
            }
            results.push(result);
            pacer.batch_done().await;
        }

        let summary = DispatchSummary::of(&results);
        info!(
            recipients = recipients.len(),
            batches = summary.batches,
            delivered = summary.delivered,
            failed = summary.failed,
            "bulk dispatch finished"
        );
        results
    }

    async fn send_batch(&self, batch: &[String], text: &str) -> Result<serde_json::Value, SmsError> {
        let payload = OnfonSendRequest::new(&self.config, batch, text);
        let body = serde_json::to_string(&payload)
            .map_err(|e| SmsError::Invalid(format!("payload encode: {}", e)))?;
        self.transport.post_json(&self.config.api_url, body).await
    }
}

#[async_trait]
impl<T: Transport> BulkSmsClient for OnfonClient<T> {
    async fn send_bulk(&self, req: BulkSendRequest<'_>) -> Result<Vec<BatchResult>, SmsError> {
        Ok(self.dispatch(req.recipients, req.text).await)
    }
}
