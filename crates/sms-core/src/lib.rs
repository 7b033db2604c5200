//! # SMS Core
//!
//! Core traits and types for batched bulk SMS dispatch.
//!
//! This crate provides the provider-neutral building blocks:
//! - [`BulkSmsClient`] trait for sending one message to many recipients
//! - [`BatchResult`], the per-batch outcome handed back to callers
//! - [`DispatchConfig`] and the [`SmsError`] type
//! - [`batches`], the order-preserving chunker
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{BulkSendRequest, BulkSmsClient};
//!
//! let recipients = vec!["254700000001".to_string()];
//! let results = client
//!     .send_bulk(BulkSendRequest {
//!         recipients: &recipients,
//!         text: "Hello world!",
//!     })
//!     .await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Environment / settings key for the provider endpoint.
pub const SMS_API_URL: &str = "SMS_API_URL";
/// Settings key for the provider-issued client identifier.
pub const SMS_CLIENT_ID: &str = "SMS_CLIENT_ID";
/// Settings key for the API key.
pub const SMS_API_KEY: &str = "SMS_API_KEY";
/// Settings key for the sender identity shown on handsets.
pub const SMS_SENDER_ID: &str = "SMS_SENDER_ID";

/// The four required keys, in the order they are reported when missing.
pub const REQUIRED_KEYS: [&str; 4] = [SMS_API_URL, SMS_CLIENT_ID, SMS_API_KEY, SMS_SENDER_ID];

/// Errors that can occur during SMS operations
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// One or more required settings could not be resolved
    #[error("missing required SMS configuration: {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },
    /// HTTP communication error
    #[error("http error: {0}")]
    Http(String),
    /// SMS provider answered with a non-success status
    #[error("provider error: {0}")]
    Provider(String),
    /// Provider body could not be decoded as JSON
    #[error("decode error: {0}")]
    Decode(String),
    /// Invalid request parameters
    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Fully resolved settings for one dispatch call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub api_url: String,
    pub client_id: String,
    pub api_key: String,
    pub sender_id: String,
}

// Hand-written so the API key never reaches logs.
impl std::fmt::Debug for DispatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchConfig")
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field("api_key", &"<redacted>")
            .field("sender_id", &self.sender_id)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BulkSendRequest<'a> {
    pub recipients: &'a [String],
    pub text: &'a str,
}

/// Outcome of a single batch.
///
/// Serializes untagged: a delivered batch is exactly the provider's JSON, a
/// failed one is `{"error": "<description>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchResult {
    Failed { error: String },
    Delivered(serde_json::Value),
}

impl BatchResult {
    /// In-band descriptor for a batch whose transport call failed.
    pub fn from_error(err: &SmsError) -> Self {
        BatchResult::Failed {
            error: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, BatchResult::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BatchResult::Failed { error } => Some(error),
            BatchResult::Delivered(_) => None,
        }
    }

    /// The value a caller would see on the wire.
    pub fn into_value(self) -> serde_json::Value {
        match self {
            BatchResult::Failed { error } => serde_json::json!({ "error": error }),
            BatchResult::Delivered(v) => v,
        }
    }
}

impl From<Result<serde_json::Value, SmsError>> for BatchResult {
    fn from(res: Result<serde_json::Value, SmsError>) -> Self {
        match res {
            Ok(v) => BatchResult::Delivered(v),
            Err(e) => BatchResult::from_error(&e),
        }
    }
}

/// Delivered/failed tally over one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub batches: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn of(results: &[BatchResult]) -> Self {
        let failed = results.iter().filter(|r| r.is_error()).count();
        Self {
            batches: results.len(),
            delivered: results.len() - failed,
            failed,
        }
    }
}

/// Split recipients into consecutive, order-preserving batches of at most `size`.
///
/// `size` must be non-zero.
pub fn batches(recipients: &[String], size: usize) -> std::slice::Chunks<'_, String> {
    recipients.chunks(size)
}

#[async_trait]
pub trait BulkSmsClient: Send + Sync {
    /// Send one text to every recipient, one provider request per batch.
    ///
    /// Only configuration problems surface as `Err`; per-batch failures are
    /// reported in-band.
    async fn send_bulk(&self, req: BulkSendRequest<'_>) -> Result<Vec<BatchResult>, SmsError>;
}
