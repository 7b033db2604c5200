//! # Onfon SMS
//!
//! Bulk SMS sending through the Onfon Media HTTP API.
//!
//! ## Features
//!
//! - **Batching**: recipients are sent 20 per request, in input order
//! - **Pacing**: a one second pause after every 40th request
//! - **Failure isolation**: a failed batch is reported in place as
//!   `{"error": ...}` and never stops the batches after it
//! - **Configuration**: settings come from host application settings, the
//!   environment (including `.env`) or caller defaults
//! - **Observability**: structured logging through `tracing`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! // SMS_API_URL, SMS_CLIENT_ID, SMS_API_KEY and SMS_SENDER_ID set in the environment
//! let recipients = vec!["254700000001".to_string(), "254700000002".to_string()];
//! let results = onfon_sms::send_sms(&recipients, "Hello from Onfon").await?;
//! for result in &results {
//!     println!("{}", serde_json::to_string(result)?);
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use onfon_sms::prelude::*;
//!
//! let host = HostSettings::new().with(SMS_SENDER_ID, "MYBRAND");
//! let resolver = Resolver::standard(Some(host), Defaults::new());
//! let app = AppConfig::load()?;
//! let results = send_sms_with(&resolver, &app.dispatch, &recipients, "Hi").await?;
//! ```

pub mod config;
pub mod logging;
pub mod settings;

pub use crate::config::*;

use settings::{Defaults, Resolver};
use sms_core::{BatchResult, SmsError};
use sms_onfon::{OnfonClient, ReqwestTransport};

/// Send `message` to every recipient using settings from the environment.
///
/// A `.env` file in the working directory is loaded first. Fails only when a
/// required setting is missing; per-batch failures are reported in-band.
pub async fn send_sms(recipients: &[String], message: &str) -> Result<Vec<BatchResult>, SmsError> {
    settings::load_dotenv();
    let resolver = Resolver::standard(None, Defaults::new());
    send_sms_with(&resolver, &DispatchSettings::default(), recipients, message).await
}

/// Send `message` with an explicit settings chain and dispatch tuning.
///
/// Settings are resolved before any request is made.
pub async fn send_sms_with(
    resolver: &Resolver,
    dispatch: &DispatchSettings,
    recipients: &[String],
    message: &str,
) -> Result<Vec<BatchResult>, SmsError> {
    let config = resolver.resolve()?;
    let options = dispatch.options()?;
    let transport = ReqwestTransport::with_timeout(dispatch.request_timeout())?;
    let client = OnfonClient::with_transport(config, transport).with_options(options)?;
    Ok(client.dispatch(recipients, message).await)
}

/// Common imports for Onfon SMS usage
pub mod prelude {
    pub use crate::config::{AppConfig, DispatchSettings, LoggingConfig};
    pub use crate::logging::init_tracing;
    pub use crate::settings::{
        host_settings, load_dotenv, Defaults, EnvSettings, HostSettings, Resolver, SettingsSource,
    };
    pub use crate::{send_sms, send_sms_with};
    pub use sms_core::*;
    pub use sms_onfon::{DispatchOptions, OnfonClient, Pacing, ReqwestTransport, Transport};
}
