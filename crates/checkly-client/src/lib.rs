//! Checkly REST API Client
//!
//! A Rust client library for the alert channel endpoints of the Checkly public API.
//!
//! # Example
//!
//! ```no_run
//! use checkly_client::{AlertChannelConfig, AlertChannelRequest, ChecklyClient, ChecklyClientTrait, EmailConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChecklyClient::new(
//!     "https://api.checklyhq.com".to_string(),
//!     "your-api-key".to_string(),
//!     "your-account-id".to_string(),
//! )?;
//!
//! let request = AlertChannelRequest {
//!     config: AlertChannelConfig::Email(EmailConfig {
//!         address: "oncall@example.com".to_string(),
//!     }),
//!     send_recovery: true,
//!     send_failure: true,
//!     send_degraded: false,
//!     ssl_expiry: false,
//!     ssl_expiry_threshold: None,
//! };
//! let channel = client.create_alert_channel(&request).await?;
//! client.delete_alert_channel(channel.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod checkly_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use checkly_trait::ChecklyClientTrait;
pub use client::ChecklyClient;
pub use common::HttpClient;
pub use error::ChecklyError;
pub use models::*;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockCall, MockChecklyClient, MockFailure, MockOperation};

/// Default Checkly public API endpoint
pub const DEFAULT_API_URL: &str = "https://api.checklyhq.com";
