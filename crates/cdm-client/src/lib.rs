//! cdm-client: Client library for Rubrik CDM clusters
//!
//! Defines the [`CdmClient`] operations the task modules need and the
//! [`Connector`] that opens a client from resolved credentials, plus the
//! HTTPS implementation of both.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use cdm_api::ConnectionConfig;
//! use cdm_client::{CdmClient, ClientOptions, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectionConfig::with_password("10.0.0.1", "admin", "secret");
//! let client = HttpClient::connect(&config, &ClientOptions::default())?;
//!
//! let response = client
//!     .configure_login_banner("Authorized use only", Duration::from_secs(15))
//!     .await?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod traits;

pub use error::{ClientError, Result};
pub use http::{ClientOptions, HttpClient, HttpConnector};
pub use traits::{CdmClient, Connector, SnapshotResponse};
