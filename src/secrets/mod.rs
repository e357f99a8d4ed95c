//! Credential provisioning for the message queue backend.
//!
//! Brokers that need authentication (TLS client certificates, storage account
//! keys) receive their material as a mounted secrets directory. This module
//! turns that directory into a [`CredentialMap`] handed to the backend
//! constructor.
//!
//! # Example
//!
//! ```rust,ignore
//! use mqtrigger::secrets::load_secrets;
//!
//! let secrets = load_secrets("/etc/fission/secrets")?;
//! if let Some(cert) = secrets.get("userCert") {
//!     configure_tls(cert.expose_secret());
//! }
//! ```
//!
//! # Security Considerations
//!
//! - Secret values are never logged; only file names are
//! - [`SecretBytes`] redacts itself in `Debug`/`Display`
//! - Memory holding secret bytes is zeroed on drop, including partially
//!   loaded maps discarded after a read failure

pub mod error;
pub mod loader;
pub mod types;

pub use error::{Result, SecretsError};
pub use loader::load_secrets;
pub use types::{CredentialMap, SecretBytes};
