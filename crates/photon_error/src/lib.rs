//! Error types for the Photon media asset library.
//!
//! This crate provides the foundation error types used throughout the Photon workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! [`PhotonError`] additionally remembers which change operation was executing
//! when the error surfaced, and projects every kind onto a small
//! [`ErrorCategory`] taxonomy callers can match on.
//!
//! # Examples
//!
//! ```
//! use photon_error::{ChangeRequestError, ChangeRequestErrorKind, ErrorCategory, PhotonResult};
//!
//! fn validate() -> PhotonResult<()> {
//!     Err(ChangeRequestError::new(ChangeRequestErrorKind::InvalidRequest(
//!         "None request to apply".to_string(),
//!     )))?
//! }
//!
//! let err = validate().unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::InvalidRequest);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod change;
mod config;
mod error;
mod store;

pub use change::{ChangeRequestError, ChangeRequestErrorKind};
pub use config::{ConfigError, ConfigStage};
pub use error::{ErrorCategory, PhotonError, PhotonErrorKind, PhotonResult};
pub use store::{StoreError, StoreErrorKind};
