//! Top-level error wrapper types.

use crate::{ChangeRequestError, ChangeRequestErrorKind, ConfigError, StoreError, StoreErrorKind};

/// Every error a Photon operation can surface.
///
/// # Examples
///
/// ```
/// use photon_error::{PhotonError, StoreError, StoreErrorKind};
///
/// let store_err = StoreError::new(StoreErrorKind::Unavailable("catalog offline".to_string()));
/// let err: PhotonError = store_err.into();
/// assert!(format!("{}", err).contains("Store Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PhotonErrorKind {
    /// Asset store error
    #[from(StoreError)]
    Store(StoreError),
    /// Change request validation, staging or copy error
    #[from(ChangeRequestError)]
    ChangeRequest(ChangeRequestError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Coarse classification of a [`PhotonError`].
///
/// Callers decide how to react (retry, ask for permission, report) from the
/// category alone; the detailed kind stays available for diagnostics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, strum::EnumIter,
)]
pub enum ErrorCategory {
    /// Validator failure, local to the request
    #[display("invalid request")]
    InvalidRequest,
    /// Conflicting or duplicate staged work
    #[display("operation not supported")]
    OperationNotSupported,
    /// Caller lacks permission
    #[display("permission denied")]
    PermissionDenied,
    /// A staged source file is missing
    #[display("no such file")]
    NoSuchFile,
    /// Copying bytes failed
    #[display("i/o error")]
    Io,
    /// Opaque failure from the asset store or its configuration
    #[display("store error")]
    Store,
}

/// Photon error with kind discrimination and the operation that raised it.
///
/// # Examples
///
/// ```
/// use photon_error::{ChangeRequestError, ErrorCategory, PhotonError};
///
/// let err = PhotonError::from(ChangeRequestError::not_supported("resource already added"))
///     .during("add_resource");
/// assert_eq!(err.operation(), Some("add_resource"));
/// assert_eq!(err.category(), ErrorCategory::OperationNotSupported);
/// ```
#[derive(Debug, derive_more::Error)]
pub struct PhotonError {
    #[error(source)]
    kind: Box<PhotonErrorKind>,
    operation: Option<&'static str>,
}

impl PhotonError {
    /// Create a new error from a kind.
    pub fn new(kind: PhotonErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
            operation: None,
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PhotonErrorKind {
        &self.kind
    }

    /// Name of the change operation that was executing, if any.
    pub fn operation(&self) -> Option<&'static str> {
        self.operation
    }

    /// Attach the executing operation. An operation already recorded is kept,
    /// so the innermost executor wins.
    pub fn during(mut self, operation: &'static str) -> Self {
        if self.operation.is_none() {
            self.operation = Some(operation);
        }
        self
    }

    /// Project the error onto the caller-facing taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self.kind.as_ref() {
            PhotonErrorKind::Store(err) => match err.kind {
                StoreErrorKind::PermissionDenied(_) => ErrorCategory::PermissionDenied,
                _ => ErrorCategory::Store,
            },
            PhotonErrorKind::ChangeRequest(err) => match err.kind() {
                ChangeRequestErrorKind::InvalidRequest(_) => ErrorCategory::InvalidRequest,
                ChangeRequestErrorKind::OperationNotSupported(_) => {
                    ErrorCategory::OperationNotSupported
                }
                ChangeRequestErrorKind::PermissionDenied(_) => ErrorCategory::PermissionDenied,
                ChangeRequestErrorKind::NoSuchFile(_) => ErrorCategory::NoSuchFile,
                ChangeRequestErrorKind::Io(_) => ErrorCategory::Io,
            },
            PhotonErrorKind::Config(_) => ErrorCategory::Store,
        }
    }

    /// Whether the store refused the call for lack of write permission.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.kind.as_ref(), PhotonErrorKind::Store(err) if err.is_permission_denied())
    }
}

impl std::fmt::Display for PhotonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Photon Error: {}", self.kind)?;
        if let Some(operation) = self.operation {
            write!(f, " (during {})", operation)?;
        }
        Ok(())
    }
}

// Generic From implementation for any type that converts to PhotonErrorKind
impl<T> From<T> for PhotonError
where
    T: Into<PhotonErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Photon operations.
///
/// # Examples
///
/// ```
/// use photon_error::{PhotonResult, StoreError, StoreErrorKind};
///
/// fn fetch_row() -> PhotonResult<String> {
///     Err(StoreError::new(StoreErrorKind::NotFound("asset 1".to_string())))?
/// }
/// ```
pub type PhotonResult<T> = std::result::Result<T, PhotonError>;
