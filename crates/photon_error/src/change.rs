//! Change request error types.

/// Kinds of change request errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ChangeRequestErrorKind {
    /// The request failed validation; never retried automatically
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),
    /// Conflicting or duplicate staged resource, or an outstanding create
    #[display("Operation not supported: {}", _0)]
    OperationNotSupported(String),
    /// The caller is not allowed to perform the operation
    #[display("Permission denied: {}", _0)]
    PermissionDenied(String),
    /// A staged source file does not exist
    #[display("No such file: {}", _0)]
    NoSuchFile(String),
    /// Copying resource bytes failed
    #[display("I/O error: {}", _0)]
    Io(String),
}

/// Change request error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Change Request Error: {} at line {} in {}", kind, line, file)]
pub struct ChangeRequestError {
    kind: ChangeRequestErrorKind,
    line: u32,
    file: &'static str,
}

impl ChangeRequestError {
    /// Create a new change request error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ChangeRequestErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for [`ChangeRequestErrorKind::InvalidRequest`].
    #[track_caller]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ChangeRequestErrorKind::InvalidRequest(message.into()))
    }

    /// Shorthand for [`ChangeRequestErrorKind::OperationNotSupported`].
    #[track_caller]
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(ChangeRequestErrorKind::OperationNotSupported(message.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ChangeRequestErrorKind {
        &self.kind
    }
}
