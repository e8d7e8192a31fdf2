//! Asset store error types.

/// Kinds of asset store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// Failed to create a store directory
    #[display("Failed to create store directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write a file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read a file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Asset or cache entry not found
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Invalid cache name or asset path
    #[display("Invalid path: {}", _0)]
    InvalidPath(String),
    /// Caller lacks write permission for the target
    #[display("Permission denied: {}", _0)]
    PermissionDenied(String),
    /// The store refused the request
    #[display("Rejected: {}", _0)]
    Rejected(String),
    /// Catalog row could not be encoded or decoded
    #[display("Catalog error: {}", _0)]
    Catalog(String),
    /// Store backend is unavailable
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),
}

/// Asset store error with location tracking.
///
/// # Examples
///
/// ```
/// use photon_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::NotFound("asset 7".to_string()));
/// assert!(format!("{}", err).contains("Not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the store refused the call for lack of write permission.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.kind, StoreErrorKind::PermissionDenied(_))
    }
}
