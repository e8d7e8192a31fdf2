//! Cache slot naming.

use chrono::Utc;
use photon_error::{PhotonResult, StoreError, StoreErrorKind};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of a temporary file in the store's cache directory.
///
/// Format: `{timestamp_nanos}_{counter}.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("{}", _0)]
pub struct CacheName(String);

impl CacheName {
    /// Parse a cache name received from elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the name is empty, contains a path separator,
    /// starts with a dot or has no extension.
    pub fn parse(name: impl Into<String>) -> PhotonResult<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
            && name.rsplit_once('.').is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty());
        if !valid {
            return Err(StoreError::new(StoreErrorKind::InvalidPath(format!(
                "invalid cache name: {:?}",
                name
            )))
            .into());
        }
        Ok(Self(name))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension part of the name.
    pub fn extension(&self) -> &str {
        self.0.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default()
    }
}

/// Process-wide source of collision-free cache names.
///
/// The counter only ever increases, so two names allocated in the same
/// nanosecond still differ.
///
/// # Examples
///
/// ```
/// use photon_store::CacheAllocator;
///
/// let allocator = CacheAllocator::new();
/// let a = allocator.allocate("jpg");
/// let b = allocator.allocate("jpg");
/// assert_ne!(a, b);
/// assert!(a.as_str().ends_with("_0.jpg"));
/// ```
#[derive(Debug, Default)]
pub struct CacheAllocator {
    next: AtomicU64,
}

static GLOBAL_ALLOCATOR: OnceLock<CacheAllocator> = OnceLock::new();

impl CacheAllocator {
    /// Create an allocator whose counter starts at zero.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// The process-wide allocator, initialised on first use.
    pub fn global() -> &'static CacheAllocator {
        GLOBAL_ALLOCATOR.get_or_init(CacheAllocator::new)
    }

    /// Allocate a fresh cache name with the given extension.
    pub fn allocate(&self, extension: &str) -> CacheName {
        let counter = self.next.fetch_add(1, Ordering::Relaxed);
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        let name = CacheName(format!("{}_{}.{}", timestamp, counter, extension));
        tracing::trace!(cache_name = %name, "Allocated cache name");
        name
    }
}
