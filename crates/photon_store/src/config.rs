//! Store configuration (`[store]` section).

use photon_error::{PhotonResult, StoreError, StoreErrorKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of the filesystem asset store.
///
/// # Examples
///
/// ```
/// use photon_store::StoreConfig;
///
/// let config = StoreConfig::default().with_root("/srv/photon").with_grant_write(false);
/// assert_eq!(config.resolved_root().unwrap(), std::path::PathBuf::from("/srv/photon"));
/// assert!(!config.grant_write());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct StoreConfig {
    /// Store root; defaults to `{data_dir}/photon`
    #[serde(default)]
    #[setters(strip_option, into)]
    root: Option<PathBuf>,

    /// Cache directory, relative to the root
    #[serde(default = "default_cache_dir")]
    #[setters(into)]
    cache_dir: String,

    /// Whether callers hold write permission
    #[serde(default = "default_grant_write")]
    grant_write: bool,

    /// Buffer size for streamed resource copies
    #[serde(default = "default_copy_buffer_bytes")]
    copy_buffer_bytes: usize,
}

fn default_cache_dir() -> String {
    ".cache".to_string()
}

fn default_grant_write() -> bool {
    true
}

fn default_copy_buffer_bytes() -> usize {
    64 * 1024
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            cache_dir: default_cache_dir(),
            grant_write: default_grant_write(),
            copy_buffer_bytes: default_copy_buffer_bytes(),
        }
    }
}

impl StoreConfig {
    /// Configured root, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Cache directory name, relative to the root.
    pub fn cache_dir(&self) -> &str {
        &self.cache_dir
    }

    /// Whether callers hold write permission.
    pub fn grant_write(&self) -> bool {
        self.grant_write
    }

    /// Buffer size for streamed resource copies.
    pub fn copy_buffer_bytes(&self) -> usize {
        self.copy_buffer_bytes
    }

    /// Root directory of the store.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if no root is configured and the platform has
    /// no data directory.
    pub fn resolved_root(&self) -> PhotonResult<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("photon"))
            .ok_or_else(|| {
                StoreError::new(StoreErrorKind::Unavailable(
                    "no data directory for the current user".to_string(),
                ))
                .into()
            })
    }
}
