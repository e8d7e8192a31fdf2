//! Configuration error types.

use std::path::{Path, PathBuf};

/// Which step of loading the configuration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigStage {
    /// Reading or merging the configuration sources
    #[display("read")]
    Read,
    /// Deserializing the merged sources into settings
    #[display("parse")]
    Parse,
}

/// Configuration error naming the failing source and location.
#[derive(Debug, Clone, derive_more::Error)]
pub struct ConfigError {
    /// Step that failed
    pub stage: ConfigStage,
    /// Configuration file being loaded; `None` for the layered sources
    pub path: Option<PathBuf>,
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use photon_error::{ConfigError, ConfigStage};
    ///
    /// let err = ConfigError::new(ConfigStage::Read, "store root is not a directory")
    ///     .with_path("/etc/photon/photon.toml");
    /// assert_eq!(err.stage, ConfigStage::Read);
    /// assert!(format!("{}", err).contains("/etc/photon/photon.toml"));
    /// ```
    #[track_caller]
    pub fn new(stage: ConfigStage, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            stage,
            path: None,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Name the configuration file that failed.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Configuration file that failed, if a single file was loaded.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration Error: failed to {} ", self.stage)?;
        match &self.path {
            Some(path) => write!(f, "{}", path.display())?,
            None => write!(f, "layered configuration")?,
        }
        write!(f, ": {} at line {} in {}", self.message, self.line, self.file)
    }
}
