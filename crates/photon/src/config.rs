//! Layered configuration for the whole library.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`photon.toml` shipped with the library)
//! 2. `~/.config/photon/photon.toml`
//! 3. `./photon.toml`

use config::{Config, File, FileFormat};
use photon_change::ChangeConfig;
use photon_core::TelemetryConfig;
use photon_error::{ConfigError, ConfigStage, PhotonError, PhotonResult};
use photon_store::StoreConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../photon.toml");

/// Top-level Photon configuration.
///
/// # Example
///
/// ```no_run
/// use photon::PhotonConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PhotonConfig::load()?;
/// println!("cache directory: {}", config.store.cache_dir());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct PhotonConfig {
    /// Asset store (`[store]`)
    #[serde(default)]
    pub store: StoreConfig,

    /// Change pipeline (`[change]`)
    #[serde(default)]
    pub change: ChangeConfig,

    /// Logging and tracing (`[telemetry]`)
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl PhotonConfig {
    /// Load configuration from one file, ignoring every other source.
    ///
    /// Sections missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> PhotonResult<Self> {
        debug!("Loading configuration from file");

        let path = path.as_ref();
        Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(|e| {
                PhotonError::from(ConfigError::new(ConfigStage::Read, e.to_string()).with_path(path))
            })?
            .try_deserialize()
            .map_err(|e| {
                PhotonError::from(ConfigError::new(ConfigStage::Parse, e.to_string()).with_path(path))
            })
    }

    /// Load configuration with precedence: current dir > home dir > bundled
    /// defaults.
    ///
    /// User files are optional and skipped when absent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a present file cannot be parsed.
    #[instrument]
    pub fn load() -> PhotonResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/photon/photon.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("photon").required(false));

        builder
            .build()
            .map_err(|e| PhotonError::from(ConfigError::new(ConfigStage::Read, e.to_string())))?
            .try_deserialize()
            .map_err(|e| PhotonError::from(ConfigError::new(ConfigStage::Parse, e.to_string())))
    }
}
