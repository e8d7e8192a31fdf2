//! Opened library handle.

use crate::PhotonConfig;
use photon_change::AssetLibrary;
use photon_error::PhotonResult;
use photon_store::{AssetStore, FileSystemAssetStore};
use std::sync::Arc;

/// A filesystem asset store together with the library that changes it.
///
/// # Example
///
/// ```rust,no_run
/// use photon::{CreationOptions, MediaType, Photon, PhotonConfig, ResourceType};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let photon = Photon::open(PhotonConfig::load()?)?;
/// let mut request = photon
///     .library()
///     .create_asset_request(CreationOptions::new(MediaType::Image, "jpg"))?;
/// request.add_resource_from_path("/tmp/photo.jpg", ResourceType::ImageResource)?;
/// let asset = request.commit().await?;
/// println!("created {}", asset);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Photon {
    config: PhotonConfig,
    store: Arc<FileSystemAssetStore>,
    library: AssetLibrary,
}

impl Photon {
    /// Open the store described by `config` and build a library over it.
    ///
    /// # Errors
    ///
    /// Returns the store's error if its directories cannot be created or its
    /// catalog cannot be read.
    #[tracing::instrument(skip(config), fields(grant_write = config.store.grant_write()))]
    pub fn open(config: PhotonConfig) -> PhotonResult<Self> {
        let store = Arc::new(FileSystemAssetStore::open(&config.store)?);
        let shared: Arc<dyn AssetStore> = store.clone();
        let library = AssetLibrary::new(shared, config.change.clone())
            .with_copy_buffer_bytes(config.store.copy_buffer_bytes());

        tracing::info!(root = %store.root().display(), "Photon library opened");
        Ok(Self {
            config,
            store,
            library,
        })
    }

    /// Configuration the library was opened with.
    pub fn config(&self) -> &PhotonConfig {
        &self.config
    }

    /// The filesystem store.
    pub fn store(&self) -> &Arc<FileSystemAssetStore> {
        &self.store
    }

    /// Entry point for change requests.
    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }
}
