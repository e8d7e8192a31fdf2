//! The asset store trait and its call shapes.

use crate::CacheName;
use async_trait::async_trait;
use photon_core::{
    AssetId, AssetRecord, AssetRef, AttributeDelta, CreationAttributes, EditMetadata,
    MovingPhotoEffectMode,
};
use photon_error::PhotonResult;
use std::pin::Pin;
use tokio::io::AsyncWrite;

/// Byte sink handed out by [`AssetStore::open_write_handle`].
///
/// Callers must `shutdown` the sink once all bytes are written.
pub type WriteHandle = Pin<Box<dyn AsyncWrite + Send>>;

/// Where a write handle points.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum WriteTarget {
    /// A staged cache file
    #[display("cache:{}", _0)]
    Cache(CacheName),
    /// The primary resource of a committed asset
    #[display("asset:{}", _0)]
    Asset(AssetId),
    /// The companion video of a committed moving photo
    #[display("asset-video:{}", _0)]
    AssetVideo(AssetId),
}

/// Asset a cache submission finalizes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    /// Create a new asset
    Create(CreationAttributes),
    /// Replace the bytes of an existing asset
    Existing {
        /// Durable id of the asset
        id: AssetId,
        /// Edit metadata to store alongside the new bytes
        edit_metadata: Option<EditMetadata>,
        /// Effect mode to record in the same transaction
        effect_mode: Option<MovingPhotoEffectMode>,
    },
}

/// One finalize call: the target plus up to two staged cache files.
///
/// The secondary file is the companion video of a moving photo. A submission
/// carrying only a secondary file replaces just the video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSubmission {
    /// Asset to create or update
    pub target: SubmitTarget,
    /// Primary resource cache file
    pub primary: Option<CacheName>,
    /// Companion video cache file
    pub secondary: Option<CacheName>,
}

/// Durable storage of asset rows and resource bytes.
///
/// Implementations are shared between change requests and must be safe to
/// call concurrently. The store serializes its own writes.
///
/// # Implementation Notes
///
/// - `submit_cache` takes ownership of the named cache files on success
/// - `delete_cache` is synchronous so it can run from `Drop`; deleting a
///   name that was never written succeeds
/// - Calls made without write permission fail with `PermissionDenied`,
///   which callers may answer with [`AssetStore::insert_privileged`]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Open a byte sink for a cache file or an existing asset.
    async fn open_write_handle(&self, target: &WriteTarget) -> PhotonResult<WriteHandle>;

    /// Finalize staged cache files into a new or existing asset.
    ///
    /// Returns the asset's durable handle.
    async fn submit_cache(&self, submission: CacheSubmission) -> PhotonResult<AssetRef>;

    /// Apply a partial attribute update, returning the number of rows changed.
    async fn update(&self, id: AssetId, delta: &AttributeDelta) -> PhotonResult<u64>;

    /// Create an empty asset through the privileged path, for callers without
    /// write permission. Bytes are then written to the asset directly.
    async fn insert_privileged(&self, attributes: &CreationAttributes) -> PhotonResult<AssetRef>;

    /// Load the current row of an asset.
    async fn fetch(&self, id: AssetId) -> PhotonResult<Option<AssetRecord>>;

    /// Restore the bytes the asset had before its first edit.
    async fn revert_to_original(&self, id: AssetId) -> PhotonResult<()>;

    /// Delete a staged cache file.
    fn delete_cache(&self, name: &CacheName) -> PhotonResult<()>;
}
