//! Filesystem-based asset store implementation.
//!
//! Reference backend for [`AssetStore`]: resources live in a per-asset
//! directory, rows in one JSON file each.

use crate::{
    AssetRow, AssetStore, CacheName, CacheSubmission, StoreConfig, SubmitTarget, WriteHandle,
    WriteTarget,
};
use photon_core::{
    AssetId, AssetRecord, AssetRef, AttributeDelta, CreationAttributes, EditMetadata, MediaType,
    MovingPhotoEffectMode, PendingMarker, PhotoSubtype,
};
use photon_error::{PhotonResult, StoreError, StoreErrorKind};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

const CATALOG_DIR: &str = "catalog";
const ASSETS_DIR: &str = "assets";
const ORIGINAL_SUFFIX: &str = "original";
const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

/// Filesystem asset store.
///
/// # Layout
///
/// ```text
/// {root}/
/// ├── .cache/
/// │   └── 1718000000000000000_0.jpg      (staged cache file)
/// ├── assets/
/// │   ├── images/
/// │   │   └── 1/
/// │   │       ├── IMG_0001.jpg
/// │   │       ├── IMG_0001.jpg.original  (bytes before the first edit)
/// │   │       └── IMG_0001.mp4           (moving photo companion video)
/// │   └── videos/
/// │       └── 2/
/// │           └── VID_0002.mp4
/// └── catalog/
///     ├── 1.json
///     └── 2.json
/// ```
///
/// # Features
///
/// - **Atomic row writes**: temp file + rename
/// - **Content hashes**: SHA-256 of each finalized primary resource
/// - **Edit history**: the first edit keeps the previous bytes for revert
/// - **Write grant**: without it, cache writes and submissions are refused
///   and only rows created through [`AssetStore::insert_privileged`] accept
///   direct writes
pub struct FileSystemAssetStore {
    root: PathBuf,
    cache_dir: PathBuf,
    grant_write: bool,
    rows: RwLock<BTreeMap<AssetId, AssetRow>>,
    next_id: AtomicI64,
}

impl FileSystemAssetStore {
    /// Open (or create) a store.
    ///
    /// Creates the directory layout and loads every catalog row.
    ///
    /// # Errors
    ///
    /// Returns error if a directory cannot be created or a catalog row cannot
    /// be read or decoded.
    #[tracing::instrument(skip(config), fields(grant_write = config.grant_write()))]
    pub fn open(config: &StoreConfig) -> PhotonResult<Self> {
        let root = config.resolved_root()?;
        let cache_dir = root.join(config.cache_dir());

        for dir in [
            cache_dir.clone(),
            root.join(ASSETS_DIR).join(type_dir(MediaType::Image)),
            root.join(ASSETS_DIR).join(type_dir(MediaType::Video)),
            root.join(CATALOG_DIR),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            })?;
        }

        let rows = Self::load_catalog(&root.join(CATALOG_DIR))?;
        let next_id = rows.keys().map(|id| id.0).max().unwrap_or(0) + 1;

        tracing::info!(
            root = %root.display(),
            assets = rows.len(),
            next_id,
            "Opened filesystem asset store"
        );

        Ok(Self {
            root,
            cache_dir,
            grant_write: config.grant_write(),
            rows: RwLock::new(rows),
            next_id: AtomicI64::new(next_id),
        })
    }

    fn load_catalog(dir: &Path) -> PhotonResult<BTreeMap<AssetId, AssetRow>> {
        let mut rows = BTreeMap::new();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            StoreError::new(StoreErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| {
                    StoreError::new(StoreErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
                })?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let text = std::fs::read_to_string(&path).map_err(|e| {
                StoreError::new(StoreErrorKind::FileRead(format!("{}: {}", path.display(), e)))
            })?;
            let row: AssetRow = serde_json::from_str(&text).map_err(|e| {
                StoreError::new(StoreErrorKind::Catalog(format!("{}: {}", path.display(), e)))
            })?;
            rows.insert(*row.id(), row);
        }

        Ok(rows)
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a cache file.
    pub fn cache_path(&self, name: &CacheName) -> PathBuf {
        self.cache_dir.join(name.as_str())
    }

    /// Absolute path of an asset's primary resource.
    pub async fn resource_path(&self, id: AssetId) -> Option<PathBuf> {
        self.rows.read().await.get(&id).map(|row| self.root.join(row.path()))
    }

    /// Absolute path of a moving photo's companion video.
    pub async fn video_path(&self, id: AssetId) -> Option<PathBuf> {
        self.rows
            .read()
            .await
            .get(&id)
            .and_then(|row| row.video_path().as_ref().map(|path| self.root.join(path)))
    }

    /// Full catalog row of an asset.
    pub async fn row(&self, id: AssetId) -> Option<AssetRow> {
        self.rows.read().await.get(&id).cloned()
    }

    fn require_grant(&self, action: &str) -> Result<(), StoreError> {
        if self.grant_write {
            Ok(())
        } else {
            Err(StoreError::new(StoreErrorKind::PermissionDenied(format!(
                "{} requires write permission",
                action
            ))))
        }
    }

    fn allocate_id(&self) -> AssetId {
        AssetId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Relative resource paths for a new asset.
    fn layout(
        id: AssetId,
        attributes: &CreationAttributes,
        video_extension: Option<&str>,
    ) -> (PathBuf, Option<PathBuf>) {
        let dir = Path::new(ASSETS_DIR)
            .join(type_dir(*attributes.media_type()))
            .join(id.0.to_string());
        let path = dir.join(attributes.display_name());
        let video_path = video_extension
            .map(|ext| dir.join(format!("{}.{}", stem_of(attributes.display_name()), ext)));
        (path, video_path)
    }

    fn uri_for(id: AssetId, attributes: &CreationAttributes) -> String {
        format!(
            "file://media/{}/{}/{}/{}",
            attributes.media_type().uri_segment(),
            id,
            stem_of(attributes.display_name()),
            attributes.display_name()
        )
    }

    async fn persist_row(&self, row: &AssetRow) -> Result<(), StoreError> {
        let path = self.root.join(CATALOG_DIR).join(format!("{}.json", row.id()));
        let json = serde_json::to_vec_pretty(row)
            .map_err(|e| StoreError::new(StoreErrorKind::Catalog(format!("row {}: {}", row.id(), e))))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| write_error(&temp_path, e))?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StoreError::new(StoreErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::trace!(id = %row.id(), path = %path.display(), "Persisted catalog row");
        Ok(())
    }

    /// Move a staged cache file to `to` (relative to the root).
    async fn adopt_cache(&self, name: &CacheName, to: &Path) -> Result<(), StoreError> {
        let from = self.cache_path(name);
        if !tokio::fs::try_exists(&from).await.unwrap_or(false) {
            return Err(StoreError::new(StoreErrorKind::NotFound(format!(
                "cache file {}",
                name
            ))));
        }

        let to = self.root.join(to);
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        tokio::fs::rename(&from, &to).await.map_err(|e| {
            StoreError::new(StoreErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                from.display(),
                to.display(),
                e
            )))
        })?;

        tracing::debug!(cache_name = %name, path = %to.display(), "Adopted cache file");
        Ok(())
    }

    /// Keep the current bytes at `path` as `{path}.original`, unless a backup
    /// already exists. Returns the backup path.
    async fn keep_original(
        &self,
        path: &Path,
        existing: Option<&PathBuf>,
    ) -> Result<Option<PathBuf>, StoreError> {
        if let Some(existing) = existing {
            return Ok(Some(existing.clone()));
        }
        let absolute = self.root.join(path);
        if !tokio::fs::try_exists(&absolute).await.unwrap_or(false) {
            return Ok(None);
        }

        let mut backup = path.as_os_str().to_owned();
        backup.push(".");
        backup.push(ORIGINAL_SUFFIX);
        let backup = PathBuf::from(backup);

        tokio::fs::copy(&absolute, self.root.join(&backup))
            .await
            .map_err(|e| write_error(&backup, e))?;
        tracing::debug!(path = %path.display(), "Kept original bytes before first edit");
        Ok(Some(backup))
    }

    async fn create_from_cache(
        &self,
        attributes: CreationAttributes,
        primary: Option<CacheName>,
        secondary: Option<CacheName>,
    ) -> Result<AssetRef, StoreError> {
        let primary = primary.ok_or_else(|| {
            StoreError::new(StoreErrorKind::Rejected(
                "creation requires a primary cache file".to_string(),
            ))
        })?;
        if *attributes.subtype() == PhotoSubtype::MovingPhoto && secondary.is_none() {
            return Err(StoreError::new(StoreErrorKind::Rejected(
                "moving photo creation requires a companion video".to_string(),
            )));
        }

        let mut rows = self.rows.write().await;
        let id = self.allocate_id();
        let (path, video_path) =
            Self::layout(id, &attributes, secondary.as_ref().map(CacheName::extension));

        self.adopt_cache(&primary, &path).await?;
        if let (Some(secondary), Some(video_path)) = (&secondary, &video_path) {
            self.adopt_cache(secondary, video_path).await?;
        }

        let uri = Self::uri_for(id, &attributes);
        let mut row = AssetRow::new(id, uri.clone(), &attributes, path, video_path);
        row.set_content_hash(hash_file(&self.root.join(row.path())).await?);
        self.persist_row(&row).await?;
        rows.insert(id, row);

        tracing::info!(
            id = %id,
            uri = %uri,
            display_name = %attributes.display_name(),
            "Created asset from cache"
        );
        Ok(AssetRef::new(id, uri))
    }

    async fn replace_from_cache(
        &self,
        id: AssetId,
        edit_metadata: Option<EditMetadata>,
        effect_mode: Option<MovingPhotoEffectMode>,
        primary: Option<CacheName>,
        secondary: Option<CacheName>,
    ) -> Result<AssetRef, StoreError> {
        let mut rows = self.rows.write().await;
        let mut row = rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::new(StoreErrorKind::NotFound(format!("asset {}", id))))?;
        let is_edit = edit_metadata.is_some();

        if let Some(primary) = &primary {
            let path = row.path().clone();
            if is_edit {
                let backup = self.keep_original(&path, row.original_path().as_ref()).await?;
                row.set_original_path(backup);
            }
            self.adopt_cache(primary, &path).await?;
            row.set_content_hash(hash_file(&self.root.join(&path)).await?);
        }

        if let Some(secondary) = &secondary {
            let video_path = match row.video_path() {
                Some(path) => path.clone(),
                None => {
                    let path = row.path().with_extension(secondary.extension());
                    row.set_video_path(path.clone());
                    path
                }
            };
            if is_edit {
                let backup = self
                    .keep_original(&video_path, row.original_video_path().as_ref())
                    .await?;
                row.set_original_video_path(backup);
            }
            self.adopt_cache(secondary, &video_path).await?;
        }

        if is_edit {
            row.set_edit(edit_metadata);
        }
        if let Some(mode) = effect_mode {
            row.set_effect_mode(mode);
        }
        row.set_pending(PendingMarker::Unset);

        self.persist_row(&row).await?;
        let asset = AssetRef::new(id, row.uri().clone());
        rows.insert(id, row);

        tracing::info!(id = %id, edited = is_edit, "Replaced asset bytes from cache");
        Ok(asset)
    }
}

impl std::fmt::Debug for FileSystemAssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemAssetStore")
            .field("root", &self.root)
            .field("cache_dir", &self.cache_dir)
            .field("grant_write", &self.grant_write)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl AssetStore for FileSystemAssetStore {
    #[tracing::instrument(skip(self, target), fields(target = %target))]
    async fn open_write_handle(&self, target: &WriteTarget) -> PhotonResult<WriteHandle> {
        let path = match target {
            WriteTarget::Cache(name) => {
                self.require_grant("writing a cache file")?;
                self.cache_path(name)
            }
            WriteTarget::Asset(id) | WriteTarget::AssetVideo(id) => {
                let rows = self.rows.read().await;
                let row = rows.get(id).ok_or_else(|| {
                    StoreError::new(StoreErrorKind::NotFound(format!("asset {}", id)))
                })?;
                if !*row.privileged() {
                    self.require_grant("writing an asset")?;
                }
                let relative = match target {
                    WriteTarget::AssetVideo(_) => row.video_path().clone().ok_or_else(|| {
                        StoreError::new(StoreErrorKind::Rejected(format!(
                            "asset {} has no companion video",
                            id
                        )))
                    })?,
                    _ => row.path().clone(),
                };
                self.root.join(relative)
            }
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| write_error(&path, e))?;

        tracing::debug!(path = %path.display(), "Opened write handle");
        Ok(Box::pin(file))
    }

    #[tracing::instrument(
        skip(self, submission),
        fields(
            primary = ?submission.primary.as_ref().map(CacheName::as_str),
            secondary = ?submission.secondary.as_ref().map(CacheName::as_str),
        )
    )]
    async fn submit_cache(&self, submission: CacheSubmission) -> PhotonResult<AssetRef> {
        self.require_grant("submitting cache files")?;
        if submission.primary.is_none() && submission.secondary.is_none() {
            return Err(StoreError::new(StoreErrorKind::Rejected(
                "submission carries no cache file".to_string(),
            ))
            .into());
        }

        let asset = match submission.target {
            SubmitTarget::Create(attributes) => {
                self.create_from_cache(attributes, submission.primary, submission.secondary)
                    .await?
            }
            SubmitTarget::Existing {
                id,
                edit_metadata,
                effect_mode,
            } => {
                self.replace_from_cache(
                    id,
                    edit_metadata,
                    effect_mode,
                    submission.primary,
                    submission.secondary,
                )
                .await?
            }
        };
        Ok(asset)
    }

    #[tracing::instrument(skip(self, id, delta), fields(asset_id = %id))]
    async fn update(&self, id: AssetId, delta: &AttributeDelta) -> PhotonResult<u64> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&id) else {
            tracing::debug!("Update matched no asset");
            return Ok(0);
        };
        if !*row.privileged() {
            self.require_grant("updating an asset")?;
        }

        let mut updated = row.clone();
        if delta.edit_metadata.is_some() {
            // Bytes written straight to the asset after this edit stay revertible
            let backup = self
                .keep_original(updated.path(), updated.original_path().as_ref())
                .await?;
            updated.set_original_path(backup);
            if let Some(video_path) = updated.video_path().clone() {
                let backup = self
                    .keep_original(&video_path, updated.original_video_path().as_ref())
                    .await?;
                updated.set_original_video_path(backup);
            }
        }
        if updated.apply(delta) {
            self.persist_row(&updated).await?;
            *row = updated;
            tracing::debug!("Updated asset attributes");
        }
        Ok(1)
    }

    #[tracing::instrument(skip(self, attributes), fields(display_name = %attributes.display_name()))]
    async fn insert_privileged(&self, attributes: &CreationAttributes) -> PhotonResult<AssetRef> {
        let mut rows = self.rows.write().await;
        let id = self.allocate_id();
        let video_extension = (*attributes.subtype() == PhotoSubtype::MovingPhoto)
            .then_some(DEFAULT_VIDEO_EXTENSION);
        let (path, video_path) = Self::layout(id, attributes, video_extension);

        for relative in std::iter::once(&path).chain(video_path.as_ref()) {
            let absolute = self.root.join(relative);
            if let Some(parent) = absolute.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                        "{}: {}",
                        parent.display(),
                        e
                    )))
                })?;
            }
            tokio::fs::File::create(&absolute)
                .await
                .map_err(|e| write_error(&absolute, e))?;
        }

        let uri = Self::uri_for(id, attributes);
        let mut row = AssetRow::new(id, uri.clone(), attributes, path, video_path);
        row.mark_privileged();
        self.persist_row(&row).await?;
        rows.insert(id, row);

        tracing::info!(id = %id, uri = %uri, "Created asset through privileged path");
        Ok(AssetRef::new(id, uri))
    }

    async fn fetch(&self, id: AssetId) -> PhotonResult<Option<AssetRecord>> {
        Ok(self.rows.read().await.get(&id).map(AssetRow::to_record))
    }

    #[tracing::instrument(skip(self, id), fields(asset_id = %id))]
    async fn revert_to_original(&self, id: AssetId) -> PhotonResult<()> {
        let mut rows = self.rows.write().await;
        let mut row = rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::new(StoreErrorKind::NotFound(format!("asset {}", id))))?;
        if !*row.privileged() {
            self.require_grant("reverting an asset")?;
        }
        if row.original_path().is_none() && row.original_video_path().is_none() {
            return Err(StoreError::new(StoreErrorKind::Rejected(format!(
                "asset {} has no original to restore",
                id
            )))
            .into());
        }

        let restores = [
            (row.original_path().clone(), Some(row.path().clone())),
            (row.original_video_path().clone(), row.video_path().clone()),
        ];
        for (backup, target) in restores {
            if let (Some(backup), Some(target)) = (backup, target) {
                let from = self.root.join(&backup);
                let to = self.root.join(&target);
                tokio::fs::rename(&from, &to).await.map_err(|e| {
                    StoreError::new(StoreErrorKind::FileWrite(format!(
                        "rename {} to {}: {}",
                        from.display(),
                        to.display(),
                        e
                    )))
                })?;
            }
        }

        row.set_original_path(None);
        row.set_original_video_path(None);
        row.set_edit(None);
        row.set_content_hash(hash_file(&self.root.join(row.path())).await?);
        self.persist_row(&row).await?;
        rows.insert(id, row);

        tracing::info!("Reverted asset to original");
        Ok(())
    }

    fn delete_cache(&self, name: &CacheName) -> PhotonResult<()> {
        let path = self.cache_path(name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted cache file");
                Ok(())
            }
            // Slot allocated but never written
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::new(StoreErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }
}

fn type_dir(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Image => "images",
        MediaType::Video => "videos",
    }
}

fn stem_of(display_name: &str) -> &str {
    display_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(display_name)
}

fn write_error(path: &Path, e: std::io::Error) -> StoreError {
    match e.kind() {
        std::io::ErrorKind::NotFound => {
            StoreError::new(StoreErrorKind::NotFound(path.display().to_string()))
        }
        std::io::ErrorKind::PermissionDenied => StoreError::new(StoreErrorKind::PermissionDenied(
            format!("{}: {}", path.display(), e),
        )),
        _ => StoreError::new(StoreErrorKind::FileWrite(format!("{}: {}", path.display(), e))),
    }
}

/// Compute the SHA-256 of a file without loading it whole.
async fn hash_file(path: &Path) -> Result<String, StoreError> {
    let mut file = tokio::fs::File::open(path).await.map_err(|e| {
        StoreError::new(StoreErrorKind::FileRead(format!("{}: {}", path.display(), e)))
    })?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buf).await.map_err(|e| {
            StoreError::new(StoreErrorKind::FileRead(format!("{}: {}", path.display(), e)))
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
