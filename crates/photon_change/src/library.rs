//! Entry points for building change requests.

use crate::{
    AssetChangeOperation as Op, CallerContext, ChangeConfig, ChangeRequest, EditCommitGuard,
    ResourceStager,
};
use chrono::Utc;
use photon_core::{
    AssetId, AssetRecord, CreationAttributes, MediaType, PendingMarker, PhotoSubtype,
    check_display_name, check_title, extension_of,
};
use photon_error::{ChangeRequestError, PhotonResult};
use photon_store::AssetStore;
use std::path::PathBuf;
use std::sync::Arc;

const MOVING_PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "heic", "heif"];
const DEFAULT_COPY_BUFFER_BYTES: usize = 64 * 1024;

/// Options for [`AssetLibrary::create_asset_request`].
///
/// # Examples
///
/// ```
/// use photon_change::CreationOptions;
/// use photon_core::{MediaType, PhotoSubtype};
///
/// let options = CreationOptions::new(MediaType::Image, "heic")
///     .with_title("IMG_0042")
///     .with_subtype(PhotoSubtype::MovingPhoto);
/// assert_eq!(options.extension(), "heic");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct CreationOptions {
    #[setters(skip)]
    media_type: MediaType,
    #[setters(skip)]
    extension: String,
    /// Title without extension; defaults to `IMG_<timestamp>` or `VID_<timestamp>`
    #[setters(strip_option, into)]
    title: Option<String>,
    /// `Default` or `MovingPhoto`
    subtype: PhotoSubtype,
    /// Groups captures of one camera shot
    #[setters(strip_option, into)]
    camera_shot_key: Option<String>,
}

impl CreationOptions {
    /// Options for a new asset of `media_type` with file `extension`.
    pub fn new(media_type: MediaType, extension: impl Into<String>) -> Self {
        Self {
            media_type,
            extension: extension.into(),
            title: None,
            subtype: PhotoSubtype::Default,
            camera_shot_key: None,
        }
    }

    /// Media type.
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// File extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// Creates change requests against one asset store.
///
/// # Example
///
/// ```rust,no_run
/// use photon_change::{AssetLibrary, ChangeConfig, CreationOptions};
/// use photon_core::{MediaType, ResourceType};
/// use photon_store::{FileSystemAssetStore, StoreConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(FileSystemAssetStore::open(&StoreConfig::default())?);
/// let library = AssetLibrary::new(store, ChangeConfig::default());
///
/// let mut request = library.create_asset_request(CreationOptions::new(MediaType::Image, "jpg"))?;
/// request.add_resource_from_path("/tmp/photo.jpg", ResourceType::ImageResource)?;
/// let asset = request.commit().await?;
/// println!("created {}", asset);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AssetLibrary {
    store: Arc<dyn AssetStore>,
    guard: Arc<EditCommitGuard>,
    caller: CallerContext,
    config: ChangeConfig,
    copy_buffer_bytes: usize,
}

impl AssetLibrary {
    /// Create a library for application callers, sharing the process-wide
    /// edit guard.
    pub fn new(store: Arc<dyn AssetStore>, config: ChangeConfig) -> Self {
        Self {
            store,
            guard: EditCommitGuard::global(),
            caller: CallerContext::application(),
            config,
            copy_buffer_bytes: DEFAULT_COPY_BUFFER_BYTES,
        }
    }

    /// Use a dedicated edit guard.
    pub fn with_guard(mut self, guard: Arc<EditCommitGuard>) -> Self {
        self.guard = guard;
        self
    }

    /// Act on behalf of another caller.
    pub fn with_caller(mut self, caller: CallerContext) -> Self {
        self.caller = caller;
        self
    }

    /// Buffer size for streamed resource copies.
    pub fn with_copy_buffer_bytes(mut self, bytes: usize) -> Self {
        self.copy_buffer_bytes = bytes;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    /// The edit/revert guard.
    pub fn guard(&self) -> &Arc<EditCommitGuard> {
        &self.guard
    }

    /// The caller requests act for.
    pub fn caller(&self) -> CallerContext {
        self.caller
    }

    /// Change pipeline configuration.
    pub fn config(&self) -> &ChangeConfig {
        &self.config
    }

    pub(crate) fn stager(&self) -> ResourceStager {
        ResourceStager::new(Arc::clone(&self.store), self.copy_buffer_bytes)
    }

    /// Start a request creating a new asset from staged bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an extension that does not fit the media
    /// type, a bad title, or a moving photo that is not a JPEG or HEIF image.
    pub fn create_asset_request(&self, options: CreationOptions) -> PhotonResult<ChangeRequest> {
        let max_len = *self.config.max_display_name_len();
        let extension = options.extension.trim_start_matches('.').to_ascii_lowercase();
        if MediaType::from_extension(&extension) != Some(options.media_type) {
            return Err(ChangeRequestError::invalid(format!(
                "Extension {} does not fit media type {}",
                extension, options.media_type
            ))
            .into());
        }
        match options.subtype {
            PhotoSubtype::Default => {}
            PhotoSubtype::MovingPhoto => {
                if options.media_type != MediaType::Image
                    || !MOVING_PHOTO_EXTENSIONS.contains(&extension.as_str())
                {
                    return Err(ChangeRequestError::invalid(format!(
                        "A moving photo must be a JPEG or HEIF image, not {}",
                        extension
                    ))
                    .into());
                }
            }
            other => {
                return Err(ChangeRequestError::invalid(format!(
                    "Cannot create an asset of subtype {}",
                    other
                ))
                .into());
            }
        }

        let title = match options.title {
            Some(title) => title,
            None => default_title(options.media_type),
        };
        check_title(&title, max_len)?;
        let display_name = format!("{}.{}", title, extension);
        check_display_name(&display_name, max_len)?;

        let mut attributes = CreationAttributes::new(display_name.clone(), options.media_type)
            .with_subtype(options.subtype);
        if let Some(key) = options.camera_shot_key {
            attributes = attributes.with_camera_shot_key(key);
        }
        let record = AssetRecord::new(display_name, options.media_type)
            .with_subtype(options.subtype)
            .with_pending(PendingMarker::CreatePending);

        tracing::debug!(
            display_name = %record.display_name(),
            subtype = %options.subtype,
            "Starting asset creation"
        );
        Ok(ChangeRequest::for_creation(
            record,
            attributes,
            Op::CreateFromScratch,
            self,
        ))
    }

    /// Start a request creating a new asset by copying a file.
    ///
    /// The display name is the file's name. The file is read at commit; a
    /// missing file fails the commit with `NoSuchFile`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the path has no usable file name or its
    /// extension does not fit the media type.
    pub fn create_from_source_path(
        &self,
        path: impl Into<PathBuf>,
        media_type: MediaType,
    ) -> PhotonResult<ChangeRequest> {
        let path = path.into();
        let display_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ChangeRequestError::invalid(format!("Invalid source path: {}", path.display()))
            })?;
        check_display_name(&display_name, *self.config.max_display_name_len())?;
        let extension = extension_of(&display_name).unwrap_or_default();
        if MediaType::from_extension(&extension) != Some(media_type) {
            return Err(ChangeRequestError::invalid(format!(
                "Extension {} does not fit media type {}",
                extension, media_type
            ))
            .into());
        }

        let attributes = CreationAttributes::new(display_name.clone(), media_type);
        let record = AssetRecord::new(display_name, media_type)
            .with_pending(PendingMarker::CreatePending);
        let mut request =
            ChangeRequest::for_creation(record, attributes, Op::CreateFromSourcePath, self);
        request.set_source_path(path);
        Ok(request)
    }

    /// Start a request changing an existing asset.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the record has not been committed.
    pub fn change_request(&self, record: AssetRecord) -> PhotonResult<ChangeRequest> {
        if !record.id().is_durable() {
            return Err(ChangeRequestError::invalid(
                "Asset has not been created; use a creation request",
            )
            .into());
        }
        Ok(ChangeRequest::new(record, self))
    }

    /// Load an asset by id.
    pub async fn get_asset(&self, id: AssetId) -> PhotonResult<Option<AssetRecord>> {
        self.store.fetch(id).await
    }

    /// Restore an edited asset's original bytes and refresh `record`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an uncommitted record,
    /// `OperationNotSupported` while an edit of the asset is being committed,
    /// or the store's error.
    #[tracing::instrument(skip(self, record), fields(asset_id = %record.id()))]
    pub async fn revert_to_original(&self, record: &mut AssetRecord) -> PhotonResult<()> {
        let id = record.id();
        if !id.is_durable() {
            return Err(ChangeRequestError::invalid("Asset has not been created").into());
        }
        if !self.guard.try_start_revert(id) {
            return Err(ChangeRequestError::not_supported(format!(
                "Asset {} is being edited or reverted",
                id
            ))
            .into());
        }

        let result = self.store.revert_to_original(id).await;
        self.guard.end_revert(id);
        result?;

        if let Some(fresh) = self.store.fetch(id).await? {
            *record = fresh;
        }
        tracing::info!("Asset reverted to original");
        Ok(())
    }
}

impl std::fmt::Debug for AssetLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLibrary")
            .field("caller", &self.caller)
            .field("config", &self.config)
            .field("copy_buffer_bytes", &self.copy_buffer_bytes)
            .finish_non_exhaustive()
    }
}

fn default_title(media_type: MediaType) -> String {
    let prefix = match media_type {
        MediaType::Image => "IMG",
        MediaType::Video => "VID",
    };
    format!("{}_{}", prefix, Utc::now().format("%Y%m%d_%H%M%S_%3f"))
}
