//! Change requests: building, staging and commit.

use crate::dispatcher::{CommitDispatcher, ExecutionIntent};
use crate::{
    AssetChangeOperation as Op, AssetLibrary, CallerContext, ChangeConfig, EditCommitGuard,
    OperationLedger, ResourceStager, StagedResource, validate,
};
use photon_core::{
    AssetRecord, AssetRef, CreationAttributes, EditMetadata, MediaType, MovingPhotoEffectMode,
    PhotoProxy, ResourceType, check_display_name, check_title, extension_of,
};
use photon_error::{ChangeRequestError, ChangeRequestErrorKind, PhotonResult};
use photon_store::{AssetStore, CacheSlot, WriteHandle, WriteTarget};
use std::path::PathBuf;
use std::sync::Arc;

/// Lifecycle of a [`ChangeRequest`].
///
/// `Building → Validated → Applying → Committed | Failed`. Only `Building`
/// accepts new operations; `Committed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RequestState {
    /// Accepting operations
    #[display("building")]
    Building,
    /// Passed validation
    #[display("validated")]
    Validated,
    /// Executors running
    #[display("applying")]
    Applying,
    /// All operations applied
    #[display("committed")]
    Committed,
    /// Validation or an executor failed
    #[display("failed")]
    Failed,
}

/// A set of changes to one asset, applied together by [`ChangeRequest::commit`].
///
/// The request owns its target record and every cache slot it reserves.
/// Dropping it before a successful commit deletes those slots.
pub struct ChangeRequest {
    pub(crate) record: AssetRecord,
    pub(crate) store: Arc<dyn AssetStore>,
    pub(crate) stager: ResourceStager,
    guard: Arc<EditCommitGuard>,
    caller: CallerContext,
    config: ChangeConfig,
    pub(crate) ledger: OperationLedger,
    resources_added: Vec<ResourceType>,
    pub(crate) creation: Option<CreationAttributes>,
    pub(crate) source_path: Option<PathBuf>,
    pub(crate) primary: Option<StagedResource>,
    pub(crate) secondary: Option<StagedResource>,
    pub(crate) proxy: Option<PhotoProxy>,
    pub(crate) write_slot: Option<CacheSlot>,
    pub(crate) edit_metadata: Option<EditMetadata>,
    pub(crate) effect_mode: Option<MovingPhotoEffectMode>,
    pub(crate) title: Option<String>,
    pub(crate) favorite: Option<bool>,
    pub(crate) hidden: Option<bool>,
    pub(crate) user_comment: Option<String>,
    state: RequestState,
}

impl ChangeRequest {
    pub(crate) fn new(record: AssetRecord, library: &AssetLibrary) -> Self {
        Self {
            record,
            store: Arc::clone(library.store()),
            stager: library.stager(),
            guard: Arc::clone(library.guard()),
            caller: library.caller(),
            config: library.config().clone(),
            ledger: OperationLedger::new(),
            resources_added: Vec::new(),
            creation: None,
            source_path: None,
            primary: None,
            secondary: None,
            proxy: None,
            write_slot: None,
            edit_metadata: None,
            effect_mode: None,
            title: None,
            favorite: None,
            hidden: None,
            user_comment: None,
            state: RequestState::Building,
        }
    }

    pub(crate) fn for_creation(
        record: AssetRecord,
        attributes: CreationAttributes,
        operation: Op,
        library: &AssetLibrary,
    ) -> Self {
        let mut request = Self::new(record, library);
        request.creation = Some(attributes);
        request.ledger.record(operation);
        request
    }

    pub(crate) fn set_source_path(&mut self, path: PathBuf) {
        self.source_path = Some(path);
    }

    /// The target record.
    pub fn record(&self) -> &AssetRecord {
        &self.record
    }

    /// Give up the request and keep its record. Staged slots are deleted.
    pub fn into_record(self) -> AssetRecord {
        self.record
    }

    /// Recorded operations in replay order.
    pub fn ledger(&self) -> &OperationLedger {
        &self.ledger
    }

    /// Resource types staged so far.
    pub fn resources_added(&self) -> &[ResourceType] {
        &self.resources_added
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Handle of the target asset, once it exists in the store.
    pub fn asset(&self) -> Option<AssetRef> {
        self.record.asset_ref()
    }

    fn ensure_building(&self) -> PhotonResult<()> {
        if self.state != RequestState::Building {
            return Err(ChangeRequestError::invalid(format!(
                "Change request is {}",
                self.state
            ))
            .into());
        }
        Ok(())
    }

    /// Refuse a second outstanding write on the same record.
    fn check_write_operation(&self, resource_type: ResourceType) -> PhotonResult<()> {
        if self.record.is_moving_asset() {
            if self.resources_added.contains(&resource_type) {
                return Err(ChangeRequestError::not_supported(format!(
                    "Resource {} has already been added",
                    resource_type
                ))
                .into());
            }
            if self.ledger.count(Op::AddResource) > 1 {
                return Err(ChangeRequestError::not_supported(
                    "Moving photo resources have already been added",
                )
                .into());
            }
            return Ok(());
        }

        if self
            .ledger
            .contains_any(&[Op::CreateFromSourcePath, Op::OpenWriteHandle, Op::AddResource])
        {
            return Err(ChangeRequestError::not_supported(
                "The previous asset creation or write has not been committed",
            )
            .into());
        }

        let fits = match resource_type {
            ResourceType::PhotoProxy => self.record.media_type() == MediaType::Image,
            other => other == self.record.media_type().primary_resource(),
        };
        if !fits {
            return Err(ChangeRequestError::invalid(format!(
                "Resource {} does not fit a {} asset",
                resource_type,
                self.record.media_type()
            ))
            .into());
        }
        Ok(())
    }

    fn slot_extension(&self, resource_type: ResourceType) -> PhotonResult<String> {
        if self.record.is_moving_asset() && resource_type == ResourceType::VideoResource {
            return Ok(self.config.moving_photo_video_extension().clone());
        }
        extension_of(self.record.display_name()).ok_or_else(|| {
            ChangeRequestError::invalid(format!(
                "Display name has no extension: {}",
                self.record.display_name()
            ))
            .into()
        })
    }

    fn push_resource(&mut self, staged: StagedResource) {
        let resource_type = staged.resource_type();
        if self.record.is_moving_asset() && resource_type == ResourceType::VideoResource {
            self.secondary = Some(staged);
        } else {
            self.primary = Some(staged);
        }
        self.resources_added.push(resource_type);
        self.ledger.record(Op::AddResource);
    }

    /// Stage a resource from a file. The file is copied at commit.
    ///
    /// # Errors
    ///
    /// Returns `OperationNotSupported` if the resource type is already staged
    /// or another write is outstanding, `InvalidRequest` if the path or
    /// resource type does not fit the asset.
    pub fn add_resource_from_path(
        &mut self,
        path: impl Into<PathBuf>,
        resource_type: ResourceType,
    ) -> PhotonResult<()> {
        self.ensure_building()?;
        if resource_type == ResourceType::PhotoProxy {
            return Err(ChangeRequestError::invalid("Photo proxies are added from a proxy").into());
        }
        self.check_write_operation(resource_type)?;
        let extension = self.slot_extension(resource_type)?;
        let staged = self.stager.stage_path(path, resource_type, &extension)?;
        self.push_resource(staged);
        Ok(())
    }

    /// Stage a resource from memory.
    ///
    /// # Errors
    ///
    /// As [`ChangeRequest::add_resource_from_path`], and `InvalidRequest`
    /// for an empty buffer.
    pub fn add_resource_from_buffer(
        &mut self,
        bytes: Vec<u8>,
        resource_type: ResourceType,
    ) -> PhotonResult<()> {
        self.ensure_building()?;
        if resource_type == ResourceType::PhotoProxy {
            return Err(ChangeRequestError::invalid("Photo proxies are added from a proxy").into());
        }
        self.check_write_operation(resource_type)?;
        let extension = self.slot_extension(resource_type)?;
        let staged = self.stager.stage_buffer(bytes, resource_type, &extension)?;
        self.push_resource(staged);
        Ok(())
    }

    /// Attach a capture proxy. System callers only.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for application callers.
    pub fn add_resource_from_proxy(&mut self, proxy: PhotoProxy) -> PhotonResult<()> {
        self.ensure_building()?;
        if !self.caller.is_system() {
            return Err(ChangeRequestError::new(ChangeRequestErrorKind::PermissionDenied(
                "Only system callers may add photo proxies".to_string(),
            ))
            .into());
        }
        self.check_write_operation(ResourceType::PhotoProxy)?;
        if proxy.encoded().is_empty() || proxy.photo_id().is_empty() {
            return Err(ChangeRequestError::invalid("Invalid photo proxy").into());
        }

        tracing::debug!(photo_id = %proxy.photo_id(), bytes = proxy.encoded().len(), "Staged photo proxy");
        self.proxy = Some(proxy);
        self.resources_added.push(ResourceType::PhotoProxy);
        self.ledger.record(Op::AddResource);
        Ok(())
    }

    /// Reserve a cache slot and return a sink for the asset's bytes.
    ///
    /// The caller writes and shuts down the sink before committing.
    ///
    /// # Errors
    ///
    /// Returns `OperationNotSupported` on moving photos or when another
    /// write is outstanding, or the store's error.
    pub async fn open_write_handle(&mut self) -> PhotonResult<WriteHandle> {
        self.ensure_building()?;
        if self.record.is_moving_asset() {
            return Err(ChangeRequestError::not_supported(
                "Write handles are not supported on moving photos",
            )
            .into());
        }
        if self
            .ledger
            .contains_any(&[Op::CreateFromSourcePath, Op::OpenWriteHandle, Op::AddResource])
        {
            return Err(ChangeRequestError::not_supported(
                "The previous asset creation or write has not been committed",
            )
            .into());
        }

        let extension = self.slot_extension(self.record.media_type().primary_resource())?;
        let slot = self.stager.reserve(&extension);
        let handle = self
            .store
            .open_write_handle(&WriteTarget::Cache(slot.name().clone()))
            .await?;

        tracing::debug!(cache_name = %slot.name(), "Opened write handle");
        self.write_slot = Some(slot);
        self.ledger.record(Op::OpenWriteHandle);
        Ok(handle)
    }

    /// Set the moving-photo effect mode.
    ///
    /// # Errors
    ///
    /// Returns `OperationNotSupported` unless the asset is a moving photo or
    /// a moving photo currently shown as image only.
    pub fn set_effect_mode(&mut self, mode: MovingPhotoEffectMode) -> PhotonResult<()> {
        self.ensure_building()?;
        if !self.record.is_moving_asset() {
            return Err(ChangeRequestError::not_supported(
                "Effect mode is only supported on moving photos",
            )
            .into());
        }
        self.effect_mode = Some(mode);
        self.ledger.record(Op::SetMovingPhotoEffectMode);
        Ok(())
    }

    /// Attach edit metadata, stored with the new bytes.
    pub fn set_edit_metadata(&mut self, metadata: EditMetadata) -> PhotonResult<()> {
        self.ensure_building()?;
        self.edit_metadata = Some(metadata);
        self.ledger.record(Op::SetEditMetadata);
        if self.ledger.contains(Op::SaveCapture) && !self.ledger.contains(Op::AddFilters) {
            self.ledger.record(Op::AddFilters);
        }
        Ok(())
    }

    /// Finish a captured placeholder asset.
    pub fn save_capture(&mut self) -> PhotonResult<()> {
        self.ensure_building()?;
        self.ledger.record(Op::SaveCapture);
        if self.ledger.contains(Op::SetEditMetadata) && !self.ledger.contains(Op::AddFilters) {
            self.ledger.record(Op::AddFilters);
        }
        Ok(())
    }

    /// Rename the asset, keeping its extension.
    ///
    /// On an asset that is still being created the new name is used for the
    /// creation itself.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an empty, hidden or overlong title, or
    /// one with forbidden characters.
    pub fn set_title(&mut self, title: &str) -> PhotonResult<()> {
        self.ensure_building()?;
        let max_len = *self.config.max_display_name_len();
        check_title(title, max_len)?;
        let extension = self.slot_extension(self.record.media_type().primary_resource())?;
        let display_name = format!("{}.{}", title, extension);
        check_display_name(&display_name, max_len)?;

        if !self.record.id().is_durable() {
            if let Some(creation) = self.creation.as_mut() {
                creation.set_display_name(display_name.clone());
            }
            self.record.set_display_name(display_name.clone());
        }
        self.title = Some(display_name);
        self.ledger.record(Op::SetTitle);
        Ok(())
    }

    /// Set the favorite flag.
    pub fn set_favorite(&mut self, favorite: bool) -> PhotonResult<()> {
        self.ensure_building()?;
        self.favorite = Some(favorite);
        self.ledger.record(Op::SetFavorite);
        Ok(())
    }

    /// Set the hidden flag.
    pub fn set_hidden(&mut self, hidden: bool) -> PhotonResult<()> {
        self.ensure_building()?;
        self.hidden = Some(hidden);
        self.ledger.record(Op::SetHidden);
        Ok(())
    }

    /// Set the user comment.
    pub fn set_user_comment(&mut self, comment: impl Into<String>) -> PhotonResult<()> {
        self.ensure_building()?;
        self.user_comment = Some(comment.into());
        self.ledger.record(Op::SetUserComment);
        Ok(())
    }

    /// Validate and apply every recorded operation.
    ///
    /// Validation runs before any store call. Executor failures stop the
    /// walk; operations that already ran stay applied. The error names the
    /// failing operation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` on validation failure or when the request is
    /// not being built, `OperationNotSupported` if the asset is being
    /// reverted, or the first executor error.
    #[tracing::instrument(
        skip(self),
        fields(asset_id = %self.record.id(), operations = self.ledger.len())
    )]
    pub async fn commit(&mut self) -> PhotonResult<AssetRef> {
        self.ensure_building()?;
        if let Err(e) = validate(
            &self.ledger,
            &self.record,
            &self.resources_added,
            self.effect_mode,
        ) {
            tracing::debug!(error = %e, "Change request failed validation");
            self.state = RequestState::Failed;
            return Err(e);
        }
        self.state = RequestState::Validated;

        let id = self.record.id();
        let guarded = self.ledger.contains(Op::SetEditMetadata) && id.is_durable();
        if guarded && !self.guard.try_start_commit(id) {
            self.state = RequestState::Failed;
            return Err(ChangeRequestError::not_supported(format!(
                "Asset {} is being reverted or edited",
                id
            ))
            .into());
        }

        self.state = RequestState::Applying;
        let intent = ExecutionIntent::from_ledger(&self.ledger);
        let result = CommitDispatcher::new(self, intent).run().await;
        if guarded {
            self.guard.end_commit(id);
        }

        match result {
            Ok(()) => {
                self.state = RequestState::Committed;
                // Slots still held were bypassed by the privileged path
                self.primary = None;
                self.secondary = None;
                self.write_slot = None;
                tracing::info!(asset_id = %self.record.id(), "Change request committed");
                self.record.asset_ref().ok_or_else(|| {
                    ChangeRequestError::invalid("Commit did not produce a durable asset").into()
                })
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = e.operation().unwrap_or("none"),
                    "Change request failed"
                );
                self.state = RequestState::Failed;
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ChangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeRequest")
            .field("record", &self.record)
            .field("ledger", &self.ledger)
            .field("resources_added", &self.resources_added)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
