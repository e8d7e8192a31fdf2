//! Commit-time executors.

use crate::{AssetChangeOperation as Op, ChangeRequest, OperationLedger, ResourceSource};
use chrono::Utc;
use photon_core::{
    AssetId, AssetRecord, AssetRef, AttributeDelta, CreationAttributes, MovingPhotoEffectMode,
    PendingMarker, PhotoSubtype, extension_of,
};
use photon_error::{ChangeRequestError, PhotonResult, StoreError, StoreErrorKind};
use photon_store::{CacheSlot, CacheSubmission, SubmitTarget, WriteTarget};
use std::collections::HashSet;

/// What the kinds without an executor of their own ask of the executors
/// that do run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ExecutionIntent {
    /// The request creates its asset
    pub(crate) is_creation: bool,
    /// Edit metadata travels with the new bytes
    pub(crate) carries_edit: bool,
    /// The effect mode is written by the resource executor
    pub(crate) effect_mode_with_resource: bool,
}

impl ExecutionIntent {
    pub(crate) fn from_ledger(ledger: &OperationLedger) -> Self {
        Self {
            is_creation: ledger.contains_any(&[Op::CreateFromScratch, Op::CreateFromSourcePath]),
            carries_edit: ledger.contains(Op::SetEditMetadata),
            effect_mode_with_resource: ledger.contains(Op::SetMovingPhotoEffectMode)
                && ledger.contains(Op::AddResource),
        }
    }
}

/// Replays a validated ledger against the store.
///
/// Each kind runs at most once, with the last recorded value.
pub(crate) struct CommitDispatcher<'a> {
    request: &'a mut ChangeRequest,
    intent: ExecutionIntent,
    applied: HashSet<Op>,
}

impl<'a> CommitDispatcher<'a> {
    pub(crate) fn new(request: &'a mut ChangeRequest, intent: ExecutionIntent) -> Self {
        Self {
            request,
            intent,
            applied: HashSet::new(),
        }
    }

    pub(crate) async fn run(mut self) -> PhotonResult<()> {
        let operations: Vec<Op> = self.request.ledger.iter().collect();
        for operation in operations {
            if !self.applied.insert(operation) {
                tracing::debug!(operation = %operation, "Already applied");
                continue;
            }
            tracing::debug!(operation = %operation, "Applying operation");
            self.execute(operation)
                .await
                .map_err(|e| e.during(operation.as_str()))?;
        }
        Ok(())
    }

    async fn execute(&mut self, operation: Op) -> PhotonResult<()> {
        match operation {
            // Folded into the executor that writes bytes
            Op::CreateFromScratch | Op::SetEditMetadata => Ok(()),
            Op::CreateFromSourcePath => self.create_from_source_path().await,
            Op::OpenWriteHandle => self.submit_write_handle().await,
            Op::AddResource => self.add_resource().await,
            Op::SetMovingPhotoEffectMode => self.set_effect_mode().await,
            Op::AddFilters => self.add_filters().await,
            Op::SaveCapture => self.save_capture().await,
            Op::SetTitle => self.set_title().await,
            Op::SetFavorite => self.set_favorite().await,
            Op::SetHidden => self.set_hidden().await,
            Op::SetUserComment => self.set_user_comment().await,
        }
    }

    fn durable_id(&self) -> PhotonResult<AssetId> {
        let id = self.request.record.id();
        if id.is_durable() {
            Ok(id)
        } else {
            Err(ChangeRequestError::invalid("Asset has not been created").into())
        }
    }

    fn creation_attributes(&self) -> PhotonResult<CreationAttributes> {
        self.request
            .creation
            .clone()
            .ok_or_else(|| ChangeRequestError::invalid("Missing creation attributes").into())
    }

    fn submit_target(&self) -> PhotonResult<SubmitTarget> {
        let record = &self.request.record;
        if !record.id().is_durable() {
            return Ok(SubmitTarget::Create(self.creation_attributes()?));
        }
        Ok(SubmitTarget::Existing {
            id: record.id(),
            edit_metadata: self
                .request
                .edit_metadata
                .clone()
                .filter(|_| self.intent.carries_edit),
            effect_mode: self
                .request
                .effect_mode
                .filter(|_| self.intent.effect_mode_with_resource),
        })
    }

    /// Adopt the identity of a freshly created asset.
    fn materialize(&mut self, asset: &AssetRef) -> PhotonResult<()> {
        let record = &mut self.request.record;
        if record.id().is_durable() {
            return Ok(());
        }
        if !record.materialize(asset) {
            return Err(StoreError::new(StoreErrorKind::Rejected(format!(
                "store returned an invalid asset identity: {}",
                asset
            )))
            .into());
        }
        tracing::info!(asset_id = %asset.id, uri = %asset.uri, "Asset created");
        Ok(())
    }

    /// Mirror what rode along with the bytes onto the record.
    fn apply_written_attributes(&mut self) {
        if self.intent.carries_edit {
            self.request.record.set_edit_time(Utc::now());
        }
        if self.intent.effect_mode_with_resource {
            if let Some(mode) = self.request.effect_mode {
                apply_effect_mode(&mut self.request.record, mode);
            }
        }
    }

    #[tracing::instrument(skip_all)]
    async fn create_from_source_path(&mut self) -> PhotonResult<()> {
        let path = self
            .request
            .source_path
            .clone()
            .ok_or_else(|| ChangeRequestError::invalid("Missing source path"))?;
        let attributes = self.creation_attributes()?;
        let extension = extension_of(attributes.display_name()).ok_or_else(|| {
            ChangeRequestError::invalid(format!(
                "Display name has no extension: {}",
                attributes.display_name()
            ))
        })?;
        let source = ResourceSource::FilePath(path);
        let slot = self.request.stager.reserve(&extension);

        let copied = self.copy_into_new_asset(&source, &slot, &attributes).await;
        let asset = match copied {
            Ok(asset) => {
                slot.release();
                asset
            }
            Err(e) if e.is_permission_denied() => {
                tracing::warn!(error = %e, "Store denied cache write, creating through the privileged path");
                drop(slot);
                let asset = self.request.store.insert_privileged(&attributes).await?;
                self.materialize(&asset)?;
                self.request
                    .stager
                    .write_to(&source, &WriteTarget::Asset(asset.id))
                    .await?;
                asset
            }
            Err(e) => return Err(e),
        };
        self.materialize(&asset)
    }

    async fn copy_into_new_asset(
        &self,
        source: &ResourceSource,
        slot: &CacheSlot,
        attributes: &CreationAttributes,
    ) -> PhotonResult<AssetRef> {
        self.request
            .stager
            .write_to(source, &WriteTarget::Cache(slot.name().clone()))
            .await?;
        self.request
            .store
            .submit_cache(CacheSubmission {
                target: SubmitTarget::Create(attributes.clone()),
                primary: Some(slot.name().clone()),
                secondary: None,
            })
            .await
    }

    #[tracing::instrument(skip_all)]
    async fn submit_write_handle(&mut self) -> PhotonResult<()> {
        let Some(slot) = self.request.write_slot.as_ref() else {
            return Err(ChangeRequestError::invalid("No write handle was opened").into());
        };
        let submission = CacheSubmission {
            target: self.submit_target()?,
            primary: Some(slot.name().clone()),
            secondary: None,
        };
        let asset = self.request.store.submit_cache(submission).await?;
        if let Some(slot) = self.request.write_slot.take() {
            slot.release();
        }
        self.materialize(&asset)?;
        self.apply_written_attributes();
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(asset_id = %self.request.record.id()))]
    async fn add_resource(&mut self) -> PhotonResult<()> {
        if self.request.proxy.is_some() {
            return self.add_proxy().await;
        }
        if self.request.primary.is_none() && self.request.secondary.is_none() {
            return Err(ChangeRequestError::invalid("No resource was staged").into());
        }

        match self.add_resource_through_cache().await {
            Err(e) if e.is_permission_denied() => {
                tracing::warn!(error = %e, "Store denied cache write, retrying through the privileged path");
                self.add_resource_privileged().await
            }
            result => result,
        }
    }

    async fn add_resource_through_cache(&mut self) -> PhotonResult<()> {
        let stager = self.request.stager.clone();
        if let Some(video) = &self.request.secondary {
            stager.promote(video).await?;
        }
        if let Some(image) = &self.request.primary {
            stager.promote(image).await?;
        }

        let submission = CacheSubmission {
            target: self.submit_target()?,
            primary: self.request.primary.as_ref().map(|s| s.cache_name().clone()),
            secondary: self.request.secondary.as_ref().map(|s| s.cache_name().clone()),
        };
        let asset = self.request.store.submit_cache(submission).await?;

        // The store owns the cache files now
        if let Some(staged) = self.request.primary.take() {
            staged.release();
        }
        if let Some(staged) = self.request.secondary.take() {
            staged.release();
        }

        self.materialize(&asset)?;
        self.apply_written_attributes();
        Ok(())
    }

    /// Create (if needed) through the privileged path and write the staged
    /// bytes straight into the asset.
    async fn add_resource_privileged(&mut self) -> PhotonResult<()> {
        let existing = self.request.record.id().is_durable();
        let id = if existing {
            self.request.record.id()
        } else {
            let attributes = self.creation_attributes()?;
            let asset = self.request.store.insert_privileged(&attributes).await?;
            self.materialize(&asset)?;
            asset.id
        };

        // The store keeps the pre-edit bytes once edit metadata lands, so the
        // edit is recorded before the bytes are overwritten
        if existing {
            let mut delta = AttributeDelta::default();
            if self.intent.carries_edit {
                delta.edit_metadata = self.request.edit_metadata.clone();
            }
            if self.intent.effect_mode_with_resource {
                delta.effect_mode = self.request.effect_mode;
            }
            if !delta.is_empty() {
                self.request.store.update(id, &delta).await?;
            }
        }

        let stager = self.request.stager.clone();
        if let Some(image) = &self.request.primary {
            stager.write_to(image.source(), &WriteTarget::Asset(id)).await?;
        }
        if let Some(video) = &self.request.secondary {
            stager.write_to(video.source(), &WriteTarget::AssetVideo(id)).await?;
        }

        // Slots were never filled; dropping them deletes the names
        self.request.primary = None;
        self.request.secondary = None;
        self.apply_written_attributes();
        tracing::info!(asset_id = %id, "Resource written through the privileged path");
        Ok(())
    }

    async fn add_proxy(&mut self) -> PhotonResult<()> {
        let id = self.durable_id()?;
        let Some(proxy) = self.request.proxy.take() else {
            return Err(ChangeRequestError::invalid("No photo proxy was staged").into());
        };

        let delta = AttributeDelta::default()
            .with_photo_id(proxy.photo_id().clone())
            .with_deferred_processing(*proxy.deferred_processing());
        self.request.store.update(id, &delta).await?;

        let source = ResourceSource::Buffer(proxy.encoded().clone());
        let bytes = self
            .request
            .stager
            .write_to(&source, &WriteTarget::Asset(id))
            .await?;
        tracing::info!(asset_id = %id, photo_id = %proxy.photo_id(), bytes, "Wrote photo proxy");
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn set_effect_mode(&mut self) -> PhotonResult<()> {
        if self.intent.effect_mode_with_resource {
            tracing::debug!("Effect mode written with the resource");
            return Ok(());
        }
        let id = self.durable_id()?;
        let mode = self
            .request
            .effect_mode
            .ok_or_else(|| ChangeRequestError::invalid("Effect mode recorded without a value"))?;
        self.request
            .store
            .update(id, &AttributeDelta::default().with_effect_mode(mode))
            .await?;
        apply_effect_mode(&mut self.request.record, mode);
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn add_filters(&mut self) -> PhotonResult<()> {
        let id = self.durable_id()?;
        let metadata = self
            .request
            .edit_metadata
            .clone()
            .ok_or_else(|| ChangeRequestError::invalid("Filters recorded without edit metadata"))?;
        self.request
            .store
            .update(id, &AttributeDelta::default().with_edit_metadata(metadata))
            .await?;
        self.request.record.set_edit_time(Utc::now());
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn save_capture(&mut self) -> PhotonResult<()> {
        let id = self.durable_id()?;
        self.request
            .store
            .update(id, &AttributeDelta::default().with_pending(PendingMarker::Unset))
            .await?;
        self.request.record.set_pending(PendingMarker::Unset);
        tracing::info!(asset_id = %id, "Capture saved");
        Ok(())
    }

    async fn set_title(&mut self) -> PhotonResult<()> {
        if self.intent.is_creation {
            tracing::debug!("Title applied to the creation");
            return Ok(());
        }
        let id = self.durable_id()?;
        let display_name = self
            .request
            .title
            .clone()
            .ok_or_else(|| ChangeRequestError::invalid("Title recorded without a value"))?;
        self.request
            .store
            .update(id, &AttributeDelta::default().with_display_name(display_name.clone()))
            .await?;
        self.request.record.set_display_name(display_name);
        Ok(())
    }

    async fn set_favorite(&mut self) -> PhotonResult<()> {
        let id = self.durable_id()?;
        let favorite = self
            .request
            .favorite
            .ok_or_else(|| ChangeRequestError::invalid("Favorite recorded without a value"))?;
        self.request
            .store
            .update(id, &AttributeDelta::default().with_favorite(favorite))
            .await?;
        self.request.record.set_favorite(favorite);
        Ok(())
    }

    async fn set_hidden(&mut self) -> PhotonResult<()> {
        let id = self.durable_id()?;
        let hidden = self
            .request
            .hidden
            .ok_or_else(|| ChangeRequestError::invalid("Hidden recorded without a value"))?;
        self.request
            .store
            .update(id, &AttributeDelta::default().with_hidden(hidden))
            .await?;
        self.request.record.set_hidden(hidden);
        Ok(())
    }

    async fn set_user_comment(&mut self) -> PhotonResult<()> {
        let id = self.durable_id()?;
        let comment = self
            .request
            .user_comment
            .clone()
            .ok_or_else(|| ChangeRequestError::invalid("User comment recorded without a value"))?;
        self.request
            .store
            .update(id, &AttributeDelta::default().with_user_comment(comment.clone()))
            .await?;
        self.request.record.set_user_comment(comment);
        Ok(())
    }
}

/// A moving photo shown as image only is stored as a plain photo.
fn apply_effect_mode(record: &mut AssetRecord, mode: MovingPhotoEffectMode) {
    record.set_effect_mode(mode);
    record.set_subtype(if mode == MovingPhotoEffectMode::ImageOnly {
        PhotoSubtype::Default
    } else {
        PhotoSubtype::MovingPhoto
    });
}
