//! Catalog rows persisted by the filesystem store.

use chrono::{DateTime, Utc};
use photon_core::{
    AssetId, AssetRecord, AttributeDelta, DeferredProcessing, EditMetadata, MediaType,
    MovingPhotoEffectMode, PendingMarker, PhotoSubtype,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One asset as stored in `{root}/catalog/{id}.json`.
///
/// Paths are relative to the store root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct AssetRow {
    id: AssetId,
    uri: String,
    display_name: String,
    media_type: MediaType,
    subtype: PhotoSubtype,
    pending: PendingMarker,
    effect_mode: MovingPhotoEffectMode,
    favorite: bool,
    hidden: bool,
    user_comment: Option<String>,
    camera_shot_key: Option<String>,
    edit_metadata: Option<EditMetadata>,
    edit_time: Option<DateTime<Utc>>,
    photo_id: Option<String>,
    deferred_processing: Option<DeferredProcessing>,
    /// SHA-256 of the primary resource, if known
    content_hash: Option<String>,
    path: PathBuf,
    video_path: Option<PathBuf>,
    original_path: Option<PathBuf>,
    original_video_path: Option<PathBuf>,
    /// Created through the privileged path; writable without a grant
    privileged: bool,
    date_added: DateTime<Utc>,
}

impl AssetRow {
    pub(crate) fn new(
        id: AssetId,
        uri: String,
        attributes: &photon_core::CreationAttributes,
        path: PathBuf,
        video_path: Option<PathBuf>,
    ) -> Self {
        Self {
            id,
            uri,
            display_name: attributes.display_name().clone(),
            media_type: *attributes.media_type(),
            subtype: *attributes.subtype(),
            pending: PendingMarker::Unset,
            effect_mode: MovingPhotoEffectMode::Default,
            favorite: false,
            hidden: false,
            user_comment: None,
            camera_shot_key: attributes.camera_shot_key().clone(),
            edit_metadata: None,
            edit_time: None,
            photo_id: None,
            deferred_processing: None,
            content_hash: None,
            path,
            video_path,
            original_path: None,
            original_video_path: None,
            privileged: false,
            date_added: Utc::now(),
        }
    }

    pub(crate) fn mark_privileged(&mut self) {
        self.privileged = true;
    }

    pub(crate) fn set_content_hash(&mut self, hash: String) {
        self.content_hash = Some(hash);
    }

    pub(crate) fn set_video_path(&mut self, path: PathBuf) {
        self.video_path = Some(path);
    }

    pub(crate) fn set_original_path(&mut self, path: Option<PathBuf>) {
        self.original_path = path;
    }

    pub(crate) fn set_original_video_path(&mut self, path: Option<PathBuf>) {
        self.original_video_path = path;
    }

    pub(crate) fn set_edit(&mut self, metadata: Option<EditMetadata>) {
        self.edit_time = metadata.as_ref().map(|_| Utc::now());
        self.edit_metadata = metadata;
    }

    /// Image-only moving photos are stored as plain photos; the video stays.
    pub(crate) fn set_effect_mode(&mut self, mode: MovingPhotoEffectMode) {
        self.effect_mode = mode;
        if self.video_path.is_some() {
            self.subtype = if mode == MovingPhotoEffectMode::ImageOnly {
                PhotoSubtype::Default
            } else {
                PhotoSubtype::MovingPhoto
            };
        }
    }

    pub(crate) fn set_pending(&mut self, pending: PendingMarker) {
        self.pending = pending;
    }

    /// Apply a partial update; returns whether anything changed.
    pub(crate) fn apply(&mut self, delta: &AttributeDelta) -> bool {
        let before = self.clone();
        if let Some(name) = &delta.display_name {
            self.display_name = name.clone();
        }
        if let Some(favorite) = delta.favorite {
            self.favorite = favorite;
        }
        if let Some(hidden) = delta.hidden {
            self.hidden = hidden;
        }
        if let Some(comment) = &delta.user_comment {
            self.user_comment = Some(comment.clone());
        }
        if let Some(mode) = delta.effect_mode {
            self.set_effect_mode(mode);
        }
        if let Some(pending) = delta.pending {
            self.pending = pending;
        }
        if let Some(metadata) = &delta.edit_metadata {
            self.edit_metadata = Some(metadata.clone());
            self.edit_time = Some(Utc::now());
        }
        if let Some(photo_id) = &delta.photo_id {
            self.photo_id = Some(photo_id.clone());
        }
        if let Some(mode) = delta.deferred_processing {
            self.deferred_processing = Some(mode);
        }
        *self != before
    }

    /// In-memory record for this row.
    pub fn to_record(&self) -> AssetRecord {
        let mut record = AssetRecord::new(self.display_name.clone(), self.media_type)
            .with_id(self.id)
            .with_uri(self.uri.clone())
            .with_subtype(self.subtype)
            .with_pending(self.pending)
            .with_effect_mode(self.effect_mode)
            .with_favorite(self.favorite)
            .with_hidden(self.hidden);
        if let Some(comment) = &self.user_comment {
            record.set_user_comment(comment.clone());
        }
        if let Some(edit_time) = self.edit_time {
            record.set_edit_time(edit_time);
        }
        record
    }
}
