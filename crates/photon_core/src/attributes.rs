//! Attribute sets sent to the store on creation and update.

use crate::{
    DeferredProcessing, EditMetadata, MediaType, MovingPhotoEffectMode, PendingMarker,
    PhotoSubtype,
};
use serde::{Deserialize, Serialize};

/// Attributes of an asset that does not exist yet.
///
/// Only consulted while the target record has no durable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CreationAttributes {
    /// File name including extension
    display_name: String,
    /// Media type
    media_type: MediaType,
    /// Photo subtype
    subtype: PhotoSubtype,
    /// Camera shot key, used to group captures of one shot
    camera_shot_key: Option<String>,
}

impl CreationAttributes {
    /// Create attributes for a new asset.
    pub fn new(display_name: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            display_name: display_name.into(),
            media_type,
            subtype: PhotoSubtype::Default,
            camera_shot_key: None,
        }
    }

    /// Set the subtype.
    pub fn with_subtype(mut self, subtype: PhotoSubtype) -> Self {
        self.subtype = subtype;
        self
    }

    /// Set the camera shot key.
    pub fn with_camera_shot_key(mut self, key: impl Into<String>) -> Self {
        self.camera_shot_key = Some(key.into());
        self
    }

    /// Replace the display name, e.g. after a title change.
    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }
}

/// Partial update of an existing asset's attributes.
///
/// `None` fields are left untouched by the store.
///
/// # Examples
///
/// ```
/// use photon_core::AttributeDelta;
///
/// let delta = AttributeDelta::default().with_favorite(true);
/// assert!(!delta.is_empty());
/// assert!(AttributeDelta::default().is_empty());
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, derive_setters::Setters,
)]
#[setters(prefix = "with_", strip_option)]
pub struct AttributeDelta {
    /// New display name
    pub display_name: Option<String>,
    /// New favorite flag
    pub favorite: Option<bool>,
    /// New hidden flag
    pub hidden: Option<bool>,
    /// New user comment
    pub user_comment: Option<String>,
    /// New moving-photo effect mode
    pub effect_mode: Option<MovingPhotoEffectMode>,
    /// New pending marker
    pub pending: Option<PendingMarker>,
    /// New edit metadata
    pub edit_metadata: Option<EditMetadata>,
    /// Capture pipeline photo id
    pub photo_id: Option<String>,
    /// Deferred processing mode of a proxied capture
    pub deferred_processing: Option<DeferredProcessing>,
}

impl AttributeDelta {
    /// Whether the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &AttributeDelta::default()
    }
}
