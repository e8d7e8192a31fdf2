//! Asset identity and the in-memory asset record.

use crate::{MediaType, MovingPhotoEffectMode, PendingMarker, PhotoSubtype};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned asset identifier.
///
/// `0` means the asset has not been committed yet; any positive id is durable.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct AssetId(pub i64);

impl AssetId {
    /// Id of an asset that only exists inside an uncommitted change request.
    pub const UNSET: AssetId = AssetId(0);

    /// Whether this id names a committed asset.
    pub fn is_durable(&self) -> bool {
        self.0 > 0
    }
}

/// Handle to a committed asset, as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{} ({})", uri, id)]
pub struct AssetRef {
    /// Durable asset id
    pub id: AssetId,
    /// Store URI of the asset
    pub uri: String,
}

impl AssetRef {
    /// Create a new asset reference.
    pub fn new(id: AssetId, uri: impl Into<String>) -> Self {
        Self {
            id,
            uri: uri.into(),
        }
    }
}

/// Mutable attributes of one photo or video asset.
///
/// A record with [`AssetId::UNSET`] describes an asset whose creation is still
/// staged inside a change request.
///
/// # Examples
///
/// ```
/// use photon_core::{AssetId, AssetRecord, MediaType, PhotoSubtype};
///
/// let record = AssetRecord::new("IMG_0001.jpg", MediaType::Image)
///     .with_subtype(PhotoSubtype::MovingPhoto);
/// assert_eq!(record.id(), AssetId::UNSET);
/// assert!(record.is_moving_photo());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct AssetRecord {
    id: AssetId,
    #[setters(strip_option)]
    uri: Option<String>,
    display_name: String,
    media_type: MediaType,
    subtype: PhotoSubtype,
    pending: PendingMarker,
    effect_mode: MovingPhotoEffectMode,
    #[setters(strip_option)]
    edit_time: Option<DateTime<Utc>>,
    favorite: bool,
    hidden: bool,
    #[setters(strip_option)]
    user_comment: Option<String>,
}

impl AssetRecord {
    /// Create an uncommitted record.
    pub fn new(display_name: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            id: AssetId::UNSET,
            uri: None,
            display_name: display_name.into(),
            media_type,
            subtype: PhotoSubtype::Default,
            pending: PendingMarker::Unset,
            effect_mode: MovingPhotoEffectMode::Default,
            edit_time: None,
            favorite: false,
            hidden: false,
            user_comment: None,
        }
    }

    /// Asset id; [`AssetId::UNSET`] until the first commit.
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Store URI, assigned on creation.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// File name including extension.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Display name without its extension.
    pub fn title(&self) -> &str {
        match self.display_name.rsplit_once('.') {
            Some((stem, _)) => stem,
            None => &self.display_name,
        }
    }

    /// Media type.
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Photo subtype.
    pub fn subtype(&self) -> PhotoSubtype {
        self.subtype
    }

    /// Pending marker.
    pub fn pending(&self) -> PendingMarker {
        self.pending
    }

    /// Moving-photo effect mode.
    pub fn effect_mode(&self) -> MovingPhotoEffectMode {
        self.effect_mode
    }

    /// Time of the last committed edit.
    pub fn edit_time(&self) -> Option<DateTime<Utc>> {
        self.edit_time
    }

    /// Favorite flag.
    pub fn favorite(&self) -> bool {
        self.favorite
    }

    /// Hidden flag.
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// User comment.
    pub fn user_comment(&self) -> Option<&str> {
        self.user_comment.as_deref()
    }

    /// Whether the asset is a moving photo.
    pub fn is_moving_photo(&self) -> bool {
        self.subtype == PhotoSubtype::MovingPhoto
    }

    /// Whether the asset carries a companion video, including a moving photo
    /// currently shown as image only.
    pub fn is_moving_asset(&self) -> bool {
        self.is_moving_photo()
            || (self.subtype == PhotoSubtype::Default
                && self.effect_mode == MovingPhotoEffectMode::ImageOnly)
    }

    /// Durable handle, if the record has been committed.
    pub fn asset_ref(&self) -> Option<AssetRef> {
        match &self.uri {
            Some(uri) if self.id.is_durable() => Some(AssetRef::new(self.id, uri.clone())),
            _ => None,
        }
    }

    /// Adopt the identity the store assigned on creation.
    ///
    /// Ignores ids that are not durable and empty URIs, returning `false`.
    pub fn materialize(&mut self, asset: &AssetRef) -> bool {
        if !asset.id.is_durable() || asset.uri.is_empty() {
            tracing::error!(id = %asset.id, uri = %asset.uri, "Refusing to adopt invalid asset identity");
            return false;
        }
        self.id = asset.id;
        self.uri = Some(asset.uri.clone());
        self.pending = PendingMarker::Unset;
        true
    }

    /// Replace the display name.
    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    /// Replace the subtype.
    pub fn set_subtype(&mut self, subtype: PhotoSubtype) {
        self.subtype = subtype;
    }

    /// Replace the pending marker.
    pub fn set_pending(&mut self, pending: PendingMarker) {
        self.pending = pending;
    }

    /// Replace the effect mode.
    pub fn set_effect_mode(&mut self, effect_mode: MovingPhotoEffectMode) {
        self.effect_mode = effect_mode;
    }

    /// Record the time of a committed edit.
    pub fn set_edit_time(&mut self, edit_time: DateTime<Utc>) {
        self.edit_time = Some(edit_time);
    }

    /// Replace the favorite flag.
    pub fn set_favorite(&mut self, favorite: bool) {
        self.favorite = favorite;
    }

    /// Replace the hidden flag.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Replace the user comment.
    pub fn set_user_comment(&mut self, comment: impl Into<String>) {
        self.user_comment = Some(comment.into());
    }
}
