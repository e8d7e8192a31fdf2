//! Change operation kinds.

/// One kind of change a request can carry.
///
/// Variants are listed in insertion precedence. A ledger holds kinds only;
/// the payload of each kind lives on the request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumIter,
    strum::Display,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum AssetChangeOperation {
    /// Create a new asset from staged bytes
    CreateFromScratch,
    /// Create a new asset by copying a source file
    CreateFromSourcePath,
    /// Bytes written by the caller through a write handle
    OpenWriteHandle,
    /// Staged image, video or proxy resource
    AddResource,
    /// Edit metadata stored with new bytes
    SetEditMetadata,
    /// Moving-photo effect mode
    SetMovingPhotoEffectMode,
    /// Edit metadata persisted on a captured asset
    AddFilters,
    /// Finish a captured placeholder asset
    SaveCapture,
    /// Rename the asset
    SetTitle,
    /// Favorite flag
    SetFavorite,
    /// Hidden flag
    SetHidden,
    /// User comment
    SetUserComment,
}

impl AssetChangeOperation {
    /// Stable name, used in logs and attached to errors.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Whether the operation creates the asset.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            AssetChangeOperation::CreateFromScratch | AssetChangeOperation::CreateFromSourcePath
        )
    }

    /// Whether the operation writes bytes that a from-scratch creation must
    /// exist for, and so runs right after it.
    pub fn follows_creation(&self) -> bool {
        matches!(
            self,
            AssetChangeOperation::OpenWriteHandle
                | AssetChangeOperation::AddResource
                | AssetChangeOperation::AddFilters
        )
    }

    /// Whether the operation carries bytes to write.
    pub fn carries_payload(&self) -> bool {
        matches!(
            self,
            AssetChangeOperation::OpenWriteHandle
                | AssetChangeOperation::AddResource
                | AssetChangeOperation::SaveCapture
        )
    }
}
