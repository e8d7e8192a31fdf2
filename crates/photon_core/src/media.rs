//! Media classification enumerations.

use serde::{Deserialize, Serialize};

/// Type of media content held by an asset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// Still image (JPEG, HEIF, PNG, ...)
    #[display("image")]
    Image,
    /// Video (MP4, MOV, ...)
    #[display("video")]
    Video,
}

impl MediaType {
    /// Convert to string representation for catalog storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Segment used in asset URIs (`file://media/Photo/...`).
    pub fn uri_segment(&self) -> &'static str {
        match self {
            MediaType::Image => "Photo",
            MediaType::Video => "Video",
        }
    }

    /// The resource type that carries this media's primary bytes.
    pub fn primary_resource(&self) -> ResourceType {
        match self {
            MediaType::Image => ResourceType::ImageResource,
            MediaType::Video => ResourceType::VideoResource,
        }
    }

    /// Infer media type from a file extension.
    ///
    /// Returns `None` for extensions the library does not accept.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "heic" | "heif" | "webp" | "gif" | "bmp" | "dng" => {
                Some(MediaType::Image)
            }
            "mp4" | "mov" | "m4v" | "3gp" | "mkv" | "webm" => Some(MediaType::Video),
            _ => None,
        }
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            _ => Err(format!("Unknown media type: {}", s)),
        }
    }
}

/// Photo subtype.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSubtype {
    /// Plain photo or video
    #[default]
    #[display("default")]
    Default,
    /// Captured by the system camera
    #[display("camera")]
    Camera,
    /// Screenshot or screen recording
    #[display("screenshot")]
    Screenshot,
    /// Member of a burst sequence
    #[display("burst")]
    Burst,
    /// Image plus a short companion video sharing one identity
    #[display("moving_photo")]
    MovingPhoto,
}

/// Marker for assets whose bytes are not yet materialized.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PendingMarker {
    /// Fully materialized
    #[default]
    #[display("unset")]
    Unset,
    /// Created by a change request that has not been committed yet
    #[display("create_pending")]
    CreatePending,
    /// Placeholder waiting for a capture pipeline to deliver its components
    #[display("component_pending")]
    ComponentPending,
}

/// Kind of resource a change request may stage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Image bytes
    #[display("image_resource")]
    ImageResource,
    /// Video bytes; the companion video for moving photos
    #[display("video_resource")]
    VideoResource,
    /// Deferred-processing capture proxy
    #[display("photo_proxy")]
    PhotoProxy,
}

/// Playback effect applied to a moving photo.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum MovingPhotoEffectMode {
    /// Normal playback
    #[default]
    #[display("default")]
    Default,
    /// Forward then backward
    #[display("bounce_play")]
    BouncePlay,
    /// Repeat
    #[display("loop_play")]
    LoopPlay,
    /// Partially animated still
    #[display("cinema_graph")]
    CinemaGraph,
    /// Frames blended into one long exposure image
    #[display("long_exposure")]
    LongExposure,
    /// Several frames overlaid
    #[display("multi_exposure")]
    MultiExposure,
    /// Video hidden, only the still is shown
    #[display("image_only")]
    ImageOnly,
}

impl MovingPhotoEffectMode {
    /// Resources a request must stage for this mode to be applied.
    ///
    /// Video-based effects regenerate the companion video; exposure effects
    /// render a new still.
    pub fn required_resources(&self) -> &'static [ResourceType] {
        match self {
            MovingPhotoEffectMode::Default | MovingPhotoEffectMode::ImageOnly => &[],
            MovingPhotoEffectMode::BouncePlay
            | MovingPhotoEffectMode::LoopPlay
            | MovingPhotoEffectMode::CinemaGraph => &[ResourceType::VideoResource],
            MovingPhotoEffectMode::LongExposure | MovingPhotoEffectMode::MultiExposure => {
                &[ResourceType::ImageResource]
            }
        }
    }
}
