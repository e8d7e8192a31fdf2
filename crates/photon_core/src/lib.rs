//! Core data types for the Photon media asset library.
//!
//! This crate provides the asset model shared by the store backends and the
//! change pipeline: the in-memory [`AssetRecord`], the enumerations describing
//! media kinds and moving-photo effects, edit metadata, attribute deltas, and
//! tracing initialisation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod attributes;
mod display_name;
mod edit;
mod media;
mod proxy;
mod telemetry;

pub use asset::{AssetId, AssetRecord, AssetRef};
pub use attributes::{AttributeDelta, CreationAttributes};
pub use display_name::{check_display_name, check_title, extension_of};
pub use edit::EditMetadata;
pub use media::{MediaType, MovingPhotoEffectMode, PendingMarker, PhotoSubtype, ResourceType};
pub use proxy::{DeferredProcessing, PhotoProxy};
pub use telemetry::{LogFormat, TelemetryConfig, init_telemetry, shutdown_telemetry};
