//! Capture proxies delivered by the camera pipeline.

use serde::{Deserialize, Serialize};

/// How the camera pipeline finishes processing a proxied capture.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum DeferredProcessing {
    /// Processing continues in the background right away
    #[default]
    #[display("background")]
    Background,
    /// Processing waits for an idle, charging device
    #[display("offline")]
    Offline,
}

/// Already-encoded preview image standing in for a capture whose full
/// processing is deferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PhotoProxy {
    /// Capture pipeline id of the photo
    photo_id: String,
    /// Deferred processing mode
    deferred_processing: DeferredProcessing,
    /// Encoded image bytes
    encoded: Vec<u8>,
}

impl PhotoProxy {
    /// Create a proxy from encoded bytes.
    pub fn new(
        photo_id: impl Into<String>,
        deferred_processing: DeferredProcessing,
        encoded: Vec<u8>,
    ) -> Self {
        Self {
            photo_id: photo_id.into(),
            deferred_processing,
            encoded,
        }
    }
}
