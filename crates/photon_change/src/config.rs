//! Change pipeline configuration (`[change]` section).

use serde::{Deserialize, Serialize};

/// Limits and defaults applied while building change requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ChangeConfig {
    /// Extension of a moving photo's companion video cache file
    #[serde(default = "default_video_extension")]
    #[setters(into)]
    moving_photo_video_extension: String,

    /// Longest accepted display name, extension included
    #[serde(default = "default_max_display_name_len")]
    max_display_name_len: usize,
}

fn default_video_extension() -> String {
    "mp4".to_string()
}

fn default_max_display_name_len() -> usize {
    255
}

impl Default for ChangeConfig {
    fn default() -> Self {
        Self {
            moving_photo_video_extension: default_video_extension(),
            max_display_name_len: default_max_display_name_len(),
        }
    }
}

/// Who is driving a change request.
///
/// System callers may attach capture proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallerContext {
    is_system: bool,
}

impl CallerContext {
    /// An ordinary application caller.
    pub fn application() -> Self {
        Self { is_system: false }
    }

    /// A system component such as the camera pipeline.
    pub fn system() -> Self {
        Self { is_system: true }
    }

    /// Whether the caller is a system component.
    pub fn is_system(&self) -> bool {
        self.is_system
    }
}
