//! Edit metadata attached to an asset by an editor.

use photon_error::{ChangeRequestError, PhotonResult};
use serde::{Deserialize, Serialize};

/// Opaque edit description written alongside edited bytes.
///
/// The store keeps it so the same editor can reopen the edit later; the
/// three parts travel together or not at all.
///
/// # Examples
///
/// ```
/// use photon_core::EditMetadata;
///
/// let meta = EditMetadata::new("com.example.editor", "1.0", b"{\"crop\":[0,0,10,10]}".to_vec()).unwrap();
/// assert_eq!(meta.format_version(), "1.0");
/// assert!(EditMetadata::new("", "1.0", vec![1]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct EditMetadata {
    /// Format tag understood by the editor that produced the data.
    compatible_format: String,
    /// Version of that format.
    format_version: String,
    /// Editor-specific payload.
    data: Vec<u8>,
}

impl EditMetadata {
    /// Create edit metadata, rejecting empty parts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if any of the three parts is empty.
    pub fn new(
        compatible_format: impl Into<String>,
        format_version: impl Into<String>,
        data: Vec<u8>,
    ) -> PhotonResult<Self> {
        let compatible_format = compatible_format.into();
        let format_version = format_version.into();
        if compatible_format.is_empty() {
            return Err(ChangeRequestError::invalid("Invalid compatibleFormat").into());
        }
        if format_version.is_empty() {
            return Err(ChangeRequestError::invalid("Invalid formatVersion").into());
        }
        if data.is_empty() {
            return Err(ChangeRequestError::invalid("Invalid data").into());
        }
        Ok(Self {
            compatible_format,
            format_version,
            data,
        })
    }
}
