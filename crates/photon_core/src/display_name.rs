//! Display name and title validation.

use photon_error::{ChangeRequestError, PhotonResult};

/// Characters that may not appear in a display name.
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Validate a title: the display name without extension.
///
/// # Errors
///
/// Returns `InvalidRequest` if the title is empty, longer than `max_len`
/// bytes, starts with a dot or contains a path separator.
pub fn check_title(title: &str, max_len: usize) -> PhotonResult<()> {
    if title.trim().is_empty() {
        return Err(ChangeRequestError::invalid("title is empty").into());
    }
    if title.len() > max_len {
        return Err(ChangeRequestError::invalid(format!(
            "title is {} bytes, limit is {}",
            title.len(),
            max_len
        ))
        .into());
    }
    if title.starts_with('.') {
        return Err(ChangeRequestError::invalid(format!("title starts with '.': {}", title)).into());
    }
    if let Some(c) = title.chars().find(|c| FORBIDDEN.contains(c)) {
        return Err(ChangeRequestError::invalid(format!(
            "title contains forbidden character {:?}: {}",
            c, title
        ))
        .into());
    }
    Ok(())
}

/// Validate a display name: `title.extension`.
///
/// # Errors
///
/// Returns `InvalidRequest` if the title part is invalid or the extension is
/// missing.
pub fn check_display_name(display_name: &str, max_len: usize) -> PhotonResult<()> {
    let Some((title, extension)) = display_name.rsplit_once('.') else {
        return Err(ChangeRequestError::invalid(format!(
            "display name has no extension: {}",
            display_name
        ))
        .into());
    };
    if extension.is_empty() {
        return Err(ChangeRequestError::invalid(format!(
            "display name has an empty extension: {}",
            display_name
        ))
        .into());
    }
    if display_name.len() > max_len {
        return Err(ChangeRequestError::invalid(format!(
            "display name is {} bytes, limit is {}",
            display_name.len(),
            max_len
        ))
        .into());
    }
    check_title(title, max_len)
}

/// Lowercased extension of a display name or path, if any.
pub fn extension_of(name: &str) -> Option<String> {
    let (_, extension) = name.rsplit_once('.')?;
    if extension.is_empty() || extension.contains('/') {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}
