//! Cross-operation checks run before a request touches the store.

use crate::{AssetChangeOperation as Op, OperationLedger};
use photon_core::{AssetRecord, MovingPhotoEffectMode, PendingMarker, ResourceType};
use photon_error::{ChangeRequestError, PhotonResult};

/// Validate a request's ledger against its target record and staged
/// resources.
///
/// Every failure is `InvalidRequest`. Nothing here performs I/O.
///
/// # Errors
///
/// Returns `InvalidRequest` when:
///
/// - the ledger is empty
/// - a creation is combined with edit metadata
/// - an uncommitted record's first operation is not a creation
/// - a creation or edit carries no bytes to write
/// - a resource type is staged twice
/// - an effect mode lacks the resources it needs, or targets an asset that
///   is not fully materialized
/// - a moving photo is created without exactly one image and one video
/// - a proxy or capture targets an uncommitted record
pub fn validate(
    ledger: &OperationLedger,
    record: &AssetRecord,
    resources: &[ResourceType],
    effect_mode: Option<MovingPhotoEffectMode>,
) -> PhotonResult<()> {
    if ledger.is_empty() {
        return Err(ChangeRequestError::invalid("None request to apply").into());
    }

    let is_creation = ledger.contains_any(&[Op::CreateFromScratch, Op::CreateFromSourcePath]);
    if is_creation && ledger.contains(Op::SetEditMetadata) {
        return Err(ChangeRequestError::invalid("Cannot create and edit an asset in one request").into());
    }

    if !record.id().is_durable() && !ledger.first().is_some_and(|op| op.is_creation()) {
        return Err(ChangeRequestError::invalid(
            "Asset is not created yet; the first operation must create it",
        )
        .into());
    }

    if ledger.contains_any(&[Op::CreateFromScratch, Op::SetEditMetadata])
        && !ledger.iter().any(|op| op.carries_payload())
    {
        return Err(ChangeRequestError::invalid("Cannot create or edit an asset without data").into());
    }

    for (index, resource) in resources.iter().enumerate() {
        if resources[..index].contains(resource) {
            return Err(ChangeRequestError::invalid(format!(
                "Resource {} added more than once",
                resource
            ))
            .into());
        }
    }

    if !record.id().is_durable()
        && (resources.contains(&ResourceType::PhotoProxy) || ledger.contains(Op::SaveCapture))
    {
        return Err(ChangeRequestError::invalid("Proxies and captures attach to a created asset").into());
    }

    if record.is_moving_asset() || ledger.contains(Op::SetMovingPhotoEffectMode) {
        check_moving_photo(ledger, record, resources, effect_mode)?;
    }

    tracing::debug!(
        asset_id = %record.id(),
        operations = ledger.len(),
        "Change request validated"
    );
    Ok(())
}

fn check_moving_photo(
    ledger: &OperationLedger,
    record: &AssetRecord,
    resources: &[ResourceType],
    effect_mode: Option<MovingPhotoEffectMode>,
) -> PhotonResult<()> {
    if ledger.contains(Op::SetMovingPhotoEffectMode) {
        let Some(mode) = effect_mode else {
            return Err(ChangeRequestError::invalid("Effect mode recorded without a value").into());
        };
        if !record.id().is_durable() || record.pending() != PendingMarker::Unset {
            return Err(ChangeRequestError::invalid(
                "Effect mode can only be set on a materialized moving photo",
            )
            .into());
        }
        if let Some(missing) = mode
            .required_resources()
            .iter()
            .find(|required| !resources.contains(required))
        {
            return Err(ChangeRequestError::invalid(format!(
                "Effect mode {} requires a {} resource",
                mode, missing
            ))
            .into());
        }
        return Ok(());
    }

    if ledger.contains(Op::CreateFromScratch) && ledger.contains(Op::AddResource) {
        let has_pair = resources.len() == 2
            && resources.contains(&ResourceType::ImageResource)
            && resources.contains(&ResourceType::VideoResource);
        if ledger.count(Op::AddResource) != 2 || !has_pair {
            return Err(ChangeRequestError::invalid(
                "A moving photo needs exactly one image and one video resource",
            )
            .into());
        }
    }

    Ok(())
}
