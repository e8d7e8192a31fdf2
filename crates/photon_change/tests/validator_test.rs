use photon_change::{AssetChangeOperation as Op, OperationLedger, validate};
use photon_core::{
    AssetId, AssetRecord, MediaType, MovingPhotoEffectMode, PendingMarker, PhotoSubtype,
    ResourceType,
};
use photon_error::ErrorCategory;
use strum::IntoEnumIterator;

fn ledger_of(operations: &[Op]) -> OperationLedger {
    let mut ledger = OperationLedger::new();
    for operation in operations {
        ledger.record(*operation);
    }
    ledger
}

fn new_photo() -> AssetRecord {
    AssetRecord::new("IMG_0001.jpg", MediaType::Image).with_pending(PendingMarker::CreatePending)
}

fn stored_photo() -> AssetRecord {
    AssetRecord::new("IMG_0001.jpg", MediaType::Image).with_id(AssetId(7))
}

fn stored_moving_photo() -> AssetRecord {
    stored_photo().with_subtype(PhotoSubtype::MovingPhoto)
}

fn assert_invalid(
    ledger: &OperationLedger,
    record: &AssetRecord,
    resources: &[ResourceType],
    effect_mode: Option<MovingPhotoEffectMode>,
) {
    let err = validate(ledger, record, resources, effect_mode).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::InvalidRequest, "{}", err);
}

#[test]
fn test_empty_ledger_is_invalid() {
    assert_invalid(&OperationLedger::new(), &stored_photo(), &[], None);
}

#[test]
fn test_create_and_edit_together_is_invalid() {
    let ledger = ledger_of(&[Op::CreateFromScratch, Op::SetEditMetadata, Op::AddResource]);
    assert_invalid(&ledger, &new_photo(), &[ResourceType::ImageResource], None);
}

#[test]
fn test_uncreated_record_must_start_with_creation() {
    let ledger = ledger_of(&[Op::SetFavorite]);
    assert_invalid(&ledger, &new_photo(), &[], None);
    assert!(validate(&ledger, &stored_photo(), &[], None).is_ok());
}

#[test]
fn test_creation_or_edit_needs_a_payload() {
    assert_invalid(&ledger_of(&[Op::CreateFromScratch]), &new_photo(), &[], None);
    assert_invalid(&ledger_of(&[Op::SetEditMetadata]), &stored_photo(), &[], None);

    let ledger = ledger_of(&[Op::CreateFromScratch, Op::AddResource]);
    assert!(validate(&ledger, &new_photo(), &[ResourceType::ImageResource], None).is_ok());

    let ledger = ledger_of(&[Op::SetEditMetadata, Op::OpenWriteHandle]);
    assert!(validate(&ledger, &stored_photo(), &[], None).is_ok());
}

#[test]
fn test_same_resource_twice_is_invalid() {
    let ledger = ledger_of(&[Op::AddResource, Op::AddResource]);
    let resources = [ResourceType::ImageResource, ResourceType::ImageResource];
    assert_invalid(&ledger, &stored_photo(), &resources, None);
}

#[test]
fn test_moving_photo_creation_needs_one_image_and_one_video() {
    let record = new_photo().with_subtype(PhotoSubtype::MovingPhoto);
    let pair = ledger_of(&[Op::CreateFromScratch, Op::AddResource, Op::AddResource]);
    let single = ledger_of(&[Op::CreateFromScratch, Op::AddResource]);

    assert!(validate(
        &pair,
        &record,
        &[ResourceType::ImageResource, ResourceType::VideoResource],
        None
    )
    .is_ok());
    assert_invalid(&single, &record, &[ResourceType::ImageResource], None);
    assert_invalid(
        &pair,
        &record,
        &[ResourceType::VideoResource, ResourceType::VideoResource],
        None,
    );
}

#[test]
fn test_effect_mode_requires_its_resources() {
    let ledger_without = ledger_of(&[Op::SetMovingPhotoEffectMode]);
    let ledger_with = ledger_of(&[Op::SetMovingPhotoEffectMode, Op::AddResource]);

    for mode in MovingPhotoEffectMode::iter() {
        let required = mode.required_resources();
        let bare = validate(&ledger_without, &stored_moving_photo(), &[], Some(mode));
        assert_eq!(bare.is_ok(), required.is_empty(), "mode {}", mode);

        if let [resource] = required {
            assert!(
                validate(&ledger_with, &stored_moving_photo(), &[*resource], Some(mode)).is_ok(),
                "mode {}",
                mode
            );
        }
    }
}

#[test]
fn test_effect_mode_on_unmaterialized_asset_is_invalid() {
    let ledger = ledger_of(&[Op::SetMovingPhotoEffectMode]);
    let pending = stored_moving_photo().with_pending(PendingMarker::ComponentPending);
    assert_invalid(&ledger, &pending, &[], Some(MovingPhotoEffectMode::ImageOnly));
}

#[test]
fn test_proxy_and_capture_need_a_created_asset() {
    let ledger = ledger_of(&[Op::CreateFromScratch, Op::AddResource]);
    assert_invalid(&ledger, &new_photo(), &[ResourceType::PhotoProxy], None);

    let ledger = ledger_of(&[Op::AddResource, Op::SaveCapture]);
    assert!(validate(&ledger, &stored_photo(), &[ResourceType::PhotoProxy], None).is_ok());
}
