use photon_core::{
    AssetId, AssetRecord, AssetRef, AttributeDelta, MediaType, MovingPhotoEffectMode,
    PendingMarker, PhotoSubtype, ResourceType, check_display_name, check_title, extension_of,
};
use strum::IntoEnumIterator;

#[test]
fn test_effect_mode_resource_table() {
    use MovingPhotoEffectMode::*;
    assert!(Default.required_resources().is_empty());
    assert!(ImageOnly.required_resources().is_empty());
    for mode in [BouncePlay, LoopPlay, CinemaGraph] {
        assert_eq!(mode.required_resources(), &[ResourceType::VideoResource]);
    }
    for mode in [LongExposure, MultiExposure] {
        assert_eq!(mode.required_resources(), &[ResourceType::ImageResource]);
    }
}

#[test]
fn test_no_effect_mode_requires_a_proxy() {
    for mode in MovingPhotoEffectMode::iter() {
        assert!(!mode.required_resources().contains(&ResourceType::PhotoProxy));
    }
}

#[test]
fn test_materialize_adopts_durable_identity() {
    let mut record = AssetRecord::new("IMG_1.jpg", MediaType::Image)
        .with_pending(PendingMarker::CreatePending);
    assert!(record.asset_ref().is_none());

    let asset = AssetRef::new(AssetId(12), "file://media/Photo/12/IMG_1/IMG_1.jpg");
    assert!(record.materialize(&asset));
    assert_eq!(record.id(), AssetId(12));
    assert_eq!(record.pending(), PendingMarker::Unset);
    assert_eq!(record.asset_ref(), Some(asset));
}

#[test]
fn test_materialize_rejects_unset_id_and_empty_uri() {
    let mut record = AssetRecord::new("IMG_1.jpg", MediaType::Image);
    assert!(!record.materialize(&AssetRef::new(AssetId::UNSET, "file://media/Photo/0")));
    assert!(!record.materialize(&AssetRef::new(AssetId(3), "")));
    assert_eq!(record.id(), AssetId::UNSET);
}

#[test]
fn test_title_strips_extension() {
    let record = AssetRecord::new("holiday.final.jpg", MediaType::Image)
        .with_subtype(PhotoSubtype::Burst);
    assert_eq!(record.title(), "holiday.final");
    assert!(!record.is_moving_photo());
}

#[test]
fn test_display_name_validation() {
    assert!(check_display_name("IMG_0001.jpg", 255).is_ok());
    assert!(check_display_name("no_extension", 255).is_err());
    assert!(check_display_name("trailing.", 255).is_err());
    assert!(check_display_name(".hidden.jpg", 255).is_err());
    assert!(check_display_name("dir/IMG.jpg", 255).is_err());
    assert!(check_display_name("IMG_0001.jpg", 8).is_err());
    assert!(check_title("   ", 255).is_err());
}

#[test]
fn test_extension_and_media_type_inference() {
    assert_eq!(extension_of("a/b/clip.MP4").as_deref(), Some("mp4"));
    assert_eq!(extension_of("noext"), None);
    assert_eq!(MediaType::from_extension("HEIC"), Some(MediaType::Image));
    assert_eq!(MediaType::from_extension("mov"), Some(MediaType::Video));
    assert_eq!(MediaType::from_extension("txt"), None);
    assert_eq!(MediaType::Video.primary_resource(), ResourceType::VideoResource);
}

#[test]
fn test_delta_emptiness() {
    assert!(AttributeDelta::default().is_empty());
    let delta = AttributeDelta::default()
        .with_effect_mode(MovingPhotoEffectMode::LoopPlay)
        .with_hidden(false);
    assert!(!delta.is_empty());
    assert_eq!(delta.hidden, Some(false));
}

#[test]
fn test_image_only_photo_is_still_a_moving_asset() {
    let record = AssetRecord::new("IMG_1.heic", MediaType::Image)
        .with_effect_mode(MovingPhotoEffectMode::ImageOnly);
    assert!(!record.is_moving_photo());
    assert!(record.is_moving_asset());

    let plain = AssetRecord::new("IMG_2.jpg", MediaType::Image);
    assert!(!plain.is_moving_asset());
    let burst = plain
        .with_subtype(PhotoSubtype::Burst)
        .with_effect_mode(MovingPhotoEffectMode::ImageOnly);
    assert!(!burst.is_moving_asset());
}
