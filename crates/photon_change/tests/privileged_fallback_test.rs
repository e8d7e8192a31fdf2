mod common;

use common::{RecordingStore, StoreCall, library, source_file};
use photon_change::CreationOptions;
use photon_core::{EditMetadata, MediaType, PhotoSubtype, ResourceType};
use photon_error::ErrorCategory;
use tempfile::TempDir;

fn privileged_inserts(store: &RecordingStore) -> usize {
    store
        .calls()
        .iter()
        .filter(|call| matches!(call, StoreCall::InsertPrivileged(_)))
        .count()
}

#[tokio::test]
async fn test_creation_without_grant_writes_through_privileged_path() {
    let root = TempDir::new().unwrap();
    let store = RecordingStore::open(&root, false);
    let library = library(&store);

    let mut request = library
        .create_asset_request(CreationOptions::new(MediaType::Image, "jpg").with_title("IMG_0200"))
        .unwrap();
    request
        .add_resource_from_buffer(b"privileged bytes".to_vec(), ResourceType::ImageResource)
        .unwrap();
    let asset = request.commit().await.unwrap();

    assert!(asset.id.is_durable());
    assert_eq!(privileged_inserts(&store), 1);
    assert!(store.submits().is_empty());

    let path = store.inner().resource_path(asset.id).await.unwrap();
    assert_eq!(tokio::fs::read(path).await.unwrap(), b"privileged bytes");
    assert!(*store.inner().row(asset.id).await.unwrap().privileged());

    // The unused cache slot is discarded during commit
    assert_eq!(store.deleted().len(), 1);
}

#[tokio::test]
async fn test_moving_photo_without_grant_writes_both_files() {
    let root = TempDir::new().unwrap();
    let sources = TempDir::new().unwrap();
    let store = RecordingStore::open(&root, false);
    let library = library(&store);

    let options = CreationOptions::new(MediaType::Image, "jpg")
        .with_title("IMG_0201")
        .with_subtype(PhotoSubtype::MovingPhoto);
    let mut request = library.create_asset_request(options).unwrap();
    request
        .add_resource_from_path(
            source_file(&sources, "still.jpg", b"still"),
            ResourceType::ImageResource,
        )
        .unwrap();
    request
        .add_resource_from_buffer(b"motion".to_vec(), ResourceType::VideoResource)
        .unwrap();
    let asset = request.commit().await.unwrap();

    assert_eq!(privileged_inserts(&store), 1);
    let image = store.inner().resource_path(asset.id).await.unwrap();
    let video = store.inner().video_path(asset.id).await.unwrap();
    assert_eq!(tokio::fs::read(image).await.unwrap(), b"still");
    assert_eq!(tokio::fs::read(video).await.unwrap(), b"motion");
    assert!(request.record().is_moving_photo());
}

#[tokio::test]
async fn test_source_path_creation_without_grant() {
    let root = TempDir::new().unwrap();
    let sources = TempDir::new().unwrap();
    let store = RecordingStore::open(&root, false);
    let library = library(&store);

    let path = source_file(&sources, "clip.mov", b"video bytes");
    let mut request = library.create_from_source_path(&path, MediaType::Video).unwrap();
    let asset = request.commit().await.unwrap();

    assert_eq!(privileged_inserts(&store), 1);
    let stored = store.inner().resource_path(asset.id).await.unwrap();
    assert_eq!(tokio::fs::read(stored).await.unwrap(), b"video bytes");
    assert_eq!(request.record().display_name(), "clip.mov");
}

#[tokio::test]
async fn test_denied_edit_of_unprivileged_asset_surfaces() {
    let root = TempDir::new().unwrap();
    let record = {
        let store = RecordingStore::open(&root, true);
        let library = library(&store);
        let mut request = library
            .create_asset_request(CreationOptions::new(MediaType::Image, "jpg"))
            .unwrap();
        request
            .add_resource_from_buffer(b"original".to_vec(), ResourceType::ImageResource)
            .unwrap();
        request.commit().await.unwrap();
        request.into_record()
    };

    // Same catalog, reopened without write access
    let store = RecordingStore::open(&root, false);
    let library = library(&store);
    let mut request = library.change_request(record.clone()).unwrap();
    request
        .set_edit_metadata(EditMetadata::new("com.example.editor", "1.0", b"{}".to_vec()).unwrap())
        .unwrap();
    request
        .add_resource_from_buffer(b"edited".to_vec(), ResourceType::ImageResource)
        .unwrap();

    let err = request.commit().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::PermissionDenied);
    assert_eq!(err.operation(), Some("add_resource"));
    assert_eq!(privileged_inserts(&store), 0);
    assert!(!library.guard().is_under_edit(record.id()));

    let path = store.inner().resource_path(record.id()).await.unwrap();
    assert_eq!(tokio::fs::read(path).await.unwrap(), b"original");
}

#[tokio::test]
async fn test_privileged_edit_can_be_reverted() {
    let root = TempDir::new().unwrap();
    let store = RecordingStore::open(&root, false);
    let library = library(&store);

    let mut request = library
        .create_asset_request(CreationOptions::new(MediaType::Image, "jpg").with_title("IMG_9"))
        .unwrap();
    request
        .add_resource_from_buffer(b"original".to_vec(), ResourceType::ImageResource)
        .unwrap();
    request.commit().await.unwrap();
    let record = request.into_record();
    let id = record.id();

    let mut request = library.change_request(record).unwrap();
    request
        .set_edit_metadata(EditMetadata::new("com.example.editor", "1.0", b"{}".to_vec()).unwrap())
        .unwrap();
    request
        .add_resource_from_buffer(b"edited".to_vec(), ResourceType::ImageResource)
        .unwrap();
    request.commit().await.unwrap();

    let path = store.inner().resource_path(id).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"edited");
    let row = store.inner().row(id).await.unwrap();
    assert!(row.edit_metadata().is_some());
    assert!(row.original_path().is_some());

    let mut record = request.into_record();
    library.revert_to_original(&mut record).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"original");
    assert!(record.edit_time().is_none());
    assert!(store.inner().row(id).await.unwrap().edit_metadata().is_none());
}
