use photon_core::{
    AssetId, AttributeDelta, CreationAttributes, EditMetadata, MediaType, MovingPhotoEffectMode,
    PhotoSubtype,
};
use photon_error::{ErrorCategory, PhotonErrorKind, StoreErrorKind};
use photon_store::{
    AssetStore, CacheAllocator, CacheName, CacheSubmission, FileSystemAssetStore, StoreConfig,
    SubmitTarget, WriteTarget,
};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

fn open_store(dir: &TempDir) -> FileSystemAssetStore {
    FileSystemAssetStore::open(&StoreConfig::default().with_root(dir.path())).unwrap()
}

async fn stage(store: &FileSystemAssetStore, extension: &str, bytes: &[u8]) -> CacheName {
    let name = CacheAllocator::global().allocate(extension);
    let mut sink = store
        .open_write_handle(&WriteTarget::Cache(name.clone()))
        .await
        .unwrap();
    sink.write_all(bytes).await.unwrap();
    sink.shutdown().await.unwrap();
    name
}

fn is_store_kind(err: &photon_error::PhotonError, check: fn(&StoreErrorKind) -> bool) -> bool {
    match err.kind() {
        PhotonErrorKind::Store(e) => check(&e.kind),
        _ => false,
    }
}

#[tokio::test]
async fn test_create_from_cache() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let name = stage(&store, "jpg", b"jpeg bytes").await;
    let asset = store
        .submit_cache(CacheSubmission {
            target: SubmitTarget::Create(CreationAttributes::new("IMG_0001.jpg", MediaType::Image)),
            primary: Some(name.clone()),
            secondary: None,
        })
        .await
        .unwrap();

    assert!(asset.id.is_durable());
    assert_eq!(asset.uri, format!("file://media/Photo/{}/IMG_0001/IMG_0001.jpg", asset.id));
    assert!(!store.cache_path(&name).exists());

    let path = store.resource_path(asset.id).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"jpeg bytes");

    let record = store.fetch(asset.id).await.unwrap().unwrap();
    assert_eq!(record.display_name(), "IMG_0001.jpg");
    assert_eq!(record.asset_ref(), Some(asset.clone()));

    let row = store.row(asset.id).await.unwrap();
    assert_eq!(row.content_hash().as_ref().map(String::len), Some(64));
}

#[tokio::test]
async fn test_moving_photo_creation_places_video_beside_image() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let image = stage(&store, "jpg", b"still").await;
    let video = stage(&store, "mp4", b"motion").await;
    let attributes = CreationAttributes::new("IMG_0002.jpg", MediaType::Image)
        .with_subtype(PhotoSubtype::MovingPhoto);

    let asset = store
        .submit_cache(CacheSubmission {
            target: SubmitTarget::Create(attributes),
            primary: Some(image),
            secondary: Some(video),
        })
        .await
        .unwrap();

    let image_path = store.resource_path(asset.id).await.unwrap();
    let video_path = store.video_path(asset.id).await.unwrap();
    assert_eq!(image_path.parent(), video_path.parent());
    assert_eq!(video_path.file_name().unwrap(), "IMG_0002.mp4");
    assert_eq!(tokio::fs::read(&video_path).await.unwrap(), b"motion");

    let record = store.fetch(asset.id).await.unwrap().unwrap();
    assert!(record.is_moving_photo());
}

#[tokio::test]
async fn test_moving_photo_creation_without_video_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let image = stage(&store, "jpg", b"still").await;
    let attributes = CreationAttributes::new("IMG_0003.jpg", MediaType::Image)
        .with_subtype(PhotoSubtype::MovingPhoto);
    let err = store
        .submit_cache(CacheSubmission {
            target: SubmitTarget::Create(attributes),
            primary: Some(image),
            secondary: None,
        })
        .await
        .unwrap_err();
    assert!(is_store_kind(&err, |k| matches!(k, StoreErrorKind::Rejected(_))));
}

#[tokio::test]
async fn test_submit_missing_cache_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let err = store
        .submit_cache(CacheSubmission {
            target: SubmitTarget::Create(CreationAttributes::new("IMG.jpg", MediaType::Image)),
            primary: Some(CacheAllocator::global().allocate("jpg")),
            secondary: None,
        })
        .await
        .unwrap_err();
    assert!(is_store_kind(&err, |k| matches!(k, StoreErrorKind::NotFound(_))));
}

#[tokio::test]
async fn test_edit_keeps_original_and_revert_restores_it() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let first = stage(&store, "jpg", b"original").await;
    let asset = store
        .submit_cache(CacheSubmission {
            target: SubmitTarget::Create(CreationAttributes::new("IMG_0004.jpg", MediaType::Image)),
            primary: Some(first),
            secondary: None,
        })
        .await
        .unwrap();

    for bytes in [&b"edit one"[..], &b"edit two"[..]] {
        let edited = stage(&store, "jpg", bytes).await;
        let metadata = EditMetadata::new("com.example.editor", "1.0", b"{}".to_vec()).unwrap();
        store
            .submit_cache(CacheSubmission {
                target: SubmitTarget::Existing {
                    id: asset.id,
                    edit_metadata: Some(metadata),
                    effect_mode: None,
                },
                primary: Some(edited),
                secondary: None,
            })
            .await
            .unwrap();
    }

    let path = store.resource_path(asset.id).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"edit two");
    let record = store.fetch(asset.id).await.unwrap().unwrap();
    assert!(record.edit_time().is_some());

    store.revert_to_original(asset.id).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"original");
    let row = store.row(asset.id).await.unwrap();
    assert!(row.edit_metadata().is_none());
    assert!(row.original_path().is_none());

    let err = store.revert_to_original(asset.id).await.unwrap_err();
    assert!(is_store_kind(&err, |k| matches!(k, StoreErrorKind::Rejected(_))));
}

#[tokio::test]
async fn test_update_applies_delta_and_persists() {
    let temp_dir = TempDir::new().unwrap();
    let asset = {
        let store = open_store(&temp_dir);
        let name = stage(&store, "jpg", b"bytes").await;
        let asset = store
            .submit_cache(CacheSubmission {
                target: SubmitTarget::Create(CreationAttributes::new("IMG_0005.jpg", MediaType::Image)),
                primary: Some(name),
                secondary: None,
            })
            .await
            .unwrap();

        let delta = AttributeDelta::default()
            .with_favorite(true)
            .with_user_comment("sunset".to_string())
            .with_effect_mode(MovingPhotoEffectMode::LoopPlay);
        assert_eq!(store.update(asset.id, &delta).await.unwrap(), 1);
        assert_eq!(store.update(AssetId(999), &delta).await.unwrap(), 0);
        asset
    };

    // Reopen to read the catalog back from disk
    let store = open_store(&temp_dir);
    let record = store.fetch(asset.id).await.unwrap().unwrap();
    assert!(record.favorite());
    assert_eq!(record.user_comment(), Some("sunset"));
    assert_eq!(record.effect_mode(), MovingPhotoEffectMode::LoopPlay);

    // Ids keep increasing across reopen
    let name = stage(&store, "jpg", b"more").await;
    let next = store
        .submit_cache(CacheSubmission {
            target: SubmitTarget::Create(CreationAttributes::new("IMG_0006.jpg", MediaType::Image)),
            primary: Some(name),
            secondary: None,
        })
        .await
        .unwrap();
    assert!(next.id > asset.id);
}

#[tokio::test]
async fn test_without_grant_only_privileged_rows_are_writable() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemAssetStore::open(
        &StoreConfig::default()
            .with_root(temp_dir.path())
            .with_grant_write(false),
    )
    .unwrap();

    let name = CacheAllocator::global().allocate("jpg");
    let err = store
        .open_write_handle(&WriteTarget::Cache(name))
        .await
        .err().expect("expected error");
    assert_eq!(err.category(), ErrorCategory::PermissionDenied);
    assert!(err.is_permission_denied());

    let attributes = CreationAttributes::new("IMG_0007.jpg", MediaType::Image)
        .with_subtype(PhotoSubtype::MovingPhoto);
    let asset = store.insert_privileged(&attributes).await.unwrap();

    for target in [WriteTarget::Asset(asset.id), WriteTarget::AssetVideo(asset.id)] {
        let mut sink = store.open_write_handle(&target).await.unwrap();
        sink.write_all(target.to_string().as_bytes()).await.unwrap();
        sink.shutdown().await.unwrap();
    }

    let video = store.video_path(asset.id).await.unwrap();
    assert_eq!(
        tokio::fs::read_to_string(&video).await.unwrap(),
        format!("asset-video:{}", asset.id)
    );
}

#[tokio::test]
async fn test_delete_cache_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let name = stage(&store, "jpg", b"abandoned").await;
    assert!(store.cache_path(&name).exists());
    store.delete_cache(&name).unwrap();
    assert!(!store.cache_path(&name).exists());
    store.delete_cache(&name).unwrap();
}

#[tokio::test]
async fn test_edit_metadata_update_keeps_original_for_direct_writes() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    let name = stage(&store, "jpg", b"original").await;
    let asset = store
        .submit_cache(CacheSubmission {
            target: SubmitTarget::Create(CreationAttributes::new("IMG_0009.jpg", MediaType::Image)),
            primary: Some(name),
            secondary: None,
        })
        .await
        .unwrap();

    let metadata = EditMetadata::new("com.example.editor", "1.0", b"{}".to_vec()).unwrap();
    store
        .update(asset.id, &AttributeDelta::default().with_edit_metadata(metadata))
        .await
        .unwrap();
    assert!(store.row(asset.id).await.unwrap().original_path().is_some());

    let mut sink = store
        .open_write_handle(&WriteTarget::Asset(asset.id))
        .await
        .unwrap();
    sink.write_all(b"edited").await.unwrap();
    sink.shutdown().await.unwrap();

    store.revert_to_original(asset.id).await.unwrap();
    let path = store.resource_path(asset.id).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"original");
}
