#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use photon_change::{AssetLibrary, ChangeConfig, EditCommitGuard};
use photon_core::{AssetId, AssetRecord, AssetRef, AttributeDelta, CreationAttributes};
use photon_error::{PhotonResult, StoreError, StoreErrorKind};
use photon_store::{
    AssetStore, CacheName, CacheSubmission, FileSystemAssetStore, StoreConfig, WriteHandle,
    WriteTarget,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

/// One call made against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    OpenWriteHandle(WriteTarget),
    SubmitCache(CacheSubmission),
    Update(AssetId, AttributeDelta),
    InsertPrivileged(CreationAttributes),
    Fetch(AssetId),
    Revert(AssetId),
    DeleteCache(CacheName),
}

/// Filesystem store that records every call and can be told to fail.
pub struct RecordingStore {
    inner: FileSystemAssetStore,
    calls: Mutex<Vec<StoreCall>>,
    fail_submit: AtomicBool,
}

impl RecordingStore {
    pub fn open(dir: &TempDir, grant_write: bool) -> Arc<Self> {
        let config = StoreConfig::default()
            .with_root(dir.path())
            .with_grant_write(grant_write);
        Arc::new(Self {
            inner: FileSystemAssetStore::open(&config).unwrap(),
            calls: Mutex::new(Vec::new()),
            fail_submit: AtomicBool::new(false),
        })
    }

    pub fn inner(&self) -> &FileSystemAssetStore {
        &self.inner
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn fail_submits(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    pub fn submits(&self) -> Vec<CacheSubmission> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::SubmitCache(submission) => Some(submission),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<CacheName> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::DeleteCache(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(AssetId, AttributeDelta)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Update(id, delta) => Some((id, delta)),
                _ => None,
            })
            .collect()
    }

    /// Calls that change or may change stored state.
    pub fn mutating_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| !matches!(call, StoreCall::Fetch(_)))
            .count()
    }

    fn push(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl AssetStore for RecordingStore {
    async fn open_write_handle(&self, target: &WriteTarget) -> PhotonResult<WriteHandle> {
        self.push(StoreCall::OpenWriteHandle(target.clone()));
        self.inner.open_write_handle(target).await
    }

    async fn submit_cache(&self, submission: CacheSubmission) -> PhotonResult<AssetRef> {
        self.push(StoreCall::SubmitCache(submission.clone()));
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(StoreError::new(StoreErrorKind::Unavailable("injected failure".to_string())).into());
        }
        self.inner.submit_cache(submission).await
    }

    async fn update(&self, id: AssetId, delta: &AttributeDelta) -> PhotonResult<u64> {
        self.push(StoreCall::Update(id, delta.clone()));
        self.inner.update(id, delta).await
    }

    async fn insert_privileged(&self, attributes: &CreationAttributes) -> PhotonResult<AssetRef> {
        self.push(StoreCall::InsertPrivileged(attributes.clone()));
        self.inner.insert_privileged(attributes).await
    }

    async fn fetch(&self, id: AssetId) -> PhotonResult<Option<AssetRecord>> {
        self.push(StoreCall::Fetch(id));
        self.inner.fetch(id).await
    }

    async fn revert_to_original(&self, id: AssetId) -> PhotonResult<()> {
        self.push(StoreCall::Revert(id));
        self.inner.revert_to_original(id).await
    }

    fn delete_cache(&self, name: &CacheName) -> PhotonResult<()> {
        self.push(StoreCall::DeleteCache(name.clone()));
        self.inner.delete_cache(name)
    }
}

/// Library over a recording store with its own edit guard.
pub fn library(store: &Arc<RecordingStore>) -> AssetLibrary {
    let store: Arc<dyn AssetStore> = store.clone();
    AssetLibrary::new(store, ChangeConfig::default()).with_guard(Arc::new(EditCommitGuard::new()))
}

/// Write a source file into `dir` and return its path.
pub fn source_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
