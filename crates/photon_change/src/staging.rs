//! Moving resource bytes into store-owned sinks.

use photon_core::{MediaType, ResourceType, extension_of};
use photon_error::{ChangeRequestError, ChangeRequestErrorKind, PhotonResult};
use photon_store::{AssetStore, CacheAllocator, CacheName, CacheSlot, WriteTarget};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};

/// Where staged bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    /// A file copied at commit time
    FilePath(PathBuf),
    /// Bytes held in memory
    Buffer(Vec<u8>),
}

impl ResourceSource {
    /// Short name of the source mode.
    pub fn mode(&self) -> &'static str {
        match self {
            ResourceSource::FilePath(_) => "file_path",
            ResourceSource::Buffer(_) => "byte_buffer",
        }
    }
}

/// A resource waiting for commit, with the cache slot reserved for it.
#[derive(Debug)]
pub struct StagedResource {
    resource_type: ResourceType,
    source: ResourceSource,
    slot: CacheSlot,
}

impl StagedResource {
    /// Kind of resource.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Source of the bytes.
    pub fn source(&self) -> &ResourceSource {
        &self.source
    }

    /// Reserved cache name.
    pub fn cache_name(&self) -> &CacheName {
        self.slot.name()
    }

    /// Hand the cache file to the store after a successful finalize.
    pub fn release(self) -> CacheName {
        self.slot.release()
    }
}

/// Validates staging calls, reserves cache slots and streams bytes into
/// store write handles.
///
/// Copies go through a fixed-size buffer so large videos are never held in
/// memory whole.
#[derive(Clone)]
pub struct ResourceStager {
    store: Arc<dyn AssetStore>,
    allocator: &'static CacheAllocator,
    copy_buffer_bytes: usize,
}

impl ResourceStager {
    /// Create a stager over `store` using the process-wide allocator.
    pub fn new(store: Arc<dyn AssetStore>, copy_buffer_bytes: usize) -> Self {
        Self {
            store,
            allocator: CacheAllocator::global(),
            copy_buffer_bytes: copy_buffer_bytes.max(1),
        }
    }

    /// Reserve a cache slot with the given extension.
    pub fn reserve(&self, extension: &str) -> CacheSlot {
        CacheSlot::new(self.allocator.allocate(extension), Arc::clone(&self.store))
    }

    /// Stage a file by path. Bytes are copied at commit.
    ///
    /// The file's existence is not checked here; a missing file fails the
    /// commit with `NoSuchFile`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the path is a directory or its extension
    /// does not fit the resource type.
    pub fn stage_path(
        &self,
        path: impl Into<PathBuf>,
        resource_type: ResourceType,
        slot_extension: &str,
    ) -> PhotonResult<StagedResource> {
        let path = path.into();
        if path.as_os_str().is_empty() || path.is_dir() {
            return Err(ChangeRequestError::invalid(format!(
                "Invalid source path: {}",
                path.display()
            ))
            .into());
        }
        let extension = extension_of(&path.to_string_lossy()).ok_or_else(|| {
            ChangeRequestError::invalid(format!("Source has no extension: {}", path.display()))
        })?;
        check_extension(&extension, resource_type)?;

        tracing::debug!(
            path = %path.display(),
            resource_type = %resource_type,
            "Staged resource from path"
        );
        Ok(StagedResource {
            resource_type,
            source: ResourceSource::FilePath(path),
            slot: self.reserve(slot_extension),
        })
    }

    /// Stage in-memory bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the buffer is empty.
    pub fn stage_buffer(
        &self,
        bytes: Vec<u8>,
        resource_type: ResourceType,
        slot_extension: &str,
    ) -> PhotonResult<StagedResource> {
        if bytes.is_empty() {
            return Err(ChangeRequestError::invalid("Invalid data buffer: empty").into());
        }
        tracing::debug!(bytes = bytes.len(), resource_type = %resource_type, "Staged resource from buffer");
        Ok(StagedResource {
            resource_type,
            source: ResourceSource::Buffer(bytes),
            slot: self.reserve(slot_extension),
        })
    }

    /// Write a staged resource into its cache slot.
    pub async fn promote(&self, staged: &StagedResource) -> PhotonResult<u64> {
        self.write_to(staged.source(), &WriteTarget::Cache(staged.cache_name().clone()))
            .await
    }

    /// Stream a source into a store write handle, returning the bytes copied.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchFile` if a source file is missing, `Io` if copying
    /// fails, or the store's error if it refuses the handle.
    #[tracing::instrument(skip(self, source, target), fields(mode = source.mode(), target = %target))]
    pub async fn write_to(&self, source: &ResourceSource, target: &WriteTarget) -> PhotonResult<u64> {
        let copied = match source {
            ResourceSource::FilePath(path) => {
                // Open the source first so a missing file never creates a sink
                let file = open_source(path).await?;
                let mut sink = self.store.open_write_handle(target).await?;
                let mut reader = BufReader::with_capacity(self.copy_buffer_bytes, file);
                let copied = tokio::io::copy_buf(&mut reader, &mut sink)
                    .await
                    .map_err(|e| io_error(path, e))?;
                sink.shutdown().await.map_err(|e| io_error(path, e))?;
                copied
            }
            ResourceSource::Buffer(bytes) => {
                let mut sink = self.store.open_write_handle(target).await?;
                let buffer = Path::new("<buffer>");
                sink.write_all(bytes).await.map_err(|e| io_error(buffer, e))?;
                sink.shutdown().await.map_err(|e| io_error(buffer, e))?;
                bytes.len() as u64
            }
        };

        tracing::debug!(bytes = copied, "Copied resource bytes");
        Ok(copied)
    }
}

impl std::fmt::Debug for ResourceStager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStager")
            .field("copy_buffer_bytes", &self.copy_buffer_bytes)
            .finish()
    }
}

async fn open_source(path: &Path) -> PhotonResult<tokio::fs::File> {
    tokio::fs::File::open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ChangeRequestError::new(ChangeRequestErrorKind::NoSuchFile(path.display().to_string()))
                .into()
        } else {
            io_error(path, e).into()
        }
    })
}

fn io_error(path: &Path, e: std::io::Error) -> ChangeRequestError {
    ChangeRequestError::new(ChangeRequestErrorKind::Io(format!("{}: {}", path.display(), e)))
}

/// Check that a file extension fits the resource type.
pub(crate) fn check_extension(extension: &str, resource_type: ResourceType) -> PhotonResult<()> {
    let expected = match resource_type {
        ResourceType::ImageResource | ResourceType::PhotoProxy => MediaType::Image,
        ResourceType::VideoResource => MediaType::Video,
    };
    if MediaType::from_extension(extension) != Some(expected) {
        return Err(ChangeRequestError::invalid(format!(
            "Extension {} does not fit resource {}",
            extension, resource_type
        ))
        .into());
    }
    Ok(())
}
