//! Asset store interface and cache staging for Photon.
//!
//! The asset store is the durable side of the library: it owns asset rows and
//! resource files, hands out byte sinks, and finalizes staged cache files into
//! assets. The change pipeline only talks to it through [`AssetStore`].
//!
//! # Features
//!
//! - **Cache slots**: collision-free temporary names from a process-wide
//!   [`CacheAllocator`], each owned by a [`CacheSlot`] that deletes the file
//!   unless released by a successful finalize
//! - **Pluggable backends**: trait-based abstraction; [`FileSystemAssetStore`]
//!   is the reference backend
//! - **Atomic catalog writes**: rows are written to a temp file and renamed
//!
//! # Example
//!
//! ```rust
//! use photon_store::{AssetStore, CacheAllocator, FileSystemAssetStore, StoreConfig, WriteTarget};
//! use tokio::io::AsyncWriteExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemAssetStore::open(&StoreConfig::default().with_root("/tmp/photon"))?;
//! let name = CacheAllocator::global().allocate("jpg");
//!
//! let mut sink = store.open_write_handle(&WriteTarget::Cache(name.clone())).await?;
//! sink.write_all(b"jpeg bytes").await?;
//! sink.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod filesystem;
mod row;
mod slot;
mod store;

pub use cache::{CacheAllocator, CacheName};
pub use config::StoreConfig;
pub use filesystem::FileSystemAssetStore;
pub use row::AssetRow;
pub use slot::CacheSlot;
pub use store::{AssetStore, CacheSubmission, SubmitTarget, WriteHandle, WriteTarget};
