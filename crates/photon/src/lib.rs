//! Photon - media asset library with staged, validated change requests.
//!
//! Photon stores photos, videos and moving photos. Every mutation goes
//! through a change request that records operations, validates them as a
//! whole, stages bytes in cache files and commits them in one pass.
//!
//! # Features
//!
//! - **Change requests**: creation, resources, edits, effect modes and
//!   attributes applied together
//! - **Moving photos**: image and companion video finalized in one store call
//! - **Edit and revert**: original bytes kept on first edit; edits and
//!   reverts of one asset never overlap
//! - **Privileged fallback**: creation still works when cache writes are
//!   denied
//! - **Layered configuration**: bundled defaults, home directory and
//!   working directory `photon.toml`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use photon::{CreationOptions, MediaType, Photon, PhotonConfig, PhotoSubtype, ResourceType};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PhotonConfig::load()?;
//! photon::init_telemetry(&config.telemetry)?;
//!
//! let photon = Photon::open(config)?;
//! let options = CreationOptions::new(MediaType::Image, "heic").with_subtype(PhotoSubtype::MovingPhoto);
//! let mut request = photon.library().create_asset_request(options)?;
//! request.add_resource_from_path("/tmp/still.heic", ResourceType::ImageResource)?;
//! request.add_resource_from_path("/tmp/motion.mov", ResourceType::VideoResource)?;
//! let asset = request.commit().await?;
//! println!("created {}", asset);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `photon_error` - Error types
//! - `photon_core` - Asset records, media enums, telemetry
//! - `photon_store` - Asset store trait, cache slots, filesystem backend
//! - `photon_change` - Ledger, validation, staging, commit dispatch
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod handle;

pub use config::PhotonConfig;
pub use handle::Photon;

pub use photon_change::{
    AssetChangeOperation, AssetLibrary, CallerContext, ChangeConfig, ChangeRequest,
    CreationOptions, EditCommitGuard, OperationLedger, RequestState, ResourceSource,
    ResourceStager, StagedResource, validate,
};
pub use photon_core::*;
pub use photon_error::*;
pub use photon_store::{
    AssetStore, CacheAllocator, CacheName, CacheSlot, CacheSubmission, FileSystemAssetStore,
    StoreConfig, SubmitTarget, WriteHandle, WriteTarget,
};
