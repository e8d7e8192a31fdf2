//! Change requests for Photon assets.
//!
//! A [`ChangeRequest`] collects the changes to one asset (creation, staged
//! resources, effect mode, edit metadata, attributes) and applies them in one
//! [`ChangeRequest::commit`]:
//!
//! 1. the [`OperationLedger`] orders operations as they are recorded
//! 2. [`validate`] checks cross-operation rules before any store call
//! 3. staged bytes are streamed into cache slots and finalized by the store
//! 4. every other operation kind runs its executor once
//!
//! [`EditCommitGuard`] keeps an edit commit and a revert of the same asset
//! apart. [`AssetLibrary`] is where requests start.
//!
//! # Example
//!
//! ```rust,no_run
//! use photon_change::{AssetLibrary, ChangeConfig, CreationOptions};
//! use photon_core::{MediaType, PhotoSubtype, ResourceType};
//! use photon_store::{FileSystemAssetStore, StoreConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FileSystemAssetStore::open(&StoreConfig::default())?);
//! let library = AssetLibrary::new(store, ChangeConfig::default());
//!
//! let options = CreationOptions::new(MediaType::Image, "jpg").with_subtype(PhotoSubtype::MovingPhoto);
//! let mut request = library.create_asset_request(options)?;
//! request.add_resource_from_path("/tmp/still.jpg", ResourceType::ImageResource)?;
//! request.add_resource_from_path("/tmp/motion.mp4", ResourceType::VideoResource)?;
//! let asset = request.commit().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dispatcher;
mod guard;
mod ledger;
mod library;
mod operation;
mod request;
mod staging;
mod validator;

pub use config::{CallerContext, ChangeConfig};
pub use guard::EditCommitGuard;
pub use ledger::OperationLedger;
pub use library::{AssetLibrary, CreationOptions};
pub use operation::AssetChangeOperation;
pub use request::{ChangeRequest, RequestState};
pub use staging::{ResourceSource, ResourceStager, StagedResource};
pub use validator::validate;
