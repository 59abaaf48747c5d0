//! Core domain types for planning and pricing writes to a permanent,
//! content-addressed storage network.
//!
//! This crate defines the data model shared by the pricing and planning
//! crates:
//! - Byte counts, chunk arithmetic and fee amounts
//! - Fee multiples and exact decimal ratios
//! - Entity ids, addresses, drive keys and tags
//! - Entity-metadata prototypes and data item sizing
//! - Upload orders and configuration

pub mod byte_count;
pub mod chunk;
pub mod config;
pub mod data_item;
pub mod decimal;
pub mod entity;
pub mod error;
pub mod fee_multiple;
pub mod metadata;
pub mod tags;
pub mod upload;
pub mod winston;

pub use byte_count::ByteCount;
pub use chunk::{BYTES_PER_CHUNK, chunk_count};
pub use decimal::ExactDecimal;
pub use entity::{ArweaveAddress, DriveKey, EntityId, Privacy};
pub use error::{Error, Result};
pub use fee_multiple::FeeMultiple;
pub use metadata::MetaDataPrototype;
pub use tags::{Tag, TagSettings};
pub use upload::{
    PlannedEntity, PlannedFile, PlannedFolder, UploadOrder, UploadStats, WrappedEntity,
    WrappedFile, WrappedFolder,
};
pub use winston::{Ar, Winston};

/// Default maximum summed data item size of a bundle: 500 MiB.
pub const DEFAULT_MAX_BUNDLE_SIZE: u64 = 500 * 1024 * 1024;

/// Default maximum number of data items in a bundle.
pub const DEFAULT_MAX_DATA_ITEM_LIMIT: u64 = 500;
