//! Channel data directory
//!
//! Loads and saves per-asset channel configs, templates, the schema
//! document and shared separation constraint sets. Also holds the tool
//! configuration and the inventory service client used by audits.

pub mod cache;
pub mod config;
pub mod error;
pub mod inventory;
pub mod layout;
pub mod selector;
pub mod store;
pub mod yaml;

pub use cache::ConfigCache;
pub use config::{InventoryConfig, ToolConfig};
pub use error::{StoreError, StoreResult};
pub use inventory::{Inventory, InventoryAsset, InventoryClient, StaticInventory};
pub use layout::Layout;
pub use selector::{split_list, AssetSelector, ChannelSelector};
pub use store::{ChannelStore, SharedSet};
