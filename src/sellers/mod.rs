//! Seller data model and access

pub mod local;
pub mod model;
pub mod provider;

pub use local::LocalSellersDirectory;
pub use model::{BatchSellersResult, Seller, SellerResult, SellerType, SellersJson, SellersMetadata};
pub use provider::{CacheInfo, SellerAccess, SellersError, SellersFetcher, SellersProvider};
