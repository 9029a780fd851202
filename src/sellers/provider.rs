//! The two supported ways of reaching seller data
//!
//! * [`SellersProvider`] answers per-domain existence checks and batched
//!   id lookups without handing over the whole file.
//! * [`SellersFetcher`] returns the whole sellers.json document for a domain;
//!   the cross-check then scans and tallies it itself.
//!
//! The caller picks one explicitly through [`SellerAccess`].

use std::time::SystemTime;
use thiserror::Error;

use super::model::{BatchSellersResult, SellersJson};

#[derive(Error, Debug)]
pub enum SellersError {
    #[error("I/O error reading sellers.json: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed sellers.json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sellers.json unavailable for {domain}: {reason}")]
    Unavailable { domain: String, reason: String },

    #[error("{0}")]
    Other(String),
}

/// Snapshot of a provider's internal cache for one domain
#[derive(Debug, Clone, PartialEq)]
pub struct CacheInfo {
    pub is_cached: bool,
    pub last_updated: Option<SystemTime>,
    pub seller_count: usize,
}

/// Batch-oriented seller lookups
pub trait SellersProvider: Send + Sync {
    /// Whether `domain` publishes a sellers.json at all
    fn has_sellers_json(&self, domain: &str) -> Result<bool, SellersError>;

    /// Resolve `seller_ids` against the sellers.json of `domain`
    fn batch_get_sellers(
        &self,
        domain: &str,
        seller_ids: &[String],
    ) -> Result<BatchSellersResult, SellersError>;

    fn cache_info(&self, _domain: &str) -> Option<CacheInfo> {
        None
    }
}

/// Whole-document seller fetch
pub trait SellersFetcher: Send + Sync {
    /// `Ok(None)` means the domain has no sellers.json
    fn fetch(&self, domain: &str) -> Result<Option<SellersJson>, SellersError>;
}

impl<F> SellersFetcher for F
where
    F: Fn(&str) -> Result<Option<SellersJson>, SellersError> + Send + Sync,
{
    fn fetch(&self, domain: &str) -> Result<Option<SellersJson>, SellersError> {
        self(domain)
    }
}

/// Seller access mode, chosen once per cross-check
#[derive(Clone, Copy)]
pub enum SellerAccess<'a> {
    Batch(&'a dyn SellersProvider),
    Legacy(&'a dyn SellersFetcher),
}

impl SellerAccess<'_> {
    pub fn mode_name(&self) -> &'static str {
        match self {
            SellerAccess::Batch(_) => "batch",
            SellerAccess::Legacy(_) => "legacy",
        }
    }
}
