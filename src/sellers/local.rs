//! sellers.json files mirrored into a local directory

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use super::model::{BatchSellersResult, Seller, SellerResult, SellersJson, SellersMetadata};
use super::provider::{CacheInfo, SellersError, SellersFetcher, SellersProvider};
use crate::core::domain::normalize_domain;
use crate::scanner::file_scanner::collect_sellers_json_files;

struct CachedSellers {
    document: Arc<SellersJson>,
    loaded_at: SystemTime,
}

/// Seller source backed by a directory of sellers.json files
///
/// Parsed files are cached for the lifetime of the value, so repeated
/// cross-checks against the same directory only read each file once.
/// Serves both the batch and the whole-document access shapes.
pub struct LocalSellersDirectory {
    files: HashMap<String, PathBuf>,
    cache: Mutex<HashMap<String, CachedSellers>>,
}

impl LocalSellersDirectory {
    /// Index every sellers.json under `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        let files = collect_sellers_json_files(dir)
            .with_context(|| format!("Failed to scan sellers directory {}", dir.display()))?;
        debug!("Indexed {} sellers.json file(s) in {}", files.len(), dir.display());
        Ok(Self::from_files(files))
    }

    pub fn from_files(files: impl IntoIterator<Item = (String, PathBuf)>) -> Self {
        Self {
            files: files
                .into_iter()
                .map(|(domain, path)| (normalize_domain(&domain), path))
                .collect(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.files.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }

    fn load(&self, domain: &str) -> Result<Option<Arc<SellersJson>>, SellersError> {
        let domain = normalize_domain(domain);
        let Some(path) = self.files.get(&domain) else {
            return Ok(None);
        };

        if let Ok(cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&domain) {
                return Ok(Some(Arc::clone(&cached.document)));
            }
        }

        let bytes = fs::read(path)?;
        let document = Arc::new(SellersJson::from_slice(&bytes)?);
        debug!(
            "Loaded {} seller(s) for {} from {}",
            document.sellers.len(),
            domain,
            path.display()
        );

        match self.cache.lock() {
            Ok(mut cache) => {
                cache.insert(
                    domain,
                    CachedSellers {
                        document: Arc::clone(&document),
                        loaded_at: SystemTime::now(),
                    },
                );
            }
            Err(_) => warn!("sellers cache lock poisoned; {} not cached", domain),
        }

        Ok(Some(document))
    }
}

impl SellersProvider for LocalSellersDirectory {
    fn has_sellers_json(&self, domain: &str) -> Result<bool, SellersError> {
        Ok(self.files.contains_key(&normalize_domain(domain)))
    }

    fn batch_get_sellers(
        &self,
        domain: &str,
        seller_ids: &[String],
    ) -> Result<BatchSellersResult, SellersError> {
        let document = self.load(domain)?.ok_or_else(|| SellersError::Unavailable {
            domain: domain.to_string(),
            reason: "no sellers.json in directory".to_string(),
        })?;

        let mut by_id: HashMap<&str, &Seller> = HashMap::with_capacity(document.sellers.len());
        for seller in &document.sellers {
            by_id.entry(seller.lookup_id()).or_insert(seller);
        }

        let results: Vec<SellerResult> = seller_ids
            .iter()
            .map(|id| {
                let seller = by_id.get(id.trim()).map(|s| (*s).clone());
                SellerResult {
                    seller_id: id.clone(),
                    found: seller.is_some(),
                    seller,
                }
            })
            .collect();

        Ok(BatchSellersResult {
            domain: domain.to_string(),
            requested_count: seller_ids.len(),
            found_count: results.iter().filter(|r| r.found).count(),
            results,
            metadata: SellersMetadata {
                contact_email: document.contact_email.clone(),
                contact_address: document.contact_address.clone(),
                version: document.version.as_ref().map(|v| match v.as_str() {
                    Some(s) => s.to_string(),
                    None => v.to_string(),
                }),
                seller_count: document.sellers.len(),
            },
        })
    }

    fn cache_info(&self, domain: &str) -> Option<CacheInfo> {
        let domain = normalize_domain(domain);
        if !self.files.contains_key(&domain) {
            return None;
        }
        let cache = self.cache.lock().ok()?;
        Some(match cache.get(&domain) {
            Some(cached) => CacheInfo {
                is_cached: true,
                last_updated: Some(cached.loaded_at),
                seller_count: cached.document.sellers.len(),
            },
            None => CacheInfo {
                is_cached: false,
                last_updated: None,
                seller_count: 0,
            },
        })
    }
}

impl SellersFetcher for LocalSellersDirectory {
    fn fetch(&self, domain: &str) -> Result<Option<SellersJson>, SellersError> {
        Ok(self.load(domain)?.map(|document| (*document).clone()))
    }
}
