//! sellers.json cross-check of parsed ads.txt entries
//!
//! One call covers one publisher domain:
//!
//! 1. split variables from records
//! 2. flag records already present in the cached ads.txt
//! 3. load seller data once per distinct advertising-system domain
//! 4. validate every record in parallel and attach its warnings
//!
//! Seller data is built completely before step 4 and only read afterwards.
//! Failures are contained: a broken domain only affects its own records, and
//! anything escaping the whole run returns the input unchanged.

use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

use super::domain::normalize_domain;
use super::entry::{Entry, Record, ValidationKey, ValidationResult, Warning};
use super::parser::parse_ads_txt_content;
use super::validator::{validate_relationship, DeclaredDomains, SellerLookup, ValidationContext};
use super::warnings::synthesize_warnings;
use crate::scanner::duplicate_detector::detect_duplicates;
use crate::sellers::model::Seller;
use crate::sellers::provider::{SellerAccess, SellersError, SellersFetcher, SellersProvider};

#[derive(Error, Debug)]
pub enum CrossCheckError {
    #[error("publisher domain is empty")]
    EmptyPublisherDomain,
}

enum SellerIdCounts {
    /// Tallied from the complete seller list
    Exact(HashMap<String, usize>),
    /// Batch lookups only see requested ids, so each found id counts once.
    /// Duplicate ids elsewhere in the file go undetected in this mode.
    AssumedUnique,
}

/// Seller data for one advertising-system domain
struct DomainSellers {
    has_seller_json: bool,
    sellers: HashMap<String, Seller>,
    counts: SellerIdCounts,
    fetch_error: Option<String>,
}

impl DomainSellers {
    fn missing() -> Self {
        Self {
            has_seller_json: false,
            sellers: HashMap::new(),
            counts: SellerIdCounts::AssumedUnique,
            fetch_error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            fetch_error: Some(message),
            ..Self::missing()
        }
    }

    fn lookup(&self, account_id: &str) -> SellerLookup<'_> {
        let id = account_id.trim();
        let seller = self.sellers.get(id);
        let occurrences = match &self.counts {
            SellerIdCounts::Exact(counts) => counts.get(id).copied(),
            SellerIdCounts::AssumedUnique => seller.map(|_| 1),
        };
        SellerLookup {
            has_seller_json: self.has_seller_json,
            seller,
            occurrences,
        }
    }
}

/// Cross-check entries against seller data for `publisher_domain`
///
/// # Arguments
/// * `publisher_domain` - Domain publishing the ads.txt; `None` skips the check
/// * `entries` - Parsed entries
/// * `cached_content` - Previously published ads.txt used for duplicate detection
/// * `access` - How seller data is obtained
///
/// # Returns
/// Variables followed by the validated records. This function never panics
/// or fails: on any unexpected error the input entries are returned as-is.
/// Re-sort by `line_number` if source order matters.
pub fn cross_check(
    publisher_domain: Option<&str>,
    entries: &[Entry],
    cached_content: Option<&str>,
    access: SellerAccess<'_>,
) -> Vec<Entry> {
    let Some(publisher_domain) = publisher_domain else {
        return entries.to_vec();
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run_cross_check(publisher_domain, entries, cached_content, access)
    }));

    match outcome {
        Ok(Ok(checked)) => checked,
        Ok(Err(e)) => {
            error!("Cross-check for {:?} failed: {}", publisher_domain, e);
            entries.to_vec()
        }
        Err(payload) => {
            error!(
                "Cross-check for {:?} panicked: {}",
                publisher_domain,
                panic_message(&*payload)
            );
            entries.to_vec()
        }
    }
}

/// Parse, cross-check and return entries in source line order
pub fn validate_ads_txt(
    content: &str,
    publisher_domain: Option<&str>,
    cached_content: Option<&str>,
    access: SellerAccess<'_>,
) -> Vec<Entry> {
    let entries = parse_ads_txt_content(content);
    let mut checked = cross_check(publisher_domain, &entries, cached_content, access);
    checked.sort_by_key(Entry::line_number);
    checked
}

fn run_cross_check(
    publisher_domain: &str,
    entries: &[Entry],
    cached_content: Option<&str>,
    access: SellerAccess<'_>,
) -> Result<Vec<Entry>, CrossCheckError> {
    let publisher_domain = publisher_domain.trim();
    if publisher_domain.is_empty() {
        return Err(CrossCheckError::EmptyPublisherDomain);
    }

    let mut variables = Vec::new();
    let mut records = Vec::new();
    for entry in entries {
        match entry {
            Entry::Variable(variable) => variables.push(variable.clone()),
            Entry::Record(record) => records.push(record.clone()),
        }
    }

    let declared = DeclaredDomains::from_entries(entries);
    let records = detect_duplicates(publisher_domain, records, cached_content);

    let mut ids_by_domain: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_valid) {
        ids_by_domain
            .entry(normalize_domain(&record.domain))
            .or_default()
            .insert(record.account_id.trim().to_string());
    }
    let domain_count = ids_by_domain.len();

    let seller_data: HashMap<String, DomainSellers> = ids_by_domain
        .into_par_iter()
        .map(|(domain, ids)| {
            let ids: Vec<String> = ids.into_iter().collect();
            let data = load_domain_sellers(&domain, &ids, access);
            (domain, data)
        })
        .collect();

    let ctx = ValidationContext {
        publisher_domain,
        declared: &declared,
    };
    let record_count = records.len();
    let validated: Vec<Record> = records
        .into_par_iter()
        .map(|record| validate_record(record, &seller_data, &ctx))
        .collect();

    info!(
        "Cross-checked {} record(s) across {} seller domain(s) for {} ({} access)",
        record_count,
        domain_count,
        publisher_domain,
        access.mode_name()
    );

    Ok(variables
        .into_iter()
        .map(Entry::Variable)
        .chain(validated.into_iter().map(Entry::Record))
        .collect())
}

fn load_domain_sellers(domain: &str, ids: &[String], access: SellerAccess<'_>) -> DomainSellers {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match access {
        SellerAccess::Batch(provider) => fetch_batch(provider, domain, ids),
        SellerAccess::Legacy(fetcher) => fetch_whole(fetcher, domain),
    }));

    match outcome {
        Ok(Ok(data)) => data,
        Ok(Err(e)) => {
            warn!("Failed to load sellers.json for {}: {}", domain, e);
            DomainSellers::failed(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(&*payload);
            warn!("Seller lookup for {} panicked: {}", domain, message);
            DomainSellers::failed(message)
        }
    }
}

fn fetch_batch(
    provider: &dyn SellersProvider,
    domain: &str,
    ids: &[String],
) -> Result<DomainSellers, SellersError> {
    if !provider.has_sellers_json(domain)? {
        debug!("{} has no sellers.json", domain);
        return Ok(DomainSellers::missing());
    }

    let batch = provider.batch_get_sellers(domain, ids)?;
    debug!(
        "{}: {}/{} seller id(s) found",
        domain, batch.found_count, batch.requested_count
    );

    let mut sellers = HashMap::with_capacity(batch.found_count);
    for result in batch.results {
        if let (true, Some(seller)) = (result.found, result.seller) {
            sellers.entry(result.seller_id.trim().to_string()).or_insert(seller);
        }
    }

    Ok(DomainSellers {
        has_seller_json: true,
        sellers,
        counts: SellerIdCounts::AssumedUnique,
        fetch_error: None,
    })
}

fn fetch_whole(fetcher: &dyn SellersFetcher, domain: &str) -> Result<DomainSellers, SellersError> {
    let Some(document) = fetcher.fetch(domain)? else {
        debug!("{} has no sellers.json", domain);
        return Ok(DomainSellers::missing());
    };

    let mut sellers = HashMap::with_capacity(document.sellers.len());
    let mut counts: HashMap<String, usize> = HashMap::with_capacity(document.sellers.len());
    for seller in document.sellers {
        let id = seller.lookup_id().to_string();
        *counts.entry(id.clone()).or_insert(0) += 1;
        sellers.entry(id).or_insert(seller);
    }
    debug!("{}: {} seller(s) indexed", domain, sellers.len());

    Ok(DomainSellers {
        has_seller_json: true,
        sellers,
        counts: SellerIdCounts::Exact(counts),
        fetch_error: None,
    })
}

type Evaluation = (ValidationResult, Vec<Warning>);

fn evaluate(record: &Record, lookup: SellerLookup<'_>, ctx: &ValidationContext<'_>) -> Evaluation {
    let result = validate_relationship(record, lookup, ctx);
    let warnings = synthesize_warnings(record, &result, ctx.publisher_domain);
    (result, warnings)
}

fn validate_record(
    record: Record,
    seller_data: &HashMap<String, DomainSellers>,
    ctx: &ValidationContext<'_>,
) -> Record {
    validate_record_with(record, seller_data, ctx, evaluate)
}

fn validate_record_with<F>(
    record: Record,
    seller_data: &HashMap<String, DomainSellers>,
    ctx: &ValidationContext<'_>,
    evaluate: F,
) -> Record
where
    F: Fn(&Record, SellerLookup<'_>, &ValidationContext<'_>) -> Evaluation,
{
    if !record.is_valid {
        return record;
    }
    let Some(domain_sellers) = seller_data.get(&normalize_domain(&record.domain)) else {
        return record;
    };

    if let Some(message) = &domain_sellers.fetch_error {
        let warning = validation_error(&record, message);
        return record.with_validation(ValidationResult::indeterminate(), vec![warning]);
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        evaluate(&record, domain_sellers.lookup(&record.account_id), ctx)
    }));

    match outcome {
        Ok((result, warnings)) => record.with_validation(result, warnings),
        Err(payload) => {
            let message = panic_message(&*payload);
            warn!("Validation of line {} panicked: {}", record.line_number, message);
            let warning = validation_error(&record, &message);
            record.with_validation(ValidationResult::indeterminate(), vec![warning])
        }
    }
}

fn validation_error(record: &Record, message: &str) -> Warning {
    Warning::new(ValidationKey::SellersJsonValidationError)
        .with_param("domain", &record.domain)
        .with_param("message", message)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
