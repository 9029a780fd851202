//! Integration tests for the sellers.json cross-check
//!
//! Covers both seller access modes, duplicate detection against cached
//! content, and the warning rules end to end.

use ads_txt_validator_rs::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Batch provider over in-memory seller lists, counting calls
#[derive(Default)]
struct MockProvider {
    sellers: HashMap<String, Vec<Seller>>,
    has_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl MockProvider {
    fn with(mut self, domain: &str, sellers: Vec<Seller>) -> Self {
        self.sellers.insert(domain.to_string(), sellers);
        self
    }

    fn document(&self, domain: &str) -> Option<SellersJson> {
        self.sellers.get(domain).map(|sellers| SellersJson {
            sellers: sellers.clone(),
            ..SellersJson::default()
        })
    }
}

impl SellersProvider for MockProvider {
    fn has_sellers_json(&self, domain: &str) -> Result<bool, SellersError> {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sellers.contains_key(domain))
    }

    fn batch_get_sellers(
        &self,
        domain: &str,
        seller_ids: &[String],
    ) -> Result<BatchSellersResult, SellersError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let sellers = self.sellers.get(domain).cloned().unwrap_or_default();
        let results: Vec<SellerResult> = seller_ids
            .iter()
            .map(|id| {
                let seller = sellers.iter().find(|s| s.seller_id.trim() == id.trim()).cloned();
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
            metadata: SellersMetadata::default(),
        })
    }
}

impl SellersFetcher for MockProvider {
    fn fetch(&self, domain: &str) -> Result<Option<SellersJson>, SellersError> {
        Ok(self.document(domain))
    }
}

fn publisher_seller(id: &str, domain: &str) -> Seller {
    Seller::new(id).with_domain(domain).with_seller_type("PUBLISHER")
}

fn find_record<'a>(entries: &'a [Entry], line: usize) -> &'a Record {
    entries
        .iter()
        .filter_map(Entry::as_record)
        .find(|r| r.line_number == line)
        .unwrap_or_else(|| panic!("no record on line {}", line))
}

fn warning_keys(record: &Record) -> Vec<ValidationKey> {
    record.all_warnings.iter().map(|w| w.key).collect()
}

/// Scenario: no sellers.json for the advertising system
#[test]
fn test_reseller_without_sellers_json() {
    let provider = MockProvider::default();
    let entries = validate_ads_txt(
        "openx.com, 541058490, RESELLER, 6a698e2ec38604c6",
        Some("publisher.com"),
        None,
        SellerAccess::Batch(&provider),
    );

    let record = find_record(&entries, 1);
    assert!(record.is_valid);
    assert!(record.has_warning);
    assert_eq!(record.warning.map(|k| k.as_str()), Some("noSellersJson"));
    assert_eq!(warning_keys(record), vec![ValidationKey::NoSellersJson]);
    let result = record.validation_results.as_ref().unwrap();
    assert_eq!(result.has_seller_json, TriState::No);
    assert_eq!(result.reseller_account_id_in_sellers_json, TriState::NotApplicable);
    assert_eq!(result.reseller_seller_id_is_unique, TriState::NotApplicable);
    assert_eq!(result.direct_account_id_in_sellers_json, TriState::NotApplicable);
    // no batch lookup once the domain is known to lack a sellers.json
    assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 0);
}

/// Scenario: entries already present in the cached ads.txt
#[test]
fn test_entries_already_in_cached_ads_txt() {
    let provider = MockProvider::default()
        .with("example.com", vec![publisher_seller("pub-1", "publisher.com")])
        .with("google.com", vec![publisher_seller("pub-2", "publisher.com")]);
    let content = "example.com, pub-1, DIRECT\ngoogle.com, pub-2, DIRECT";

    let entries = validate_ads_txt(
        content,
        Some("publisher.com"),
        Some(content),
        SellerAccess::Batch(&provider),
    );

    for line in [1, 2] {
        let record = find_record(&entries, line);
        assert_eq!(record.validation_key.map(|k| k.as_str()), Some("implimentedEntry"));
        assert_eq!(record.severity.map(|s| s.as_str()), Some("info"));
        assert_eq!(record.duplicate_domain.as_deref(), Some("publisher.com"));
        assert!(record.is_valid);
        assert_eq!(warning_keys(record), vec![ValidationKey::ImplimentedEntry]);
    }
    assert_eq!(find_record(&entries, 1).domain, "example.com");
}

/// Scenario: confidential seller never produces a domain mismatch
#[test]
fn test_confidential_seller_domain_is_indeterminate() {
    let provider = MockProvider::default().with(
        "google.com",
        vec![publisher_seller("pub-1", "somewhere-else.com").confidential()],
    );

    let entries = validate_ads_txt(
        "google.com, pub-1, DIRECT",
        Some("publisher.com"),
        None,
        SellerAccess::Batch(&provider),
    );

    let record = find_record(&entries, 1);
    let result = record.validation_results.as_ref().unwrap();
    assert_eq!(result.direct_domain_matches_seller_json_entry, TriState::NotApplicable);
    assert!(!warning_keys(record).contains(&ValidationKey::DomainMismatch));
}

/// Scenario: misspelled relationship
#[test]
fn test_misspelled_relationship_stays_invalid() {
    let provider = MockProvider::default();
    let entries = validate_ads_txt(
        "example.com, pub-1, RESELLE, abc123",
        Some("publisher.com"),
        None,
        SellerAccess::Batch(&provider),
    );

    let record = find_record(&entries, 1);
    assert!(!record.is_valid);
    assert_eq!(record.validation_key.map(|k| k.as_str()), Some("invalidRelationship"));
    assert!(record.validation_results.is_none());
}

/// Scenario: empty file
#[test]
fn test_empty_file() {
    let provider = MockProvider::default();
    let entries = validate_ads_txt("", Some("publisher.com"), None, SellerAccess::Batch(&provider));

    assert_eq!(entries.len(), 1);
    let record = entries[0].as_record().unwrap();
    assert_eq!(record.validation_key.map(|k| k.as_str()), Some("emptyFile"));
    assert!(!record.is_valid);
}

#[test]
fn test_domain_mismatch_against_declared_owner() {
    let provider = MockProvider::default().with(
        "google.com",
        vec![
            publisher_seller("pub-1", "publisher.com"),
            publisher_seller("pub-2", "owner.com"),
        ],
    );
    let content = "OWNERDOMAIN=owner.com\ngoogle.com, pub-1, DIRECT\ngoogle.com, pub-2, DIRECT";

    let entries = validate_ads_txt(content, Some("publisher.com"), None, SellerAccess::Batch(&provider));

    // the publisher domain no longer counts once OWNERDOMAIN is declared
    let mismatched = find_record(&entries, 2);
    assert_eq!(
        mismatched
            .validation_results
            .as_ref()
            .unwrap()
            .direct_domain_matches_seller_json_entry,
        TriState::No
    );
    assert_eq!(warning_keys(mismatched), vec![ValidationKey::DomainMismatch]);
    assert_eq!(
        mismatched.warning_params.get("seller_domain").map(String::as_str),
        Some("publisher.com")
    );

    let matched = find_record(&entries, 3);
    assert!(!matched.has_warning);
}

#[test]
fn test_domain_mismatch_against_publisher_domain() {
    let provider = MockProvider::default()
        .with("google.com", vec![publisher_seller("pub-1", "other.com")]);

    let entries = validate_ads_txt(
        "google.com, pub-1, DIRECT",
        Some("publisher.com"),
        None,
        SellerAccess::Batch(&provider),
    );

    let record = find_record(&entries, 1);
    assert_eq!(warning_keys(record), vec![ValidationKey::DomainMismatch]);
}

#[test]
fn test_missing_account_ids() {
    let provider = MockProvider::default()
        .with("google.com", vec![publisher_seller("pub-1", "publisher.com")]);

    let entries = validate_ads_txt(
        "google.com, pub-9, DIRECT\ngoogle.com, pub-8, RESELLER",
        Some("publisher.com"),
        None,
        SellerAccess::Batch(&provider),
    );

    assert_eq!(
        warning_keys(find_record(&entries, 1)),
        vec![ValidationKey::DirectAccountIdNotInSellersJson]
    );
    assert_eq!(
        warning_keys(find_record(&entries, 2)),
        vec![ValidationKey::ResellerAccountIdNotInSellersJson]
    );
}

#[test]
fn test_batch_calls_once_per_distinct_domain() {
    let provider = MockProvider::default()
        .with("google.com", vec![publisher_seller("1", "publisher.com")])
        .with("openx.com", vec![]);
    let content = "google.com, 1, DIRECT\nGOOGLE.com, 2, DIRECT\ngoogle.com, 1, RESELLER\nopenx.com, 3, RESELLER\nappnexus.com, 4, DIRECT";

    validate_ads_txt(content, Some("publisher.com"), None, SellerAccess::Batch(&provider));

    assert_eq!(provider.has_calls.load(Ordering::SeqCst), 3);
    assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_batch_and_legacy_agree_on_unique_sellers() {
    let provider = MockProvider::default().with(
        "google.com",
        vec![
            publisher_seller("pub-1", "publisher.com"),
            Seller::new("res-1").with_domain("reseller.com").with_seller_type("INTERMEDIARY"),
        ],
    );
    let content = "google.com, pub-1, DIRECT\ngoogle.com, res-1, RESELLER\ngoogle.com, nope, DIRECT";

    let batch = validate_ads_txt(content, Some("publisher.com"), None, SellerAccess::Batch(&provider));
    let legacy = validate_ads_txt(content, Some("publisher.com"), None, SellerAccess::Legacy(&provider));

    assert_eq!(batch, legacy);
}

#[test]
fn test_batch_mode_cannot_see_repeated_seller_ids() {
    let seller = publisher_seller("pub-1", "publisher.com");
    let provider = MockProvider::default().with("google.com", vec![seller.clone(), seller]);

    let batch = validate_ads_txt(
        "google.com, pub-1, DIRECT",
        Some("publisher.com"),
        None,
        SellerAccess::Batch(&provider),
    );
    let legacy = validate_ads_txt(
        "google.com, pub-1, DIRECT",
        Some("publisher.com"),
        None,
        SellerAccess::Legacy(&provider),
    );

    let batch_result = find_record(&batch, 1).validation_results.clone().unwrap();
    let legacy_result = find_record(&legacy, 1).validation_results.clone().unwrap();
    assert_eq!(batch_result.direct_seller_id_is_unique, TriState::Yes);
    assert_eq!(legacy_result.direct_seller_id_is_unique, TriState::No);
    assert_eq!(
        warning_keys(find_record(&legacy, 1)),
        vec![ValidationKey::SellerIdNotUnique]
    );
}

#[test]
fn test_legacy_reseller_with_repeated_seller_id() {
    let intermediary = Seller::new("res-1")
        .with_domain("exchange.com")
        .with_seller_type("INTERMEDIARY");
    let publisher = Seller::new("res-2")
        .with_domain("other.com")
        .with_seller_type("PUBLISHER");
    let provider = MockProvider::default().with(
        "google.com",
        vec![intermediary.clone(), intermediary, publisher.clone(), publisher],
    );

    let entries = validate_ads_txt(
        "google.com, res-1, RESELLER\ngoogle.com, res-2, RESELLER",
        Some("publisher.com"),
        None,
        SellerAccess::Legacy(&provider),
    );

    let exempt = find_record(&entries, 1);
    assert_eq!(
        exempt.validation_results.as_ref().unwrap().reseller_seller_id_is_unique,
        TriState::No
    );
    assert_eq!(warning_keys(exempt), vec![ValidationKey::SellerIdNotUnique]);

    assert_eq!(
        warning_keys(find_record(&entries, 2)),
        vec![
            ValidationKey::DomainMismatch,
            ValidationKey::SellerIdNotUnique,
            ValidationKey::ResellerNotIntermediary,
        ]
    );
}

#[test]
fn test_cross_check_puts_variables_first() {
    let provider = MockProvider::default();
    let entries = parse_ads_txt_content(
        "google.com, 1, DIRECT\nCONTACT=ads@publisher.com\nopenx.com, 2, RESELLER\nSUBDOMAIN=news.publisher.com",
    );

    let checked = cross_check(Some("publisher.com"), &entries, None, SellerAccess::Batch(&provider));

    assert_eq!(checked.len(), 4);
    assert!(checked[0].is_variable());
    assert!(checked[1].is_variable());
    assert_eq!(checked[2].line_number(), 1);
    assert_eq!(checked[3].line_number(), 3);
}

#[test]
fn test_duplicate_flag_kept_ahead_of_seller_warnings() {
    let provider = MockProvider::default();
    let entries = validate_ads_txt(
        "openx.com, 541058490, RESELLER",
        Some("publisher.com"),
        Some("openx.com, 541058490, RESELLER"),
        SellerAccess::Batch(&provider),
    );

    let record = find_record(&entries, 1);
    assert_eq!(record.warning, Some(ValidationKey::ImplimentedEntry));
    assert_eq!(
        warning_keys(record),
        vec![ValidationKey::ImplimentedEntry, ValidationKey::NoSellersJson]
    );
}
