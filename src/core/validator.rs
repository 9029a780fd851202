//! DIRECT/RESELLER relationship checks against a matched sellers.json entry

use super::domain::{domains_match, normalize_domain};
use super::entry::{Entry, Record, Relationship, TriState, ValidationResult, VariableType};
use crate::sellers::model::{Seller, SellerType};

/// OWNERDOMAIN and MANAGERDOMAIN values declared by the publisher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredDomains {
    pub owner_domains: Vec<String>,
    pub manager_domains: Vec<String>,
}

impl DeclaredDomains {
    pub fn new(owner_domains: Vec<String>, manager_domains: Vec<String>) -> Self {
        Self {
            owner_domains: owner_domains.iter().map(|d| normalize_domain(d)).collect(),
            manager_domains: manager_domains.iter().map(|d| normalize_domain(d)).collect(),
        }
    }

    /// Collect declarations from parsed variables
    ///
    /// A MANAGERDOMAIN value may carry a country code after a comma; only the
    /// domain part is kept.
    pub fn from_entries(entries: &[Entry]) -> Self {
        let mut owner_domains = Vec::new();
        let mut manager_domains = Vec::new();

        for variable in entries.iter().filter_map(Entry::as_variable) {
            match variable.variable_type {
                VariableType::OwnerDomain => owner_domains.push(normalize_domain(&variable.value)),
                VariableType::ManagerDomain => {
                    let domain = variable.value.split(',').next().unwrap_or_default();
                    manager_domains.push(normalize_domain(domain));
                }
                _ => {}
            }
        }

        owner_domains.retain(|d| !d.is_empty());
        manager_domains.retain(|d| !d.is_empty());
        Self {
            owner_domains,
            manager_domains,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owner_domains.is_empty() && self.manager_domains.is_empty()
    }

    fn contains(&self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        self.owner_domains
            .iter()
            .chain(self.manager_domains.iter())
            .any(|declared| *declared == domain)
    }
}

/// Publisher-level inputs shared by every record of one cross-check
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub publisher_domain: &'a str,
    pub declared: &'a DeclaredDomains,
}

/// What the seller data said about one record's account id
#[derive(Debug, Clone, Copy)]
pub struct SellerLookup<'a> {
    pub has_seller_json: bool,
    pub seller: Option<&'a Seller>,
    /// Occurrences of the id in the domain's seller set, when known
    pub occurrences: Option<usize>,
}

/// Compute the relationship checks for one record
///
/// Fields belonging to the other relationship are always `NotApplicable`.
/// Checks that depend on a matched seller are `NotApplicable` when none was
/// found.
pub fn validate_relationship(
    record: &Record,
    lookup: SellerLookup<'_>,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let mut result = ValidationResult::indeterminate();
    result.has_seller_json = TriState::from_bool(lookup.has_seller_json);
    result.seller_data = lookup.seller.cloned();
    if !lookup.has_seller_json {
        return result;
    }

    let Some(relationship) = record.relationship else {
        return result;
    };

    let account_found = TriState::from_bool(lookup.seller.is_some());
    let domain_match = match lookup.seller {
        Some(seller) => seller_domain_matches(seller, ctx),
        None => TriState::NotApplicable,
    };
    let unique = match (lookup.seller, lookup.occurrences) {
        (Some(_), Some(count)) => TriState::from_bool(count == 1),
        _ => TriState::NotApplicable,
    };

    match relationship {
        Relationship::Direct => {
            result.direct_account_id_in_sellers_json = account_found;
            result.direct_domain_matches_seller_json_entry = domain_match;
            result.direct_entry_has_publisher_type = match lookup.seller {
                Some(seller) => TriState::from_bool(matches!(
                    seller.parsed_type(),
                    Some(SellerType::Publisher | SellerType::Both)
                )),
                None => TriState::NotApplicable,
            };
            result.direct_seller_id_is_unique = unique;

            result.reseller_account_id_in_sellers_json = TriState::NotApplicable;
            result.reseller_domain_matches_seller_json_entry = TriState::NotApplicable;
            result.reseller_entry_has_intermediary_type = TriState::NotApplicable;
            result.reseller_seller_id_is_unique = TriState::NotApplicable;
        }
        Relationship::Reseller => {
            result.reseller_account_id_in_sellers_json = account_found;
            result.reseller_domain_matches_seller_json_entry = domain_match;
            result.reseller_entry_has_intermediary_type = match lookup.seller {
                Some(seller) => TriState::from_bool(matches!(
                    seller.parsed_type(),
                    Some(SellerType::Intermediary | SellerType::Both)
                )),
                None => TriState::NotApplicable,
            };
            result.reseller_seller_id_is_unique = unique;

            result.direct_account_id_in_sellers_json = TriState::NotApplicable;
            result.direct_domain_matches_seller_json_entry = TriState::NotApplicable;
            result.direct_entry_has_publisher_type = TriState::NotApplicable;
            result.direct_seller_id_is_unique = TriState::NotApplicable;
        }
    }

    result
}

/// Confidential sellers and sellers without a domain are indeterminate.
fn seller_domain_matches(seller: &Seller, ctx: &ValidationContext<'_>) -> TriState {
    if seller.is_confidential() {
        return TriState::NotApplicable;
    }
    let Some(seller_domain) = seller.domain() else {
        return TriState::NotApplicable;
    };

    if ctx.declared.is_empty() {
        TriState::from_bool(domains_match(seller_domain, ctx.publisher_domain))
    } else {
        TriState::from_bool(ctx.declared.contains(seller_domain))
    }
}
