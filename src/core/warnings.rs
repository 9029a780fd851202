//! Turning a relationship check into an ordered warning list

use super::entry::{Record, Relationship, ValidationKey, ValidationResult, Warning};
use crate::sellers::model::SellerType;

const UNKNOWN_SELLER_TYPE: &str = "unknown";

/// Build the warnings for one cross-checked record
///
/// A missing sellers.json or an account id absent from it ends the list
/// immediately. Otherwise the remaining checks accumulate in a fixed order:
/// domain mismatch, not-publisher, seller id not unique, not-intermediary.
/// Only checks that are explicitly `No` produce a warning.
pub fn synthesize_warnings(
    record: &Record,
    result: &ValidationResult,
    publisher_domain: &str,
) -> Vec<Warning> {
    if result.has_seller_json.is_no() {
        return vec![Warning::new(ValidationKey::NoSellersJson).with_param("domain", &record.domain)];
    }

    let Some(relationship) = record.relationship else {
        return Vec::new();
    };

    let (account_found, account_missing_key) = match relationship {
        Relationship::Direct => (
            result.direct_account_id_in_sellers_json,
            ValidationKey::DirectAccountIdNotInSellersJson,
        ),
        Relationship::Reseller => (
            result.reseller_account_id_in_sellers_json,
            ValidationKey::ResellerAccountIdNotInSellersJson,
        ),
    };
    if account_found.is_no() {
        return vec![account_warning(account_missing_key, record)];
    }

    let seller = result.seller_data.as_ref();
    let seller_type = seller
        .and_then(|s| s.seller_type.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_SELLER_TYPE);
    let seller_domain = seller.and_then(|s| s.domain()).unwrap_or_default();

    let mut warnings = Vec::new();

    let domain_mismatch = match relationship {
        Relationship::Direct => result.direct_domain_matches_seller_json_entry.is_no(),
        Relationship::Reseller => {
            // intermediaries legitimately carry their own domain
            let acts_as_intermediary = matches!(
                seller.and_then(|s| s.parsed_type()),
                Some(SellerType::Intermediary | SellerType::Both)
            );
            result.reseller_domain_matches_seller_json_entry.is_no() && !acts_as_intermediary
        }
    };
    if domain_mismatch {
        warnings.push(
            account_warning(ValidationKey::DomainMismatch, record)
                .with_param("seller_domain", seller_domain)
                .with_param("publisher_domain", publisher_domain),
        );
    }

    if relationship == Relationship::Direct && result.direct_entry_has_publisher_type.is_no() {
        warnings.push(
            account_warning(ValidationKey::DirectNotPublisher, record)
                .with_param("seller_type", seller_type),
        );
    }

    let not_unique = match relationship {
        Relationship::Direct => result.direct_seller_id_is_unique.is_no(),
        Relationship::Reseller => result.reseller_seller_id_is_unique.is_no(),
    };
    if not_unique {
        warnings.push(account_warning(ValidationKey::SellerIdNotUnique, record));
    }

    if relationship == Relationship::Reseller && result.reseller_entry_has_intermediary_type.is_no() {
        warnings.push(
            account_warning(ValidationKey::ResellerNotIntermediary, record)
                .with_param("seller_type", seller_type),
        );
    }

    warnings
}

fn account_warning(key: ValidationKey, record: &Record) -> Warning {
    Warning::new(key)
        .with_param("domain", &record.domain)
        .with_param("account_id", &record.account_id)
}
