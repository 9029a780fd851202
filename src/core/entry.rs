//! Typed ads.txt entries and the validation data attached to them
//!
//! Entries are produced once by the parser and then replaced, never mutated in
//! place, as they pass through duplicate detection and the sellers.json
//! cross-check. The `with_*` builders consume a record and hand back the
//! enriched value.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::sellers::model::Seller;

/// Relationship declared in the third ads.txt field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relationship {
    Direct,
    Reseller,
}

impl Relationship {
    /// Parse a relationship token, ignoring case and surrounding whitespace
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "DIRECT" => Some(Relationship::Direct),
            "RESELLER" => Some(Relationship::Reseller),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Direct => "DIRECT",
            Relationship::Reseller => "RESELLER",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized `KEY=value` variable names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariableType {
    Contact,
    Subdomain,
    InventoryPartnerDomain,
    OwnerDomain,
    ManagerDomain,
}

impl VariableType {
    pub const ALL: [VariableType; 5] = [
        VariableType::Contact,
        VariableType::Subdomain,
        VariableType::InventoryPartnerDomain,
        VariableType::OwnerDomain,
        VariableType::ManagerDomain,
    ];

    /// Case-insensitive lookup of a variable key
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|variable_type| variable_type.as_str().eq_ignore_ascii_case(key))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Contact => "CONTACT",
            VariableType::Subdomain => "SUBDOMAIN",
            VariableType::InventoryPartnerDomain => "INVENTORYPARTNERDOMAIN",
            VariableType::OwnerDomain => "OWNERDOMAIN",
            VariableType::ManagerDomain => "MANAGERDOMAIN",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable validation codes shared by parse errors and cross-check warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKey {
    MissingFields,
    InvalidFormat,
    InvalidRelationship,
    InvalidDomain,
    EmptyAccountId,
    InvalidCharacters,
    EmptyFile,
    ImplimentedEntry,
    NoSellersJson,
    DirectAccountIdNotInSellersJson,
    ResellerAccountIdNotInSellersJson,
    DomainMismatch,
    DirectNotPublisher,
    SellerIdNotUnique,
    ResellerNotIntermediary,
    SellersJsonValidationError,
}

impl ValidationKey {
    pub const ALL: [ValidationKey; 16] = [
        ValidationKey::MissingFields,
        ValidationKey::InvalidFormat,
        ValidationKey::InvalidRelationship,
        ValidationKey::InvalidDomain,
        ValidationKey::EmptyAccountId,
        ValidationKey::InvalidCharacters,
        ValidationKey::EmptyFile,
        ValidationKey::ImplimentedEntry,
        ValidationKey::NoSellersJson,
        ValidationKey::DirectAccountIdNotInSellersJson,
        ValidationKey::ResellerAccountIdNotInSellersJson,
        ValidationKey::DomainMismatch,
        ValidationKey::DirectNotPublisher,
        ValidationKey::SellerIdNotUnique,
        ValidationKey::ResellerNotIntermediary,
        ValidationKey::SellersJsonValidationError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKey::MissingFields => "missingFields",
            ValidationKey::InvalidFormat => "invalidFormat",
            ValidationKey::InvalidRelationship => "invalidRelationship",
            ValidationKey::InvalidDomain => "invalidDomain",
            ValidationKey::EmptyAccountId => "emptyAccountId",
            ValidationKey::InvalidCharacters => "invalidCharacters",
            ValidationKey::EmptyFile => "emptyFile",
            ValidationKey::ImplimentedEntry => "implimentedEntry",
            ValidationKey::NoSellersJson => "noSellersJson",
            ValidationKey::DirectAccountIdNotInSellersJson => "directAccountIdNotInSellersJson",
            ValidationKey::ResellerAccountIdNotInSellersJson => {
                "resellerAccountIdNotInSellersJson"
            }
            ValidationKey::DomainMismatch => "domainMismatch",
            ValidationKey::DirectNotPublisher => "directNotPublisher",
            ValidationKey::SellerIdNotUnique => "sellerIdNotUnique",
            ValidationKey::ResellerNotIntermediary => "resellerNotIntermediary",
            ValidationKey::SellersJsonValidationError => "sellersJsonValidationError",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            ValidationKey::MissingFields
            | ValidationKey::InvalidFormat
            | ValidationKey::InvalidRelationship
            | ValidationKey::InvalidDomain
            | ValidationKey::EmptyAccountId
            | ValidationKey::InvalidCharacters
            | ValidationKey::EmptyFile => Severity::Error,
            ValidationKey::ImplimentedEntry => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for ValidationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single warning with its message placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub key: ValidationKey,
    pub params: BTreeMap<String, String>,
    pub severity: Severity,
}

impl Warning {
    pub fn new(key: ValidationKey) -> Self {
        Self {
            key,
            params: BTreeMap::new(),
            severity: key.default_severity(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

/// Three-valued check outcome; `NotApplicable` is never a synonym for `No`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    Yes,
    No,
    NotApplicable,
}

impl TriState {
    pub fn from_bool(value: bool) -> Self {
        if value {
            TriState::Yes
        } else {
            TriState::No
        }
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            TriState::Yes => Some(true),
            TriState::No => Some(false),
            TriState::NotApplicable => None,
        }
    }

    pub fn is_no(self) -> bool {
        self == TriState::No
    }
}

impl Serialize for TriState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

/// Per-record outcome of the sellers.json cross-check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub has_seller_json: TriState,
    pub direct_account_id_in_sellers_json: TriState,
    pub direct_domain_matches_seller_json_entry: TriState,
    pub direct_entry_has_publisher_type: TriState,
    pub direct_seller_id_is_unique: TriState,
    pub reseller_account_id_in_sellers_json: TriState,
    pub reseller_domain_matches_seller_json_entry: TriState,
    pub reseller_entry_has_intermediary_type: TriState,
    pub reseller_seller_id_is_unique: TriState,
    pub seller_data: Option<Seller>,
}

impl ValidationResult {
    /// A result where every check is indeterminate
    pub fn indeterminate() -> Self {
        Self {
            has_seller_json: TriState::NotApplicable,
            direct_account_id_in_sellers_json: TriState::NotApplicable,
            direct_domain_matches_seller_json_entry: TriState::NotApplicable,
            direct_entry_has_publisher_type: TriState::NotApplicable,
            direct_seller_id_is_unique: TriState::NotApplicable,
            reseller_account_id_in_sellers_json: TriState::NotApplicable,
            reseller_domain_matches_seller_json_entry: TriState::NotApplicable,
            reseller_entry_has_intermediary_type: TriState::NotApplicable,
            reseller_seller_id_is_unique: TriState::NotApplicable,
            seller_data: None,
        }
    }
}

/// An ads.txt data line: `domain, account_id, relationship[, authority_id]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub domain: String,
    pub account_id: String,
    pub account_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification_authority_id: Option<String>,
    pub line_number: usize,
    pub raw_line: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_key: Option<ValidationKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub has_warning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ValidationKey>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub warning_params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_results: Option<ValidationResult>,
}

impl Record {
    /// Create a valid record with no warnings attached
    pub fn new(
        domain: impl Into<String>,
        account_id: impl Into<String>,
        account_type: impl Into<String>,
        relationship: Option<Relationship>,
        certification_authority_id: Option<String>,
        line_number: usize,
        raw_line: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            account_id: account_id.into(),
            account_type: account_type.into(),
            relationship,
            certification_authority_id,
            line_number,
            raw_line: raw_line.into(),
            is_valid: true,
            error: None,
            validation_key: None,
            severity: None,
            has_warning: false,
            warning: None,
            warning_params: BTreeMap::new(),
            all_warnings: Vec::new(),
            duplicate_domain: None,
            validation_results: None,
        }
    }

    /// Mark the record invalid with a structural error
    pub fn with_error(mut self, key: ValidationKey) -> Self {
        self.is_valid = false;
        self.error = Some(key.as_str().to_string());
        self.validation_key = Some(key);
        self.severity = Some(key.default_severity());
        self
    }

    /// Flag the record as already implemented in the cached ads.txt of `publisher_domain`
    pub fn with_duplicate(mut self, publisher_domain: &str) -> Self {
        self.push_warning(
            Warning::new(ValidationKey::ImplimentedEntry).with_param("domain", publisher_domain),
        );
        self.duplicate_domain = Some(publisher_domain.to_string());
        self
    }

    /// Attach a cross-check result and its warnings
    ///
    /// A warning already present (the duplicate flag) stays first; the legacy
    /// single-warning fields always mirror `all_warnings[0]`.
    pub fn with_validation(mut self, result: ValidationResult, warnings: Vec<Warning>) -> Self {
        self.validation_results = Some(result);
        for warning in warnings {
            self.push_warning(warning);
        }
        self
    }

    fn push_warning(&mut self, warning: Warning) {
        if self.all_warnings.is_empty() {
            self.warning = Some(warning.key);
            self.warning_params = warning.params.clone();
            self.validation_key = Some(warning.key);
            self.severity = Some(warning.severity);
        }
        self.has_warning = true;
        self.all_warnings.push(warning);
    }

    /// Identity used for duplicate detection and optimizer dedup:
    /// lowercased domain, case-sensitive account id, relationship.
    pub fn duplicate_key(&self) -> Option<String> {
        let relationship = self.relationship?;
        Some(format!(
            "{}|{}|{}",
            self.domain.trim().to_lowercase(),
            self.account_id.trim(),
            relationship
        ))
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate_domain.is_some()
    }
}

/// A `KEY=value` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub variable_type: VariableType,
    pub value: String,
    pub line_number: usize,
    pub raw_line: String,
    pub is_valid: bool,
}

impl Variable {
    pub fn new(
        variable_type: VariableType,
        value: impl Into<String>,
        line_number: usize,
        raw_line: impl Into<String>,
    ) -> Self {
        Self {
            variable_type,
            value: value.into(),
            line_number,
            raw_line: raw_line.into(),
            is_valid: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Record(Record),
    Variable(Variable),
}

impl Entry {
    pub fn is_record(&self) -> bool {
        matches!(self, Entry::Record(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Entry::Variable(_))
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Entry::Record(record) => Some(record),
            Entry::Variable(_) => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Entry::Variable(variable) => Some(variable),
            Entry::Record(_) => None,
        }
    }

    pub fn line_number(&self) -> usize {
        match self {
            Entry::Record(record) => record.line_number,
            Entry::Variable(variable) => variable.line_number,
        }
    }

    pub fn raw_line(&self) -> &str {
        match self {
            Entry::Record(record) => &record.raw_line,
            Entry::Variable(variable) => &variable.raw_line,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Entry::Record(record) => record.is_valid,
            Entry::Variable(variable) => variable.is_valid,
        }
    }
}

impl From<Record> for Entry {
    fn from(record: Record) -> Self {
        Entry::Record(record)
    }
}

impl From<Variable> for Entry {
    fn from(variable: Variable) -> Self {
        Entry::Variable(variable)
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Tagged<'a, T: Serialize> {
            #[serde(flatten)]
            entry: &'a T,
            is_variable: bool,
        }

        match self {
            Entry::Record(record) => Tagged {
                entry: record,
                is_variable: false,
            }
            .serialize(serializer),
            Entry::Variable(variable) => Tagged {
                entry: variable,
                is_variable: true,
            }
            .serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new(
            "example.com",
            "pub-1",
            "DIRECT",
            Some(Relationship::Direct),
            None,
            1,
            "example.com, pub-1, DIRECT",
        )
    }

    #[test]
    fn test_duplicate_key_normalizes_domain_only() {
        let mut upper = record();
        upper.domain = "EXAMPLE.com".to_string();
        assert_eq!(upper.duplicate_key(), record().duplicate_key());

        let mut other_id = record();
        other_id.account_id = "PUB-1".to_string();
        assert_ne!(other_id.duplicate_key(), record().duplicate_key());
    }

    #[test]
    fn test_duplicate_warning_stays_primary() {
        let result = ValidationResult::indeterminate();
        let flagged = record().with_duplicate("publisher.com").with_validation(
            result,
            vec![Warning::new(ValidationKey::DomainMismatch)],
        );

        assert!(flagged.has_warning);
        assert_eq!(flagged.warning, Some(ValidationKey::ImplimentedEntry));
        assert_eq!(flagged.severity, Some(Severity::Info));
        assert_eq!(flagged.all_warnings.len(), 2);
        assert_eq!(flagged.duplicate_domain.as_deref(), Some("publisher.com"));
        assert_eq!(flagged.domain, "example.com");
    }

    #[test]
    fn test_entry_serializes_type_tag_and_tristate() {
        let entry = Entry::from(record().with_validation(ValidationResult::indeterminate(), vec![]));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["is_variable"], serde_json::Value::Bool(false));
        assert!(json["validation_results"]["hasSellerJson"].is_null());

        let variable = Entry::from(Variable::new(
            VariableType::OwnerDomain,
            "example.com",
            2,
            "OWNERDOMAIN=example.com",
        ));
        let json = serde_json::to_value(&variable).unwrap();
        assert_eq!(json["is_variable"], serde_json::Value::Bool(true));
        assert_eq!(json["variable_type"], "OWNERDOMAIN");
    }

    #[test]
    fn test_validation_key_codes() {
        assert_eq!(ValidationKey::ImplimentedEntry.as_str(), "implimentedEntry");
        assert_eq!(
            serde_json::to_value(ValidationKey::NoSellersJson).unwrap(),
            "noSellersJson"
        );
        assert_eq!(ValidationKey::EmptyFile.default_severity(), Severity::Error);
    }
}
