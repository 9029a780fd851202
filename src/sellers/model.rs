//! sellers.json data model

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `seller_type` values defined for sellers.json
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellerType {
    Publisher,
    Intermediary,
    Both,
}

impl SellerType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PUBLISHER" => Some(SellerType::Publisher),
            "INTERMEDIARY" => Some(SellerType::Intermediary),
            "BOTH" => Some(SellerType::Both),
            _ => None,
        }
    }
}

/// One entry of the `sellers` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    #[serde(deserialize_with = "deserialize_seller_id")]
    pub seller_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_confidential: Option<u8>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_passthrough: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Seller {
    pub fn new(seller_id: impl Into<String>) -> Self {
        Self {
            seller_id: seller_id.into(),
            name: None,
            domain: None,
            seller_type: None,
            is_confidential: None,
            is_passthrough: None,
            comment: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_seller_type(mut self, seller_type: impl Into<String>) -> Self {
        self.seller_type = Some(seller_type.into());
        self
    }

    pub fn confidential(mut self) -> Self {
        self.is_confidential = Some(1);
        self
    }

    pub fn is_confidential(&self) -> bool {
        self.is_confidential == Some(1)
    }

    pub fn parsed_type(&self) -> Option<SellerType> {
        self.seller_type.as_deref().and_then(SellerType::parse)
    }

    /// Seller domain, if present and non-blank
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    /// Key used for id lookups: the trimmed seller id
    pub fn lookup_id(&self) -> &str {
        self.seller_id.trim()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellersJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<Value>,
    #[serde(default)]
    pub sellers: Vec<Seller>,
}

impl SellersJson {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Per-id outcome of a batch lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerResult {
    pub seller_id: String,
    pub seller: Option<Seller>,
    pub found: bool,
}

/// File-level metadata reported alongside a batch lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SellersMetadata {
    pub contact_email: Option<String>,
    pub contact_address: Option<String>,
    pub version: Option<String>,
    pub seller_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSellersResult {
    pub domain: String,
    pub requested_count: usize,
    pub found_count: usize,
    pub results: Vec<SellerResult>,
    pub metadata: SellersMetadata,
}

// Seller ids are strings by spec, but numeric ids are common in the wild.
fn deserialize_seller_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(de::Error::custom(format!(
            "seller_id must be a string or number, got {}",
            other
        ))),
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(u8::from(flag))),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(0) => Ok(Some(0)),
            Some(1) => Ok(Some(1)),
            _ => Err(de::Error::custom(format!("expected 0 or 1, got {}", n))),
        },
        Some(Value::String(s)) => match s.trim() {
            "0" | "false" => Ok(Some(0)),
            "1" | "true" => Ok(Some(1)),
            _ => Err(de::Error::custom(format!("expected 0 or 1, got {:?}", s))),
        },
        Some(other) => Err(de::Error::custom(format!("expected 0 or 1, got {}", other))),
    }
}
