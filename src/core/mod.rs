//! Parsing and sellers.json cross-check logic

pub mod cross_check;
pub mod domain;
pub mod entry;
pub mod parser;
pub mod validator;
pub mod warnings;

pub use cross_check::{cross_check, validate_ads_txt, CrossCheckError};
pub use entry::{
    Entry, Record, Relationship, Severity, TriState, ValidationKey, ValidationResult, Variable,
    VariableType, Warning,
};
pub use parser::{parse_ads_txt_content, parse_ads_txt_line};
