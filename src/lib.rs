//! ads.txt Validator Library
//!
//! Parses ads.txt files and cross-checks their records against sellers.json
//! data, with duplicate detection against a previously published copy.

pub mod core;
pub mod reporting;
pub mod scanner;
pub mod sellers;

pub use crate::core::cross_check;
pub use crate::reporting::report_writer;
pub use crate::scanner::duplicate_detector;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::core::cross_check::{cross_check, validate_ads_txt};
    pub use crate::core::entry::{
        Entry, Record, Relationship, Severity, TriState, ValidationKey, ValidationResult,
        Variable, VariableType, Warning,
    };
    pub use crate::core::parser::{parse_ads_txt_content, parse_ads_txt_line};
    pub use crate::reporting::messages::{Locale, MessageProvider};
    pub use crate::reporting::optimizer::optimize_ads_txt;
    pub use crate::reporting::report_writer::{write_json_report, write_report, FileReport};
    pub use crate::scanner::duplicate_detector::{detect_duplicates, find_duplicate_groups, DuplicateInfo};
    pub use crate::scanner::file_scanner::collect_ads_txt_files;
    pub use crate::sellers::{
        BatchSellersResult, LocalSellersDirectory, Seller, SellerAccess, SellerResult,
        SellersError, SellersFetcher, SellersJson, SellersMetadata, SellersProvider,
    };
}
