//! File collection and duplicate detection

pub mod file_scanner;
pub mod duplicate_detector;

pub use file_scanner::{collect_ads_txt_files, collect_sellers_json_files};
pub use duplicate_detector::{detect_duplicates, find_duplicate_groups, DuplicateInfo};
