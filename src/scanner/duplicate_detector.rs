//! Duplicate ads.txt record detection
//!
//! Records are identified by `lowercase(domain) | account_id | relationship`.

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::core::entry::{Entry, Record};
use crate::core::parser::parse_ads_txt_content;

/// A group of records in one document sharing the same identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateInfo {
    pub key: String,
    pub line_numbers: Vec<usize>,
}

/// Flag records already present in a previously cached ads.txt
///
/// # Arguments
/// * `publisher_domain` - Domain whose cached ads.txt is being compared against
/// * `records` - Newly submitted records
/// * `cached_content` - Raw text of the cached ads.txt, if any
///
/// # Returns
/// The records in their original order. Valid records found in the cached
/// content carry an INFO `implimentedEntry` warning and `duplicate_domain`;
/// everything else is returned unchanged.
pub fn detect_duplicates(
    publisher_domain: &str,
    records: Vec<Record>,
    cached_content: Option<&str>,
) -> Vec<Record> {
    let cached_content = match cached_content {
        Some(content) if !content.trim().is_empty() => content,
        _ => return records,
    };

    let cached_keys = build_cached_keys(cached_content);
    if cached_keys.is_empty() {
        debug!("Cached ads.txt for {} has no valid records", publisher_domain);
        return records;
    }

    let mut flagged = 0usize;
    let records = records
        .into_iter()
        .map(|record| {
            if !record.is_valid {
                return record;
            }
            match record.duplicate_key() {
                Some(key) if cached_keys.contains(&key) => {
                    flagged += 1;
                    record.with_duplicate(publisher_domain)
                }
                _ => record,
            }
        })
        .collect();

    debug!(
        "{} record(s) already implemented in cached ads.txt of {}",
        flagged, publisher_domain
    );
    records
}

fn build_cached_keys(cached_content: &str) -> HashSet<String> {
    parse_ads_txt_content(cached_content)
        .iter()
        .filter_map(Entry::as_record)
        .filter(|record| record.is_valid)
        .filter_map(Record::duplicate_key)
        .collect()
}

/// Find records repeated within a single document
///
/// # Returns
/// Groups of line numbers sharing a key, ordered by first occurrence
pub fn find_duplicate_groups(entries: &[Entry]) -> Vec<DuplicateInfo> {
    let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();

    for record in entries.iter().filter_map(Entry::as_record) {
        if !record.is_valid {
            continue;
        }
        if let Some(key) = record.duplicate_key() {
            by_key.entry(key).or_default().push(record.line_number);
        }
    }

    let mut duplicates: Vec<DuplicateInfo> = by_key
        .into_iter()
        .filter(|(_, lines)| lines.len() > 1)
        .map(|(key, line_numbers)| DuplicateInfo { key, line_numbers })
        .collect();

    duplicates.sort_by_key(|dup| dup.line_numbers[0]);
    duplicates
}
