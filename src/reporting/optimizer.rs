//! Canonical, deduplicated rewrite of an ads.txt document

use log::debug;
use std::collections::{BTreeMap, HashSet};

use crate::core::entry::{Entry, Record, Relationship, Variable};
use crate::core::parser::parse_ads_txt_content;

/// Rewrite ads.txt content into its canonical form
///
/// Invalid lines and comments are dropped. Variables come first, grouped by
/// variable name in alphabetical order; records follow grouped by domain,
/// DIRECT before RESELLER, then by account id. Duplicates (same key as
/// duplicate detection) keep their first occurrence. Applying the function
/// to its own output returns the same text.
pub fn optimize_ads_txt(content: &str) -> String {
    let entries = parse_ads_txt_content(content);

    let mut variables: Vec<&Variable> = Vec::new();
    let mut seen_variables = HashSet::new();
    let mut records: Vec<&Record> = Vec::new();
    let mut seen_records = HashSet::new();
    let mut dropped = 0usize;

    for entry in &entries {
        match entry {
            Entry::Variable(variable) => {
                let key = (variable.variable_type, variable.value.to_lowercase());
                if seen_variables.insert(key) {
                    variables.push(variable);
                }
            }
            Entry::Record(record) if record.is_valid => match record.duplicate_key() {
                Some(key) => {
                    if seen_records.insert(key) {
                        records.push(record);
                    } else {
                        dropped += 1;
                    }
                }
                None => dropped += 1,
            },
            Entry::Record(_) => dropped += 1,
        }
    }
    debug!("Optimizer dropped {} invalid or duplicate record(s)", dropped);

    variables.sort_by(|a, b| a.variable_type.as_str().cmp(b.variable_type.as_str()));
    records.sort_by(|a, b| {
        record_domain(a)
            .cmp(&record_domain(b))
            .then_with(|| relationship_rank(a).cmp(&relationship_rank(b)))
            .then_with(|| a.account_id.trim().cmp(b.account_id.trim()))
    });

    let mut sections: Vec<String> = Vec::new();

    if !variables.is_empty() {
        let mut section = String::from("# Variables\n");
        for variable in &variables {
            section.push_str(&format!("{}={}\n", variable.variable_type, variable.value));
        }
        sections.push(section);
    }

    let mut by_domain: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
    for record in records {
        by_domain.entry(record_domain(record)).or_default().push(record);
    }
    for (domain, group) in by_domain {
        let mut section = format!("# {}\n", domain);
        for record in group {
            section.push_str(&format_record(record));
            section.push('\n');
        }
        sections.push(section);
    }

    sections.join("\n")
}

fn record_domain(record: &Record) -> String {
    record.domain.trim().to_lowercase()
}

fn relationship_rank(record: &Record) -> u8 {
    match record.relationship {
        Some(Relationship::Direct) => 0,
        Some(Relationship::Reseller) => 1,
        None => 2,
    }
}

fn format_record(record: &Record) -> String {
    let relationship = record
        .relationship
        .map(|r| r.as_str())
        .unwrap_or(record.account_type.as_str());
    let mut line = format!(
        "{}, {}, {}",
        record_domain(record),
        record.account_id.trim(),
        relationship
    );
    if let Some(authority_id) = &record.certification_authority_id {
        line.push_str(", ");
        line.push_str(authority_id);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSY: &str = "\
# publisher ads.txt
OWNERDOMAIN=publisher.com
openx.com, 541058490, RESELLER, 6a698e2ec38604c6
google.com, pub-2, reseller
Google.com, pub-1, DIRECT, f08c47fec0942fa0
CONTACT=ads@publisher.com
google.com, pub-1, DIRECT # again
broken line
google.com, pub-1, RESELLER
";

    #[test]
    fn test_sorted_grouped_deduplicated() {
        let optimized = optimize_ads_txt(MESSY);
        let expected = "\
# Variables
CONTACT=ads@publisher.com
OWNERDOMAIN=publisher.com

# google.com
google.com, pub-1, DIRECT, f08c47fec0942fa0
google.com, pub-1, RESELLER
google.com, pub-2, RESELLER

# openx.com
openx.com, 541058490, RESELLER, 6a698e2ec38604c6
";
        assert_eq!(optimized, expected);
    }

    #[test]
    fn test_output_is_fixed_point() {
        let once = optimize_ads_txt(MESSY);
        let twice = optimize_ads_txt(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(optimize_ads_txt(""), "");
        assert_eq!(optimize_ads_txt("# only comments\n"), "");
    }
}
