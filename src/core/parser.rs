//! ads.txt line and content parsing
//!
//! Each non-blank, non-comment line becomes either a [`Record`] or a
//! [`Variable`]. Structural problems never abort parsing; they produce an
//! invalid record carrying an error-severity validation key.

use log::debug;

use super::domain::is_valid_domain;
use super::entry::{Entry, Record, Relationship, ValidationKey, Variable, VariableType};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parse a single ads.txt line
///
/// # Arguments
/// * `line` - Raw line text, without its line terminator
/// * `line_number` - 1-based line number in the source document
///
/// # Returns
/// `None` for blank lines and comment-only lines, otherwise the parsed entry
pub fn parse_ads_txt_line(line: &str, line_number: usize) -> Option<Entry> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let content = match trimmed.split_once('#') {
        Some((before, _comment)) => before.trim(),
        None => trimmed,
    };
    if content.is_empty() {
        return None;
    }

    if content.chars().any(|c| c.is_control() && c != '\t') {
        return Some(invalid(content, line_number, line, ValidationKey::InvalidCharacters));
    }

    if let Some(variable) = parse_variable(content, line_number, line) {
        return Some(variable.into());
    }

    let fields: Vec<&str> = content.split(',').map(str::trim).collect();
    if fields.len() < 3 {
        let key = if content.contains(',') {
            ValidationKey::MissingFields
        } else {
            ValidationKey::InvalidFormat
        };
        return Some(invalid(content, line_number, line, key));
    }

    let domain = fields[0];
    let account_id = fields[1];
    let account_type = fields[2];

    // A non-standard account type may precede the relationship in field four.
    let (relationship, authority_id) = match Relationship::parse(account_type) {
        Some(relationship) => (Some(relationship), fields.get(3)),
        None => match fields.get(3).and_then(|field| Relationship::parse(field)) {
            Some(relationship) => (Some(relationship), fields.get(4)),
            None => (None, fields.get(3)),
        },
    };

    let record = Record::new(
        domain,
        account_id,
        account_type,
        relationship,
        authority_id
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string()),
        line_number,
        line,
    );

    let record = if relationship.is_none() {
        record.with_error(ValidationKey::InvalidRelationship)
    } else if account_id.is_empty() {
        record.with_error(ValidationKey::EmptyAccountId)
    } else if !is_valid_domain(domain) {
        record.with_error(ValidationKey::InvalidDomain)
    } else {
        record
    };

    Some(record.into())
}

/// Parse a whole ads.txt document
///
/// Empty or whitespace-only content yields a single `emptyFile` record.
pub fn parse_ads_txt_content(content: &str) -> Vec<Entry> {
    let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content);

    if content.trim().is_empty() {
        return vec![Record::new("", "", "", None, None, 1, "")
            .with_error(ValidationKey::EmptyFile)
            .into()];
    }

    let entries: Vec<Entry> = content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_ads_txt_line(line, idx + 1))
        .collect();

    debug!(
        "Parsed {} entries ({} invalid)",
        entries.len(),
        entries.iter().filter(|e| !e.is_valid()).count()
    );

    entries
}

fn parse_variable(content: &str, line_number: usize, raw_line: &str) -> Option<Variable> {
    let (key, value) = content.split_once('=')?;
    let variable_type = VariableType::parse(key)?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(Variable::new(variable_type, value, line_number, raw_line))
}

fn invalid(content: &str, line_number: usize, raw_line: &str, key: ValidationKey) -> Entry {
    let mut fields = content.split(',').map(str::trim);
    let domain = fields.next().unwrap_or_default();
    let account_id = fields.next().unwrap_or_default();
    let account_type = fields.next().unwrap_or_default();

    Record::new(
        domain,
        account_id,
        account_type,
        Relationship::parse(account_type),
        None,
        line_number,
        raw_line,
    )
    .with_error(key)
    .into()
}
