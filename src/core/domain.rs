//! Domain-name checks backed by the Public Suffix List

/// Check that `domain` is a syntactically valid host name whose registrable
/// part sits under a suffix known to the Public Suffix List.
///
/// # Examples
/// ```
/// use ads_txt_validator_rs::core::domain::is_valid_domain;
///
/// assert!(is_valid_domain("google.com"));
/// assert!(is_valid_domain("example.co.uk"));
/// assert!(!is_valid_domain("localhost"));
/// ```
pub fn is_valid_domain(domain: &str) -> bool {
    let domain = normalize_domain(domain);
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    if !domain.split('.').all(is_valid_label) {
        return false;
    }

    match psl::domain(domain.as_bytes()) {
        Some(registrable) => registrable.suffix().is_known(),
        None => false,
    }
}

/// Lowercase and strip whitespace and a trailing root dot
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Case-insensitive domain comparison after normalization
pub fn domains_match(left: &str, right: &str) -> bool {
    normalize_domain(left) == normalize_domain(right)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
