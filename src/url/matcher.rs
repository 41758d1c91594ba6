/// Checks if a host matches a host pattern
///
/// Two pattern forms are supported:
/// 1. Exact: "boards.example.org" matches only that host
/// 2. Wildcard: "*.example.org" matches "example.org" and any subdomain of it
///
/// Hosts are compared ASCII case-insensitively, since `url` already lowercases
/// domain names but patterns come straight from user configuration.
///
/// # Examples
///
/// ```
/// use threadget::url::host_matches;
///
/// assert!(host_matches("boards.example.org", "boards.example.org"));
/// assert!(host_matches("*.example.org", "boards.example.org"));
/// assert!(host_matches("*.example.org", "example.org"));
/// assert!(!host_matches("*.example.org", "example.com"));
/// ```
pub fn host_matches(pattern: &str, host: &str) -> bool {
    if host.is_empty() {
        return false;
    }

    match pattern.strip_prefix("*.") {
        Some(base) => {
            if host.eq_ignore_ascii_case(base) {
                return true;
            }
            host.len() > base.len() + 1
                && host.as_bytes()[host.len() - base.len() - 1] == b'.'
                && host[host.len() - base.len()..].eq_ignore_ascii_case(base)
        }
        None => host.eq_ignore_ascii_case(pattern),
    }
}

/// Returns true if the host matches any of the patterns
pub fn host_matches_any(patterns: &[String], host: &str) -> bool {
    patterns.iter().any(|pattern| host_matches(pattern, host))
}
