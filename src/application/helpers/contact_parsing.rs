/// Splits a display name into first and last name.
///
/// The first whitespace-separated token is the first name and the remaining
/// tokens, joined by single spaces, are the last name. A single token yields an
/// empty last name; a missing or blank name yields neither.
pub fn split_display_name(name: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(name) = name else {
        return (None, None);
    };
    let mut parts = name.split_whitespace();
    let Some(first) = parts.next() else {
        return (None, None);
    };
    let last = parts.collect::<Vec<_>>().join(" ");
    (Some(first.to_string()), Some(last))
}

/// Takes the first comma-separated entry of an `X-Forwarded-For` value.
pub fn first_forwarded_ip(header: &str) -> Option<&str> {
    header
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
}
