use reqwest::Url;

/// Returns the input with surrounding whitespace removed, or `None` when
/// nothing remains to submit.
pub fn non_empty_trimmed(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Returns true for localhost, loopback IPv4/IPv6, and 0.0.0.0 URLs.
pub fn is_local_endpoint_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };

    match parsed.host_str() {
        Some(host) => {
            let normalized = host.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "localhost" | "::1" | "0.0.0.0")
                || normalized.starts_with("127.")
        }
        None => false,
    }
}
