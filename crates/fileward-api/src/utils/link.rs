//! Destination link validation
//!
//! Advertisement uploads carry a destination URL that later renders as a
//! clickable link. The link is stored, never fetched, so no DNS resolution
//! happens here; the checks reject links that could only ever point back at
//! the serving infrastructure.

use std::net::IpAddr;

/// Validate an advertisement destination link.
///
/// The link must parse as an absolute http(s) URL with a host, and the host
/// must not be a loopback or unspecified address.
pub fn validate_destination_link(link: &str) -> Result<(), String> {
    let uri: http::Uri = link
        .parse()
        .map_err(|e| format!("Invalid URL format: {}", e))?;

    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        _ => return Err("Link must be an absolute http:// or https:// URL".to_string()),
    }

    let host = uri.host().ok_or_else(|| "Link must have a host".to_string())?;

    // Bracketed IPv6 hosts parse with the brackets attached
    let host_trimmed = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host_trimmed.parse::<IpAddr>() {
        if ip.is_loopback() || ip.is_unspecified() {
            return Err("Link must not target a loopback or unspecified host".to_string());
        }
    }

    let host_lower = host_trimmed.to_lowercase();
    if host_lower == "localhost" || host_lower.ends_with(".localhost") {
        return Err("Link must not target a loopback or unspecified host".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_public_http_urls() {
        assert!(validate_destination_link("https://example.com/jobs").is_ok());
        assert!(validate_destination_link("http://example.com").is_ok());
        assert!(validate_destination_link("https://example.com:8443/a?b=c").is_ok());
    }

    #[test]
    fn rejects_relative_and_non_http() {
        assert!(validate_destination_link("/jobs/1").is_err());
        assert!(validate_destination_link("ftp://example.com/file").is_err());
        assert!(validate_destination_link("javascript:alert(1)").is_err());
        assert!(validate_destination_link("not a url").is_err());
    }

    #[test]
    fn rejects_loopback_and_unspecified_hosts() {
        assert!(validate_destination_link("http://127.0.0.1/admin").is_err());
        assert!(validate_destination_link("http://localhost:4000").is_err());
        assert!(validate_destination_link("http://0.0.0.0").is_err());
        assert!(validate_destination_link("http://[::1]:8080").is_err());
        assert!(validate_destination_link("http://app.localhost").is_err());
    }
}
