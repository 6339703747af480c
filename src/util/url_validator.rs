use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host part (e.g. the bare `https://` placeholder).
    #[error("URL has no host")]
    MissingHost,
    /// Plain HTTP to a remote host.
    #[error("Insecure URL: HTTPS required (except localhost for testing)")]
    Insecure,
}

/// Validate a link before handing it to the system browser.
///
/// Only `http`/`https` with a host are opened, so a link record can never
/// launch a local file or a custom protocol handler.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

/// Validate the remote store endpoint.
///
/// Writes carry the whole profile, so HTTPS is required. Plain HTTP is
/// accepted only for loopback hosts, which is how the tests reach a mock server.
pub fn validate_endpoint(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = validate_url_for_open(url_str)?;

    if url.scheme() == "http" {
        if !is_loopback_host(&url) {
            return Err(UrlValidationError::Insecure);
        }
        tracing::warn!(endpoint = %url, "Using non-HTTPS endpoint (loopback only)");
    }

    Ok(url)
}

fn is_loopback_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host == "localhost" {
        return true;
    }

    // Strip brackets from IPv6 addresses for parsing
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    host_for_parse
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_accepts_web_urls() {
        assert!(validate_url_for_open("https://example.com/page").is_ok());
        assert!(validate_url_for_open("http://news.example.org").is_ok());
        assert!(validate_url_for_open("  https://padded.example.com ").is_ok());
    }

    #[test]
    fn test_open_rejects_other_schemes() {
        assert!(matches!(
            validate_url_for_open("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_url_for_open("javascript:alert(1)").is_err());
        assert!(validate_url_for_open("mailto:me@example.com").is_err());
    }

    #[test]
    fn test_open_rejects_placeholder() {
        // The template for a new link slot
        assert!(validate_url_for_open("https://").is_err());
        assert!(validate_url_for_open("not a url").is_err());
    }

    #[test]
    fn test_endpoint_requires_https() {
        assert!(validate_endpoint("https://script.google.com/macros/s/abc/exec").is_ok());
        assert!(matches!(
            validate_endpoint("http://script.example.com/exec"),
            Err(UrlValidationError::Insecure)
        ));
    }

    #[test]
    fn test_endpoint_allows_loopback_http() {
        assert!(validate_endpoint("http://127.0.0.1:8080/exec").is_ok());
        assert!(validate_endpoint("http://localhost:3000").is_ok());
        assert!(validate_endpoint("http://[::1]:3000").is_ok());
    }
}
