use thiserror::Error;
use url::Url;

/// Errors from checking a user-entered instance URL.
#[derive(Error, Debug)]
pub enum InstanceUrlError {
    #[error("Instance URL is empty")]
    Empty,
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Instance URL must not carry a query or fragment")]
    HasQueryOrFragment,
}

/// Turns user input into an instance base URL suitable for the feed client.
///
/// Trims surrounding whitespace, requires an http(s) URL with a host, and
/// removes trailing slashes, since the client appends `/beluga.json` verbatim.
/// The original spelling of the rest of the URL is kept.
///
/// ```
/// use beluga::util::normalize_instance_url;
///
/// assert_eq!(
///     normalize_instance_url(" https://blog.example/ ").unwrap(),
///     "https://blog.example"
/// );
/// assert!(normalize_instance_url("ftp://blog.example").is_err());
/// ```
pub fn normalize_instance_url(input: &str) -> Result<String, InstanceUrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InstanceUrlError::Empty);
    }

    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(InstanceUrlError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().is_none() {
        return Err(InstanceUrlError::InvalidUrl(url::ParseError::EmptyHost));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(InstanceUrlError::HasQueryOrFragment);
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_url_unchanged() {
        assert_eq!(
            normalize_instance_url("https://beluga.example").unwrap(),
            "https://beluga.example"
        );
    }

    #[test]
    fn test_trailing_slashes_removed() {
        assert_eq!(
            normalize_instance_url("https://beluga.example//").unwrap(),
            "https://beluga.example"
        );
        assert_eq!(
            normalize_instance_url("http://beluga.example/blog/").unwrap(),
            "http://beluga.example/blog"
        );
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(
            normalize_instance_url("  https://beluga.example \n").unwrap(),
            "https://beluga.example"
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            normalize_instance_url("   "),
            Err(InstanceUrlError::Empty)
        ));
    }

    #[test]
    fn test_invalid_schemes() {
        assert!(matches!(
            normalize_instance_url("file:///etc/passwd"),
            Err(InstanceUrlError::UnsupportedScheme(s)) if s == "file"
        ));
        assert!(normalize_instance_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_relative_rejected() {
        assert!(matches!(
            normalize_instance_url("beluga.example"),
            Err(InstanceUrlError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_query_rejected() {
        assert!(matches!(
            normalize_instance_url("https://beluga.example/?page=2"),
            Err(InstanceUrlError::HasQueryOrFragment)
        ));
    }

    #[test]
    fn test_port_kept() {
        assert_eq!(
            normalize_instance_url("http://127.0.0.1:8080/").unwrap(),
            "http://127.0.0.1:8080"
        );
    }
}
