use crate::UrlError;
use url::Url;

/// Parses a target URL, accepting only absolute HTTP(S) URLs with a host
///
/// # Arguments
///
/// * `url_str` - The URL string to parse
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The URL is malformed, has a non-HTTP scheme, or has no host
///
/// # Examples
///
/// ```
/// use topic_harvest::url::parse_target_url;
///
/// assert!(parse_target_url("https://www.reddit.com/r/Python").is_ok());
/// assert!(parse_target_url("ftp://example.com/file").is_err());
/// ```
pub fn parse_target_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Extracts the origin key of a URL
///
/// The origin is `scheme://host[:port]` with the host lowercased. Default
/// ports are omitted, so `https://example.com:443/` and `https://example.com/`
/// share an origin. Politeness delays are tracked per origin.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use topic_harvest::url::extract_origin;
///
/// let url = Url::parse("https://WWW.Reddit.com/r/Python").unwrap();
/// assert_eq!(extract_origin(&url), Some("https://www.reddit.com".to_string()));
/// ```
pub fn extract_origin(url: &Url) -> Option<String> {
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
