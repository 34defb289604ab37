//! Link sanitizing for user-supplied URLs (project links, media paths).

use url::Url;

/// Keeps absolute `http`/`https` URLs and root-relative paths; anything else
/// (`javascript:`, `data:`, bare words) becomes an empty string.
#[must_use]
pub fn sanitize_url(input: Option<&str>) -> String {
    let Some(trimmed) = input.map(str::trim).filter(|value| !value.is_empty()) else {
        return String::new();
    };

    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => trimmed.to_string(),
        Ok(_) => String::new(),
        Err(_) if trimmed.starts_with('/') => trimmed.to_string(),
        Err(_) => String::new(),
    }
}
