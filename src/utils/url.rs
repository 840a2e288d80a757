//! Helpers for joining catalog base URLs with API endpoint paths.

/// Strip trailing slashes so endpoint joins never produce `//`.
///
/// ```
/// use monero_tutor::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://openrouter.ai/api/v1/"), "https://openrouter.ai/api/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash between them.
///
/// ```
/// use monero_tutor::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://openrouter.ai/api/v1/", "/chat/completions"),
///     "https://openrouter.ai/api/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalize_base_url(base_url), endpoint)
}

/// Accepts only absolute `http://` or `https://` URLs with something after the scheme.
pub fn is_http_url(candidate: &str) -> bool {
    let candidate = candidate.trim();
    ["https://", "http://"].iter().any(|scheme| {
        candidate
            .strip_prefix(scheme)
            .is_some_and(|rest| !rest.trim_matches('/').is_empty())
    })
}
