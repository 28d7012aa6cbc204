use axum::http::HeaderMap;

/// Best-effort originating address from the configured header.
///
/// Proxies append to these headers, so only the first entry is used.
pub fn extract(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}
