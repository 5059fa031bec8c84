//! Target URL extraction and normalization.

use std::borrow::Cow;

use url::Url;

use crate::error::CorsProxyError;

/// Pull the raw target out of an inbound `path?query`.
///
/// Everything after the leading `/` is the target. A scheme whose double
/// slash was collapsed by an intermediary (`https:/host`) is repaired.
/// Returns `None` when nothing follows the slash.
pub fn extract_target(path_and_query: &str) -> Option<String> {
    let raw = path_and_query.strip_prefix('/').unwrap_or(path_and_query);
    if raw.is_empty() {
        return None;
    }

    for scheme in ["https:/", "http:/"] {
        if let Some(rest) = raw.strip_prefix(scheme) {
            if !rest.starts_with('/') {
                return Some(format!("{}/{}", scheme, rest));
            }
        }
    }
    Some(raw.to_string())
}

/// Resolve a caller-supplied target into an absolute URL.
///
/// Targets without `http://` or `https://` get a scheme: `https` when the
/// string mentions port 443, `http` otherwise.
pub fn normalize_target(target: &str) -> Result<Url, CorsProxyError> {
    let with_scheme = if target.starts_with("http://") || target.starts_with("https://") {
        Cow::Borrowed(target)
    } else {
        let scheme = if target.contains(":443") { "https" } else { "http" };
        Cow::Owned(format!("{}://{}", scheme, target))
    };

    let url = Url::parse(&with_scheme).map_err(|e| {
        tracing::debug!(target_url = %target, error = %e, "Target URL did not parse");
        CorsProxyError::bad_request("Invalid target URL")
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(CorsProxyError::bad_request("Invalid target URL"));
    }

    Ok(url)
}
