//! Upstream target resolution from a parsed request.
//!
//! Origin-form (`/path`) targets take their host from the Host header.
//! Absolute-form (`http://host[:port]/path`) targets carry it in the URI,
//! which then overrides the Host header. No percent-decoding or other
//! rewriting takes place, and no scheme other than `http://` is recognized:
//! any other target that does not start with `/` is rejected.

use crate::http::request::{ParsedRequest, MAX_HOST_LEN};
use crate::proxy::ProxyError;

const HTTP_SCHEME: &str = "http://";

/// Where to connect and which path the request is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// `hostname` or `hostname:port`.
    pub actual_host: String,
    /// Path of the request; always begins with `/`.
    pub actual_uri: String,
    /// URI as written by the client, for logging.
    pub print_uri: String,
}

/// Derive the upstream target for `request`.
pub fn resolve_target(request: &ParsedRequest) -> Result<ResolvedTarget, ProxyError> {
    let Some(rest) = request.uri.strip_prefix(HTTP_SCHEME) else {
        if !request.uri.starts_with('/') {
            return Err(ProxyError::InvalidTarget("not an origin-form path or http:// URI"));
        }
        return Ok(ResolvedTarget {
            actual_host: request.host.clone(),
            actual_uri: request.uri.clone(),
            print_uri: request.uri.clone(),
        });
    };

    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, "/"),
    };
    if authority.is_empty() {
        return Err(ProxyError::InvalidTarget("empty authority"));
    }
    if authority.len() > MAX_HOST_LEN {
        return Err(ProxyError::InvalidTarget("authority longer than 255 bytes"));
    }

    Ok(ResolvedTarget {
        actual_host: authority.to_string(),
        actual_uri: path.to_string(),
        print_uri: request.uri.clone(),
    })
}
