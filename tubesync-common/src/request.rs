//! Client address helpers for incoming HTTP requests.

use std::collections::HashMap;
use std::net::IpAddr;

/// Request metadata key carrying the `X-Forwarded-For` header.
pub const FORWARDED_FOR_KEY: &str = "HTTP_X_FORWARDED_FOR";

/// Request metadata key carrying the peer address.
pub const REMOTE_ADDR_KEY: &str = "REMOTE_ADDR";

/// Read access to CGI style request metadata (`REMOTE_ADDR`, `HTTP_*`).
pub trait RequestMeta {
    /// Get a metadata value.
    fn meta(&self, key: &str) -> Option<&str>;
}

impl RequestMeta for HashMap<String, String> {
    fn meta(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Pick the client address for a request.
///
/// A non-empty forwarded-for value wins and its first entry is returned
/// verbatim, otherwise the peer address is used. Nothing is validated.
///
/// ```rust
/// use tubesync_common::request::client_ip;
///
/// assert_eq!(client_ip(Some("203.0.113.7, 10.0.0.1"), "10.0.0.1"), "203.0.113.7");
/// assert_eq!(client_ip(None, "10.0.0.1"), "10.0.0.1");
/// ```
pub fn client_ip<'a>(forwarded_for: Option<&'a str>, remote_addr: &'a str) -> &'a str {
    match forwarded_for {
        Some(header) if !header.is_empty() => header.split(',').next().unwrap_or(header),
        _ => remote_addr,
    }
}

/// Pick the client address from request metadata.
///
/// Returns `None` only when there is no usable forwarded-for value and no
/// peer address either.
pub fn client_ip_from_meta<M: RequestMeta + ?Sized>(meta: &M) -> Option<&str> {
    match meta.meta(FORWARDED_FOR_KEY) {
        Some(header) if !header.is_empty() => header.split(',').next(),
        _ => meta.meta(REMOTE_ADDR_KEY),
    }
}

/// Parse a client address returned by [`client_ip`] into an [`IpAddr`].
pub fn parse_client_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}
