//! Generic URL splitting.
//!
//! Splitting is lenient: ports, percent-encoding and plain host names are
//! never validated here. The only structural checks concern square brackets
//! in the network location, which must hold an IPv6 (or IPvFuture) literal
//! and be the whole host. Validation of the pieces is the job of the
//! connection string parser.

use std::net::{IpAddr, Ipv6Addr};
use thiserror::Error;

/// Characters allowed in a scheme after the leading ASCII letter.
const SCHEME_PUNCT: &[char] = &['+', '-', '.'];

/// Characters removed from anywhere in the input before splitting.
const UNSAFE_CHARS: &[char] = &['\t', '\r', '\n'];

/// Errors raised when a string cannot be split into URL components.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlSplitError {
    /// The network location has an opening or closing bracket without its pair.
    #[error("Invalid IPv6 URL")]
    UnbalancedBrackets,

    /// Text appears before `[` or between `]` and the port separator.
    #[error("Invalid IPv6 URL")]
    MisplacedBrackets,

    /// The bracketed host is not an IP address.
    #[error("'{0}' does not appear to be an IPv4 or IPv6 address")]
    InvalidBracketedHost(String),

    /// The bracketed host is an IPv4 address.
    #[error("An IPv4 address cannot be in brackets")]
    BracketedIpv4(String),

    /// The bracketed host starts with `v` but is not `v<hex>.<text>`.
    #[error("IPvFuture address is invalid")]
    InvalidIpvFuture(String),
}

/// A URL split into its five generic components.
///
/// Components that are absent from the input are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitUrl {
    /// Lowercased scheme, empty when the input has none.
    pub scheme: String,
    /// Network location (authority), everything between `//` and the path.
    pub netloc: String,
    /// Path, including its leading `/`.
    pub path: String,
    /// Query string without the `?`.
    pub query: String,
    /// Fragment without the `#`.
    pub fragment: String,
}

/// Split a URL into scheme, network location, path, query and fragment.
///
/// ```rust
/// use tubesync_common::connection::split_url;
///
/// let parts = split_url("PostgreSQL://u:p@db:5432/app?sslmode=require").unwrap();
/// assert_eq!(parts.scheme, "postgresql");
/// assert_eq!(parts.netloc, "u:p@db:5432");
/// assert_eq!(parts.path, "/app");
/// assert_eq!(parts.query, "sslmode=require");
/// ```
pub fn split_url(input: &str) -> Result<SplitUrl, UrlSplitError> {
    let cleaned: String = input
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !UNSAFE_CHARS.contains(c))
        .collect();

    let mut rest = cleaned.as_str();
    let mut parts = SplitUrl::default();

    if let Some((scheme, after)) = rest.split_once(':') {
        if is_scheme(scheme) {
            parts.scheme = scheme.to_ascii_lowercase();
            rest = after;
        }
    }

    if let Some(after) = rest.strip_prefix("//") {
        let end = after.find(['/', '?', '#']).unwrap_or(after.len());
        let netloc = &after[..end];
        match (netloc.contains('['), netloc.contains(']')) {
            (true, true) => check_bracketed_netloc(netloc)?,
            (false, false) => {}
            _ => return Err(UrlSplitError::UnbalancedBrackets),
        }
        parts.netloc = netloc.to_string();
        rest = &after[end..];
    }

    if let Some((before, fragment)) = rest.split_once('#') {
        parts.fragment = fragment.to_string();
        rest = before;
    }
    if let Some((before, query)) = rest.split_once('?') {
        parts.query = query.to_string();
        rest = before;
    }
    parts.path = rest.to_string();

    Ok(parts)
}

/// Validate the bracketed host of a netloc holding both `[` and `]`.
///
/// Only the host part after the last `@` is considered. When that part has no
/// `[`, the brackets sit in the credentials and the host itself is checked as
/// if it were bracketed, which always fails for a plain name.
fn check_bracketed_netloc(netloc: &str) -> Result<(), UrlSplitError> {
    let host_port = netloc.rsplit_once('@').map_or(netloc, |(_, host_port)| host_port);
    let host = match host_port.split_once('[') {
        Some((before, bracketed)) => {
            if !before.is_empty() {
                return Err(UrlSplitError::MisplacedBrackets);
            }
            let (host, port) = bracketed.split_once(']').unwrap_or((bracketed, ""));
            if !port.is_empty() && !port.starts_with(':') {
                return Err(UrlSplitError::MisplacedBrackets);
            }
            host
        }
        None => host_port.split_once(']').map_or(host_port, |(host, _)| host),
    };
    check_bracketed_host(host)
}

fn check_bracketed_host(host: &str) -> Result<(), UrlSplitError> {
    if let Some(future) = host.strip_prefix('v') {
        return match future.split_once('.') {
            Some((version, rest))
                if !version.is_empty()
                    && version.chars().all(|c| c.is_ascii_hexdigit())
                    && !rest.is_empty() =>
            {
                Ok(())
            }
            _ => Err(UrlSplitError::InvalidIpvFuture(host.to_string())),
        };
    }

    // A zone index (`fe80::1%eth0`) is allowed after an IPv6 address.
    let addr = match host.split_once('%') {
        Some((addr, zone)) if !zone.is_empty() && !zone.contains('%') => addr,
        Some(_) => return Err(UrlSplitError::InvalidBracketedHost(host.to_string())),
        None => host,
    };
    if addr.parse::<Ipv6Addr>().is_ok() {
        return Ok(());
    }
    match host.parse::<IpAddr>() {
        Ok(_) => Err(UrlSplitError::BracketedIpv4(host.to_string())),
        Err(_) => Err(UrlSplitError::InvalidBracketedHost(host.to_string())),
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || SCHEME_PUNCT.contains(&c))
        }
        _ => false,
    }
}
