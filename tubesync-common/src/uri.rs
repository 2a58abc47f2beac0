//! Building relative URIs with query strings.

use std::fmt;
use url::form_urlencoded;

/// Append URL-encoded query parameters to a URI path.
///
/// Parameters are form encoded in the order given. The result is a
/// relative reference: no scheme, host or fragment is ever added, and an
/// empty parameter set leaves the path untouched.
///
/// ```rust
/// use tubesync_common::uri::append_uri_params;
///
/// let uri = append_uri_params("/media/thumb", [("key", "abc 123"), ("size", "large")]);
/// assert_eq!(uri, "/media/thumb?key=abc+123&size=large");
///
/// let empty: [(&str, &str); 0] = [];
/// assert_eq!(append_uri_params("/media/thumb", empty), "/media/thumb");
/// ```
pub fn append_uri_params<I, K, V>(uri: impl fmt::Display, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut uri = uri.to_string();
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    if !query.is_empty() {
        uri.push('?');
        uri.push_str(&query);
    }
    uri
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_append_single() {
        assert_eq!(append_uri_params("/a", [("x", "1")]), "/a?x=1");
    }

    #[test]
    fn test_append_encodes_reserved() {
        assert_eq!(
            append_uri_params("/a", [("q", "a&b=c/d?")]),
            "/a?q=a%26b%3Dc%2Fd%3F"
        );
    }

    #[test]
    fn test_append_preserves_order() {
        let mut params = IndexMap::new();
        params.insert("z", "1");
        params.insert("a", "2");
        assert_eq!(append_uri_params("/p", &params), "/p?z=1&a=2");
    }

    #[test]
    fn test_append_unicode() {
        assert_eq!(append_uri_params("/p", [("n", "é")]), "/p?n=%C3%A9");
    }

    #[test]
    fn test_append_owned_params() {
        let params = vec![("id".to_string(), 42.to_string())];
        assert_eq!(append_uri_params(String::from("/x"), params), "/x?id=42");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(append_uri_params("", [("x", "1")]), "?x=1");
    }
}
