//! Integration tests for the request, URI, filename and serialization helpers.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use tubesync::common::{
    LazyList, SerialError, append_uri_params, clean_filename, client_ip, client_ip_from_meta,
    json_serial, to_json_string,
};

/// Test client address selection from request metadata
#[test]
fn test_client_ip_from_request_meta() {
    let mut meta = HashMap::new();
    meta.insert("REMOTE_ADDR".to_string(), "172.17.0.1".to_string());
    assert_eq!(client_ip_from_meta(&meta), Some("172.17.0.1"));

    meta.insert(
        "HTTP_X_FORWARDED_FOR".to_string(),
        "198.51.100.4,172.17.0.1".to_string(),
    );
    assert_eq!(client_ip_from_meta(&meta), Some("198.51.100.4"));
    assert_eq!(client_ip(Some("198.51.100.4"), "172.17.0.1"), "198.51.100.4");
}

/// Test building a thumbnail URI with several parameters
#[test]
fn test_append_uri_params() {
    let uri = append_uri_params(
        "/media/thumb/abc",
        [("width", "320"), ("title", "Tom & Jerry")],
    );
    assert_eq!(uri, "/media/thumb/abc?width=320&title=Tom+%26+Jerry");
    assert!(!uri.contains('#'));
    assert!(!uri.contains("://"));
}

/// Test cleaning a realistic video title into a filename
#[test]
fn test_clean_filename() {
    assert_eq!(
        clean_filename("Episode 12: \"Who?\" | 100% <Live>\t\n"),
        "Episode 12 Who 100 Live"
    );
}

/// Test JSON conversion of mixed metadata
#[test]
fn test_json_serial_metadata() {
    let published = NaiveDate::from_ymd_opt(2021, 7, 4)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();
    let formats = LazyList::new(["720p", "1080p"].into_iter().map(|f| json!(f)));

    let metadata = json!({
        "published": json_serial(&published).unwrap(),
        "formats": json_serial(&formats).unwrap(),
    });
    assert_eq!(
        metadata,
        json!({"published": "2021-07-04T18:00:00", "formats": ["720p", "1080p"]})
    );

    assert_eq!(
        to_json_string(&formats).unwrap(),
        r#"["720p","1080p"]"#
    );
}

/// Test unsupported types are rejected
#[test]
fn test_json_serial_unsupported() {
    let err = json_serial(&vec![1, 2, 3]).unwrap_err();
    assert!(matches!(err, SerialError::Unsupported { .. }));
    assert!(err.to_string().contains("Vec<i32>"));
}
