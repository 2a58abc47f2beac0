//! JSON conversion for values serde does not handle the way callers expect.
//!
//! [`json_serial`] is the fallback hook used when writing loosely typed
//! metadata: date/times become ISO-8601 strings and a [`LazyList`] is
//! materialized into an array. Any other type is rejected.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use serde_json::json;
//! use tubesync_common::serial::{LazyList, json_serial};
//!
//! let when = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(12, 30, 0).unwrap();
//! assert_eq!(json_serial(&when).unwrap(), json!("2024-05-01T12:30:00"));
//!
//! let formats = LazyList::new((1..=3).map(|n| json!(n)));
//! assert_eq!(json_serial(&formats).unwrap(), json!([1, 2, 3]));
//!
//! assert!(json_serial(&42u8).is_err());
//! ```

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::any::{Any, type_name};
use std::cell::RefCell;
use std::fmt;
use thiserror::Error;

/// Errors raised while converting values to JSON.
#[derive(Error, Debug)]
pub enum SerialError {
    /// The value's type has no JSON conversion.
    #[error("Type {type_name} is not json_serial()-able")]
    Unsupported {
        /// Rust type name of the rejected value.
        type_name: &'static str,
    },

    /// Rendering the converted value failed.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for serialization helpers.
pub type SerialResult<T> = Result<T, SerialError>;

/// Convert a value serde cannot represent directly into JSON.
pub fn json_serial<T: Any>(value: &T) -> SerialResult<Value> {
    let any = value as &dyn Any;

    if let Some(dt) = any.downcast_ref::<NaiveDateTime>() {
        return Ok(Value::String(isoformat_naive(dt)));
    }
    if let Some(dt) = any.downcast_ref::<DateTime<Utc>>() {
        return Ok(Value::String(isoformat(dt)));
    }
    if let Some(dt) = any.downcast_ref::<DateTime<FixedOffset>>() {
        return Ok(Value::String(isoformat(dt)));
    }
    if let Some(dt) = any.downcast_ref::<DateTime<Local>>() {
        return Ok(Value::String(isoformat(dt)));
    }
    if let Some(list) = any.downcast_ref::<LazyList>() {
        return Ok(Value::Array(list.to_vec()));
    }

    Err(SerialError::Unsupported {
        type_name: type_name::<T>(),
    })
}

/// Convert with [`json_serial`] and render the result as a JSON string.
pub fn to_json_string<T: Any>(value: &T) -> SerialResult<String> {
    Ok(serde_json::to_string(&json_serial(value)?)?)
}

/// `YYYY-MM-DDTHH:MM:SS[.ffffff]`, fraction only when non-zero.
fn isoformat_naive(dt: &NaiveDateTime) -> String {
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = (dt.nanosecond() % 1_000_000_000) / 1_000;
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

/// Naive form followed by a `+HH:MM` offset.
fn isoformat<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let mut out = isoformat_naive(&dt.naive_local());
    out.push_str(&dt.format("%:z").to_string());
    out
}

struct LazyState {
    cache: Vec<Value>,
    source: Option<Box<dyn Iterator<Item = Value>>>,
}

impl LazyState {
    /// Pull from the source until `len` items are cached or it runs dry.
    fn fill_to(&mut self, len: usize) {
        while self.cache.len() < len {
            let next = self.source.as_mut().and_then(|source| source.next());
            match next {
                Some(value) => self.cache.push(value),
                None => {
                    self.source = None;
                    break;
                }
            }
        }
    }
}

/// A list whose items are produced on first traversal.
///
/// Items are pulled from the wrapped iterator only when needed and cached,
/// so traversing twice never re-runs the source.
pub struct LazyList {
    state: RefCell<LazyState>,
}

impl LazyList {
    /// Wrap an iterator without consuming it.
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Self {
            state: RefCell::new(LazyState {
                cache: Vec::new(),
                source: Some(Box::new(items.into_iter())),
            }),
        }
    }

    /// Check whether the source iterator has been fully consumed.
    pub fn is_exhausted(&self) -> bool {
        self.state.borrow().source.is_none()
    }

    /// Number of items produced so far.
    pub fn cached_len(&self) -> usize {
        self.state.borrow().cache.len()
    }

    /// Get the item at `index`, producing items up to it if needed.
    pub fn get(&self, index: usize) -> Option<Value> {
        let mut state = self.state.borrow_mut();
        state.fill_to(index.saturating_add(1));
        state.cache.get(index).cloned()
    }

    /// Total number of items. Consumes the source.
    pub fn len(&self) -> usize {
        let mut state = self.state.borrow_mut();
        state.fill_to(usize::MAX);
        state.cache.len()
    }

    /// Check whether the list has no items. Produces at most one item.
    pub fn is_empty(&self) -> bool {
        self.get(0).is_none()
    }

    /// Materialize every item into an ordered vector.
    pub fn to_vec(&self) -> Vec<Value> {
        let mut state = self.state.borrow_mut();
        state.fill_to(usize::MAX);
        state.cache.clone()
    }
}

impl fmt::Debug for LazyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyList")
            .field("cached", &self.cached_len())
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}

impl Serialize for LazyList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn naive(micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, micro)
            .unwrap()
    }

    #[test]
    fn test_naive_datetime() {
        assert_eq!(json_serial(&naive(0)).unwrap(), json!("2023-01-02T03:04:05"));
        assert_eq!(
            json_serial(&naive(120)).unwrap(),
            json!("2023-01-02T03:04:05.000120")
        );
    }

    #[test]
    fn test_utc_datetime() {
        let dt = Utc.from_utc_datetime(&naive(500_000));
        assert_eq!(
            json_serial(&dt).unwrap(),
            json!("2023-01-02T03:04:05.500000+00:00")
        );
    }

    #[test]
    fn test_fixed_offset_datetime() {
        let offset = FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap();
        let dt = offset.from_local_datetime(&naive(0)).unwrap();
        assert_eq!(
            json_serial(&dt).unwrap(),
            json!("2023-01-02T03:04:05-05:30")
        );
    }

    #[test]
    fn test_unsupported() {
        let err = json_serial(&"text").unwrap_err();
        assert!(matches!(err, SerialError::Unsupported { .. }));
        assert!(err.to_string().contains("&str"));

        let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        assert!(json_serial(&date).is_err());
    }

    #[test]
    fn test_lazy_list_defers() {
        let pulled = Rc::new(Cell::new(0));
        let counter = Rc::clone(&pulled);
        let list = LazyList::new((0..5).map(move |n| {
            counter.set(counter.get() + 1);
            json!(n)
        }));
        assert_eq!(pulled.get(), 0);

        assert_eq!(list.get(1), Some(json!(1)));
        assert_eq!(pulled.get(), 2);
        assert!(!list.is_exhausted());

        assert_eq!(json_serial(&list).unwrap(), json!([0, 1, 2, 3, 4]));
        assert!(list.is_exhausted());
        assert_eq!(pulled.get(), 5);

        // Cached, the source is not consulted again.
        assert_eq!(list.len(), 5);
        assert_eq!(pulled.get(), 5);
    }

    #[test]
    fn test_lazy_list_empty() {
        let list = LazyList::new(Vec::new());
        assert!(list.is_empty());
        assert_eq!(json_serial(&list).unwrap(), json!([]));
        assert_eq!(list.get(3), None);
    }

    #[test]
    fn test_lazy_list_serialize() {
        let list = LazyList::new(vec![json!("a"), json!({"b": 1})]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a",{"b":1}]"#);
    }

    #[test]
    fn test_to_json_string() {
        assert_eq!(
            to_json_string(&naive(0)).unwrap(),
            r#""2023-01-02T03:04:05""#
        );
    }
}
