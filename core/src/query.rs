//! Query-string and form encoding.
//!
//! # Design
//! Query data is any `Serialize` value that renders as a JSON object. Its
//! fields are flattened to name/value pairs, null fields are dropped, and
//! the rest are sorted by name so the same logical query always produces
//! the same URI.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Query argument for calls that send none: `client.get::<T, _>(uri, NO_QUERY)`.
pub const NO_QUERY: Option<&'static ()> = None;

/// Render `data` as a query string, prefixed with `?` when `include_operator`.
///
/// `None` renders as an empty string whatever the operator flag. An object
/// whose fields are all null still renders as `"?"` with the operator.
pub fn to_query_string<Q>(data: Option<&Q>, include_operator: bool) -> Result<String>
where
    Q: Serialize + ?Sized,
{
    let Some(data) = data else {
        return Ok(String::new());
    };
    let joined = to_query_pairs(data)?
        .into_iter()
        .map(|(name, value)| format!("{}={}", urlencoding::encode(&name), urlencoding::encode(&value)))
        .collect::<Vec<_>>()
        .join("&");
    if include_operator {
        Ok(format!("?{joined}"))
    } else {
        Ok(joined)
    }
}

/// Unencoded name/value pairs of `data`, nulls dropped, sorted by name.
pub fn to_query_pairs<Q>(data: &Q) -> Result<Vec<(String, String)>>
where
    Q: Serialize + ?Sized,
{
    let value = serde_json::to_value(data).map_err(ApiError::Serialization)?;
    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(ApiError::InvalidQuery(format!(
                "expected a map of fields, got {}",
                kind(&other)
            )))
        }
    };
    let mut pairs: Vec<(String, String)> = fields
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k, render(v)))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs)
}

/// `application/x-www-form-urlencoded` body for ordered key/value pairs.
pub fn form_urlencode<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", form_component(k.as_ref()), form_component(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
}

// Forms encode spaces as '+'.
fn form_component(raw: &str) -> String {
    urlencoding::encode(raw).replace("%20", "+")
}

fn render(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Serialize)]
    struct Search {
        page: u32,
        name: Option<String>,
        active: bool,
        filter: Option<String>,
    }

    fn search() -> Search {
        Search {
            page: 2,
            name: Some("a b&c".to_string()),
            active: true,
            filter: None,
        }
    }

    #[test]
    fn none_renders_empty_with_or_without_operator() {
        assert_eq!(to_query_string::<Search>(None, true).unwrap(), "");
        assert_eq!(to_query_string::<Search>(None, false).unwrap(), "");
    }

    #[test]
    fn fields_are_sorted_and_nulls_dropped() {
        let query = to_query_string(Some(&search()), true).unwrap();
        assert_eq!(query, "?active=true&name=a%20b%26c&page=2");
    }

    #[test]
    fn operator_can_be_omitted() {
        let query = to_query_string(Some(&search()), false).unwrap();
        assert_eq!(query, "active=true&name=a%20b%26c&page=2");
    }

    #[test]
    fn encoding_is_deterministic_for_maps() {
        let mut map = HashMap::new();
        for (k, v) in [("zeta", "1"), ("alpha", "2"), ("mid", "3")] {
            map.insert(k.to_string(), v.to_string());
        }
        let first = to_query_string(Some(&map), true).unwrap();
        for _ in 0..10 {
            assert_eq!(to_query_string(Some(&map), true).unwrap(), first);
        }
        assert_eq!(first, "?alpha=2&mid=3&zeta=1");
    }

    #[test]
    fn all_null_object_keeps_operator() {
        let empty = Search {
            page: 0,
            name: None,
            active: false,
            filter: None,
        };
        let pairs = to_query_pairs(&empty).unwrap();
        assert_eq!(pairs.len(), 2);

        let nothing: HashMap<String, Option<String>> = [("a".to_string(), None)].into();
        assert_eq!(to_query_string(Some(&nothing), true).unwrap(), "?");
    }

    #[test]
    fn non_object_is_rejected() {
        let err = to_query_string(Some(&42), true).unwrap_err();
        assert!(matches!(err, ApiError::InvalidQuery(_)));
    }

    #[test]
    fn form_encoding_keeps_pair_order() {
        let body = form_urlencode(&[("grant_type", "client_credentials"), ("scope", "read write")]);
        assert_eq!(body, "grant_type=client_credentials&scope=read+write");
    }
}
