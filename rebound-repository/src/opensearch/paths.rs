//! REST path and query-string rendering for type-scoped requests.

use serde_json::Value;
use url::Url;

use crate::errors::SearchError;
use crate::types::RequestParams;

const BASE: &str = "http://localhost/";

/// Build a percent-encoded REST path from raw segments.
///
/// Every segment must be non-empty; an empty index, type or id would address
/// a different endpoint altogether.
pub(crate) fn endpoint(segments: &[&str]) -> Result<String, SearchError> {
    if let Some(position) = segments.iter().position(|segment| segment.is_empty()) {
        return Err(SearchError::invalid_request(format!(
            "empty path segment at position {}",
            position
        )));
    }

    let mut url = Url::parse(BASE).map_err(|e| SearchError::invalid_request(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| SearchError::invalid_request("base URL cannot carry a path"))?
        .clear()
        .extend(segments);

    Ok(url.path().to_string())
}

/// Render extra request parameters as query-string pairs.
///
/// Strings pass through, arrays are comma-joined, nulls are dropped and any
/// other value uses its JSON text.
pub(crate) fn query_pairs(params: &RequestParams) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| render(value).map(|value| (key.clone(), value)))
        .collect()
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(render)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_joins_segments() {
        assert_eq!(
            endpoint(&["blog", "post", "42", "_create"]).unwrap(),
            "/blog/post/42/_create"
        );
    }

    #[test]
    fn test_endpoint_encodes_reserved_characters() {
        let path = endpoint(&["blog", "post", "a/b c"]).unwrap();
        assert_eq!(path, "/blog/post/a%2Fb%20c");
    }

    #[test]
    fn test_endpoint_rejects_empty_segment() {
        let err = endpoint(&["", "post"]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidRequest(_)));
    }

    #[test]
    fn test_query_pairs_rendering() {
        let mut params = RequestParams::new();
        params.insert("refresh".to_string(), json!(true));
        params.insert("routing".to_string(), json!("user-1"));
        params.insert("_source".to_string(), json!(["title", "tags"]));
        params.insert("skip".to_string(), Value::Null);

        let pairs = query_pairs(&params);

        assert_eq!(
            pairs,
            vec![
                ("_source".to_string(), "title,tags".to_string()),
                ("refresh".to_string(), "true".to_string()),
                ("routing".to_string(), "user-1".to_string()),
            ]
        );
    }
}
