//! Raw list parameters as they appear on the wire.

use std::collections::HashMap;

use serde_json::Value;

use querypage_core::config::PaginateConfig;

use super::source::RequestSource;

/// Parameter values before any interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams {
    pub page: String,
    pub size: String,
    pub sort: String,
    pub order: String,
    pub fields: String,
    /// Nested array from a JSON body, or filter JSON text.
    pub filters: Value,
}

impl RawParams {
    /// Read the parameters of `source`: the JSON body for `POST`, the query
    /// string otherwise. Undecodable input yields empty parameters.
    pub fn extract(source: &impl RequestSource, config: &PaginateConfig) -> Self {
        if source.reads_body() {
            Self::from_body(source.body(), config)
        } else {
            Self::from_query(source.query(), config)
        }
    }

    fn from_query(query: &[u8], config: &PaginateConfig) -> Self {
        let pairs = match serde_urlencoded::from_bytes::<Vec<(String, String)>>(query) {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode list query string");
                return Self::default();
            }
        };

        let mut values: HashMap<String, Value> = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            values.entry(key).or_insert(Value::String(value));
        }
        Self::collect(&values, config)
    }

    fn from_body(body: &[u8], config: &PaginateConfig) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        match serde_json::from_slice::<HashMap<String, Value>>(body) {
            Ok(values) => Self::collect(&values, config),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode list request body");
                Self::default()
            }
        }
    }

    fn collect(values: &HashMap<String, Value>, config: &PaginateConfig) -> Self {
        let text = |aliases: &[String], key: &str| {
            lookup(values, config, aliases, key)
                .map(scalar_text)
                .unwrap_or_default()
        };

        Self {
            page: text(&config.page_params, "page"),
            size: text(&config.size_params, "size"),
            sort: text(&config.sort_params, "sort"),
            order: text(&config.order_params, "order"),
            fields: text(&config.fields_params, "fields"),
            filters: lookup(values, config, &config.filter_params, "filters")
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}

/// First non-blank value among the configured aliases, else the default key.
fn lookup<'v>(
    values: &'v HashMap<String, Value>,
    config: &PaginateConfig,
    aliases: &[String],
    key: &str,
) -> Option<&'v Value> {
    if config.custom_params_enabled {
        let found = aliases
            .iter()
            .filter_map(|alias| values.get(alias))
            .find(|v| !is_blank(v));
        if found.is_some() {
            return found;
        }
    }
    values.get(key)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join(","),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::source::RawRequest;
    use serde_json::json;

    #[test]
    fn test_query_string_first_value_wins() {
        let config = PaginateConfig::default();
        let params = RawParams::extract(
            &RawRequest::get(b"page=2&size=20&size=50&sort=-id&filters=%5B%5D"),
            &config,
        );
        assert_eq!(params.page, "2");
        assert_eq!(params.size, "20");
        assert_eq!(params.sort, "-id");
        assert_eq!(params.filters, json!("[]"));
    }

    #[test]
    fn test_body_accepts_numbers_and_nested_filters() {
        let config = PaginateConfig::default();
        let body = br#"{"page": 3, "size": "15", "fields": ["id", "name"], "filters": [["id", 1]]}"#;
        let params = RawParams::extract(&RawRequest::post(body), &config);
        assert_eq!(params.page, "3");
        assert_eq!(params.size, "15");
        assert_eq!(params.fields, "id,name");
        assert_eq!(params.filters, json!([["id", 1]]));
    }

    #[test]
    fn test_undecodable_body_yields_defaults() {
        let config = PaginateConfig::default();
        let params = RawParams::extract(&RawRequest::post(b"not json"), &config);
        assert_eq!(params, RawParams::default());
    }

    #[test]
    fn test_custom_aliases_first_non_empty() {
        let config = PaginateConfig {
            custom_params_enabled: true,
            page_params: vec!["p".into(), "pg".into()],
            size_params: vec!["limit".into()],
            ..Default::default()
        };
        let params = RawParams::extract(&RawRequest::get(b"p=&pg=4&size=7"), &config);
        assert_eq!(params.page, "4");
        // No alias present: fall back to the default key.
        assert_eq!(params.size, "7");
    }

    #[test]
    fn test_aliases_ignored_when_disabled() {
        let config = PaginateConfig {
            page_params: vec!["p".into()],
            ..Default::default()
        };
        let params = RawParams::extract(&RawRequest::get(b"p=4"), &config);
        assert!(params.page.is_empty());
    }
}
