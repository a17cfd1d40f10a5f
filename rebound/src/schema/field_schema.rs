//! Field-list schema.
//!
//! Declares named, typed fields with optional defaults and derives the
//! engine mapping from them.

use std::fmt;

use chrono::DateTime;
use serde_json::{json, Map, Value};

use rebound_shared::{Document, IndexOptions};

use crate::schema::Schema;

/// Value kind of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Analyzed full text.
    Text,
    /// Exact-match string.
    Keyword,
    /// Whole number.
    Integer,
    /// Any number.
    Float,
    /// `true` / `false`.
    Boolean,
    /// RFC 3339 timestamp string.
    Date,
    /// Nested JSON object.
    Object,
}

impl FieldKind {
    /// Engine mapping type for this kind.
    pub fn mapping_type(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Keyword => "keyword",
            Self::Integer => "long",
            Self::Float => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Object => "object",
        }
    }

    /// Whether `value` is acceptable for this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Text | Self::Keyword => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Date => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
            Self::Object => value.is_object(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Keyword => "keyword",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// A single declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name in the document.
    pub name: String,
    /// Expected value kind.
    pub kind: FieldKind,
    /// Whether a value must be present (or defaulted).
    pub required: bool,
    /// Value stored when the document omits the field.
    pub default: Option<Value>,
}

impl Field {
    /// Declare an optional field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Store `value` when the document omits the field.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Schema built from an ordered list of fields.
///
/// # Example
///
/// ```ignore
/// let schema = FieldSchema::new()
///     .with_field(Field::new("title", FieldKind::Text).required())
///     .with_field(Field::new("views", FieldKind::Integer).with_default(0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSchema {
    fields: Vec<Field>,
    dynamic: bool,
}

impl FieldSchema {
    /// An empty, non-dynamic schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field declaration.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Allow undeclared fields through validation and into storage.
    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn is_declared(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }
}

impl Schema for FieldSchema {
    fn index_mapping(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                (
                    field.name.clone(),
                    json!({ "type": field.kind.mapping_type() }),
                )
            })
            .collect();

        json!({
            "dynamic": self.dynamic,
            "properties": properties
        })
    }

    fn index_options(&self) -> Option<IndexOptions> {
        Some(IndexOptions {
            dynamic: Some(self.dynamic),
        })
    }

    fn validate(&self, doc: &Document) -> Vec<String> {
        let mut messages = Vec::new();

        for field in &self.fields {
            match doc.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.required && field.default.is_none() {
                        messages.push(format!("field {} required", field.name));
                    }
                }
                Some(value) => {
                    if !field.kind.accepts(value) {
                        messages.push(format!("field {} must be {}", field.name, field.kind));
                    }
                }
            }
        }

        if !self.dynamic {
            let mut unknown: Vec<&String> =
                doc.keys().filter(|key| !self.is_declared(key)).collect();
            unknown.sort();
            messages.extend(
                unknown
                    .into_iter()
                    .map(|key| format!("field {} is not declared", key)),
            );
        }

        messages
    }

    fn apply(&self, doc: &Document) -> Document {
        let mut body = Document::new();

        for field in &self.fields {
            match doc.get(&field.name) {
                Some(value) if !value.is_null() => {
                    body.insert(field.name.clone(), value.clone());
                }
                _ => {
                    if let Some(default) = &field.default {
                        body.insert(field.name.clone(), default.clone());
                    }
                }
            }
        }

        if self.dynamic {
            for (key, value) in doc {
                if !self.is_declared(key) {
                    body.insert(key.clone(), value.clone());
                }
            }
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog_schema() -> FieldSchema {
        FieldSchema::new()
            .with_field(Field::new("title", FieldKind::Text).required())
            .with_field(Field::new("author", FieldKind::Keyword).required())
            .with_field(Field::new("views", FieldKind::Integer).with_default(0))
            .with_field(Field::new("published_at", FieldKind::Date))
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test documents must be objects"),
        }
    }

    #[test]
    fn test_validate_reports_in_declaration_order() {
        let messages = blog_schema().validate(&doc(json!({"views": "many"})));

        assert_eq!(
            messages,
            vec![
                "field title required".to_string(),
                "field author required".to_string(),
                "field views must be integer".to_string(),
            ]
        );
    }

    #[test]
    fn test_validate_accepts_valid_document() {
        let messages = blog_schema().validate(&doc(json!({
            "title": "Hello",
            "author": "ana",
            "published_at": "2024-05-01T10:00:00Z"
        })));
        assert!(messages.is_empty());
    }

    #[test]
    fn test_validate_rejects_malformed_date() {
        let messages = blog_schema().validate(&doc(json!({
            "title": "Hello",
            "author": "ana",
            "published_at": "yesterday"
        })));
        assert_eq!(messages, vec!["field published_at must be date".to_string()]);
    }

    #[test]
    fn test_validate_rejects_undeclared_fields_when_strict() {
        let messages = blog_schema().validate(&doc(json!({
            "title": "Hello",
            "author": "ana",
            "zeta": 1,
            "alpha": 2
        })));
        assert_eq!(
            messages,
            vec![
                "field alpha is not declared".to_string(),
                "field zeta is not declared".to_string(),
            ]
        );

        let dynamic = blog_schema().dynamic(true);
        assert!(dynamic
            .validate(&doc(json!({"title": "Hello", "author": "ana", "zeta": 1})))
            .is_empty());
    }

    #[test]
    fn test_required_field_with_default_is_satisfied() {
        let schema =
            FieldSchema::new().with_field(Field::new("status", FieldKind::Keyword).required().with_default("draft"));
        assert!(schema.validate(&Document::new()).is_empty());
        assert_eq!(schema.apply(&Document::new())["status"], json!("draft"));
    }

    #[test]
    fn test_apply_fills_defaults_and_drops_unknown() {
        let body = blog_schema().apply(&doc(json!({
            "title": "Hello",
            "author": "ana",
            "extra": true
        })));

        assert_eq!(
            Value::Object(body),
            json!({"title": "Hello", "author": "ana", "views": 0})
        );
    }

    #[test]
    fn test_apply_keeps_unknown_when_dynamic() {
        let body = blog_schema()
            .dynamic(true)
            .apply(&doc(json!({"title": "Hello", "author": "ana", "extra": true})));
        assert_eq!(body["extra"], json!(true));
    }

    #[test]
    fn test_index_mapping_structure() {
        let mapping = blog_schema().index_mapping();

        assert_eq!(mapping["dynamic"], json!(false));
        assert_eq!(mapping["properties"]["title"]["type"], "text");
        assert_eq!(mapping["properties"]["author"]["type"], "keyword");
        assert_eq!(mapping["properties"]["views"]["type"], "long");
        assert_eq!(mapping["properties"]["published_at"]["type"], "date");
    }

    #[test]
    fn test_index_options_reflect_dynamic_flag() {
        assert_eq!(
            blog_schema().index_options(),
            Some(IndexOptions { dynamic: Some(false) })
        );
        assert!(!blog_schema().dynamic(true).index_options().unwrap().is_strict());
    }
}
