use crate::{
    Schema,
    schema::FieldIndex,
    types::{Primitive, TypeMarker},
};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

///
/// Definition
///
/// A user-supplied field definition. Either a type marker, an array marker
/// whose first element is the cast type, a compiled sub-schema, an object
/// (a field-option record when it carries the type key, implicit nesting
/// otherwise) or a literal value.
///
/// Any JSON document converts into a `Definition`; strings standing where a
/// type is expected are read as type names (`"String"`, `"mixed"`, `"array"`).
///

#[derive(Clone, Debug)]
pub enum Definition {
    Type(TypeMarker),
    Schema(Arc<Schema>),
    Array(Vec<Self>),
    Object(IndexMap<String, Self>),
    Value(Value),
}

impl Definition {
    /// Build an object definition from `(key, definition)` pairs, keeping order.
    pub fn object<K, D>(entries: impl IntoIterator<Item = (K, D)>) -> Self
    where
        K: Into<String>,
        D: Into<Self>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, d)| (k.into(), d.into()))
                .collect(),
        )
    }

    #[must_use]
    pub const fn null() -> Self {
        Self::Value(Value::Null)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    // absent, null and false do not count as a value when probing for a type
    #[must_use]
    pub(crate) const fn is_falsy(&self) -> bool {
        matches!(self, Self::Value(Value::Null | Value::Bool(false)))
    }

    /// Render the definition as plain JSON, type markers as their names and
    /// sub-schemas as their tree mirror.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Type(marker) => Value::String(marker.to_string()),
            Self::Schema(schema) => schema.tree_value(),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, d)| (k.clone(), d.to_value()))
                    .collect::<Map<_, _>>(),
            ),
            Self::Value(value) => value.clone(),
        }
    }
}

impl Serialize for Definition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<Value> for Definition {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
            other => Self::Value(other),
        }
    }
}

impl From<&str> for Definition {
    fn from(name: &str) -> Self {
        Self::Value(Value::String(name.to_string()))
    }
}

impl From<TypeMarker> for Definition {
    fn from(marker: TypeMarker) -> Self {
        Self::Type(marker)
    }
}

impl From<Primitive> for Definition {
    fn from(primitive: Primitive) -> Self {
        Self::Type(TypeMarker::Primitive(primitive))
    }
}

impl From<Schema> for Definition {
    fn from(schema: Schema) -> Self {
        Self::Schema(Arc::new(schema))
    }
}

impl From<Arc<Schema>> for Definition {
    fn from(schema: Arc<Schema>) -> Self {
        Self::Schema(schema)
    }
}

impl From<Vec<Self>> for Definition {
    fn from(items: Vec<Self>) -> Self {
        Self::Array(items)
    }
}

impl From<IndexMap<String, Self>> for Definition {
    fn from(map: IndexMap<String, Self>) -> Self {
        Self::Object(map)
    }
}

// type_entry
// the value stored under the type key, when it is set to something
pub(crate) fn type_entry<'a>(
    map: &'a IndexMap<String, Definition>,
    type_key: &str,
) -> Option<&'a Definition> {
    map.get(type_key).filter(|d| !d.is_falsy())
}

// is_nested_group
// an object nests unless it carries a type marker; `{ type: { type: .. } }`
// is a wrapped field-option record and stays a leaf
pub(crate) fn is_nested_group(map: &IndexMap<String, Definition>, type_key: &str) -> bool {
    type_entry(map, type_key).is_none()
}

///
/// Required
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Required {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Required {
    // `true`, a message string, or `[true, message]`
    fn from_definition(def: &Definition) -> Option<Self> {
        match def {
            Definition::Value(Value::Bool(true)) => Some(Self::default()),
            Definition::Value(Value::String(message)) => Some(Self {
                message: Some(message.clone()),
            }),
            Definition::Array(items) => match items.as_slice() {
                [Definition::Value(Value::Bool(true)), rest @ ..] => Some(Self {
                    message: rest.first().and_then(|m| match m {
                        Definition::Value(Value::String(s)) => Some(s.clone()),
                        _ => None,
                    }),
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

///
/// FieldOptions
///
/// Per-field options read off a field-option record. Keys without a
/// dedicated slot are kept verbatim in `extra`.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldOptions {
    pub required: Option<Required>,
    pub index: Option<FieldIndex>,
    pub default: Option<Value>,
    pub reference: Option<String>,
    pub select: Option<bool>,
    pub auto: bool,
    pub extra: Map<String, Value>,
}

impl FieldOptions {
    const INDEX_KEYS: [&'static str; 5] = ["index", "unique", "sparse", "text", "expires"];

    pub(crate) fn from_record(
        record: &IndexMap<String, Definition>,
        type_key: &str,
        primitive: Option<Primitive>,
    ) -> Self {
        let is_date = primitive.is_some_and(Primitive::is_date);
        let mut options = Self {
            index: FieldIndex::from_record(record, is_date),
            ..Self::default()
        };

        for (key, def) in record {
            if key == type_key || key == "cast" || Self::INDEX_KEYS.contains(&key.as_str()) {
                continue;
            }

            match (key.as_str(), def) {
                ("required", def) => options.required = Required::from_definition(def),
                ("default", def) => options.default = Some(def.to_value()),
                ("ref", Definition::Value(Value::String(target))) => {
                    options.reference = Some(target.clone());
                }
                ("select", Definition::Value(Value::Bool(select))) => {
                    options.select = Some(*select);
                }
                ("auto", Definition::Value(Value::Bool(auto))) => options.auto = *auto,
                (key, def) => {
                    options.extra.insert(key.to_string(), def.to_value());
                }
            }
        }

        options
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> IndexMap<String, Definition> {
        match Definition::from(value) {
            Definition::Object(map) => map,
            other => panic!("expected object definition, got {other:?}"),
        }
    }

    #[test]
    fn json_converts_recursively() {
        let def = Definition::from(json!({ "tags": ["String"], "meta": {} }));
        let map = def.as_object().expect("object");

        assert!(matches!(map["tags"], Definition::Array(ref items) if items.len() == 1));
        assert!(matches!(map["meta"], Definition::Object(ref m) if m.is_empty()));
    }

    #[test]
    fn nesting_is_decided_by_the_type_key() {
        assert!(is_nested_group(&record(json!({ "first": "String" })), "type"));
        assert!(!is_nested_group(&record(json!({ "type": "String" })), "type"));
        assert!(!is_nested_group(
            &record(json!({ "type": { "type": "String" } })),
            "type"
        ));
        assert!(is_nested_group(&record(json!({ "type": null })), "type"));
        assert!(!is_nested_group(&record(json!({ "kind": "String" })), "kind"));
    }

    #[test]
    fn required_accepts_flag_message_and_tuple() {
        let opts = FieldOptions::from_record(&record(json!({ "required": true })), "type", None);
        assert_eq!(opts.required, Some(Required::default()));

        let opts = FieldOptions::from_record(
            &record(json!({ "required": [true, "name is needed"] })),
            "type",
            None,
        );
        assert_eq!(
            opts.required.and_then(|r| r.message).as_deref(),
            Some("name is needed")
        );

        let opts = FieldOptions::from_record(&record(json!({ "required": false })), "type", None);
        assert_eq!(opts.required, None);
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let opts = FieldOptions::from_record(
            &record(json!({ "type": "String", "lowercase": true, "ref": "User" })),
            "type",
            Some(Primitive::String),
        );

        assert_eq!(opts.reference.as_deref(), Some("User"));
        assert_eq!(opts.extra.get("lowercase"), Some(&json!(true)));
        assert!(!opts.extra.contains_key("type"));
    }
}
