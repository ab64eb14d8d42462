use crate::{Schema, SchemaError, definition::Definition, schema_type::SchemaType};
use derive_more::Display;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashSet;

///
/// IndexKind
/// Named index types accepted in place of a direction.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum IndexKind {
    #[display("2d")]
    Geo2d,

    #[display("2dsphere")]
    Geo2dSphere,

    #[display("hashed")]
    Hashed,

    #[display("text")]
    Text,
}

impl IndexKind {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "2d" => Some(Self::Geo2d),
            "2dsphere" => Some(Self::Geo2dSphere),
            "hashed" => Some(Self::Hashed),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

///
/// IndexDirection
/// Serializes as `1`, `-1` or the index kind name.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IndexDirection {
    #[default]
    Ascending,
    Descending,
    Kind(IndexKind),
}

impl IndexDirection {
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.as_i64() == Some(1) => Some(Self::Ascending),
            Value::Number(n) if n.as_i64() == Some(-1) => Some(Self::Descending),
            Value::String(name) => IndexKind::parse(name).map(Self::Kind),
            _ => None,
        }
    }
}

impl Serialize for IndexDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ascending => serializer.serialize_i8(1),
            Self::Descending => serializer.serialize_i8(-1),
            Self::Kind(kind) => serializer.collect_str(kind),
        }
    }
}

///
/// FieldIndex
///
/// Index declared on a single field through `index`, `unique`, `sparse`,
/// `text` or `expires`. A missing direction means ascending.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldIndex {
    pub direction: Option<IndexDirection>,
    pub options: Map<String, Value>,
}

impl FieldIndex {
    // from_record
    // None when no index key is set or `index` is explicitly false
    pub(crate) fn from_record(record: &IndexMap<String, Definition>, is_date: bool) -> Option<Self> {
        let mut index = Self::default();
        let mut declared = false;

        if let Some(def) = record.get("index") {
            match def.to_value() {
                Value::Bool(false) | Value::Null => return None,
                Value::Bool(true) => {}
                Value::Object(mut options) => {
                    if let Some(kind) = options.remove("type") {
                        index.direction = IndexDirection::from_value(&kind);
                    }
                    if options.remove("text").is_some_and(|t| t == Value::Bool(true)) {
                        index.direction = Some(IndexDirection::Kind(IndexKind::Text));
                    }
                    index.options = options;
                }
                other => index.direction = IndexDirection::from_value(&other),
            }
            declared = true;
        }

        for flag in ["unique", "sparse"] {
            if let Some(Definition::Value(Value::Bool(true))) = record.get(flag) {
                index.options.insert(flag.to_string(), Value::Bool(true));
                declared = true;
            }
        }

        if let Some(Definition::Value(Value::Bool(true))) = record.get("text") {
            index.direction = Some(IndexDirection::Kind(IndexKind::Text));
            declared = true;
        }

        if is_date
            && let Some(seconds) = record
                .get("expires")
                .and_then(|def| expire_after_seconds(&def.to_value()))
        {
            index
                .options
                .insert("expireAfterSeconds".to_string(), Value::from(seconds));
            declared = true;
        }

        declared.then_some(index)
    }
}

///
/// IndexEntry
/// One compiled index: ordered field set plus options.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndexEntry {
    pub fields: IndexMap<String, IndexDirection>,
    pub options: Map<String, Value>,
}

impl IndexEntry {
    fn with_background(mut self) -> Self {
        self.options
            .entry("background")
            .or_insert(Value::Bool(true));
        self
    }

    fn prefixed(&self, prefix: &str) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|(path, direction)| (format!("{prefix}{path}"), *direction))
                .collect(),
            options: self.options.clone(),
        }
    }
}

///
/// expire_after_seconds
///
/// Numbers are taken as seconds. Strings are durations: a number followed
/// by an optional unit (`ms`, `s`, `m`, `h`, `d`, `w`, `y` and their long
/// forms); a bare number string counts milliseconds.
///

#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn expire_after_seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => {
            let s = s.trim();
            let split = s
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(s.len());
            let (amount, unit) = s.split_at(split);
            let amount: f64 = amount.parse().ok()?;

            let millis = match unit.trim().to_ascii_lowercase().as_str() {
                "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
                "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
                "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
                "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
                "d" | "day" | "days" => 86_400_000.0,
                "w" | "week" | "weeks" => 604_800_000.0,
                "y" | "yr" | "yrs" | "year" | "years" => 31_557_600_000.0,
                _ => return None,
            };

            Some((amount * millis / 1_000.0) as u64)
        }
        _ => None,
    }
}

impl Schema {
    /// Declare a schema-level (usually compound) index.
    ///
    /// `fields` maps paths to `1`, `-1` or an index kind name; `options` is
    /// an object or null. `expires` is turned into `expireAfterSeconds`.
    pub fn index(&mut self, fields: Value, options: Value) -> Result<&mut Self, SchemaError> {
        let Value::Object(fields) = fields else {
            return Err(SchemaError::invalid_option("index", "fields must be an object"));
        };

        let fields = fields
            .into_iter()
            .map(|(path, direction)| {
                IndexDirection::from_value(&direction)
                    .map(|direction| (path.clone(), direction))
                    .ok_or_else(|| {
                        SchemaError::invalid_option(
                            "index",
                            format!("invalid direction {direction} for `{path}`"),
                        )
                    })
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;

        let mut options = match options {
            Value::Object(options) => options,
            Value::Null => Map::new(),
            other => {
                return Err(SchemaError::invalid_option(
                    "index",
                    format!("options must be an object, got {other}"),
                ));
            }
        };
        if let Some(expires) = options.remove("expires") {
            let seconds = expire_after_seconds(&expires).ok_or_else(|| {
                SchemaError::invalid_option("index", format!("invalid expires {expires}"))
            })?;
            options.insert("expireAfterSeconds".to_string(), Value::from(seconds));
        }

        self.indexes.push(IndexEntry { fields, options });
        self.indexed_paths = None;

        Ok(self)
    }

    /// Collect every index, recursing into sub-schemas with their path as
    /// key prefix. Per-field entries come first, then schema-level ones.
    #[must_use]
    pub fn indexes(&self) -> Vec<IndexEntry> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_indexes("", &mut seen, &mut out);

        out
    }

    /// Memoized `indexes`. Cleared when a path or index is added.
    pub fn indexed_paths(&mut self) -> &[IndexEntry] {
        if self.indexed_paths.is_none() {
            self.indexed_paths = Some(self.indexes());
        }

        self.indexed_paths.as_deref().unwrap_or_default()
    }

    fn collect_indexes(&self, prefix: &str, seen: &mut HashSet<String>, out: &mut Vec<IndexEntry>) {
        if !seen.insert(prefix.to_string()) {
            return;
        }

        for (path, schema_type) in &self.paths {
            if let Some(child) = schema_type.schema() {
                child.collect_indexes(&format!("{prefix}{path}."), seen, out);
                continue;
            }

            // an index on a primitive array may sit on its element type
            let index = schema_type
                .index()
                .or_else(|| schema_type.caster().and_then(SchemaType::index));

            if let Some(index) = index {
                let entry = IndexEntry {
                    fields: IndexMap::from([(
                        format!("{prefix}{path}"),
                        index.direction.unwrap_or_default(),
                    )]),
                    options: index.options.clone(),
                };
                out.push(entry.with_background());
            }
        }

        out.extend(
            self.indexes
                .iter()
                .map(|entry| entry.prefixed(prefix).with_background()),
        );
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_index(value: Value, is_date: bool) -> Option<FieldIndex> {
        match Definition::from(value) {
            Definition::Object(record) => FieldIndex::from_record(&record, is_date),
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn field_index_forms() {
        let index = field_index(json!({ "index": true }), false).expect("flag");
        assert_eq!(index.direction, None);

        let index = field_index(json!({ "index": -1 }), false).expect("direction");
        assert_eq!(index.direction, Some(IndexDirection::Descending));

        let index = field_index(json!({ "index": "2dsphere" }), false).expect("kind");
        assert_eq!(
            index.direction,
            Some(IndexDirection::Kind(IndexKind::Geo2dSphere))
        );

        let index = field_index(json!({ "index": { "type": "hashed", "name": "h" } }), false)
            .expect("object");
        assert_eq!(index.direction, Some(IndexDirection::Kind(IndexKind::Hashed)));
        assert_eq!(index.options, json!({ "name": "h" }).as_object().cloned().unwrap());

        assert!(field_index(json!({ "index": false, "unique": true }), false).is_none());
        assert!(field_index(json!({ "type": "String" }), false).is_none());
    }

    #[test]
    fn unique_and_sparse_imply_an_index() {
        let index = field_index(json!({ "unique": true, "sparse": true }), false).expect("unique");

        assert_eq!(index.direction, None);
        assert_eq!(index.options.get("unique"), Some(&json!(true)));
        assert_eq!(index.options.get("sparse"), Some(&json!(true)));
    }

    #[test]
    fn expires_only_applies_to_dates() {
        let index = field_index(json!({ "expires": "1h" }), true).expect("ttl");
        assert_eq!(index.options.get("expireAfterSeconds"), Some(&json!(3600)));

        assert!(field_index(json!({ "expires": "1h" }), false).is_none());
    }

    #[test]
    fn durations_convert_to_seconds() {
        assert_eq!(expire_after_seconds(&json!(60)), Some(60));
        assert_eq!(expire_after_seconds(&json!("30m")), Some(1800));
        assert_eq!(expire_after_seconds(&json!("2d")), Some(172_800));
        assert_eq!(expire_after_seconds(&json!("1.5h")), Some(5400));
        assert_eq!(expire_after_seconds(&json!("2 days")), Some(172_800));
        assert_eq!(expire_after_seconds(&json!("5000")), Some(5));
        assert_eq!(expire_after_seconds(&json!("soon")), None);
    }

    #[test]
    fn directions_serialize_as_numbers_or_names() {
        let entry = IndexEntry {
            fields: IndexMap::from([
                ("a".to_string(), IndexDirection::Ascending),
                ("b".to_string(), IndexDirection::Descending),
                ("c".to_string(), IndexDirection::Kind(IndexKind::Geo2d)),
            ]),
            options: Map::new(),
        };

        assert_eq!(
            serde_json::to_value(&entry).expect("serialize"),
            json!({ "fields": { "a": 1, "b": -1, "c": "2d" }, "options": {} })
        );
    }
}
