use crate::Schema;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt::{self, Write as _};

///
/// SchemaFingerprint
/// SHA-256 over a schema's tree mirror, keys sorted, followed by its
/// schema-level index declarations in declaration order.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SchemaFingerprint([u8; 32]);

impl SchemaFingerprint {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl Schema {
    /// Two schemas compiled from the same definition share a fingerprint,
    /// whatever order their fields were declared in. Hooks, methods and
    /// options are not covered.
    #[must_use]
    pub fn fingerprint(&self) -> SchemaFingerprint {
        let indexes = serde_json::to_value(&self.indexes).unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(b"schemafp:v2");
        hasher.update(sorted_keys(self.tree_value()).to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(indexes.to_string().as_bytes());

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        SchemaFingerprint(out)
    }
}

// sorted_keys
// index field order is significant, so only the tree goes through here
fn sorted_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sorted_keys(v)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted_keys).collect()),
        other => other,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{Schema, options::SchemaOptions};
    use serde_json::json;

    fn compile(def: serde_json::Value) -> Schema {
        Schema::new(def, SchemaOptions::default()).expect("schema compiles")
    }

    #[test]
    fn same_definition_same_fingerprint() {
        let a = compile(json!({ "name": "String", "tags": ["String"] }));
        let b = compile(json!({ "name": "String", "tags": ["String"] }));

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().as_hex().len(), 64);
    }

    #[test]
    fn field_changes_alter_the_fingerprint() {
        let a = compile(json!({ "name": "String" }));
        let b = compile(json!({ "name": "Number" }));
        let c = compile(json!({ "name": { "type": "String", "required": true } }));

        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let a = compile(json!({ "name": "String", "age": "Number" }));
        let b = compile(json!({ "age": "Number", "name": "String" }));

        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn schema_level_indexes_alter_the_fingerprint() {
        let plain = compile(json!({ "a": "String", "b": "Number" }));

        let mut forward = plain.clone();
        forward
            .index(json!({ "a": 1, "b": -1 }), serde_json::Value::Null)
            .expect("index");
        let mut reversed = plain.clone();
        reversed
            .index(json!({ "b": -1, "a": 1 }), serde_json::Value::Null)
            .expect("index");

        assert_ne!(plain.fingerprint(), forward.fingerprint());
        assert_ne!(forward.fingerprint(), reversed.fingerprint());
    }
}
