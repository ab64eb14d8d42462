use crate::{DEFAULT_TYPE_KEY, SchemaError};
use derive_more::Display;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

///
/// SchemaOptions
///
/// Schema-level configuration. Loadable from JSON (camelCase keys); keys
/// without a dedicated field are kept in `extra`.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaOptions {
    pub strict: bool,
    pub minimize: bool,
    pub validate_before_save: bool,
    pub type_key: String,

    #[serde(rename = "_id")]
    pub id_field: bool,

    /// Register an `id` virtual mirroring `_id` as a string.
    pub id: bool,
    pub version_key: String,
    pub discriminator_key: String,
    pub timestamps: Timestamps,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_index: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<ReadPreference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pluralization: Option<bool>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            strict: true,
            minimize: true,
            validate_before_save: true,
            type_key: DEFAULT_TYPE_KEY.to_string(),
            id_field: true,
            id: true,
            version_key: "__v".to_string(),
            discriminator_key: "__t".to_string(),
            timestamps: Timestamps::Disabled,
            auto_index: None,
            collection: None,
            read: None,
            safe: None,
            pluralization: None,
            extra: IndexMap::new(),
        }
    }
}

impl SchemaOptions {
    /// Options handed to a sub-schema compiled inline from an array element.
    #[must_use]
    pub fn for_child(&self) -> Self {
        Self {
            minimize: self.minimize,
            type_key: self.type_key.clone(),
            ..Self::default()
        }
    }

    /// Set an option by key.
    ///
    /// `read` accepts a preference name or its short alias; `safe = false`
    /// is stored as `{ "w": 0 }`. Unknown keys are kept verbatim.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), SchemaError> {
        match key {
            "read" => {
                self.read = match value {
                    Value::Null => None,
                    Value::String(name) => Some(ReadPreference::parse(&name).ok_or_else(|| {
                        tracing::warn!(preference = %name, "unrecognised read preference");
                        SchemaError::invalid_option(key, format!("unknown read preference `{name}`"))
                    })?),
                    other => {
                        return Err(SchemaError::invalid_option(
                            key,
                            format!("expected a string, got {other}"),
                        ));
                    }
                };
            }
            "safe" => {
                self.safe = Some(if value == Value::Bool(false) {
                    json!({ "w": 0 })
                } else {
                    value
                });
            }
            _ => {
                let mut fields = match serde_json::to_value(&*self) {
                    Ok(Value::Object(fields)) => fields,
                    Ok(_) => return Err(SchemaError::invalid_option(key, "options are not a record")),
                    Err(err) => return Err(SchemaError::invalid_option(key, err)),
                };
                fields.insert(key.to_string(), value);

                *self = serde_json::from_value(Value::Object(fields))
                    .map_err(|err| SchemaError::invalid_option(key, err))?;
            }
        }

        Ok(())
    }

    /// Read an option by key. Unset optional options read as `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut fields)) => fields.remove(key),
            _ => None,
        }
    }
}

///
/// Timestamps
///
/// `false` disables, `true` uses `createdAt` / `updatedAt`, an object
/// overrides either field name.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "TimestampsRepr", into = "TimestampsRepr")]
pub enum Timestamps {
    #[default]
    Disabled,
    Enabled {
        created_at: String,
        updated_at: String,
    },
}

impl Timestamps {
    pub const CREATED_AT: &'static str = "createdAt";
    pub const UPDATED_AT: &'static str = "updatedAt";

    #[must_use]
    pub fn enabled() -> Self {
        Self::Enabled {
            created_at: Self::CREATED_AT.to_string(),
            updated_at: Self::UPDATED_AT.to_string(),
        }
    }

    /// `(createdAt, updatedAt)` field names when enabled.
    #[must_use]
    pub fn fields(&self) -> Option<(&str, &str)> {
        match self {
            Self::Disabled => None,
            Self::Enabled {
                created_at,
                updated_at,
            } => Some((created_at, updated_at)),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum TimestampsRepr {
    Flag(bool),
    Fields {
        #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
        created_at: Option<String>,
        #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
        updated_at: Option<String>,
    },
}

impl From<TimestampsRepr> for Timestamps {
    fn from(repr: TimestampsRepr) -> Self {
        match repr {
            TimestampsRepr::Flag(false) => Self::Disabled,
            TimestampsRepr::Flag(true) => Self::enabled(),
            TimestampsRepr::Fields {
                created_at,
                updated_at,
            } => Self::Enabled {
                created_at: created_at.unwrap_or_else(|| Self::CREATED_AT.to_string()),
                updated_at: updated_at.unwrap_or_else(|| Self::UPDATED_AT.to_string()),
            },
        }
    }
}

impl From<Timestamps> for TimestampsRepr {
    fn from(timestamps: Timestamps) -> Self {
        match timestamps {
            Timestamps::Disabled => Self::Flag(false),
            Timestamps::Enabled {
                created_at,
                updated_at,
            } => Self::Fields {
                created_at: Some(created_at),
                updated_at: Some(updated_at),
            },
        }
    }
}

///
/// ReadPreference
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadPreference {
    #[display("primary")]
    Primary,
    #[display("primaryPreferred")]
    PrimaryPreferred,
    #[display("secondary")]
    Secondary,
    #[display("secondaryPreferred")]
    SecondaryPreferred,
    #[display("nearest")]
    Nearest,
}

impl ReadPreference {
    /// Parse a preference name or one of the aliases `p`, `pp`, `s`, `sp`, `n`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let pref = match name {
            "p" | "primary" => Self::Primary,
            "pp" | "primaryPreferred" => Self::PrimaryPreferred,
            "s" | "secondary" => Self::Secondary,
            "sp" | "secondaryPreferred" => Self::SecondaryPreferred,
            "n" | "nearest" => Self::Nearest,
            _ => return None,
        };

        Some(pref)
    }
}

///
/// TESTS
///
