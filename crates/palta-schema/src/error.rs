use crate::ThisError;

///
/// SchemaError
///
/// Raised synchronously by `add` / `add_path` / option accessors.
/// A failed call is rejected as a whole; tree-mirror writes made by earlier
/// keys of the same multi-key `add` are not rolled back.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("Cannot set path `{path}`. Path `{parent}` is already set to {existing}.")]
    ConflictingPath {
        path: String,
        parent: String,
        existing: String,
    },

    #[error("invalid value for schema option `{key}`: {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("Invalid value for schema {kind}path `{path}`")]
    InvalidPath { path: String, kind: &'static str },

    #[error("`{0}` may not be used as a schema pathname")]
    ReservedName(String),

    #[error(
        "Undefined type `{name}` at `{path}`\n  Did you try nesting Schemas? \
         You can only nest using sub-schema arrays or embedded sub-schemas."
    )]
    UnknownType { name: String, path: String },
}

impl SchemaError {
    pub(crate) fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            kind: "",
        }
    }

    pub(crate) fn invalid_array_path(path: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            kind: "Array ",
        }
    }

    pub(crate) fn invalid_option(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidOption {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}
