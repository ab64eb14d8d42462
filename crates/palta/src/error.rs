use crate::registry::RegistryError;
use derive_more::Display;
use palta_schema::SchemaError;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        let kind = match err {
            SchemaError::ConflictingPath { .. } => SchemaErrorKind::ConflictingPath,
            SchemaError::InvalidOption { .. } => SchemaErrorKind::InvalidOption,
            SchemaError::InvalidPath { .. } => SchemaErrorKind::InvalidPath,
            SchemaError::ReservedName(_) => SchemaErrorKind::ReservedName,
            SchemaError::UnknownType { .. } => SchemaErrorKind::UnknownType,
        };

        Self::new(ErrorKind::Schema(kind), ErrorOrigin::Schema, err.to_string())
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::MissingSchema(_) => Self::new(
                ErrorKind::Registry(RegistryErrorKind::MissingSchema),
                ErrorOrigin::Registry,
                err.to_string(),
            ),
            RegistryError::OverwriteModel(_) => Self::new(
                ErrorKind::Registry(RegistryErrorKind::OverwriteModel),
                ErrorOrigin::Registry,
                err.to_string(),
            ),
            RegistryError::Plugin { source, .. } => source.into(),
        }
    }
}

///
/// ErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Schema(SchemaErrorKind),
    Registry(RegistryErrorKind),
}

///
/// SchemaErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SchemaErrorKind {
    /// A path was declared under one that is already a leaf.
    ConflictingPath,

    InvalidOption,

    /// Null or degenerate field definition.
    InvalidPath,

    /// Path collides with a document-runtime built-in.
    ReservedName,

    UnknownType,
}

///
/// RegistryErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RegistryErrorKind {
    /// Model fetched by name before any schema was registered for it.
    MissingSchema,

    /// Model re-registered with a different definition.
    OverwriteModel,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Registry,
    Schema,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_errors_keep_their_message() {
        let err: Error = SchemaError::ReservedName("save".to_string()).into();

        assert_eq!(err.kind, ErrorKind::Schema(SchemaErrorKind::ReservedName));
        assert_eq!(err.origin, ErrorOrigin::Schema);
        assert_eq!(err.to_string(), "`save` may not be used as a schema pathname");
    }

    #[test]
    fn plugin_failures_surface_the_schema_error() {
        let err: Error = RegistryError::Plugin {
            model: "User".to_string(),
            source: SchemaError::ReservedName("save".to_string()),
        }
        .into();

        assert_eq!(err.kind, ErrorKind::Schema(SchemaErrorKind::ReservedName));
    }

    #[test]
    fn registry_errors_map_to_registry_kinds() {
        let err: Error = RegistryError::OverwriteModel("User".to_string()).into();

        assert_eq!(
            err.kind,
            ErrorKind::Registry(RegistryErrorKind::OverwriteModel)
        );
        assert_eq!(err.origin, ErrorOrigin::Registry);
        assert!(err.message.contains("User"));
    }
}
