//! ## Crate layout
//! - `definition`: user-facing field definition tree (`Definition`).
//! - `types`: the closed type mapping (`Primitive`, `TypeMarker`).
//! - `schema`: the compiler itself, path registry, type resolution,
//!   positional lookups and index compilation.
//! - `schema_type`: compiled per-path output (`SchemaType`, `PathKind`).
//! - `virtual_type`: computed fields backed by getter/setter chains.
//! - `hook`: ordered lifecycle callbacks replayed by a document runtime.
//! - `options`: schema-level configuration.

pub mod definition;
pub mod error;
pub mod hook;
pub mod method;
pub mod options;
pub mod reserved;
pub mod schema;
pub mod schema_type;
pub mod types;
pub mod virtual_type;

pub use error::SchemaError;
pub use schema::Schema;

use thiserror::Error as ThisError;

/// Default key naming the type marker inside a field-option object.
pub const DEFAULT_TYPE_KEY: &str = "type";

/// Path segment used to address "any element" of an array.
pub const POSITIONAL_WILDCARD: &str = "$";

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        definition::{Definition, FieldOptions},
        error::SchemaError,
        hook::{Document, HookEntry, HookError},
        options::{ReadPreference, SchemaOptions, Timestamps},
        schema::{
            IndexDirection, IndexEntry, IndexKind, PathClass, PathLookup, Schema, SchemaFingerprint,
        },
        schema_type::{PathKind, SchemaType},
        types::{Primitive, TypeMarker},
        virtual_type::VirtualType,
    };
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;
}
