//! ## Crate layout
//! - `schema`: the schema compiler (`palta-schema`), re-exported.
//! - `registry`: explicit model registry, global plugins and options.
//! - `collection`: collection naming and English pluralization.
//! - `error`: public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module gathers what application code needs to declare
//! schemas and register models.

pub use palta_schema as schema;

pub mod collection;
pub mod error;
pub mod registry;

pub use error::Error;
pub use registry::{Model, Registry, RegistryError};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, Model, Registry,
        error::{ErrorKind, ErrorOrigin},
    };
    pub use palta_schema::prelude::*;
}
