use crate::collection;
use indexmap::IndexMap;
use palta_schema::{Schema, SchemaError, schema::SchemaFingerprint};
use serde_json::Value;
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("Schema hasn't been registered for model `{0}`. Use Registry::model(name, schema)")]
    MissingSchema(String),

    #[error("Cannot overwrite `{0}` model once compiled.")]
    OverwriteModel(String),

    #[error("plugin failed on model `{model}`: {source}")]
    Plugin {
        model: String,
        source: SchemaError,
    },
}

pub type PluginFn = dyn Fn(&mut Schema, &Value) -> Result<(), SchemaError> + Send + Sync;

///
/// Model
///
/// A schema bound to a name and a collection. The schema is frozen once
/// registered; models built from it share the same compiled instance.
///

#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    pub collection: String,
    pub schema: Arc<Schema>,

    /// Fingerprint of the definition as registered, before plugins ran.
    pub fingerprint: SchemaFingerprint,
}

///
/// Registry
///
/// Owned by the application and passed to every call site; there is no
/// process-wide model table.
///

#[derive(Default)]
pub struct Registry {
    models: IndexMap<String, Model>,
    plugins: Vec<(Arc<PluginFn>, Value)>,
    options: IndexMap<String, Value>,
}

impl Registry {
    pub const PLURALIZATION: &'static str = "pluralization";

    #[must_use]
    pub fn new() -> Self {
        Self {
            models: IndexMap::new(),
            plugins: Vec::new(),
            options: IndexMap::from([(Self::PLURALIZATION.to_string(), Value::Bool(true))]),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.options.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    fn pluralization(&self) -> bool {
        self.options
            .get(Self::PLURALIZATION)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Declare a plugin applied to every schema when it is first registered.
    pub fn plugin<F>(&mut self, plugin: F, opts: Value) -> &mut Self
    where
        F: Fn(&mut Schema, &Value) -> Result<(), SchemaError> + Send + Sync + 'static,
    {
        self.plugins.push((Arc::new(plugin), opts));
        self
    }

    ///
    /// model
    ///
    /// Register `schema` under `name`, or fetch the model already there.
    ///
    /// Re-registering with a definition that fingerprints the same returns
    /// the existing model; a different one fails with `OverwriteModel`.
    /// Passing `collection` for a registered name returns an uncached model
    /// bound to that collection.
    ///

    pub fn model(
        &mut self,
        name: &str,
        schema: Option<Schema>,
        collection: Option<&str>,
    ) -> Result<Model, RegistryError> {
        if let Some(existing) = self.models.get(name) {
            if let Some(schema) = &schema
                && schema.fingerprint() != existing.fingerprint
            {
                return Err(RegistryError::OverwriteModel(name.to_string()));
            }

            let mut model = existing.clone();
            if let Some(collection) = collection {
                model.collection = collection.to_string();
            }

            return Ok(model);
        }

        let mut schema = schema.ok_or_else(|| RegistryError::MissingSchema(name.to_string()))?;
        let fingerprint = schema.fingerprint();

        self.apply_plugins(name, &mut schema)?;

        if schema.get(Self::PLURALIZATION).is_none() {
            schema
                .set(Self::PLURALIZATION, Value::Bool(self.pluralization()))
                .map_err(|source| RegistryError::Plugin {
                    model: name.to_string(),
                    source,
                })?;
        }

        let collection = collection
            .map(str::to_string)
            .or_else(|| schema.options().collection.clone())
            .unwrap_or_else(|| {
                let pluralization = schema.options().pluralization.unwrap_or(true);
                collection::to_collection_name(name, pluralization)
            });

        let model = Model {
            name: name.to_string(),
            collection,
            schema: Arc::new(schema),
            fingerprint,
        };
        tracing::debug!(
            model = name,
            collection = %model.collection,
            fingerprint = %model.fingerprint,
            "model registered"
        );

        self.models.insert(name.to_string(), model.clone());

        Ok(model)
    }

    fn apply_plugins(&self, name: &str, schema: &mut Schema) -> Result<(), RegistryError> {
        for (plugin, opts) in &self.plugins {
            schema
                .plugin(|schema, opts| plugin(schema, opts), opts)
                .map_err(|source| RegistryError::Plugin {
                    model: name.to_string(),
                    source,
                })?;
            tracing::debug!(model = name, "plugin applied");
        }

        Ok(())
    }

    /// Registered model names in registration order.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .field("plugins", &self.plugins.len())
            .field("options", &self.options)
            .finish()
    }
}

///
/// TESTS
///
