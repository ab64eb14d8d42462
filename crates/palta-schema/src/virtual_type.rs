use serde_json::{Map, Value};
use std::{fmt, sync::Arc};

type GetterFn = dyn Fn(Value, &Value) -> Value + Send + Sync;
type SetterFn = dyn Fn(Value, &mut Value) -> Value + Send + Sync;

///
/// VirtualType
///
/// A named computed field. Not part of the storage tree; the document
/// runtime calls `apply_getters` / `apply_setters` with the document as
/// scope.
///
/// Both chains run from the most recently added function to the first one,
/// so the last registration sees the raw value first.
///

#[derive(Clone)]
pub struct VirtualType {
    path: String,
    getters: Vec<Arc<GetterFn>>,
    setters: Vec<Arc<SetterFn>>,
    options: Map<String, Value>,
}

impl VirtualType {
    #[must_use]
    pub fn new(path: impl Into<String>, options: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            getters: Vec::new(),
            setters: Vec::new(),
            options,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    /// Append a getter. Receives the current value and the document.
    pub fn get<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.getters.push(Arc::new(f));
        self
    }

    /// Append a setter. Receives the incoming value and the document, which
    /// it may write through.
    pub fn set<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Value, &mut Value) -> Value + Send + Sync + 'static,
    {
        self.setters.push(Arc::new(f));
        self
    }

    #[must_use]
    pub fn apply_getters(&self, value: Value, scope: &Value) -> Value {
        self.getters.iter().rev().fold(value, |v, getter| getter(v, scope))
    }

    pub fn apply_setters(&self, value: Value, scope: &mut Value) -> Value {
        self.setters.iter().rev().fold(value, |v, setter| setter(v, scope))
    }
}

impl fmt::Debug for VirtualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualType")
            .field("path", &self.path)
            .field("getters", &self.getters.len())
            .field("setters", &self.setters.len())
            .field("options", &self.options)
            .finish()
    }
}

///
/// TESTS
///
