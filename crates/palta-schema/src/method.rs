use crate::hook::{Document, HookError};
use serde_json::Value;
use std::{fmt, sync::Arc};

type MethodFn = dyn Fn(&mut dyn Document, &[Value]) -> Result<Value, HookError> + Send + Sync;
type StaticFn = dyn Fn(&[Value]) -> Result<Value, HookError> + Send + Sync;

///
/// Method
/// Instance method copied onto compiled document types.
///

#[derive(Clone)]
pub struct Method(Arc<MethodFn>);

impl Method {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Document, &[Value]) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, doc: &mut dyn Document, args: &[Value]) -> Result<Value, HookError> {
        (self.0)(doc, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Method(..)")
    }
}

///
/// Static
/// Function copied onto the compiled model type.
///

#[derive(Clone)]
pub struct Static(Arc<StaticFn>);

impl Static {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, HookError> {
        (self.0)(args)
    }
}

impl fmt::Debug for Static {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Static(..)")
    }
}
