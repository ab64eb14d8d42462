mod fingerprint;
mod index;
mod interpret;
mod positional;
mod tree;

pub use fingerprint::SchemaFingerprint;
pub use index::{FieldIndex, IndexDirection, IndexEntry, IndexKind, expire_after_seconds};
pub use interpret::interpret_as_type;
pub use positional::{Resolved, is_positional};
pub use tree::{Tree, TreeNode};

use crate::{
    SchemaError,
    definition::{Definition, is_nested_group},
    hook::{
        self, Document, HookError, HookQueue, Next, PostHook, PostNextHook, PreHook, QueryHooks,
    },
    method::{Method, Static},
    options::SchemaOptions,
    reserved,
    schema_type::{PathKind, SchemaType},
    types::Primitive,
    virtual_type::VirtualType,
};
use derive_more::Display;
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

///
/// PathClass
/// Classification returned by `Schema::path_type`.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum PathClass {
    #[display("real")]
    Real,

    #[display("virtual")]
    Virtual,

    #[display("nested")]
    Nested,

    #[display("adhocOrUndefined")]
    AdhocOrUndefined,
}

///
/// PathLookup
///

#[derive(Clone, Copy, Debug)]
pub enum PathLookup<'a> {
    Real(&'a SchemaType),
    Nested,
    NotFound,
}

impl<'a> PathLookup<'a> {
    #[must_use]
    pub const fn schema_type(self) -> Option<&'a SchemaType> {
        match self {
            Self::Real(schema_type) => Some(schema_type),
            _ => None,
        }
    }
}

///
/// Schema
///
/// Compiles a field-definition tree into flat typed paths and keeps the
/// virtuals, indexes, hooks, methods and statics declared on it.
///
/// Lookup caches (`required_paths`, `indexed_paths`, positional subpaths)
/// are filled lazily through `&mut self`, so a shared schema needs an
/// exclusive lock around writers.
///

#[derive(Clone, Debug)]
pub struct Schema {
    pub(crate) paths: IndexMap<String, SchemaType>,
    subpaths: IndexMap<String, Resolved>,
    single_nested_paths: IndexMap<String, SchemaType>,
    single_nested_groups: IndexSet<String>,
    pub(crate) nested: IndexSet<String>,
    virtuals: IndexMap<String, VirtualType>,
    tree: Tree,
    call_queue: HookQueue,
    query_hooks: QueryHooks,
    pub(crate) indexes: Vec<IndexEntry>,
    methods: IndexMap<String, Method>,
    statics: IndexMap<String, Static>,
    options: SchemaOptions,
    required_paths: Option<Vec<String>>,
    pub(crate) indexed_paths: Option<Vec<IndexEntry>>,
}

impl Schema {
    /// Compile `def` (an object, or null for an empty schema).
    ///
    /// Adds `_id` and the `id` virtual unless turned off, installs the
    /// built-in save middleware and the timestamp fields when enabled.
    pub fn new(def: impl Into<Definition>, options: SchemaOptions) -> Result<Self, SchemaError> {
        let mut schema = Self {
            paths: IndexMap::new(),
            subpaths: IndexMap::new(),
            single_nested_paths: IndexMap::new(),
            single_nested_groups: IndexSet::new(),
            nested: IndexSet::new(),
            virtuals: IndexMap::new(),
            tree: Tree::default(),
            call_queue: HookQueue::new(),
            query_hooks: QueryHooks::new(),
            indexes: Vec::new(),
            methods: IndexMap::new(),
            statics: IndexMap::new(),
            options,
            required_paths: None,
            indexed_paths: None,
        };

        let def = def.into();
        if !def.is_null() {
            schema.add(def, "")?;
        }

        let type_key = schema.options.type_key.clone();
        if schema.options.id_field
            && !schema.paths.contains_key("_id")
            && !schema.nested.contains("_id")
        {
            schema.add_path(
                "_id",
                Definition::object([
                    (type_key.as_str(), Definition::from(Primitive::ObjectId)),
                    ("auto", Definition::Value(Value::Bool(true))),
                ]),
            )?;
        }

        if schema.options.id && schema.tree.get("id").is_none() {
            schema.virtual_type("id")?.get(|_, doc| match doc.get("_id") {
                None | Some(Value::Null) => Value::Null,
                Some(Value::String(id)) => Value::String(id.clone()),
                Some(other) => Value::String(other.to_string()),
            });
        }

        for (event, hook) in hook::default_middleware() {
            schema.call_queue.pre(event, hook);
        }

        if let Some((created_at, updated_at)) = schema
            .options
            .timestamps
            .fields()
            .map(|(c, u)| (c.to_string(), u.to_string()))
        {
            let mut additions: IndexMap<String, Definition> =
                IndexMap::from([(updated_at.clone(), Primitive::Date.into())]);
            if !schema.paths.contains_key(&created_at) {
                additions.insert(created_at.clone(), Primitive::Date.into());
            }
            schema.add(Definition::Object(additions), "")?;
            schema
                .call_queue
                .pre("save", hook::timestamps_hook(created_at, updated_at));
        }

        tracing::debug!(
            paths = schema.paths.len(),
            nested = schema.nested.len(),
            virtuals = schema.virtuals.len(),
            "schema compiled"
        );

        Ok(schema)
    }

    // ------------------------------------------------------------------
    // Path registry
    // ------------------------------------------------------------------

    /// Merge the keys of an object definition under `prefix`.
    ///
    /// Untyped non-empty objects become nested groups and are walked
    /// recursively; everything else is registered as a leaf. Keys handled
    /// before a failing one stay registered.
    pub fn add(
        &mut self,
        def: impl Into<Definition>,
        prefix: &str,
    ) -> Result<&mut Self, SchemaError> {
        match def.into() {
            Definition::Object(fields) => self.add_object(&fields, prefix)?,
            _ => return Err(SchemaError::invalid_path(prefix.trim_end_matches('.'))),
        }

        Ok(self)
    }

    fn add_object(
        &mut self,
        fields: &IndexMap<String, Definition>,
        prefix: &str,
    ) -> Result<(), SchemaError> {
        for (key, def) in fields {
            let full = format!("{prefix}{key}");

            match def {
                def if def.is_null() => return Err(SchemaError::invalid_path(full)),

                Definition::Array(items) if items.len() == 1 && items[0].is_null() => {
                    return Err(SchemaError::invalid_array_path(full));
                }

                Definition::Object(group)
                    if !group.is_empty() && is_nested_group(group, &self.options.type_key) =>
                {
                    if let Some(existing) = self.paths.get(&full) {
                        return Err(SchemaError::ConflictingPath {
                            path: full.clone(),
                            parent: full,
                            existing: existing.instance().to_string(),
                        });
                    }
                    self.nested.insert(full.clone());
                    self.add_object(group, &format!("{full}."))?;
                }

                def => {
                    self.add_path(&full, def.clone())?;
                }
            }
        }

        Ok(())
    }

    /// Register a single leaf at the dotted path `name`.
    pub fn add_path(
        &mut self,
        name: &str,
        def: impl Into<Definition>,
    ) -> Result<&SchemaType, SchemaError> {
        let def = def.into();
        reserved::validate_path_name(name)?;

        if self.nested.contains(name)
            || self.virtuals.contains_key(name)
            || matches!(self.tree.get(name), Some(TreeNode::Branch(_) | TreeNode::Virtual))
        {
            return Err(self.conflict(name, name));
        }
        self.tree
            .insert_field(name, def.clone())
            .map_err(|parent| self.conflict(name, &parent))?;

        let schema_type = interpret_as_type(name, &def, &self.options)?;
        tracing::trace!(path = name, kind = schema_type.kind.name(), "path registered");

        // grandchildren of an embedded schema are addressable directly
        if let PathKind::Embedded(child) = &schema_type.kind {
            let prefix = format!("{name}.");
            self.single_nested_paths
                .retain(|path, _| !path.starts_with(&prefix));
            self.single_nested_groups
                .retain(|group| !group.starts_with(&prefix));

            for (path, child_type) in child.paths.iter().chain(&child.single_nested_paths) {
                self.single_nested_paths
                    .insert(format!("{prefix}{path}"), child_type.clone());
            }
            for group in child.nested.iter().chain(&child.single_nested_groups) {
                self.single_nested_groups.insert(format!("{prefix}{group}"));
            }
        }

        self.subpaths.clear();
        self.indexed_paths = None;

        let (index, _) = self.paths.insert_full(name.to_string(), schema_type);

        Ok(&self.paths[index])
    }

    fn conflict(&self, path: &str, parent: &str) -> SchemaError {
        let existing = match self.paths.get(parent) {
            Some(schema_type) => schema_type.instance(),
            None if self.virtuals.contains_key(parent) => "a virtual",
            None => "a nested path",
        };

        SchemaError::ConflictingPath {
            path: path.to_string(),
            parent: parent.to_string(),
            existing: existing.to_string(),
        }
    }

    /// Look `name` up: flat paths, then nested groups, then positional
    /// resolution for paths such as `comments.0.title`.
    pub fn path(&mut self, name: &str) -> PathLookup<'_> {
        if self.direct(name).is_none() && !self.has_nested_group(name) && is_positional(name) {
            self.resolve_positional(name);
        }

        if let Some(schema_type) = self.direct(name) {
            PathLookup::Real(schema_type)
        } else if self.has_nested_group(name)
            || matches!(self.subpaths.get(name), Some(Resolved::Nested))
        {
            PathLookup::Nested
        } else {
            PathLookup::NotFound
        }
    }

    // direct
    // compiled paths, cached positional hits and embedded grandchildren
    pub(crate) fn direct(&self, name: &str) -> Option<&SchemaType> {
        self.paths
            .get(name)
            .or_else(|| match self.subpaths.get(name) {
                Some(Resolved::Real(schema_type)) => Some(schema_type),
                _ => None,
            })
            .or_else(|| self.single_nested_paths.get(name))
    }

    // nested groups declared here or inside an embedded schema
    fn has_nested_group(&self, name: &str) -> bool {
        self.nested.contains(name) || self.single_nested_groups.contains(name)
    }

    fn resolve_positional(&mut self, name: &str) -> PathClass {
        if let Some(resolved) = self.subpaths.get(name) {
            return resolved.class();
        }

        let resolved = positional::resolve(self, name);
        let class = resolved.class();
        self.subpaths.insert(name.to_string(), resolved);

        class
    }

    /// Classify `name` as a real path, a virtual, a nested group or
    /// neither. Positional paths are resolved and cached.
    pub fn path_type(&mut self, name: &str) -> PathClass {
        if self.paths.contains_key(name) {
            PathClass::Real
        } else if self.virtuals.contains_key(name) {
            PathClass::Virtual
        } else if self.has_nested_group(name) {
            PathClass::Nested
        } else if self.direct(name).is_some() {
            PathClass::Real
        } else if is_positional(name) {
            self.resolve_positional(name)
        } else {
            PathClass::AdhocOrUndefined
        }
    }

    /// Visit every compiled path in registration order.
    pub fn each_path<F>(&self, mut f: F)
    where
        F: FnMut(&str, &SchemaType),
    {
        for (path, schema_type) in &self.paths {
            f(path, schema_type);
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = (&str, &SchemaType)> {
        self.paths.iter().map(|(path, ty)| (path.as_str(), ty))
    }

    #[must_use]
    pub fn is_nested(&self, name: &str) -> bool {
        self.nested.contains(name)
    }

    pub fn nested_paths(&self) -> impl Iterator<Item = &str> {
        self.nested.iter().map(String::as_str)
    }

    /// Paths marked required. Cached; `invalidate` forces a recount.
    pub fn required_paths(&mut self, invalidate: bool) -> &[String] {
        if invalidate || self.required_paths.is_none() {
            self.required_paths = Some(
                self.paths
                    .iter()
                    .filter(|(_, ty)| ty.is_required())
                    .map(|(path, _)| path.clone())
                    .collect(),
            );
        }

        self.required_paths.as_deref().unwrap_or_default()
    }

    /// Whether `path` or any of its ancestors is a mixed path.
    #[must_use]
    pub fn has_mixed_parent(&self, path: &str) -> bool {
        path.match_indices('.')
            .map(|(i, _)| &path[..i])
            .chain(std::iter::once(path))
            .any(|ancestor| self.paths.get(ancestor).is_some_and(SchemaType::is_mixed))
    }

    // ------------------------------------------------------------------
    // Virtuals
    // ------------------------------------------------------------------

    /// Return the virtual at `name`, creating it on first use.
    pub fn virtual_type(&mut self, name: &str) -> Result<&mut VirtualType, SchemaError> {
        self.virtual_type_with_options(name, Map::new())
    }

    /// As `virtual_type`; `options` only apply when the virtual is new.
    pub fn virtual_type_with_options(
        &mut self,
        name: &str,
        options: Map<String, Value>,
    ) -> Result<&mut VirtualType, SchemaError> {
        if !self.virtuals.contains_key(name) {
            self.tree
                .insert_virtual(name)
                .map_err(|parent| self.conflict(name, &parent))?;
        }

        Ok(self
            .virtuals
            .entry(name.to_string())
            .or_insert_with(|| VirtualType::new(name, options)))
    }

    #[must_use]
    pub fn virtual_path(&self, name: &str) -> Option<&VirtualType> {
        self.virtuals.get(name)
    }

    pub fn virtuals(&self) -> impl Iterator<Item = &VirtualType> {
        self.virtuals.values()
    }

    // ------------------------------------------------------------------
    // Hooks
    // ------------------------------------------------------------------

    /// Queue a method call replayed against the compiled model.
    pub fn queue(&mut self, method: impl Into<String>, args: Vec<Value>) -> &mut Self {
        self.call_queue.queue(method, args);
        self
    }

    pub fn pre<F>(&mut self, event: &str, f: F) -> &mut Self
    where
        F: Fn(&mut dyn Document) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks_for(event).pre(event, PreHook::new(f));
        self
    }

    /// Synchronous post hook.
    pub fn post<F>(&mut self, event: &str, f: F) -> &mut Self
    where
        F: Fn(&dyn Document) + Send + Sync + 'static,
    {
        self.hooks_for(event).on(event, PostHook::new(f));
        self
    }

    /// Post hook that completes through its continuation.
    pub fn post_with_next<F>(&mut self, event: &str, f: F) -> &mut Self
    where
        F: Fn(&dyn Document, Next) + Send + Sync + 'static,
    {
        self.hooks_for(event).post(event, PostNextHook::new(f));
        self
    }

    fn hooks_for(&mut self, event: &str) -> &mut HookQueue {
        if hook::is_query_event(event) {
            &mut self.query_hooks
        } else {
            &mut self.call_queue
        }
    }

    #[must_use]
    pub const fn call_queue(&self) -> &HookQueue {
        &self.call_queue
    }

    #[must_use]
    pub const fn query_hooks(&self) -> &QueryHooks {
        &self.query_hooks
    }

    // ------------------------------------------------------------------
    // Methods & statics
    // ------------------------------------------------------------------

    pub fn method<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut dyn Document, &[Value]) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Method::new(f));
        self
    }

    pub fn static_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        self.statics.insert(name.into(), Static::new(f));
        self
    }

    #[must_use]
    pub const fn methods(&self) -> &IndexMap<String, Method> {
        &self.methods
    }

    #[must_use]
    pub const fn statics(&self) -> &IndexMap<String, Static> {
        &self.statics
    }

    // ------------------------------------------------------------------
    // Options, plugins & diagnostics
    // ------------------------------------------------------------------

    pub fn set(&mut self, key: &str, value: Value) -> Result<&mut Self, SchemaError> {
        self.options.set(key, value)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.options.get(key)
    }

    #[must_use]
    pub const fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Run `plugin` against this schema right away.
    pub fn plugin<F>(&mut self, plugin: F, opts: &Value) -> Result<&mut Self, SchemaError>
    where
        F: FnOnce(&mut Self, &Value) -> Result<(), SchemaError>,
    {
        plugin(&mut *self, opts)?;
        Ok(self)
    }

    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The tree mirror as JSON.
    #[must_use]
    pub fn tree_value(&self) -> Value {
        self.tree.to_value()
    }
}
