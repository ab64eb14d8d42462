use crate::ThisError;
use serde_json::Value;
use std::{fmt, sync::Arc};

/// Events whose hooks belong to the query layer rather than to documents.
pub const QUERY_EVENTS: [&str; 6] = [
    "count",
    "find",
    "findOne",
    "findOneAndRemove",
    "findOneAndUpdate",
    "update",
];

#[must_use]
pub fn is_query_event(event: &str) -> bool {
    QUERY_EVENTS.contains(&event)
}

///
/// HookError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum HookError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("saving sub-documents failed: {0}")]
    Cascade(String),

    #[error("{0}")]
    Callback(String),
}

///
/// Document
///
/// The slice of a document runtime that hooks, methods and the built-in
/// middleware need. Implemented by the runtime that replays the queue.
///

pub trait Document {
    fn is_new(&self) -> bool;

    /// Sub-documents skip the built-in validation trigger.
    fn is_subdocument(&self) -> bool {
        false
    }

    /// Mirrors the owning schema's `validateBeforeSave` option.
    fn validate_before_save(&self) -> bool {
        true
    }

    fn get(&self, path: &str) -> Option<&Value>;

    fn set(&mut self, path: &str, value: Value);

    fn validate(&mut self) -> Result<(), HookError>;

    /// Persist every owned sub-document.
    fn save_subdocuments(&mut self) -> Result<(), HookError>;
}

pub type HookFn = dyn Fn(&mut dyn Document) -> Result<(), HookError> + Send + Sync;
pub type PostFn = dyn Fn(&dyn Document) + Send + Sync;
pub type PostNextFn = dyn Fn(&dyn Document, Next) + Send + Sync;

/// Continuation handed to asynchronous post hooks.
pub type Next = Box<dyn FnOnce(Result<(), HookError>) + Send>;

///
/// PreHook
///

#[derive(Clone)]
pub struct PreHook(Arc<HookFn>);

impl PreHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Document) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, doc: &mut dyn Document) -> Result<(), HookError> {
        (self.0)(doc)
    }
}

impl fmt::Debug for PreHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PreHook(..)")
    }
}

///
/// PostHook
/// Synchronous listener; fires after the event without a continuation.
///

#[derive(Clone)]
pub struct PostHook(Arc<PostFn>);

impl PostHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn Document) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, doc: &dyn Document) {
        (self.0)(doc);
    }
}

impl fmt::Debug for PostHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PostHook(..)")
    }
}

///
/// PostNextHook
/// Asynchronous post hook; completes by invoking `next`.
///

#[derive(Clone)]
pub struct PostNextHook(Arc<PostNextFn>);

impl PostNextHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn Document, Next) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, doc: &dyn Document, next: Next) {
        (self.0)(doc, next);
    }
}

impl fmt::Debug for PostNextHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PostNextHook(..)")
    }
}

///
/// HookEntry
///

#[derive(Clone, Debug)]
pub enum HookEntry {
    /// An arbitrary method call replayed against the compiled model.
    Queued { method: String, args: Vec<Value> },
    Pre { event: String, hook: PreHook },
    On { event: String, hook: PostHook },
    Post { event: String, hook: PostNextHook },
}

impl HookEntry {
    /// `"queue"`, `"pre"`, `"on"` or `"post"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Queued { .. } => "queue",
            Self::Pre { .. } => "pre",
            Self::On { .. } => "on",
            Self::Post { .. } => "post",
        }
    }

    /// The hooked event, or the queued method name.
    #[must_use]
    pub fn event(&self) -> &str {
        match self {
            Self::Queued { method, .. } => method,
            Self::Pre { event, .. } | Self::On { event, .. } | Self::Post { event, .. } => event,
        }
    }
}

///
/// HookQueue
///
/// Ordered list of entries; never executed here. `QueryHooks` reuses the
/// same shape for query-level events.
///

#[derive(Clone, Debug, Default)]
pub struct HookQueue {
    entries: Vec<HookEntry>,
}

impl HookQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn queue(&mut self, method: impl Into<String>, args: Vec<Value>) {
        self.entries.push(HookEntry::Queued {
            method: method.into(),
            args,
        });
    }

    pub fn pre(&mut self, event: impl Into<String>, hook: PreHook) {
        self.entries.push(HookEntry::Pre {
            event: event.into(),
            hook,
        });
    }

    pub fn on(&mut self, event: impl Into<String>, hook: PostHook) {
        self.entries.push(HookEntry::On {
            event: event.into(),
            hook,
        });
    }

    pub fn post(&mut self, event: impl Into<String>, hook: PostNextHook) {
        self.entries.push(HookEntry::Post {
            event: event.into(),
            hook,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &HookEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pre hooks for `event`, in the order they must run.
    pub fn pre_hooks<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a PreHook> + 'a {
        self.entries.iter().filter_map(move |entry| match entry {
            HookEntry::Pre { event: e, hook } if e == event => Some(hook),
            _ => None,
        })
    }

    /// Post entries (`On` and `Post`) for `event`, in declaration order.
    pub fn post_hooks<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a HookEntry> + 'a {
        self.entries.iter().filter(move |entry| {
            matches!(entry, HookEntry::On { event: e, .. } | HookEntry::Post { event: e, .. } if e == event)
        })
    }
}

///
/// QueryHooks
///
/// Pre/post hooks for `QUERY_EVENTS`, kept out of the document queue.
/// The query runtime applies every pre hook in declaration order, runs the
/// query, then every post hook in declaration order.
///

pub type QueryHooks = HookQueue;

// default_middleware
// fixed entries at the head of every schema's queue
pub(crate) fn default_middleware() -> [(&'static str, PreHook); 2] {
    [
        (
            "save",
            PreHook::new(|doc| {
                if doc.is_subdocument() || !doc.validate_before_save() {
                    return Ok(());
                }
                doc.validate()
            }),
        ),
        ("save", PreHook::new(|doc| doc.save_subdocuments())),
    ]
}

// timestamps_hook
pub(crate) fn timestamps_hook(created_at: String, updated_at: String) -> PreHook {
    PreHook::new(move |doc| {
        let now = Value::String(chrono::Utc::now().to_rfc3339());

        if doc.get(&created_at).is_none_or(Value::is_null) {
            doc.set(&created_at, now.clone());
        }

        let updated = if doc.is_new() {
            doc.get(&created_at).cloned().unwrap_or(now)
        } else {
            now
        };
        doc.set(&updated_at, updated);

        Ok(())
    })
}

///
/// TESTS
///
