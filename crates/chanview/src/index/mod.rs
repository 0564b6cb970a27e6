mod wrap;

pub use wrap::wrap_views;

use serde_json::Value;
use std::{collections::BTreeMap, fmt, sync::Arc};

/// Reserved name prefix marking an index as system-internal.
pub const INTERNAL_INDEX_PREFIX: &str = "sync_";

/// Built-in internal index docs.
pub const INDEX_DOC_CORE: &str = "sync_core";
pub const INDEX_DOC_HOUSEKEEPING: &str = "sync_housekeeping";

/// Views served by the built-in internal index docs.
pub const VIEW_PRINCIPALS: &str = "principals";
pub const VIEW_CHANNELS: &str = "channels";
pub const VIEW_ACCESS: &str = "access";
pub const VIEW_ROLE_ACCESS: &str = "role_access";
pub const VIEW_ALL_DOCS: &str = "all_docs";
pub const VIEW_SESSIONS: &str = "sessions";

/// True when an index name is reserved for system use.
#[must_use]
pub fn is_internal_index(name: &str) -> bool {
    name.starts_with(INTERNAL_INDEX_PREFIX)
}

///
/// RowEmitter
///
/// Sink for the index entries produced by a mapping function. The store
/// supplies the terminal emitter during index build; the channel wrapper
/// decorates it.
///

pub trait RowEmitter {
    fn emit(&mut self, key: Value, value: Value);
}

///
/// MapContext
///
/// Read-only metadata view passed to a mapping function alongside the
/// document. The store fills in `id`; the channel wrapper fills in `rev` and
/// `channels` before invoking the inner function.
///

#[derive(Clone, Debug, Default)]
pub struct MapContext {
    pub id: String,
    pub rev: String,
    pub channels: Vec<String>,
}

impl MapContext {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// A view mapping function, invoked by the store once per document during
/// index build.
pub type MapFn = Arc<dyn Fn(&Value, &MapContext, &mut dyn RowEmitter) + Send + Sync>;

///
/// IndexView
///

#[derive(Clone)]
pub struct IndexView {
    pub map: MapFn,

    /// Named reduce understood by the store (e.g. `_count`), if any.
    pub reduce: Option<String>,
}

impl IndexView {
    #[must_use]
    pub fn new(map: MapFn) -> Self {
        Self { map, reduce: None }
    }

    #[must_use]
    pub fn with_reduce(map: MapFn, reduce: impl Into<String>) -> Self {
        Self {
            map,
            reduce: Some(reduce.into()),
        }
    }
}

impl fmt::Debug for IndexView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexView")
            .field("map", &"<map fn>")
            .field("reduce", &self.reduce)
            .finish()
    }
}

///
/// IndexOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IndexOptions {
    /// Store the definition untransformed. Its rows carry no channel tag, so
    /// they are reachable only through the administrator-only internal path,
    /// never through the filtered-query path.
    pub raw: bool,
}

///
/// IndexDoc
/// A name-keyed set of views plus doc-level options.
///

#[derive(Clone, Debug, Default)]
pub struct IndexDoc {
    pub views: BTreeMap<String, IndexView>,
    pub options: Option<IndexOptions>,
}

impl IndexDoc {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a view under `name`.
    pub fn insert_view(&mut self, name: impl Into<String>, view: IndexView) {
        self.views.insert(name.into(), view);
    }

    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.options.is_some_and(|options| options.raw)
    }
}

///
/// TESTS
///
