use crate::{
    error::{Error, ErrorClass, ErrorOrigin},
    index::IndexDoc,
    meta,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;

///
/// StoreError
/// Failures surfaced by the underlying indexed store.
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("index not found: {name}")]
    IndexNotFound { name: String },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::IndexNotFound { .. } => ErrorClass::NotFound,
            Self::Unavailable { .. } => ErrorClass::Unavailable,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::new(err.class(), ErrorOrigin::Store, err.to_string())
    }
}

///
/// QueryOptions
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct QueryOptions {
    /// Return each row's full document alongside the indexed value.
    pub include_docs: bool,

    /// Run the view's reduce instead of returning mapped rows.
    pub reduce: bool,
}

impl QueryOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_docs: false,
            reduce: false,
        }
    }

    #[must_use]
    pub const fn with_docs(mut self) -> Self {
        self.include_docs = true;
        self
    }

    #[must_use]
    pub const fn with_reduce(mut self) -> Self {
        self.reduce = true;
        self
    }
}

///
/// IndexRow
/// One raw row returned by the store. For a channel-aware view the value is
/// `[channel-list, actual-value]`; a reduced row carries the raw aggregate.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct IndexRow {
    pub key: Value,
    pub value: Value,
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Value>,
}

impl IndexRow {
    /// Drop the sync metadata block from the embedded document, if any.
    pub fn strip_doc_meta(&mut self) {
        if let Some(doc) = self.doc.as_mut() {
            meta::strip_sync_property(doc);
        }
    }
}

///
/// IndexResult
///
/// Raw result of executing one view: ordered rows plus the store's total.
/// The total reflects the unfiltered index and is passed through filtering
/// unchanged; callers must not assume it equals the filtered row count.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct IndexResult {
    pub total_rows: u64,
    pub rows: Vec<IndexRow>,
}

///
/// IndexStore
///
/// The consumed store boundary: index definition management, view execution,
/// and analytic query execution. Implementations do no access control and no
/// channel filtering; that is this crate's job.
///

pub trait IndexStore {
    fn get_index(&self, name: &str) -> Result<IndexDoc, StoreError>;

    fn put_index(&mut self, name: &str, doc: IndexDoc) -> Result<(), StoreError>;

    fn delete_index(&mut self, name: &str) -> Result<(), StoreError>;

    fn query_index(
        &self,
        name: &str,
        view: &str,
        options: &QueryOptions,
    ) -> Result<IndexResult, StoreError>;

    fn analytic_query(&self, statement: &str) -> Result<Box<dyn AnalyticRows>, StoreError>;
}

///
/// AnalyticRows
///
/// Cursor over analytic query rows. The scan must `close` the cursor when it
/// ends, on success or failure, to release the underlying query session.
///

pub trait AnalyticRows {
    /// Next row, or `None` once the cursor is exhausted.
    fn next_row(&mut self) -> Result<Option<Value>, StoreError>;

    /// Release the underlying query session.
    fn close(&mut self) -> Result<(), StoreError>;
}

///
/// TESTS
///
