//! Shared test doubles: an in-memory store with canned results and a
//! close-tracking analytic cursor.

use crate::{
    index::{IndexDoc, MapContext, MapFn, RowEmitter},
    store::{AnalyticRows, IndexResult, IndexStore, QueryOptions, StoreError},
};
use serde_json::{Value, json};
use std::{
    cell::Cell,
    collections::{BTreeMap, VecDeque},
    rc::Rc,
    sync::Arc,
};

/// Mapping function emitting `(doc.type, {"n": 1})` for every document.
pub(crate) fn by_type_map() -> MapFn {
    Arc::new(
        |doc: &Value, _ctx: &MapContext, emitter: &mut dyn RowEmitter| {
            if let Some(kind) = doc.get("type").cloned() {
                emitter.emit(kind, json!({ "n": 1 }));
            }
        },
    )
}

///
/// MemoryStore
/// In-memory store double: real index-definition storage, canned view
/// results, canned analytic rows with injectable failures.
///

#[derive(Default)]
pub(crate) struct MemoryStore {
    pub indexes: BTreeMap<String, IndexDoc>,
    pub result: IndexResult,
    pub analytic_rows: Vec<Value>,
    pub fail_row_after: Option<usize>,
    pub fail_close: bool,
    pub analytic_opened: Rc<Cell<bool>>,
    pub analytic_closed: Rc<Cell<bool>>,
}

impl IndexStore for MemoryStore {
    fn get_index(&self, name: &str) -> Result<IndexDoc, StoreError> {
        self.indexes
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::IndexNotFound {
                name: name.to_string(),
            })
    }

    fn put_index(&mut self, name: &str, doc: IndexDoc) -> Result<(), StoreError> {
        self.indexes.insert(name.to_string(), doc);
        Ok(())
    }

    fn delete_index(&mut self, name: &str) -> Result<(), StoreError> {
        self.indexes
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::IndexNotFound {
                name: name.to_string(),
            })
    }

    fn query_index(
        &self,
        _name: &str,
        _view: &str,
        _options: &QueryOptions,
    ) -> Result<IndexResult, StoreError> {
        Ok(self.result.clone())
    }

    fn analytic_query(&self, _statement: &str) -> Result<Box<dyn AnalyticRows>, StoreError> {
        self.analytic_opened.set(true);
        self.analytic_closed.set(false);

        Ok(Box::new(VecRows {
            rows: self.analytic_rows.iter().cloned().collect(),
            served: 0,
            fail_row_after: self.fail_row_after,
            fail_close: self.fail_close,
            closed: Rc::clone(&self.analytic_closed),
        }))
    }
}

///
/// VecRows
///

pub(crate) struct VecRows {
    rows: VecDeque<Value>,
    served: usize,
    fail_row_after: Option<usize>,
    fail_close: bool,
    closed: Rc<Cell<bool>>,
}

impl AnalyticRows for VecRows {
    fn next_row(&mut self) -> Result<Option<Value>, StoreError> {
        if self.fail_row_after.is_some_and(|limit| self.served >= limit) {
            return Err(StoreError::Unavailable {
                message: "injected cursor failure".to_string(),
            });
        }

        let row = self.rows.pop_front();
        if row.is_some() {
            self.served += 1;
        }

        Ok(row)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closed.set(true);

        if self.fail_close {
            return Err(StoreError::Unavailable {
                message: "injected close failure".to_string(),
            });
        }

        Ok(())
    }
}
