use crate::{
    channel::{self, ChannelSet},
    error::{Error, ErrorOrigin},
    obs::{self, MetricsEvent},
    principal::Principal,
    store::{AnalyticRows, IndexStore},
};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Projection prefix a statement must carry to be channel-aware: it selects
/// each row's channel map under the `_channels` field, which is what makes
/// the result filterable per caller.
pub const CHANNELS_PROJECTION_PREFIX: &str = "SELECT _sync.channels as _channels,";

/// Per-row field holding the channel projection.
pub const CHANNELS_FIELD: &str = "_channels";

/// True when the statement projects per-row channels and may therefore be
/// run by restricted callers.
#[must_use]
pub fn is_channel_aware(statement: &str) -> bool {
    statement.starts_with(CHANNELS_PROJECTION_PREFIX)
}

///
/// AnalyticQueries
/// Registry of named analytic statements runnable through the filter.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize)]
pub struct AnalyticQueries(BTreeMap<String, String>);

impl AnalyticQueries {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Register a named statement, replacing any previous definition.
    pub fn register(&mut self, name: impl Into<String>, statement: impl Into<String>) {
        self.0.insert(name.into(), statement.into());
    }

    #[must_use]
    pub fn statement(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

///
/// AnalyticResult
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AnalyticResult {
    pub rows: Vec<Value>,
}

/// Execute one statement and filter its rows for the caller.
///
/// A statement without the channel projection cannot be filtered after the
/// fact, so restricted callers are refused up front. The row cursor is
/// drained and released whether or not the scan succeeds.
pub(crate) fn run_statement<S: IndexStore + ?Sized>(
    store: &S,
    statement: &str,
    principal: &Principal,
) -> Result<AnalyticResult, Error> {
    let restriction = principal.restriction();
    if restriction.is_some() && !is_channel_aware(statement) {
        obs::record(MetricsEvent::AccessDenied);
        return Err(Error::forbidden(
            ErrorOrigin::Analytic,
            "statement does not project channels; restricted callers may not run it",
        ));
    }

    let mut cursor = store.analytic_query(statement)?;
    let scanned = scan(cursor.as_mut(), restriction);
    let closed = cursor.close();

    let result = scanned?;
    closed.map_err(Error::from)?;

    Ok(result)
}

/// Drain the cursor, retaining rows visible to the caller in store order.
fn scan(
    rows: &mut dyn AnalyticRows,
    restriction: Option<&ChannelSet>,
) -> Result<AnalyticResult, Error> {
    let mut kept = Vec::new();
    let mut scanned: u64 = 0;

    while let Some(row) = rows.next_row()? {
        scanned += 1;

        let visible = match restriction {
            None => true,
            Some(channels) => row_is_visible(&row, channels),
        };
        if visible {
            kept.push(row);
        }
    }

    if restriction.is_some() {
        obs::record(MetricsEvent::AnalyticFiltered {
            scanned,
            returned: kept.len() as u64,
        });
    }

    Ok(AnalyticResult { rows: kept })
}

/// A row is visible when its live channel projection intersects the
/// caller's set. Rows without a usable projection stay hidden.
fn row_is_visible(row: &Value, visible: &ChannelSet) -> bool {
    let Some(projection) = row.get(CHANNELS_FIELD).and_then(Value::as_object) else {
        return false;
    };

    let live = projection
        .iter()
        .filter(|(_, status)| status.is_null())
        .map(|(name, _)| name.as_str());

    channel::channels_intersect(visible, live)
}

///
/// TESTS
///
