use crate::{
    channel::{self, ChannelSet},
    error::{Error, ErrorOrigin},
    obs::{self, MetricsEvent},
    principal::Principal,
    store::{IndexResult, IndexRow, QueryOptions},
};
use serde_json::Value;

/// Reduce the raw rows of a channel-tagged view to the subset the caller may
/// see.
///
/// Unrestricted callers get every row back untouched apart from metadata
/// stripping of embedded documents, which also makes the filter idempotent
/// on rows that carry no channel tag. For restricted callers each row's
/// value must decompose as `[channel-list, actual-value]`; the tag decides
/// retention and is never exposed in the output. `total_rows` reflects the
/// unfiltered index and passes through unchanged.
pub fn filter_index_result(
    input: IndexResult,
    principal: &Principal,
    options: &QueryOptions,
) -> Result<IndexResult, Error> {
    let Some(visible) = principal.restriction() else {
        return Ok(strip_rows(input));
    };

    // Aggregate rows carry no channel tag, so there is nothing safe to
    // return to a restricted caller. This is a caller defect, not an
    // ordinary access denial.
    if options.reduce {
        return Err(Error::invariant(
            ErrorOrigin::Filter,
            "aggregate result cannot be channel-filtered for a restricted caller",
        ));
    }

    let scanned = input.rows.len() as u64;
    let mut rows = Vec::with_capacity(input.rows.len());
    for row in input.rows {
        if let Some(row) = filter_row(row, visible)? {
            rows.push(row);
        }
    }

    obs::record(MetricsEvent::RowsFiltered {
        scanned,
        returned: rows.len() as u64,
    });

    Ok(IndexResult {
        total_rows: input.total_rows,
        rows,
    })
}

/// Pass-through path for unrestricted callers: row order and values are
/// preserved; embedded documents still lose their metadata block.
fn strip_rows(mut input: IndexResult) -> IndexResult {
    for row in &mut input.rows {
        row.strip_doc_meta();
    }

    input
}

/// Decompose one channel-tagged row and apply the visibility test.
fn filter_row(mut row: IndexRow, visible: &ChannelSet) -> Result<Option<IndexRow>, Error> {
    let Some((channels, value)) = split_tagged_value(&row.value) else {
        return Err(Error::invariant(
            ErrorOrigin::Filter,
            format!("row '{}' is not channel-tagged", row.id),
        ));
    };

    if !channel::channels_intersect(visible, channels.iter().copied()) {
        return Ok(None);
    }

    let value = value.clone();
    row.value = value;
    row.strip_doc_meta();

    Ok(Some(row))
}

/// A channel-tagged value is exactly `[channel-list, actual-value]` with
/// every channel a string. Anything else on the filtered path is a defect
/// in the index, not data to guess around.
fn split_tagged_value(value: &Value) -> Option<(Vec<&str>, &Value)> {
    let parts = value.as_array()?;
    let [tags, actual] = parts.as_slice() else {
        return None;
    };

    let tags = tags.as_array()?;
    let mut channels = Vec::with_capacity(tags.len());
    for tag in tags {
        channels.push(tag.as_str()?);
    }

    Some((channels, actual))
}

///
/// TESTS
///
