use serde_json::Value;

/// Reserved document property holding the sync metadata block.
pub const SYNC_PROPERTY: &str = "_sync";

/// Key prefix marking documents that are themselves sync metadata records.
pub const SYNC_KEY_PREFIX: &str = "_sync:";

/// Bit in the metadata `flags` field marking a deleted revision.
pub const FLAG_DELETED: u64 = 0x1;

///
/// SyncMeta
///
/// The slice of a document's sync metadata block this crate reads: the
/// revision id, deletion state, and the live channel memberships recorded at
/// save time. Channel map entries whose marker is `null` or `false` are
/// live; anything else records a removal.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SyncMeta {
    pub rev: String,
    pub deleted: bool,
    pub channels: Vec<String>,
}

impl SyncMeta {
    /// Parse the metadata block out of a raw document.
    ///
    /// Returns `None` when the document carries no `_sync` object; such a
    /// document contributes no index entries.
    #[must_use]
    pub fn from_document(doc: &Value) -> Option<Self> {
        let sync = doc.get(SYNC_PROPERTY)?.as_object()?;

        let rev = sync
            .get("rev")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let flags = sync.get("flags").and_then(Value::as_u64).unwrap_or(0);
        let deleted = sync
            .get("deleted")
            .and_then(Value::as_bool)
            .unwrap_or(false)
            || flags & FLAG_DELETED != 0;

        let channels = sync
            .get("channels")
            .and_then(Value::as_object)
            .map_or_else(Vec::new, |map| {
                map.iter()
                    .filter(|(_, marker)| is_live_marker(marker))
                    .map(|(name, _)| name.clone())
                    .collect()
            });

        Some(Self {
            rev,
            deleted,
            channels,
        })
    }
}

/// A channel membership is live when its removal marker is `null` or `false`.
fn is_live_marker(marker: &Value) -> bool {
    matches!(marker, Value::Null | Value::Bool(false))
}

/// Remove the sync metadata block from a document, if present.
pub fn strip_sync_property(doc: &mut Value) {
    if let Some(map) = doc.as_object_mut() {
        map.remove(SYNC_PROPERTY);
    }
}

/// True when a document key names a sync metadata record.
#[must_use]
pub fn is_sync_key(id: &str) -> bool {
    id.starts_with(SYNC_KEY_PREFIX)
}

///
/// TESTS
///
