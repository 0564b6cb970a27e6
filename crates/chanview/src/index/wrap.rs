use crate::{
    index::{IndexDoc, MapContext, MapFn, RowEmitter},
    meta::{self, SyncMeta},
};
use serde_json::Value;
use std::sync::Arc;

/// Wrap every view's mapping function with the channel-emission layer.
///
/// Raw definitions are stored untransformed; their rows carry no channel tag
/// and stay behind the administrator-only path.
pub fn wrap_views(doc: &mut IndexDoc) {
    if doc.is_raw() {
        return;
    }

    for view in doc.views.values_mut() {
        view.map = wrap_map(view.map.clone());
    }
}

/// Decorate one mapping function.
///
/// The wrapper skips metadata records and deleted revisions, hides the
/// `_sync` block from the inner function, exposes the revision and live
/// channel list on the metadata view, and tags every emission with the
/// channel list so results can be filtered per caller later.
fn wrap_map(inner: MapFn) -> MapFn {
    Arc::new(
        move |doc: &Value, ctx: &MapContext, emitter: &mut dyn RowEmitter| {
            let Some(sync) = SyncMeta::from_document(doc) else {
                return;
            };
            if meta::is_sync_key(&ctx.id) || sync.deleted {
                return;
            }

            // The inner function sees the document without its metadata
            // block; the caller's document is never mutated.
            let mut view = doc.clone();
            meta::strip_sync_property(&mut view);

            let inner_ctx = MapContext {
                id: ctx.id.clone(),
                rev: sync.rev,
                channels: sync.channels.clone(),
            };
            let mut tagging = TaggingEmitter {
                channels: &sync.channels,
                inner: emitter,
            };

            inner(&view, &inner_ctx, &mut tagging);
        },
    )
}

///
/// TaggingEmitter
/// Re-emits every entry with the value replaced by `[channels, value]`.
///

struct TaggingEmitter<'a> {
    channels: &'a [String],
    inner: &'a mut dyn RowEmitter,
}

impl RowEmitter for TaggingEmitter<'_> {
    fn emit(&mut self, key: Value, value: Value) {
        let channels = Value::Array(
            self.channels
                .iter()
                .map(|name| Value::String(name.clone()))
                .collect(),
        );

        self.inner.emit(key, Value::Array(vec![channels, value]));
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexOptions, IndexView};
    use serde_json::json;

    #[derive(Default)]
    struct CollectingEmitter {
        entries: Vec<(Value, Value)>,
    }

    impl RowEmitter for CollectingEmitter {
        fn emit(&mut self, key: Value, value: Value) {
            self.entries.push((key, value));
        }
    }

    /// Inner map emitting (type, {"n": 1}) for every document it sees.
    fn by_type_map() -> MapFn {
        Arc::new(
            |doc: &Value, _ctx: &MapContext, emitter: &mut dyn RowEmitter| {
                if let Some(kind) = doc.get("type").cloned() {
                    emitter.emit(kind, json!({ "n": 1 }));
                }
            },
        )
    }

    fn tagged_doc() -> Value {
        json!({
            "type": "msg",
            "_sync": {
                "rev": "1-x",
                "channels": { "A": null, "B": { "rev": "2-y" } },
            },
        })
    }

    #[test]
    fn wrapped_map_tags_emissions_with_live_channels() {
        let wrapped = wrap_map(by_type_map());
        let mut emitter = CollectingEmitter::default();

        wrapped(&tagged_doc(), &MapContext::new("doc1"), &mut emitter);

        assert_eq!(
            emitter.entries,
            vec![(json!("msg"), json!([["A"], { "n": 1 }]))],
            "removed channel B must not appear in the tag"
        );
    }

    #[test]
    fn inner_function_sees_stripped_document_and_filled_context() {
        // Echo what the inner function observes back out through emissions.
        let probe: MapFn = Arc::new(
            |doc: &Value, ctx: &MapContext, emitter: &mut dyn RowEmitter| {
                emitter.emit(
                    json!(doc.get(meta::SYNC_PROPERTY).is_some()),
                    json!({ "rev": ctx.rev, "channels": ctx.channels }),
                );
            },
        );

        let wrapped = wrap_map(probe);
        let mut emitter = CollectingEmitter::default();
        wrapped(&tagged_doc(), &MapContext::new("doc1"), &mut emitter);

        let (saw_sync, observed) = emitter.entries[0].clone();
        assert_eq!(saw_sync, json!(false), "metadata block must be hidden");

        // The observed value is itself channel-tagged by the wrapper.
        assert_eq!(
            observed,
            json!([["A"], { "rev": "1-x", "channels": ["A"] }])
        );
    }

    #[test]
    fn documents_without_metadata_emit_nothing() {
        let wrapped = wrap_map(by_type_map());
        let mut emitter = CollectingEmitter::default();

        wrapped(
            &json!({ "type": "msg" }),
            &MapContext::new("doc1"),
            &mut emitter,
        );

        assert!(emitter.entries.is_empty());
    }

    #[test]
    fn deleted_revisions_emit_nothing() {
        let wrapped = wrap_map(by_type_map());

        for sync in [
            json!({ "rev": "2-x", "deleted": true }),
            json!({ "rev": "2-x", "flags": 1 }),
        ] {
            let mut emitter = CollectingEmitter::default();
            wrapped(
                &json!({ "type": "msg", "_sync": sync }),
                &MapContext::new("doc1"),
                &mut emitter,
            );
            assert!(emitter.entries.is_empty());
        }
    }

    #[test]
    fn metadata_records_emit_nothing() {
        let wrapped = wrap_map(by_type_map());
        let mut emitter = CollectingEmitter::default();

        wrapped(
            &tagged_doc(),
            &MapContext::new("_sync:user:alice"),
            &mut emitter,
        );

        assert!(emitter.entries.is_empty());
    }

    #[test]
    fn wrapping_does_not_mutate_the_input_document() {
        let wrapped = wrap_map(by_type_map());
        let doc = tagged_doc();
        let before = doc.clone();

        let mut emitter = CollectingEmitter::default();
        wrapped(&doc, &MapContext::new("doc1"), &mut emitter);

        assert_eq!(doc, before, "the metadata block must survive mapping");
    }

    #[test]
    fn wrap_views_replaces_every_map_function() {
        let mut doc = IndexDoc::new();
        doc.insert_view("byType", IndexView::new(by_type_map()));

        let original = doc.views["byType"].map.clone();
        wrap_views(&mut doc);

        assert!(
            !Arc::ptr_eq(&doc.views["byType"].map, &original),
            "map function should have been wrapped"
        );

        let mut emitter = CollectingEmitter::default();
        (doc.views["byType"].map)(&tagged_doc(), &MapContext::new("doc1"), &mut emitter);
        assert_eq!(emitter.entries[0].1, json!([["A"], { "n": 1 }]));
    }

    #[test]
    fn wrap_views_leaves_raw_definitions_untouched() {
        let mut doc = IndexDoc::new();
        doc.insert_view("byType", IndexView::new(by_type_map()));
        doc.options = Some(IndexOptions { raw: true });

        let original = doc.views["byType"].map.clone();
        wrap_views(&mut doc);

        assert!(Arc::ptr_eq(&doc.views["byType"].map, &original));
    }
}
