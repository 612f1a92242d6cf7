// Surface store - owns every component graph and applies protocol operations
//
// A Surface is one addressable UI tree plus its shared data model, tied to one
// conversational turn. The store is the only code that mutates surfaces; the
// renderer resolves components fresh on every pass and never holds one across
// an apply, since `surfaceUpdate` can replace a node in place.
//
// Per-conversation isolation: one `SurfaceStore` per session id, held in
// `SessionStores`. Operations within a session are applied in stream order
// under a single owner, so each apply is atomic for the fields it touches and
// an aborted stream just leaves the surfaces at the last applied operation.

use crate::protocol::{ComponentSpec, SurfaceOp};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// One renderable UI tree and its shared data
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pub id: String,

    /// Set by `beginRendering`; until then the surface holds components but
    /// nothing is drawn
    pub root_component_id: Option<String>,

    /// Catalog name from `beginRendering`; `None` means the standard catalog
    pub catalog: Option<String>,

    /// Keyed component lookup; insertion order is irrelevant, `children`
    /// references define the tree
    pub components: HashMap<String, ComponentSpec>,

    /// Shared data model, mutated only by shallow merges
    pub data_model: serde_json::Map<String, Value>,
}

impl Surface {
    fn new(id: &str) -> Self {
        Surface {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Resolve a component by id within this surface
    pub fn component(&self, id: &str) -> Option<&ComponentSpec> {
        self.components.get(id)
    }

    /// A surface becomes renderable once `beginRendering` named its root
    pub fn is_renderable(&self) -> bool {
        self.root_component_id.is_some()
    }
}

/// All surfaces of one conversation, mutated exclusively through [`apply`].
///
/// [`apply`]: SurfaceStore::apply
#[derive(Debug, Default)]
pub struct SurfaceStore {
    surfaces: HashMap<String, Surface>,
    /// Ids of deleted surfaces. References to these stay "not found" instead
    /// of lazily re-creating an empty surface.
    deleted: HashSet<String>,
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one protocol operation.
    ///
    /// Unknown surface ids are created lazily on first reference, except for
    /// `deleteSurface` (a no-op) and any operation addressing an id that was
    /// already deleted (dropped with a warning).
    pub fn apply(&mut self, op: SurfaceOp) {
        let surface_id = op.surface_id();

        if self.deleted.contains(surface_id) {
            tracing::warn!(surface_id, "dropping operation addressed to deleted surface");
            return;
        }

        match op {
            SurfaceOp::SurfaceUpdate {
                surface_id,
                components,
            } => {
                let surface = self.surface_entry(&surface_id);
                for component in components {
                    // Upsert: same id replaces wholesale, no property merging.
                    // Replaying the same update is therefore idempotent.
                    surface.components.insert(component.id.clone(), component);
                }
            }

            SurfaceOp::DataModelUpdate { surface_id, data } => {
                let surface = self.surface_entry(&surface_id);
                // Shallow merge: listed keys overwrite, unrelated keys survive
                for (key, value) in data {
                    surface.data_model.insert(key, value);
                }
            }

            SurfaceOp::BeginRendering {
                surface_id,
                root_component_id,
                catalog,
            } => {
                let surface = self.surface_entry(&surface_id);
                surface.root_component_id = Some(root_component_id);
                surface.catalog = catalog;
            }

            SurfaceOp::DeleteSurface { surface_id } => {
                // Unknown id: no-op. Known id: remove and remember, so later
                // references report "not found" rather than resurrecting it.
                if self.surfaces.remove(&surface_id).is_some() {
                    self.deleted.insert(surface_id);
                }
            }
        }
    }

    pub fn get_surface(&self, id: &str) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    fn surface_entry(&mut self, id: &str) -> &mut Surface {
        self.surfaces
            .entry(id.to_string())
            .or_insert_with(|| Surface::new(id))
    }
}

/// Per-session store shards.
///
/// Conversations share nothing: each session id owns its own `SurfaceStore`,
/// created on first reference and evicted when the owning conversation ends.
/// An explicit object rather than process-global state, so tests and request
/// handlers receive exactly the shard they operate on.
#[derive(Debug, Default)]
pub struct SessionStores {
    shards: HashMap<String, SurfaceStore>,
}

impl SessionStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store for a session, created empty on first use
    pub fn shard_mut(&mut self, session_id: &str) -> &mut SurfaceStore {
        self.shards.entry(session_id.to_string()).or_default()
    }

    pub fn shard(&self, session_id: &str) -> Option<&SurfaceStore> {
        self.shards.get(session_id)
    }

    /// Drop a session's surfaces (conversation ended)
    pub fn evict(&mut self, session_id: &str) {
        self.shards.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builder;
    use serde_json::json;

    fn data(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_surface_update_lazily_creates_surface() {
        let mut store = SurfaceStore::new();
        store.apply(builder::surface_update("s1", vec![builder::text("t1", "Hi")]));

        let surface = store.get_surface("s1").unwrap();
        assert_eq!(surface.component("t1").unwrap().prop_str("text"), Some("Hi"));
        assert!(!surface.is_renderable());
    }

    #[test]
    fn test_surface_update_replaces_not_merges() {
        let mut store = SurfaceStore::new();
        store.apply(builder::surface_update(
            "s1",
            vec![builder::card("a", "First", &["x"])],
        ));
        // Second version has different properties and no children; it must
        // replace the first wholesale
        store.apply(builder::surface_update("s1", vec![builder::text("a", "Second")]));

        let component = store.get_surface("s1").unwrap().component("a").unwrap();
        assert_eq!(component.kind, "Text");
        assert_eq!(component.prop_str("text"), Some("Second"));
        assert!(component.prop_str("title").is_none());
        assert!(component.children.is_empty());
    }

    #[test]
    fn test_surface_update_is_idempotent() {
        let mut store = SurfaceStore::new();
        let op = builder::surface_update("s1", vec![builder::text("t1", "Hi")]);
        store.apply(op.clone());
        store.apply(op);

        let surface = store.get_surface("s1").unwrap();
        assert_eq!(surface.components.len(), 1);
    }

    #[test]
    fn test_update_leaves_unlisted_components_untouched() {
        let mut store = SurfaceStore::new();
        store.apply(builder::surface_update(
            "s1",
            vec![builder::text("t1", "one"), builder::text("t2", "two")],
        ));
        store.apply(builder::surface_update("s1", vec![builder::text("t1", "ONE")]));

        let surface = store.get_surface("s1").unwrap();
        assert_eq!(surface.component("t1").unwrap().prop_str("text"), Some("ONE"));
        assert_eq!(surface.component("t2").unwrap().prop_str("text"), Some("two"));
    }

    #[test]
    fn test_data_model_update_shallow_merges() {
        let mut store = SurfaceStore::new();
        store.apply(builder::data_model_update("s1", data(json!({"x": 1}))));
        store.apply(builder::data_model_update("s1", data(json!({"y": 2}))));

        let model = &store.get_surface("s1").unwrap().data_model;
        assert_eq!(model.get("x"), Some(&json!(1)));
        assert_eq!(model.get("y"), Some(&json!(2)));
    }

    #[test]
    fn test_data_model_update_overwrites_listed_keys() {
        let mut store = SurfaceStore::new();
        store.apply(builder::data_model_update("s1", data(json!({"x": 1, "y": 2}))));
        store.apply(builder::data_model_update("s1", data(json!({"x": 9}))));

        let model = &store.get_surface("s1").unwrap().data_model;
        assert_eq!(model.get("x"), Some(&json!(9)));
        assert_eq!(model.get("y"), Some(&json!(2)));
    }

    #[test]
    fn test_begin_rendering_sets_root_and_catalog() {
        let mut store = SurfaceStore::new();
        store.apply(SurfaceOp::BeginRendering {
            surface_id: "s1".into(),
            root_component_id: "c1".into(),
            catalog: Some("compact".into()),
        });

        let surface = store.get_surface("s1").unwrap();
        assert!(surface.is_renderable());
        assert_eq!(surface.root_component_id.as_deref(), Some("c1"));
        assert_eq!(surface.catalog.as_deref(), Some("compact"));
    }

    #[test]
    fn test_delete_unknown_surface_is_noop() {
        let mut store = SurfaceStore::new();
        store.apply(builder::delete_surface("ghost"));
        assert!(store.get_surface("ghost").is_none());

        // Not tombstoned either: a later update may still create it
        store.apply(builder::surface_update("ghost", vec![builder::text("t", "x")]));
        assert!(store.get_surface("ghost").is_some());
    }

    #[test]
    fn test_deleted_surface_stays_not_found() {
        let mut store = SurfaceStore::new();
        store.apply(builder::surface_update("s1", vec![builder::text("t1", "Hi")]));
        store.apply(builder::delete_surface("s1"));
        assert!(store.get_surface("s1").is_none());

        // References after deletion must not re-create the surface
        store.apply(builder::surface_update("s1", vec![builder::text("t1", "Hi")]));
        store.apply(builder::data_model_update("s1", data(json!({"x": 1}))));
        assert!(store.get_surface("s1").is_none());
    }

    #[test]
    fn test_sessions_do_not_share_surfaces() {
        let mut sessions = SessionStores::new();
        sessions
            .shard_mut("alice")
            .apply(builder::surface_update("s1", vec![builder::text("t1", "A")]));

        assert!(sessions.shard("alice").unwrap().get_surface("s1").is_some());
        assert!(sessions.shard("bob").is_none());

        sessions.evict("alice");
        assert!(sessions.shard("alice").is_none());
    }
}
