// Renderer - resolves a surface's component graph into a RenderNode tree
//
// Algorithm: resolve the surface, resolve each component by id, dispatch on
// its type tag through the active catalog, recurse into children. Every
// failure mode is a node, not an error: a missing surface yields a terminal
// not-found node, a dangling child reference a per-child placeholder, an
// unknown type a visible placeholder. Sibling subtrees are never affected.
//
// The pass keeps a visited set of the current ancestor chain. The protocol
// does not rule out `children` cycles by construction, so a repeated id on
// one path renders a structural-error placeholder instead of recursing until
// the stack gives out.

pub mod components;
pub mod markdown;
pub mod node;

pub use node::{InteractiveKind, InteractiveRef, RenderNode, SelectOption, TextSpan};

use crate::catalog::{Catalog, CatalogSet};
use crate::protocol::ComponentSpec;
use crate::surface::{Surface, SurfaceStore};
use serde_json::Value;
use std::collections::HashSet;

/// Render capability registered in a catalog
pub type RenderFn = fn(&mut RenderPass, &ComponentSpec) -> RenderNode;

/// State threaded through one synchronous render traversal.
///
/// Holds read-only references only; a pass never mutates the surface it
/// reads, so rendering is safe to re-run at any time between applies.
pub struct RenderPass<'a> {
    surface: &'a Surface,
    catalog: &'a Catalog,
    /// Ids on the current ancestor path (cycle guard)
    visiting: HashSet<String>,
}

impl<'a> RenderPass<'a> {
    fn new(surface: &'a Surface, catalog: &'a Catalog) -> Self {
        RenderPass {
            surface,
            catalog,
            visiting: HashSet::new(),
        }
    }

    /// Shared data model of the surface being rendered
    ///
    /// The standard catalog's components carry their state in `properties`;
    /// custom catalogs resolve data-model bindings through here.
    #[allow(dead_code)]
    pub fn data_model(&self) -> &serde_json::Map<String, Value> {
        &self.surface.data_model
    }

    /// Render one component by id
    pub fn render(&mut self, component_id: &str) -> RenderNode {
        let surface = self.surface;
        let Some(spec) = surface.component(component_id) else {
            tracing::debug!(component_id, surface_id = %surface.id, "component not found");
            return RenderNode::MissingComponent {
                id: component_id.to_string(),
            };
        };

        if !self.visiting.insert(spec.id.clone()) {
            tracing::warn!(component_id, "children cycle detected");
            return RenderNode::StructuralError {
                id: spec.id.clone(),
                message: format!("cycle through component '{}'", spec.id),
            };
        }

        let rendered = match self.catalog.resolve(&spec.kind) {
            Some(render_fn) => render_fn(self, spec),
            None => RenderNode::UnknownType {
                id: spec.id.clone(),
                tag: spec.kind.clone(),
            },
        };

        self.visiting.remove(component_id);
        rendered
    }

    /// Render a container's children in order; each child resolves
    /// independently, so one dangling reference leaves its siblings intact
    pub fn render_children(&mut self, spec: &ComponentSpec) -> Vec<RenderNode> {
        spec.children.iter().map(|child| self.render(child)).collect()
    }
}

/// Render one component of a surface.
///
/// The terminal failure modes (surface unknown or deleted, surface not yet
/// renderable) come back as nodes too; callers display them like any other
/// tree.
pub fn render_component(
    store: &SurfaceStore,
    catalogs: &CatalogSet,
    surface_id: &str,
    component_id: &str,
) -> RenderNode {
    let Some(surface) = store.get_surface(surface_id) else {
        return RenderNode::SurfaceNotFound {
            surface_id: surface_id.to_string(),
        };
    };

    let catalog = catalogs.resolve(surface.catalog.as_deref());
    RenderPass::new(surface, catalog).render(component_id)
}

/// Render a surface from its `beginRendering` root
pub fn render_surface(
    store: &SurfaceStore,
    catalogs: &CatalogSet,
    surface_id: &str,
) -> RenderNode {
    let Some(surface) = store.get_surface(surface_id) else {
        return RenderNode::SurfaceNotFound {
            surface_id: surface_id.to_string(),
        };
    };

    let Some(root) = surface.root_component_id.clone() else {
        return RenderNode::StructuralError {
            id: surface_id.to_string(),
            message: "surface has no root component yet".to_string(),
        };
    };

    render_component(store, catalogs, surface_id, &root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builder;

    fn store_with(ops: Vec<crate::protocol::SurfaceOp>) -> SurfaceStore {
        let mut store = SurfaceStore::new();
        for op in ops {
            store.apply(op);
        }
        store
    }

    #[test]
    fn test_card_with_text_scenario() {
        let store = store_with(vec![
            builder::surface_update(
                "s1",
                vec![builder::card("c1", "T", &["t1"]), builder::text("t1", "Hi")],
            ),
            builder::begin_rendering("s1", "c1"),
        ]);
        let catalogs = CatalogSet::standard();

        match render_surface(&store, &catalogs, "s1") {
            RenderNode::Card {
                id,
                title,
                children,
            } => {
                assert_eq!(id, "c1");
                assert_eq!(title.as_deref(), Some("T"));
                assert_eq!(
                    children,
                    vec![RenderNode::Text {
                        id: "t1".into(),
                        spans: vec![TextSpan::plain("Hi")],
                    }]
                );
            }
            other => panic!("expected card, got {other:?}"),
        }
    }

    #[test]
    fn test_deleted_surface_renders_not_found() {
        let mut store = store_with(vec![
            builder::surface_update("s1", vec![builder::card("c1", "T", &[])]),
            builder::begin_rendering("s1", "c1"),
        ]);
        store.apply(builder::delete_surface("s1"));

        let catalogs = CatalogSet::standard();
        assert_eq!(
            render_component(&store, &catalogs, "s1", "c1"),
            RenderNode::SurfaceNotFound {
                surface_id: "s1".into()
            }
        );
    }

    #[test]
    fn test_dangling_child_renders_placeholder_siblings_survive() {
        let store = store_with(vec![
            builder::surface_update(
                "s1",
                vec![
                    builder::column("root", &["t1", "ghost", "t2"]),
                    builder::text("t1", "one"),
                    builder::text("t2", "two"),
                ],
            ),
            builder::begin_rendering("s1", "root"),
        ]);
        let catalogs = CatalogSet::standard();

        let RenderNode::Column { children, .. } = render_surface(&store, &catalogs, "s1") else {
            panic!("expected column");
        };
        assert_eq!(children.len(), 3);
        assert!(matches!(
            &children[1],
            RenderNode::MissingComponent { id } if id == "ghost"
        ));
        assert!(matches!(&children[0], RenderNode::Text { .. }));
        assert!(matches!(&children[2], RenderNode::Text { .. }));
    }

    #[test]
    fn test_unknown_type_renders_placeholder() {
        let mut store = SurfaceStore::new();
        store.apply(builder::surface_update(
            "s1",
            vec![crate::protocol::ComponentSpec {
                id: "x1".into(),
                kind: "Carousel".into(),
                properties: serde_json::Map::new(),
                children: vec![],
            }],
        ));
        let catalogs = CatalogSet::standard();

        assert_eq!(
            render_component(&store, &catalogs, "s1", "x1"),
            RenderNode::UnknownType {
                id: "x1".into(),
                tag: "Carousel".into()
            }
        );
    }

    #[test]
    fn test_children_cycle_renders_structural_error() {
        let store = store_with(vec![
            builder::surface_update(
                "s1",
                vec![
                    builder::column("a", &["b"]),
                    builder::column("b", &["a"]),
                ],
            ),
            builder::begin_rendering("s1", "a"),
        ]);
        let catalogs = CatalogSet::standard();

        let RenderNode::Column { children, .. } = render_surface(&store, &catalogs, "s1") else {
            panic!("expected column");
        };
        let RenderNode::Column { children: inner, .. } = &children[0] else {
            panic!("expected inner column");
        };
        assert!(matches!(
            &inner[0],
            RenderNode::StructuralError { id, .. } if id == "a"
        ));
    }

    #[test]
    fn test_diamond_reference_is_not_a_cycle() {
        // The same leaf under two siblings renders twice; only a repeated id
        // on a single path is a fault
        let store = store_with(vec![
            builder::surface_update(
                "s1",
                vec![
                    builder::row("root", &["left", "right"]),
                    builder::column("left", &["shared"]),
                    builder::column("right", &["shared"]),
                    builder::text("shared", "hi"),
                ],
            ),
            builder::begin_rendering("s1", "root"),
        ]);
        let catalogs = CatalogSet::standard();

        let RenderNode::Row { children, .. } = render_surface(&store, &catalogs, "s1") else {
            panic!("expected row");
        };
        for side in &children {
            let RenderNode::Column { children: inner, .. } = side else {
                panic!("expected column");
            };
            assert!(matches!(&inner[0], RenderNode::Text { .. }));
        }
    }

    #[test]
    fn test_leaf_variants_render_their_properties() {
        let store = store_with(vec![
            builder::surface_update(
                "s1",
                vec![
                    builder::column("root", &["lbl", "img", "div", "lst"]),
                    builder::label("lbl", "Opening hours"),
                    builder::image("img", "https://example.com/a.jpg", "terrace"),
                    builder::divider("div"),
                    builder::list("lst", &["Mon-Fri 9-5", "Sat 10-2"]),
                ],
            ),
            builder::begin_rendering("s1", "root"),
        ]);
        let catalogs = CatalogSet::standard();

        let RenderNode::Column { children, .. } = render_surface(&store, &catalogs, "s1") else {
            panic!("expected column");
        };
        assert_eq!(
            children[0],
            RenderNode::Label {
                id: "lbl".into(),
                text: "Opening hours".into()
            }
        );
        assert_eq!(
            children[1],
            RenderNode::Image {
                id: "img".into(),
                src: "https://example.com/a.jpg".into(),
                alt: "terrace".into()
            }
        );
        assert_eq!(children[2], RenderNode::Divider { id: "div".into() });
        assert_eq!(
            children[3],
            RenderNode::List {
                id: "lst".into(),
                items: vec!["Mon-Fri 9-5".into(), "Sat 10-2".into()]
            }
        );
    }

    #[test]
    fn test_surface_without_root_is_structural_error() {
        let store = store_with(vec![builder::surface_update(
            "s1",
            vec![builder::text("t1", "Hi")],
        )]);
        let catalogs = CatalogSet::standard();

        assert!(matches!(
            render_surface(&store, &catalogs, "s1"),
            RenderNode::StructuralError { .. }
        ));
    }
}
