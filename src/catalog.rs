// Component catalog - type tag to render function dispatch
//
// The component set is a closed tagged union (`ComponentKind`) with one pure
// render function per variant, exposed through an explicit registration map
// keyed by wire tag. Extension happens by registering new tags on a catalog,
// not by adding behavior to components: a tag the catalog cannot resolve
// renders as a visible placeholder, keeping the protocol forward-compatible.
//
// Catalogs are named; `beginRendering` picks which one a surface renders
// with. Unknown catalog names fall back to the standard catalog so a surface
// never becomes unrenderable over an advisory field.

use crate::render::components;
use crate::render::RenderFn;
use std::collections::HashMap;

/// Name of the catalog used when `beginRendering` does not pick one
pub const DEFAULT_CATALOG: &str = "default";

/// The closed set of component kinds this client ships renderers for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    // Containers: own an ordered children list and recurse
    Card,
    Form,
    Row,
    Column,
    List,
    // Leaves: interpret their own properties, may report actions
    Text,
    Label,
    Image,
    Divider,
    Input,
    Select,
    Button,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 12] = [
        ComponentKind::Card,
        ComponentKind::Form,
        ComponentKind::Row,
        ComponentKind::Column,
        ComponentKind::List,
        ComponentKind::Text,
        ComponentKind::Label,
        ComponentKind::Image,
        ComponentKind::Divider,
        ComponentKind::Input,
        ComponentKind::Select,
        ComponentKind::Button,
    ];

    /// Wire tag for this kind
    pub fn tag(self) -> &'static str {
        match self {
            ComponentKind::Card => "Card",
            ComponentKind::Form => "Form",
            ComponentKind::Row => "Row",
            ComponentKind::Column => "Column",
            ComponentKind::List => "List",
            ComponentKind::Text => "Text",
            ComponentKind::Label => "Label",
            ComponentKind::Image => "Image",
            ComponentKind::Divider => "Divider",
            ComponentKind::Input => "Input",
            ComponentKind::Select => "Select",
            ComponentKind::Button => "Button",
        }
    }

    fn render_fn(self) -> RenderFn {
        match self {
            ComponentKind::Card => components::render_card,
            ComponentKind::Form => components::render_form,
            ComponentKind::Row => components::render_row,
            ComponentKind::Column => components::render_column,
            ComponentKind::List => components::render_list,
            ComponentKind::Text => components::render_text,
            ComponentKind::Label => components::render_label,
            ComponentKind::Image => components::render_image,
            ComponentKind::Divider => components::render_divider,
            ComponentKind::Input => components::render_input,
            ComponentKind::Select => components::render_select,
            ComponentKind::Button => components::render_button,
        }
    }
}

/// One registry variant: tag → render capability
pub struct Catalog {
    handlers: HashMap<String, RenderFn>,
}

impl Catalog {
    /// Empty catalog, for building custom variants
    pub fn new() -> Self {
        Catalog {
            handlers: HashMap::new(),
        }
    }

    /// The standard catalog: every known component kind
    pub fn standard() -> Self {
        let mut catalog = Catalog::new();
        for kind in ComponentKind::ALL {
            catalog.register(kind.tag(), kind.render_fn());
        }
        catalog
    }

    /// Register (or override) the handler for a tag
    pub fn register(&mut self, tag: &str, handler: RenderFn) {
        self.handlers.insert(tag.to_string(), handler);
    }

    /// `resolve(type) -> render capability | NotFound`
    pub fn resolve(&self, tag: &str) -> Option<RenderFn> {
        self.handlers.get(tag).copied()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new()
    }
}

/// Named catalogs available to render passes
pub struct CatalogSet {
    catalogs: HashMap<String, Catalog>,
}

impl CatalogSet {
    /// A set holding just the standard catalog under [`DEFAULT_CATALOG`]
    pub fn standard() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert(DEFAULT_CATALOG.to_string(), Catalog::standard());
        CatalogSet { catalogs }
    }

    /// Add a named catalog variant
    pub fn insert(&mut self, name: &str, catalog: Catalog) {
        self.catalogs.insert(name.to_string(), catalog);
    }

    /// Catalog for a render pass. `None` or an unknown name resolves to the
    /// standard catalog.
    pub fn resolve(&self, name: Option<&str>) -> &Catalog {
        name.and_then(|n| self.catalogs.get(n))
            .or_else(|| self.catalogs.get(DEFAULT_CATALOG))
            .expect("standard catalog is always present")
    }
}

impl Default for CatalogSet {
    fn default() -> Self {
        CatalogSet::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_resolves_every_kind() {
        let catalog = Catalog::standard();
        for kind in ComponentKind::ALL {
            assert!(catalog.resolve(kind.tag()).is_some(), "missing {}", kind.tag());
        }
    }

    #[test]
    fn test_unknown_tag_is_not_found() {
        assert!(Catalog::standard().resolve("Carousel").is_none());
    }

    #[test]
    fn test_registration_extends_a_catalog() {
        let mut catalog = Catalog::standard();
        assert!(catalog.resolve("Badge").is_none());
        catalog.register("Badge", components::render_label);
        assert!(catalog.resolve("Badge").is_some());
    }

    #[test]
    fn test_named_catalog_variant_is_resolvable() {
        let mut set = CatalogSet::standard();
        let mut compact = Catalog::new();
        compact.register("Text", components::render_text);
        set.insert("compact", compact);

        let catalog = set.resolve(Some("compact"));
        assert!(catalog.resolve("Text").is_some());
        // The variant only knows what was registered on it
        assert!(catalog.resolve("Card").is_none());
    }

    #[test]
    fn test_unknown_catalog_name_falls_back_to_default() {
        let set = CatalogSet::standard();
        let fallback = set.resolve(Some("no-such-catalog"));
        assert!(fallback.resolve("Card").is_some());
        assert!(std::ptr::eq(fallback, set.resolve(None)));
    }
}
