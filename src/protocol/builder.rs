// Constructors for operations and common component shapes
//
// Agents normally emit these as JSON; the demo script and the test suite
// build them in code. Kept next to the wire types so the two cannot drift.

use super::{ComponentSpec, SurfaceOp};
use serde_json::{json, Value};

pub fn surface_update(surface_id: &str, components: Vec<ComponentSpec>) -> SurfaceOp {
    SurfaceOp::SurfaceUpdate {
        surface_id: surface_id.to_string(),
        components,
    }
}

pub fn data_model_update(surface_id: &str, data: serde_json::Map<String, Value>) -> SurfaceOp {
    SurfaceOp::DataModelUpdate {
        surface_id: surface_id.to_string(),
        data,
    }
}

pub fn begin_rendering(surface_id: &str, root_component_id: &str) -> SurfaceOp {
    SurfaceOp::BeginRendering {
        surface_id: surface_id.to_string(),
        root_component_id: root_component_id.to_string(),
        catalog: None,
    }
}

pub fn delete_surface(surface_id: &str) -> SurfaceOp {
    SurfaceOp::DeleteSurface {
        surface_id: surface_id.to_string(),
    }
}

fn component(id: &str, kind: &str, properties: Value, children: &[&str]) -> ComponentSpec {
    let properties = match properties {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            // Builders are only called with object literals; anything else is
            // a programming error in this crate, not agent input.
            unreachable!("component properties must be an object, got {other}")
        }
    };
    ComponentSpec {
        id: id.to_string(),
        kind: kind.to_string(),
        properties,
        children: children.iter().map(|c| c.to_string()).collect(),
    }
}

pub fn text(id: &str, text: &str) -> ComponentSpec {
    component(id, "Text", json!({ "text": text }), &[])
}

pub fn label(id: &str, text: &str) -> ComponentSpec {
    component(id, "Label", json!({ "text": text }), &[])
}

pub fn button(id: &str, label: &str, action: &str) -> ComponentSpec {
    component(id, "Button", json!({ "label": label, "action": action }), &[])
}

pub fn input(id: &str, placeholder: &str) -> ComponentSpec {
    component(id, "Input", json!({ "placeholder": placeholder, "type": "text" }), &[])
}

pub fn select(id: &str, options: &[(&str, &str)]) -> ComponentSpec {
    let options: Vec<Value> = options
        .iter()
        .map(|(label, value)| json!({ "label": label, "value": value }))
        .collect();
    component(id, "Select", json!({ "options": options }), &[])
}

pub fn card(id: &str, title: &str, children: &[&str]) -> ComponentSpec {
    component(id, "Card", json!({ "title": title }), children)
}

pub fn form(id: &str, children: &[&str]) -> ComponentSpec {
    component(id, "Form", Value::Null, children)
}

pub fn row(id: &str, children: &[&str]) -> ComponentSpec {
    component(id, "Row", Value::Null, children)
}

pub fn column(id: &str, children: &[&str]) -> ComponentSpec {
    component(id, "Column", Value::Null, children)
}

pub fn list(id: &str, items: &[&str]) -> ComponentSpec {
    component(id, "List", json!({ "items": items }), &[])
}

pub fn divider(id: &str) -> ComponentSpec {
    component(id, "Divider", Value::Null, &[])
}

pub fn image(id: &str, src: &str, alt: &str) -> ComponentSpec {
    component(id, "Image", json!({ "src": src, "alt": alt }), &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_builder_shape() {
        let spec = card("c1", "Booking", &["t1", "f1"]);
        assert_eq!(spec.kind, "Card");
        assert_eq!(spec.prop_str("title"), Some("Booking"));
        assert_eq!(spec.children, vec!["t1", "f1"]);
    }

    #[test]
    fn test_select_builder_options() {
        let spec = select("s1", &[("7 PM", "19:00"), ("8 PM", "20:00")]);
        let options = spec.properties.get("options").unwrap().as_array().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0]["value"], "19:00");
    }

    #[test]
    fn test_ops_address_their_surface() {
        assert_eq!(delete_surface("s9").surface_id(), "s9");
        assert_eq!(begin_rendering("s1", "root").surface_id(), "s1");
    }
}
