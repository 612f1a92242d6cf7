// Protocol module - the agent-to-UI wire vocabulary
//
// The agent describes UI as data: a stream of typed operations that build and
// mutate component graphs ("surfaces") on the client. This module defines the
// JSON shapes for those operations, the component payload they carry, and the
// client-to-agent action report that closes the loop.
//
// Everything here is a pure value. Applying operations lives in `surface`,
// interpreting components lives in `render`.

pub mod builder;
pub mod frames;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node in a surface's component graph, as it appears on the wire.
///
/// `kind` is an open string on purpose: agents may emit component types this
/// client has never heard of, and the renderer must degrade to a placeholder
/// rather than reject the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub id: String,

    /// Component type tag, e.g. "Card", "Text", "Button"
    #[serde(rename = "type")]
    pub kind: String,

    /// Type-specific payload; opaque to the store, interpreted by render fns
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: serde_json::Map<String, Value>,

    /// Ordered child component ids (containers only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl ComponentSpec {
    /// Look up a string property
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    /// Look up a string property with a fallback
    pub fn prop_str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.prop_str(key).unwrap_or(default)
    }
}

/// A mutation applied to one surface.
///
/// Serialized with an internal `type` tag, camelCase on the wire:
/// `{"type":"surfaceUpdate","surfaceId":"s1","components":[...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceOp {
    /// Upsert components into a surface. Listed components replace any
    /// existing component with the same id; unlisted ones are untouched.
    #[serde(rename_all = "camelCase")]
    SurfaceUpdate {
        surface_id: String,
        components: Vec<ComponentSpec>,
    },

    /// Shallow-merge data into the surface's shared data model.
    #[serde(rename_all = "camelCase")]
    DataModelUpdate {
        surface_id: String,
        data: serde_json::Map<String, Value>,
    },

    /// Set the surface's root component and make it renderable.
    /// `catalog` names the registry variant to render with.
    #[serde(rename_all = "camelCase")]
    BeginRendering {
        surface_id: String,
        root_component_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        catalog: Option<String>,
    },

    /// Drop the surface. Later references are "not found", never re-created.
    #[serde(rename_all = "camelCase")]
    DeleteSurface { surface_id: String },
}

impl SurfaceOp {
    /// The surface this operation addresses
    pub fn surface_id(&self) -> &str {
        match self {
            SurfaceOp::SurfaceUpdate { surface_id, .. }
            | SurfaceOp::DataModelUpdate { surface_id, .. }
            | SurfaceOp::BeginRendering { surface_id, .. }
            | SurfaceOp::DeleteSurface { surface_id } => surface_id,
        }
    }
}

/// User interaction reported back to the agent endpoint.
///
/// `data` carries action-specific payload: the form buffer for `submit`,
/// `{"value": ...}` for `change`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub user_id: String,
    pub surface_id: String,
    pub component_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Body of a plain chat turn request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_surface_update_round_trip() {
        let raw = json!({
            "type": "surfaceUpdate",
            "surfaceId": "s1",
            "components": [
                {"id": "c1", "type": "Card", "properties": {"title": "T"}, "children": ["t1"]},
                {"id": "t1", "type": "Text", "properties": {"text": "Hi"}}
            ]
        });

        let op: SurfaceOp = serde_json::from_value(raw.clone()).unwrap();
        match &op {
            SurfaceOp::SurfaceUpdate {
                surface_id,
                components,
            } => {
                assert_eq!(surface_id, "s1");
                assert_eq!(components.len(), 2);
                assert_eq!(components[0].kind, "Card");
                assert_eq!(components[0].children, vec!["t1"]);
                assert_eq!(components[1].prop_str("text"), Some("Hi"));
            }
            other => panic!("wrong variant: {other:?}"),
        }

        // Wire shape survives re-serialization
        assert_eq!(serde_json::to_value(&op).unwrap(), raw);
    }

    #[test]
    fn test_begin_rendering_catalog_is_optional() {
        let op: SurfaceOp = serde_json::from_str(
            r#"{"type":"beginRendering","surfaceId":"s1","rootComponentId":"c1"}"#,
        )
        .unwrap();
        match op {
            SurfaceOp::BeginRendering {
                root_component_id,
                catalog,
                ..
            } => {
                assert_eq!(root_component_id, "c1");
                assert!(catalog.is_none());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_component_defaults_are_empty() {
        let spec: ComponentSpec =
            serde_json::from_str(r#"{"id":"d1","type":"Divider"}"#).unwrap();
        assert!(spec.properties.is_empty());
        assert!(spec.children.is_empty());
    }

    #[test]
    fn test_user_action_omits_empty_data() {
        let action = UserAction {
            user_id: "u1".into(),
            surface_id: "s1".into(),
            component_id: "b1".into(),
            action: "click".into(),
            data: None,
        };
        let encoded = serde_json::to_string(&action).unwrap();
        assert!(!encoded.contains("data"));
        assert!(encoded.contains(r#""componentId":"b1""#));
    }
}
