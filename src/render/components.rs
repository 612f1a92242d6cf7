// Render functions, one per component kind
//
// Each function is pure: component spec in, render node out, recursion through
// the pass for containers. Properties are untrusted agent output, so every
// accessor has a fallback; a component with garbage properties renders with
// defaults rather than failing the pass.

use super::markdown;
use super::node::{RenderNode, SelectOption};
use super::RenderPass;
use crate::protocol::ComponentSpec;

pub fn render_card(pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Card {
        id: spec.id.clone(),
        title: spec.prop_str("title").map(str::to_string),
        children: pass.render_children(spec),
    }
}

pub fn render_form(pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Form {
        id: spec.id.clone(),
        children: pass.render_children(spec),
    }
}

pub fn render_row(pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Row {
        id: spec.id.clone(),
        children: pass.render_children(spec),
    }
}

pub fn render_column(pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Column {
        id: spec.id.clone(),
        children: pass.render_children(spec),
    }
}

/// List items come from `properties.items`, not `children`: the original
/// protocol treats List as a leaf over plain values. Non-string items render
/// as their JSON text.
pub fn render_list(_pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    let items = spec
        .properties
        .get("items")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .map(|item| match item.as_str() {
                    Some(s) => s.to_string(),
                    None => item.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    RenderNode::List {
        id: spec.id.clone(),
        items,
    }
}

pub fn render_text(_pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Text {
        id: spec.id.clone(),
        spans: markdown::split_bold(spec.prop_str_or("text", "")),
    }
}

pub fn render_label(_pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Label {
        id: spec.id.clone(),
        text: spec.prop_str_or("text", "").to_string(),
    }
}

pub fn render_image(_pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Image {
        id: spec.id.clone(),
        src: spec.prop_str_or("src", "").to_string(),
        alt: spec.prop_str_or("alt", "").to_string(),
    }
}

pub fn render_divider(_pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Divider {
        id: spec.id.clone(),
    }
}

pub fn render_input(_pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Input {
        id: spec.id.clone(),
        placeholder: spec.prop_str_or("placeholder", "").to_string(),
    }
}

/// Options are `[{label, value}]`; entries missing either field fall back to
/// whichever of the two is present (an agent frequently emits label-only
/// options).
pub fn render_select(_pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    let options = spec
        .properties
        .get("options")
        .and_then(|v| v.as_array())
        .map(|options| {
            options
                .iter()
                .filter_map(|opt| {
                    let label = opt.get("label").and_then(|v| v.as_str());
                    let value = opt.get("value").and_then(|v| v.as_str());
                    match (label, value) {
                        (None, None) => None,
                        (label, value) => {
                            let fallback = label.or(value).unwrap_or_default();
                            Some(SelectOption {
                                label: label.unwrap_or(fallback).to_string(),
                                value: value.unwrap_or(fallback).to_string(),
                            })
                        }
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    RenderNode::Select {
        id: spec.id.clone(),
        options,
    }
}

pub fn render_button(_pass: &mut RenderPass, spec: &ComponentSpec) -> RenderNode {
    RenderNode::Button {
        id: spec.id.clone(),
        label: spec.prop_str_or("label", "Button").to_string(),
        // "click" is the default action tag for a button with no explicit one
        action: spec.prop_str_or("action", "click").to_string(),
    }
}
