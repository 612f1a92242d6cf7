// Render output tree
//
// The renderer produces a `RenderNode` tree: a resolved, display-ready
// description of one surface with every component reference chased and every
// failure turned into a diagnostic node. The TUI walks this tree to build
// widgets; nothing in it points back into the surface store, so a later
// `surfaceUpdate` can never invalidate a tree mid-draw.

/// A run of text, plain or emphasized (`**bold**` in the source)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    pub emphasis: bool,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        TextSpan {
            text: text.into(),
            emphasis: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        TextSpan {
            text: text.into(),
            emphasis: true,
        }
    }
}

/// One choice in a Select component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Interactive leaf kinds, in the order the TUI cycles focus through them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveKind {
    Input,
    Select,
    Button,
}

/// Reference to an interactive leaf inside a rendered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveRef {
    pub component_id: String,
    pub kind: InteractiveKind,
}

/// A resolved node of a rendered surface
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Card {
        id: String,
        title: Option<String>,
        children: Vec<RenderNode>,
    },
    Form {
        id: String,
        children: Vec<RenderNode>,
    },
    Row {
        id: String,
        children: Vec<RenderNode>,
    },
    Column {
        id: String,
        children: Vec<RenderNode>,
    },
    List {
        id: String,
        items: Vec<String>,
    },
    Text {
        id: String,
        spans: Vec<TextSpan>,
    },
    Label {
        id: String,
        text: String,
    },
    Divider {
        id: String,
    },
    Image {
        id: String,
        src: String,
        alt: String,
    },
    Input {
        id: String,
        placeholder: String,
    },
    Select {
        id: String,
        options: Vec<SelectOption>,
    },
    Button {
        id: String,
        label: String,
        action: String,
    },

    /// A `children` entry that resolves to no component in the surface.
    /// Dangling references are tolerated; siblings still render.
    MissingComponent { id: String },

    /// A component whose type tag the active catalog does not know.
    /// The protocol is forward-compatible, so this renders, visibly.
    UnknownType { id: String, tag: String },

    /// Structural fault, e.g. a `children` cycle. Carries the offending id.
    StructuralError { id: String, message: String },

    /// Terminal node for a surface that does not exist (or was deleted)
    SurfaceNotFound { surface_id: String },
}

impl RenderNode {
    /// The component id this node was rendered from, where one exists
    pub fn component_id(&self) -> Option<&str> {
        match self {
            RenderNode::Card { id, .. }
            | RenderNode::Form { id, .. }
            | RenderNode::Row { id, .. }
            | RenderNode::Column { id, .. }
            | RenderNode::List { id, .. }
            | RenderNode::Text { id, .. }
            | RenderNode::Label { id, .. }
            | RenderNode::Divider { id }
            | RenderNode::Image { id, .. }
            | RenderNode::Input { id, .. }
            | RenderNode::Select { id, .. }
            | RenderNode::Button { id, .. }
            | RenderNode::MissingComponent { id }
            | RenderNode::UnknownType { id, .. }
            | RenderNode::StructuralError { id, .. } => Some(id),
            RenderNode::SurfaceNotFound { .. } => None,
        }
    }

    /// Child nodes, for tree walks
    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Card { children, .. }
            | RenderNode::Form { children, .. }
            | RenderNode::Row { children, .. }
            | RenderNode::Column { children, .. } => children,
            _ => &[],
        }
    }

    /// Collect interactive leaves in document order (focus traversal)
    pub fn collect_interactive(&self, out: &mut Vec<InteractiveRef>) {
        match self {
            RenderNode::Input { id, .. } => out.push(InteractiveRef {
                component_id: id.clone(),
                kind: InteractiveKind::Input,
            }),
            RenderNode::Select { id, .. } => out.push(InteractiveRef {
                component_id: id.clone(),
                kind: InteractiveKind::Select,
            }),
            RenderNode::Button { id, .. } => out.push(InteractiveRef {
                component_id: id.clone(),
                kind: InteractiveKind::Button,
            }),
            _ => {
                for child in self.children() {
                    child.collect_interactive(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_interactive_in_document_order() {
        let tree = RenderNode::Card {
            id: "c1".into(),
            title: None,
            children: vec![
                RenderNode::Form {
                    id: "f1".into(),
                    children: vec![
                        RenderNode::Input {
                            id: "i1".into(),
                            placeholder: String::new(),
                        },
                        RenderNode::Button {
                            id: "b1".into(),
                            label: "Go".into(),
                            action: "submit".into(),
                        },
                    ],
                },
                RenderNode::Button {
                    id: "b2".into(),
                    label: "Later".into(),
                    action: "click".into(),
                },
            ],
        };

        let mut refs = Vec::new();
        tree.collect_interactive(&mut refs);
        let ids: Vec<&str> = refs.iter().map(|r| r.component_id.as_str()).collect();
        assert_eq!(ids, vec!["i1", "b1", "b2"]);
    }
}
