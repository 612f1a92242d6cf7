// Action channel - routes user intent from rendered leaves to the boundary
//
// Leaves report `(componentId, action, data?)`. Between a leaf and the
// outbound sink sits exactly one interceptor: the nearest enclosing Form.
// Forms absorb `change` events into a per-form buffer keyed by the child's
// component id, forward every other action untouched, and emit a single
// `(formId, "submit", buffer)` when their submit trigger fires.
//
// Submits and bare button clicks are debounced: once fired, the component is
// locked for a short cooldown and re-arms on its own. Best effort against
// double taps, not an exactly-once guarantee, and `change` events are never
// gated - a cooling-down form still accepts field edits.
//
// The reserved `open_maps` action never reaches the sink; it resolves into a
// maps search URL handled locally by the boundary renderer.

use crate::surface::Surface;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lockout window after a dispatched submit or click
pub const ACTION_COOLDOWN: Duration = Duration::from_secs(2);

/// Action tag a Button must carry to trigger its enclosing Form's submit
pub const SUBMIT_ACTION: &str = "submit";

/// Reserved action handled client-side (maps search for `destination`)
pub const OPEN_MAPS_ACTION: &str = "open_maps";

/// An action that reached the outer boundary
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    pub surface_id: String,
    pub component_id: String,
    pub action: String,
    pub data: Option<Value>,
}

/// Outcome of routing one leaf action
#[derive(Debug, Clone, PartialEq)]
pub enum RoutedAction {
    /// Deliver to the action sink (the agent decides the next operations)
    Forward(ActionEvent),
    /// Client-local side effect; never forwarded
    OpenMaps { destination: String, url: String },
    /// Absorbed into a form buffer
    Buffered,
    /// Dropped by an active cooldown
    Suppressed,
}

/// Per-component lockout state.
///
/// `try_fire` either locks the component and reports it may fire, or reports
/// the lock is still held. Locks expire on their own; there is nothing to
/// reset.
#[derive(Debug, Default)]
pub struct CooldownGate {
    locked_until: HashMap<String, Instant>,
}

impl CooldownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the component is currently locked (for disabled styling)
    pub fn is_locked(&self, component_id: &str, now: Instant) -> bool {
        self.locked_until
            .get(component_id)
            .is_some_and(|until| now < *until)
    }

    /// Lock the component and return true, or return false while locked
    pub fn try_fire(&mut self, component_id: &str, now: Instant) -> bool {
        if self.is_locked(component_id, now) {
            return false;
        }
        self.locked_until
            .insert(component_id.to_string(), now + ACTION_COOLDOWN);
        true
    }
}

/// Stateful router between rendered leaves and the action sink.
///
/// One per conversation; keyed maps isolate forms from each other. Time is a
/// parameter so tests drive the cooldown without sleeping.
#[derive(Debug, Default)]
pub struct ActionRouter {
    /// Form component id -> accumulated field values (child id -> last value)
    buffers: HashMap<String, serde_json::Map<String, Value>>,
    cooldowns: CooldownGate,
}

impl ActionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffered field values for a form, if any (for redrawing filled state)
    pub fn form_buffer(&self, form_id: &str) -> Option<&serde_json::Map<String, Value>> {
        self.buffers.get(form_id)
    }

    /// Whether a component is cooling down (disabled in the UI)
    pub fn is_locked(&self, component_id: &str, now: Instant) -> bool {
        self.cooldowns.is_locked(component_id, now)
    }

    /// Route one action reported by a rendered leaf of `surface`.
    pub fn dispatch(
        &mut self,
        surface: &Surface,
        component_id: &str,
        action: &str,
        data: Option<Value>,
        now: Instant,
    ) -> RoutedAction {
        if action == OPEN_MAPS_ACTION {
            let destination = surface
                .component(component_id)
                .and_then(|spec| spec.prop_str("destination"))
                .unwrap_or("")
                .to_string();
            let url = maps_search_url(&destination);
            return RoutedAction::OpenMaps { destination, url };
        }

        let enclosing_form = self.nearest_form(surface, component_id);

        if action == "change" {
            // Field edits are never debounced. Inside a form they accumulate
            // in the buffer and do not travel upward.
            if let Some(form_id) = enclosing_form {
                let value = data
                    .as_ref()
                    .and_then(|d| d.get("value"))
                    .cloned()
                    .unwrap_or(Value::Null);
                self.buffers
                    .entry(form_id)
                    .or_default()
                    .insert(component_id.to_string(), value);
                return RoutedAction::Buffered;
            }
            return RoutedAction::Forward(ActionEvent {
                surface_id: surface.id.clone(),
                component_id: component_id.to_string(),
                action: action.to_string(),
                data,
            });
        }

        if action == SUBMIT_ACTION {
            // A submit trigger fires the enclosing form (or the component
            // itself when the form is the source), emitting the buffer once.
            let form_id = match enclosing_form {
                Some(form_id) => form_id,
                None if is_form(surface, component_id) => component_id.to_string(),
                None => {
                    // Submit without a form is just a button action
                    return self.forward_debounced(surface, component_id, action, data, now);
                }
            };

            if !self.cooldowns.try_fire(&form_id, now) {
                tracing::debug!(%form_id, "submit suppressed by cooldown");
                return RoutedAction::Suppressed;
            }

            let buffer = self.buffers.get(&form_id).cloned().unwrap_or_default();
            return RoutedAction::Forward(ActionEvent {
                surface_id: surface.id.clone(),
                component_id: form_id,
                action: SUBMIT_ACTION.to_string(),
                data: Some(Value::Object(buffer)),
            });
        }

        // Everything else (click and custom tags) passes through unchanged,
        // debounced per source component since no form debounces it
        self.forward_debounced(surface, component_id, action, data, now)
    }

    fn forward_debounced(
        &mut self,
        surface: &Surface,
        component_id: &str,
        action: &str,
        data: Option<Value>,
        now: Instant,
    ) -> RoutedAction {
        if !self.cooldowns.try_fire(component_id, now) {
            tracing::debug!(component_id, action, "action suppressed by cooldown");
            return RoutedAction::Suppressed;
        }
        RoutedAction::Forward(ActionEvent {
            surface_id: surface.id.clone(),
            component_id: component_id.to_string(),
            action: action.to_string(),
            data,
        })
    }

    /// Id of the nearest Form strictly above `component_id`, if any
    fn nearest_form(&self, surface: &Surface, component_id: &str) -> Option<String> {
        // children lists are the only parent information; invert them per
        // dispatch (graphs are small, a handful of components)
        let mut parents: HashMap<&str, &str> = HashMap::new();
        for component in surface.components.values() {
            for child in &component.children {
                parents.insert(child.as_str(), component.id.as_str());
            }
        }

        let mut current = component_id;
        let mut hops = 0;
        while let Some(&parent) = parents.get(current) {
            if is_form(surface, parent) {
                return Some(parent.to_string());
            }
            current = parent;
            // parent chains can be cyclic if children are; bail out instead
            // of spinning
            hops += 1;
            if hops > surface.components.len() {
                return None;
            }
        }
        None
    }
}

fn is_form(surface: &Surface, component_id: &str) -> bool {
    surface
        .component(component_id)
        .is_some_and(|spec| spec.kind == "Form")
}

/// Maps search URL for the `open_maps` action
fn maps_search_url(destination: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        percent_encode(destination)
    )
}

/// Minimal query-component encoding (RFC 3986 unreserved kept, space as %20)
fn percent_encode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
