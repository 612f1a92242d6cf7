// TUI application state
//
// Holds the chat transcript, the interaction state for the active surface
// (focus, edit buffers, pending selections), and the action router. Key
// handling mutates this state and hands routed actions to the transport
// task; drawing reads it together with the shared surface store.

use crate::action::{ActionRouter, RoutedAction};
use crate::catalog::CatalogSet;
use crate::events::{AppEvent, ClientCommand, Stats};
use crate::logging::LogBuffer;
use crate::protocol::SurfaceOp;
use crate::render::{InteractiveKind, InteractiveRef, RenderNode};
use crate::theme::Theme;
use crate::SharedStores;
use serde_json::json;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// How long a toast notice stays on screen
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// Failed-turn notice; styled as an error card
    Notice,
}

/// One transcript entry; assistant turns may carry a surface
#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub role: Role,
    pub content: String,
    pub surface_id: Option<String>,
}

/// Which pane receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Composer,
    Surface,
}

/// Transient notice shown over the status bar
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

/// Main application state for the TUI
pub struct App {
    /// Chat transcript, oldest first
    pub messages: Vec<ChatEntry>,

    /// Chat composer contents
    pub input: String,

    /// Session identity; also the store shard key
    pub session_id: String,

    /// Surface currently on screen (last `beginRendering` target)
    pub active_surface: Option<String>,

    /// Whether a turn is in flight
    pub loading: bool,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Which pane has focus
    pub focus: Focus,

    /// Interactive leaves of the active surface, in document order
    pub interactive: Vec<InteractiveRef>,

    /// Index into `interactive` of the focused component
    pub surface_cursor: usize,

    /// Input component id -> text typed so far
    pub edit_buffers: HashMap<String, String>,

    /// Select component id -> highlighted option index
    pub select_cursors: HashMap<String, usize>,

    /// Select component id -> confirmed option value (for display)
    pub select_chosen: HashMap<String, String>,

    /// Routes leaf actions through form interception and cooldowns
    pub router: ActionRouter,

    /// Accumulated statistics
    pub stats: Stats,

    /// Log buffer for the log pane
    pub log_buffer: LogBuffer,

    /// Whether the log pane is visible
    pub show_logs: bool,

    /// Frame counter driving the loading spinner
    pub animation_frame: usize,

    pub toast: Option<Toast>,

    pub theme: Theme,

    /// Registry variants available to render passes
    pub catalogs: CatalogSet,

    /// Shared surface stores (mutated by the transport task)
    pub stores: SharedStores,

    /// Whether the current turn already produced an assistant entry
    turn_has_assistant: bool,

    command_tx: mpsc::Sender<ClientCommand>,
}

impl App {
    pub fn new(
        session_id: String,
        stores: SharedStores,
        command_tx: mpsc::Sender<ClientCommand>,
        log_buffer: LogBuffer,
    ) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            session_id,
            active_surface: None,
            loading: false,
            should_quit: false,
            focus: Focus::Composer,
            interactive: Vec::new(),
            surface_cursor: 0,
            edit_buffers: HashMap::new(),
            select_cursors: HashMap::new(),
            select_chosen: HashMap::new(),
            router: ActionRouter::new(),
            stats: Stats::default(),
            log_buffer,
            show_logs: false,
            animation_frame: 0,
            toast: None,
            theme: Theme::default(),
            catalogs: CatalogSet::standard(),
            stores,
            turn_has_assistant: false,
            command_tx,
        }
    }

    // ── Event intake ────────────────────────────────────────────────────

    /// Fold one application event into the transcript and UI state
    pub fn handle_event(&mut self, event: AppEvent) {
        self.stats.observe(&event);

        match event {
            AppEvent::UserMessage { content, .. } => {
                self.messages.push(ChatEntry {
                    role: Role::User,
                    content,
                    surface_id: None,
                });
                self.turn_has_assistant = false;
            }

            AppEvent::AssistantText { content, .. } => {
                // The agent streams the whole text so far: replace, not append
                if self.turn_has_assistant {
                    if let Some(entry) = self
                        .messages
                        .iter_mut()
                        .rev()
                        .find(|entry| entry.role == Role::Assistant)
                    {
                        entry.content = content;
                        return;
                    }
                }
                self.messages.push(ChatEntry {
                    role: Role::Assistant,
                    content,
                    surface_id: None,
                });
                self.turn_has_assistant = true;
            }

            AppEvent::OpApplied { op, .. } => self.handle_op_applied(op),

            AppEvent::ActionSent { .. } => {}

            AppEvent::TurnComplete { .. } => {
                self.loading = false;
                self.turn_has_assistant = false;
                self.refresh_interactive();
            }

            AppEvent::TurnFailed { message, .. } => {
                self.loading = false;
                self.turn_has_assistant = false;
                self.messages.push(ChatEntry {
                    role: Role::Notice,
                    content: message,
                    surface_id: None,
                });
            }
        }
    }

    fn handle_op_applied(&mut self, op: SurfaceOp) {
        match op {
            SurfaceOp::BeginRendering { surface_id, .. } => {
                // Attach the surface to the turn that produced it
                if !self.turn_has_assistant {
                    self.messages.push(ChatEntry {
                        role: Role::Assistant,
                        content: String::new(),
                        surface_id: None,
                    });
                    self.turn_has_assistant = true;
                }
                if let Some(entry) = self
                    .messages
                    .iter_mut()
                    .rev()
                    .find(|entry| entry.role == Role::Assistant)
                {
                    entry.surface_id = Some(surface_id.clone());
                }
                self.active_surface = Some(surface_id);
                self.refresh_interactive();
            }

            SurfaceOp::DeleteSurface { surface_id } => {
                // The transcript entry keeps its id; rendering it now shows
                // "not found", which is the protocol's answer for deleted
                // surfaces
                if self.active_surface.as_deref() == Some(surface_id.as_str()) {
                    self.interactive.clear();
                    self.surface_cursor = 0;
                    if self.focus == Focus::Surface {
                        self.focus = Focus::Composer;
                    }
                }
            }

            // Component graph changed under us: recompute the focus order
            SurfaceOp::SurfaceUpdate { surface_id, .. }
            | SurfaceOp::DataModelUpdate { surface_id, .. } => {
                if self.active_surface.as_deref() == Some(surface_id.as_str()) {
                    self.refresh_interactive();
                }
            }
        }
    }

    // ── Surface interaction ─────────────────────────────────────────────

    /// Render the active surface fresh from the shared store
    pub fn render_active_surface(&self) -> Option<RenderNode> {
        let surface_id = self.active_surface.as_deref()?;
        let stores = self.stores.lock().ok()?;
        let store = stores.shard(&self.session_id)?;
        Some(crate::render::render_surface(store, &self.catalogs, surface_id))
    }

    /// Recompute the focus traversal from the current render tree
    pub fn refresh_interactive(&mut self) {
        self.interactive.clear();
        if let Some(tree) = self.render_active_surface() {
            tree.collect_interactive(&mut self.interactive);
        }
        if self.surface_cursor >= self.interactive.len() {
            self.surface_cursor = 0;
        }
        if self.interactive.is_empty() && self.focus == Focus::Surface {
            self.focus = Focus::Composer;
        }
    }

    /// The interactive component currently under the cursor
    pub fn focused_component(&self) -> Option<&InteractiveRef> {
        if self.focus != Focus::Surface {
            return None;
        }
        self.interactive.get(self.surface_cursor)
    }

    pub fn focus_next(&mut self) {
        if !self.interactive.is_empty() {
            self.surface_cursor = (self.surface_cursor + 1) % self.interactive.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.interactive.is_empty() {
            self.surface_cursor =
                (self.surface_cursor + self.interactive.len() - 1) % self.interactive.len();
        }
    }

    /// Send the composer contents as a chat turn
    pub fn submit_composer(&mut self) {
        let content = self.input.trim().to_string();
        if content.is_empty() || self.loading {
            return;
        }
        self.input.clear();
        self.loading = true;
        if self
            .command_tx
            .try_send(ClientCommand::SendMessage { content })
            .is_err()
        {
            self.loading = false;
            self.show_toast("Transport busy, message not sent");
        }
    }

    /// Type into the focused Input component, reporting a `change` action
    pub fn edit_focused_input(&mut self, edit: InputEdit) {
        let Some(target) = self.focused_component().cloned() else {
            return;
        };
        if target.kind != InteractiveKind::Input {
            return;
        }

        let buffer = self.edit_buffers.entry(target.component_id.clone()).or_default();
        match edit {
            InputEdit::Char(c) => buffer.push(c),
            InputEdit::Backspace => {
                buffer.pop();
            }
        }
        let value = buffer.clone();
        self.dispatch_action(&target.component_id, "change", Some(json!({ "value": value })));
    }

    /// Move the highlighted option of the focused Select
    pub fn move_select_cursor(&mut self, delta: isize) {
        let Some(target) = self.focused_component().cloned() else {
            return;
        };
        if target.kind != InteractiveKind::Select {
            return;
        }
        let option_count = self.select_option_count(&target.component_id);
        if option_count == 0 {
            return;
        }
        let cursor = self
            .select_cursors
            .entry(target.component_id.clone())
            .or_insert(0);
        *cursor = (*cursor as isize + delta).rem_euclid(option_count as isize) as usize;
    }

    /// Activate the focused component: confirm a Select choice or press a
    /// Button. Inputs report on every keystroke, so Enter just moves on.
    pub fn activate_focused(&mut self) {
        let Some(target) = self.focused_component().cloned() else {
            return;
        };

        match target.kind {
            InteractiveKind::Input => self.focus_next(),

            InteractiveKind::Select => {
                let Some((value, label)) = self.selected_option(&target.component_id) else {
                    return;
                };
                self.select_chosen
                    .insert(target.component_id.clone(), label);
                self.dispatch_action(
                    &target.component_id,
                    "change",
                    Some(json!({ "value": value })),
                );
            }

            InteractiveKind::Button => {
                let action = self.button_action(&target.component_id);
                self.dispatch_action(&target.component_id, &action, None);
            }
        }
    }

    /// Printable key in the surface pane: type into a focused Input, or use
    /// Space as an activation key for anything else
    pub fn surface_char(&mut self, c: char) {
        match self.focused_component().map(|target| target.kind) {
            Some(InteractiveKind::Input) => self.edit_focused_input(InputEdit::Char(c)),
            Some(_) if c == ' ' => self.activate_focused(),
            _ => {}
        }
    }

    /// Route an action from a rendered leaf and act on the outcome
    fn dispatch_action(&mut self, component_id: &str, action: &str, data: Option<serde_json::Value>) {
        let Some(surface_id) = self.active_surface.clone() else {
            return;
        };

        // Resolve the surface snapshot the router needs, then drop the lock
        // before doing anything else with self
        let surface = {
            let Ok(stores) = self.stores.lock() else {
                return;
            };
            let Some(surface) = stores
                .shard(&self.session_id)
                .and_then(|store| store.get_surface(&surface_id))
                .cloned()
            else {
                return;
            };
            surface
        };

        let routed =
            self.router
                .dispatch(&surface, component_id, action, data, Instant::now());

        match routed {
            RoutedAction::Forward(event) => {
                self.loading = true;
                if self
                    .command_tx
                    .try_send(ClientCommand::SendAction {
                        surface_id: event.surface_id,
                        component_id: event.component_id,
                        action: event.action,
                        data: event.data,
                    })
                    .is_err()
                {
                    self.loading = false;
                    self.show_toast("Transport busy, action not sent");
                }
            }

            RoutedAction::OpenMaps { destination, url } => {
                match super::clipboard::copy_to_clipboard(&url) {
                    Ok(()) => self.show_toast(format!("Maps link for \"{destination}\" copied")),
                    Err(error) => {
                        tracing::warn!(?error, "clipboard unavailable");
                        self.show_toast(format!("Maps: {url}"));
                    }
                }
            }

            RoutedAction::Buffered => {}

            RoutedAction::Suppressed => self.show_toast("Just a moment..."),
        }
    }

    // ── Helpers over the rendered tree ──────────────────────────────────

    fn find_node<'a>(node: &'a RenderNode, component_id: &str) -> Option<&'a RenderNode> {
        if node.component_id() == Some(component_id) {
            return Some(node);
        }
        node.children()
            .iter()
            .find_map(|child| Self::find_node(child, component_id))
    }

    fn select_option_count(&self, component_id: &str) -> usize {
        self.render_active_surface()
            .as_ref()
            .and_then(|tree| Self::find_node(tree, component_id))
            .map(|node| match node {
                RenderNode::Select { options, .. } => options.len(),
                _ => 0,
            })
            .unwrap_or(0)
    }

    /// (value, label) of the highlighted option of a Select
    fn selected_option(&self, component_id: &str) -> Option<(String, String)> {
        let cursor = self.select_cursors.get(component_id).copied().unwrap_or(0);
        self.render_active_surface()
            .as_ref()
            .and_then(|tree| Self::find_node(tree, component_id))
            .and_then(|node| match node {
                RenderNode::Select { options, .. } => options
                    .get(cursor)
                    .map(|opt| (opt.value.clone(), opt.label.clone())),
                _ => None,
            })
    }

    fn button_action(&self, component_id: &str) -> String {
        self.render_active_surface()
            .as_ref()
            .and_then(|tree| Self::find_node(tree, component_id))
            .and_then(|node| match node {
                RenderNode::Button { action, .. } => Some(action.clone()),
                _ => None,
            })
            .unwrap_or_else(|| "click".to_string())
    }

    // ── Misc UI state ───────────────────────────────────────────────────

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    /// Per-tick housekeeping: spinner frame and toast expiry
    pub fn on_tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
        if let Some(toast) = &self.toast {
            if Instant::now() >= toast.expires_at {
                self.toast = None;
            }
        }
    }
}

/// Edits applied to a focused Input component
#[derive(Debug, Clone, Copy)]
pub enum InputEdit {
    Char(char),
    Backspace,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builder;
    use crate::surface::SessionStores;
    use std::sync::{Arc, Mutex};

    fn test_app() -> (App, mpsc::Receiver<ClientCommand>) {
        let stores: SharedStores = Arc::new(Mutex::new(SessionStores::new()));
        let (command_tx, command_rx) = mpsc::channel(16);
        let app = App::new(
            "session-1".to_string(),
            stores,
            command_tx,
            LogBuffer::new(),
        );
        (app, command_rx)
    }

    fn apply(app: &App, op: SurfaceOp) {
        app.stores
            .lock()
            .unwrap()
            .shard_mut(&app.session_id)
            .apply(op);
    }

    #[test]
    fn test_assistant_text_replaces_within_turn() {
        let (mut app, _rx) = test_app();

        app.handle_event(AppEvent::now_user_message("hi"));
        app.handle_event(AppEvent::AssistantText {
            timestamp: chrono::Utc::now(),
            content: "Hel".into(),
        });
        app.handle_event(AppEvent::AssistantText {
            timestamp: chrono::Utc::now(),
            content: "Hello there".into(),
        });

        let assistant: Vec<&ChatEntry> = app
            .messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .collect();
        assert_eq!(assistant.len(), 1);
        assert_eq!(assistant[0].content, "Hello there");
    }

    #[test]
    fn test_begin_rendering_attaches_surface_to_turn() {
        let (mut app, _rx) = test_app();
        apply(
            &app,
            builder::surface_update("s1", vec![builder::text("t1", "Hi")]),
        );
        apply(&app, builder::begin_rendering("s1", "t1"));

        app.handle_event(AppEvent::AssistantText {
            timestamp: chrono::Utc::now(),
            content: "Here you go".into(),
        });
        app.handle_event(AppEvent::OpApplied {
            timestamp: chrono::Utc::now(),
            op: builder::begin_rendering("s1", "t1"),
        });

        assert_eq!(app.active_surface.as_deref(), Some("s1"));
        assert_eq!(
            app.messages.last().unwrap().surface_id.as_deref(),
            Some("s1")
        );
    }

    #[test]
    fn test_turn_failed_adds_notice_and_stops_loading() {
        let (mut app, _rx) = test_app();
        app.loading = true;

        app.handle_event(AppEvent::now_turn_failed("agent unreachable"));

        assert!(!app.loading);
        assert_eq!(app.messages.last().unwrap().role, Role::Notice);
    }

    #[test]
    fn test_focus_traversal_follows_document_order() {
        let (mut app, _rx) = test_app();
        apply(
            &app,
            builder::surface_update(
                "s1",
                vec![
                    builder::card("c1", "T", &["f1"]),
                    builder::form("f1", &["i1", "b1"]),
                    builder::input("i1", "name"),
                    builder::button("b1", "Go", "submit"),
                ],
            ),
        );
        apply(&app, builder::begin_rendering("s1", "c1"));
        app.handle_event(AppEvent::OpApplied {
            timestamp: chrono::Utc::now(),
            op: builder::begin_rendering("s1", "c1"),
        });

        assert_eq!(app.interactive.len(), 2);
        app.focus = Focus::Surface;
        assert_eq!(app.focused_component().unwrap().component_id, "i1");
        app.focus_next();
        assert_eq!(app.focused_component().unwrap().component_id, "b1");
        app.focus_next();
        assert_eq!(app.focused_component().unwrap().component_id, "i1");
    }

    #[test]
    fn test_typing_buffers_into_form_submit_sends_command() {
        let (mut app, mut rx) = test_app();
        apply(
            &app,
            builder::surface_update(
                "s1",
                vec![
                    builder::form("f1", &["i1", "b1"]),
                    builder::input("i1", "name"),
                    builder::button("b1", "Book", "submit"),
                ],
            ),
        );
        apply(&app, builder::begin_rendering("s1", "f1"));
        app.handle_event(AppEvent::OpApplied {
            timestamp: chrono::Utc::now(),
            op: builder::begin_rendering("s1", "f1"),
        });

        app.focus = Focus::Surface;
        app.edit_focused_input(InputEdit::Char('A'));
        app.edit_focused_input(InputEdit::Char('l'));

        // Changes were intercepted by the form, nothing sent yet
        assert!(rx.try_recv().is_err());

        app.focus_next();
        app.activate_focused();

        match rx.try_recv() {
            Ok(ClientCommand::SendAction {
                component_id,
                action,
                data,
                ..
            }) => {
                assert_eq!(component_id, "f1");
                assert_eq!(action, "submit");
                assert_eq!(data, Some(json!({"i1": "Al"})));
            }
            other => panic!("expected SendAction, got {other:?}"),
        }
        assert!(app.loading);
    }

    #[test]
    fn test_delete_surface_releases_focus() {
        let (mut app, _rx) = test_app();
        apply(
            &app,
            builder::surface_update("s1", vec![builder::button("b1", "Go", "click")]),
        );
        apply(&app, builder::begin_rendering("s1", "b1"));
        app.handle_event(AppEvent::OpApplied {
            timestamp: chrono::Utc::now(),
            op: builder::begin_rendering("s1", "b1"),
        });
        app.focus = Focus::Surface;

        apply(&app, builder::delete_surface("s1"));
        app.handle_event(AppEvent::OpApplied {
            timestamp: chrono::Utc::now(),
            op: builder::delete_surface("s1"),
        });

        assert_eq!(app.focus, Focus::Composer);
        assert!(app.interactive.is_empty());
    }
}
