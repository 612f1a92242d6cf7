// Demo mode: replay a scripted frame sequence to showcase the full pipeline
//
// Stands in for the agent endpoint: commands from the TUI are answered with
// canned frame lines pushed through the same decode-and-apply path the live
// client uses, so demo mode exercises the real store, renderer, and action
// channel without a network.
//
// The script walks a restaurant-booking exchange: a first message builds a
// booking card (text, image, form with input/select/submit, a maps button),
// submitting the form answers with a confirmation.
//
// Run with: surfcast --demo

use crate::client::AgentClient;
use crate::events::{AppEvent, ClientCommand};
use crate::SharedStores;
use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Surface id every demo turn draws on
const DEMO_SURFACE: &str = "surface-demo";

/// Delay between scripted frames, slow enough to watch the surface grow
const FRAME_DELAY: Duration = Duration::from_millis(150);

/// Serve TUI commands with scripted frames until the channel closes
pub async fn run_demo(
    session_id: String,
    stores: SharedStores,
    event_tx: mpsc::Sender<AppEvent>,
    storage_tx: Option<mpsc::Sender<AppEvent>>,
    mut command_rx: mpsc::Receiver<ClientCommand>,
) -> Result<()> {
    tracing::info!("demo mode: scripted agent, no network");

    // The client's frame handling is reused verbatim; only transport differs
    let client = AgentClient::new(
        "demo://scripted".to_string(),
        session_id.clone(),
        stores,
        event_tx.clone(),
        storage_tx.clone(),
    );

    while let Some(command) = command_rx.recv().await {
        let frames = match command {
            ClientCommand::SendMessage { content } => {
                emit(&event_tx, &storage_tx, AppEvent::now_user_message(content)).await;
                booking_turn()
            }
            ClientCommand::SendAction {
                surface_id,
                component_id,
                action,
                data,
            } => {
                let user_action = crate::protocol::UserAction {
                    user_id: session_id.clone(),
                    surface_id,
                    component_id,
                    action: action.clone(),
                    data: data.clone(),
                };
                emit(
                    &event_tx,
                    &storage_tx,
                    AppEvent::ActionSent {
                        timestamp: Utc::now(),
                        action: user_action,
                    },
                )
                .await;

                match action.as_str() {
                    "submit" => confirmation_turn(data),
                    _ => ack_turn(&action),
                }
            }
        };

        for frame in frames {
            sleep(FRAME_DELAY).await;
            client.handle_line(&frame).await;
        }
    }

    Ok(())
}

async fn emit(
    event_tx: &mpsc::Sender<AppEvent>,
    storage_tx: &Option<mpsc::Sender<AppEvent>>,
    event: AppEvent,
) {
    if let Some(storage_tx) = storage_tx {
        let _ = storage_tx.send(event.clone()).await;
    }
    let _ = event_tx.send(event).await;
}

fn text_frame(content: &str) -> String {
    format!("data: {}", json!({ "type": "text", "content": content }))
}

fn ui_frame(op: Value) -> String {
    format!("data: {}", json!({ "type": "a2ui", "content": op }))
}

fn complete_frame() -> String {
    format!(
        "data: {}",
        json!({ "type": "complete", "surfaceId": DEMO_SURFACE })
    )
}

/// First turn: build the booking card
fn booking_turn() -> Vec<String> {
    vec![
        text_frame("I found a great spot for you. Here are the details."),
        ui_frame(json!({
            "type": "surfaceUpdate",
            "surfaceId": DEMO_SURFACE,
            "components": [
                {
                    "id": "card-booking",
                    "type": "Card",
                    "properties": { "title": "Luna Trattoria" },
                    "children": ["img-hero", "text-desc", "div-1", "form-book", "btn-maps"]
                },
                {
                    "id": "img-hero",
                    "type": "Image",
                    "properties": {
                        "src": "https://images.unsplash.com/photo-1517248135467-4c7edcad34c4",
                        "alt": "Candlelit dining room"
                    }
                },
                {
                    "id": "text-desc",
                    "type": "Text",
                    "properties": { "text": "**Open** now · Italian · Cozy pasta bar near the waterfront." }
                },
                { "id": "div-1", "type": "Divider" },
                {
                    "id": "form-book",
                    "type": "Form",
                    "children": ["label-book", "input-name", "select-time", "btn-book"]
                },
                {
                    "id": "label-book",
                    "type": "Label",
                    "properties": { "text": "Reserve a table" }
                },
                {
                    "id": "input-name",
                    "type": "Input",
                    "properties": { "placeholder": "Name for the reservation" }
                },
                {
                    "id": "select-time",
                    "type": "Select",
                    "properties": { "options": [
                        { "label": "7:00 PM", "value": "19:00" },
                        { "label": "8:00 PM", "value": "20:00" },
                        { "label": "9:00 PM", "value": "21:00" }
                    ]}
                },
                {
                    "id": "btn-book",
                    "type": "Button",
                    "properties": { "label": "Book table", "action": "submit" }
                },
                {
                    "id": "btn-maps",
                    "type": "Button",
                    "properties": {
                        "label": "Directions",
                        "action": "open_maps",
                        "destination": "Luna Trattoria, Harbor District"
                    }
                }
            ]
        })),
        // A deliberately truncated frame: the decoder skips it and the rest
        // of the turn still applies
        "data: {\"type\":\"a2ui\",\"content\":{\"type\":\"surfa".to_string(),
        ui_frame(json!({
            "type": "beginRendering",
            "surfaceId": DEMO_SURFACE,
            "rootComponentId": "card-booking"
        })),
        complete_frame(),
    ]
}

/// Submit turn: merge the reservation into the data model and swap the card
/// for a confirmation
fn confirmation_turn(form_data: Option<Value>) -> Vec<String> {
    let reservation = form_data.unwrap_or_else(|| json!({}));
    let name = reservation
        .get("input-name")
        .and_then(|v| v.as_str())
        .unwrap_or("you");
    let time = reservation
        .get("select-time")
        .and_then(|v| v.as_str())
        .unwrap_or("19:00");

    vec![
        ui_frame(json!({
            "type": "dataModelUpdate",
            "surfaceId": DEMO_SURFACE,
            "data": { "reservation": reservation }
        })),
        ui_frame(json!({
            "type": "surfaceUpdate",
            "surfaceId": DEMO_SURFACE,
            "components": [
                {
                    "id": "card-booking",
                    "type": "Card",
                    "properties": { "title": "Reservation confirmed" },
                    "children": ["text-confirm", "list-details"]
                },
                {
                    "id": "text-confirm",
                    "type": "Text",
                    "properties": { "text": format!("**Booked!** A table is waiting for {name}.") }
                },
                {
                    "id": "list-details",
                    "type": "List",
                    "properties": { "items": [
                        "Luna Trattoria, Harbor District",
                        format!("Today at {time}"),
                        "Confirmation sent to your inbox"
                    ]}
                }
            ]
        })),
        text_frame("All set! Your table is booked."),
        complete_frame(),
    ]
}

/// Any other action gets a plain acknowledgement
fn ack_turn(action: &str) -> Vec<String> {
    vec![
        text_frame(&format!("Noted, handling \"{action}\".")),
        complete_frame(),
    ]
}
