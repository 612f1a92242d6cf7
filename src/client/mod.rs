// Agent client - the transport seam
//
// Owns the HTTP conversation with the agent endpoint. Each turn is one POST
// (a chat message or a user action) answered with a line-framed stream; the
// client feeds every line through the frame decoder, applies surface
// operations to the session's store, and forwards typed events to the TUI
// and storage channels.
//
// Turn failures are events, not errors: a dead endpoint or an aborted stream
// emits one TurnFailed notice and the loop keeps serving later turns.
// Whatever operations were applied before the abort stay applied.

use crate::events::{AppEvent, ClientCommand};
use crate::protocol::frames::{self, LineBuffer, StreamFrame};
use crate::protocol::{ChatRequest, UserAction};
use crate::SharedStores;
use anyhow::{Context, Result};
use chrono::Utc;
use futures::StreamExt;
use tokio::sync::mpsc;

/// Shown to the user when a turn dies on transport; details go to the log
const TURN_FAILED_NOTICE: &str = "The agent could not be reached. Please try again.";

pub struct AgentClient {
    http: reqwest::Client,
    /// Base endpoint, e.g. `http://127.0.0.1:3001/api`
    endpoint: String,
    session_id: String,
    stores: SharedStores,
    event_tx: mpsc::Sender<AppEvent>,
    storage_tx: Option<mpsc::Sender<AppEvent>>,
}

impl AgentClient {
    pub fn new(
        endpoint: String,
        session_id: String,
        stores: SharedStores,
        event_tx: mpsc::Sender<AppEvent>,
        storage_tx: Option<mpsc::Sender<AppEvent>>,
    ) -> Self {
        AgentClient {
            http: reqwest::Client::new(),
            endpoint,
            session_id,
            stores,
            event_tx,
            storage_tx,
        }
    }

    /// Serve commands until the TUI side closes the channel
    pub async fn run(self, mut command_rx: mpsc::Receiver<ClientCommand>) -> Result<()> {
        tracing::info!(endpoint = %self.endpoint, "agent client started");

        while let Some(command) = command_rx.recv().await {
            let outcome = match command {
                ClientCommand::SendMessage { content } => self.chat_turn(content).await,
                ClientCommand::SendAction {
                    surface_id,
                    component_id,
                    action,
                    data,
                } => {
                    self.action_turn(UserAction {
                        user_id: self.session_id.clone(),
                        surface_id,
                        component_id,
                        action,
                        data,
                    })
                    .await
                }
            };

            if let Err(error) = outcome {
                tracing::error!(?error, "turn failed");
                self.emit(AppEvent::now_turn_failed(TURN_FAILED_NOTICE)).await;
            }
        }

        tracing::info!("agent client shutting down");
        Ok(())
    }

    async fn chat_turn(&self, content: String) -> Result<()> {
        self.emit(AppEvent::now_user_message(content.clone())).await;

        let body = ChatRequest {
            message: content,
            user_id: self.session_id.clone(),
        };
        let request = self.http.post(format!("{}/chat", self.endpoint)).json(&body);
        self.stream_turn(request).await
    }

    async fn action_turn(&self, action: UserAction) -> Result<()> {
        self.emit(AppEvent::ActionSent {
            timestamp: Utc::now(),
            action: action.clone(),
        })
        .await;

        let request = self.http.post(format!("{}/action", self.endpoint)).json(&action);
        self.stream_turn(request).await
    }

    /// Read one turn's frame stream to the end
    async fn stream_turn(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let response = request
            .send()
            .await
            .context("sending request to agent endpoint")?
            .error_for_status()
            .context("agent endpoint rejected the request")?;

        let mut byte_stream = response.bytes_stream();
        let mut lines = LineBuffer::new();

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk.context("reading agent response stream")?;
            for line in lines.push(&chunk) {
                self.handle_line(&line).await;
            }
        }
        if let Some(tail) = lines.finish() {
            self.handle_line(&tail).await;
        }

        Ok(())
    }

    /// Decode and apply a single stream line. Undecodable lines are dropped;
    /// the stream continues regardless.
    pub(crate) async fn handle_line(&self, line: &str) {
        let Some(frame) = frames::decode_line(line) else {
            if !line.trim().is_empty() && line.trim_start().starts_with("data:") {
                tracing::debug!(line, "skipping malformed frame");
            }
            return;
        };

        match frame {
            StreamFrame::Text { content } => {
                self.emit(AppEvent::AssistantText {
                    timestamp: Utc::now(),
                    content,
                })
                .await;
            }

            StreamFrame::Ui { content: op } => {
                if let Ok(mut stores) = self.stores.lock() {
                    stores.shard_mut(&self.session_id).apply(op.clone());
                }
                self.emit(AppEvent::OpApplied {
                    timestamp: Utc::now(),
                    op,
                })
                .await;
            }

            StreamFrame::Complete { surface_id, .. } => {
                self.emit(AppEvent::TurnComplete {
                    timestamp: Utc::now(),
                    surface_id,
                })
                .await;
            }

            StreamFrame::Error { content } => {
                tracing::warn!(%content, "agent reported a failed turn");
                self.emit(AppEvent::now_turn_failed(content)).await;
            }
        }
    }

    async fn emit(&self, event: AppEvent) {
        if let Some(storage_tx) = &self.storage_tx {
            let _ = storage_tx.send(event.clone()).await;
        }
        // The TUI channel closing means shutdown; nothing useful to do here
        let _ = self.event_tx.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SessionStores;
    use std::sync::{Arc, Mutex};

    fn test_client() -> (AgentClient, mpsc::Receiver<AppEvent>, SharedStores) {
        let stores: SharedStores = Arc::new(Mutex::new(SessionStores::new()));
        let (event_tx, event_rx) = mpsc::channel(64);
        let client = AgentClient::new(
            "http://127.0.0.1:0/api".to_string(),
            "session-1".to_string(),
            stores.clone(),
            event_tx,
            None,
        );
        (client, event_rx, stores)
    }

    #[tokio::test]
    async fn test_ui_frames_mutate_the_session_store() {
        let (client, mut event_rx, stores) = test_client();

        client
            .handle_line(
                r#"data: {"type":"a2ui","content":{"type":"surfaceUpdate","surfaceId":"s1","components":[{"id":"t1","type":"Text","properties":{"text":"Hi"}}]}}"#,
            )
            .await;
        client
            .handle_line(
                r#"data: {"type":"a2ui","content":{"type":"beginRendering","surfaceId":"s1","rootComponentId":"t1"}}"#,
            )
            .await;

        {
            let stores = stores.lock().unwrap();
            let surface = stores
                .shard("session-1")
                .and_then(|store| store.get_surface("s1"))
                .expect("surface applied");
            assert!(surface.is_renderable());
        }

        assert!(matches!(
            event_rx.recv().await,
            Some(AppEvent::OpApplied { .. })
        ));
        assert!(matches!(
            event_rx.recv().await,
            Some(AppEvent::OpApplied { .. })
        ));
    }

    #[tokio::test]
    async fn test_bad_frames_are_skipped_good_ones_still_apply() {
        let (client, mut event_rx, _stores) = test_client();

        client.handle_line("data: {garbage").await;
        client.handle_line("event: message").await;
        client
            .handle_line(r#"data: {"type":"complete","userId":"session-1","surfaceId":"s1"}"#)
            .await;

        match event_rx.recv().await {
            Some(AppEvent::TurnComplete { surface_id, .. }) => {
                assert_eq!(surface_id.as_deref(), Some("s1"))
            }
            other => panic!("expected TurnComplete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_frame_becomes_turn_failed() {
        let (client, mut event_rx, _stores) = test_client();

        client
            .handle_line(r#"data: {"type":"error","content":"model unavailable"}"#)
            .await;

        match event_rx.recv().await {
            Some(AppEvent::TurnFailed { message, .. }) => {
                assert_eq!(message, "model unavailable")
            }
            other => panic!("expected TurnFailed, got {other:?}"),
        }
    }
}
