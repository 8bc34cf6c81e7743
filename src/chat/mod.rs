//! Chat orchestrator: request text in, scene edits and a log out.
//!
//! One request at a time. A submit that arrives while another is still in
//! flight is turned away with [`PipelineError::Busy`] instead of queueing.
//! Every outcome, good or bad, ends up as exactly one log entry after the
//! user's own entry.

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, error};

use crate::command::{Command, DispatchError, ParseError, parse};
use crate::executor::{CommandExecutor, ExecutionResult};
use crate::gateway::{CompletionGateway, GatewayError};
use crate::scene::{EditorScene, SceneEvent, SceneSnapshot, UndoRecord};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("a request is already in progress")]
    Busy,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("could not read the model's reply: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryRole {
    User,
    Assistant,
    System,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatEntry {
    pub timestamp: DateTime<Local>,
    pub role: EntryRole,
    pub content: String,
}

pub struct ChatSession {
    gateway: Box<dyn CompletionGateway>,
    executor: CommandExecutor,
    scene: Mutex<EditorScene>,
    api_key: RwLock<String>,
    log: Mutex<Vec<ChatEntry>>,
    in_flight: Mutex<()>,
    events: Option<mpsc::UnboundedSender<SceneEvent>>,
}

impl ChatSession {
    pub fn new(
        gateway: Box<dyn CompletionGateway>,
        executor: CommandExecutor,
        scene: EditorScene,
        api_key: String,
    ) -> Self {
        Self {
            gateway,
            executor,
            scene: Mutex::new(scene),
            api_key: RwLock::new(api_key),
            log: Mutex::new(Vec::new()),
            in_flight: Mutex::new(()),
            events: None,
        }
    }

    /// Publish scene changes to `events` (e.g. a viewer).
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SceneEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn api_key(&self) -> String {
        self.api_key.read().await.clone()
    }

    pub async fn set_api_key(&self, key: &str) {
        *self.api_key.write().await = key.trim().to_string();
    }

    /// Send a natural-language request through the model and apply the result.
    pub async fn submit(&self, text: &str) -> Result<ExecutionResult, PipelineError> {
        let _gate = self.in_flight.try_lock().map_err(|_| PipelineError::Busy)?;
        self.record(EntryRole::User, text).await;

        let outcome = self.request(text).await;
        self.record_outcome(&outcome).await;
        outcome
    }

    /// Apply command JSON directly, without a model round trip.
    pub async fn submit_json(&self, raw: &str) -> Result<ExecutionResult, PipelineError> {
        let _gate = self.in_flight.try_lock().map_err(|_| PipelineError::Busy)?;
        self.record(EntryRole::User, raw).await;

        let outcome = match parse(raw) {
            Ok(command) => self.dispatch(&command).await,
            Err(e) => Err(e.into()),
        };
        self.record_outcome(&outcome).await;
        outcome
    }

    async fn request(&self, text: &str) -> Result<ExecutionResult, PipelineError> {
        let api_key = self.api_key().await;
        let raw = self.gateway.send(text, &api_key).await?;
        let command = parse(&raw)?;
        self.dispatch(&command).await
    }

    async fn dispatch(&self, command: &Command) -> Result<ExecutionResult, PipelineError> {
        command.action()?;

        let mut scene = self.scene.lock().await;
        let result = self.executor.execute(command, &mut *scene);

        if let Some(object) = result.object {
            if let Some(snapshot) = scene.snapshot_object(object) {
                self.publish(SceneEvent::Upserted(snapshot));
            }
            if scene.framed() == Some(object) {
                self.publish(SceneEvent::Framed(object));
            }
        }
        Ok(result)
    }

    /// Undo the most recent creation.
    pub async fn undo(&self) -> Option<UndoRecord> {
        let record = self.scene.lock().await.undo()?;
        self.publish(SceneEvent::Removed(record.object));
        self.record(EntryRole::System, &format!("Undo {}", record.label))
            .await;
        Some(record)
    }

    pub async fn snapshot(&self) -> SceneSnapshot {
        self.scene.lock().await.snapshot()
    }

    pub async fn history(&self) -> Vec<ChatEntry> {
        self.log.lock().await.clone()
    }

    fn publish(&self, event: SceneEvent) {
        if let Some(events) = &self.events {
            // the viewer may already be closed
            let _ = events.send(event);
        }
    }

    async fn record(&self, role: EntryRole, content: &str) {
        self.log.lock().await.push(ChatEntry {
            timestamp: Local::now(),
            role,
            content: content.to_string(),
        });
    }

    async fn record_outcome(&self, outcome: &Result<ExecutionResult, PipelineError>) {
        match outcome {
            Ok(result) if result.success => {
                debug!("Request applied: {}", result.message);
                self.record(EntryRole::Assistant, &result.message).await;
            }
            Ok(result) => {
                error!("Execution failed: {}", result.message);
                self.record(EntryRole::Error, &result.message).await;
            }
            Err(e) => {
                error!("Request failed: {}", e);
                self.record(EntryRole::Error, &e.to_string()).await;
            }
        }
    }
}
