//! Action dispatch
//!
//! Start/stop/reload/switch/save are fire-and-forget: each is spawned as its
//! own task, unordered with respect to other actions and to polling, and is
//! never retried. Completion turns into a short-lived status message (the
//! error text on failure) that clears itself after a fixed interval.

use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::api::{AgentClient, AgentCommand};
use crate::error::ApiError;
use crate::model::{ActionReply, ChannelRef, Settings};
use crate::state::StateEvent;
use crate::task::drain_finished;

/// How long status messages stay visible by default
pub const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(3);

/// A user-triggered command for the agent
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Start,
    Stop,
    Reload,
    /// `None` lets the agent choose a channel
    SwitchChannel(Option<ChannelRef>),
    SaveSettings(Settings),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Reload => "reload",
            Action::SwitchChannel(_) => "switch channel",
            Action::SaveSettings(_) => "save settings",
        }
    }
}

/// Result of executing an action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Done { action: Action, reply: ActionReply },
    SettingsSaved(Settings),
    Failed { action: Action, error: ApiError },
}

impl ActionOutcome {
    /// Text for the status line
    pub fn status_text(&self) -> String {
        match self {
            ActionOutcome::Done { action, reply } => success_text(action, reply),
            ActionOutcome::SettingsSaved(_) => "Settings saved".to_string(),
            ActionOutcome::Failed { action, error } => {
                format!("Failed to {}: {}", action.name(), error.message())
            }
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ActionOutcome::Failed { .. })
    }
}

fn success_text(action: &Action, reply: &ActionReply) -> String {
    match (action, reply.status.as_str()) {
        (Action::Start, "already_running") => "Agent already running".to_string(),
        (Action::Start, _) => "Agent started".to_string(),
        (Action::Stop, _) => "Agent stopped".to_string(),
        (Action::Reload, _) => "Reload queued".to_string(),
        (Action::SwitchChannel(_), _) => match &reply.channel {
            Some(channel) => format!("Switching to {}", channel),
            None => "Switching to best channel".to_string(),
        },
        (Action::SaveSettings(_), _) => "Settings saved".to_string(),
    }
}

/// Run one action against the agent
pub async fn execute(client: &AgentClient, action: Action) -> ActionOutcome {
    let result = match &action {
        Action::Start => client.post_action(AgentCommand::Start).await,
        Action::Stop => client.post_action(AgentCommand::Stop).await,
        Action::Reload => client.post_action(AgentCommand::Reload).await,
        Action::SwitchChannel(channel) => client.switch_channel(channel.as_ref()).await,
        Action::SaveSettings(settings) => {
            return match client.put_settings(settings).await {
                Ok(saved) => ActionOutcome::SettingsSaved(saved),
                Err(error) => ActionOutcome::Failed { action, error },
            };
        }
    };

    match result {
        Ok(reply) => ActionOutcome::Done { action, reply },
        Err(error) => ActionOutcome::Failed { action, error },
    }
}

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Status message that disappears after a deadline
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    /// `None` keeps the message until replaced
    pub expires_at: Option<Instant>,
}

impl StatusMessage {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Spawns actions and tracks their status messages
pub struct ActionDispatcher {
    tasks: Vec<(u64, JoinHandle<ActionOutcome>)>,
    next_id: u64,
    clear_after: Duration,
    /// Header status line for start/stop/reload/switch
    action_status: Option<StatusMessage>,
    /// Inline status under the settings form
    settings_status: Option<StatusMessage>,
}

impl ActionDispatcher {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
            clear_after,
            action_status: None,
            settings_status: None,
        }
    }

    /// Spawn an action. Returns immediately.
    pub fn dispatch(&mut self, action: Action, client: &AgentClient) {
        tracing::info!("Dispatching {} action", action.name());
        let client = client.clone();
        self.next_id += 1;
        let handle = tokio::spawn(async move { execute(&client, action).await });
        self.tasks.push((self.next_id, handle));
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Collect finished actions, update status messages and drop expired ones
    pub fn poll(&mut self, now: Instant) -> Vec<StateEvent> {
        let mut events = Vec::new();

        for (_, result) in drain_finished(&mut self.tasks) {
            match result {
                Ok(outcome) => events.extend(self.record(outcome, now)),
                Err(join_err) => {
                    let msg = format!("Action task failed: {}", join_err);
                    events.push(StateEvent::LogError(msg.clone()));
                    self.action_status = Some(StatusMessage {
                        text: msg,
                        kind: StatusKind::Error,
                        expires_at: Some(now + self.clear_after),
                    });
                }
            }
        }

        self.expire(now);
        events
    }

    /// Turn an outcome into status messages and events
    pub fn record(&mut self, outcome: ActionOutcome, now: Instant) -> Vec<StateEvent> {
        let mut events = Vec::new();
        let text = outcome.status_text();
        let deadline = Some(now + self.clear_after);

        match outcome {
            ActionOutcome::SettingsSaved(saved) => {
                events.push(StateEvent::LogInfo(text.clone()));
                self.settings_status = Some(StatusMessage {
                    text,
                    kind: StatusKind::Success,
                    expires_at: deadline,
                });
                events.push(StateEvent::SettingsSaved(saved));
            }
            ActionOutcome::Failed {
                action: Action::SaveSettings(_),
                ref error,
            } => {
                events.push(StateEvent::LogError(text.clone()));
                // Validation problems stay next to the form until the next save
                let expires_at = if error.is_validation() { None } else { deadline };
                self.settings_status = Some(StatusMessage {
                    text,
                    kind: StatusKind::Error,
                    expires_at,
                });
            }
            ActionOutcome::Failed { .. } => {
                events.push(StateEvent::LogError(text.clone()));
                self.action_status = Some(StatusMessage {
                    text,
                    kind: StatusKind::Error,
                    expires_at: deadline,
                });
            }
            ActionOutcome::Done { .. } => {
                events.push(StateEvent::LogInfo(text.clone()));
                self.action_status = Some(StatusMessage {
                    text,
                    kind: StatusKind::Success,
                    expires_at: deadline,
                });
            }
        }

        events
    }

    /// Drop status messages past their deadline
    pub fn expire(&mut self, now: Instant) {
        if self.action_status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.action_status = None;
        }
        if self.settings_status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.settings_status = None;
        }
    }

    pub fn action_status(&self) -> Option<&StatusMessage> {
        self.action_status.as_ref()
    }

    pub fn settings_status(&self) -> Option<&StatusMessage> {
        self.settings_status.as_ref()
    }

    /// Earliest status deadline, for repaint scheduling
    pub fn next_deadline(&self) -> Option<Instant> {
        [&self.action_status, &self.settings_status]
            .into_iter()
            .flatten()
            .filter_map(|s| s.expires_at)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn reply(status: &str) -> ActionReply {
        ActionReply {
            status: status.to_string(),
            channel: None,
        }
    }

    #[test]
    fn test_success_texts() {
        assert_eq!(success_text(&Action::Start, &reply("started")), "Agent started");
        assert_eq!(
            success_text(&Action::Start, &reply("already_running")),
            "Agent already running"
        );
        assert_eq!(success_text(&Action::Reload, &reply("queued")), "Reload queued");

        let switched = ActionReply {
            status: "queued".into(),
            channel: Some(ChannelRef::Login("shroud".into())),
        };
        assert_eq!(
            success_text(&Action::SwitchChannel(Some(ChannelRef::Login("shroud".into()))), &switched),
            "Switching to shroud"
        );
        assert_eq!(
            success_text(&Action::SwitchChannel(None), &reply("queued")),
            "Switching to best channel"
        );
    }

    #[test]
    fn test_status_auto_clears() {
        let mut dispatcher = ActionDispatcher::new(STATUS_CLEAR_AFTER);
        let now = Instant::now();

        dispatcher.record(
            ActionOutcome::Done {
                action: Action::Stop,
                reply: reply("stopped"),
            },
            now,
        );
        assert_eq!(dispatcher.action_status().unwrap().text, "Agent stopped");
        assert_eq!(dispatcher.next_deadline(), Some(now + STATUS_CLEAR_AFTER));

        dispatcher.expire(now + Duration::from_secs(2));
        assert!(dispatcher.action_status().is_some());
        dispatcher.expire(now + STATUS_CLEAR_AFTER);
        assert!(dispatcher.action_status().is_none());
    }

    #[test]
    fn test_failure_becomes_visible_error() {
        let mut dispatcher = ActionDispatcher::new(STATUS_CLEAR_AFTER);
        let events = dispatcher.record(
            ActionOutcome::Failed {
                action: Action::Start,
                error: ApiError::Network("connection refused".into()),
            },
            Instant::now(),
        );

        let status = dispatcher.action_status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Failed to start: network error: connection refused");
        assert!(matches!(events[0], StateEvent::LogError(_)));
    }

    #[test]
    fn test_settings_outcomes() {
        let mut dispatcher = ActionDispatcher::new(STATUS_CLEAR_AFTER);
        let now = Instant::now();
        let saved = Settings::default();

        let events = dispatcher.record(ActionOutcome::SettingsSaved(saved.clone()), now);
        assert!(events.iter().any(|e| matches!(e, StateEvent::SettingsSaved(s) if *s == saved)));
        assert_eq!(dispatcher.settings_status().unwrap().kind, StatusKind::Success);
        assert!(dispatcher.action_status().is_none());

        dispatcher.record(
            ActionOutcome::Failed {
                action: Action::SaveSettings(saved),
                error: ApiError::Status {
                    status: 400,
                    message: "Unsupported or invalid field: proxy".into(),
                },
            },
            now,
        );
        // Validation errors stay until the next save
        dispatcher.expire(now + Duration::from_secs(60));
        let status = dispatcher.settings_status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("Unsupported or invalid field: proxy"));
    }

    #[tokio::test]
    async fn test_execute_maps_replies_and_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/actions/reload");
                then.status(200).json_body(json!({ "status": "queued" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/actions/stop");
                then.status(500).json_body(json!({ "error": "agent crashed" }));
            })
            .await;

        let client = AgentClient::new(&server.base_url(), None, Duration::from_secs(5)).unwrap();

        let outcome = execute(&client, Action::Reload).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.status_text(), "Reload queued");

        let outcome = execute(&client, Action::Stop).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.status_text(), "Failed to stop: agent crashed");
    }
}
