//! Wire types for the mining agent's JSON API.
//!
//! Everything here is server-authoritative and replaced wholesale on each
//! poll. Decoding is tolerant: every field has a default so a partial
//! payload (or one with explicit `null`s) still produces a usable value, and
//! unknown agent states
//! or channel statuses decode to an explicit `Unknown` variant instead of
//! failing the whole snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One `/api/snapshot` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub runtime: Option<RuntimeSnapshot>,
}

/// Agent state machine position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentState {
    Idle,
    InventoryFetch,
    GamesUpdate,
    ChannelsFetch,
    ChannelsCleanup,
    ChannelSwitch,
    Mining,
    Working,
    Exit,
    /// A state this client does not know about yet
    Unknown(String),
}

impl AgentState {
    /// Wire name of the state
    pub fn as_str(&self) -> &str {
        match self {
            AgentState::Idle => "IDLE",
            AgentState::InventoryFetch => "INVENTORY_FETCH",
            AgentState::GamesUpdate => "GAMES_UPDATE",
            AgentState::ChannelsFetch => "CHANNELS_FETCH",
            AgentState::ChannelsCleanup => "CHANNELS_CLEANUP",
            AgentState::ChannelSwitch => "CHANNEL_SWITCH",
            AgentState::Mining => "MINING",
            AgentState::Working => "WORKING",
            AgentState::Exit => "EXIT",
            AgentState::Unknown(name) => name,
        }
    }

    /// Whether the agent is actively earning drop progress
    pub fn is_active(&self) -> bool {
        match self {
            AgentState::Mining | AgentState::Working => true,
            AgentState::Idle
            | AgentState::InventoryFetch
            | AgentState::GamesUpdate
            | AgentState::ChannelsFetch
            | AgentState::ChannelsCleanup
            | AgentState::ChannelSwitch
            | AgentState::Exit
            | AgentState::Unknown(_) => false,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        match self {
            AgentState::Idle => "Idle",
            AgentState::InventoryFetch => "Fetching inventory",
            AgentState::GamesUpdate => "Updating games",
            AgentState::ChannelsFetch => "Fetching channels",
            AgentState::ChannelsCleanup => "Cleaning up channels",
            AgentState::ChannelSwitch => "Switching channel",
            AgentState::Mining => "Mining",
            AgentState::Working => "Working",
            AgentState::Exit => "Stopped",
            AgentState::Unknown(name) => name,
        }
    }
}

impl From<String> for AgentState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "IDLE" => AgentState::Idle,
            "INVENTORY_FETCH" => AgentState::InventoryFetch,
            "GAMES_UPDATE" => AgentState::GamesUpdate,
            "CHANNELS_FETCH" => AgentState::ChannelsFetch,
            "CHANNELS_CLEANUP" => AgentState::ChannelsCleanup,
            "CHANNEL_SWITCH" => AgentState::ChannelSwitch,
            "MINING" => AgentState::Mining,
            "WORKING" => AgentState::Working,
            "EXIT" => AgentState::Exit,
            _ => AgentState::Unknown(value),
        }
    }
}

impl From<AgentState> for String {
    fn from(value: AgentState) -> Self {
        value.as_str().to_string()
    }
}

/// Reference to a channel: numeric id or login name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelRef {
    Id(u64),
    Login(String),
}

impl ChannelRef {
    /// Classify free-form user input.
    ///
    /// Input that parses entirely as a number is an id, anything else is a
    /// login. Blank input yields `None`, which asks the agent to pick a
    /// channel itself.
    pub fn classify(input: &str) -> Option<ChannelRef> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        match input.parse::<u64>() {
            Ok(id) => Some(ChannelRef::Id(id)),
            Err(_) => Some(ChannelRef::Login(input.to_string())),
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Id(id) => write!(f, "{}", id),
            ChannelRef::Login(login) => f.write_str(login),
        }
    }
}

/// Channel online status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Online,
    Offline,
    PendingOnline,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ChannelStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ChannelStatus::Online => "online",
            ChannelStatus::Offline => "offline",
            ChannelStatus::PendingOnline => "pending",
            ChannelStatus::Unknown => "unknown",
        }
    }
}

/// A tracked channel. Also used for the `watching` reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub login: String,
    pub display_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: ChannelStatus,
    pub game: Option<String>,
    pub viewers: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub drops_enabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub acl_based: bool,
}

impl Channel {
    /// Display name, falling back to the login
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.login)
    }
}

/// A single timed drop inside a campaign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimedDrop {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_minutes: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub required_minutes: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub claimed: bool,
    pub can_claim: Option<bool>,
    pub progress: Option<f64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// A drop campaign for one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Campaign {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub game: String,
    #[serde(deserialize_with = "null_as_default")]
    pub active: bool,
    pub eligible: Option<bool>,
    pub upcoming: Option<bool>,
    pub progress: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub claimed_drops: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_drops: u32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub drops: Vec<TimedDrop>,
}

/// One entry of the activity journal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalEntry {
    pub time: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    pub category: Option<String>,
    #[serde(alias = "icon_hint")]
    pub icon: Option<String>,
}

/// Explicit `null` decodes like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Runtime part of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSnapshot {
    pub state: Option<AgentState>,
    pub watching: Option<Channel>,
    pub pending_switch: Option<ChannelRef>,
    /// Most recent first
    #[serde(deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub journal: Vec<JournalEntry>,
    pub sys_load: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_reload: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub campaigns: Vec<Campaign>,
    #[serde(deserialize_with = "null_as_default")]
    pub channels: Vec<Channel>,
}

/// How the agent orders campaigns when picking what to mine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityMode {
    #[default]
    PriorityOnly,
    EndingSoonest,
    LowAvblFirst,
}

impl PriorityMode {
    pub fn all() -> &'static [PriorityMode] {
        &[
            PriorityMode::PriorityOnly,
            PriorityMode::EndingSoonest,
            PriorityMode::LowAvblFirst,
        ]
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityMode::PriorityOnly => "PRIORITY_ONLY",
            PriorityMode::EndingSoonest => "ENDING_SOONEST",
            PriorityMode::LowAvblFirst => "LOW_AVBL_FIRST",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityMode::PriorityOnly => "Priority list only",
            PriorityMode::EndingSoonest => "Ending soonest",
            PriorityMode::LowAvblFirst => "Low availability first",
        }
    }

    /// Parse a wire name, case-insensitively
    pub fn parse(value: &str) -> Option<PriorityMode> {
        PriorityMode::all()
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Agent settings, editable from the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub language: String,
    pub proxy: String,
    pub priority: Vec<String>,
    pub exclude: Vec<String>,
    pub priority_mode: PriorityMode,
    pub connection_quality: i64,
    pub available_drops_check: bool,
    pub enable_badges_emotes: bool,
    pub tray_notifications: bool,
    pub autostart_tray: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: String::new(),
            proxy: String::new(),
            priority: Vec::new(),
            exclude: Vec::new(),
            priority_mode: PriorityMode::PriorityOnly,
            connection_quality: 1,
            available_drops_check: false,
            enable_badges_emotes: false,
            tray_notifications: true,
            autostart_tray: false,
        }
    }
}

/// Reply to an action request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionReply {
    pub status: String,
    pub channel: Option<ChannelRef>,
}

/// `/api/health` reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Health {
    pub status: String,
    pub running: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_state_roundtrip_and_unknown() {
        let state: AgentState = serde_json::from_value(json!("MINING")).unwrap();
        assert_eq!(state, AgentState::Mining);
        assert!(state.is_active());

        let state: AgentState = serde_json::from_value(json!("DREAMING")).unwrap();
        assert_eq!(state, AgentState::Unknown("DREAMING".to_string()));
        assert!(!state.is_active());
        assert_eq!(serde_json::to_value(&state).unwrap(), json!("DREAMING"));
    }

    #[test]
    fn test_channel_ref_classify() {
        assert_eq!(ChannelRef::classify("12345"), Some(ChannelRef::Id(12345)));
        assert_eq!(
            ChannelRef::classify("123abc"),
            Some(ChannelRef::Login("123abc".to_string()))
        );
        assert_eq!(
            ChannelRef::classify("  shroud "),
            Some(ChannelRef::Login("shroud".to_string()))
        );
        assert_eq!(ChannelRef::classify("   "), None);
    }

    #[test]
    fn test_partial_runtime_decodes_with_defaults() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "runtime": {
                "state": "WORKING",
                "campaigns": [{ "game": "Foo", "drops": [{ "name": "D1" }] }],
                "channels": [{ "login": "abc", "status": "something_new" }],
                "pending_switch": 42
            }
        }))
        .unwrap();

        assert!(snapshot.settings.is_none());
        let runtime = snapshot.runtime.unwrap();
        assert_eq!(runtime.state, Some(AgentState::Working));
        assert!(runtime.errors.is_empty());
        assert_eq!(runtime.campaigns[0].drops[0].required_minutes, 0);
        assert_eq!(runtime.channels[0].status, ChannelStatus::Unknown);
        assert_eq!(runtime.pending_switch, Some(ChannelRef::Id(42)));
    }

    #[test]
    fn test_settings_wire_format() {
        let settings: Settings = serde_json::from_value(json!({
            "language": "English",
            "priority": ["Game A", "Game B"],
            "priority_mode": "ENDING_SOONEST",
            "connection_quality": 3
        }))
        .unwrap();

        assert_eq!(settings.priority_mode, PriorityMode::EndingSoonest);
        assert!(settings.tray_notifications);

        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["priority_mode"], json!("ENDING_SOONEST"));
        assert_eq!(value["priority"], json!(["Game A", "Game B"]));
    }

    #[test]
    fn test_channel_name_fallback() {
        let channel = Channel {
            login: "some_login".to_string(),
            display_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(channel.name(), "some_login");
    }

    #[test]
    fn test_explicit_nulls_decode_as_defaults() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "runtime": {
                "state": "MINING",
                "errors": null,
                "campaigns": [{
                    "name": null,
                    "game": "Foo",
                    "claimed_drops": null,
                    "drops": [{ "name": "D1", "current_minutes": null, "required_minutes": 60 }]
                }],
                "channels": [{ "login": null, "display_name": "Shroud", "status": null }]
            }
        }))
        .unwrap();

        let runtime = snapshot.runtime.unwrap();
        assert_eq!(runtime.state, Some(AgentState::Mining));
        assert!(runtime.errors.is_empty());
        assert_eq!(runtime.campaigns[0].name, "");
        assert_eq!(runtime.campaigns[0].game, "Foo");
        assert_eq!(runtime.campaigns[0].claimed_drops, 0);
        assert_eq!(runtime.campaigns[0].drops[0].current_minutes, 0);
        assert_eq!(runtime.channels[0].login, "");
        assert_eq!(runtime.channels[0].name(), "Shroud");
        assert_eq!(runtime.channels[0].status, ChannelStatus::default());
    }
}
