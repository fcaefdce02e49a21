//! Editable form layer over agent `Settings`.
//!
//! Game lists are edited as comma-joined strings. Reading the form back
//! splits on commas, trims each entry and drops empties; order is kept and
//! duplicates are allowed.

use thiserror::Error;

use crate::model::{PriorityMode, Settings};

/// Error setting a form field by name
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown settings field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Field names accepted by `SettingsForm::set_field`
pub const FIELDS: &[&str] = &[
    "language",
    "proxy",
    "priority",
    "exclude",
    "priority_mode",
    "connection_quality",
    "available_drops_check",
    "enable_badges_emotes",
    "tray_notifications",
    "autostart_tray",
];

/// Split a comma-joined list into trimmed, non-empty entries
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join a list for display in a single-line field
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

/// The settings form as the user edits it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsForm {
    pub language: String,
    pub proxy: String,
    /// Comma-joined priority games
    pub priority: String,
    /// Comma-joined excluded games
    pub exclude: String,
    pub priority_mode: PriorityMode,
    pub connection_quality: i64,
    pub available_drops_check: bool,
    pub enable_badges_emotes: bool,
    pub tray_notifications: bool,
    pub autostart_tray: bool,
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings) -> Self {
        let mut form = Self::default();
        form.fill(settings);
        form
    }

    /// Overwrite every field with `settings`
    pub fn fill(&mut self, settings: &Settings) {
        self.language = settings.language.clone();
        self.proxy = settings.proxy.clone();
        self.priority = join_list(&settings.priority);
        self.exclude = join_list(&settings.exclude);
        self.priority_mode = settings.priority_mode;
        self.connection_quality = settings.connection_quality;
        self.available_drops_check = settings.available_drops_check;
        self.enable_badges_emotes = settings.enable_badges_emotes;
        self.tray_notifications = settings.tray_notifications;
        self.autostart_tray = settings.autostart_tray;
    }

    /// Build the payload for `PUT /api/settings`
    pub fn to_settings(&self) -> Settings {
        Settings {
            language: self.language.trim().to_string(),
            proxy: self.proxy.trim().to_string(),
            priority: parse_list(&self.priority),
            exclude: parse_list(&self.exclude),
            priority_mode: self.priority_mode,
            connection_quality: self.connection_quality,
            available_drops_check: self.available_drops_check,
            enable_badges_emotes: self.enable_badges_emotes,
            tray_notifications: self.tray_notifications,
            autostart_tray: self.autostart_tray,
        }
    }

    /// Set one field from its textual form (used by the command line)
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        let invalid = || FormError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        };

        match field {
            "language" => self.language = value.to_string(),
            "proxy" => self.proxy = value.to_string(),
            "priority" => self.priority = value.to_string(),
            "exclude" => self.exclude = value.to_string(),
            "priority_mode" => {
                self.priority_mode = PriorityMode::parse(value).ok_or_else(invalid)?;
            }
            "connection_quality" => {
                self.connection_quality = value.trim().parse().map_err(|_| invalid())?;
            }
            "available_drops_check" => {
                self.available_drops_check = parse_bool(value).ok_or_else(invalid)?;
            }
            "enable_badges_emotes" => {
                self.enable_badges_emotes = parse_bool(value).ok_or_else(invalid)?;
            }
            "tray_notifications" => {
                self.tray_notifications = parse_bool(value).ok_or_else(invalid)?;
            }
            "autostart_tray" => {
                self.autostart_tray = parse_bool(value).ok_or_else(invalid)?;
            }
            _ => return Err(FormError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
