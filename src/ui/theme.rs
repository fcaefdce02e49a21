use eframe::egui::{self, Color32, CornerRadius, Stroke, Visuals};
use serde::{Deserialize, Serialize};

/// Available theme presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreset {
    #[default]
    Glitch,
    Midnight,
    Amber,
    Green,
    Catppuccin,
}

impl ThemePreset {
    /// Get all available presets
    pub fn all() -> &'static [ThemePreset] {
        &[
            ThemePreset::Glitch,
            ThemePreset::Midnight,
            ThemePreset::Amber,
            ThemePreset::Green,
            ThemePreset::Catppuccin,
        ]
    }

    /// Get display name for the preset
    pub fn name(&self) -> &'static str {
        match self {
            ThemePreset::Glitch => "Glitch",
            ThemePreset::Midnight => "Midnight",
            ThemePreset::Amber => "Amber",
            ThemePreset::Green => "Green",
            ThemePreset::Catppuccin => "Catppuccin Mocha",
        }
    }

    /// Parse a preset by its config key or display name
    pub fn parse(value: &str) -> Option<ThemePreset> {
        let value = value.trim();
        Self::all().iter().copied().find(|preset| {
            preset.key().eq_ignore_ascii_case(value) || preset.name().eq_ignore_ascii_case(value)
        })
    }

    fn key(&self) -> &'static str {
        match self {
            ThemePreset::Glitch => "glitch",
            ThemePreset::Midnight => "midnight",
            ThemePreset::Amber => "amber",
            ThemePreset::Green => "green",
            ThemePreset::Catppuccin => "catppuccin",
        }
    }

    /// Get the theme colors for this preset
    pub fn theme(&self) -> Theme {
        match self {
            ThemePreset::Glitch => Theme::glitch(),
            ThemePreset::Midnight => Theme::midnight(),
            ThemePreset::Amber => Theme::amber(),
            ThemePreset::Green => Theme::green(),
            ThemePreset::Catppuccin => Theme::catppuccin(),
        }
    }
}

/// Theme color definitions
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub bg_darkest: Color32,
    pub bg_dark: Color32,
    pub bg_medium: Color32,
    pub bg_light: Color32,

    // Text colors
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    // Accent colors
    pub accent: Color32,
    pub accent_hover: Color32,
    pub accent_muted: Color32,

    // Semantic colors
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,

    /// Live channels, active campaigns
    pub online: Color32,
    /// Offline channels, inactive agent
    pub offline: Color32,
    /// Priority campaign marker
    pub priority: Color32,

    // UI element colors
    pub border: Color32,
    pub selection: Color32,
}

impl Theme {
    /// Twitch-like purple
    pub fn glitch() -> Self {
        let accent = Color32::from_rgb(145, 70, 255);
        Self {
            bg_darkest: Color32::from_rgb(14, 14, 16),
            bg_dark: Color32::from_rgb(24, 24, 27),
            bg_medium: Color32::from_rgb(31, 31, 35),
            bg_light: Color32::from_rgb(50, 50, 57),

            text_primary: Color32::from_rgb(239, 239, 241),
            text_secondary: Color32::from_rgb(191, 191, 200),
            text_muted: Color32::from_rgb(135, 135, 148),

            accent,
            accent_hover: Color32::from_rgb(169, 112, 255),
            accent_muted: Color32::from_rgb(100, 52, 180),

            success: Color32::from_rgb(0, 200, 120),
            warning: Color32::from_rgb(255, 196, 0),
            error: Color32::from_rgb(235, 4, 0),

            online: Color32::from_rgb(235, 4, 0),
            offline: Color32::from_rgb(110, 110, 120),
            priority: Color32::from_rgb(255, 196, 0),

            border: Color32::from_rgb(58, 58, 66),
            selection: accent.gamma_multiply(0.3),
        }
    }

    /// Dark blue, low contrast
    pub fn midnight() -> Self {
        let accent = Color32::from_rgb(96, 165, 250);
        Self {
            bg_darkest: Color32::from_rgb(8, 12, 22),
            bg_dark: Color32::from_rgb(13, 19, 33),
            bg_medium: Color32::from_rgb(20, 28, 46),
            bg_light: Color32::from_rgb(33, 44, 66),

            text_primary: Color32::from_rgb(226, 232, 240),
            text_secondary: Color32::from_rgb(180, 192, 210),
            text_muted: Color32::from_rgb(120, 134, 156),

            accent,
            accent_hover: Color32::from_rgb(147, 197, 253),
            accent_muted: Color32::from_rgb(59, 110, 190),

            success: Color32::from_rgb(52, 211, 153),
            warning: Color32::from_rgb(251, 191, 36),
            error: Color32::from_rgb(248, 113, 113),

            online: Color32::from_rgb(52, 211, 153),
            offline: Color32::from_rgb(100, 116, 139),
            priority: Color32::from_rgb(251, 191, 36),

            border: Color32::from_rgb(45, 58, 82),
            selection: accent.gamma_multiply(0.3),
        }
    }

    pub fn amber() -> Self {
        let accent = Color32::from_rgb(245, 158, 11);
        Self {
            bg_darkest: Color32::from_rgb(16, 16, 18),
            bg_dark: Color32::from_rgb(24, 24, 27),
            bg_medium: Color32::from_rgb(32, 32, 36),
            bg_light: Color32::from_rgb(48, 48, 54),

            text_primary: Color32::from_rgb(250, 250, 250),
            text_secondary: Color32::from_rgb(200, 200, 200),
            text_muted: Color32::from_rgb(140, 140, 140),

            accent,
            accent_hover: Color32::from_rgb(251, 191, 36),
            accent_muted: Color32::from_rgb(180, 116, 8),

            success: Color32::from_rgb(34, 197, 94),
            warning: Color32::from_rgb(234, 179, 8),
            error: Color32::from_rgb(239, 68, 68),

            online: Color32::from_rgb(34, 197, 94),
            offline: Color32::from_rgb(113, 113, 122),
            priority: accent,

            border: Color32::from_rgb(63, 63, 70),
            selection: accent.gamma_multiply(0.3),
        }
    }

    /// Terminal green
    pub fn green() -> Self {
        let accent = Color32::from_rgb(34, 197, 94);
        Self {
            bg_darkest: Color32::from_rgb(12, 17, 14),
            bg_dark: Color32::from_rgb(20, 28, 22),
            bg_medium: Color32::from_rgb(28, 40, 32),
            bg_light: Color32::from_rgb(42, 58, 46),

            text_primary: Color32::from_rgb(240, 253, 244),
            text_secondary: Color32::from_rgb(190, 220, 200),
            text_muted: Color32::from_rgb(120, 150, 130),

            accent,
            accent_hover: Color32::from_rgb(74, 222, 128),
            accent_muted: Color32::from_rgb(22, 150, 70),

            success: Color32::from_rgb(74, 222, 128),
            warning: Color32::from_rgb(253, 224, 71),
            error: Color32::from_rgb(252, 165, 165),

            online: Color32::from_rgb(74, 222, 128),
            offline: Color32::from_rgb(90, 110, 96),
            priority: Color32::from_rgb(253, 224, 71),

            border: Color32::from_rgb(50, 70, 55),
            selection: accent.gamma_multiply(0.3),
        }
    }

    pub fn catppuccin() -> Self {
        let accent = Color32::from_rgb(203, 166, 247); // Mauve
        Self {
            bg_darkest: Color32::from_rgb(17, 17, 27), // Crust
            bg_dark: Color32::from_rgb(24, 24, 37),    // Mantle
            bg_medium: Color32::from_rgb(30, 30, 46),  // Base
            bg_light: Color32::from_rgb(49, 50, 68),   // Surface0

            text_primary: Color32::from_rgb(205, 214, 244),
            text_secondary: Color32::from_rgb(186, 194, 222),
            text_muted: Color32::from_rgb(147, 153, 178),

            accent,
            accent_hover: Color32::from_rgb(180, 190, 254), // Lavender
            accent_muted: Color32::from_rgb(150, 120, 200),

            success: Color32::from_rgb(166, 227, 161),
            warning: Color32::from_rgb(249, 226, 175),
            error: Color32::from_rgb(243, 139, 168),

            online: Color32::from_rgb(166, 227, 161),
            offline: Color32::from_rgb(108, 112, 134), // Overlay0
            priority: Color32::from_rgb(250, 179, 135), // Peach

            border: Color32::from_rgb(69, 71, 90),
            selection: accent.gamma_multiply(0.3),
        }
    }

    /// Apply this theme to egui's visuals
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::dark();

        visuals.window_fill = self.bg_dark;
        visuals.panel_fill = self.bg_dark;
        visuals.faint_bg_color = self.bg_medium;
        visuals.extreme_bg_color = self.bg_darkest;

        let widgets = &mut visuals.widgets;
        widgets.noninteractive.bg_fill = self.bg_medium;
        widgets.noninteractive.weak_bg_fill = self.bg_light;
        widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.border);
        widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_secondary);

        widgets.inactive.bg_fill = self.bg_medium;
        widgets.inactive.weak_bg_fill = self.bg_light;
        widgets.inactive.bg_stroke = Stroke::new(1.0, self.border);
        widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_primary);

        widgets.hovered.bg_fill = self.bg_light;
        widgets.hovered.weak_bg_fill = self.bg_light;
        widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent);
        widgets.hovered.fg_stroke = Stroke::new(1.0, self.text_primary);

        widgets.active.bg_fill = self.accent_muted;
        widgets.active.weak_bg_fill = self.accent_muted;
        widgets.active.bg_stroke = Stroke::new(1.0, self.accent_hover);
        widgets.active.fg_stroke = Stroke::new(1.0, self.text_primary);

        widgets.open.bg_fill = self.bg_light;
        widgets.open.weak_bg_fill = self.bg_light;
        widgets.open.bg_stroke = Stroke::new(1.0, self.accent);
        widgets.open.fg_stroke = Stroke::new(1.0, self.text_primary);

        for state in [
            &mut widgets.noninteractive,
            &mut widgets.inactive,
            &mut widgets.hovered,
            &mut widgets.active,
            &mut widgets.open,
        ] {
            state.corner_radius = CornerRadius::same(4);
        }

        visuals.selection.bg_fill = self.selection;
        visuals.selection.stroke = Stroke::new(1.0, self.accent);
        visuals.hyperlink_color = self.accent;

        visuals.window_stroke = Stroke::new(1.0, self.border);
        visuals.window_shadow = egui::epaint::Shadow::NONE;
        visuals.popup_shadow = egui::epaint::Shadow::NONE;

        ctx.set_visuals(visuals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preset() {
        assert_eq!(ThemePreset::parse("glitch"), Some(ThemePreset::Glitch));
        assert_eq!(ThemePreset::parse("Catppuccin Mocha"), Some(ThemePreset::Catppuccin));
        assert_eq!(ThemePreset::parse(" MIDNIGHT "), Some(ThemePreset::Midnight));
        assert_eq!(ThemePreset::parse("neon"), None);
    }

    #[test]
    fn test_preset_config_key_matches_serde() {
        for preset in ThemePreset::all() {
            let json = serde_json::to_string(preset).unwrap();
            assert_eq!(json, format!("\"{}\"", preset.key()));
        }
    }
}
