use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::theme_store::ThemePreference;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_dim: String,
    pub accent: String,
    pub border: String,
    pub border_focused: String,
    pub divider: String,
    pub divider_active: String,
    pub header_bg: String,
    pub header_fg: String,
    pub selection_bg: String,
    pub cursor_bg: String,
    pub cursor_fg: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// Palette for a light/dark preference. A user file at
    /// `<config_dir>/kata-dojo/themes/<name>.toml` overrides the bundled one.
    pub fn for_preference(pref: ThemePreference) -> Self {
        Self::load(pref.as_str()).unwrap_or_else(|| match pref {
            ThemePreference::Dark => Self {
                name: "dark".to_string(),
                colors: ThemeColors::default(),
            },
            ThemePreference::Light => Self {
                name: "light".to_string(),
                colors: ThemeColors::light(),
            },
        })
    }

    pub fn load(name: &str) -> Option<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("kata-dojo")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                match toml::from_str::<Theme>(&content) {
                    Ok(theme) => return Some(theme),
                    Err(e) => {
                        tracing::warn!(path = %user_theme_path.display(), error = %e, "bad user theme")
                    }
                }
            }
        }

        let filename = format!("{name}.toml");
        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            text_dim: "#6c7086".to_string(),
            accent: "#89b4fa".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            divider: "#45475a".to_string(),
            divider_active: "#f9e2af".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            selection_bg: "#45475a".to_string(),
            cursor_bg: "#f5e0dc".to_string(),
            cursor_fg: "#1e1e2e".to_string(),
            error: "#f38ba8".to_string(),
            warning: "#f9e2af".to_string(),
            success: "#a6e3a1".to_string(),
        }
    }
}

impl ThemeColors {
    fn light() -> Self {
        Self {
            bg: "#eff1f5".to_string(),
            fg: "#4c4f69".to_string(),
            text_dim: "#8c8fa1".to_string(),
            accent: "#1e66f5".to_string(),
            border: "#bcc0cc".to_string(),
            border_focused: "#1e66f5".to_string(),
            divider: "#bcc0cc".to_string(),
            divider_active: "#df8e1d".to_string(),
            header_bg: "#e6e9ef".to_string(),
            header_fg: "#4c4f69".to_string(),
            selection_bg: "#ccd0da".to_string(),
            cursor_bg: "#dc8a78".to_string(),
            cursor_fg: "#eff1f5".to_string(),
            error: "#d20f39".to_string(),
            warning: "#df8e1d".to_string(),
            success: "#40a02b".to_string(),
        }
    }

    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::Reset
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_dim(&self) -> Color { Self::parse_color(&self.text_dim) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn divider(&self) -> Color { Self::parse_color(&self.divider) }
    pub fn divider_active(&self) -> Color { Self::parse_color(&self.divider_active) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn selection_bg(&self) -> Color { Self::parse_color(&self.selection_bg) }
    pub fn cursor_bg(&self) -> Color { Self::parse_color(&self.cursor_bg) }
    pub fn cursor_fg(&self) -> Color { Self::parse_color(&self.cursor_fg) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}
