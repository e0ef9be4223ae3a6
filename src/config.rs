use gloo_storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};

pub const SETTINGS_KEY: &str = "blockdoc.settings";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Theme {
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub border_color: String,
    pub hover_color: String,
    pub selected_color: String,
    pub toolbar_background: String,
    pub toolbar_border: String,
    pub block_hover_color: String,
    pub block_selected_color: String,
    pub inline_toolbar_background: String,
    pub focused_block_border: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#3370ff".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#1f2329".to_string(),
            border_color: "#e7e9e8".to_string(),
            hover_color: "#f5f6f7".to_string(),
            selected_color: "#eef0ff".to_string(),
            toolbar_background: "#ffffff".to_string(),
            toolbar_border: "#e7e9e8".to_string(),
            block_hover_color: "#f8f9fa".to_string(),
            block_selected_color: "#e8f4ff".to_string(),
            inline_toolbar_background: "#ffffff".to_string(),
            focused_block_border: "#3370ff".to_string(),
        }
    }
}

/// Timing and theme knobs for the editor page. Missing fields fall back
/// to their defaults, so partial JSON in local storage is fine.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    pub font_size: u32,
    pub placeholder: String,
    pub plus_button_delay_ms: u32,
    pub plus_button_hide_delay_ms: u32,
    pub inline_toolbar_delay_ms: u32,
    pub auto_save_interval_ms: u32,
    pub simulated_save_latency_ms: u32,
    pub min_height: u32,
    pub theme: Theme,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            font_size: 16,
            placeholder: "Type / for commands".to_string(),
            plus_button_delay_ms: 200,
            plus_button_hide_delay_ms: 150,
            inline_toolbar_delay_ms: 100,
            auto_save_interval_ms: 30_000,
            simulated_save_latency_ms: 800,
            min_height: 500,
            theme: Theme::default(),
        }
    }
}

impl EditorSettings {
    /// Stored settings, or defaults when nothing (or garbage) is stored.
    pub fn load() -> Self {
        match LocalStorage::get::<EditorSettings>(SETTINGS_KEY) {
            Ok(settings) => settings,
            Err(gloo_storage::errors::StorageError::KeyNotFound(_)) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable editor settings");
                Self::default()
            }
        }
    }

    /// Inline style exposing the theme as CSS custom properties.
    pub fn css_variables(&self) -> String {
        let t = &self.theme;
        format!(
            "--editor-font-size: {}px; --primary-color: {}; --bg-primary: {}; --text-primary: {}; --border-color: {}; --hover-color: {}; --selected-color: {}; --toolbar-bg: {}; --toolbar-border: {}; --block-hover: {}; --block-selected: {}; --inline-toolbar-bg: {}; --focused-block-border: {};",
            self.font_size,
            t.primary_color,
            t.background_color,
            t.text_color,
            t.border_color,
            t.hover_color,
            t.selected_color,
            t.toolbar_background,
            t.toolbar_border,
            t.block_hover_color,
            t.block_selected_color,
            t.inline_toolbar_background,
            t.focused_block_border,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let raw = r##"{"plus_button_delay_ms": 350, "theme": {"primary_color": "#ff0000"}}"##;
        let settings = serde_json::from_str::<EditorSettings>(raw).unwrap();
        assert_eq!(settings.plus_button_delay_ms, 350);
        assert_eq!(settings.inline_toolbar_delay_ms, 100);
        assert_eq!(settings.auto_save_interval_ms, 30_000);
        assert_eq!(settings.theme.primary_color, "#ff0000");
        assert_eq!(settings.theme.text_color, "#1f2329");
    }

    #[test]
    fn css_variables_carry_theme() {
        let css = EditorSettings::default().css_variables();
        assert!(css.starts_with("--editor-font-size: 16px;"));
        assert!(css.contains("--primary-color: #3370ff;"));
        assert!(css.contains("--focused-block-border: #3370ff;"));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(serde_json::from_str::<EditorSettings>(r#"{"font_size": "big"}"#).is_err());
    }
}
