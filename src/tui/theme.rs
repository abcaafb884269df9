//! Theme support for the TUI.
//!
//! Three built-in themes are available: default, Dracula and Nord. The
//! name is read from `ui.theme` in the config file.

use ratatui::style::Color;

use crate::workflow::WorkflowState;

/// A complete color theme for the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Theme name for display and configuration
    pub name: String,
    /// Primary accent color (titles, active fields)
    pub primary: Color,
    /// Secondary accent color (draft text, confirmations)
    pub secondary: Color,
    /// Tertiary accent color (in-flight requests)
    pub accent: Color,
    /// Main text color
    pub text: Color,
    /// Dimmed text color (labels, secondary info)
    pub text_dim: Color,
    /// Muted text color (placeholders, hints)
    pub text_muted: Color,
    /// Background color (Reset uses terminal default)
    pub background: Color,
    /// Border color
    pub border: Color,
    /// Success indicator color
    pub success: Color,
    /// Warning indicator color
    pub warning: Color,
    /// Error indicator color
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    /// Default theme - works well on both light and dark terminals.
    pub fn default_theme() -> Self {
        Self {
            name: "default".to_string(),
            primary: Color::Rgb(99, 102, 241),     // Indigo
            secondary: Color::Rgb(16, 185, 129),   // Emerald
            accent: Color::Rgb(251, 146, 60),      // Orange
            text: Color::White,
            text_dim: Color::Rgb(156, 163, 175),   // Gray-400
            text_muted: Color::Rgb(107, 114, 128), // Gray-500
            background: Color::Reset,
            border: Color::Rgb(75, 85, 99),        // Gray-600
            success: Color::Rgb(34, 197, 94),      // Green
            warning: Color::Rgb(234, 179, 8),      // Yellow
            error: Color::Rgb(239, 68, 68),        // Red
        }
    }

    /// Dracula theme - dark purple and pink.
    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),
            primary: Color::Rgb(189, 147, 249),   // Purple
            secondary: Color::Rgb(80, 250, 123),  // Green
            accent: Color::Rgb(255, 121, 198),    // Pink
            text: Color::Rgb(248, 248, 242),      // Foreground
            text_dim: Color::Rgb(189, 147, 249),  // Purple (dimmed)
            text_muted: Color::Rgb(98, 114, 164), // Comment
            background: Color::Rgb(40, 42, 54),   // Background
            border: Color::Rgb(68, 71, 90),       // Selection
            success: Color::Rgb(80, 250, 123),    // Green
            warning: Color::Rgb(255, 184, 108),   // Orange
            error: Color::Rgb(255, 85, 85),       // Red
        }
    }

    /// Nord theme - arctic, bluish colors.
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            primary: Color::Rgb(136, 192, 208),   // Nord8 (Frost)
            secondary: Color::Rgb(163, 190, 140), // Nord14 (Aurora Green)
            accent: Color::Rgb(208, 135, 112),    // Nord12 (Aurora Orange)
            text: Color::Rgb(236, 239, 244),      // Nord6 (Snow Storm)
            text_dim: Color::Rgb(216, 222, 233),  // Nord5
            text_muted: Color::Rgb(76, 86, 106),  // Nord3 (Polar Night)
            background: Color::Rgb(46, 52, 64),   // Nord0
            border: Color::Rgb(67, 76, 94),       // Nord2
            success: Color::Rgb(163, 190, 140),   // Nord14
            warning: Color::Rgb(235, 203, 139),   // Nord13
            error: Color::Rgb(191, 97, 106),      // Nord11
        }
    }

    /// Get a theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "default" => Some(Self::default_theme()),
            "dracula" => Some(Self::dracula()),
            "nord" => Some(Self::nord()),
            _ => None,
        }
    }

    /// List all available built-in theme names.
    pub fn available_themes() -> Vec<&'static str> {
        vec!["default", "dracula", "nord"]
    }

    /// Badge color for a workflow state.
    pub fn state_color(&self, state: &WorkflowState) -> Color {
        match state {
            WorkflowState::Idle => self.text_dim,
            WorkflowState::Generating { .. } | WorkflowState::Scheduling { .. } => self.accent,
            WorkflowState::DraftReady { .. } => self.primary,
            WorkflowState::Scheduled { .. } => self.success,
            WorkflowState::Failed { .. } => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Draft, WorkflowError};

    #[test]
    fn test_default_theme() {
        let theme = Theme::default();
        assert_eq!(theme.name, "default");
    }

    #[test]
    fn test_theme_by_name() {
        assert!(Theme::by_name("dracula").is_some());
        assert!(Theme::by_name("DRACULA").is_some());
        assert!(Theme::by_name(" Nord ").is_some());
        assert!(Theme::by_name("solarized-dark").is_none());
    }

    #[test]
    fn test_all_builtin_themes_valid() {
        for name in Theme::available_themes() {
            let theme = Theme::by_name(name).unwrap_or_else(|| panic!("Theme {} should exist", name));
            assert_eq!(theme.name, name);
        }
    }

    #[test]
    fn test_theme_colors_different() {
        let dracula = Theme::dracula();
        let nord = Theme::nord();

        assert_ne!(dracula.primary, nord.primary);
        assert_ne!(dracula.background, nord.background);
    }

    #[test]
    fn test_state_colors() {
        let theme = Theme::default();
        let failed = WorkflowState::Failed {
            error: WorkflowError::Generation("down".to_string()),
            draft: None,
        };
        let ready = WorkflowState::DraftReady { draft: Draft::new("x"), scheduled_time: None };

        assert_eq!(theme.state_color(&failed), theme.error);
        assert_eq!(theme.state_color(&ready), theme.primary);
        assert_eq!(theme.state_color(&WorkflowState::Generating { prior: None }), theme.accent);
    }
}
