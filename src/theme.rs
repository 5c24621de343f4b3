//! Dialog colors, with optional hex overrides from the config file

use ratatui::style::Color;

use crate::config::ThemeOverrides;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Focused borders, highlights, key hints
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Labels, hints, disabled buttons
    pub bg_selected: Color, // Highlighted list row
    pub inactive: Color,    // Unfocused borders
    pub danger: Color,      // Status messages, Cancel
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            danger: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides applied. Invalid colors are logged and skipped.
    pub fn from_overrides(overrides: &ThemeOverrides) -> Self {
        let mut theme = Self::default();

        let slots: [(&str, &Option<String>, &mut Color); 6] = [
            ("accent", &overrides.accent, &mut theme.accent),
            ("text", &overrides.text, &mut theme.text),
            ("text_dim", &overrides.text_dim, &mut theme.text_dim),
            ("bg_selected", &overrides.bg_selected, &mut theme.bg_selected),
            ("inactive", &overrides.inactive, &mut theme.inactive),
            ("danger", &overrides.danger, &mut theme.danger),
        ];

        for (key, value, slot) in slots {
            let Some(value) = value else { continue };
            match parse_hex_color(value) {
                Some(color) => *slot = color,
                None => tracing::warn!("Invalid color for theme.{}: {:?}", key, value),
            }
        }

        theme
    }
}

/// Parse a hex color string (#RRGGBB or #RGB)
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim().trim_start_matches('#');

    if !s.is_ascii() {
        return None;
    }

    if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
        let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
        let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
        Some(Color::Rgb(r, g, b))
    } else {
        None
    }
}
