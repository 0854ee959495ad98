use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::config::{ThemeMode, UiConfig};
use crate::model::task::Priority;
use crate::ops::notice::NoticeKind;

/// Parsed color theme for the TUI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub mode: ThemeMode,
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub blue: Color,
    pub selection_bg: Color,
    pub track: Color,
    pub search_match_bg: Color,
    pub search_match_fg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            mode: ThemeMode::Dark,
            background: Color::Rgb(0x0F, 0x0B, 0x1E),
            text: Color::Rgb(0xC4, 0xC0, 0xE8),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xA7, 0x8B, 0xFA),
            dim: Color::Rgb(0x6E, 0x69, 0x96),
            red: Color::Rgb(0xFF, 0x55, 0x66),
            yellow: Color::Rgb(0xFF, 0xC8, 0x4A),
            green: Color::Rgb(0x4A, 0xDE, 0x80),
            blue: Color::Rgb(0x60, 0xA5, 0xFA),
            selection_bg: Color::Rgb(0x2A, 0x21, 0x4D),
            track: Color::Rgb(0x2A, 0x26, 0x3F),
            search_match_bg: Color::Rgb(0x40, 0xE0, 0xD0),
            search_match_fg: Color::Rgb(0x0F, 0x0B, 0x1E),
        }
    }

    pub fn light() -> Self {
        Theme {
            mode: ThemeMode::Light,
            background: Color::Rgb(0xFA, 0xF8, 0xFF),
            text: Color::Rgb(0x3B, 0x34, 0x5C),
            text_bright: Color::Rgb(0x11, 0x0C, 0x26),
            highlight: Color::Rgb(0x7C, 0x3A, 0xED),
            dim: Color::Rgb(0x8E, 0x88, 0xAD),
            red: Color::Rgb(0xDC, 0x26, 0x26),
            yellow: Color::Rgb(0xB4, 0x6B, 0x00),
            green: Color::Rgb(0x16, 0xA3, 0x4A),
            blue: Color::Rgb(0x25, 0x63, 0xEB),
            selection_bg: Color::Rgb(0xEA, 0xE2, 0xFD),
            track: Color::Rgb(0xE4, 0xE0, 0xF0),
            search_match_bg: Color::Rgb(0xFD, 0xE6, 0x8A),
            search_match_fg: Color::Rgb(0x11, 0x0C, 0x26),
        }
    }

    /// Base palette for `mode` with the matching `[ui.light]` / `[ui.dark]`
    /// overrides applied. Unknown keys and malformed colors are ignored.
    pub fn from_config(ui: &UiConfig, mode: ThemeMode) -> Self {
        let (mut theme, overrides) = match mode {
            ThemeMode::Light => (Theme::light(), &ui.light),
            ThemeMode::Dark => (Theme::dark(), &ui.dark),
        };
        theme.apply_overrides(overrides);
        theme
    }

    fn apply_overrides(&mut self, overrides: &HashMap<String, String>) {
        for (key, value) in overrides {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => self.background = color,
                "text" => self.text = color,
                "text_bright" => self.text_bright = color,
                "highlight" => self.highlight = color,
                "dim" => self.dim = color,
                "red" => self.red = color,
                "yellow" => self.yellow = color,
                "green" => self.green = color,
                "blue" => self.blue = color,
                "selection_bg" => self.selection_bg = color,
                "track" => self.track = color,
                "search_match_bg" => self.search_match_bg = color,
                "search_match_fg" => self.search_match_fg = color,
                _ => {}
            }
        }
    }

    pub fn priority_color(&self, priority: Priority) -> Color {
        match priority {
            Priority::High => self.red,
            Priority::Medium => self.yellow,
            Priority::Low => self.blue,
        }
    }

    pub fn notice_color(&self, kind: NoticeKind) -> Color {
        match kind {
            NoticeKind::Info => self.green,
            NoticeKind::Error => self.red,
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(
            parse_hex_color("#7C3AED"),
            Some(Color::Rgb(0x7C, 0x3A, 0xED))
        );
        assert_eq!(parse_hex_color("7C3AED"), None);
        assert_eq!(parse_hex_color("#7C3A"), None);
        assert_eq!(parse_hex_color("#ZZZZZZ"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn overrides_follow_the_mode() {
        let mut ui = UiConfig::default();
        ui.light.insert("highlight".into(), "#000001".into());
        ui.dark.insert("highlight".into(), "#000002".into());
        ui.dark.insert("bogus".into(), "#000003".into());
        ui.dark.insert("red".into(), "not a color".into());

        let light = Theme::from_config(&ui, ThemeMode::Light);
        let dark = Theme::from_config(&ui, ThemeMode::Dark);
        assert_eq!(light.highlight, Color::Rgb(0, 0, 1));
        assert_eq!(dark.highlight, Color::Rgb(0, 0, 2));
        assert_eq!(dark.red, Theme::dark().red);
        assert_eq!(light.mode, ThemeMode::Light);
    }

    #[test]
    fn defaults_without_overrides() {
        let ui = UiConfig::default();
        assert_eq!(Theme::from_config(&ui, ThemeMode::Dark), Theme::dark());
        assert_eq!(Theme::from_config(&ui, ThemeMode::Light), Theme::light());
    }
}
