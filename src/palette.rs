use std::fmt;

use ratatui::style::Color;

/// A color usable both in the full-screen session and on a plain terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteColor {
    tui: Color,
    ansi: &'static str,
}

impl PaletteColor {
    pub const fn new(tui: Color, ansi: &'static str) -> Self {
        Self { tui, ansi }
    }

    pub const fn tui(self) -> Color {
        self.tui
    }

    pub const fn ansi(self) -> &'static str {
        self.ansi
    }
}

/// Named colors for grade bands, option marks and status text. The TUI
/// theme reads `tui()`, the `--plain` session and prompts use the ANSI side.
pub struct Palette;

impl Palette {
    pub const RESET: &'static str = "\x1b[0m";
    pub const DIM: &'static str = "\x1b[2m";
    pub const BOLD: &'static str = "\x1b[1m";

    pub const ACCENT: PaletteColor = PaletteColor::new(Color::Blue, "\x1b[34m");
    pub const HIGHLIGHT: PaletteColor = PaletteColor::new(Color::Magenta, "\x1b[35m");
    pub const INFO: PaletteColor = PaletteColor::new(Color::Cyan, "\x1b[36m");
    pub const SUCCESS: PaletteColor = PaletteColor::new(Color::Green, "\x1b[32m");
    pub const WARNING: PaletteColor = PaletteColor::new(Color::Yellow, "\x1b[33m");
    pub const DANGER: PaletteColor = PaletteColor::new(Color::Red, "\x1b[31m");
    pub const BORDER: PaletteColor = PaletteColor::new(Color::Gray, "\x1b[90m");
    pub const MUTED: PaletteColor = PaletteColor::new(Color::DarkGray, "\x1b[90m");

    pub fn paint(color: PaletteColor, value: impl fmt::Display) -> String {
        format!("{}{}{}", color.ansi(), value, Self::RESET)
    }

    pub fn bold(color: PaletteColor, value: impl fmt::Display) -> String {
        format!("{}{}{}{}", Self::BOLD, color.ansi(), value, Self::RESET)
    }

    pub fn dim(value: impl fmt::Display) -> String {
        format!("{}{}{}", Self::DIM, value, Self::RESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_wraps_value_in_color_and_reset() {
        assert_eq!(Palette::paint(Palette::SUCCESS, 3), "\x1b[32m3\x1b[0m");
        assert_eq!(
            Palette::bold(Palette::DANGER, "Wrong"),
            "\x1b[1m\x1b[31mWrong\x1b[0m"
        );
    }
}
