use crate::card_state::OptionMark;
use crate::palette::{Palette, PaletteColor};

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
};

/// Shared styles for the quiz screens.
pub struct Theme;

impl Theme {
    pub const KEY_FG: Color = Color::Rgb(255, 255, 255);

    pub fn label() -> Style {
        Style::default()
            .fg(Palette::ACCENT.tui())
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Self::bold_in(Palette::SUCCESS)
    }

    pub fn danger() -> Style {
        Self::bold_in(Palette::DANGER)
    }

    pub fn warning() -> Style {
        Self::bold_in(Palette::WARNING)
    }

    pub fn muted() -> Style {
        Style::default().fg(Palette::MUTED.tui())
    }

    pub fn emphasis() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn bold_in(color: PaletteColor) -> Style {
        Style::default()
            .fg(color.tui())
            .add_modifier(Modifier::BOLD)
    }

    /// How an option is drawn once the card has been answered.
    pub fn option(mark: OptionMark) -> Style {
        match mark {
            OptionMark::Neutral => Style::default(),
            OptionMark::Correct => Self::success(),
            OptionMark::Wrong => Self::danger().add_modifier(Modifier::CROSSED_OUT),
            OptionMark::Dimmed => Self::muted(),
        }
    }

    pub fn option_marker(mark: OptionMark) -> &'static str {
        match mark {
            OptionMark::Correct => "✓",
            OptionMark::Wrong => "✗",
            OptionMark::Neutral | OptionMark::Dimmed => " ",
        }
    }

    pub fn backdrop<'a>() -> Block<'a> {
        Block::default()
    }

    pub fn panel<'a>(title: impl Into<String>) -> Block<'a> {
        Self::panel_with_line(Self::title_line(title))
    }

    pub fn panel_with_line<'a>(title: Line<'a>) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Palette::BORDER.tui()))
            .title(title)
            .title_alignment(Alignment::Left)
    }

    pub fn title_line(title: impl Into<String>) -> Line<'static> {
        Line::from(vec![Span::styled(
            format!(" {} ", title.into()),
            Self::label(),
        )])
    }

    pub fn label_span(text: impl Into<String>) -> Span<'static> {
        Span::styled(text.into(), Self::label())
    }

    pub fn span(text: impl Into<String>) -> Span<'static> {
        Span::raw(text.into())
    }

    pub fn key_chip(text: impl Into<String>) -> Span<'static> {
        Span::styled(
            format!(" {} ", text.into()),
            Style::default()
                .fg(Self::KEY_FG)
                .bg(Palette::ACCENT.tui())
                .add_modifier(Modifier::BOLD),
        )
    }

    pub fn bullet() -> Span<'static> {
        Self::span(" • ")
    }

    pub fn section_header(text: impl Into<String>) -> Line<'static> {
        Line::from(vec![Span::styled(text.into(), Self::emphasis())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answered_options_are_styled_by_mark() {
        assert_eq!(Theme::option(OptionMark::Neutral), Style::default());
        assert_eq!(Theme::option(OptionMark::Correct), Theme::success());
        assert_eq!(
            Theme::option(OptionMark::Dimmed).fg,
            Some(Palette::MUTED.tui())
        );
        assert_eq!(Theme::option_marker(OptionMark::Wrong), "✗");
    }
}
