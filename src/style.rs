use iced::Font;
use iced::theme::palette::Extended;
use iced::widget::canvas;

pub const MONO_FONT: Font = Font::MONOSPACE;

/// Dotted grey stroke for the static corner markers.
pub fn corner_marker_stroke(palette: &Extended) -> canvas::Stroke<'static> {
    canvas::Stroke {
        style: canvas::Style::Solid(palette.background.strong.color.scale_alpha(0.8)),
        width: 1.0,
        line_dash: canvas::LineDash {
            segments: &[2.0, 3.0],
            offset: 0,
        },
        ..Default::default()
    }
}

/// Dashed stroke for the live distance indicator line.
pub fn indicator_stroke(palette: &Extended) -> canvas::Stroke<'static> {
    canvas::Stroke {
        style: canvas::Style::Solid(palette.danger.base.color),
        width: 1.0,
        line_dash: canvas::LineDash {
            segments: &[4.0, 4.0],
            offset: 0,
        },
        ..Default::default()
    }
}
