use iced_core::{
    Color,
    theme::{Custom, Palette},
};
use palette::{FromColor, Hsva, Srgba, rgb::Rgba};

/// Fixed series palette, cycled by driver index.
pub const COLOR_PALETTE: [Color; 8] = [
    Color { r: 0.00, g: 0.82, b: 0.89, a: 1.0 }, // cyan
    Color { r: 1.00, g: 0.53, b: 0.00, a: 1.0 }, // orange
    Color { r: 0.36, g: 0.84, b: 0.36, a: 1.0 }, // green
    Color { r: 0.93, g: 0.31, b: 0.60, a: 1.0 }, // magenta
    Color { r: 1.00, g: 0.84, b: 0.00, a: 1.0 }, // gold
    Color { r: 0.39, g: 0.58, b: 0.93, a: 1.0 }, // cornflower
    Color { r: 0.86, g: 0.31, b: 0.24, a: 1.0 }, // red
    Color { r: 0.74, g: 0.74, b: 0.74, a: 1.0 }, // grey
];

/// Palette color for the n-th series; wraps around for large indices.
pub fn series_color(index: usize) -> Color {
    COLOR_PALETTE[index % COLOR_PALETTE.len()]
}

pub fn is_dark(color: Color) -> bool {
    let brightness = (color.r * 299.0 + color.g * 587.0 + color.b * 114.0) / 1000.0;
    brightness < 0.5
}

pub fn lighten(color: Color, amount: f32) -> Color {
    let mut hsva = to_hsva(color);
    hsva.value = (hsva.value + amount).min(1.0);
    from_hsva(hsva)
}

pub fn darken(color: Color, amount: f32) -> Color {
    let mut hsva = to_hsva(color);
    hsva.value = (hsva.value - amount).max(0.0);
    from_hsva(hsva)
}

fn to_hsva(color: Color) -> Hsva {
    Hsva::from_color(Rgba::new(color.r, color.g, color.b, color.a))
}

fn from_hsva(hsva: Hsva) -> Color {
    let rgba = Srgba::from_color(hsva);
    Color {
        r: rgba.color.red,
        g: rgba.color.green,
        b: rgba.color.blue,
        a: rgba.alpha,
    }
}

/// Dark application theme tuned for telemetry traces.
pub fn app_theme() -> iced_core::Theme {
    iced_core::Theme::Custom(
        Custom::new(
            "Speed Trace".to_string(),
            Palette {
                background: Color::from_rgb8(18, 18, 24),
                text: Color::from_rgb8(220, 220, 220),
                primary: Color::from_rgb8(100, 149, 237),
                success: Color::from_rgb8(50, 205, 50),
                danger: Color::from_rgb8(220, 80, 60),
                warning: Color::from_rgb8(255, 215, 0),
            },
        )
        .into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        assert_eq!(series_color(0), series_color(COLOR_PALETTE.len()));
        assert_eq!(series_color(3), series_color(COLOR_PALETTE.len() + 3));
    }

    #[test]
    fn brightness_split() {
        assert!(is_dark(Color::BLACK));
        assert!(!is_dark(Color::WHITE));
    }

    #[test]
    fn lighten_and_darken_clamp_at_the_ends() {
        let lightened = lighten(Color::WHITE, 0.5);
        assert!(lightened.r >= 0.99);

        let darkened = darken(Color::BLACK, 0.5);
        assert!(darkened.r <= 0.01);
    }
}
