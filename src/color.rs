use std::str::FromStr;

use resvg::tiny_skia;

use crate::error::ColorParseError;

/// Straight (non-premultiplied) RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from 8-bit channels, the way `Graphics::get_rgb` does.
    pub fn rgb8(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
            a: alpha.clamp(0.0, 1.0),
        }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// HSL constructor; hue in degrees, saturation and lightness in `0..=1`.
    pub fn hsl(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        Self::rgba(r + m, g + m, b + m, alpha)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
        .unwrap_or(tiny_skia::Color::TRANSPARENT)
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 128.0 / 255.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)`, `rgba(r,g,b,a)`,
    /// `hsl(h,s%,l%)`, `hsla(h,s%,l%,a)` and a handful of named colors.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let invalid = || ColorParseError::Invalid(s.to_string());

        if let Some(hex) = text.strip_prefix('#') {
            if !hex.is_ascii() {
                return Err(invalid());
            }
            let digits = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
            };
            return match hex.len() {
                3 => {
                    let expand = |i: usize| digits(i..i + 1).map(|v| v * 17);
                    Ok(Color::rgb8(expand(0)?, expand(1)?, expand(2)?, 1.0))
                }
                6 => Ok(Color::rgb8(digits(0..2)?, digits(2..4)?, digits(4..6)?, 1.0)),
                8 => {
                    let alpha = f32::from(digits(6..8)?) / 255.0;
                    Ok(Color::rgb8(digits(0..2)?, digits(2..4)?, digits(4..6)?, alpha))
                }
                _ => Err(invalid()),
            };
        }

        if let Some((func, rest)) = text.split_once('(') {
            let args: Vec<&str> = rest
                .strip_suffix(')')
                .ok_or_else(invalid)?
                .split(',')
                .map(str::trim)
                .collect();
            let number = |v: &str| v.trim_end_matches('%').parse::<f32>().map_err(|_| invalid());
            let alpha = |args: &[&str], idx: usize| match args.get(idx) {
                Some(v) => number(v),
                None => Ok(1.0),
            };
            return match (func.trim(), args.len()) {
                ("rgb", 3) | ("rgba", 4) => Ok(Color::rgba(
                    number(args[0])? / 255.0,
                    number(args[1])? / 255.0,
                    number(args[2])? / 255.0,
                    alpha(&args, 3)?,
                )),
                ("hsl", 3) | ("hsla", 4) => Ok(Color::hsl(
                    number(args[0])?,
                    number(args[1])? / 100.0,
                    number(args[2])? / 100.0,
                    alpha(&args, 3)?,
                )),
                _ => Err(invalid()),
            };
        }

        match text.as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "red" => Ok(Color::RED),
            "green" => Ok(Color::GREEN),
            "lime" => Ok(Color::rgb(0.0, 1.0, 0.0)),
            "blue" => Ok(Color::BLUE),
            "yellow" => Ok(Color::rgb(1.0, 1.0, 0.0)),
            "gray" | "grey" => Ok(Color::from_hex(0x808080)),
            "transparent" => Ok(Color::TRANSPARENT),
            _ => Err(ColorParseError::UnknownName(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_color_from_hex() {
        let color = Color::from_hex(0xFF0000);
        assert_eq!(color, Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_short_and_long_hex() {
        let short: Color = "#f00".parse().unwrap();
        let long: Color = "#ff0000".parse().unwrap();
        assert_eq!(short, long);

        let with_alpha: Color = "#00ff0080".parse().unwrap();
        assert!(approx_eq(with_alpha.g, 1.0));
        assert!(approx_eq(with_alpha.a, 128.0 / 255.0));
    }

    #[test]
    fn test_parse_functional_notation() {
        let color: Color = "rgba(255, 0, 0, 0.5)".parse().unwrap();
        assert!(approx_eq(color.r, 1.0));
        assert!(approx_eq(color.a, 0.5));

        let hsl: Color = "hsl(120, 100%, 50%)".parse().unwrap();
        assert!(approx_eq(hsl.g, 1.0));
        assert!(approx_eq(hsl.r, 0.0));
    }

    #[test]
    fn test_parse_named_and_invalid() {
        assert_eq!("Red".parse::<Color>().unwrap(), Color::RED);
        assert!("#12".parse::<Color>().is_err());
        assert!("rgb(1,2)".parse::<Color>().is_err());
        assert!(matches!(
            "chartreuse-ish".parse::<Color>(),
            Err(ColorParseError::UnknownName(_))
        ));
    }

    #[test]
    fn test_color_default() {
        assert_eq!(Color::default(), Color::TRANSPARENT);
    }
}
