use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        )
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
    pub fn parse(input: &str) -> ChartResult<Self> {
        let text = input.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| invalid_color(input));
        }

        let lowered = text.to_ascii_lowercase();
        let (body, has_alpha) = if let Some(body) = lowered.strip_prefix("rgba(") {
            (body, true)
        } else if let Some(body) = lowered.strip_prefix("rgb(") {
            (body, false)
        } else {
            return Err(invalid_color(input));
        };
        let body = body.strip_suffix(')').ok_or_else(|| invalid_color(input))?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != if has_alpha { 4 } else { 3 } {
            return Err(invalid_color(input));
        }

        let mut channels = [0.0; 3];
        for (slot, part) in channels.iter_mut().zip(parts.iter()) {
            let value: f64 = part.parse().map_err(|_| invalid_color(input))?;
            *slot = value / 255.0;
        }
        let alpha = if has_alpha {
            parts[3].parse().map_err(|_| invalid_color(input))?
        } else {
            1.0
        };

        let color = Self::rgba(channels[0], channels[1], channels[2], alpha);
        color.validate()?;
        Ok(color)
    }

    /// CSS text: `#rrggbb` when opaque, `rgba(...)` otherwise.
    #[must_use]
    pub fn to_css(self) -> String {
        let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b) = (to_byte(self.red), to_byte(self.green), to_byte(self.blue));
        if self.alpha >= 1.0 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            let alpha = (self.alpha.clamp(0.0, 1.0) * 100.0).round() / 100.0;
            format!("rgba({r}, {g}, {b}, {alpha})")
        }
    }
}

fn invalid_color(input: &str) -> ChartError {
    ChartError::InvalidData(format!("unsupported color `{input}`"))
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digit = |index: usize| u8::from_str_radix(hex.get(index..index + 1)?, 16).ok();
    let pair = |index: usize| u8::from_str_radix(hex.get(index..index + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Color::from_rgb8(
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
        )),
        6 => Some(Color::from_rgb8(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(Color::from_rgb8(pair(0)?, pair(2)?, pair(4)?).with_alpha(f64::from(pair(6)?) / 255.0)),
        _ => None,
    }
}

/// Translucent grey used when a label has no mapped or embedded color.
pub const FALLBACK_COLOR: &str = "rgba(128, 128, 128, 0.4)";

/// Categorical palette used to generate missing label colors.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Label-to-CSS-color mapping in insertion order.
pub type ColorMapping = IndexMap<String, String>;

/// Picks the color for `label`: mapping entry, then embedded color, then fallback.
#[must_use]
pub fn resolve_color(label: &str, mapping: &ColorMapping, embedded: Option<&str>) -> String {
    mapping
        .get(label)
        .map(String::as_str)
        .or(embedded)
        .filter(|color| !color.trim().is_empty())
        .unwrap_or(FALLBACK_COLOR)
        .to_owned()
}

/// Assigns palette colors to labels missing from `existing`.
///
/// Palette entries already used by `existing` are skipped until the palette
/// runs out, then it cycles. Only the generated entries are returned.
#[must_use]
pub fn generate_color_mapping<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    existing: &ColorMapping,
    palette: &[&str],
) -> ColorMapping {
    let mut generated = ColorMapping::new();
    if palette.is_empty() {
        return generated;
    }

    let mut free: Vec<&str> = palette
        .iter()
        .copied()
        .filter(|color| !existing.values().any(|used| used.eq_ignore_ascii_case(color)))
        .collect();
    free.reverse();
    let mut cycle = 0usize;

    for label in labels {
        if existing.contains_key(label) || generated.contains_key(label) {
            continue;
        }
        let color = free.pop().unwrap_or_else(|| {
            let color = palette[cycle % palette.len()];
            cycle += 1;
            color
        });
        generated.insert(label.to_owned(), color.to_owned());
    }
    generated
}
