//! Pixel codec: HSBA colors to and from 4-byte records.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{COLOR_SIZE, FormatError};

/// Hue/saturation/brightness/alpha color.
///
/// `hue` is a byte-range value in [0, 255] that maps onto [0°, 360°).
/// The other three components are percentages in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsba {
    #[serde(alias = "h")]
    pub hue: f32,
    #[serde(alias = "s")]
    pub saturation: f32,
    #[serde(alias = "b")]
    pub brightness: f32,
    #[serde(alias = "a")]
    pub alpha: f32,
}

impl Hsba {
    /// Fully transparent black, the fill value for new frames.
    pub const TRANSPARENT: Hsba = Hsba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(hue: f32, saturation: f32, brightness: f32, alpha: f32) -> Self {
        Self {
            hue,
            saturation,
            brightness,
            alpha,
        }
    }

    /// True when the voxel would not be drawn (no opacity or no light).
    #[inline]
    pub fn is_invisible(&self) -> bool {
        self.alpha <= 0.0 || self.brightness <= 0.0
    }
}

impl From<[f32; 4]> for Hsba {
    fn from(v: [f32; 4]) -> Self {
        Hsba::new(v[0], v[1], v[2], v[3])
    }
}

impl From<(f32, f32, f32, f32)> for Hsba {
    fn from((h, s, b, a): (f32, f32, f32, f32)) -> Self {
        Hsba::new(h, s, b, a)
    }
}

impl FromStr for Hsba {
    type Err = FormatError;

    /// Parse `"h,s,b,a"`; commas, semicolons and whitespace all separate fields.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| FormatError::MalformedColor {
            input: input.to_string(),
            reason,
        };

        let fields: Vec<&str> = input
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();

        if fields.len() != 4 {
            return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
        }

        let mut values = [0.0f32; 4];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field
                .parse::<f32>()
                .map_err(|e| malformed(format!("'{field}': {e}")))?;
        }

        Ok(Hsba::from(values))
    }
}

/// Percentage in [0, 100] to byte in [0, 255].
#[inline]
fn percent_to_byte(percent: f32) -> u8 {
    (percent.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8
}

/// Byte in [0, 255] to percentage in [0, 100].
#[inline]
fn byte_to_percent(byte: u8) -> f32 {
    (f32::from(byte) / 255.0 * 100.0).round().clamp(0.0, 100.0)
}

/// Encode a color to its 4-byte `[H, S, B, A]` record.
pub fn encode_color(color: impl Into<Hsba>) -> [u8; COLOR_SIZE] {
    let c = color.into();
    [
        c.hue.clamp(0.0, 255.0).round() as u8,
        percent_to_byte(c.saturation),
        percent_to_byte(c.brightness),
        percent_to_byte(c.alpha),
    ]
}

/// Decode a 4-byte record back to a color.
///
/// Lossy: percentages come back rounded to whole units.
pub fn decode_color(bytes: [u8; COLOR_SIZE]) -> Hsba {
    Hsba {
        hue: f32::from(bytes[0]),
        saturation: byte_to_percent(bytes[1]),
        brightness: byte_to_percent(bytes[2]),
        alpha: byte_to_percent(bytes[3]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pure_red_encoding() {
        let bytes = encode_color(Hsba::new(0.0, 100.0, 100.0, 100.0));
        assert_eq!(bytes, [0, 255, 255, 255]);
    }

    #[test]
    fn test_input_forms_agree() {
        let labeled = encode_color(Hsba::new(120.0, 50.0, 75.0, 100.0));
        let tuple = encode_color((120.0, 50.0, 75.0, 100.0));
        let array = encode_color([120.0, 50.0, 75.0, 100.0]);
        let text = encode_color("120, 50, 75, 100".parse::<Hsba>().unwrap());

        assert_eq!(labeled, tuple);
        assert_eq!(labeled, array);
        assert_eq!(labeled, text);
    }

    #[test]
    fn test_text_wrong_field_count() {
        let err = "10,20,30".parse::<Hsba>().unwrap_err();
        assert!(matches!(err, FormatError::MalformedColor { .. }));

        let err = "1 2 3 4 5".parse::<Hsba>().unwrap_err();
        assert!(matches!(err, FormatError::MalformedColor { .. }));
    }

    #[test]
    fn test_text_non_numeric() {
        let err = "10,twenty,30,40".parse::<Hsba>().unwrap_err();
        assert!(matches!(err, FormatError::MalformedColor { .. }));
    }

    #[test]
    fn test_out_of_range_clamped() {
        let bytes = encode_color(Hsba::new(400.0, 150.0, -20.0, 100.0));
        assert_eq!(bytes, [255, 255, 0, 255]);
    }

    #[test]
    fn test_decode_extremes() {
        let c = decode_color([255, 0, 255, 128]);
        assert_eq!(c.hue, 255.0);
        assert_eq!(c.saturation, 0.0);
        assert_eq!(c.brightness, 100.0);
        assert_eq!(c.alpha, 50.0);
    }

    #[test]
    fn test_json_short_labels() {
        let c: Hsba = serde_json::from_str(r#"{"h": 10, "s": 20, "b": 30, "a": 40}"#).unwrap();
        assert_eq!(c, Hsba::new(10.0, 20.0, 30.0, 40.0));
    }

    proptest! {
        #[test]
        fn test_percent_quantization_bound(p in 0.0f32..=100.0) {
            let c = decode_color(encode_color(Hsba::new(0.0, p, p, p)));
            prop_assert!((c.saturation - p).abs() <= 1.0);
            prop_assert!((c.brightness - p).abs() <= 1.0);
            prop_assert!((c.alpha - p).abs() <= 1.0);
        }

        #[test]
        fn test_quantization_monotonic(a in 0.0f32..=100.0, b in 0.0f32..=100.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_c = decode_color(encode_color(Hsba::new(0.0, lo, 0.0, 0.0)));
            let hi_c = decode_color(encode_color(Hsba::new(0.0, hi, 0.0, 0.0)));
            prop_assert!(lo_c.saturation <= hi_c.saturation);
        }
    }
}
