use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Straight-alpha color ────────────────────────────────────────────

/// 8-bit straight-alpha color, serialized as a CSS hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Color with a fractional alpha in 0..=1.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: to_u8(alpha * 255.0),
            ..self
        }
    }

    pub fn alpha_f32(self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex color '{}'", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Rgba8 {
    type Err = ParseColorError;

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        match hex.len() {
            3 => {
                let nib = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Self::rgb(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = ParseColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgba8> for String {
    fn from(c: Rgba8) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Round and clamp a channel value to 0..=255.
#[inline]
pub fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Rec. 709 luma of 0..255 channels.
#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

// ── Blend modes (straight alpha, 0..255 channels) ──────────────────

#[inline]
pub fn screen(base: f32, top: f32) -> f32 {
    base + top - base * top / 255.0
}

#[inline]
pub fn overlay(base: f32, top: f32) -> f32 {
    if base < 128.0 {
        2.0 * base * top / 255.0
    } else {
        255.0 - 2.0 * (255.0 - base) * (255.0 - top) / 255.0
    }
}

#[inline]
pub fn multiply(base: f32, top: f32) -> f32 {
    base * top / 255.0
}

/// Mix `blended` over `base` with the source alpha (0..=1).
#[inline]
pub fn mix(base: f32, blended: f32, alpha: f32) -> f32 {
    base + (blended - base) * alpha
}

// ── Color matrices ─────────────────────────────────────────────────

/// 3x4 affine color transform over RGB in 0..255.
///
/// Row `i` computes channel `i` as `m[i][0]*r + m[i][1]*g + m[i][2]*b + m[i][3]`.
/// The coefficients follow the W3C Filter Effects definitions of the
/// CSS filter functions, so composed matrices match what a browser
/// does when it applies the same `filter` string (minus per-step clamping).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix {
    pub m: [[f32; 4]; 3],
}

impl ColorMatrix {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ],
    };

    fn linear(rows: [[f32; 3]; 3]) -> Self {
        let mut m = [[0.0; 4]; 3];
        for (dst, src) in m.iter_mut().zip(rows) {
            dst[..3].copy_from_slice(&src);
        }
        Self { m }
    }

    pub fn brightness(b: f32) -> Self {
        Self::linear([[b, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, b]])
    }

    pub fn contrast(c: f32) -> Self {
        let offset = (0.5 - 0.5 * c) * 255.0;
        Self {
            m: [
                [c, 0.0, 0.0, offset],
                [0.0, c, 0.0, offset],
                [0.0, 0.0, c, offset],
            ],
        }
    }

    pub fn saturate(s: f32) -> Self {
        Self::linear([
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
        ])
    }

    pub fn hue_rotate(deg: f32) -> Self {
        let (sin, cos) = deg.to_radians().sin_cos();
        Self::linear([
            [
                0.213 + cos * 0.787 - sin * 0.213,
                0.715 - cos * 0.715 - sin * 0.715,
                0.072 - cos * 0.072 + sin * 0.928,
            ],
            [
                0.213 - cos * 0.213 + sin * 0.143,
                0.715 + cos * 0.285 + sin * 0.140,
                0.072 - cos * 0.072 - sin * 0.283,
            ],
            [
                0.213 - cos * 0.213 - sin * 0.787,
                0.715 - cos * 0.715 + sin * 0.715,
                0.072 + cos * 0.928 + sin * 0.072,
            ],
        ])
    }

    pub fn sepia(amount: f32) -> Self {
        let k = 1.0 - amount.clamp(0.0, 1.0);
        Self::linear([
            [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
            [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
            [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
        ])
    }

    pub fn grayscale(amount: f32) -> Self {
        let k = 1.0 - amount.clamp(0.0, 1.0);
        Self::linear([
            [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
            [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
            [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
        ])
    }

    /// `self` followed by `next`.
    pub fn then(self, next: Self) -> Self {
        let a = &self.m;
        let n = &next.m;
        let mut out = [[0.0f32; 4]; 3];
        for i in 0..3 {
            for j in 0..3 {
                out[i][j] = n[i][0] * a[0][j] + n[i][1] * a[1][j] + n[i][2] * a[2][j];
            }
            out[i][3] = n[i][0] * a[0][3] + n[i][1] * a[1][3] + n[i][2] * a[2][3] + n[i][3];
        }
        Self { m: out }
    }

    #[inline]
    pub fn apply(&self, r: f32, g: f32, b: f32) -> [f32; 3] {
        let m = &self.m;
        [
            m[0][0] * r + m[0][1] * g + m[0][2] * b + m[0][3],
            m[1][0] * r + m[1][1] * g + m[1][2] * b + m[1][3],
            m[2][0] * r + m[2][1] * g + m[2][2] * b + m[2][3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 3], b: [f32; 3], tol: f32) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol)
    }

    #[test]
    fn hex_parsing() {
        assert_eq!("#ff8800".parse::<Rgba8>().unwrap(), Rgba8::rgb(255, 136, 0));
        assert_eq!("#f80".parse::<Rgba8>().unwrap(), Rgba8::rgb(255, 136, 0));
        assert_eq!(
            "11223344".parse::<Rgba8>().unwrap(),
            Rgba8::new(0x11, 0x22, 0x33, 0x44)
        );
        assert!("#ff88".parse::<Rgba8>().is_err());
        assert!("#gg0000".parse::<Rgba8>().is_err());
        assert!("".parse::<Rgba8>().is_err());
    }

    #[test]
    fn hex_output_omits_opaque_alpha() {
        assert_eq!(Rgba8::rgb(255, 165, 0).to_hex(), "#ffa500");
        assert_eq!(Rgba8::new(0, 0, 0, 128).to_hex(), "#00000080");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Rgba8::rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: Rgba8 = serde_json::from_str("\"#FFA500\"").unwrap();
        assert_eq!(back, Rgba8::rgb(255, 165, 0));
        assert!(serde_json::from_str::<Rgba8>("\"orange\"").is_err());
    }

    #[test]
    fn to_u8_clamps_and_rounds() {
        assert_eq!(to_u8(-3.0), 0);
        assert_eq!(to_u8(300.0), 255);
        assert_eq!(to_u8(127.6), 128);
    }

    #[test]
    fn screen_never_darkens() {
        for base in [0.0, 64.0, 200.0, 255.0] {
            for top in [0.0, 100.0, 255.0] {
                assert!(screen(base, top) >= base - 1e-4);
            }
        }
        assert_eq!(screen(100.0, 255.0), 255.0);
        assert_eq!(screen(100.0, 0.0), 100.0);
    }

    #[test]
    fn overlay_with_white_brightens() {
        assert_eq!(overlay(50.0, 255.0), 100.0);
        assert_eq!(overlay(200.0, 255.0), 255.0);
        assert_eq!(overlay(0.0, 255.0), 0.0);
    }

    #[test]
    fn neutral_parameters_are_identity() {
        let rgb = [12.0, 130.0, 250.0];
        for m in [
            ColorMatrix::brightness(1.0),
            ColorMatrix::contrast(1.0),
            ColorMatrix::saturate(1.0),
            ColorMatrix::hue_rotate(0.0),
            ColorMatrix::sepia(0.0),
            ColorMatrix::grayscale(0.0),
        ] {
            let out = m.apply(rgb[0], rgb[1], rgb[2]);
            assert!(approx(out, rgb, 0.05), "{m:?} moved {rgb:?} to {out:?}");
        }
    }

    #[test]
    fn contrast_pivots_on_mid_gray() {
        let m = ColorMatrix::contrast(2.0);
        let out = m.apply(127.5, 127.5, 127.5);
        assert!(approx(out, [127.5; 3], 1e-3));
        let out = m.apply(200.0, 200.0, 200.0);
        assert!(approx(out, [272.5; 3], 1e-3));
    }

    #[test]
    fn full_grayscale_rows_match() {
        let m = ColorMatrix::contrast(1.2).then(ColorMatrix::grayscale(1.0));
        let out = m.apply(200.0, 30.0, 90.0);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn composition_order() {
        let rgb = [40.0, 80.0, 160.0];
        let a = ColorMatrix::brightness(1.5);
        let b = ColorMatrix::contrast(0.5);
        let combined = a.then(b).apply(rgb[0], rgb[1], rgb[2]);
        let step = a.apply(rgb[0], rgb[1], rgb[2]);
        let sequential = b.apply(step[0], step[1], step[2]);
        assert!(approx(combined, sequential, 1e-3));
    }

    #[test]
    fn sepia_warms_gray() {
        let out = ColorMatrix::sepia(1.0).apply(128.0, 128.0, 128.0);
        assert!(out[0] > out[1] && out[1] > out[2]);
    }

    #[test]
    fn hue_rotate_full_turn_is_identity() {
        let rgb = [200.0, 40.0, 90.0];
        let out = ColorMatrix::hue_rotate(360.0).apply(rgb[0], rgb[1], rgb[2]);
        assert!(approx(out, rgb, 0.05));
    }
}
