use crate::foundation::core::Rgba8;
use serde::{Deserialize, Serialize};

/// JSON-facing color.
///
/// Accepts `"#RRGGBB"`, `"#RRGGBBAA"`, `[r, g, b]`, `[r, g, b, a]` and `{ "r", "g", "b", "a"? }`
/// with 0..=255 channels. Serializes as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDef(pub Rgba8);

impl ColorDef {
    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Rgba8::rgb(r, g, b))
    }

    /// Resolved straight-alpha color.
    pub fn rgba8(self) -> Rgba8 {
        self.0
    }

    /// `#RRGGBBAA` form.
    pub fn to_hex(self) -> String {
        let c = self.0;
        format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
    }
}

impl From<Rgba8> for ColorDef {
    fn from(c: Rgba8) -> Self {
        Self(c)
    }
}

impl Serialize for ColorDef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ColorDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbaObj {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "opaque")]
                a: u8,
            },
            Arr(Vec<u8>),
        }

        fn opaque() -> u8 {
            255
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self(Rgba8::rgba(r, g, b, a))),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self(Rgba8::rgb(*r, *g, *b))),
                [r, g, b, a] => Ok(Self(Rgba8::rgba(*r, *g, *b, *a))),
                _ => Err(serde::de::Error::custom(
                    "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }
    let (r, g, b, a) = match s.len() {
        6 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ),
        _ => {
            return Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned());
        }
    };

    Ok(ColorDef(Rgba8::rgba(r, g, b, a)))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
