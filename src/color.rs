use serde::{Deserialize, Serialize};

/// 8-bit RGBA color as it travels from script calls to draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Channel-wise lerp toward `other`, alpha kept from `self`. Used for
    /// button hover/press feedback.
    pub fn mix(self, other: Color, amount: f32) -> Color {
        let lerp = |from: u8, to: u8| -> u8 {
            (from as f32 + (to as f32 - from as f32) * amount) as u8
        };
        Color {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: self.a,
        }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const BLANK: Color = Color::rgba(0, 0, 0, 0);
    // Slightly warm white used for button labels.
    pub const SNOW: Color = Color::rgb(245, 245, 245);
    pub const LIGHT_GRAY: Color = Color::rgb(200, 200, 200);
    pub const GRAY: Color = Color::rgb(130, 130, 130);
    pub const DARK_GRAY: Color = Color::rgb(80, 80, 80);
    pub const RED: Color = Color::rgb(230, 41, 55);
    pub const MAROON: Color = Color::rgb(190, 33, 55);
    pub const GREEN: Color = Color::rgb(0, 228, 48);
    pub const DARK_GREEN: Color = Color::rgb(0, 117, 44);
    pub const BLUE: Color = Color::rgb(0, 121, 241);
    pub const SKY_BLUE: Color = Color::rgb(102, 191, 255);
    pub const DARK_BLUE: Color = Color::rgb(0, 82, 172);
    pub const YELLOW: Color = Color::rgb(253, 249, 0);
    pub const GOLD: Color = Color::rgb(255, 203, 0);
    pub const ORANGE: Color = Color::rgb(255, 161, 0);
    pub const PURPLE: Color = Color::rgb(200, 122, 255);
}
