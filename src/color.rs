//! Colors used by report charts.

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Light grey used for grid lines.
    pub const GRID: Self = Self::new(220, 220, 220, 255);
    /// Dark grey used for axes and labels.
    pub const AXIS: Self = Self::new(60, 60, 60, 255);

    /// Series colors, cycled in order.
    pub const PALETTE: [Self; 4] = [
        Self::new(31, 119, 180, 255),
        Self::new(255, 127, 14, 255),
        Self::new(44, 160, 44, 255),
        Self::new(214, 39, 40, 255),
    ];

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Palette entry for series `index`.
    #[must_use]
    pub const fn series(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Blend `self` over `dst` using straight alpha.
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        if self.a == 255 {
            return self;
        }
        let a = f32::from(self.a) / 255.0;
        let mix = |s: u8, d: u8| (f32::from(s) * a + f32::from(d) * (1.0 - a)).round() as u8;
        let out_a = a + f32::from(dst.a) / 255.0 * (1.0 - a);
        Self::new(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b), (out_a * 255.0).round() as u8)
    }

    /// CSS color string, `#rrggbb` when opaque.
    #[must_use]
    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, f32::from(self.a) / 255.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css() {
        assert_eq!(Rgba::rgb(31, 119, 180).to_css(), "#1f77b4");
        assert_eq!(Rgba::new(255, 0, 0, 0).to_css(), "rgba(255,0,0,0.000)");
    }

    #[test]
    fn test_over() {
        assert_eq!(Rgba::BLACK.over(Rgba::WHITE), Rgba::BLACK);
        let half = Rgba::new(0, 0, 0, 128).over(Rgba::WHITE);
        assert!(half.r > 120 && half.r < 135);
        assert_eq!(half.a, 255);
        assert_eq!(Rgba::TRANSPARENT.over(Rgba::WHITE), Rgba::WHITE);
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(Rgba::series(0), Rgba::series(4));
        assert_ne!(Rgba::series(0), Rgba::series(1));
    }
}
