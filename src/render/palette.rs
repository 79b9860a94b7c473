use plotters::style::{Color, HSLColor, RGBColor};

/// Cyclic hue palette, one color per series index.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<RGBColor>,
}

impl Palette {
    /// `size` colors swept across the hue circle at full saturation.
    ///
    /// Hue is `i / size`, so the first and last slots sit at opposite ends
    /// of the sweep without wrapping back onto the same red.
    pub fn hsv(size: usize) -> Self {
        let size = size.max(1);
        let colors = (0..size)
            .map(|i| {
                let hue = i as f64 / size as f64;
                let (r, g, b) = HSLColor(hue, 1.0, 0.5).to_backend_color().rgb;
                RGBColor(r, g, b)
            })
            .collect();
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Indices outside the palette, negative ones included, wrap around.
    pub fn color(&self, index: i64) -> RGBColor {
        let slot = index.rem_euclid(self.colors.len() as i64) as usize;
        self.colors[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn palette_colors_are_distinct() {
        for size in [1usize, 2, 3, 7, 18] {
            let palette = Palette::hsv(size);
            assert_eq!(palette.len(), size);
            let distinct: HashSet<(u8, u8, u8)> = (0..size as i64)
                .map(|i| {
                    let c = palette.color(i);
                    (c.0, c.1, c.2)
                })
                .collect();
            assert_eq!(distinct.len(), size);
        }
    }

    #[test]
    fn sweep_starts_at_red() {
        let c = Palette::hsv(4).color(0);
        assert_eq!((c.0, c.1, c.2), (255, 0, 0));
    }

    #[test]
    fn negative_indices_wrap_to_the_end() {
        let palette = Palette::hsv(5);
        assert_eq!(palette.color(-1), palette.color(4));
        assert_eq!(palette.color(-6), palette.color(4));
        assert_eq!(palette.color(7), palette.color(2));
    }

    #[test]
    fn zero_size_still_has_a_color() {
        let palette = Palette::hsv(0);
        assert_eq!(palette.len(), 1);
        let c = palette.color(5);
        assert_eq!((c.0, c.1, c.2), (255, 0, 0));
    }
}
