use crate::spectrum::Color;
use pmath::vector::Vec2;

/// Running sum of the samples of one pixel.
#[derive(Clone, Copy, Debug)]
pub struct PixelAccumulator {
    pub color: Color,
    pub count: u32,
}

impl PixelAccumulator {
    /// Creates an instance of a pixel that is black.
    pub fn black() -> Self {
        PixelAccumulator {
            color: Color::black(),
            count: 0,
        }
    }

    /// Adds a sample to the pixel.
    pub fn add_sample(self, color: Color) -> Self {
        PixelAccumulator {
            color: self.color + color,
            count: self.count + 1,
        }
    }

    /// Calculates the final color of the pixel. Every sample carries the same weight.
    pub fn final_color(self) -> Color {
        if self.count == 0 {
            self.color
        } else {
            self.color.div_scale(self.count as f64)
        }
    }
}

/// The finished frame: one color per pixel, row-major, the first row at the top.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    res: Vec2<usize>,
    pixels: Vec<Color>,
}

impl Image {
    pub fn new(res: Vec2<usize>, pixels: Vec<Color>) -> Self {
        debug_assert_eq!(res.product(), pixels.len());
        Image { res, pixels }
    }

    pub fn width(&self) -> usize {
        self.res.x
    }

    pub fn height(&self) -> usize {
        self.res.y
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.res.x || y >= self.res.y {
            return None;
        }
        self.pixels.get(y * self.res.x + x).copied()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn rows(&self) -> std::slice::Chunks<Color> {
        self.pixels.chunks(self.res.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_is_exact() {
        let samples = [
            Color::new(0.1, 0.7, 0.3),
            Color::new(0.9, 0.2, 0.4),
            Color::new(0.35, 0.15, 1.0),
            Color::new(0.05, 0.6, 0.0),
        ];
        let pixel = samples
            .iter()
            .fold(PixelAccumulator::black(), |p, &c| p.add_sample(c));
        let expected = (samples[0] + samples[1] + samples[2] + samples[3]).div_scale(4.);
        assert_eq!(pixel.final_color(), expected);
    }

    #[test]
    fn image_is_row_major() {
        let pixels = (0..6).map(|i| Color::from_scalar(i as f64)).collect();
        let image = Image::new(Vec2 { x: 3, y: 2 }, pixels);
        assert_eq!(image.get(2, 1), Some(Color::from_scalar(5.)));
        assert_eq!(image.get(3, 0), None);
        assert_eq!(image.rows().count(), 2);
    }
}
