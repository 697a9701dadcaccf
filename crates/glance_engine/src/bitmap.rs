//! RGBA8 pixel buffer shared by the rasterizer and the paint path.

use crate::{Color, GlanceError, Position, Rectangle, Result, Size};

/// Largest pixel count a bitmap may hold.
pub const MAX_BITMAP_PIXELS: usize = i32::MAX as usize;

/// Straight alpha RGBA8 image, row major, 4 bytes per pixel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmap {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Allocates a cleared bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`GlanceError::Allocation`] when the size exceeds
    /// [`MAX_BITMAP_PIXELS`] or the buffer cannot be reserved.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let width = width.max(0);
        let height = height.max(0);
        let len = (width as usize)
            .checked_mul(height as usize)
            .filter(|&n| n <= MAX_BITMAP_PIXELS)
            .and_then(|n| n.checked_mul(4))
            .ok_or(GlanceError::Allocation { width, height })?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| GlanceError::Allocation { width, height })?;
        pixels.resize(len, 0);
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the bitmap is at least `width` x `height`.
    pub fn fits(&self, width: i32, height: i32) -> bool {
        self.width >= width && self.height >= height
    }

    /// Verifies the pixel vector matches the declared dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GlanceError::BitmapLayout`] on mismatch.
    pub fn check_layout(&self) -> Result<()> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.pixels.len() != expected {
            return Err(GlanceError::BitmapLayout {
                width: self.width,
                height: self.height,
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(byte_offset(self.width, x, y))
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        match self.offset(x, y) {
            Some(o) => Color::rgba(self.pixels[o], self.pixels[o + 1], self.pixels[o + 2], self.pixels[o + 3]),
            None => Color::TRANSPARENT,
        }
    }

    /// Overwrites one pixel with `color`, its alpha replaced by `alpha` (0-1).
    /// An `alpha` above 1 keeps the color's own alpha. Out of range is a no-op.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        let Some(o) = self.offset(x, y) else {
            return;
        };
        let a = if alpha > 1.0 { color.a } else { (alpha.max(0.0) * 255.0) as u8 };
        self.pixels[o] = color.r;
        self.pixels[o + 1] = color.g;
        self.pixels[o + 2] = color.b;
        self.pixels[o + 3] = a;
    }

    /// Source-over blend of one pixel, `opacity` scaling the source alpha.
    pub fn blend_pixel(&mut self, x: i32, y: i32, src: Color, opacity: f32) {
        let Some(o) = self.offset(x, y) else {
            return;
        };
        let sa = src.a as f32 / 255.0 * opacity.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let da = self.pixels[o + 3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        self.pixels[o] = mix(src.r, self.pixels[o]);
        self.pixels[o + 1] = mix(src.g, self.pixels[o + 1]);
        self.pixels[o + 2] = mix(src.b, self.pixels[o + 2]);
        self.pixels[o + 3] = (out_a * 255.0).round() as u8;
    }

    /// Blends `color` over `rect`, clipped to the bitmap.
    pub fn fill_rect(&mut self, rect: Rectangle, color: Color) {
        let clip = rect.intersect(&Rectangle::from(0, 0, self.width, self.height));
        if clip.is_empty() {
            return;
        }
        for y in clip.top()..clip.bottom() {
            for x in clip.left()..clip.right() {
                self.blend_pixel(x, y, color, 1.0);
            }
        }
    }

    /// Draws `src_rect` of `src` into `dest_rect`, nearest neighbour scaled,
    /// source-over.
    pub fn draw_image(&mut self, src: &Bitmap, src_rect: Rectangle, dest_rect: Rectangle) {
        if src_rect.is_empty() || dest_rect.is_empty() {
            return;
        }
        let clip = dest_rect.intersect(&Rectangle::from(0, 0, self.width, self.height));
        for dy in clip.top()..clip.bottom() {
            let sy = src_rect.top() + ((dy - dest_rect.top()) as i64 * src_rect.get_height() as i64 / dest_rect.get_height() as i64) as i32;
            for dx in clip.left()..clip.right() {
                let sx = src_rect.left() + ((dx - dest_rect.left()) as i64 * src_rect.get_width() as i64 / dest_rect.get_width() as i64) as i32;
                let color = src.get_pixel(sx, sy);
                if color.a != 0 {
                    self.blend_pixel(dx, dy, color, 1.0);
                }
            }
        }
    }

    /// Blends the whole of `self` onto `dest` at `at` with `opacity`.
    pub fn composite_onto(&self, dest: &mut Bitmap, at: Position, opacity: f32) {
        for y in 0..self.height {
            for x in 0..self.width {
                let color = self.get_pixel(x, y);
                if color.a != 0 {
                    dest.blend_pixel(at.x + x, at.y + y, color, opacity);
                }
            }
        }
    }
}

/// Byte index of pixel `(x, y)`. Bitmaps past 2 GiB overflow `i32` here.
fn byte_offset(width: i32, x: i32, y: i32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pixel_alpha() {
        let mut bmp = Bitmap::new(4, 4).unwrap();
        bmp.set_pixel(1, 1, Color::new(10, 20, 30), 0.5);
        assert_eq!(bmp.get_pixel(1, 1), Color::rgba(10, 20, 30, 127));
        bmp.set_pixel(2, 2, Color::rgba(1, 2, 3, 200), 2.0);
        assert_eq!(bmp.get_pixel(2, 2).a, 200);
        // ignored
        bmp.set_pixel(9, 9, Color::new(1, 1, 1), 1.0);
        bmp.set_pixel(-1, 0, Color::new(1, 1, 1), 1.0);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut bmp = Bitmap::new(4, 4).unwrap();
        bmp.fill_rect(Rectangle::from(2, 2, 10, 10), Color::new(255, 0, 0));
        assert_eq!(bmp.get_pixel(3, 3), Color::new(255, 0, 0));
        assert_eq!(bmp.get_pixel(1, 1), Color::TRANSPARENT);
    }

    #[test]
    fn test_blend_over_transparent_keeps_color() {
        let mut bmp = Bitmap::new(1, 1).unwrap();
        bmp.blend_pixel(0, 0, Color::new(100, 150, 200), 0.8);
        let px = bmp.get_pixel(0, 0);
        assert_eq!(px.get_rgb(), (100, 150, 200));
        assert_eq!(px.a, 204);
    }

    #[test]
    fn test_draw_image_copies_rows() {
        let mut src = Bitmap::new(2, 4).unwrap();
        src.set_pixel(0, 2, Color::new(9, 9, 9), 1.0);
        let mut dest = Bitmap::new(2, 2).unwrap();
        dest.draw_image(&src, Rectangle::from(0, 2, 2, 2), Rectangle::from(0, 0, 2, 2));
        assert_eq!(dest.get_pixel(0, 0), Color::new(9, 9, 9));
        assert_eq!(dest.get_pixel(1, 1), Color::TRANSPARENT);
    }

    #[test]
    fn test_layout_check() {
        let bmp = Bitmap::new(3, 2).unwrap();
        assert!(bmp.check_layout().is_ok());
        let broken = Bitmap {
            width: 3,
            height: 3,
            pixels: vec![0; 4],
        };
        assert!(matches!(broken.check_layout(), Err(GlanceError::BitmapLayout { .. })));
    }

    #[test]
    fn test_byte_offset_past_i32_range() {
        // 2.56M lines at 4 px each, 110 px wide
        let y = 10_240_000 - 1;
        assert_eq!(byte_offset(110, 109, y), (y as usize * 110 + 109) * 4);
        assert!(byte_offset(110, 109, y) > i32::MAX as usize);
    }

    #[test]
    fn test_oversized_bitmap_is_refused() {
        assert!(matches!(Bitmap::new(i32::MAX, 2), Err(GlanceError::Allocation { .. })));
        assert!(matches!(Bitmap::new(1_000_000_000, 450), Err(GlanceError::Allocation { .. })));
        assert_eq!(Bitmap::new(0, 10).unwrap().pixels().len(), 0);
    }
}
