/// Paletted, double-buffered frame buffer.
///
/// Drawing always targets the back page; [`RenderTarget::present`] swaps the
/// pages, so a half-drawn frame is never the one on display.

use bevy::prelude::*;

/// The draw primitive the renderer is written against.
pub trait RenderTarget {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Fill `[x0, x1) x [y0, y1)` with palette index `color`, clipped to the
    /// screen. Empty or fully off-screen rectangles draw nothing.
    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u8);

    /// Make the completed frame visible.
    fn present(&mut self);

    fn plot(&mut self, x: i32, y: i32, color: u8) {
        self.fill_rect(x, y, x + 1, y + 1, color);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pages: [Vec<u8>; 2],
    /// Index of the page being drawn into.
    back: usize,
    frames_presented: u64,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pages: [vec![0; len], vec![0; len]],
            back: 1,
            frames_presented: 0,
        }
    }

    /// The page on display.
    pub fn front(&self) -> &[u8] {
        &self.pages[1 - self.back]
    }

    /// The page being drawn.
    pub fn back(&self) -> &[u8] {
        &self.pages[self.back]
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Palette index at `(x, y)` of the back page.
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.back()[(y * self.width + x) as usize]
    }
}

impl RenderTarget for FrameBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u8) {
        let x0 = x0.clamp(0, self.width as i32) as usize;
        let x1 = x1.clamp(0, self.width as i32) as usize;
        let y0 = y0.clamp(0, self.height as i32) as usize;
        let y1 = y1.clamp(0, self.height as i32) as usize;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let width = self.width as usize;
        let page = &mut self.pages[self.back];
        for row in page.chunks_exact_mut(width).take(y1).skip(y0) {
            row[x0..x1].fill(color);
        }
    }

    fn present(&mut self) {
        self.back = 1 - self.back;
        self.frames_presented += 1;
    }
}

/// Palette slots used by the renderer.
pub mod palette_index {
    pub const BLACK: u8 = 0;
    pub const SKY: u8 = BLACK;
    pub const DIRECTION: u8 = 1;
    pub const PLAYER: u8 = 2;
    pub const FLOOR: u8 = 3;
    pub const WALL: u8 = 4;
    pub const WALL_SHADE: u8 = 5;
}

/// RGB15 colors (components 0..=31) by palette index.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
    /// RGBA8 for every possible index, built once with the palette.
    rgba: [[u8; 4]; 256],
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_rgb15(&[
            [0, 0, 0],   // black
            [0, 0, 31],  // blue direction ray
            [0, 31, 0],  // green player
            [16, 0, 0],  // red floor
            [16, 0, 31], // purple wall
            [10, 0, 20], // darker purple for north/south faces
        ])
    }
}

impl Palette {
    /// Components above 31 are clamped.
    pub fn from_rgb15(colors: &[[u8; 3]]) -> Self {
        let colors: Vec<[u8; 3]> = colors.iter().map(|c| c.map(|v| v.min(31))).collect();
        let mut rgba = [[0, 0, 0, 255]; 256];
        for (slot, [r, g, b]) in rgba.iter_mut().zip(&colors) {
            *slot = [expand5(*r), expand5(*g), expand5(*b), 255];
        }
        Self { colors, rgba }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// 8-bit RGBA for a palette index. Unassigned slots are black.
    pub fn rgba8(&self, index: u8) -> [u8; 4] {
        self.rgba[index as usize]
    }

    /// Convert a page of palette indices into RGBA8 bytes.
    pub fn write_rgba8(&self, indices: &[u8], out: &mut [u8]) {
        for (pixel, &index) in out.chunks_exact_mut(4).zip(indices) {
            pixel.copy_from_slice(&self.rgba[index as usize]);
        }
    }
}

/// Scale a 5-bit channel to 8 bits, mapping 31 to 255.
fn expand5(value: u8) -> u8 {
    (value << 3) | (value >> 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_is_half_open() {
        let mut fb = FrameBuffer::new(8, 4);
        fb.fill_rect(1, 1, 3, 2, 7);
        assert_eq!(fb.pixel(1, 1), 7);
        assert_eq!(fb.pixel(2, 1), 7);
        assert_eq!(fb.pixel(3, 1), 0);
        assert_eq!(fb.pixel(1, 2), 0);
        assert_eq!(fb.back().iter().filter(|&&p| p == 7).count(), 2);
    }

    #[test]
    fn test_fill_rect_clips_to_screen() {
        let mut fb = FrameBuffer::new(8, 4);
        fb.fill_rect(-5, -5, 100, 100, 3);
        assert!(fb.back().iter().all(|&p| p == 3));

        let mut fb = FrameBuffer::new(8, 4);
        fb.fill_rect(8, 0, 12, 4, 3);
        fb.fill_rect(4, 2, 2, 3, 3);
        assert!(fb.back().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_present_swaps_pages() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.fill_rect(0, 0, 4, 4, 5);
        assert!(fb.front().iter().all(|&p| p == 0));

        fb.present();
        assert!(fb.front().iter().all(|&p| p == 5));
        assert!(fb.back().iter().all(|&p| p == 0));
        assert_eq!(fb.frames_presented(), 1);

        fb.present();
        assert!(fb.back().iter().all(|&p| p == 5));
        assert_eq!(fb.frames_presented(), 2);
    }

    #[test]
    fn test_palette_expands_rgb15() {
        let palette = Palette::from_rgb15(&[[31, 0, 16], [40, 1, 0]]);
        assert_eq!(palette.rgba8(0), [255, 0, 132, 255]);
        assert_eq!(palette.rgba8(1), [255, 8, 0, 255]);
        assert_eq!(palette.rgba8(9), [0, 0, 0, 255]);
        assert_eq!(palette.rgba8(255), [0, 0, 0, 255]);
    }

    #[test]
    fn test_reloaded_palette_replaces_cached_colors() {
        let mut palette = Palette::default();
        let mut out = [0u8; 4];
        palette.write_rgba8(&[palette_index::WALL], &mut out);
        assert_eq!(out, [132, 0, 255, 255]);

        palette = Palette::from_rgb15(&[[0, 0, 0], [0, 0, 0], [0, 0, 0], [0, 0, 0], [31, 31, 31]]);
        palette.write_rgba8(&[palette_index::WALL], &mut out);
        assert_eq!(out, [255, 255, 255, 255]);
        assert_eq!(palette.len(), 5);
    }

    #[test]
    fn test_write_rgba8_converts_every_pixel() {
        let palette = Palette::default();
        let mut out = vec![0u8; 3 * 4];
        palette.write_rgba8(&[palette_index::WALL, palette_index::BLACK, palette_index::PLAYER], &mut out);
        assert_eq!(&out[0..4], &palette.rgba8(palette_index::WALL));
        assert_eq!(&out[4..8], &[0, 0, 0, 255]);
        assert_eq!(&out[8..12], &[0, 255, 0, 255]);
    }
}
