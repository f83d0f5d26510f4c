/*
 *  display/canvas.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Runtime-sized monochrome framebuffer the layout renderer draws into and
 *  the drivers push out.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// One rendered frame. `BinaryColor::On` is ink; drivers expand to their
/// native pixel format when pushing. Owned transiently: produced by the
/// renderer, borrowed by the driver for the push, then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    buf: Vec<BinaryColor>,
    w: usize,
    h: usize,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self {
            buf: vec![BinaryColor::Off; w * h],
            w,
            h,
        }
    }

    pub fn width(&self) -> u32 {
        self.w as u32
    }

    pub fn height(&self) -> u32 {
        self.h as u32
    }

    pub fn as_slice(&self) -> &[BinaryColor] {
        &self.buf
    }

    /// Pixel at (x, y); None when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        if (x as usize) < self.w && (y as usize) < self.h {
            Some(self.buf[y as usize * self.w + x as usize])
        } else {
            None
        }
    }

    pub fn count_ink_pixels(&self) -> usize {
        self.buf.iter().filter(|&&p| p == BinaryColor::On).count()
    }

    /// Pack into 1bpp rows, MSB first, `set_bit_means_ink` selecting the
    /// polarity (e-paper panels treat 1 as white).
    pub fn pack_1bpp(&self, set_bit_means_ink: bool) -> Vec<u8> {
        let stride = self.w.div_ceil(8);
        let mut out = vec![0u8; stride * self.h];
        for y in 0..self.h {
            for x in 0..self.w {
                let ink = self.buf[y * self.w + x] == BinaryColor::On;
                if ink == set_bit_means_ink {
                    out[y * stride + x / 8] |= 0x80 >> (x % 8);
                }
            }
        }
        out
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // fast path for the rectangular fills the primitives use; colors
        // for clipped positions are consumed so in-bounds content stays
        // aligned with the area
        let Size { width, height } = area.size;
        if width == 0 || height == 0 {
            return Ok(());
        }

        let mut it = colors.into_iter();
        for row in 0..height as i32 {
            let y = area.top_left.y + row;
            for col in 0..width as i32 {
                let Some(c) = it.next() else {
                    return Ok(());
                };
                let x = area.top_left.x + col;
                if let Some(i) = self.idx(Point::new(x, y)) {
                    self.buf[i] = c;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_canvas_starts_blank() {
        let canvas = Canvas::new(16, 8);
        assert_eq!(canvas.count_ink_pixels(), 0);
    }

    #[test]
    fn test_out_of_bounds_draw_is_clipped() {
        let mut canvas = Canvas::new(16, 8);
        Line::new(Point::new(-5, -5), Point::new(40, 40))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut canvas)
            .unwrap();
        // only the in-bounds part of the diagonal lands
        assert_eq!(canvas.count_ink_pixels(), 8);
        assert_eq!(canvas.pixel(0, 0), Some(BinaryColor::On));
        assert_eq!(canvas.pixel(20, 3), None);
    }

    #[test]
    fn test_fill_contiguous_negative_origin_stays_aligned() {
        let mut canvas = Canvas::new(4, 4);
        // 4x3 area starting above-left of the canvas; only color index 6
        // (area row 1, col 2) is ink, which lands at canvas (0, 0)
        let area = Rectangle::new(Point::new(-2, -1), Size::new(4, 3));
        let colors = (0..12).map(|i| {
            if i == 6 {
                BinaryColor::On
            } else {
                BinaryColor::Off
            }
        });
        canvas.fill_contiguous(&area, colors).unwrap();

        assert_eq!(canvas.pixel(0, 0), Some(BinaryColor::On));
        assert_eq!(canvas.count_ink_pixels(), 1);
    }

    #[test]
    fn test_pack_1bpp_polarity() {
        let mut canvas = Canvas::new(8, 1);
        Pixel(Point::new(0, 0), BinaryColor::On)
            .draw(&mut canvas)
            .unwrap();

        let ink_high = canvas.pack_1bpp(true);
        assert_eq!(ink_high, vec![0x80]);
        let ink_low = canvas.pack_1bpp(false);
        assert_eq!(ink_low, vec![0x7F]);
    }

    #[test]
    fn test_pack_1bpp_rounds_stride_up() {
        let canvas = Canvas::new(10, 2);
        assert_eq!(canvas.pack_1bpp(true).len(), 4); // 2 bytes per row
    }
}
