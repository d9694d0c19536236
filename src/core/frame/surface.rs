// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Host-owned pixel surface

use serde::{Deserialize, Serialize};

/// Channel layout of a 32-bit pixel
///
/// Shifts are bit positions of each 8-bit channel inside the `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelFormat {
    pub r_shift: u8,
    pub g_shift: u8,
    pub b_shift: u8,
    /// Position of the unused/alpha byte
    pub a_shift: u8,
}

impl PixelFormat {
    /// 0x00RRGGBB
    pub const XRGB8888: PixelFormat = PixelFormat {
        r_shift: 16,
        g_shift: 8,
        b_shift: 0,
        a_shift: 24,
    };

    /// 0x00BBGGRR
    pub const XBGR8888: PixelFormat = PixelFormat {
        r_shift: 0,
        g_shift: 8,
        b_shift: 16,
        a_shift: 24,
    };

    /// Pack an RGB triple
    #[inline(always)]
    pub fn rgb(&self, r: u8, g: u8, b: u8) -> u32 {
        ((r as u32) << self.r_shift) | ((g as u32) << self.g_shift) | ((b as u32) << self.b_shift)
    }

    /// Unpack a pixel into an RGB triple
    #[inline(always)]
    pub fn components(&self, pixel: u32) -> (u8, u8, u8) {
        (
            (pixel >> self.r_shift) as u8,
            (pixel >> self.g_shift) as u8,
            (pixel >> self.b_shift) as u8,
        )
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::XRGB8888
    }
}

/// Rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// True if the rectangle lies within a `width` x `height` area
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.w as u64 <= width as u64 && self.y as u64 + self.h as u64 <= height as u64
    }
}

/// Pixel buffer the core renders into
///
/// `pitch` is measured in pixels. The buffer is allocated once by the host
/// and reused for every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub pixels: Vec<u32>,
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub format: PixelFormat,
}

impl Surface {
    /// Allocate a zeroed surface with `pitch == width`
    ///
    /// # Example
    ///
    /// ```
    /// use corelink::core::frame::{PixelFormat, Surface};
    ///
    /// let surface = Surface::new(320, 240, PixelFormat::XRGB8888);
    /// assert_eq!(surface.pixels.len(), 320 * 240);
    /// assert_eq!(surface.pitch, 320);
    /// ```
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize],
            width,
            height,
            pitch: width,
            format,
        }
    }

    /// Pixels of scanline `y`, `pitch` entries long
    pub fn line(&self, y: u32) -> Option<&[u32]> {
        let start = y as usize * self.pitch as usize;
        self.pixels.get(start..start + self.pitch as usize)
    }

    pub fn line_mut(&mut self, y: u32) -> Option<&mut [u32]> {
        let start = y as usize * self.pitch as usize;
        let end = start + self.pitch as usize;
        self.pixels.get_mut(start..end)
    }

    /// Pixel at (`x`, `y`), `None` outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.pitch {
            return None;
        }
        self.pixels
            .get(y as usize * self.pitch as usize + x as usize)
            .copied()
    }

    pub fn fill(&mut self, value: u32) {
        self.pixels.fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_packing() {
        let fmt = PixelFormat::XRGB8888;
        assert_eq!(fmt.rgb(0x12, 0x34, 0x56), 0x0012_3456);
        assert_eq!(fmt.components(0x0012_3456), (0x12, 0x34, 0x56));

        let bgr = PixelFormat::XBGR8888;
        assert_eq!(bgr.rgb(0x12, 0x34, 0x56), 0x0056_3412);
    }

    #[test]
    fn test_surface_lines() {
        let mut surface = Surface::new(4, 2, PixelFormat::default());
        surface.line_mut(1).unwrap()[3] = 7;
        assert_eq!(surface.pixel(3, 1), Some(7));
        assert_eq!(surface.line(1).unwrap(), &[0, 0, 0, 7]);
        assert!(surface.line(2).is_none());
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn test_rect_fits() {
        assert!(Rect::new(0, 0, 320, 240).fits(320, 240));
        assert!(!Rect::new(1, 0, 320, 240).fits(320, 240));
    }
}
