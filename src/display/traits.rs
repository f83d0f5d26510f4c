/*
 *  display/traits.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Core trait definitions for display driver abstraction
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

use crate::display::canvas::Canvas;
use crate::display::error::DisplayError;

/// Color depth of the physical sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// 1-bit panels (e-paper)
    Monochrome,
    /// RGB565 panels (TFT)
    Rgb565,
    /// Full RGBA (virtual PNG sink)
    Rgba,
}

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Native pixel format of the sink
    pub color_depth: ColorDepth,

    /// True for sinks with a finite write-cycle lifetime (e-paper). The
    /// orchestrator's redraw threshold exists for these.
    pub wear_limited: bool,

    /// Maximum sensible refresh rate
    pub max_fps: u32,
}

/// Minimal hardware abstraction - all display sinks implement this trait.
///
/// `init` must be idempotent: calling it twice without an intervening
/// teardown must not corrupt state or leak handles.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Short driver name for logs
    fn name(&self) -> &'static str;

    /// Acquire / prepare the physical or virtual resource
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push a fully-composed canvas to the sink. For hardware this is the
    /// expensive, rate-limited operation; the virtual driver serializes the
    /// canvas to a file instead.
    fn render_frame(&mut self, canvas: &Canvas) -> Result<(), DisplayError>;

    /// Blank the device / reset to background
    fn clear(&mut self) -> Result<(), DisplayError>;
}

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;
