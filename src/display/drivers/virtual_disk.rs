/*
 *  display/drivers/virtual_disk.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Virtual display driver: serializes each frame to a PNG on disk. Always
 *  available; doubles as the fallback sink when hardware is absent.
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

use std::fs;
use std::path::{Path, PathBuf};

use embedded_graphics::pixelcolor::BinaryColor;
use log::{debug, info};
use tiny_skia::{IntSize, Pixmap};

use crate::config::DisplayConfig;
use crate::display::canvas::Canvas;
use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, DisplayCapabilities, DisplayDriver};

pub const DEFAULT_OUTPUT_PATH: &str = "/tmp/inkbeat.png";

pub struct VirtualDriver {
    path: PathBuf,
    capabilities: DisplayCapabilities,
}

impl VirtualDriver {
    pub fn new(config: &DisplayConfig) -> Self {
        let path = config
            .output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));
        let capabilities = DisplayCapabilities {
            width: config.width,
            height: config.height,
            color_depth: ColorDepth::Rgba,
            wear_limited: false,
            max_fps: 60,
        };
        Self { path, capabilities }
    }

    pub fn with_geometry(width: u32, height: u32, path: &Path) -> Self {
        let capabilities = DisplayCapabilities {
            width,
            height,
            color_depth: ColorDepth::Rgba,
            wear_limited: false,
            max_fps: 60,
        };
        Self {
            path: path.to_path_buf(),
            capabilities,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.path
    }

    /// Write the pixmap next to the destination, then rename, so readers
    /// never observe a half-written artifact.
    fn write_png(&self, pixmap: &Pixmap) -> Result<(), DisplayError> {
        let tmp = self.path.with_extension("png.tmp");
        pixmap
            .save_png(&tmp)
            .map_err(|e| DisplayError::WriteFailed(e.to_string()))?;
        fs::rename(&tmp, &self.path)?;
        debug!("Frame written to {}", self.path.display());
        Ok(())
    }

    fn blank_pixmap(&self) -> Result<Pixmap, DisplayError> {
        let (w, h) = (self.capabilities.width, self.capabilities.height);
        let size = IntSize::from_wh(w, h).ok_or_else(|| {
            DisplayError::InvalidConfiguration(format!("bad virtual geometry {w}x{h}"))
        })?;
        let data = vec![0xFFu8; (w * h * 4) as usize]; // opaque white
        Pixmap::from_vec(data, size)
            .ok_or_else(|| DisplayError::WriteFailed("pixmap allocation failed".into()))
    }
}

impl DisplayDriver for VirtualDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn name(&self) -> &'static str {
        "virtual"
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?; // idempotent
        }
        info!(
            "Virtual display ready: {}x{} -> {}",
            self.capabilities.width,
            self.capabilities.height,
            self.path.display()
        );
        Ok(())
    }

    fn render_frame(&mut self, canvas: &Canvas) -> Result<(), DisplayError> {
        let caps = &self.capabilities;
        if canvas.width() != caps.width || canvas.height() != caps.height {
            return Err(DisplayError::GeometryMismatch {
                canvas_w: canvas.width(),
                canvas_h: canvas.height(),
                panel_w: caps.width,
                panel_h: caps.height,
            });
        }

        let mut pixmap = self.blank_pixmap()?;
        let data = pixmap.data_mut();
        for (i, px) in canvas.as_slice().iter().enumerate() {
            if *px == BinaryColor::On {
                data[i * 4] = 0;
                data[i * 4 + 1] = 0;
                data[i * 4 + 2] = 0;
            }
        }
        self.write_png(&pixmap)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let pixmap = self.blank_pixmap()?;
        self.write_png(&pixmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("inkbeat-test-{name}-{}.png", std::process::id()))
    }

    #[test]
    fn test_render_writes_artifact() {
        let path = temp_path("render");
        let mut driver = VirtualDriver::with_geometry(32, 16, &path);
        driver.init().unwrap();

        let mut canvas = Canvas::new(32, 16);
        Pixel(Point::new(1, 1), BinaryColor::On)
            .draw(&mut canvas)
            .unwrap();
        driver.render_frame(&canvas).unwrap();

        assert!(path.exists());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_init_clear_init_is_stable() {
        let path = temp_path("idempotent");
        let mut driver = VirtualDriver::with_geometry(32, 16, &path);

        driver.init().unwrap();
        driver.clear().unwrap();
        driver.init().unwrap();
        // same observable state as a single init + clear
        assert!(path.exists());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_geometry_mismatch_rejected() {
        let path = temp_path("mismatch");
        let mut driver = VirtualDriver::with_geometry(32, 16, &path);
        let canvas = Canvas::new(16, 16);
        assert!(driver.render_frame(&canvas).is_err());
    }
}
