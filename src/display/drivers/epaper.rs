/*
 *  display/drivers/epaper.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Waveshare e-paper driver over SPI. The panel is portrait-native; a
 *  landscape canvas is rotated into the panel buffer at push time.
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

use embedded_graphics::pixelcolor::BinaryColor;
use epd_waveshare::epd2in13_v2::{Epd2in13, HEIGHT as PANEL_H, WIDTH as PANEL_W};
use epd_waveshare::prelude::*;
use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};
use log::{debug, info};

use crate::config::{BusConfig, DisplayConfig};
use crate::display::canvas::Canvas;
use crate::display::drivers::hal;
use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, DisplayCapabilities, DisplayDriver};

const DEFAULT_SPI_BUS: &str = "/dev/spidev0.0";
const DEFAULT_SPI_SPEED_HZ: u32 = 4_000_000;
// Waveshare e-paper HAT wiring, BCM numbering
const DEFAULT_DC_PIN: u32 = 25;
const DEFAULT_RST_PIN: u32 = 17;
const DEFAULT_BUSY_PIN: u32 = 24;

type Panel = Epd2in13<SpidevDevice, CdevPin, CdevPin, CdevPin, Delay>;

pub struct EpaperDriver {
    spi: SpidevDevice,
    epd: Panel,
    delay: Delay,
    capabilities: DisplayCapabilities,
    /// Canvas is landscape, panel buffer is portrait.
    rotated: bool,
}

impl EpaperDriver {
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        match config.model.as_deref() {
            None | Some("epd2in13_v2") => {}
            Some(other) => {
                return Err(DisplayError::InvalidConfiguration(format!(
                    "unsupported e-paper model: {other} (supported: epd2in13_v2)"
                )));
            }
        }

        let rotated = if (config.width, config.height) == (PANEL_H, PANEL_W) {
            true
        } else if (config.width, config.height) == (PANEL_W, PANEL_H) {
            false
        } else {
            return Err(DisplayError::GeometryMismatch {
                canvas_w: config.width,
                canvas_h: config.height,
                panel_w: PANEL_W,
                panel_h: PANEL_H,
            });
        };

        let (bus, speed_hz, dc, rst, busy) = match config.bus.as_ref() {
            Some(BusConfig::Spi {
                bus,
                speed_hz,
                dc_pin,
                rst_pin,
                busy_pin,
            }) => (
                bus.as_str(),
                speed_hz.unwrap_or(DEFAULT_SPI_SPEED_HZ),
                *dc_pin,
                rst_pin.unwrap_or(DEFAULT_RST_PIN),
                busy_pin.unwrap_or(DEFAULT_BUSY_PIN),
            ),
            None => (
                DEFAULT_SPI_BUS,
                DEFAULT_SPI_SPEED_HZ,
                DEFAULT_DC_PIN,
                DEFAULT_RST_PIN,
                DEFAULT_BUSY_PIN,
            ),
        };

        let mut spi = hal::open_spi(bus, speed_hz)?;
        let dc_pin = hal::output_pin(dc, "inkbeat-dc")?;
        let rst_pin = hal::output_pin(rst, "inkbeat-rst")?;
        let busy_pin = hal::input_pin(busy, "inkbeat-busy")?;
        let mut delay = Delay;

        let epd = Epd2in13::new(&mut spi, busy_pin, dc_pin, rst_pin, &mut delay, None)
            .map_err(|e| DisplayError::InitializationFailed(format!("epd2in13_v2: {e:?}")))?;
        info!("e-paper panel up on {bus} ({PANEL_W}x{PANEL_H} native)");

        Ok(Self {
            spi,
            epd,
            delay,
            capabilities: DisplayCapabilities {
                width: config.width,
                height: config.height,
                color_depth: ColorDepth::Monochrome,
                wear_limited: true,
                max_fps: 1,
            },
            rotated,
        })
    }

    /// Pack the canvas into the panel's portrait 1bpp buffer. Bit 1 is
    /// white, so the buffer starts all-set and ink clears bits.
    fn pack(&self, canvas: &Canvas) -> Vec<u8> {
        if !self.rotated {
            return canvas.pack_1bpp(false);
        }
        let stride = (PANEL_W as usize).div_ceil(8);
        let mut out = vec![0xFFu8; stride * PANEL_H as usize];
        let h = canvas.height();
        for py in 0..PANEL_H {
            for px in 0..PANEL_W {
                // 90-degree rotation: panel column walks canvas rows bottom-up
                let (x, y) = (py, h - 1 - px);
                if canvas.pixel(x, y) == Some(BinaryColor::On) {
                    out[py as usize * stride + px as usize / 8] &= !(0x80 >> (px % 8));
                }
            }
        }
        out
    }
}

impl DisplayDriver for EpaperDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn name(&self) -> &'static str {
        "epaper"
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        // constructor brought the panel up; a repeat init is a wake-up
        self.epd
            .wake_up(&mut self.spi, &mut self.delay)
            .map_err(|e| DisplayError::InitializationFailed(format!("{e:?}")))?;
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
        let buffer = self.pack(canvas);
        self.epd
            .update_and_display_frame(&mut self.spi, &buffer, &mut self.delay)
            .map_err(|e| DisplayError::SpiError(format!("{e:?}")))?;
        debug!("e-paper frame pushed ({} bytes)", buffer.len());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.epd
            .clear_frame(&mut self.spi, &mut self.delay)
            .map_err(|e| DisplayError::SpiError(format!("{e:?}")))?;
        self.epd
            .display_frame(&mut self.spi, &mut self.delay)
            .map_err(|e| DisplayError::SpiError(format!("{e:?}")))?;
        // leave the panel in deep sleep; init() wakes it back up
        self.epd
            .sleep(&mut self.spi, &mut self.delay)
            .map_err(|e| DisplayError::SpiError(format!("{e:?}")))?;
        Ok(())
    }
}
