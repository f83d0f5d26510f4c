/*
 *  display/drivers/tft.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  ST7789 TFT driver over SPI via mipidsi. Monochrome frames are expanded
 *  to RGB565 at push time.
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

use display_interface_spi::SPIInterface;
use embedded_graphics::pixelcolor::{BinaryColor, Rgb565, RgbColor};
use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};
use log::{debug, info};
use mipidsi::models::ST7789;
use mipidsi::{Builder, Display};

use crate::config::{BusConfig, DisplayConfig};
use crate::display::canvas::Canvas;
use crate::display::drivers::hal;
use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, DisplayCapabilities, DisplayDriver};

const DEFAULT_SPI_BUS: &str = "/dev/spidev0.0";
const DEFAULT_SPI_SPEED_HZ: u32 = 40_000_000;
const DEFAULT_DC_PIN: u32 = 25;
const DEFAULT_RST_PIN: u32 = 27;

type Panel = Display<SPIInterface<SpidevDevice, CdevPin>, ST7789, CdevPin>;

pub struct TftDriver {
    display: Panel,
    capabilities: DisplayCapabilities,
}

impl TftDriver {
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        match config.model.as_deref() {
            None | Some("st7789") => {}
            Some(other) => {
                return Err(DisplayError::InvalidConfiguration(format!(
                    "unsupported TFT model: {other} (supported: st7789)"
                )));
            }
        }
        if config.width > u16::MAX as u32 || config.height > u16::MAX as u32 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "TFT geometry out of range: {}x{}",
                config.width, config.height
            )));
        }

        let (bus, speed_hz, dc, rst) = match config.bus.as_ref() {
            Some(BusConfig::Spi {
                bus,
                speed_hz,
                dc_pin,
                rst_pin,
                ..
            }) => (
                bus.as_str(),
                speed_hz.unwrap_or(DEFAULT_SPI_SPEED_HZ),
                *dc_pin,
                rst_pin.unwrap_or(DEFAULT_RST_PIN),
            ),
            None => (
                DEFAULT_SPI_BUS,
                DEFAULT_SPI_SPEED_HZ,
                DEFAULT_DC_PIN,
                DEFAULT_RST_PIN,
            ),
        };

        let spi = hal::open_spi(bus, speed_hz)?;
        let dc_pin = hal::output_pin(dc, "inkbeat-dc")?;
        let rst_pin = hal::output_pin(rst, "inkbeat-rst")?;
        let di = SPIInterface::new(spi, dc_pin);
        let mut delay = Delay;

        let display = Builder::new(ST7789, di)
            .display_size(config.width as u16, config.height as u16)
            .reset_pin(rst_pin)
            .init(&mut delay)
            .map_err(|e| DisplayError::InitializationFailed(format!("st7789: {e:?}")))?;
        info!("TFT panel up on {bus} ({}x{})", config.width, config.height);

        Ok(Self {
            display,
            capabilities: DisplayCapabilities {
                width: config.width,
                height: config.height,
                color_depth: ColorDepth::Rgb565,
                wear_limited: false,
                max_fps: 30,
            },
        })
    }
}

impl DisplayDriver for TftDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn name(&self) -> &'static str {
        "tft"
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        // panel was initialized in the constructor; just blank it
        self.clear()
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
        let colors = canvas.as_slice().iter().map(|p| match p {
            BinaryColor::On => Rgb565::BLACK,
            BinaryColor::Off => Rgb565::WHITE,
        });
        self.display
            .set_pixels(
                0,
                0,
                (caps.width - 1) as u16,
                (caps.height - 1) as u16,
                colors,
            )
            .map_err(|e| DisplayError::WriteFailed(format!("{e:?}")))?;
        debug!("TFT frame pushed");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let caps = &self.capabilities;
        let white = core::iter::repeat(Rgb565::WHITE).take((caps.width * caps.height) as usize);
        self.display
            .set_pixels(
                0,
                0,
                (caps.width - 1) as u16,
                (caps.height - 1) as u16,
                white,
            )
            .map_err(|e| DisplayError::WriteFailed(format!("{e:?}")))?;
        Ok(())
    }
}
