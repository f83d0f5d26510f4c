/*
 *  display/drivers/hal.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  SPI / GPIO bring-up shared by the hardware drivers.
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

use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, SpidevDevice};

use crate::display::error::DisplayError;

const GPIO_CHIP: &str = "/dev/gpiochip0";

pub fn open_spi(bus: &str, speed_hz: u32) -> Result<SpidevDevice, DisplayError> {
    let mut spi = SpidevDevice::open(bus)
        .map_err(|e| DisplayError::SpiError(format!("open {bus}: {e}")))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.0
        .configure(&options)
        .map_err(|e| DisplayError::SpiError(format!("configure {bus}: {e}")))?;
    Ok(spi)
}

pub fn output_pin(line: u32, label: &str) -> Result<CdevPin, DisplayError> {
    let mut chip = Chip::new(GPIO_CHIP)
        .map_err(|e| DisplayError::GpioError(format!("open {GPIO_CHIP}: {e}")))?;
    let handle = chip
        .get_line(line)
        .map_err(|e| DisplayError::GpioError(format!("line {line} ({label}): {e}")))?
        .request(LineRequestFlags::OUTPUT, 0, label)
        .map_err(|e| DisplayError::GpioError(format!("request {line} ({label}): {e}")))?;
    CdevPin::new(handle).map_err(|e| DisplayError::GpioError(format!("pin {line} ({label}): {e}")))
}

pub fn input_pin(line: u32, label: &str) -> Result<CdevPin, DisplayError> {
    let mut chip = Chip::new(GPIO_CHIP)
        .map_err(|e| DisplayError::GpioError(format!("open {GPIO_CHIP}: {e}")))?;
    let handle = chip
        .get_line(line)
        .map_err(|e| DisplayError::GpioError(format!("line {line} ({label}): {e}")))?
        .request(LineRequestFlags::INPUT, 0, label)
        .map_err(|e| DisplayError::GpioError(format!("request {line} ({label}): {e}")))?;
    CdevPin::new(handle).map_err(|e| DisplayError::GpioError(format!("pin {line} ({label}): {e}")))
}
