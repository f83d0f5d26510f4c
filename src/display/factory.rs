/*
 *  display/factory.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Maps the configured display kind onto a concrete driver. Hardware that
 *  cannot be brought up degrades to the virtual sink; a configuration the
 *  driver rejects outright stays fatal.
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

use log::{info, warn};

use crate::config::{DisplayConfig, DisplayKind};
use crate::display::drivers::VirtualDriver;
use crate::display::error::DisplayError;
use crate::display::traits::BoxedDriver;

/// Build the driver named by the config. Returns the virtual sink when the
/// requested hardware is unavailable (missing feature, bus failure); the
/// process keeps rendering either way.
pub fn create_driver(config: &DisplayConfig) -> Result<BoxedDriver, DisplayError> {
    match config.kind {
        DisplayKind::Virtual => {
            info!("Creating virtual display driver");
            Ok(Box::new(VirtualDriver::new(config)))
        }
        DisplayKind::EPaper => create_epaper(config),
        DisplayKind::Tft => create_tft(config),
    }
}

#[cfg(feature = "epaper")]
fn create_epaper(config: &DisplayConfig) -> Result<BoxedDriver, DisplayError> {
    use crate::display::drivers::EpaperDriver;
    info!("Creating e-paper display driver");
    match EpaperDriver::new(config) {
        Ok(driver) => Ok(Box::new(driver)),
        Err(e) => fall_back(config, "epaper", e),
    }
}

#[cfg(not(feature = "epaper"))]
fn create_epaper(config: &DisplayConfig) -> Result<BoxedDriver, DisplayError> {
    warn!("Built without the 'epaper' feature; falling back to virtual display");
    Ok(Box::new(VirtualDriver::new(config)))
}

#[cfg(feature = "tft")]
fn create_tft(config: &DisplayConfig) -> Result<BoxedDriver, DisplayError> {
    use crate::display::drivers::TftDriver;
    info!("Creating TFT display driver");
    match TftDriver::new(config) {
        Ok(driver) => Ok(Box::new(driver)),
        Err(e) => fall_back(config, "tft", e),
    }
}

#[cfg(not(feature = "tft"))]
fn create_tft(config: &DisplayConfig) -> Result<BoxedDriver, DisplayError> {
    warn!("Built without the 'tft' feature; falling back to virtual display");
    Ok(Box::new(VirtualDriver::new(config)))
}

/// Hardware bring-up failed. A config the driver itself rejects means the
/// operator asked for something impossible; surface it. Anything else is
/// the panel being absent or flaky, and the virtual sink takes over.
#[cfg(any(feature = "epaper", feature = "tft"))]
fn fall_back(
    config: &DisplayConfig,
    kind: &str,
    err: DisplayError,
) -> Result<BoxedDriver, DisplayError> {
    match err {
        DisplayError::InvalidConfiguration(_) | DisplayError::GeometryMismatch { .. } => Err(err),
        other => {
            warn!("{kind} display unavailable ({other}); falling back to virtual display");
            Ok(Box::new(VirtualDriver::new(config)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;

    #[test]
    fn test_virtual_kind_builds_virtual() {
        let config = DisplayConfig::default();
        let driver = create_driver(&config).unwrap();
        assert_eq!(driver.name(), "virtual");
        assert_eq!(driver.dimensions(), (250, 122));
    }

    #[cfg(not(feature = "epaper"))]
    #[test]
    fn test_epaper_without_feature_falls_back() {
        let config = DisplayConfig {
            kind: DisplayKind::EPaper,
            ..Default::default()
        };
        let driver = create_driver(&config).unwrap();
        assert_eq!(driver.name(), "virtual");
    }

    #[cfg(not(feature = "tft"))]
    #[test]
    fn test_tft_without_feature_falls_back() {
        let config = DisplayConfig {
            kind: DisplayKind::Tft,
            ..Default::default()
        };
        let driver = create_driver(&config).unwrap();
        assert_eq!(driver.name(), "virtual");
    }
}
