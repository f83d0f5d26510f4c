/*
 *  display/error.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Unified error types for the display subsystem
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

use thiserror::Error;

/// Unified error type for all display operations. Single occurrences are
/// recovered locally by the update loop; only the factory surfaces these at
/// startup, and even then it degrades to the virtual sink for hardware
/// failures.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Display initialization failed: {0}")]
    InitializationFailed(String),

    #[error("SPI communication error: {0}")]
    SpiError(String),

    #[error("GPIO error: {0}")]
    GpioError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Frame geometry mismatch: canvas {canvas_w}x{canvas_h}, panel {panel_w}x{panel_h}")]
    GeometryMismatch {
        canvas_w: u32,
        canvas_h: u32,
        panel_w: u32,
        panel_h: u32,
    },

    #[error("Write to sink failed: {0}")]
    WriteFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
