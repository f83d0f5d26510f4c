/*
 *  display/drivers/mod.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Driver implementations. The virtual sink and the mock are always built;
 *  hardware backends are opt-in features so the crate compiles on a dev
 *  machine without SPI headers.
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

pub mod mock;
pub mod virtual_disk;

#[cfg(any(feature = "epaper", feature = "tft"))]
mod hal;

#[cfg(feature = "epaper")]
pub mod epaper;

#[cfg(feature = "tft")]
pub mod tft;

pub use mock::MockDriver;
pub use virtual_disk::VirtualDriver;

#[cfg(feature = "epaper")]
pub use epaper::EpaperDriver;

#[cfg(feature = "tft")]
pub use tft::TftDriver;
