/*
 *  display/mod.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Display subsystem: canvas, driver abstraction, concrete drivers and the
 *  factory that picks one at startup.
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

pub mod canvas;
pub mod drivers;
pub mod error;
pub mod factory;
pub mod traits;

pub use canvas::Canvas;
pub use error::DisplayError;
pub use factory::create_driver;
pub use traits::{BoxedDriver, ColorDepth, DisplayCapabilities, DisplayDriver};
