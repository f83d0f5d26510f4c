/*
 *  lib.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Polls MPRIS playback state over D-Bus and renders a compact now-playing
 *  layout to e-paper, TFT or a virtual PNG sink.
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

pub mod config;
pub mod display;
pub mod fonts;
pub mod layout;
pub mod mpris;
pub mod orchestrator;
pub mod playback;

pub use display::{BoxedDriver, Canvas, DisplayDriver, DisplayError, create_driver};
pub use layout::{LayoutRenderer, Scene};
pub use orchestrator::Orchestrator;
pub use playback::{PlaybackSnapshot, PlaybackSource, PlayerStatus, PollOutcome, SourceError};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
