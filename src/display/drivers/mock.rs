/*
 *  display/drivers/mock.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Scriptable in-memory driver for exercising the update loop without a
 *  panel attached.
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

use std::sync::{Arc, Mutex};

use crate::display::canvas::Canvas;
use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, DisplayCapabilities, DisplayDriver};

/// Observable state of a [`MockDriver`], shared with the test that created
/// it so counters survive the driver being boxed and moved into the loop.
#[derive(Debug, Default)]
pub struct MockState {
    pub init_count: u32,
    pub render_count: u32,
    pub clear_count: u32,
    pub last_frame: Option<Canvas>,
    /// Fail this many upcoming render_frame calls, then recover.
    pub fail_next_renders: u32,
    /// When set, every init call fails.
    pub fail_init: bool,
}

pub struct MockDriver {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capabilities: DisplayCapabilities {
                width,
                height,
                color_depth: ColorDepth::Monochrome,
                wear_limited: true,
                max_fps: 1,
            },
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Handle for inspecting and scripting this driver from a test.
    pub fn state(&self) -> Arc<Mutex<MockState>> {
        Arc::clone(&self.state)
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_init {
            return Err(DisplayError::InitializationFailed(
                "scripted init failure".into(),
            ));
        }
        state.init_count += 1;
        Ok(())
    }

    fn render_frame(&mut self, canvas: &Canvas) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_renders > 0 {
            state.fail_next_renders -= 1;
            return Err(DisplayError::WriteFailed("scripted render failure".into()));
        }
        state.render_count += 1;
        state.last_frame = Some(canvas.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.clear_count += 1;
        state.last_frame = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_track_calls() {
        let mut driver = MockDriver::new(32, 16);
        let state = driver.state();

        driver.init().unwrap();
        driver.render_frame(&Canvas::new(32, 16)).unwrap();
        driver.clear().unwrap();

        let s = state.lock().unwrap();
        assert_eq!(s.init_count, 1);
        assert_eq!(s.render_count, 1);
        assert_eq!(s.clear_count, 1);
        assert!(s.last_frame.is_none());
    }

    #[test]
    fn test_scripted_failures_then_recovery() {
        let mut driver = MockDriver::new(32, 16);
        driver.state().lock().unwrap().fail_next_renders = 2;

        let canvas = Canvas::new(32, 16);
        assert!(driver.render_frame(&canvas).is_err());
        assert!(driver.render_frame(&canvas).is_err());
        assert!(driver.render_frame(&canvas).is_ok());
    }
}
