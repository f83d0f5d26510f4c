/*
 *  orchestrator.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  The update loop: poll the playback source, decide whether the frame
 *  changed enough to warrant a redraw, push to the driver, sleep to the
 *  next tick. Owns all mutable render state.
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

use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::DisplayConfig;
use crate::display::drivers::VirtualDriver;
use crate::display::traits::{BoxedDriver, DisplayDriver};
use crate::layout::{LayoutRenderer, Scene};
use crate::playback::{PlaybackSource, PollOutcome};

/// Consecutive driver failures tolerated before the hardware is abandoned
/// for the virtual sink.
const MAX_DRIVER_FAILURES: u32 = 3;

/// What was last pushed to the display, and at which track position.
#[derive(Debug, Default)]
pub struct RenderState {
    last_scene: Option<Scene>,
    last_drawn_position: f64,
}

/// Pure redraw decision: any change in status/title/artist/album forces a
/// redraw; while playing, position alone triggers one only after advancing
/// by `threshold_secs` since the last push. Bounds the refresh rate for
/// wear-limited panels while keeping the bar visibly live.
pub fn should_redraw(state: &RenderState, scene: &Scene, threshold_secs: f64) -> bool {
    let Some(last) = state.last_scene.as_ref() else {
        return true; // first frame
    };
    match (last, scene) {
        (Scene::Idle, Scene::Idle) => false,
        (Scene::Idle, Scene::NowPlaying(_)) | (Scene::NowPlaying(_), Scene::Idle) => true,
        (Scene::NowPlaying(prev), Scene::NowPlaying(next)) => {
            if prev.status != next.status
                || prev.title != next.title
                || prev.artist != next.artist
                || prev.album != next.album
            {
                return true;
            }
            next.status.is_playing()
                && (next.position_secs - state.last_drawn_position).abs() >= threshold_secs
        }
    }
}

pub struct Orchestrator {
    source: Box<dyn PlaybackSource>,
    driver: BoxedDriver,
    renderer: LayoutRenderer,
    display_config: DisplayConfig,
    state: RenderState,
    consecutive_driver_failures: u32,
    source_error_count: u64,
    fell_back: bool,
}

impl Orchestrator {
    pub fn new(
        source: Box<dyn PlaybackSource>,
        driver: BoxedDriver,
        display_config: DisplayConfig,
    ) -> Self {
        let renderer = LayoutRenderer::new(display_config.width, display_config.height);
        Self {
            source,
            driver,
            renderer,
            display_config,
            state: RenderState::default(),
            consecutive_driver_failures: 0,
            source_error_count: 0,
            fell_back: false,
        }
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    pub fn source_error_count(&self) -> u64 {
        self.source_error_count
    }

    /// One poll/decide/render cycle. Never fails: source errors degrade to
    /// the idle layout, driver errors are absorbed up to the fallback.
    pub fn tick(&mut self) {
        let scene = match self.source.poll() {
            Ok(PollOutcome::Track(snapshot)) => Scene::NowPlaying(snapshot),
            Ok(PollOutcome::NoPlayer) => Scene::Idle,
            Err(e) => {
                self.source_error_count += 1;
                warn!("Playback source error (#{}): {e}", self.source_error_count);
                Scene::Idle
            }
        };

        if !should_redraw(&self.state, &scene, self.display_config.redraw_threshold_secs) {
            debug!("No visible change; skipping redraw");
            return;
        }

        let canvas = self.renderer.render(&scene);
        match self.driver.render_frame(&canvas) {
            Ok(()) => {
                self.consecutive_driver_failures = 0;
                if let Scene::NowPlaying(snapshot) = &scene {
                    self.state.last_drawn_position = snapshot.position_secs;
                }
                self.state.last_scene = Some(scene);
            }
            Err(e) => {
                // last pushed frame stays up; no retry inside the tick
                self.consecutive_driver_failures += 1;
                error!(
                    "Display render failed ({} consecutive): {e}",
                    self.consecutive_driver_failures
                );
                if self.consecutive_driver_failures >= MAX_DRIVER_FAILURES {
                    self.fall_back_to_virtual();
                }
            }
        }
    }

    /// Swap the hardware driver for the virtual sink for the remainder of
    /// the process lifetime. One-shot.
    fn fall_back_to_virtual(&mut self) {
        if self.fell_back {
            return;
        }
        warn!(
            "{} display failed {} times; falling back to virtual display",
            self.driver.name(),
            self.consecutive_driver_failures
        );
        let mut fallback = VirtualDriver::new(&self.display_config);
        if let Err(e) = fallback.init() {
            error!("Virtual fallback init failed: {e}");
        }
        self.driver = Box::new(fallback);
        self.consecutive_driver_failures = 0;
        self.fell_back = true;
        // force a redraw on the new sink next tick
        self.state.last_scene = None;
    }

    /// Loop until `shutdown` flips. Each tick sleeps relative to its start
    /// so render latency does not accumulate drift.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        if let Err(e) = self.driver.init() {
            warn!("Display init failed: {e}");
            self.fall_back_to_virtual();
            if let Err(e) = self.driver.init() {
                error!("Fallback display init failed: {e}");
            }
        }
        info!(
            "Update loop running: {} display, {:.1}s interval",
            self.driver.name(),
            self.display_config.update_interval_secs
        );

        let interval = self.display_config.update_interval();
        while !*shutdown.borrow() {
            let tick_start = Instant::now();
            self.tick();
            let deadline = tick_start + interval;
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {}
                _ = shutdown.changed() => {}
            }
        }

        info!("Shutting down; clearing display");
        if let Err(e) = self.driver.clear() {
            warn!("Display clear on shutdown failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{PlaybackSnapshot, PlayerStatus};

    fn snapshot(title: &str, position: f64) -> PlaybackSnapshot {
        PlaybackSnapshot::new(
            PlayerStatus::Playing,
            title.to_string(),
            "Artist".to_string(),
            "Album".to_string(),
            position,
            Some(180.0),
        )
    }

    fn drawn(scene: Scene, position: f64) -> RenderState {
        RenderState {
            last_scene: Some(scene),
            last_drawn_position: position,
        }
    }

    #[test]
    fn test_first_frame_always_draws() {
        let state = RenderState::default();
        assert!(should_redraw(&state, &Scene::Idle, 2.0));
    }

    #[test]
    fn test_idle_to_idle_skips() {
        let state = drawn(Scene::Idle, 0.0);
        assert!(!should_redraw(&state, &Scene::Idle, 2.0));
    }

    #[test]
    fn test_track_change_draws() {
        let state = drawn(Scene::NowPlaying(snapshot("One", 10.0)), 10.0);
        let next = Scene::NowPlaying(snapshot("Two", 0.0));
        assert!(should_redraw(&state, &next, 2.0));
    }

    #[test]
    fn test_small_position_advance_is_suppressed() {
        let state = drawn(Scene::NowPlaying(snapshot("One", 10.0)), 10.0);
        let next = Scene::NowPlaying(snapshot("One", 11.0));
        assert!(!should_redraw(&state, &next, 2.0));
    }

    #[test]
    fn test_threshold_position_advance_draws() {
        let state = drawn(Scene::NowPlaying(snapshot("One", 10.0)), 10.0);
        let next = Scene::NowPlaying(snapshot("One", 12.0));
        assert!(should_redraw(&state, &next, 2.0));
    }

    #[test]
    fn test_paused_position_change_is_suppressed() {
        let mut prev = snapshot("One", 10.0);
        prev.status = PlayerStatus::Paused;
        let mut next = snapshot("One", 50.0);
        next.status = PlayerStatus::Paused;
        let state = drawn(Scene::NowPlaying(prev), 10.0);
        // a seek while paused does not move the bar until playback resumes
        assert!(!should_redraw(&state, &Scene::NowPlaying(next), 2.0));
    }

    #[test]
    fn test_status_flip_draws() {
        let state = drawn(Scene::NowPlaying(snapshot("One", 10.0)), 10.0);
        let mut next = snapshot("One", 10.0);
        next.status = PlayerStatus::Paused;
        assert!(should_redraw(&state, &Scene::NowPlaying(next), 2.0));
    }

    #[test]
    fn test_player_appearing_draws() {
        let state = drawn(Scene::Idle, 0.0);
        let next = Scene::NowPlaying(snapshot("One", 0.0));
        assert!(should_redraw(&state, &next, 2.0));
    }
}
