/*
 *  layout.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Converts a playback snapshot (or the idle placeholder) plus canvas
 *  geometry into a composed monochrome frame: transport icon, wrapped
 *  title, artist, album, progress bar and time readout.
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

use core::convert::Infallible;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle, Triangle};
use embedded_graphics::text::{Baseline, Text};

use crate::display::canvas::Canvas;
use crate::fonts::{self, FontFamily};
use crate::playback::{PlaybackSnapshot, PlayerStatus};

const MARGIN: u32 = 4;
const ICON_SIZE: u32 = 12;
const TITLE_MAX_LINES: usize = 2;
const BAR_HEIGHT: u32 = 8;
const ELLIPSIS: &str = "...";

/// What the renderer is asked to draw this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    /// No compatible player on the bus; stable placeholder frame.
    Idle,
    NowPlaying(PlaybackSnapshot),
}

/// Stateless except for geometry. `render` is a pure function of the scene:
/// the same scene always composes the same frame.
pub struct LayoutRenderer {
    width: u32,
    height: u32,
}

impl LayoutRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn render(&self, scene: &Scene) -> Canvas {
        let mut canvas = Canvas::new(self.width, self.height);
        let result = match scene {
            Scene::Idle => self.draw_idle(&mut canvas),
            Scene::NowPlaying(snapshot) => self.draw_now_playing(&mut canvas, snapshot),
        };
        infallible(result);
        canvas
    }

    fn draw_idle(&self, canvas: &mut Canvas) -> Result<(), Infallible> {
        let font = fonts::get(FontFamily::SansBold, 15);
        let sub_font = fonts::get(FontFamily::Sans, 10);

        // tiny-but-valid geometries must not underflow; the canvas clips
        // whatever ends up outside
        let mid = self.height / 2;
        center_text(canvas, font, "No music playing", mid.saturating_sub(14))?;
        center_text(canvas, sub_font, "waiting for a player", mid + 4)?;
        Ok(())
    }

    fn draw_now_playing(
        &self,
        canvas: &mut Canvas,
        snapshot: &PlaybackSnapshot,
    ) -> Result<(), Infallible> {
        let title_font = fonts::get(FontFamily::SansBold, 18);
        let artist_font = fonts::get(FontFamily::Sans, 13);
        let album_font = fonts::get(FontFamily::Sans, 10);
        let time_font = fonts::get(FontFamily::Sans, 10);

        let bar_y = self.height.saturating_sub(MARGIN + BAR_HEIGHT + 14);
        let time_y = self.height.saturating_sub(MARGIN + 10);

        draw_transport_icon(canvas, snapshot.status, MARGIN, MARGIN)?;

        // text column starts right of the icon
        let text_x = MARGIN + ICON_SIZE + MARGIN;
        let avail = self.width.saturating_sub(text_x + MARGIN);
        let mut y = MARGIN;

        // title, wrapped, capped at two lines; every line fitted to the
        // pixel width so an unbreakable word cannot clip mid-glyph
        let lines = title_lines(&snapshot.title, title_font, avail);
        for line in &lines {
            if y + line_height(title_font) > bar_y {
                break;
            }
            draw_line(canvas, title_font, line, text_x, y)?;
            y += line_height(title_font);
        }
        if lines.is_empty() {
            // empty title still consumes a line so the block below it
            // doesn't jump around between tracks
            y += line_height(title_font);
        }

        if y + line_height(artist_font) <= bar_y {
            let artist = ellipsize(&snapshot.artist, artist_font, avail);
            draw_line(canvas, artist_font, &artist, text_x, y)?;
        }
        y += line_height(artist_font);

        if y + line_height(album_font) <= bar_y {
            let album = ellipsize(&snapshot.album, album_font, avail);
            draw_line(canvas, album_font, &album, text_x, y)?;
        }

        let fraction = fill_fraction(snapshot.position_secs, snapshot.length_secs);
        let bar_width = self.width.saturating_sub(2 * MARGIN);
        draw_progress_bar(canvas, MARGIN, bar_y, bar_width, fraction)?;

        let readout = format_progress(snapshot.position_secs, snapshot.length_secs);
        draw_line(canvas, time_font, &readout, MARGIN, time_y)?;
        Ok(())
    }
}

/// Progress fraction in [0, 1]. Unknown or zero length pins the bar empty.
pub fn fill_fraction(position_secs: f64, length_secs: Option<f64>) -> f64 {
    match length_secs {
        Some(len) if len > 0.0 => (position_secs / len).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// `MM:SS`, rolling over to `H:MM:SS` past the hour.
pub fn format_time(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Combined time readout; unknown length renders as `--:--`.
pub fn format_progress(position_secs: f64, length_secs: Option<f64>) -> String {
    let length = match length_secs {
        Some(len) if len > 0.0 => format_time(len),
        _ => "--:--".to_string(),
    };
    format!("{} / {}", format_time(position_secs), length)
}

/// Greedy word wrap measured against font advance widths. Words are packed
/// until the next one would overflow; a word wider than the line stands
/// alone and is never split.
pub fn wrap_text(text: &str, font: &MonoFont<'_>, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if fonts::text_width(font, &candidate) <= max_width || current.is_empty() {
            current = candidate;
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// The title lines exactly as drawn: wrapped, capped at two, and each one
/// fitted to the pixel width (an unbreakable over-wide word gets the
/// truncation marker instead of clipping).
fn title_lines(text: &str, font: &MonoFont<'_>, avail: u32) -> Vec<String> {
    let wrapped = wrap_text(text, font, avail);
    let truncated = wrapped.len() > TITLE_MAX_LINES;
    wrapped
        .iter()
        .take(TITLE_MAX_LINES)
        .enumerate()
        .map(|(i, line)| {
            if truncated && i + 1 == TITLE_MAX_LINES {
                ellipsize(&format!("{line} {ELLIPSIS}"), font, avail)
            } else {
                ellipsize(line, font, avail)
            }
        })
        .collect()
}

/// Truncate with a trailing marker so the line fits `max_width`.
pub fn ellipsize(text: &str, font: &MonoFont<'_>, max_width: u32) -> String {
    if fonts::text_width(font, text) <= max_width {
        return text.to_string();
    }
    let budget = fonts::chars_that_fit(font, max_width);
    let keep = budget.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

fn line_height(font: &MonoFont<'_>) -> u32 {
    font.character_size.height + 2
}

fn draw_line(
    canvas: &mut Canvas,
    font: &'static MonoFont<'static>,
    text: &str,
    x: u32,
    y: u32,
) -> Result<(), Infallible> {
    if text.is_empty() {
        return Ok(()); // blank line: geometry reserved by the caller
    }
    let style = MonoTextStyle::new(font, BinaryColor::On);
    Text::with_baseline(text, Point::new(x as i32, y as i32), style, Baseline::Top)
        .draw(canvas)?;
    Ok(())
}

fn center_text(
    canvas: &mut Canvas,
    font: &'static MonoFont<'static>,
    text: &str,
    y: u32,
) -> Result<(), Infallible> {
    let w = fonts::text_width(font, text);
    let x = canvas.width().saturating_sub(w) / 2;
    draw_line(canvas, font, text, x, y)
}

fn draw_transport_icon(
    canvas: &mut Canvas,
    status: PlayerStatus,
    x: u32,
    y: u32,
) -> Result<(), Infallible> {
    let (x, y, s) = (x as i32, y as i32, ICON_SIZE as i32);
    let fill = PrimitiveStyle::with_fill(BinaryColor::On);
    let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);

    match status {
        PlayerStatus::Playing => {
            Triangle::new(
                Point::new(x, y),
                Point::new(x, y + s),
                Point::new(x + s, y + s / 2),
            )
            .into_styled(fill)
            .draw(canvas)?;
        }
        PlayerStatus::Paused => {
            let bar = Size::new(ICON_SIZE / 3, ICON_SIZE);
            Rectangle::new(Point::new(x, y), bar)
                .into_styled(fill)
                .draw(canvas)?;
            Rectangle::new(Point::new(x + 2 * s / 3, y), bar)
                .into_styled(fill)
                .draw(canvas)?;
        }
        PlayerStatus::Stopped => {
            Rectangle::new(Point::new(x, y), Size::new(ICON_SIZE, ICON_SIZE))
                .into_styled(fill)
                .draw(canvas)?;
        }
        PlayerStatus::Unknown => {
            Circle::new(Point::new(x, y), ICON_SIZE)
                .into_styled(stroke)
                .draw(canvas)?;
        }
    }
    Ok(())
}

fn draw_progress_bar(
    canvas: &mut Canvas,
    x: u32,
    y: u32,
    width: u32,
    fraction: f64,
) -> Result<(), Infallible> {
    let outline = Rectangle::new(Point::new(x as i32, y as i32), Size::new(width, BAR_HEIGHT));
    outline
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(canvas)?;

    let inner = width.saturating_sub(2);
    let filled = (inner as f64 * fraction).round() as u32;
    if filled > 0 {
        Rectangle::new(
            Point::new(x as i32 + 1, y as i32 + 1),
            Size::new(filled.min(inner), BAR_HEIGHT - 2),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(canvas)?;
    }
    Ok(())
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => match e {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(position: f64, length: Option<f64>) -> PlaybackSnapshot {
        PlaybackSnapshot::new(
            PlayerStatus::Playing,
            "Test Track".to_string(),
            "Test Artist".to_string(),
            "Test Album".to_string(),
            position,
            length,
        )
    }

    #[test]
    fn test_fill_fraction_guards_zero_length() {
        assert_eq!(fill_fraction(10.0, None), 0.0);
        assert_eq!(fill_fraction(10.0, Some(0.0)), 0.0);
        assert_eq!(fill_fraction(15.0, Some(30.0)), 0.5);
        // position past the end clamps rather than overflowing the bar
        assert_eq!(fill_fraction(45.0, Some(30.0)), 1.0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(90.0), "01:30");
        assert_eq!(format_time(3661.0), "1:01:01");
        assert_eq!(format_time(-5.0), "00:00");
    }

    #[test]
    fn test_format_progress_unknown_length() {
        assert_eq!(format_progress(30.0, Some(30.0)), "00:30 / 00:30");
        assert_eq!(format_progress(12.0, None), "00:12 / --:--");
    }

    #[test]
    fn test_wrap_never_splits_words() {
        let font = fonts::get(FontFamily::Sans, 10);
        let lines = wrap_text("a very long track title here", font, 80);
        for line in &lines {
            for word in line.split(' ') {
                assert!("a very long track title here".contains(word));
            }
        }
        assert!(lines.len() > 1);
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let font = fonts::get(FontFamily::Sans, 10);
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let first = wrap_text(text, font, 100);
        let rejoined = first.join(" ");
        let second = wrap_text(&rejoined, font, 100);
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrap_keeps_oversized_word_whole() {
        let font = fonts::get(FontFamily::Sans, 10);
        let lines = wrap_text("supercalifragilisticexpialidocious ok", font, 40);
        assert_eq!(lines[0], "supercalifragilisticexpialidocious");
        assert_eq!(lines[1], "ok");
    }

    #[test]
    fn test_ellipsize_fits_width() {
        let font = fonts::get(FontFamily::Sans, 10);
        let long = "an unreasonably long artist name that cannot fit";
        let out = ellipsize(long, font, 100);
        assert!(fonts::text_width(font, &out) <= 100);
        assert!(out.ends_with(ELLIPSIS));
        // short strings pass through untouched
        assert_eq!(ellipsize("ok", font, 100), "ok");
    }

    #[test]
    fn test_full_track_renders_full_bar() {
        let renderer = LayoutRenderer::new(250, 122);
        let canvas = renderer.render(&Scene::NowPlaying(playing(30.0, Some(30.0))));

        // progress band interior is solid ink from edge to edge
        let bar_y = 122 - (MARGIN + BAR_HEIGHT + 14) + BAR_HEIGHT / 2;
        for x in (MARGIN + 1)..(250 - MARGIN - 1) {
            assert_eq!(canvas.pixel(x, bar_y), Some(BinaryColor::On), "x={x}");
        }
        assert!(canvas.count_ink_pixels() > 0);
    }

    #[test]
    fn test_zero_length_renders_empty_bar() {
        let renderer = LayoutRenderer::new(250, 122);
        let canvas = renderer.render(&Scene::NowPlaying(playing(10.0, None)));

        let bar_y = 122 - (MARGIN + BAR_HEIGHT + 14) + BAR_HEIGHT / 2;
        // interior row blank; only the 1px outline carries ink
        for x in (MARGIN + 1)..(250 - MARGIN - 1) {
            assert_eq!(canvas.pixel(x, bar_y), Some(BinaryColor::Off), "x={x}");
        }
    }

    #[test]
    fn test_idle_layout_is_deterministic() {
        let renderer = LayoutRenderer::new(250, 122);
        let a = renderer.render(&Scene::Idle);
        let b = renderer.render(&Scene::Idle);
        assert_eq!(a, b);
        assert!(a.count_ink_pixels() > 0);
    }

    #[test]
    fn test_wide_title_never_overflows() {
        let renderer = LayoutRenderer::new(128, 64);
        let snapshot = PlaybackSnapshot::new(
            PlayerStatus::Playing,
            "An Extraordinarily Verbose And Unreasonably Long Track Title Indeed".to_string(),
            "Artist".to_string(),
            "Album".to_string(),
            5.0,
            Some(100.0),
        );
        // must not panic, and nothing may land outside the canvas
        let canvas = renderer.render(&Scene::NowPlaying(snapshot));
        assert!(canvas.count_ink_pixels() > 0);
    }

    #[test]
    fn test_tiny_geometry_renders_without_panic() {
        // small but valid per config validation (width/height > 0)
        for (w, h) in [(64, 20), (6, 64), (1, 1), (8, 28)] {
            let renderer = LayoutRenderer::new(w, h);
            renderer.render(&Scene::Idle);
            renderer.render(&Scene::NowPlaying(playing(10.0, Some(30.0))));
        }
    }

    #[test]
    fn test_unbreakable_title_word_gets_marker() {
        let font = fonts::get(FontFamily::SansBold, 18);
        let avail = 100; // far narrower than the word below
        let lines = title_lines("Supercalifragilisticexpialidocious", font, avail);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(ELLIPSIS));
        assert!(fonts::text_width(font, &lines[0]) <= avail);
    }

    #[test]
    fn test_first_title_line_is_fitted_too() {
        let font = fonts::get(FontFamily::SansBold, 18);
        let avail = 100;
        // over-wide word on a non-final line, normal words after it
        let lines = title_lines("Antidisestablishmentarianism live set", font, avail);
        for line in &lines {
            assert!(fonts::text_width(font, line) <= avail, "line {line:?}");
        }
        assert!(lines[0].ends_with(ELLIPSIS));
    }

    #[test]
    fn test_empty_fields_keep_geometry_stable() {
        let renderer = LayoutRenderer::new(250, 122);
        let with_album = renderer.render(&Scene::NowPlaying(playing(1.0, Some(10.0))));
        let blank = PlaybackSnapshot::new(
            PlayerStatus::Playing,
            String::new(),
            String::new(),
            String::new(),
            1.0,
            Some(10.0),
        );
        let without = renderer.render(&Scene::NowPlaying(blank));
        // the bar lands on the same band either way
        let bar_y = 122 - (MARGIN + BAR_HEIGHT + 14);
        assert_eq!(with_album.pixel(MARGIN, bar_y), Some(BinaryColor::On));
        assert_eq!(without.pixel(MARGIN, bar_y), Some(BinaryColor::On));
    }
}
