/*
 *  fonts.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  Process-wide mono font cache keyed by family and nominal size.
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

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{
    FONT_5X8, FONT_6X10, FONT_7X13, FONT_7X13_BOLD, FONT_9X15, FONT_9X15_BOLD, FONT_9X18_BOLD,
    FONT_10X20,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Sans,
    SansBold,
}

/// Available (family, nominal height) pairs, ordered by height. Lookup
/// snaps to the nearest available size so callers never miss.
const SANS: &[(u32, &MonoFont<'static>)] = &[
    (8, &FONT_5X8),
    (10, &FONT_6X10),
    (13, &FONT_7X13),
    (15, &FONT_9X15),
    (20, &FONT_10X20),
];

const SANS_BOLD: &[(u32, &MonoFont<'static>)] = &[
    (13, &FONT_7X13_BOLD),
    (15, &FONT_9X15_BOLD),
    (18, &FONT_9X18_BOLD),
];

fn cache() -> &'static Mutex<HashMap<(FontFamily, u32), &'static MonoFont<'static>>> {
    static CACHE: OnceLock<Mutex<HashMap<(FontFamily, u32), &'static MonoFont<'static>>>> =
        OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn nearest(table: &[(u32, &'static MonoFont<'static>)], size: u32) -> &'static MonoFont<'static> {
    table
        .iter()
        .min_by_key(|(h, _)| h.abs_diff(size))
        .map(|(_, f)| *f)
        .unwrap_or(&FONT_6X10)
}

/// Look up a font by family and nominal pixel height. Entries are resolved
/// once and reused; cached entries are never mutated or evicted.
pub fn get(family: FontFamily, size: u32) -> &'static MonoFont<'static> {
    let mut cache = cache().lock().unwrap();
    *cache.entry((family, size)).or_insert_with(|| match family {
        FontFamily::Sans => nearest(SANS, size),
        FontFamily::SansBold => nearest(SANS_BOLD, size),
    })
}

/// Advance width of `text` in pixels for a mono font.
pub fn text_width(font: &MonoFont<'_>, text: &str) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    n * (font.character_size.width + font.character_spacing)
}

/// How many characters of this font fit into `width_px`.
pub fn chars_that_fit(font: &MonoFont<'_>, width_px: u32) -> usize {
    let advance = font.character_size.width + font.character_spacing;
    if advance == 0 {
        return 0;
    }
    (width_px / advance) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_stable() {
        let a = get(FontFamily::Sans, 13);
        let b = get(FontFamily::Sans, 13);
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_nearest_size_snaps() {
        // 12 is absent; 13 is the closest sans size
        let f = get(FontFamily::Sans, 12);
        assert_eq!(f.character_size.height, 13);
    }

    #[test]
    fn test_text_width_scales_with_length() {
        let f = get(FontFamily::Sans, 10);
        assert_eq!(text_width(f, ""), 0);
        assert_eq!(text_width(f, "ab"), 2 * text_width(f, "a"));
    }

    #[test]
    fn test_chars_that_fit_matches_width() {
        let f = get(FontFamily::Sans, 10);
        let n = chars_that_fit(f, 120);
        assert!(text_width(f, &"x".repeat(n)) <= 120);
        assert!(text_width(f, &"x".repeat(n + 1)) > 120);
    }
}
