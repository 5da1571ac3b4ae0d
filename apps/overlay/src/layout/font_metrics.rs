//! Static font-metric tables for the overlay display fonts.
//!
//! Character widths are in em units (relative to font size), so a string's
//! pixel width at size `s` is `measure_em(text) * s`. Line height is the
//! font's "normal" line box, also in em. Tables cover ASCII 0x20..=0x7E
//! (95 printable characters); anything else falls back to the average width.
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// Font families available to overlay displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    /// Card and timer default. Humanist sans-serif with tabular digits.
    #[default]
    Inter,
    /// Condensed display face, packs more digits per line.
    Oswald,
    /// Monospace, every glyph one advance wide.
    JetbrainsMono,
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
/// `widths[i]` = advance width of ASCII character `(i + 32)` in em.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: FontFamily,
    widths: [f64; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f64,
    pub space_width: f64,
    /// Height of one line box in em.
    pub line_height: f64,
}

impl FontMetricTable {
    /// Measures the advance width of a string in em units.
    pub fn measure_em(&self, s: &str) -> f64 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of a single unwrapped line in whole pixels, rounded up the way
    /// a layout engine reports `scrollWidth`.
    pub fn line_width_px(&self, s: &str, font_size: u32) -> u32 {
        to_px(self.measure_em(s) * f64::from(font_size))
    }

    /// Height of `lines` stacked line boxes in whole pixels.
    pub fn block_height_px(&self, lines: u32, font_size: u32) -> u32 {
        to_px(self.line_height * f64::from(font_size) * f64::from(lines))
    }

    /// Greedy word-wrap at `max_width_px`. Returns the pixel width of each
    /// produced line; a single word wider than the limit gets a line of its own.
    pub fn wrap_lines(&self, s: &str, font_size: u32, max_width_px: u32) -> Vec<u32> {
        let words: Vec<&str> = s.split_whitespace().collect();
        if words.is_empty() {
            return vec![];
        }

        let size = f64::from(font_size);
        let max_width_em = f64::from(max_width_px) / size;
        let mut lines = Vec::new();
        let mut current = 0.0_f64;
        let mut first_on_line = true;

        for word in &words {
            let word_w = self.measure_em(word);
            let space_w = if first_on_line { 0.0 } else { self.space_width };

            if !first_on_line && current + space_w + word_w > max_width_em {
                lines.push(to_px(current * size));
                current = word_w;
            } else {
                current += space_w + word_w;
                first_on_line = false;
            }
        }
        lines.push(to_px(current * size));
        lines
    }
}

fn to_px(value: f64) -> u32 {
    // Absorb float noise so an exact 100.0 does not become 101.
    let rounded = (value * 1e6).round() / 1e6;
    rounded.ceil().max(0.0) as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static INTER_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Inter,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.52,
    space_width: 0.25,
    line_height: 1.21,
};

static OSWALD_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Oswald,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.17, 0.20, 0.26, 0.38, 0.38, 0.61, 0.46, 0.15, 0.23, 0.23, 0.27, 0.40, 0.19, 0.23, 0.19, 0.21,
        // 0     1     2     3     4     5     6     7     8     9
        0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38,
        // :     ;     <     =     >     ?     @
        0.19, 0.19, 0.40, 0.40, 0.40, 0.34, 0.69,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.46, 0.41, 0.41, 0.46, 0.38, 0.34, 0.46, 0.46, 0.17, 0.27, 0.41, 0.36, 0.53,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.46, 0.49, 0.38, 0.49, 0.41, 0.34, 0.38, 0.46, 0.46, 0.61, 0.41, 0.41, 0.38,
        // [     \     ]     ^     _     `
        0.19, 0.21, 0.19, 0.32, 0.38, 0.23,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.38, 0.38, 0.34, 0.38, 0.38, 0.21, 0.38, 0.38, 0.15, 0.15, 0.36, 0.15, 0.56,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.38, 0.38, 0.38, 0.38, 0.23, 0.30, 0.27, 0.38, 0.34, 0.49, 0.34, 0.34, 0.30,
        // {     |     }     ~
        0.23, 0.18, 0.23, 0.40,
    ],
    average_char_width: 0.35,
    space_width: 0.17,
    line_height: 1.48,
};

static JETBRAINS_MONO_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::JetbrainsMono,
    widths: [0.60; 95],
    average_char_width: 0.60,
    space_width: 0.60,
    line_height: 1.32,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Inter => &INTER_TABLE,
        FontFamily::Oswald => &OSWALD_TABLE,
        FontFamily::JetbrainsMono => &JETBRAINS_MONO_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_em_empty_returns_zero() {
        assert_eq!(get_metrics(FontFamily::Inter).measure_em(""), 0.0);
    }

    #[test]
    fn test_measure_em_clock_text() {
        // "12:34" = 4 × 0.56 + 0.28 = 2.52em
        let width = get_metrics(FontFamily::Inter).measure_em("12:34");
        assert!((width - 2.52).abs() < 1e-9, "got {width}");
    }

    #[test]
    fn test_measure_em_non_ascii_falls_back() {
        let metrics = get_metrics(FontFamily::Inter);
        assert!((metrics.measure_em("é") - metrics.average_char_width).abs() < 1e-9);
    }

    #[test]
    fn test_line_width_px_rounds_up() {
        let metrics = get_metrics(FontFamily::Inter);
        // 2.52 × 100 = 252 exactly, 2.52 × 83 = 209.16 → 210
        assert_eq!(metrics.line_width_px("12:34", 100), 252);
        assert_eq!(metrics.line_width_px("12:34", 83), 210);
    }

    #[test]
    fn test_block_height_px() {
        let metrics = get_metrics(FontFamily::Inter);
        assert_eq!(metrics.block_height_px(1, 82), 100); // 99.22
        assert_eq!(metrics.block_height_px(1, 83), 101); // 100.43
        assert_eq!(metrics.block_height_px(2, 10), 25); // 24.2
        assert_eq!(metrics.block_height_px(0, 50), 0);
    }

    #[test]
    fn test_wrap_lines_breaks_on_words() {
        let metrics = get_metrics(FontFamily::JetbrainsMono);
        // Each char is 6px at size 10. "aaaa bbbb" = 54px, limit 30 → two lines of 24px.
        let lines = metrics.wrap_lines("aaaa bbbb", 10, 30);
        assert_eq!(lines, vec![24, 24]);
    }

    #[test]
    fn test_wrap_lines_long_word_overflows() {
        let metrics = get_metrics(FontFamily::JetbrainsMono);
        let lines = metrics.wrap_lines("abcdefghij", 10, 30);
        assert_eq!(lines, vec![60]);
        assert!(metrics.wrap_lines("   ", 10, 30).is_empty());
    }

    #[test]
    fn test_condensed_font_narrower() {
        let text = "Keynote 09:30";
        let oswald = get_metrics(FontFamily::Oswald).measure_em(text);
        let inter = get_metrics(FontFamily::Inter).measure_em(text);
        assert!(oswald < inter);
    }

    #[test]
    fn test_font_family_serde_names() {
        let json = serde_json::to_string(&FontFamily::JetbrainsMono).unwrap();
        assert_eq!(json, "\"jetbrains-mono\"");
        let parsed: FontFamily = serde_json::from_str("\"oswald\"").unwrap();
        assert_eq!(parsed, FontFamily::Oswald);
    }
}
