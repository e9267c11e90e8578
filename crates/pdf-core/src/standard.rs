//! Standard 14 font metrics and WinAnsi encoding
//!
//! Only Helvetica-Bold is carried. Widths are the Adobe AFM advance widths
//! in 1/1000 em, indexed by WinAnsi code.

/// A standard 14 font referenced by name (never embedded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    HelveticaBold,
}

/// Advance widths for codes 0x20..=0x7E
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    333, 333, 584, 584, 584, 611, 975, // : ; < = > ? @
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    333, 278, 333, 584, 556, 333, // [ \ ] ^ _ `
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a-m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n-z
    389, 280, 389, 584, // { | } ~
];

/// Advance widths for codes 0xA0..=0xFF
const HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // 0xF0
];

/// WinAnsi codes in 0x80..=0x9F that differ from Latin-1: (code, char, width)
const WIN_ANSI_SPECIALS: [(u8, char, u16); 27] = [
    (0x80, '\u{20AC}', 556),
    (0x82, '\u{201A}', 278),
    (0x83, '\u{0192}', 556),
    (0x84, '\u{201E}', 500),
    (0x85, '\u{2026}', 1000),
    (0x86, '\u{2020}', 556),
    (0x87, '\u{2021}', 556),
    (0x88, '\u{02C6}', 333),
    (0x89, '\u{2030}', 1000),
    (0x8A, '\u{0160}', 667),
    (0x8B, '\u{2039}', 333),
    (0x8C, '\u{0152}', 1000),
    (0x8E, '\u{017D}', 611),
    (0x91, '\u{2018}', 278),
    (0x92, '\u{2019}', 278),
    (0x93, '\u{201C}', 500),
    (0x94, '\u{201D}', 500),
    (0x95, '\u{2022}', 350),
    (0x96, '\u{2013}', 556),
    (0x97, '\u{2014}', 1000),
    (0x98, '\u{02DC}', 333),
    (0x99, '\u{2122}', 1000),
    (0x9A, '\u{0161}', 556),
    (0x9B, '\u{203A}', 333),
    (0x9C, '\u{0153}', 944),
    (0x9E, '\u{017E}', 500),
    (0x9F, '\u{0178}', 667),
];

impl StandardFont {
    /// PostScript name used as `/BaseFont`
    pub fn base_name(self) -> &'static str {
        match self {
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// AFM metrics are expressed in 1/1000 em
    pub fn units_per_em(self) -> u16 {
        1000
    }

    /// Map a character to its WinAnsi code, if it has one
    pub fn win_ansi_code(c: char) -> Option<u8> {
        let cp = c as u32;
        match cp {
            0x20..=0x7E | 0xA0..=0xFF => Some(cp as u8),
            _ => WIN_ANSI_SPECIALS
                .iter()
                .find(|(_, ch, _)| *ch == c)
                .map(|(code, _, _)| *code),
        }
    }

    /// Advance width of a WinAnsi code in font units
    pub fn code_advance(self, code: u8) -> Option<u16> {
        match self {
            StandardFont::HelveticaBold => match code {
                0x20..=0x7E => Some(HELVETICA_BOLD_ASCII[(code - 0x20) as usize]),
                0xA0..=0xFF => Some(HELVETICA_BOLD_LATIN1[(code - 0xA0) as usize]),
                _ => WIN_ANSI_SPECIALS
                    .iter()
                    .find(|(c, _, _)| *c == code)
                    .map(|(_, _, w)| *w),
            },
        }
    }

    /// Advance width of a character in font units
    pub fn char_advance(self, c: char) -> Option<u16> {
        Self::win_ansi_code(c).and_then(|code| self.code_advance(code))
    }
}
