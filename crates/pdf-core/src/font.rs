//! Font handling for PDF documents

use crate::standard::StandardFont;
use crate::{PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeSet, HashMap};

/// The single typeface a document draws with
///
/// Typefaces are immutable once loaded, so one instance can be shared across
/// threads behind an `Arc` and used by any number of documents.
#[derive(Debug, Clone)]
pub enum Typeface {
    /// A standard 14 font, referenced by name with WinAnsi encoding
    Standard(StandardFont),
    /// A TrueType program embedded whole with Identity-H encoding
    TrueType(FontData),
}

impl Typeface {
    /// The default face: Helvetica-Bold
    pub fn helvetica_bold() -> Self {
        Typeface::Standard(StandardFont::HelveticaBold)
    }

    /// Load a TrueType program
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        FontData::from_ttf(name, ttf_data).map(Typeface::TrueType)
    }

    /// Name written as `/BaseFont`
    pub fn base_name(&self) -> &str {
        match self {
            Typeface::Standard(font) => font.base_name(),
            Typeface::TrueType(font) => &font.name,
        }
    }

    /// Font units per em
    pub fn units_per_em(&self) -> u16 {
        match self {
            Typeface::Standard(font) => font.units_per_em(),
            Typeface::TrueType(font) => font.units_per_em,
        }
    }

    /// Advance width of a character in font units
    pub fn char_advance(&self, c: char) -> Option<u16> {
        match self {
            Typeface::Standard(font) => font.char_advance(c),
            Typeface::TrueType(font) => font.glyph(c).map(|g| g.advance),
        }
    }

    /// Check that every character of `text` can be drawn
    pub fn check_encodable(&self, text: &str) -> Result<()> {
        match text.chars().find(|&c| self.char_advance(c).is_none()) {
            Some(ch) => Err(PdfError::UnencodableChar {
                ch,
                font: self.base_name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> Result<u32> {
        text.chars().try_fold(0u32, |acc, c| {
            let advance = self.char_advance(c).ok_or_else(|| PdfError::UnencodableChar {
                ch: c,
                font: self.base_name().to_string(),
            })?;
            Ok(acc + advance as u32)
        })
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> Result<f64> {
        let width = self.text_width(text)? as f64;
        Ok(width / self.units_per_em() as f64 * font_size as f64)
    }

    /// Encode text as a hex string operand for the `Tj` operator
    pub fn encode_text_hex(&self, text: &str) -> Result<String> {
        self.check_encodable(text)?;

        let mut hex = String::with_capacity(text.len() * 4 + 2);
        hex.push('<');
        for c in text.chars() {
            match self {
                Typeface::Standard(_) => {
                    // check_encodable guarantees a code
                    let code = StandardFont::win_ansi_code(c).unwrap_or(b'?');
                    hex.push_str(&format!("{code:02X}"));
                }
                Typeface::TrueType(font) => {
                    let gid = font.glyph(c).map(|g| g.gid).unwrap_or(0);
                    hex.push_str(&format!("{gid:04X}"));
                }
            }
        }
        hex.push('>');
        Ok(hex)
    }

    /// Add the font objects to `doc` and return the font dictionary id
    ///
    /// `used_chars` drives the `/W` array and `ToUnicode` CMap of embedded
    /// TrueType fonts; standard fonts ignore it.
    pub(crate) fn embed(&self, doc: &mut Document, used_chars: &BTreeSet<char>) -> ObjectId {
        match self {
            Typeface::Standard(font) => doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Font".to_vec())),
                ("Subtype", Object::Name(b"Type1".to_vec())),
                ("BaseFont", Object::Name(font.base_name().as_bytes().to_vec())),
                ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
            ])),
            Typeface::TrueType(font) => font.embed(doc, used_chars),
        }
    }
}

/// Glyph id and advance for one mapped character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub gid: u16,
    pub advance: u16,
}

/// Parsed TrueType program
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Unicode cmap resolved to glyph metrics
    glyphs: HashMap<char, GlyphMetrics>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    bbox: [i16; 4],
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// The unicode cmap subtables are walked once here, so no parsed face is
    /// kept alive and the result owns all of its data.
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| {
                    let (Some(ch), Some(gid)) = (char::from_u32(cp), subtable.glyph_index(cp))
                    else {
                        return;
                    };
                    if gid.0 == 0 {
                        return;
                    }
                    let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                    glyphs.entry(ch).or_insert(GlyphMetrics {
                        gid: gid.0,
                        advance,
                    });
                });
            }
        }

        let rect = face.global_bounding_box();

        Ok(Self {
            name: name.to_string(),
            ttf_data: ttf_data.to_vec(),
            glyphs,
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            bbox: [rect.x_min, rect.y_min, rect.x_max, rect.y_max],
        })
    }

    /// Glyph metrics for a character, if the font maps it
    pub fn glyph(&self, c: char) -> Option<GlyphMetrics> {
        self.glyphs.get(&c).copied()
    }

    /// Embed as Type0 / CIDFontType2 and return the Type0 font id
    fn embed(&self, doc: &mut Document, used_chars: &BTreeSet<char>) -> ObjectId {
        let font_name = Object::Name(self.name.clone().into_bytes());

        let font_file_id = doc.add_object(Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.clone(),
        ));

        let font_descriptor_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()),
            (
                "FontBBox",
                Object::Array(self.bbox.iter().map(|&v| (v as i64).into()).collect()),
            ),
            ("ItalicAngle", 0.into()),
            ("Ascent", (self.ascender as i64).into()),
            ("Descent", (self.descender as i64).into()),
            ("CapHeight", (self.ascender as i64).into()),
            ("StemV", 80.into()),
            ("FontFile2", Object::Reference(font_file_id)),
        ]));

        let cid_font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("BaseFont", font_name.clone()),
            (
                "CIDSystemInfo",
                Object::Dictionary(Dictionary::from_iter(vec![
                    ("Registry", Object::string_literal("Adobe")),
                    ("Ordering", Object::string_literal("Identity")),
                    ("Supplement", 0.into()),
                ])),
            ),
            ("FontDescriptor", Object::Reference(font_descriptor_id)),
            ("W", Object::Array(self.widths_array(used_chars))),
            ("DW", 1000.into()),
        ]));

        let cmap = self.tounicode_cmap(used_chars);
        let tounicode_id = doc.add_object(Stream::new(Dictionary::new(), cmap.into_bytes()));

        doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type0".to_vec())),
            ("BaseFont", font_name),
            ("Encoding", Object::Name(b"Identity-H".to_vec())),
            (
                "DescendantFonts",
                Object::Array(vec![Object::Reference(cid_font_id)]),
            ),
            ("ToUnicode", Object::Reference(tounicode_id)),
        ]))
    }

    /// `/W` array in individual form: `[gid [width] gid [width] ...]`
    ///
    /// Widths are scaled to the 1000-unit glyph space PDF expects.
    fn widths_array(&self, used_chars: &BTreeSet<char>) -> Vec<Object> {
        let mut glyphs: Vec<GlyphMetrics> =
            used_chars.iter().filter_map(|&c| self.glyph(c)).collect();
        glyphs.sort_by_key(|g| g.gid);
        glyphs.dedup_by_key(|g| g.gid);

        let scale = 1000.0 / self.units_per_em.max(1) as f64;
        let mut widths = Vec::with_capacity(glyphs.len() * 2);
        for glyph in glyphs {
            widths.push((glyph.gid as i64).into());
            let width = (glyph.advance as f64 * scale).round() as i64;
            widths.push(Object::Array(vec![width.into()]));
        }
        widths
    }

    fn tounicode_cmap(&self, used_chars: &BTreeSet<char>) -> String {
        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        let mapped: Vec<(u16, char)> = used_chars
            .iter()
            .filter_map(|&c| self.glyph(c).map(|g| (g.gid, c)))
            .collect();

        // bfchar sections are limited to 100 entries
        for chunk in mapped.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut units = [0u16; 2];
                let hex: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{hex}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\nend\n");
        cmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build font data directly, without a font file
    fn test_font() -> FontData {
        let glyphs = HashMap::from([
            ('A', GlyphMetrics { gid: 36, advance: 1366 }),
            ('B', GlyphMetrics { gid: 37, advance: 1366 }),
            ('ส', GlyphMetrics { gid: 120, advance: 1024 }),
        ]);
        FontData {
            name: "TestSans".to_string(),
            ttf_data: vec![0u8; 16],
            glyphs,
            units_per_em: 2048,
            ascender: 1900,
            descender: -500,
            bbox: [0, -500, 2048, 1900],
        }
    }

    #[test]
    fn test_from_ttf_rejects_garbage() {
        let result = FontData::from_ttf("broken", &[0u8; 100]);
        assert!(matches!(result, Err(PdfError::FontParseError(_))));
    }

    #[test]
    fn test_helvetica_bold_width_points() {
        let face = Typeface::helvetica_bold();
        // A(722) a(556) r(389) a(556) v(556) space(278) P(667) a(556) t(333) e(556) l(278)
        assert_eq!(face.text_width("Aarav Patel").unwrap(), 5447);
        let width = face.text_width_points("Aarav Patel", 32.0).unwrap();
        assert!((width - 174.304).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_has_zero_width() {
        let face = Typeface::helvetica_bold();
        assert_eq!(face.text_width_points("", 48.0).unwrap(), 0.0);
        assert_eq!(face.encode_text_hex("").unwrap(), "<>");
    }

    #[test]
    fn test_standard_encoding_is_win_ansi_hex() {
        let face = Typeface::helvetica_bold();
        assert_eq!(face.encode_text_hex("Hi").unwrap(), "<4869>");
        assert_eq!(face.encode_text_hex("é€").unwrap(), "<E980>");
    }

    #[test]
    fn test_standard_rejects_unencodable() {
        let face = Typeface::helvetica_bold();
        let err = face.encode_text_hex("Aก").unwrap_err();
        assert!(matches!(err, PdfError::UnencodableChar { ch: 'ก', .. }));
        assert!(face.text_width_points("日本", 12.0).is_err());
    }

    #[test]
    fn test_truetype_width_uses_units_per_em() {
        let face = Typeface::TrueType(test_font());
        let width = face.text_width_points("AB", 10.0).unwrap();
        assert!((width - 2.0 * 1366.0 / 2048.0 * 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_truetype_encodes_glyph_ids() {
        let face = Typeface::TrueType(test_font());
        assert_eq!(face.encode_text_hex("AสB").unwrap(), "<002400780025>");
        assert!(face.encode_text_hex("Z").is_err());
    }

    #[test]
    fn test_widths_array_scaled_to_thousand() {
        let font = test_font();
        let used = BTreeSet::from(['B', 'A', 'Z']);
        let widths = font.widths_array(&used);

        // Z is unmapped and skipped; A and B sorted by gid
        assert_eq!(widths.len(), 4);
        assert_eq!(widths[0].as_i64().unwrap(), 36);
        assert_eq!(widths[1].as_array().unwrap()[0].as_i64().unwrap(), 667);
        assert_eq!(widths[2].as_i64().unwrap(), 37);
    }

    #[test]
    fn test_tounicode_cmap_maps_gids() {
        let font = test_font();
        let cmap = font.tounicode_cmap(&BTreeSet::from(['A', 'ส']));

        assert!(cmap.contains("begincmap"));
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0024> <0041>"));
        assert!(cmap.contains("<0078> <0E2A>"));
        assert!(cmap.contains("endcmap"));
    }

    #[test]
    fn test_embed_standard_font_dictionary() {
        let mut doc = Document::with_version("1.5");
        let id = Typeface::helvetica_bold().embed(&mut doc, &BTreeSet::new());
        let dict = doc.get_object(id).unwrap().as_dict().unwrap();

        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Type1");
        assert_eq!(
            dict.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"Helvetica-Bold"
        );
        assert_eq!(
            dict.get(b"Encoding").unwrap().as_name().unwrap(),
            b"WinAnsiEncoding"
        );
    }

    #[test]
    fn test_embed_truetype_links_descendant() {
        let mut doc = Document::with_version("1.5");
        let id = Typeface::TrueType(test_font()).embed(&mut doc, &BTreeSet::from(['A']));
        let type0 = doc.get_object(id).unwrap().as_dict().unwrap();

        assert_eq!(type0.get(b"Subtype").unwrap().as_name().unwrap(), b"Type0");
        let descendants = type0.get(b"DescendantFonts").unwrap().as_array().unwrap();
        let cid_id = descendants[0].as_reference().unwrap();
        let cid = doc.get_object(cid_id).unwrap().as_dict().unwrap();
        assert_eq!(
            cid.get(b"Subtype").unwrap().as_name().unwrap(),
            b"CIDFontType2"
        );
    }

    #[test]
    fn test_typeface_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Typeface>();
    }
}
