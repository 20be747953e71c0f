//! Font-backed implementation of [`TextMeasure`] over the system font
//! database. Falls back to a per-character width heuristic when no matching
//! face can be loaded, so headless environments still lay out sensibly.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use ttf_parser::Face;

use crate::ir::{FontRole, TextMeasure};

static FONT_DB: Lazy<Mutex<Database>> = Lazy::new(|| {
    let mut db = Database::new();
    db.load_system_fonts();
    Mutex::new(db)
});

/// Width of a glyph with no advance data, as a fraction of the font size.
const FALLBACK_ADVANCE: f64 = 0.56;
const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Font size of the combo name line relative to the base size.
const NAME_SIZE_FACTOR: f64 = 0.6;
/// Font size of the output text relative to the base size.
const OUTPUT_SIZE_FACTOR: f64 = 0.7;

/// Text measurer bound to one font family and base size. Loading happens
/// once at construction; measurement is pure afterwards.
pub struct FontMetrics {
    base_size: f64,
    face: Option<LoadedFace>,
    signature: u64,
}

impl FontMetrics {
    pub fn load(font_family: &str, base_size: f64) -> Self {
        let face = load_face(font_family);
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        font_family.hash(&mut hasher);
        base_size.to_bits().hash(&mut hasher);
        if let Some(face) = &face {
            face.units_per_em.hash(&mut hasher);
        }
        Self {
            base_size,
            face,
            signature: hasher.finish(),
        }
    }

    fn font_size(&self, role: FontRole) -> f64 {
        match role {
            FontRole::ComboName => self.base_size * NAME_SIZE_FACTOR,
            FontRole::OutputLabel => self.base_size * OUTPUT_SIZE_FACTOR,
        }
    }
}

impl TextMeasure for FontMetrics {
    fn measure(&self, text: &str, role: FontRole) -> (f64, f64) {
        let size = self.font_size(role);
        let width = match &self.face {
            Some(face) => face.line_width(text, size),
            None => text.chars().filter(|c| *c != '\n').count() as f64 * size * FALLBACK_ADVANCE,
        };
        (width, size * LINE_HEIGHT_FACTOR)
    }

    fn line_height(&self, role: FontRole) -> f64 {
        self.font_size(role) * LINE_HEIGHT_FACTOR
    }

    fn signature(&self) -> u64 {
        self.signature
    }
}

struct LoadedFace {
    // Backing buffer for the transmuted face below; must outlive it.
    _data: Vec<u8>,
    face: Face<'static>,
    units_per_em: u16,
    ascii_advances: [u16; 128],
}

impl LoadedFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let parsed = Face::parse(&data, index).ok()?;
        let units_per_em = parsed.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = parsed.glyph_index(byte as char) {
                ascii_advances[byte as usize] = parsed.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        let face = unsafe { std::mem::transmute::<Face<'_>, Face<'static>>(parsed) };
        Some(Self {
            _data: data,
            face,
            units_per_em,
            ascii_advances,
        })
    }

    fn line_width(&self, text: &str, font_size: f64) -> f64 {
        let scale = font_size / self.units_per_em as f64;
        let fallback = font_size * FALLBACK_ADVANCE;
        let mut width = 0.0;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                self.ascii_advances[ch as usize]
            } else {
                self.face
                    .glyph_index(ch)
                    .and_then(|glyph| self.face.glyph_hor_advance(glyph))
                    .unwrap_or(0)
            };
            if advance == 0 {
                width += fallback;
            } else {
                width += advance as f64 * scale;
            }
        }
        width
    }
}

fn load_face(font_family: &str) -> Option<LoadedFace> {
    let mut names: Vec<String> = Vec::new();
    let mut generics: Vec<Option<Family<'static>>> = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        match raw.to_ascii_lowercase().as_str() {
            "serif" => generics.push(Some(Family::Serif)),
            "sans-serif" | "system-ui" => generics.push(Some(Family::SansSerif)),
            "monospace" | "ui-monospace" => generics.push(Some(Family::Monospace)),
            _ => {
                names.push(raw.to_string());
                generics.push(None);
            }
        }
    }

    let mut name_iter = names.iter();
    let mut families: Vec<Family<'_>> = generics
        .into_iter()
        .map(|generic| match generic {
            Some(family) => family,
            None => Family::Name(name_iter.next().map(String::as_str).unwrap_or("")),
        })
        .collect();
    if families.is_empty() {
        families.push(Family::SansSerif);
    }

    let db = FONT_DB.lock().ok()?;
    let query = Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = db.query(&query)?;
    let mut loaded = None;
    db.with_face_data(id, |data, index| {
        loaded = LoadedFace::new(data.to_vec(), index);
    });
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_use_different_sizes() {
        let metrics = FontMetrics::load("sans-serif", 12.0);
        assert!(metrics.line_height(FontRole::OutputLabel) > metrics.line_height(FontRole::ComboName));
    }

    #[test]
    fn wider_text_measures_wider() {
        let metrics = FontMetrics::load("sans-serif", 12.0);
        let (short, _) = metrics.measure("ab", FontRole::ComboName);
        let (long, _) = metrics.measure("abcdef", FontRole::ComboName);
        assert!(long > short);
        let (empty, height) = metrics.measure("", FontRole::ComboName);
        assert_eq!(empty, 0.0);
        assert!(height > 0.0);
    }

    #[test]
    fn signature_is_stable_and_input_sensitive() {
        let a = FontMetrics::load("sans-serif", 12.0);
        let b = FontMetrics::load("sans-serif", 12.0);
        let c = FontMetrics::load("sans-serif", 14.0);
        assert_eq!(a.signature(), b.signature());
        assert_ne!(a.signature(), c.signature());
    }
}
