use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fontdue::{Font, FontSettings};
use thiserror::Error;

use super::layout::TextMeasure;
use super::parse::{FontSlant, FontWeight, RunStyle};

#[derive(Debug, Error)]
pub enum FontError {
    #[error("reading font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing font {name}: {reason}")]
    Parse { name: String, reason: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

impl FontFace {
    pub fn for_style(style: &RunStyle) -> Self {
        match (style.weight, style.slant) {
            (FontWeight::Bold, _) => FontFace::Bold,
            (FontWeight::Normal, FontSlant::Italic) => FontFace::Italic,
            (FontWeight::Normal, FontSlant::Normal) => FontFace::Regular,
        }
    }
}

/// Coverage bitmap for one rasterized glyph, in device pixels.
#[derive(Clone)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub xmin: i32,
    pub ymin: i32,
    pub alpha: Arc<[u8]>,
}

impl GlyphBitmap {
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            xmin: 0,
            ymin: 0,
            alpha: Arc::<[u8]>::from([]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GlyphKey {
    face: FontFace,
    ch: char,
    px: u32,
}

/// Regular, bold, and italic faces plus a rasterized glyph cache. Faces that
/// are not supplied fall back to the regular face.
pub struct FontSet {
    regular: Font,
    bold: Option<Font>,
    italic: Option<Font>,
    glyphs: Mutex<HashMap<GlyphKey, GlyphBitmap>>,
}

impl FontSet {
    pub fn from_bytes(
        regular: &[u8],
        bold: Option<&[u8]>,
        italic: Option<&[u8]>,
    ) -> Result<Self, FontError> {
        Ok(Self {
            regular: parse_font("regular", regular)?,
            bold: bold.map(|bytes| parse_font("bold", bytes)).transpose()?,
            italic: italic.map(|bytes| parse_font("italic", bytes)).transpose()?,
            glyphs: Mutex::new(HashMap::new()),
        })
    }

    pub fn load(
        regular: &Path,
        bold: Option<&Path>,
        italic: Option<&Path>,
    ) -> Result<Self, FontError> {
        let regular_bytes = read_font(regular)?;
        let bold_bytes = bold.map(read_font).transpose()?;
        let italic_bytes = italic.map(read_font).transpose()?;
        log::debug!(
            "loaded fonts regular={} bold={:?} italic={:?}",
            regular.display(),
            bold.map(Path::display).map(|d| d.to_string()),
            italic.map(Path::display).map(|d| d.to_string())
        );
        Self::from_bytes(
            &regular_bytes,
            bold_bytes.as_deref(),
            italic_bytes.as_deref(),
        )
    }

    fn face(&self, face: FontFace) -> &Font {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontFace::Italic => self.italic.as_ref().unwrap_or(&self.regular),
        }
    }

    /// Characters the face has no outline for render as `?`.
    fn resolve_char(&self, face: FontFace, ch: char) -> char {
        let font = self.face(face);
        if ch == ' ' || font.lookup_glyph_index(ch) != 0 {
            ch
        } else {
            '?'
        }
    }

    pub fn char_advance(&self, style: &RunStyle, ch: char, px: f32) -> f32 {
        let face = FontFace::for_style(style);
        let resolved = self.resolve_char(face, ch);
        self.face(face).metrics(resolved, px).advance_width
    }

    pub fn glyph(&self, style: &RunStyle, ch: char, px: f32) -> GlyphBitmap {
        let face = FontFace::for_style(style);
        let resolved = self.resolve_char(face, ch);
        let key = GlyphKey {
            face,
            ch: resolved,
            px: px.round().max(1.0) as u32,
        };
        let mut cache = match self.glyphs.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(glyph) = cache.get(&key) {
            return glyph.clone();
        }

        let (metrics, bitmap) = self.face(face).rasterize(resolved, key.px as f32);
        let glyph = if metrics.width == 0 || metrics.height == 0 {
            GlyphBitmap::empty()
        } else {
            GlyphBitmap {
                width: metrics.width as u32,
                height: metrics.height as u32,
                xmin: metrics.xmin,
                ymin: metrics.ymin,
                alpha: Arc::from(bitmap.into_boxed_slice()),
            }
        };
        cache.insert(key, glyph.clone());
        glyph
    }
}

impl TextMeasure for FontSet {
    fn advance(&self, style: &RunStyle, text: &str) -> f32 {
        text.chars()
            .map(|ch| self.char_advance(style, ch, style.size))
            .sum()
    }
}

fn parse_font(name: &str, bytes: &[u8]) -> Result<Font, FontError> {
    Font::from_bytes(bytes, FontSettings::default()).map_err(|reason| FontError::Parse {
        name: name.to_string(),
        reason,
    })
}

fn read_font(path: &Path) -> Result<Vec<u8>, FontError> {
    fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })
}
