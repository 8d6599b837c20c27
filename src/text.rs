use crate::geometry::Point;
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use anyhow::Context;
use std::path::Path;

/// Advance of an average glyph relative to the pixel size, used when no
/// font is loaded.
pub const APPROX_CHAR_WIDTH: f32 = 0.6;

pub trait TextMeasure {
    /// Horizontal extent of `text` at `size` pixels.
    fn measure_text(&self, text: &str, size: f32) -> f32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn measure_text(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * APPROX_CHAR_WIDTH
    }
}

#[derive(Clone)]
pub struct FontMeasure {
    font: FontArc,
}

impl FontMeasure {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading font {}", path.display()))?;
        let font = FontArc::try_from_vec(bytes)
            .with_context(|| format!("parsing font {}", path.display()))?;
        log::info!("Loaded font from {}", path.display());
        Ok(Self::new(font))
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Walks the glyphs of `text` laid out with the top of the line at
    /// `origin`, reporting every covered pixel as `(x, y, coverage)`.
    pub fn rasterize(&self, text: &str, origin: Point, size: f32, mut plot: impl FnMut(f32, f32, f32)) {
        let scale = PxScale::from(size);
        let scaled = self.font.as_scaled(scale);
        let baseline = origin[1] + scaled.ascent();
        let mut pen_x = origin[0];
        let mut prev_gid: Option<GlyphId> = None;

        for ch in text.chars() {
            let gid = self.font.glyph_id(ch);
            if let Some(prev) = prev_gid {
                pen_x += scaled.kern(prev, gid);
            }

            let glyph = gid.with_scale_and_position(scale, point(pen_x, baseline));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    plot(bounds.min.x + gx as f32, bounds.min.y + gy as f32, coverage);
                });
            }

            pen_x += scaled.h_advance(gid);
            prev_gid = Some(gid);
        }
    }
}

impl TextMeasure for FontMeasure {
    fn measure_text(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut prev_gid: Option<GlyphId> = None;
        for ch in text.chars() {
            let gid = self.font.glyph_id(ch);
            if let Some(prev) = prev_gid {
                width += scaled.kern(prev, gid);
            }
            width += scaled.h_advance(gid);
            prev_gid = Some(gid);
        }
        width
    }
}

/// Loads the configured font, falling back to approximate metrics.
pub fn measure_from_config(font_path: Option<&Path>) -> (Box<dyn TextMeasure>, Option<FontMeasure>) {
    match font_path.map(FontMeasure::from_file) {
        Some(Ok(font)) => (Box::new(font.clone()), Some(font)),
        Some(Err(err)) => {
            log::warn!("{err:#}; using approximate text metrics");
            (Box::new(ApproxMeasure), None)
        }
        None => {
            log::debug!("No font configured; using approximate text metrics");
            (Box::new(ApproxMeasure), None)
        }
    }
}
