use std::collections::HashMap;
use std::sync::Arc;

use super::font::{FontSet, GlyphBitmap};
use super::layout::{MarkdownLayout, MarkdownPage, layout_markdown};

/// Card textures are painted at twice their logical size.
pub const DEVICE_SCALE: u32 = 2;

/// Largest surface side in device pixels, wgpu's default 2D texture limit.
pub const MAX_SURFACE_SIDE: u32 = 8192;

/// Largest logical texture side that survives `DEVICE_SCALE` unclamped.
pub const MAX_TEXTURE_SIDE: u32 = MAX_SURFACE_SIDE / DEVICE_SCALE;

/// Mutable RGBA8 canvas for one paint pass. Starts fully transparent.
pub struct RasterSurface {
    width: u32,
    height: u32,
    scale: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    const TEXT_COLOR: [u8; 3] = [255, 255, 255];

    /// Device sizes are clamped to `MAX_SURFACE_SIDE`; runs past the edge
    /// are clipped.
    pub fn new(logical_width: u32, logical_height: u32, scale: u32) -> Self {
        let scale = scale.max(1);
        let width = logical_width.max(1).saturating_mul(scale).min(MAX_SURFACE_SIDE);
        let height = logical_height.max(1).saturating_mul(scale).min(MAX_SURFACE_SIDE);
        if width == MAX_SURFACE_SIDE || height == MAX_SURFACE_SIDE {
            log::warn!(
                "raster surface {logical_width}x{logical_height} at scale {scale} clamped to {width}x{height}"
            );
        }
        Self {
            width,
            height,
            scale,
            pixels: vec![0u8; width as usize * height as usize * 4],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Paint every placed run. Positions are logical; glyphs are rasterized
    /// at `size × scale` so the texture stays sharp.
    pub fn paint_page(&mut self, page: &MarkdownPage, fonts: &FontSet) {
        let scale = self.scale as f32;
        for line in &page.lines {
            for placed in &line.runs {
                let style = placed.run.style;
                let px = style.size * scale;
                let mut pen_x = placed.x;
                for ch in placed.run.content.chars() {
                    let glyph = fonts.glyph(&style, ch, px);
                    let origin_x = (pen_x * scale).round() as i32;
                    let baseline = (line.baseline * scale).round() as i32;
                    self.blit_glyph(origin_x, baseline, &glyph);
                    pen_x += fonts.char_advance(&style, ch, style.size);
                }
            }
        }
    }

    /// Source-over blend of white coverage onto the surface. `baseline` is the
    /// glyph baseline in device pixels.
    pub fn blit_glyph(&mut self, origin_x: i32, baseline: i32, glyph: &GlyphBitmap) {
        if glyph.width == 0 || glyph.height == 0 {
            return;
        }

        let start_x = origin_x + glyph.xmin;
        let glyph_ymax = glyph.ymin + glyph.height as i32;
        let start_y = baseline - glyph_ymax;

        for gy in 0..glyph.height {
            let dest_y = start_y + gy as i32;
            if dest_y < 0 || dest_y >= self.height as i32 {
                continue;
            }
            let row = gy as usize * glyph.width as usize;
            for gx in 0..glyph.width {
                let coverage = glyph.alpha[row + gx as usize];
                if coverage == 0 {
                    continue;
                }
                let dest_x = start_x + gx as i32;
                if dest_x < 0 || dest_x >= self.width as i32 {
                    continue;
                }
                let idx = ((dest_y as u32 * self.width + dest_x as u32) * 4) as usize;
                blend_over(
                    &mut self.pixels[idx..idx + 4],
                    Self::TEXT_COLOR,
                    coverage,
                );
            }
        }
    }

    /// Freeze the surface into a texture snapshot.
    pub fn finish(self) -> MarkdownTexture {
        MarkdownTexture {
            width: self.width,
            height: self.height,
            pixels: Arc::from(self.pixels.into_boxed_slice()),
        }
    }
}

fn blend_over(dest: &mut [u8], color: [u8; 3], coverage: u8) {
    let src_a = coverage as f32 / 255.0;
    let dst_a = dest[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }
    for channel in 0..3 {
        let src = color[channel] as f32;
        let dst = dest[channel] as f32;
        let value = (src * src_a + dst * dst_a * (1.0 - src_a)) / out_a;
        dest[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    dest[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Immutable RGBA8 pixels ready for upload.
#[derive(Debug, Clone)]
pub struct MarkdownTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

impl MarkdownTexture {
    pub fn opaque_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }
}

/// Lay out and paint `source` into a `width × height` logical texture.
pub fn render_markdown_texture(
    source: &str,
    width: u32,
    height: u32,
    fonts: &FontSet,
) -> MarkdownTexture {
    let layout = MarkdownLayout::new(width as f32, height as f32);
    let page = layout_markdown(source, &layout, fonts);
    let mut surface = RasterSurface::new(width, height, DEVICE_SCALE);
    surface.paint_page(&page, fonts);
    log::debug!(
        "painted markdown texture {}x{} ({} lines)",
        surface.width,
        surface.height,
        page.lines.len()
    );
    surface.finish()
}

/// Memoizes rendered textures by content and size.
#[derive(Default)]
pub struct MarkdownTextureCache {
    entries: HashMap<(String, u32, u32), Arc<MarkdownTexture>>,
}

impl MarkdownTextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_render(
        &mut self,
        source: &str,
        width: u32,
        height: u32,
        fonts: &FontSet,
    ) -> Arc<MarkdownTexture> {
        self.entries
            .entry((source.to_string(), width, height))
            .or_insert_with(|| Arc::new(render_markdown_texture(source, width, height, fonts)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
