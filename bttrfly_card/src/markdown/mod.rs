//! Markdown quick-guide to texture. `parse` classifies lines, `layout` places
//! runs with greedy word wrap, `font` measures and rasterizes glyphs with
//! fontdue, and `raster` paints the page into an RGBA surface.

mod font;
mod layout;
mod parse;
mod raster;

pub use font::{FontError, FontFace, FontSet, GlyphBitmap};
pub use layout::{
    BODY_FONT_SIZE, FixedAdvance, LayoutLine, MarkdownLayout, MarkdownPage, PlacedRun,
    TextMeasure, layout_markdown,
};
pub use parse::{
    CHECKED_GLYPH, FontSlant, FontWeight, MarkdownLine, RunKind, RunStyle, TextRun,
    UNCHECKED_GLYPH, parse_inline, parse_line,
};
pub use raster::{
    DEVICE_SCALE, MAX_SURFACE_SIDE, MAX_TEXTURE_SIDE, MarkdownTexture, MarkdownTextureCache,
    RasterSurface, render_markdown_texture,
};

/// Quick guide shown on the card when no preset overrides it.
pub const DEFAULT_QUICK_GUIDE: &str = "# Quick Guide for Bttrfly 🦋

## Bttrfly is a local‑first Markdown notebook.

#### Get started
- [ ] **New note:** Press ⌘N or click the **＋** button
- [ ] **Write freely:** Every keystroke is auto‑saved
- [ ] **Already using Obsidian?** Add that folder to the **'Search Panel'**
- [ ] **Quick switch:** Press ⌘P to find any note instantly
- [ ] **Settings:** Press ⌘, to customize the app

### Now, hit ⌘N or ⌘P to start journey!";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_guide_lays_out_every_item() {
        let page = layout_markdown(
            DEFAULT_QUICK_GUIDE,
            &MarkdownLayout::default(),
            &FixedAdvance::new(9.0),
        );
        let checkboxes = page.runs().filter(|placed| placed.run.is_checkbox()).count();
        assert_eq!(checkboxes, 5);
        assert_eq!(page.lines[0].text(), "Quick Guide for Bttrfly 🦋");
        assert!(page.cursor_y < 650.0, "guide overflows: {}", page.cursor_y);
    }
}
