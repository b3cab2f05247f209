//! Core of the floating product card: the markdown quick-guide texture, the
//! rounded card solid and its cache, the rubber-band spring, and the scene
//! that composes them for a renderer.

pub mod geometry;
pub mod markdown;
pub mod mesh;
pub mod rubber_band;
pub mod scene;

pub use geometry::{GeometryCache, build_rounded_card, cached_card_geometry, rounded_rect_contour};
pub use markdown::{
    FontSet, MAX_TEXTURE_SIDE, MarkdownLayout, MarkdownPage, MarkdownTexture, MarkdownTextureCache,
    RasterSurface, TextMeasure, layout_markdown, render_markdown_texture,
};
pub use mesh::{MeshPrimitive, MeshVertex, PlaneVertex};
pub use rubber_band::{BandRig, BandSegment, RubberBand, RubberBandPhase, SpringState};
pub use scene::{CardParams, FloatingCard, FrameSnapshot, OrbitCamera};
