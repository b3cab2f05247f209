use std::{
    borrow::Cow,
    fs::{self, File},
    path::Path,
};

use anyhow::{Context, Result, ensure};
use bttrfly_card::MarkdownTexture;
use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};

#[derive(Debug, Clone)]
pub struct TextureStats {
    pub min_luma: u8,
    pub max_luma: u8,
    pub mean_luma: f32,
    pub opaque_pixels: u32,
    pub total_pixels: u32,
    pub quadrant_means: [f32; 4],
}

pub struct TextureUpload<'a> {
    data: Cow<'a, [u8]>,
    bytes_per_row: u32,
}

impl TextureUpload<'_> {
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.bytes_per_row
    }
}

/// Pad RGBA rows to wgpu's copy alignment when needed. Already aligned
/// buffers are borrowed as-is.
pub fn prepare_rgba_upload(width: u32, height: u32, data: &[u8]) -> Result<TextureUpload<'_>> {
    ensure!(width > 0 && height > 0, "texture has no dimensions");
    let row_bytes = 4usize * width as usize;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    ensure!(
        data.len() >= row_bytes * height as usize,
        "texture buffer ({}) smaller than {}x{} RGBA ({})",
        data.len(),
        width,
        height,
        row_bytes * height as usize
    );

    if row_bytes % alignment == 0 && data.len() == row_bytes * height as usize {
        return Ok(TextureUpload {
            data: Cow::Borrowed(data),
            bytes_per_row: row_bytes as u32,
        });
    }

    let padded_row_bytes = row_bytes.div_ceil(alignment) * alignment;
    let mut buffer = vec![0u8; padded_row_bytes * height as usize];
    for row in 0..height as usize {
        let src_offset = row * row_bytes;
        let dst_offset = row * padded_row_bytes;
        buffer[dst_offset..dst_offset + row_bytes]
            .copy_from_slice(&data[src_offset..src_offset + row_bytes]);
    }

    Ok(TextureUpload {
        data: Cow::Owned(buffer),
        bytes_per_row: padded_row_bytes as u32,
    })
}

pub fn dump_texture_to_png(texture: &MarkdownTexture, destination: &Path) -> Result<TextureStats> {
    if let Some(parent) = destination.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }

    export_rgba_to_png(destination, texture.width, texture.height, &texture.pixels)?;
    Ok(compute_texture_stats(
        texture.width,
        texture.height,
        &texture.pixels,
    ))
}

fn export_rgba_to_png(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let encoder = PngEncoder::new(file);
    encoder
        .write_image(data, width, height, ColorType::Rgba8.into())
        .with_context(|| format!("writing PNG to {}", path.display()))?;
    Ok(())
}

/// Luma is weighted by alpha so transparent texels count as black; the card
/// text is white on a clear background.
pub fn compute_texture_stats(width: u32, height: u32, data: &[u8]) -> TextureStats {
    let mut min_luma = u8::MAX;
    let mut max_luma = u8::MIN;
    let mut sum_luma = 0u64;
    let mut opaque_pixels = 0u32;
    let mut quadrant_sums = [0u64; 4];
    let mut quadrant_counts = [0u32; 4];

    for y in 0..height as usize {
        for x in 0..width as usize {
            let idx = (y * width as usize + x) * 4;
            let pixel = data.get(idx..idx + 4).unwrap_or(&[0, 0, 0, 0]);
            let (r, g, b, a) = (pixel[0], pixel[1], pixel[2], pixel[3]);
            let coverage = a as f32 / 255.0;
            let luma = ((0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32) * coverage)
                .round() as u8;
            min_luma = min_luma.min(luma);
            max_luma = max_luma.max(luma);
            sum_luma += luma as u64;
            if a > 0 {
                opaque_pixels += 1;
            }
            let quadrant =
                (y >= height as usize / 2) as usize * 2 + (x >= width as usize / 2) as usize;
            quadrant_sums[quadrant] += luma as u64;
            quadrant_counts[quadrant] += 1;
        }
    }

    let total_pixels = width * height;
    let mean_luma = if total_pixels == 0 {
        0.0
    } else {
        sum_luma as f32 / total_pixels as f32
    };
    let mut quadrant_means = [0.0f32; 4];
    for (mean, (sum, count)) in quadrant_means
        .iter_mut()
        .zip(quadrant_sums.iter().zip(quadrant_counts.iter()))
    {
        *mean = if *count == 0 {
            0.0
        } else {
            *sum as f32 / *count as f32
        };
    }

    TextureStats {
        min_luma,
        max_luma,
        mean_luma,
        opaque_pixels,
        total_pixels,
        quadrant_means,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn texture(width: u32, height: u32, pixels: Vec<u8>) -> MarkdownTexture {
        MarkdownTexture {
            width,
            height,
            pixels: Arc::from(pixels.into_boxed_slice()),
        }
    }

    #[test]
    fn aligned_rows_are_borrowed() {
        let data = vec![7u8; 64 * 4 * 2];
        let upload = prepare_rgba_upload(64, 2, &data).expect("aligned upload");
        assert_eq!(upload.bytes_per_row(), 256);
        assert!(matches!(upload.data, Cow::Borrowed(_)));
    }

    #[test]
    fn narrow_rows_are_padded() {
        let data: Vec<u8> = (0..3 * 4 * 2).map(|value| value as u8).collect();
        let upload = prepare_rgba_upload(3, 2, &data).expect("padded upload");
        assert_eq!(upload.bytes_per_row(), 256);
        assert_eq!(&upload.pixels()[..12], &data[..12]);
        assert_eq!(&upload.pixels()[256..268], &data[12..24]);
        assert!(upload.pixels()[12..256].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(prepare_rgba_upload(4, 4, &[0u8; 10]).is_err());
        assert!(prepare_rgba_upload(0, 4, &[]).is_err());
    }

    #[test]
    fn stats_weight_luma_by_alpha() {
        // white opaque, white half, clear, clear
        let pixels = vec![
            255, 255, 255, 255, 255, 255, 255, 128, 255, 255, 255, 0, 0, 0, 0, 0,
        ];
        let stats = compute_texture_stats(2, 2, &pixels);
        assert_eq!(stats.max_luma, 255);
        assert_eq!(stats.min_luma, 0);
        assert_eq!(stats.opaque_pixels, 2);
        assert_eq!(stats.total_pixels, 4);
        assert_eq!(stats.quadrant_means[0], 255.0);
        assert_eq!(stats.quadrant_means[1], 128.0);
        assert_eq!(stats.quadrant_means[2], 0.0);
    }

    #[test]
    fn dump_writes_a_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("card.png");
        let source = texture(2, 1, vec![255, 255, 255, 255, 0, 0, 0, 0]);
        let stats = dump_texture_to_png(&source, &path).expect("dump png");
        assert_eq!(stats.opaque_pixels, 1);
        let bytes = fs::read(&path).expect("png on disk");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
