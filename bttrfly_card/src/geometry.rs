//! Rounded-rectangle card solid. The contour is walked from the bottom edge
//! with quadratic corners, then extruded along +Z without a bevel. Built
//! solids are shared through a cache keyed by their parameters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use glam::{Vec2, Vec3};
use once_cell::sync::Lazy;

use crate::mesh::{MeshPrimitive, MeshVertex};

/// Samples per quadratic corner.
pub const CORNER_SEGMENTS: u32 = 16;

static CARD_GEOMETRY: Lazy<Mutex<GeometryCache>> = Lazy::new(|| Mutex::new(GeometryCache::new()));

/// Closed outline of a `width × height` rectangle centred on the origin with
/// quadratic corners of `radius`. The closing point is not repeated and
/// coincident neighbours are collapsed, so `radius == 0` yields four points.
pub fn rounded_rect_contour(width: f32, height: f32, radius: f32) -> Vec<Vec2> {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let r = radius.clamp(0.0, hw.min(hh).max(0.0));

    let start = Vec2::new(-hw + r, -hh);
    let mut points = vec![start];
    let mut pen = start;

    // bottom edge, bottom-right corner
    line_to(&mut points, &mut pen, Vec2::new(hw - r, -hh));
    quadratic_to(&mut points, &mut pen, Vec2::new(hw, -hh), Vec2::new(hw, -hh + r));
    // right edge, top-right corner
    line_to(&mut points, &mut pen, Vec2::new(hw, hh - r));
    quadratic_to(&mut points, &mut pen, Vec2::new(hw, hh), Vec2::new(hw - r, hh));
    // top edge, top-left corner
    line_to(&mut points, &mut pen, Vec2::new(-hw + r, hh));
    quadratic_to(&mut points, &mut pen, Vec2::new(-hw, hh), Vec2::new(-hw, hh - r));
    // left edge, bottom-left corner
    line_to(&mut points, &mut pen, Vec2::new(-hw, -hh + r));
    quadratic_to(&mut points, &mut pen, Vec2::new(-hw, -hh), start);

    while points.len() > 1 && points.last() == points.first() {
        points.pop();
    }
    points
}

fn line_to(points: &mut Vec<Vec2>, pen: &mut Vec2, to: Vec2) {
    push_distinct(points, to);
    *pen = to;
}

fn quadratic_to(points: &mut Vec<Vec2>, pen: &mut Vec2, control: Vec2, to: Vec2) {
    let from = *pen;
    for step in 1..=CORNER_SEGMENTS {
        let t = step as f32 / CORNER_SEGMENTS as f32;
        let inv = 1.0 - t;
        let point = from * (inv * inv) + control * (2.0 * inv * t) + to * (t * t);
        push_distinct(points, point);
    }
    *pen = to;
}

fn push_distinct(points: &mut Vec<Vec2>, point: Vec2) {
    if points.last().is_some_and(|last| last.abs_diff_eq(point, 1e-7)) {
        return;
    }
    points.push(point);
}

/// Signed area; positive for counter-clockwise contours.
pub fn signed_area(contour: &[Vec2]) -> f32 {
    let mut sum = 0.0;
    for (i, a) in contour.iter().enumerate() {
        let b = contour[(i + 1) % contour.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Extrude a convex contour from `z = 0` to `z = depth`. Caps are fanned
/// from the contour centroid; each side quad gets its own flat normal.
pub fn extrude_contour(contour: &[Vec2], depth: f32) -> MeshPrimitive {
    let ccw: Vec<Vec2> = if signed_area(contour) < 0.0 {
        contour.iter().rev().copied().collect()
    } else {
        contour.to_vec()
    };
    let count = ccw.len();
    let mut vertices = Vec::with_capacity(count * 6 + 2);
    let mut indices = Vec::with_capacity(count * 12);
    if count < 3 {
        return MeshPrimitive::new(vertices, indices);
    }

    let centroid = ccw.iter().copied().sum::<Vec2>() / count as f32;

    for (z, normal_z) in [(depth, 1.0f32), (0.0, -1.0)] {
        let center = vertices.len() as u16;
        vertices.push(MeshVertex {
            position: [centroid.x, centroid.y, z],
            normal: [0.0, 0.0, normal_z],
        });
        for point in &ccw {
            vertices.push(MeshVertex {
                position: [point.x, point.y, z],
                normal: [0.0, 0.0, normal_z],
            });
        }
        for i in 0..count {
            let current = center + 1 + i as u16;
            let next = center + 1 + ((i + 1) % count) as u16;
            if normal_z > 0.0 {
                indices.extend_from_slice(&[center, current, next]);
            } else {
                indices.extend_from_slice(&[center, next, current]);
            }
        }
    }

    for i in 0..count {
        let a = ccw[i];
        let b = ccw[(i + 1) % count];
        let edge = b - a;
        let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero();
        let base = vertices.len() as u16;
        for (point, z) in [(a, 0.0), (b, 0.0), (b, depth), (a, depth)] {
            vertices.push(MeshVertex {
                position: [point.x, point.y, z],
                normal: normal.into(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshPrimitive::new(vertices, indices)
}

pub fn build_rounded_card(width: f32, height: f32, thickness: f32, radius: f32) -> MeshPrimitive {
    let contour = rounded_rect_contour(width, height, radius);
    extrude_contour(&contour, thickness)
}

pub fn cache_key(width: f32, height: f32, thickness: f32, radius: f32) -> String {
    format!("{width}-{height}-{thickness}-{radius}")
}

/// Append-only cache of card solids. Entries live as long as the cache.
#[derive(Default)]
pub struct GeometryCache {
    entries: HashMap<String, Arc<MeshPrimitive>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        width: f32,
        height: f32,
        thickness: f32,
        radius: f32,
    ) -> Arc<MeshPrimitive> {
        let key = cache_key(width, height, thickness, radius);
        self.entries
            .entry(key)
            .or_insert_with_key(|key| {
                log::debug!("building card geometry {key}");
                Arc::new(build_rounded_card(width, height, thickness, radius))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide card geometry.
pub fn cached_card_geometry(
    width: f32,
    height: f32,
    thickness: f32,
    radius: f32,
) -> Arc<MeshPrimitive> {
    let mut cache = match CARD_GEOMETRY.lock() {
        Ok(cache) => cache,
        Err(poisoned) => poisoned.into_inner(),
    };
    cache.get_or_build(width, height, thickness, radius)
}
