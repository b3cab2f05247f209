//! Composition of the floating card: the card solid, its markdown face, the
//! window buttons, the rubber bands with their anchors, and the lights. The
//! scene is renderer-agnostic; each tick yields a `FrameSnapshot` of model
//! matrices and light parameters that a host uploads however it likes.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;

use crate::geometry::cached_card_geometry;
use crate::markdown::DEFAULT_QUICK_GUIDE;
use crate::mesh::MeshPrimitive;
use crate::rubber_band::{ANCHOR_BOTTOM, ANCHOR_TOP, BAND_DEPTH, BandRig, RubberBand};

/// Base tilt of the card group (XYZ Euler radians).
const CARD_TILT: [f32; 3] = [0.1, -0.25, -0.05];
/// Spin added around Y per 60 Hz frame.
const SPIN_PER_FRAME: f32 = 0.005;

const MARKDOWN_OFFSET: Vec3 = Vec3::new(0.0, -0.15, 0.003);
const MARKDOWN_COVERAGE: f32 = 0.95;

const BUTTON_RADIUS: f32 = 0.065;
const BUTTON_SPACING: f32 = 0.2;
const BUTTON_MARGIN: f32 = 0.2;
const BUTTON_DEPTH: f32 = 0.002;
const BUTTON_THICKNESS: f32 = 0.004;

const BAND_RADIUS: f32 = 0.008;
const ANCHOR_RADIUS: f32 = 0.05;

pub const CARD_COLOR: [f32; 4] = rgba(0x4a4a4a, 0.45);
pub const BAND_COLOR: [f32; 4] = rgba(0x808080, 1.0);
pub const ANCHOR_COLOR: [f32; 4] = rgba(0x444444, 1.0);

const fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let [r, g, b] = rgb(hex);
    [r, g, b, alpha]
}

const fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Card parameters. Every field is optional in JSON presets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CardParams {
    pub width: f32,
    pub height: f32,
    pub thickness: f32,
    pub radius: f32,
    pub show_mac_buttons: bool,
    pub markdown: String,
    pub texture_width: u32,
    pub texture_height: u32,
}

impl Default for CardParams {
    fn default() -> Self {
        Self {
            width: 3.5,
            height: 4.5,
            thickness: 0.001,
            radius: 0.08,
            show_mac_buttons: true,
            markdown: DEFAULT_QUICK_GUIDE.to_string(),
            texture_width: 512,
            texture_height: 650,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Close,
    Minimize,
    Maximize,
}

impl ButtonKind {
    pub const ALL: [ButtonKind; 3] = [ButtonKind::Close, ButtonKind::Minimize, ButtonKind::Maximize];

    pub fn color(self) -> [f32; 4] {
        match self {
            ButtonKind::Close => rgba(0xff5f57, 1.0),
            ButtonKind::Minimize => rgba(0xffbd2e, 1.0),
            ButtonKind::Maximize => rgba(0x28ca42, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonInstance {
    pub kind: ButtonKind,
    pub model: Mat4,
}

/// Draw order of the window buttons relative to the card face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLayer {
    /// Card front faces the viewer; buttons draw after the card.
    Front,
    /// Card back faces the viewer; buttons draw before the card.
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point { distance: f32, decay: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLight {
    pub kind: LightKind,
    pub position: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl SceneLight {
    const fn new(kind: LightKind, position: Vec3, hex: u32, intensity: f32) -> Self {
        Self {
            kind,
            position,
            color: rgb(hex),
            intensity,
        }
    }
}

/// Fixed studio lighting around the card.
pub static STUDIO_LIGHTS: [SceneLight; 6] = [
    SceneLight::new(LightKind::Ambient, Vec3::ZERO, 0x404040, 0.3),
    SceneLight::new(LightKind::Directional, Vec3::new(5.0, 5.0, 5.0), 0xffffff, 0.6),
    SceneLight::new(LightKind::Directional, Vec3::new(-5.0, -5.0, 2.0), 0x6366f1, 0.3),
    SceneLight::new(
        LightKind::Point { distance: 0.0, decay: 2.0 },
        Vec3::new(3.0, 3.0, 3.0),
        0x8b5cf6,
        0.4,
    ),
    SceneLight::new(
        LightKind::Point { distance: 0.0, decay: 2.0 },
        Vec3::new(-3.0, -3.0, 2.0),
        0x3b82f6,
        0.3,
    ),
    SceneLight::new(
        LightKind::Point { distance: 0.0, decay: 2.0 },
        Vec3::new(0.0, 5.0, 0.0),
        0xffffff,
        0.2,
    ),
];

/// Breathing light behind the card: two-second pulse, slow sideways sway.
pub fn backlight(elapsed: f32, card_transform: Mat4) -> SceneLight {
    let pulse = (elapsed * PI).sin() * 0.2 + 0.8;
    let sway = (elapsed * 0.5).sin() * 0.1;
    SceneLight {
        kind: LightKind::Point {
            distance: 8.0,
            decay: 1.5,
        },
        position: card_transform.transform_point3(Vec3::new(sway, 0.0, -2.0)),
        color: rgb(0xf0f8ff),
        intensity: pulse * 1.2,
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub card: Mat4,
    pub markdown_plane: Option<Mat4>,
    pub buttons: Vec<ButtonInstance>,
    pub button_layer: ButtonLayer,
    pub bands: [Mat4; 2],
    pub anchors: [Mat4; 2],
    pub backlight: SceneLight,
    pub lights: &'static [SceneLight],
}

pub struct FloatingCard {
    params: CardParams,
    geometry: Arc<MeshPrimitive>,
    band: RubberBand,
    rig: BandRig,
    spin: f32,
    elapsed: f32,
}

impl FloatingCard {
    pub fn new(params: CardParams) -> Self {
        let geometry =
            cached_card_geometry(params.width, params.height, params.thickness, params.radius);
        let band = RubberBand::new(params.height);
        let rig = band.rig();
        Self {
            params,
            geometry,
            band,
            rig,
            spin: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn params(&self) -> &CardParams {
        &self.params
    }

    pub fn geometry(&self) -> &Arc<MeshPrimitive> {
        &self.geometry
    }

    pub fn rubber_band(&self) -> &RubberBand {
        &self.band
    }

    pub fn pointer_down(&mut self, pointer_y: f32) {
        self.band.pointer_down(pointer_y);
    }

    pub fn pointer_move(&mut self, pointer_y: f32) {
        self.band.pointer_move(pointer_y);
    }

    pub fn pointer_up(&mut self) {
        self.band.pointer_up();
    }

    /// Advance the spin, the spring and the clock by `delta_seconds` and
    /// describe the resulting frame.
    pub fn tick(&mut self, delta_seconds: f32) -> FrameSnapshot {
        let delta_seconds = delta_seconds.max(0.0);
        self.elapsed += delta_seconds;
        self.spin = (self.spin + SPIN_PER_FRAME * delta_seconds * 60.0) % TAU;
        self.band.update(delta_seconds, Some(&mut self.rig));
        self.snapshot()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let card = self.card_transform();
        let markdown_plane = (!self.params.markdown.is_empty()).then(|| {
            card * Mat4::from_scale_rotation_translation(
                Vec3::new(
                    self.params.width * MARKDOWN_COVERAGE,
                    self.params.height * MARKDOWN_COVERAGE,
                    1.0,
                ),
                Quat::IDENTITY,
                MARKDOWN_OFFSET,
            )
        });
        let buttons = if self.params.show_mac_buttons {
            self.button_instances(card)
        } else {
            Vec::new()
        };

        FrameSnapshot {
            card,
            markdown_plane,
            buttons,
            button_layer: button_layer(card),
            bands: [
                band_model(self.rig.top.center, self.rig.top.length),
                band_model(self.rig.bottom.center, self.rig.bottom.length),
            ],
            anchors: [anchor_model(ANCHOR_TOP), anchor_model(ANCHOR_BOTTOM)],
            backlight: backlight(self.elapsed, card),
            lights: &STUDIO_LIGHTS,
        }
    }

    /// Card group transform: spring offset along Y, then the tilted spin.
    pub fn card_transform(&self) -> Mat4 {
        let [pitch, yaw, roll] = CARD_TILT;
        let rotation = Quat::from_rotation_x(pitch)
            * Quat::from_rotation_y(yaw + self.spin)
            * Quat::from_rotation_z(roll);
        Mat4::from_rotation_translation(rotation, Vec3::new(0.0, self.rig.card_offset, 0.0))
    }

    fn button_instances(&self, card: Mat4) -> Vec<ButtonInstance> {
        let start_x = -self.params.width / 2.0 + BUTTON_MARGIN;
        let y = self.params.height / 2.0 - BUTTON_MARGIN;
        let scale = Vec3::new(BUTTON_RADIUS * 2.0, BUTTON_THICKNESS, BUTTON_RADIUS * 2.0);
        ButtonKind::ALL
            .iter()
            .enumerate()
            .map(|(index, &kind)| {
                let translation = Vec3::new(start_x + BUTTON_SPACING * index as f32, y, BUTTON_DEPTH);
                let local = Mat4::from_scale_rotation_translation(
                    scale,
                    Quat::from_rotation_x(PI / 2.0),
                    translation,
                );
                ButtonInstance {
                    kind,
                    model: card * local,
                }
            })
            .collect()
    }
}

fn button_layer(card: Mat4) -> ButtonLayer {
    let facing = card.transform_vector3(Vec3::Z).normalize_or_zero();
    if facing.dot(Vec3::Z) > 0.0 {
        ButtonLayer::Front
    } else {
        ButtonLayer::Back
    }
}

fn band_model(center: f32, length: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(BAND_RADIUS * 2.0, length, BAND_RADIUS * 2.0),
        Quat::IDENTITY,
        Vec3::new(0.0, center, BAND_DEPTH),
    )
}

fn anchor_model(y: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::splat(ANCHOR_RADIUS * 2.0),
        Quat::IDENTITY,
        Vec3::new(0.0, y, BAND_DEPTH),
    )
}

/// Horizontal orbit around the origin. The polar angle is pinned to the
/// horizon, so only azimuth changes; no zoom or pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub azimuth: f32,
    pub radius: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_position(Vec3::new(-1.0, 1.0, 10.5))
    }
}

impl OrbitCamera {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            azimuth: position.x.atan2(position.z),
            radius: position.length(),
            fov_degrees: 50.0,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Rotate by a horizontal pointer delta. A drag across the full viewport
    /// height turns the camera once around.
    pub fn rotate(&mut self, delta_x_pixels: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.azimuth = (self.azimuth - TAU * delta_x_pixels / viewport_height) % TAU;
    }

    pub fn eye(&self) -> Vec3 {
        let (sin, cos) = self.azimuth.sin_cos();
        Vec3::new(self.radius * sin, 0.0, self.radius * cos)
    }

    pub fn view_projection(&self, aspect_ratio: f32) -> Mat4 {
        let aspect = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            1.0
        };
        let view = Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y);
        let projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far);
        projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn presets_fill_missing_fields() {
        let params: CardParams = serde_json::from_str(r#"{ "width": 4.0 }"#).expect("parse");
        assert_eq!(params.width, 4.0);
        assert_eq!(params.height, 4.5);
        assert!(params.show_mac_buttons);
        assert_eq!(params.markdown, DEFAULT_QUICK_GUIDE);
    }

    #[test]
    fn default_card_faces_viewer() {
        let mut card = FloatingCard::new(CardParams::default());
        let frame = card.tick(FRAME);
        assert_eq!(frame.buttons.len(), 3);
        assert_eq!(frame.buttons[0].kind, ButtonKind::Close);
        assert_eq!(frame.button_layer, ButtonLayer::Front);
        assert!(frame.markdown_plane.is_some());
        assert_eq!(frame.lights.len(), 6);
    }

    #[test]
    fn half_turn_puts_buttons_behind() {
        let mut card = FloatingCard::new(CardParams::default());
        // ~0.3 rad per second turns the back toward the viewer within eight seconds
        let mut layer = ButtonLayer::Front;
        for _ in 0..(60 * 8) {
            layer = card.tick(FRAME).button_layer;
            if layer == ButtonLayer::Back {
                break;
            }
        }
        assert_eq!(layer, ButtonLayer::Back);
    }

    #[test]
    fn hidden_buttons_and_empty_markdown_are_omitted() {
        let mut card = FloatingCard::new(CardParams {
            show_mac_buttons: false,
            markdown: String::new(),
            ..CardParams::default()
        });
        let frame = card.tick(FRAME);
        assert!(frame.buttons.is_empty());
        assert!(frame.markdown_plane.is_none());
    }

    #[test]
    fn drag_moves_card_and_stretches_bands() {
        let mut card = FloatingCard::new(CardParams::default());
        card.pointer_down(300.0);
        card.pointer_move(200.0);
        let frame = card.tick(FRAME);
        let offset = frame.card.w_axis.y;
        assert!(approx(offset, 0.8));

        // top band: card top (0.8 + 2.25) up to 6.5
        let top = frame.bands[0];
        assert!(approx(top.y_axis.y, 6.5 - 3.05));
        assert!(approx(top.w_axis.y, (3.05 + 6.5) / 2.0));
        assert!(approx(top.w_axis.z, BAND_DEPTH));
    }

    #[test]
    fn bands_and_anchors_ignore_the_spin() {
        let mut card = FloatingCard::new(CardParams::default());
        let first = card.tick(FRAME);
        for _ in 0..120 {
            card.tick(FRAME);
        }
        let later = card.tick(FRAME);
        assert_eq!(first.anchors, later.anchors);
        assert_eq!(first.bands, later.bands);
        assert!(approx(later.anchors[0].w_axis.y, ANCHOR_TOP));
        assert_ne!(first.card, later.card);
    }

    #[test]
    fn backlight_breathes_between_bounds() {
        for step in 0..200 {
            let light = backlight(step as f32 * 0.05, Mat4::IDENTITY);
            assert!(light.intensity >= 0.6 * 1.2 - 1e-5);
            assert!(light.intensity <= 1.0 * 1.2 + 1e-5);
            assert!(light.position.x.abs() <= 0.1 + 1e-6);
            assert_eq!(light.position.z, -2.0);
        }
    }

    #[test]
    fn camera_orbits_on_the_horizon() {
        let mut camera = OrbitCamera::default();
        let radius = Vec3::new(-1.0, 1.0, 10.5).length();
        assert!(approx(camera.eye().length(), radius));
        assert_eq!(camera.eye().y, 0.0);

        let before = camera.azimuth;
        camera.rotate(100.0, 800.0);
        assert!(approx(camera.azimuth, before - TAU / 8.0));
        assert!(approx(camera.eye().length(), radius));

        camera.rotate(50.0, 0.0);
        assert!(approx(camera.azimuth, before - TAU / 8.0));
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let camera = OrbitCamera::default();
        let clip = camera.view_projection(16.0 / 9.0) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        assert!(approx(clip.x / clip.w, 0.0));
        assert!(approx(clip.y / clip.w, 0.0));
    }
}
