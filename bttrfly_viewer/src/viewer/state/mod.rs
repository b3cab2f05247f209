//! Runtime state for the card viewer. Owns the wgpu device/surface, the
//! floating card simulation and the orbit camera, and exposes the handful of
//! hooks the event loop in `main.rs` drives. `init` builds the GPU resources,
//! `layout` handles resizes and `render` ticks the card and draws a frame.

use std::{sync::Arc, time::Instant};

use anyhow::Result;
use bttrfly_card::{FloatingCard, MarkdownTexture, OrbitCamera};
use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    window::{CursorIcon, Window},
};

use super::input::{PointerAction, PointerButton, PointerRouter};

pub(super) struct PrimitiveBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub index_count: u32,
}

pub(super) struct MeshResources {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group: wgpu::BindGroup,
    pub uniform_buffer: wgpu::Buffer,
    pub depth_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    pub instance_buffer: wgpu::Buffer,
    pub instance_capacity: usize,
    pub card: PrimitiveBuffers,
    pub sphere: PrimitiveBuffers,
    pub cylinder: PrimitiveBuffers,
}

/// The textured quad carrying the markdown guide. Absent when no fonts
/// were supplied.
pub(super) struct PlaneResources {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,
    pub texture_bind_group: wgpu::BindGroup,
    pub buffers: PrimitiveBuffers,
    pub _texture: wgpu::Texture,
}

pub struct ViewerState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    background: wgpu::Color,
    mesh: MeshResources,
    plane: Option<PlaneResources>,
    card: FloatingCard,
    camera: OrbitCamera,
    pointer: PointerRouter,
    last_frame: Option<Instant>,
}

mod init;
mod layout;
mod render;

impl ViewerState {
    pub async fn new(
        window: Arc<Window>,
        card: FloatingCard,
        markdown: Option<Arc<MarkdownTexture>>,
    ) -> Result<Self> {
        init::new(window, card, markdown).await
    }

    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        layout::resize(self, new_size);
    }

    pub fn render(&mut self) -> Result<(), SurfaceError> {
        render::render(self)
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        for action in self.pointer.cursor_moved(x, y) {
            self.apply_pointer(action);
        }
    }

    pub fn mouse_button(&mut self, button: PointerButton, pressed: bool) {
        if let Some(action) = self.pointer.button(button, pressed) {
            self.apply_pointer(action);
        }
        self.sync_cursor_icon();
    }

    pub fn cursor_left(&mut self) {
        if let Some(action) = self.pointer.cursor_left() {
            self.apply_pointer(action);
        }
        self.sync_cursor_icon();
    }

    fn sync_cursor_icon(&self) {
        let icon = if self.pointer.is_dragging_band() {
            CursorIcon::Grabbing
        } else {
            CursorIcon::Default
        };
        self.window.set_cursor_icon(icon);
    }

    fn apply_pointer(&mut self, action: PointerAction) {
        match action {
            PointerAction::BandGrab { y } => self.card.pointer_down(y),
            PointerAction::BandMove { y } => self.card.pointer_move(y),
            PointerAction::BandRelease => self.card.pointer_up(),
            PointerAction::Orbit { delta_x } => {
                self.camera.rotate(delta_x, self.size.height as f32)
            }
        }
    }

    fn rebuild_mesh_depth(&mut self) {
        let (texture, view) = init::create_mesh_depth_texture(&self.device, self.size);
        self.mesh.depth_texture = texture;
        self.mesh.depth_view = view;
    }
}
