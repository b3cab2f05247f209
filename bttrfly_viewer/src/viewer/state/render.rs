use std::{ops::Range, time::Instant};

use super::super::shaders::{MeshInstance, MeshUniforms, PlaneUniforms};
use super::layout;
use super::{PrimitiveBuffers, ViewerState};
use bttrfly_card::FrameSnapshot;
use bttrfly_card::mesh::to_matrix_columns;
use bttrfly_card::scene::{ANCHOR_COLOR, BAND_COLOR, ButtonLayer, CARD_COLOR};
use bytemuck::cast_slice;
use glam::Mat4;
use wgpu::SurfaceError;

/// Frame deltas above this (stalls, window drags) are clamped so the spring
/// never takes one huge step.
const MAX_FRAME_DELTA: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeshKind {
    Card,
    Sphere,
    Cylinder,
}

#[derive(Debug, Clone, PartialEq)]
enum DrawStep {
    Mesh { kind: MeshKind, instances: Range<u32> },
    MarkdownPlane(Mat4),
}

/// Instances for one frame plus the order to draw them in. The card is
/// translucent, so buttons behind it must land before it.
#[derive(Default)]
struct FrameDraws {
    instances: Vec<MeshInstance>,
    steps: Vec<DrawStep>,
}

impl FrameDraws {
    fn push(&mut self, kind: MeshKind, instances: impl IntoIterator<Item = MeshInstance>) {
        let start = self.instances.len() as u32;
        self.instances.extend(instances);
        let end = self.instances.len() as u32;
        if end > start {
            self.steps.push(DrawStep::Mesh {
                kind,
                instances: start..end,
            });
        }
    }

    fn push_card(&mut self, snapshot: &FrameSnapshot) {
        self.push(
            MeshKind::Card,
            [MeshInstance::new(snapshot.card, CARD_COLOR)],
        );
        if let Some(plane) = snapshot.markdown_plane {
            self.steps.push(DrawStep::MarkdownPlane(plane));
        }
    }

    fn push_buttons(&mut self, snapshot: &FrameSnapshot) {
        self.push(
            MeshKind::Cylinder,
            snapshot
                .buttons
                .iter()
                .map(|button| MeshInstance::new(button.model, button.kind.color())),
        );
    }
}

fn build_frame_draws(snapshot: &FrameSnapshot) -> FrameDraws {
    let mut draws = FrameDraws::default();
    draws.push(
        MeshKind::Cylinder,
        snapshot
            .bands
            .iter()
            .map(|model| MeshInstance::new(*model, BAND_COLOR)),
    );
    draws.push(
        MeshKind::Sphere,
        snapshot
            .anchors
            .iter()
            .map(|model| MeshInstance::new(*model, ANCHOR_COLOR)),
    );
    match snapshot.button_layer {
        ButtonLayer::Front => {
            draws.push_card(snapshot);
            draws.push_buttons(snapshot);
        }
        ButtonLayer::Back => {
            draws.push_buttons(snapshot);
            draws.push_card(snapshot);
        }
    }
    draws
}

pub(super) fn render(state: &mut ViewerState) -> Result<(), SurfaceError> {
    let now = Instant::now();
    let delta = state
        .last_frame
        .map(|last| now.duration_since(last).as_secs_f32())
        .unwrap_or(0.0)
        .min(MAX_FRAME_DELTA);
    state.last_frame = Some(now);
    let snapshot = state.card.tick(delta);

    let frame = state.surface.get_current_texture()?;
    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("bttrfly-viewer-encoder"),
        });

    draw_scene(state, &snapshot, &view, &mut encoder);

    state.queue.submit(std::iter::once(encoder.finish()));
    frame.present();
    Ok(())
}

fn draw_scene(
    state: &mut ViewerState,
    snapshot: &FrameSnapshot,
    view: &wgpu::TextureView,
    encoder: &mut wgpu::CommandEncoder,
) {
    let draws = build_frame_draws(snapshot);
    ensure_mesh_instance_capacity(state, draws.instances.len());

    let view_projection = state
        .camera
        .view_projection(layout::aspect_ratio(state.size));
    let uniforms = MeshUniforms::new(
        view_projection,
        snapshot.lights.iter().chain([&snapshot.backlight]),
    );
    let mesh = &state.mesh;
    state
        .queue
        .write_buffer(&mesh.uniform_buffer, 0, cast_slice(&[uniforms]));
    state
        .queue
        .write_buffer(&mesh.instance_buffer, 0, cast_slice(&draws.instances));

    if let (Some(plane), Some(model)) = (state.plane.as_ref(), snapshot.markdown_plane) {
        let plane_uniforms = PlaneUniforms {
            model_view_projection: to_matrix_columns(view_projection * model),
        };
        state
            .queue
            .write_buffer(&plane.uniform_buffer, 0, cast_slice(&[plane_uniforms]));
    }

    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("card-pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(state.background),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &mesh.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    let instance_bytes = (draws.instances.len() * std::mem::size_of::<MeshInstance>()) as u64;
    for step in &draws.steps {
        match step {
            DrawStep::Mesh { kind, instances } => {
                let buffers = match kind {
                    MeshKind::Card => &mesh.card,
                    MeshKind::Sphere => &mesh.sphere,
                    MeshKind::Cylinder => &mesh.cylinder,
                };
                pass.set_pipeline(&mesh.pipeline);
                pass.set_bind_group(0, &mesh.bind_group, &[]);
                pass.set_vertex_buffer(1, mesh.instance_buffer.slice(0..instance_bytes));
                draw_primitive(&mut pass, buffers, instances.clone());
            }
            DrawStep::MarkdownPlane(_) => {
                // No fonts, no texture.
                let Some(plane) = state.plane.as_ref() else {
                    continue;
                };
                pass.set_pipeline(&plane.pipeline);
                pass.set_bind_group(0, &plane.uniform_bind_group, &[]);
                pass.set_bind_group(1, &plane.texture_bind_group, &[]);
                draw_primitive(&mut pass, &plane.buffers, 0..1);
            }
        }
    }
}

fn draw_primitive<'a>(
    pass: &mut wgpu::RenderPass<'a>,
    buffers: &'a PrimitiveBuffers,
    instances: Range<u32>,
) {
    pass.set_vertex_buffer(0, buffers.vertex.slice(..));
    pass.set_index_buffer(buffers.index.slice(..), wgpu::IndexFormat::Uint16);
    pass.draw_indexed(0..buffers.index_count, 0, instances);
}

fn ensure_mesh_instance_capacity(state: &mut ViewerState, required: usize) {
    let mesh = &mut state.mesh;
    if required <= mesh.instance_capacity {
        return;
    }
    let mut capacity = mesh.instance_capacity.max(1);
    while capacity < required {
        capacity *= 2;
    }
    let new_size = (capacity * std::mem::size_of::<MeshInstance>()) as u64;
    let label = format!("mesh-instance-buffer({capacity})");
    mesh.instance_buffer = state.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label.as_str()),
        size: new_size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    mesh.instance_capacity = capacity;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bttrfly_card::{CardParams, FloatingCard};

    fn kinds(draws: &FrameDraws) -> Vec<Option<MeshKind>> {
        draws
            .steps
            .iter()
            .map(|step| match step {
                DrawStep::Mesh { kind, .. } => Some(*kind),
                DrawStep::MarkdownPlane(_) => None,
            })
            .collect()
    }

    #[test]
    fn front_facing_card_draws_buttons_last() {
        let mut snapshot = FloatingCard::new(CardParams::default()).snapshot();
        snapshot.button_layer = ButtonLayer::Front;
        let draws = build_frame_draws(&snapshot);
        assert_eq!(
            kinds(&draws),
            vec![
                Some(MeshKind::Cylinder),
                Some(MeshKind::Sphere),
                Some(MeshKind::Card),
                None,
                Some(MeshKind::Cylinder),
            ]
        );
        // two bands, two anchors, the card, three buttons
        assert_eq!(draws.instances.len(), 8);
        assert_eq!(
            draws.steps.last(),
            Some(&DrawStep::Mesh {
                kind: MeshKind::Cylinder,
                instances: 5..8
            })
        );
    }

    #[test]
    fn back_facing_card_draws_buttons_first() {
        let mut snapshot = FloatingCard::new(CardParams::default()).snapshot();
        snapshot.button_layer = ButtonLayer::Back;
        let draws = build_frame_draws(&snapshot);
        assert_eq!(
            kinds(&draws),
            vec![
                Some(MeshKind::Cylinder),
                Some(MeshKind::Sphere),
                Some(MeshKind::Cylinder),
                Some(MeshKind::Card),
                None,
            ]
        );
    }

    #[test]
    fn hidden_buttons_and_empty_markdown_skip_steps() {
        let params = CardParams {
            show_mac_buttons: false,
            markdown: String::new(),
            ..CardParams::default()
        };
        let draws = build_frame_draws(&FloatingCard::new(params).snapshot());
        assert_eq!(
            kinds(&draws),
            vec![
                Some(MeshKind::Cylinder),
                Some(MeshKind::Sphere),
                Some(MeshKind::Card),
            ]
        );
        assert_eq!(draws.instances.len(), 5);
    }
}
