use std::{borrow::Cow, sync::Arc};

use super::super::input::PointerRouter;
use super::super::shaders::{
    MESH_SHADER_SOURCE, MeshInstance, MeshUniforms, PLANE_SHADER_SOURCE, PlaneUniforms,
};
use super::{MeshResources, PlaneResources, PrimitiveBuffers, ViewerState};
use anyhow::{Context, Result};
use bttrfly_card::mesh::{build_cylinder, build_plane, build_sphere};
use bttrfly_card::{FloatingCard, MarkdownTexture, MeshPrimitive, MeshVertex, OrbitCamera, PlaneVertex};
use bytemuck::{Zeroable, cast_slice};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

use crate::texture::prepare_rgba_upload;

/// Bundles the wgpu objects tied to the viewer window.
struct WgpuBootstrap {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    present_mode: wgpu::PresentMode,
    alpha_mode: wgpu::CompositeAlphaMode,
}

const MESH_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SPHERE_LAT_DIVS: u32 = 16;
const SPHERE_LON_DIVS: u32 = 24;
const CYLINDER_SEGMENTS: u32 = 24;
const INITIAL_INSTANCE_CAPACITY: usize = 8;

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.012,
    g: 0.012,
    b: 0.02,
    a: 1.0,
};

/// Bootstraps wgpu, uploads the card, anchor and band meshes plus the
/// markdown texture, and hands back a ready-to-render `ViewerState`.
pub(super) async fn new(
    window: Arc<Window>,
    card: FloatingCard,
    markdown: Option<Arc<MarkdownTexture>>,
) -> Result<ViewerState> {
    let size = window.inner_size();
    let wgpu = bootstrap_wgpu(window.clone()).await?;

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: wgpu.surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu.present_mode,
        alpha_mode: wgpu.alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    wgpu.surface.configure(&wgpu.device, &config);

    let mesh = create_mesh_resources(&wgpu.device, size, wgpu.surface_format, card.geometry());
    let plane = markdown
        .map(|texture| {
            create_plane_resources(&wgpu.device, &wgpu.queue, wgpu.surface_format, &texture)
        })
        .transpose()?;

    println!(
        "[bttrfly_viewer] card {:.2}x{:.2} ({} triangles), markdown plane {}",
        card.params().width,
        card.params().height,
        card.geometry().triangle_count(),
        if plane.is_some() { "on" } else { "off" }
    );

    Ok(ViewerState {
        window,
        surface: wgpu.surface,
        device: wgpu.device,
        queue: wgpu.queue,
        config,
        size,
        background: BACKGROUND,
        mesh,
        plane,
        card,
        camera: OrbitCamera::default(),
        pointer: PointerRouter::new(),
        last_frame: None,
    })
}

async fn bootstrap_wgpu(window: Arc<Window>) -> Result<WgpuBootstrap> {
    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(window.clone())
        .context("creating wgpu surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await
        .context("requesting wgpu adapter")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("bttrfly-viewer-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await
        .context("requesting wgpu device")?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .copied()
        .find(|format| format.is_srgb())
        .or_else(|| surface_caps.formats.first().copied())
        .context("surface reports no formats")?;
    let present_mode = surface_caps
        .present_modes
        .iter()
        .copied()
        .find(|mode| *mode == wgpu::PresentMode::Mailbox)
        .unwrap_or(wgpu::PresentMode::Fifo);
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Opaque);

    Ok(WgpuBootstrap {
        surface,
        device,
        queue,
        surface_format,
        present_mode,
        alpha_mode,
    })
}

fn create_mesh_resources(
    device: &wgpu::Device,
    size: PhysicalSize<u32>,
    surface_format: wgpu::TextureFormat,
    card_geometry: &MeshPrimitive,
) -> MeshResources {
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("mesh-uniform-layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<MeshUniforms>() as u64),
            },
            count: None,
        }],
    });

    let initial_uniform = MeshUniforms::new(Mat4::IDENTITY, std::iter::empty());
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("mesh-uniform-buffer"),
        contents: cast_slice(&[initial_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("mesh-uniform-bind-group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(MESH_SHADER_SOURCE)),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };

    let instance_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4
        ],
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &mesh_shader,
            entry_point: "mesh_vs_main",
            buffers: &[vertex_layout, instance_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &mesh_shader,
            entry_point: "mesh_fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..wgpu::PrimitiveState::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: MESH_DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    let card = upload_primitive(device, "mesh-card", card_geometry);
    let sphere = upload_primitive(
        device,
        "mesh-sphere",
        &build_sphere(SPHERE_LAT_DIVS, SPHERE_LON_DIVS),
    );
    let cylinder = upload_primitive(device, "mesh-cylinder", &build_cylinder(CYLINDER_SEGMENTS));

    let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("mesh-instance-buffer"),
        size: (INITIAL_INSTANCE_CAPACITY * std::mem::size_of::<MeshInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let (depth_texture, depth_view) = create_mesh_depth_texture(device, size);

    MeshResources {
        pipeline,
        bind_group,
        uniform_buffer,
        depth_texture,
        depth_view,
        instance_buffer,
        instance_capacity: INITIAL_INSTANCE_CAPACITY,
        card,
        sphere,
        cylinder,
    }
}

fn upload_primitive(
    device: &wgpu::Device,
    label: &str,
    primitive: &MeshPrimitive,
) -> PrimitiveBuffers {
    let vertex_label = format!("{label}-vertex-buffer");
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&vertex_label),
        contents: cast_slice(&primitive.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_label = format!("{label}-index-buffer");
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&index_label),
        contents: cast_slice(&primitive.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    PrimitiveBuffers {
        vertex: vertex_buffer,
        index: index_buffer,
        index_count: primitive.indices.len() as u32,
    }
}

fn create_plane_resources(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    markdown: &MarkdownTexture,
) -> Result<PlaneResources> {
    let texture_extent = wgpu::Extent3d {
        width: markdown.width,
        height: markdown.height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("markdown-texture"),
        size: texture_extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("markdown-sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let upload = prepare_rgba_upload(markdown.width, markdown.height, &markdown.pixels)?;
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        upload.pixels(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(upload.bytes_per_row()),
            rows_per_image: Some(markdown.height),
        },
        texture_extent,
    );

    let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("plane-uniform-layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<PlaneUniforms>() as u64),
            },
            count: None,
        }],
    });

    let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("plane-texture-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("plane-uniform-buffer"),
        contents: cast_slice(&[PlaneUniforms::zeroed()]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("plane-uniform-bind-group"),
        layout: &uniform_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("plane-texture-bind-group"),
        layout: &texture_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("plane-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(PLANE_SHADER_SOURCE)),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("plane-pipeline-layout"),
        bind_group_layouts: &[&uniform_layout, &texture_layout],
        push_constant_ranges: &[],
    });

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PlaneVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2],
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("plane-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "plane_vs_main",
            buffers: &[vertex_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "plane_fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..wgpu::PrimitiveState::default()
        },
        // Text sits just above the card face; test against the card but
        // leave depth untouched.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: MESH_DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    let (vertices, indices) = build_plane();
    let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("plane-vertex-buffer"),
        contents: cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("plane-index-buffer"),
        contents: cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    Ok(PlaneResources {
        pipeline,
        uniform_buffer,
        uniform_bind_group,
        texture_bind_group,
        buffers: PrimitiveBuffers {
            vertex,
            index,
            index_count: indices.len() as u32,
        },
        _texture: texture,
    })
}

pub(super) fn create_mesh_depth_texture(
    device: &wgpu::Device,
    size: PhysicalSize<u32>,
) -> (wgpu::Texture, wgpu::TextureView) {
    let extent = wgpu::Extent3d {
        width: size.width.max(1),
        height: size.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("mesh-depth-texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: MESH_DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
