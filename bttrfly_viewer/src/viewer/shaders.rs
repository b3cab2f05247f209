use bttrfly_card::scene::{LightKind, SceneLight};
use bttrfly_card::mesh::to_matrix_columns;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

pub(super) const MESH_SHADER_SOURCE: &str = r#"
struct Light {
    position: vec4<f32>,
    color: vec4<f32>,
    falloff: vec4<f32>,
};

struct MeshUniforms {
    view_projection: mat4x4<f32>,
    light_count: vec4<u32>,
    lights: array<Light, 8>,
};

@group(0) @binding(0)
var<uniform> uniforms: MeshUniforms;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn mesh_vs_main(input: VertexIn) -> VertexOutput {
    let model = mat4x4<f32>(input.model_0, input.model_1, input.model_2, input.model_3);
    let world = model * vec4<f32>(input.position, 1.0);
    var out: VertexOutput;
    out.position = uniforms.view_projection * world;
    out.world_position = world.xyz;
    out.normal = normalize((model * vec4<f32>(input.normal, 0.0)).xyz);
    out.color = input.color;
    return out;
}

@fragment
fn mesh_fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    var light = vec3<f32>(0.0, 0.0, 0.0);
    for (var i = 0u; i < uniforms.light_count.x; i = i + 1u) {
        let entry = uniforms.lights[i];
        let radiance = entry.color.rgb * entry.color.a;
        let kind = entry.position.w;
        if kind < 0.5 {
            light = light + radiance;
        } else if kind < 1.5 {
            let dir = normalize(entry.position.xyz);
            light = light + radiance * max(dot(normal, dir), 0.0);
        } else {
            let offset = entry.position.xyz - input.world_position;
            let dist = max(length(offset), 0.001);
            var attenuation = 1.0 / max(pow(dist, entry.falloff.y), 0.01);
            if entry.falloff.x > 0.0 {
                attenuation = attenuation * clamp(1.0 - dist / entry.falloff.x, 0.0, 1.0);
            }
            light = light + radiance * attenuation * max(dot(normal, offset / dist), 0.0);
        }
    }
    return vec4<f32>(input.color.rgb * light, input.color.a);
}
"#;

pub(super) const PLANE_SHADER_SOURCE: &str = r#"
struct PlaneUniforms {
    model_view_projection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: PlaneUniforms;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn plane_vs_main(input: VertexIn) -> VertexOutput {
    var out: VertexOutput;
    out.position = uniforms.model_view_projection * vec4<f32>(input.position, 1.0);
    out.uv = input.uv;
    return out;
}

@group(1) @binding(0)
var card_texture: texture_2d<f32>;
@group(1) @binding(1)
var card_sampler: sampler;

@fragment
fn plane_fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(card_texture, card_sampler, input.uv);
    if texel.a < 0.01 {
        discard;
    }
    return texel;
}
"#;

pub(super) const MAX_LIGHTS: usize = 8;

const LIGHT_AMBIENT: f32 = 0.0;
const LIGHT_DIRECTIONAL: f32 = 1.0;
const LIGHT_POINT: f32 = 2.0;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct MeshInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl MeshInstance {
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: to_matrix_columns(model),
            color,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(super) struct LightUniform {
    /// xyz position or direction, w light kind.
    pub position: [f32; 4],
    /// rgb colour, a intensity.
    pub color: [f32; 4],
    /// x cutoff distance (0 = none), y decay exponent.
    pub falloff: [f32; 4],
}

impl LightUniform {
    fn from_light(light: &SceneLight) -> Self {
        let (kind, falloff) = match light.kind {
            LightKind::Ambient => (LIGHT_AMBIENT, [0.0; 4]),
            LightKind::Directional => (LIGHT_DIRECTIONAL, [0.0; 4]),
            LightKind::Point { distance, decay } => (LIGHT_POINT, [distance, decay, 0.0, 0.0]),
        };
        let Vec3 { x, y, z } = light.position;
        let [r, g, b] = light.color;
        Self {
            position: [x, y, z, kind],
            color: [r, g, b, light.intensity],
            falloff,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct MeshUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub light_count: [u32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl MeshUniforms {
    /// Lights past `MAX_LIGHTS` are dropped.
    pub fn new<'a>(view_projection: Mat4, lights: impl IntoIterator<Item = &'a SceneLight>) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.view_projection = to_matrix_columns(view_projection);
        let mut count = 0usize;
        for (slot, light) in uniforms.lights.iter_mut().zip(lights) {
            *slot = LightUniform::from_light(light);
            count += 1;
        }
        uniforms.light_count = [count as u32, 0, 0, 0];
        uniforms
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct PlaneUniforms {
    pub model_view_projection: [[f32; 4]; 4],
}
