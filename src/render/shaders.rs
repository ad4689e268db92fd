//! WGSL sources

/// Shared frame bindings: camera plus lights.
const FRAME_BINDINGS: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    inv_sky_view_proj: mat4x4<f32>,
    position: vec4<f32>,
}

struct DirectionalLight {
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
}

struct PointLight {
    position: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    // constant, linear, quadratic
    attenuation: vec4<f32>,
}

struct Lights {
    sun: DirectionalLight,
    points: array<PointLight, 4>,
    // x: shininess, y: point light count
    params: vec4<f32>,
}

@group(0) @binding(0) var<uniform> camera: Camera;
@group(0) @binding(1) var<uniform> lights: Lights;
"#;

const MESH_BODY: &str = r#"
struct Model {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
}

@group(1) @binding(0) var<uniform> object: Model;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = object.model * vec4<f32>(in.position, 1.0);
    out.clip_position = camera.view_proj * world;
    out.world_position = world.xyz;
    out.normal = normalize((object.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz);
    out.uv = in.uv;
    return out;
}

fn sun_light(light: DirectionalLight, normal: vec3<f32>, view_dir: vec3<f32>, shininess: f32) -> vec3<f32> {
    let light_dir = normalize(-light.direction.xyz);
    let diff = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), shininess);
    return light.ambient.rgb + light.diffuse.rgb * diff + light.specular.rgb * spec;
}

fn point_light(light: PointLight, normal: vec3<f32>, position: vec3<f32>, view_dir: vec3<f32>, shininess: f32) -> vec3<f32> {
    let offset = light.position.xyz - position;
    let distance = length(offset);
    let light_dir = offset / max(distance, 0.0001);
    let diff = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), shininess);
    let k = light.attenuation;
    let attenuation = 1.0 / (k.x + k.y * distance + k.z * distance * distance);
    return (light.ambient.rgb + light.diffuse.rgb * diff + light.specular.rgb * spec) * attenuation;
}

@fragment
fn fs_lit(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.normal);
    let view_dir = normalize(camera.position.xyz - in.world_position);
    let shininess = lights.params.x;

    var light = sun_light(lights.sun, normal, view_dir, shininess);
    let count = u32(lights.params.y);
    for (var i = 0u; i < count; i = i + 1u) {
        light += point_light(lights.points[i], normal, in.world_position, view_dir, shininess);
    }
    return vec4<f32>(object.color.rgb * light, object.color.a);
}

@fragment
fn fs_unlit(in: VertexOutput) -> @location(0) vec4<f32> {
    return object.color;
}
"#;

const SKYBOX_BODY: &str = r#"
@group(1) @binding(0) var sky_texture: texture_cube<f32>;
@group(1) @binding(1) var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
}

// One oversized triangle at the far plane covers the screen.
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> SkyOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    let ndc = uv * 2.0 - 1.0;
    var out: SkyOutput;
    out.clip_position = vec4<f32>(ndc, 1.0, 1.0);
    out.ndc = ndc;
    return out;
}

@fragment
fn fs_main(in: SkyOutput) -> @location(0) vec4<f32> {
    let far = camera.inv_sky_view_proj * vec4<f32>(in.ndc, 1.0, 1.0);
    let dir = normalize(far.xyz / far.w);
    return textureSample(sky_texture, sky_sampler, dir);
}
"#;

const LINES_BODY: &str = r#"
struct LineInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
}

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(in: LineInput) -> LineOutput {
    var out: LineOutput;
    out.clip_position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Lit and unlit mesh shader; fragment entry points `fs_lit` and `fs_unlit`
pub fn mesh() -> String {
    format!("{FRAME_BINDINGS}{MESH_BODY}")
}

pub fn skybox() -> String {
    format!("{FRAME_BINDINGS}{SKYBOX_BODY}")
}

pub fn lines() -> String {
    format!("{FRAME_BINDINGS}{LINES_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shader_carries_frame_bindings() {
        for source in [mesh(), skybox(), lines()] {
            assert!(source.contains("var<uniform> camera"));
            assert!(source.contains("fn vs_main"));
        }
        assert!(mesh().contains("fn fs_lit") && mesh().contains("fn fs_unlit"));
    }
}
