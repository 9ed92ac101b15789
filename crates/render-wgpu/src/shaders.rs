/// WGSL shader for flat-shaded, instanced scene meshes.
///
/// Face normals come from screen-space derivatives of the world position, so
/// vertices carry a position only and shared corners still shade per face.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    sky_color: vec4<f32>,
    ground_color: vec4<f32>,
    sun_dir: vec4<f32>,
    sun_color: vec4<f32>,
    ambient: vec4<f32>,
    fog_color: vec4<f32>,
    // x = near, y = far, z = 1 when fog is enabled
    fog_range: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
};

struct InstanceInput {
    @location(1) model_0: vec4<f32>,
    @location(2) model_1: vec4<f32>,
    @location(3) model_2: vec4<f32>,
    @location(4) model_3: vec4<f32>,
    @location(5) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Framebuffer y runs downward, so this order yields the camera-facing normal.
    let n = normalize(cross(dpdy(in.world_pos), dpdx(in.world_pos)));

    let hemi = mix(uniforms.ground_color.rgb, uniforms.sky_color.rgb, n.y * 0.5 + 0.5);
    let sun = max(dot(n, uniforms.sun_dir.xyz), 0.0) * uniforms.sun_color.rgb;
    let lit = in.color.rgb * (hemi + sun + uniforms.ambient.rgb);

    let dist = length(in.world_pos - uniforms.camera_pos.xyz);
    let span = max(uniforms.fog_range.y - uniforms.fog_range.x, 0.0001);
    let fog = clamp((dist - uniforms.fog_range.x) / span, 0.0, 1.0) * uniforms.fog_range.z;

    return vec4<f32>(mix(lit, uniforms.fog_color.rgb, fog), in.color.a);
}
"#;
