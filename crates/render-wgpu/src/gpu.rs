use crate::shaders;
use aviator_common::{Color, palette};
use aviator_scene::{Light, Mesh, MeshId, NodeKind, PerspectiveCamera, SceneGraph};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::ops::Range;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    sky_color: [f32; 4],
    ground_color: [f32; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
    ambient: [f32; 4],
    fog_color: [f32; 4],
    fog_range: [f32; 4],
}

impl Uniforms {
    /// Pack the camera, lights and fog. Hemisphere and ambient lights add up;
    /// the first directional light is the sun.
    pub(crate) fn from_scene(scene: &SceneGraph, camera: &PerspectiveCamera) -> Self {
        let mut sky = Vec3::ZERO;
        let mut ground = Vec3::ZERO;
        let mut ambient = Vec3::ZERO;
        let mut sun: Option<(Vec3, Vec3)> = None;

        let lin = |c: Color, k: f32| Vec3::from(c.to_linear().to_array()) * k;
        for light in &scene.lights {
            match *light {
                Light::Hemisphere {
                    sky: s,
                    ground: g,
                    intensity,
                } => {
                    sky += lin(s, intensity);
                    ground += lin(g, intensity);
                }
                Light::Directional {
                    color, intensity, ..
                } => {
                    if sun.is_none() {
                        let dir = light.direction().unwrap_or(Vec3::Y);
                        sun = Some((dir, lin(color, intensity)));
                    }
                }
                Light::Ambient { color, intensity } => ambient += lin(color, intensity),
            }
        }
        let (sun_dir, sun_color) = sun.unwrap_or((Vec3::Y, Vec3::ZERO));

        let (fog_color, fog_range) = match &scene.fog {
            Some(fog) => (
                fog.color.to_linear().with_alpha(1.0),
                [fog.near, fog.far, 1.0, 0.0],
            ),
            None => ([0.0; 4], [0.0, 1.0, 0.0, 0.0]),
        };

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            sky_color: sky.extend(0.0).to_array(),
            ground_color: ground.extend(0.0).to_array(),
            sun_dir: sun_dir.extend(0.0).to_array(),
            sun_color: sun_color.extend(0.0).to_array(),
            ambient: ambient.extend(0.0).to_array(),
            fog_color,
            fog_range,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }
}

/// A run of consecutive instances sharing one mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DrawBatch {
    pub mesh: MeshId,
    pub instances: Range<u32>,
    pub translucent: bool,
}

/// Flatten the scene into instance data: opaque nodes grouped by mesh, then
/// translucent nodes from farthest to nearest.
pub(crate) fn collect_instances(
    scene: &SceneGraph,
    eye: Vec3,
) -> (Vec<InstanceData>, Vec<DrawBatch>) {
    struct Item {
        mesh: MeshId,
        translucent: bool,
        distance: f32,
        data: InstanceData,
    }

    let mut items = Vec::new();
    scene.visit(|_, node, _, world| {
        let NodeKind::Mesh { mesh, material } = node.kind else {
            return;
        };
        let Some(material) = scene.material(material) else {
            return;
        };
        if material.opacity <= 0.0 {
            return;
        }
        items.push(Item {
            mesh,
            translucent: material.is_translucent(),
            distance: world.w_axis.truncate().distance(eye),
            data: InstanceData::new(
                world,
                material.color.to_linear().with_alpha(material.opacity),
            ),
        });
    });

    items.sort_by(|a, b| {
        a.translucent.cmp(&b.translucent).then_with(|| {
            if a.translucent {
                b.distance.total_cmp(&a.distance)
            } else {
                a.mesh.0.cmp(&b.mesh.0)
            }
        })
    });

    let mut batches: Vec<DrawBatch> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let i = i as u32;
        match batches.last_mut() {
            Some(b) if b.mesh == item.mesh && b.translucent == item.translucent => {
                b.instances.end = i + 1;
            }
            _ => batches.push(DrawBatch {
                mesh: item.mesh,
                instances: i..i + 1,
                translucent: item.translucent,
            }),
        }
    }

    (items.into_iter().map(|i| i.data).collect(), batches)
}

/// Vertex and index buffers for one scene mesh.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: usize,
    index_count: u32,
    revision: u64,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, id: usize, mesh: &Mesh) -> Self {
        let positions = vertex_data(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("mesh_{id}_vertices")),
            contents: bytemuck::cast_slice(&positions),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("mesh_{id}_indices")),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            vertex_count: mesh.vertex_count(),
            index_count: mesh.indices().len() as u32,
            revision: mesh.revision(),
        }
    }
}

fn vertex_data(mesh: &Mesh) -> Vec<[f32; 3]> {
    mesh.positions().iter().map(|p| p.to_array()).collect()
}

/// wgpu scene renderer: flat-shaded meshes, hemisphere + sun + ambient
/// lighting, linear fog.
pub struct WgpuRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let opaque_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "opaque_pipeline",
            wgpu::BlendState::REPLACE,
            true,
        );
        let translucent_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "translucent_pipeline",
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        let max_instances = 256u32;
        let instance_buffer = Self::create_instance_buffer(device, max_instances);
        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::info!(?surface_format, width, height, "wgpu renderer created");

        Self {
            opaque_pipeline,
            translucent_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: Vec::new(),
            instance_buffer,
            max_instances,
            depth_texture,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        label: &str,
        blend: wgpu::BlendState,
        depth_write_enabled: bool,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            1 => Float32x4,
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // The sea is seen from inside its cylinder, so both faces draw.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Upload new meshes and rewrite the vertex buffers of meshes whose
    /// positions changed since the last frame.
    fn sync_meshes(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &SceneGraph) {
        for (id, mesh) in scene.meshes().iter().enumerate() {
            match self.meshes.get_mut(id) {
                Some(gpu) if gpu.vertex_count == mesh.vertex_count() => {
                    if gpu.revision != mesh.revision() {
                        queue.write_buffer(
                            &gpu.vertex_buffer,
                            0,
                            bytemuck::cast_slice(&vertex_data(mesh)),
                        );
                        gpu.revision = mesh.revision();
                    }
                }
                Some(gpu) => *gpu = GpuMesh::upload(device, id, mesh),
                None => {
                    self.meshes.push(GpuMesh::upload(device, id, mesh));
                    tracing::trace!(id, vertices = mesh.vertex_count(), "mesh uploaded");
                }
            }
        }
    }

    /// Render one frame of the scene as seen from `camera`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
    ) {
        self.sync_meshes(device, queue, scene);
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::from_scene(scene, camera)),
        );

        let (instances, batches) = collect_instances(scene, camera.position);
        if instances.len() > self.max_instances as usize {
            self.max_instances = (instances.len() as u32).next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(device, self.max_instances);
            tracing::debug!(max_instances = self.max_instances, "instance buffer grown");
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let clear = scene
            .fog
            .map_or(palette::HAZE, |fog| fog.color)
            .to_linear();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            let mut translucent = None;
            for batch in &batches {
                let Some(gpu) = self.meshes.get(batch.mesh.0 as usize) else {
                    continue;
                };
                if gpu.index_count == 0 {
                    continue;
                }
                if translucent != Some(batch.translucent) {
                    pass.set_pipeline(if batch.translucent {
                        &self.translucent_pipeline
                    } else {
                        &self.opaque_pipeline
                    });
                    translucent = Some(batch.translucent);
                }
                pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu.index_count, 0, batch.instances.clone());
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_instance_buffer(device: &wgpu::Device, max_instances: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aviator_common::Transform;
    use aviator_scene::{Fog, Material};

    fn scene_with_glass() -> SceneGraph {
        let mut scene = SceneGraph::new();
        let cube = scene.insert_mesh(Mesh::cuboid(1.0, 1.0, 1.0));
        let slab = scene.insert_mesh(Mesh::cuboid(4.0, 1.0, 4.0));
        let solid = scene.insert_material(Material::flat(palette::RED));
        let glass = scene.insert_material(Material::flat(palette::WHITE).with_opacity(0.3));
        let near = Transform::from_position(Vec3::new(0.0, 0.0, -10.0));
        let far = Transform::from_position(Vec3::new(0.0, 0.0, -50.0));
        for (name, mesh, mat, t) in [
            ("glass_near", cube, glass, near),
            ("a", cube, solid, Transform::default()),
            ("slab", slab, solid, Transform::default()),
            ("b", cube, solid, Transform::default()),
            ("glass_far", cube, glass, far),
        ] {
            let id = scene.add_mesh(name, mesh, mat, t).unwrap();
            scene.add_to_root(id).unwrap();
        }
        scene
    }

    #[test]
    fn opaque_batches_by_mesh_before_translucent() {
        let scene = scene_with_glass();
        let (instances, batches) = collect_instances(&scene, Vec3::ZERO);
        assert_eq!(instances.len(), 5);
        assert_eq!(
            batches,
            vec![
                DrawBatch {
                    mesh: MeshId(0),
                    instances: 0..2,
                    translucent: false,
                },
                DrawBatch {
                    mesh: MeshId(1),
                    instances: 2..3,
                    translucent: false,
                },
                DrawBatch {
                    mesh: MeshId(0),
                    instances: 3..5,
                    translucent: true,
                },
            ]
        );
    }

    #[test]
    fn translucent_instances_sorted_far_to_near() {
        let scene = scene_with_glass();
        let (instances, _) = collect_instances(&scene, Vec3::ZERO);
        assert_eq!(instances[3].model_3[2], -50.0);
        assert_eq!(instances[4].model_3[2], -10.0);
        assert!((instances[4].color[3] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn detached_nodes_are_not_drawn() {
        let mut scene = SceneGraph::new();
        let mesh = scene.insert_mesh(Mesh::cuboid(1.0, 1.0, 1.0));
        let mat = scene.insert_material(Material::flat(palette::RED));
        let loose = scene.add_mesh("loose", mesh, mat, Transform::default());
        assert!(loose.is_ok());
        let (instances, batches) = collect_instances(&scene, Vec3::ZERO);
        assert!(instances.is_empty());
        assert!(batches.is_empty());
    }

    #[test]
    fn uniforms_pack_lights_and_fog() {
        let mut scene = SceneGraph::new();
        scene.add_light(Light::Hemisphere {
            sky: Color::WHITE,
            ground: Color::BLACK,
            intensity: 0.5,
        });
        scene.add_light(Light::Directional {
            position: Vec3::new(0.0, 10.0, 0.0),
            color: Color::WHITE,
            intensity: 0.9,
        });
        scene.add_light(Light::Ambient {
            color: Color::WHITE,
            intensity: 0.25,
        });
        scene.fog = Some(Fog {
            color: Color::WHITE,
            near: 100.0,
            far: 950.0,
        });
        let u = Uniforms::from_scene(&scene, &PerspectiveCamera::default());
        assert!((u.sky_color[0] - 0.5).abs() < 1e-6);
        assert_eq!(u.ground_color[1], 0.0);
        assert_eq!(&u.sun_dir[..3], &[0.0, 1.0, 0.0]);
        assert!((u.sun_color[2] - 0.9).abs() < 1e-6);
        assert!((u.ambient[0] - 0.25).abs() < 1e-6);
        assert_eq!(u.fog_range, [100.0, 950.0, 1.0, 0.0]);
        assert_eq!(u.camera_pos, [0.0, 100.0, 200.0, 1.0]);
    }

    #[test]
    fn no_fog_disables_blend() {
        let u = Uniforms::from_scene(&SceneGraph::new(), &PerspectiveCamera::default());
        assert_eq!(u.fog_range[2], 0.0);
        assert_eq!(u.sun_color, [0.0; 4]);
    }
}
