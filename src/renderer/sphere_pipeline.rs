//! Balloon renderer
//!
//! One full-screen triangle; the fragment shader casts a camera ray per
//! pixel and intersects it with every sphere in the scene, so balloons need
//! no meshes or vertex buffers. Sphere data is re-uploaded every frame from
//! the CPU [`SceneGraph`].

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::error::StartupError;
use crate::rgb_hex_to_rgba;
use crate::scene::SceneGraph;

/// Spheres the shader can hold (two per balloon)
pub const MAX_SPHERES: usize = 256;

/// Key light direction
const LIGHT_DIR: Vec3 = Vec3::new(5.0, 10.0, 7.5);

// Layouts below are mirrored in sphere_shader.wgsl

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    inv_view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    light_dir: [f32; 4],
    resolution: [f32; 2],
    sphere_count: u32,
    _pad: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GpuSphere {
    center: [f32; 3],
    radius: f32,
    color: [f32; 4],
}

/// Pack the scene's renderables for upload, truncating past `MAX_SPHERES`
fn pack_spheres(scene: &SceneGraph) -> (Vec<GpuSphere>, u32) {
    let mut spheres = vec![GpuSphere::zeroed(); MAX_SPHERES];
    let mut count = 0u32;
    for (slot, (_, r)) in spheres.iter_mut().zip(scene.iter()) {
        *slot = GpuSphere {
            center: r.position.to_array(),
            radius: r.radius,
            color: rgb_hex_to_rgba(r.color),
        };
        count += 1;
    }
    (spheres, count)
}

fn frame_uniforms(scene: &SceneGraph, size: (u32, u32), sphere_count: u32) -> FrameUniforms {
    let camera = scene.camera();
    FrameUniforms {
        inv_view_proj: camera.view_projection().inverse().to_cols_array_2d(),
        eye: camera.position.extend(1.0).to_array(),
        light_dir: LIGHT_DIR.normalize().extend(0.0).to_array(),
        resolution: [size.0 as f32, size.1 as f32],
        sphere_count,
        _pad: 0,
    }
}

/// Fragment-stage uniform buffer slot
fn uniform_slot(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// GPU half of the browser scene
pub struct SphereRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    spheres: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Surface size in device pixels
    pub size: (u32, u32),
}

impl SphereRenderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, StartupError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("balloon_device"),
                required_features: wgpu::Features::empty(),
                // WebGL2 fallback has to work too
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(|e| StartupError::Device(e.to_string()))?;

        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| StartupError::Surface("surface reports no formats".to_string()))?;
        log::info!("Surface format: {:?}", format);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        // Uniform, not storage: WebGL2 has no storage buffers
        let spheres = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("spheres"),
            size: (std::mem::size_of::<GpuSphere>() * MAX_SPHERES) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("balloon_bind_group_layout"),
            entries: &[uniform_slot(0), uniform_slot(1)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("balloon_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: spheres.as_entire_binding(),
                },
            ],
        });

        let pipeline = Self::create_pipeline(&device, &layout, format);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            pipeline,
            uniforms,
            spheres,
            bind_group,
            size: (width, height),
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sphere_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sphere_shader.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("balloon_pipeline_layout"),
            bind_group_layouts: &[layout],
            immediate_size: 0,
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("balloon_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(format.into())],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    /// Reconfigure the surface; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn render(&mut self, scene: &SceneGraph) -> Result<(), wgpu::SurfaceError> {
        if scene.len() > MAX_SPHERES {
            log::warn!("{} spheres in scene, drawing the first {}", scene.len(), MAX_SPHERES);
        }
        let (spheres, count) = pack_spheres(scene);
        self.queue
            .write_buffer(&self.spheres, 0, bytemuck::cast_slice(&spheres));
        self.queue.write_buffer(
            &self.uniforms,
            0,
            bytemuck::bytes_of(&frame_uniforms(scene, self.size, count)),
        );

        let frame = self.surface.get_current_texture()?;
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("balloon_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("balloon_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use crate::scene::{Renderable, Scene};

    #[test]
    fn test_gpu_layouts_match_shader() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 112);
        assert_eq!(std::mem::size_of::<GpuSphere>(), 32);
        // WebGL2 uniform block limit
        assert!(std::mem::size_of::<GpuSphere>() * MAX_SPHERES <= 16 * 1024);
    }

    #[test]
    fn test_pack_spheres() {
        let mut scene = SceneGraph::new(Viewport::new(800.0, 600.0));
        scene.add_renderable(Renderable {
            position: Vec3::new(1.0, 2.0, 3.0),
            radius: 0.5,
            color: 0x0000ff,
        });

        let (spheres, count) = pack_spheres(&scene);
        assert_eq!(count, 1);
        assert_eq!(spheres.len(), MAX_SPHERES);
        assert_eq!(spheres[0].center, [1.0, 2.0, 3.0]);
        assert_eq!(spheres[0].radius, 0.5);
        assert_eq!(spheres[0].color, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_pack_spheres_truncates() {
        let mut scene = SceneGraph::new(Viewport::new(800.0, 600.0));
        for i in 0..MAX_SPHERES + 10 {
            scene.add_renderable(Renderable {
                position: Vec3::new(i as f32, 0.0, 0.0),
                radius: 0.5,
                color: 0xff0000,
            });
        }
        let (spheres, count) = pack_spheres(&scene);
        assert_eq!(count as usize, MAX_SPHERES);
        assert_eq!(spheres.len(), MAX_SPHERES);
    }

    #[test]
    fn test_frame_uniforms_carry_camera() {
        let scene = SceneGraph::new(Viewport::new(800.0, 600.0));
        let u = frame_uniforms(&scene, (1600, 1200), 4);
        assert_eq!(u.eye, [0.0, 0.0, 15.0, 1.0]);
        assert_eq!(u.resolution, [1600.0, 1200.0]);
        assert_eq!(u.sphere_count, 4);
        let l = Vec3::new(u.light_dir[0], u.light_dir[1], u.light_dir[2]);
        assert!((l.length() - 1.0).abs() < 1e-5);
    }
}
