//! Lit, textured sphere with a light orbiting the origin.
//!
//! Bindings: vertex uniforms at 0, fragment uniforms at 1, lighting parameters
//! (36 B) at 2, sampler at 3, texture at 4.

use crate::camera::Camera;
use crate::error::{RenderError, Result};
use crate::frame::{PassSetup, render_pass};
use crate::geometry;
use crate::gpu::GpuContext;
use crate::light::OrbitLight;
use crate::mesh::Mesh;
use crate::pipeline::{BindingSpec, DepthSpec, RenderPipelineBuilder, ShaderSources, VertexBufferSpec};
use crate::scheduler::{AnimationState, SchedulerHandle};
use crate::texture::load_material;
use crate::transform::Transform;
use crate::uniform::{LightingParams, UniformBuffer, UniformLayout, UniformRole};

use super::{LitUniforms, SceneSetup, Scheduler};

/// Rings of latitude.
pub const SPHERE_U: u32 = 30;
/// Meridians.
pub const SPHERE_V: u32 = 20;

pub fn start(gpu: &GpuContext, setup: &SceneSetup<'_>, scheduler: &mut Scheduler) -> Result<SchedulerHandle> {
    let params = setup.params;
    let data = geometry::sphere(params.radius, SPHERE_U, SPHERE_V).ok_or_else(|| {
        RenderError::InvalidInput {
            field: "radius",
            value: params.radius.to_string(),
        }
    })?;

    let pipeline = RenderPipelineBuilder::new("Sphere Pipeline")
        .shaders(ShaderSources::single(include_str!("../shaders/sphere_lit.wgsl")))
        .vertex_buffer(VertexBufferSpec::position())
        .vertex_buffer(VertexBufferSpec::normal())
        .vertex_buffer(VertexBufferSpec::uv())
        .binding(BindingSpec::uniform(0, wgpu::ShaderStages::VERTEX, 192))
        .binding(BindingSpec::uniform(1, wgpu::ShaderStages::FRAGMENT, 32))
        .binding(BindingSpec::uniform(2, wgpu::ShaderStages::FRAGMENT, 36))
        .binding(BindingSpec::sampler(3))
        .binding(BindingSpec::texture(4))
        .depth(DepthSpec::default())
        .build(&gpu.device, gpu.format())?;

    let mesh = Mesh::lit(&gpu.device, "Sphere", &data);
    let texture = load_material(gpu, params.material.as_deref());

    let vp = Camera::for_viewport(gpu.width(), gpu.height()).build();
    let mut uniforms = LitUniforms::new(&gpu.device, &vp)?;
    let mut lighting = UniformBuffer::new(&gpu.device, UniformLayout::lighting());
    lighting.write_pod(UniformRole::LightingParams, &LightingParams::default())?;
    lighting.flush(&gpu.queue);

    let bind_group = pipeline.bind_group(
        &gpu.device,
        vec![
            (0, uniforms.vertex.binding()),
            (1, uniforms.fragment.binding()),
            (2, lighting.binding()),
            (3, wgpu::BindingResource::Sampler(texture.sampler())),
            (4, wgpu::BindingResource::TextureView(texture.view())),
        ],
    )?;

    let mut light = OrbitLight::new(vp.camera.eye, params.light_axis);
    let pass = PassSetup {
        label: "Sphere Pass",
        clear: setup.clear_color,
        depth: pipeline.uses_depth(),
    };
    log::debug!(
        "sphere radius {} with {} vertices, light orbiting {}",
        params.radius,
        mesh.vertex_count(),
        light.axis
    );

    let state = setup.animation();
    Ok(scheduler.start(state, move |gpu: &mut GpuContext, state: &AnimationState| {
        uniforms.set_light(light.advance())?;
        uniforms.set_model(&Transform::from_rotation(state.rotation).matrix())?;
        uniforms.flush(&gpu.queue);

        render_pass(gpu, pass, |rpass| {
            rpass.set_pipeline(pipeline.raw());
            rpass.set_bind_group(0, &bind_group, &[]);
            mesh.draw(rpass, 1);
        })
    }))
}
