//! Lit, textured cube.
//!
//! Bindings: vertex uniforms (192 B) at 0, fragment uniforms (32 B) at 1,
//! sampler at 2, texture at 3. The light sits at the eye.

use crate::camera::Camera;
use crate::error::Result;
use crate::frame::{PassSetup, render_pass};
use crate::geometry;
use crate::gpu::GpuContext;
use crate::mesh::Mesh;
use crate::pipeline::{BindingSpec, DepthSpec, RenderPipelineBuilder, ShaderSources, VertexBufferSpec};
use crate::scheduler::{AnimationState, SchedulerHandle};
use crate::texture::load_material;
use crate::transform::Transform;

use super::{LitUniforms, SceneSetup, Scheduler};

pub fn start(gpu: &GpuContext, setup: &SceneSetup<'_>, scheduler: &mut Scheduler) -> Result<SchedulerHandle> {
    let pipeline = RenderPipelineBuilder::new("Textured Pipeline")
        .shaders(ShaderSources::single(include_str!("../shaders/textured_lit.wgsl")))
        .vertex_buffer(VertexBufferSpec::position())
        .vertex_buffer(VertexBufferSpec::normal())
        .vertex_buffer(VertexBufferSpec::uv())
        .binding(BindingSpec::uniform(0, wgpu::ShaderStages::VERTEX, 192))
        .binding(BindingSpec::uniform(1, wgpu::ShaderStages::FRAGMENT, 32))
        .binding(BindingSpec::sampler(2))
        .binding(BindingSpec::texture(3))
        .cull_mode(Some(wgpu::Face::Back))
        .depth(DepthSpec::default())
        .build(&gpu.device, gpu.format())?;

    let mesh = Mesh::lit(&gpu.device, "Textured Cube", &geometry::cube());
    let texture = load_material(gpu, setup.params.material.as_deref());

    let vp = Camera::for_viewport(gpu.width(), gpu.height()).build();
    let mut uniforms = LitUniforms::new(&gpu.device, &vp)?;
    let bind_group = pipeline.bind_group(
        &gpu.device,
        vec![
            (0, uniforms.vertex.binding()),
            (1, uniforms.fragment.binding()),
            (2, wgpu::BindingResource::Sampler(texture.sampler())),
            (3, wgpu::BindingResource::TextureView(texture.view())),
        ],
    )?;

    let pass = PassSetup {
        label: "Textured Pass",
        clear: setup.clear_color,
        depth: pipeline.uses_depth(),
    };

    let state = setup.animation();
    Ok(scheduler.start(state, move |gpu: &mut GpuContext, state: &AnimationState| {
        uniforms.set_model(&Transform::from_rotation(state.rotation).matrix())?;
        uniforms.flush(&gpu.queue);

        render_pass(gpu, pass, |rpass| {
            rpass.set_pipeline(pipeline.raw());
            rpass.set_bind_group(0, &bind_group, &[]);
            mesh.draw(rpass, 1);
        })
    }))
}
