//! Vertex-colored cube spinning at the configured rate.
//!
//! With a zero rate the cube is drawn unchanged every tick.

use crate::camera::Camera;
use crate::error::Result;
use crate::frame::{PassSetup, render_pass};
use crate::geometry;
use crate::gpu::GpuContext;
use crate::mesh::Mesh;
use crate::pipeline::{BindingSpec, DepthSpec, RenderPipelineBuilder, ShaderSources, VertexBufferSpec};
use crate::scheduler::{AnimationState, SchedulerHandle};
use crate::transform::Transform;
use crate::uniform::{MAT4_SIZE, UniformBuffer, UniformLayout, UniformRole};

use super::{SceneSetup, Scheduler};

pub fn start(gpu: &GpuContext, setup: &SceneSetup<'_>, scheduler: &mut Scheduler) -> Result<SchedulerHandle> {
    let pipeline = RenderPipelineBuilder::new("Cube Pipeline")
        .shaders(ShaderSources::single(include_str!("../shaders/color_cube.wgsl")))
        .vertex_buffer(VertexBufferSpec::position())
        .vertex_buffer(VertexBufferSpec::color())
        .binding(BindingSpec::uniform(0, wgpu::ShaderStages::VERTEX, MAT4_SIZE))
        .cull_mode(Some(wgpu::Face::Back))
        .depth(DepthSpec::default())
        .build(&gpu.device, gpu.format())?;

    let mesh = Mesh::colored(&gpu.device, "Cube", &geometry::cube());
    let mut uniforms = UniformBuffer::new(&gpu.device, UniformLayout::mvp());
    let bind_group = pipeline.bind_group(&gpu.device, vec![(0, uniforms.binding())])?;

    let view_projection = Camera::for_viewport(gpu.width(), gpu.height())
        .build()
        .view_projection;
    let pass = PassSetup {
        label: "Cube Pass",
        clear: setup.clear_color,
        depth: pipeline.uses_depth(),
    };

    let state = setup.animation();
    Ok(scheduler.start(state, move |gpu: &mut GpuContext, state: &AnimationState| {
        let model = Transform::from_rotation(state.rotation).matrix();
        uniforms.write_mat4(UniformRole::Mvp, &(view_projection * model))?;
        uniforms.flush(&gpu.queue);

        render_pass(gpu, pass, |rpass| {
            rpass.set_pipeline(pipeline.raw());
            rpass.set_bind_group(0, &bind_group, &[]);
            mesh.draw(rpass, 1);
        })
    }))
}
