//! Instanced 5×5×5 lattice of cubes moving in a wave.
//!
//! One uniform buffer holds every instance's model-view-projection matrix; the
//! shader indexes it with the instance index.

use std::borrow::Cow;

use crate::camera::Camera;
use crate::error::Result;
use crate::frame::{PassSetup, render_pass};
use crate::geometry;
use crate::gpu::GpuContext;
use crate::instance::InstanceBatch;
use crate::mesh::Mesh;
use crate::pipeline::{BindingSpec, DepthSpec, RenderPipelineBuilder, ShaderSources, VertexBufferSpec};
use crate::scheduler::{AnimationState, SchedulerHandle};
use crate::uniform::UniformBuffer;

use super::{SceneSetup, Scheduler};

/// Lattice size along each axis.
pub const GRID_SIZE: u32 = 5;
/// Cube edge relative to the lattice spacing.
const CUBE_SCALE: f32 = 0.5;

/// Grid shader with its uniform array sized for `instances`.
pub fn grid_shader(instances: u32) -> Cow<'static, str> {
    let source = include_str!("../shaders/instanced_grid.wgsl");
    Cow::Owned(source.replace("INSTANCE_COUNT", &instances.to_string()))
}

pub fn start(gpu: &GpuContext, setup: &SceneSetup<'_>, scheduler: &mut Scheduler) -> Result<SchedulerHandle> {
    let mut batch = InstanceBatch::new(GRID_SIZE, GRID_SIZE, GRID_SIZE);
    let layout = batch.uniform_layout()?;
    let instances = batch.instance_count();

    let pipeline = RenderPipelineBuilder::new("Grid Pipeline")
        .shaders(ShaderSources::single(grid_shader(instances)))
        .vertex_buffer(VertexBufferSpec::position())
        .vertex_buffer(VertexBufferSpec::color())
        .binding(BindingSpec::uniform(0, wgpu::ShaderStages::VERTEX, layout.size()))
        .cull_mode(Some(wgpu::Face::Back))
        .depth(DepthSpec::default())
        .build(&gpu.device, gpu.format())?;

    let mut cube = geometry::cube();
    for p in &mut cube.positions {
        *p = p.map(|c| c * CUBE_SCALE);
    }
    let mesh = Mesh::colored(&gpu.device, "Grid Cube", &cube);

    let mut uniforms = UniformBuffer::new(&gpu.device, layout);
    let bind_group = pipeline.bind_group(&gpu.device, vec![(0, uniforms.binding())])?;

    let view_projection = Camera::for_viewport(gpu.width(), gpu.height())
        .build()
        .view_projection;
    let pass = PassSetup {
        label: "Grid Pass",
        clear: setup.clear_color,
        depth: pipeline.uses_depth(),
    };

    let state = setup.animation();
    Ok(scheduler.start(state, move |gpu: &mut GpuContext, _state: &AnimationState| {
        batch.update();
        batch.write_into(uniforms.block_mut(), &view_projection)?;
        uniforms.flush(&gpu.queue);

        render_pass(gpu, pass, |rpass| {
            rpass.set_pipeline(pipeline.raw());
            rpass.set_bind_group(0, &bind_group, &[]);
            mesh.draw(rpass, instances);
        })
    }))
}
