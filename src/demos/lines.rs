//! Line segments in normalized device coordinates.
//!
//! Consecutive points pair up into segments. Nothing animates; the scene is
//! redrawn as-is every tick and rebuilt when a point is added.

use crate::error::Result;
use crate::frame::{PassSetup, render_pass};
use crate::gpu::GpuContext;
use crate::mesh::Mesh;
use crate::pipeline::{RenderPipelineBuilder, ShaderSources, VertexBufferSpec};
use crate::scheduler::{AnimationState, SchedulerHandle};

use super::{SceneSetup, Scheduler};

pub fn start(gpu: &GpuContext, setup: &SceneSetup<'_>, scheduler: &mut Scheduler) -> Result<SchedulerHandle> {
    let pipeline = RenderPipelineBuilder::new("Line Pipeline")
        .shaders(ShaderSources::single(include_str!("../shaders/line.wgsl")))
        .vertex_buffer(VertexBufferSpec::position_2d())
        .topology(wgpu::PrimitiveTopology::LineList)
        .build(&gpu.device, gpu.format())?;

    let positions = setup.lines.positions();
    let mesh = Mesh::builder("Lines")
        .stream(&positions)
        .build(&gpu.device, positions.len() as u32);
    log::debug!("{} line segments", setup.lines.segment_count());

    let pass = PassSetup {
        label: "Line Pass",
        clear: wgpu::Color::WHITE,
        depth: pipeline.uses_depth(),
    };

    Ok(scheduler.start(AnimationState::default(), move |gpu: &mut GpuContext, _: &AnimationState| {
        render_pass(gpu, pass, |rpass| {
            rpass.set_pipeline(pipeline.raw());
            mesh.draw(rpass, 1);
        })
    }))
}
