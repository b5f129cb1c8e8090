//! One render pass per tick.
//!
//! [`render_pass`] acquires the next surface texture, clears it (and the depth
//! target when asked), lets the caller record draw commands, then submits and
//! presents. A lost or outdated surface is reconfigured and the frame skipped.

use crate::error::Result;
use crate::gpu::GpuContext;

/// Background of the 3D scenes, a pale cream.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 0.878,
    a: 1.0,
};

/// Whether a frame reached the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The surface was unavailable this tick; nothing was drawn.
    Skipped,
}

/// How the pass starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassSetup {
    pub label: &'static str,
    pub clear: wgpu::Color,
    /// Attach and clear the depth target to 1.0.
    pub depth: bool,
}

/// Records and presents one frame.
pub fn render_pass(
    gpu: &mut GpuContext,
    setup: PassSetup,
    record: impl FnOnce(&mut wgpu::RenderPass<'_>),
) -> Result<FrameStatus> {
    let output = match gpu.surface.get_current_texture() {
        Ok(output) => output,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            log::warn!("surface lost or outdated, reconfiguring");
            gpu.reconfigure();
            return Ok(FrameStatus::Skipped);
        }
        Err(wgpu::SurfaceError::Timeout) => {
            log::debug!("surface acquire timed out, skipping frame");
            return Ok(FrameStatus::Skipped);
        }
        Err(err) => return Err(err.into()),
    };

    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(setup.label),
        });

    {
        let depth_stencil_attachment =
            setup
                .depth
                .then(|| wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(setup.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(setup.clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        record(&mut pass);
    }

    gpu.queue.submit(std::iter::once(encoder.finish()));
    output.present();
    Ok(FrameStatus::Presented)
}
