//! # Spinframe
//!
//! **Animated 3D primitives on wgpu, one frame loop at a time.**
//!
//! Spinframe renders a small catalogue of scenes (line segments, spinning cubes,
//! a lit sphere, an instanced lattice) on top of a handful of reusable pieces:
//!
//! - [`Transform`] composes scale, per-axis rotation and translation in a fixed order.
//! - [`Camera`] builds the perspective × look-at view-projection.
//! - [`UniformLayout`] names every byte region a shader reads, and
//!   [`UniformBlock`] refuses writes whose size disagrees with the region.
//! - [`RenderPipelineBuilder`] validates a declarative pipeline description
//!   before handing it to the device.
//! - [`FrameScheduler`] runs at most one cancellable animation loop.
//! - [`InstanceBatch`] keeps the model matrices of a 3D lattice and packs them
//!   for a single instanced draw.
//!
//! ## Quick Start
//!
//! ```no_run
//! use spinframe::{AppConfig, Demo, run};
//!
//! fn main() -> spinframe::Result<()> {
//!     run(AppConfig::new().title("Sphere").demo(Demo::Sphere))
//! }
//! ```
//!
//! Everything except the window and GPU context runs without a device, so the
//! frame loop can be driven from tests with any context type:
//!
//! ```
//! use spinframe::{AnimationState, FrameScheduler, FrameStatus, Tick, Vec3};
//!
//! let mut scheduler = FrameScheduler::<Vec<f32>>::new();
//! scheduler.start(AnimationState::new(Vec3::new(0.1, 0.0, 0.0)), |seen, state| {
//!     seen.push(state.rotation.x);
//!     Ok(FrameStatus::Presented)
//! });
//!
//! let mut seen = Vec::new();
//! assert_eq!(scheduler.tick(&mut seen).unwrap(), Tick::Drawn { frame: 1 });
//! assert_eq!(seen, vec![0.1]);
//! ```

mod app;
mod camera;
mod demos;
mod error;
mod frame;
mod geometry;
mod gpu;
mod input;
mod instance;
mod light;
mod logging;
mod mesh;
mod params;
mod pipeline;
mod scheduler;
mod texture;
mod transform;
mod uniform;

pub use app::{AppConfig, run};
pub use camera::{Camera, CameraInfo, DEFAULT_EYE, FOV_Y, ViewProjection, Z_FAR, Z_NEAR, view_projection};
pub use demos::{Demo, SceneSetup, Scheduler};
pub use error::{RenderError, Result};
pub use frame::{CLEAR_COLOR, FrameStatus, PassSetup, render_pass};
pub use geometry::{LinePoints, VertexData, cursor_to_ndc};
pub use gpu::{DepthTarget, GpuContext};
pub use input::{Control, Input, control_for_key};
pub use instance::{Instance, InstanceBatch, lattice_position};
pub use light::{LIGHT_STEP, OrbitLight, RotateAxis};
pub use logging::{LoggingConfig, init_logging};
pub use mesh::{Mesh, MeshBuilder, create_vertex_buffer};
pub use params::{InvalidInputPolicy, RateScale, SceneParams};
pub use pipeline::{
    BindingKind, BindingSpec, DEPTH_FORMAT, DepthSpec, RenderPipeline, RenderPipelineBuilder,
    ShaderSources, ShaderStage, VertexBufferSpec,
};
pub use scheduler::{AnimationState, Axis, FrameScheduler, SchedulerHandle, Tick};
pub use texture::{Texture, load_material};
pub use transform::{Transform, compose_model, normal_matrix};
pub use uniform::{
    FragmentUniforms, LightingParams, UniformBlock, UniformBuffer, UniformLayout, UniformRegion,
    UniformRole, VertexUniforms,
};

/// Vertex generators for the built-in shapes.
pub mod shapes {
    pub use crate::geometry::{cube, sphere, sphere_point, sphere_uv};
}

/// Rate and radius validation used by the scene parameters.
pub mod input_rules {
    pub use crate::params::{
        DEFAULT_RADIUS, DEFAULT_RATE, RADIUS_RANGE, RATE_INPUT_RANGE, parse_radius, parse_rate,
        rate_from_input, rate_from_track,
    };
}

// Re-export glam math types for convenience
pub use glam::{Mat4, UVec3, Vec2, Vec3};
