//! The demo scenes.
//!
//! Each scene builds its GPU resources once, then hands a draw closure to the
//! [`FrameScheduler`]. Restarting a scene (new parameters, a resize) builds
//! everything again and replaces the running loop.

pub mod cube;
pub mod grid;
pub mod lines;
pub mod sphere;
pub mod textured;

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::camera::ViewProjection;
use crate::error::Result;
use crate::geometry::LinePoints;
use crate::gpu::GpuContext;
use crate::params::SceneParams;
use crate::scheduler::{AnimationState, FrameScheduler, SchedulerHandle};
use crate::uniform::{UniformBlock, UniformBuffer, UniformLayout, UniformRole};

/// Scheduler driving scenes against the window's GPU context.
pub type Scheduler = FrameScheduler<GpuContext>;

/// Available scenes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Demo {
    /// Line segments between clicked points.
    Lines,
    /// Vertex-colored spinning cube.
    #[default]
    Cube,
    /// Lit, textured spinning cube.
    Textured,
    /// Lit, textured sphere with an orbiting light.
    Sphere,
    /// Instanced lattice of cubes moving in a wave.
    Grid,
}

impl Demo {
    pub const ALL: [Demo; 5] = [Demo::Lines, Demo::Cube, Demo::Textured, Demo::Sphere, Demo::Grid];

    pub fn name(self) -> &'static str {
        match self {
            Demo::Lines => "lines",
            Demo::Cube => "cube",
            Demo::Textured => "textured",
            Demo::Sphere => "sphere",
            Demo::Grid => "grid",
        }
    }

    /// Builds the scene and starts its loop, replacing any running one.
    pub fn start(
        self,
        gpu: &GpuContext,
        setup: &SceneSetup<'_>,
        scheduler: &mut Scheduler,
    ) -> Result<SchedulerHandle> {
        log::info!("starting {self} scene");
        match self {
            Demo::Lines => lines::start(gpu, setup, scheduler),
            Demo::Cube => cube::start(gpu, setup, scheduler),
            Demo::Textured => textured::start(gpu, setup, scheduler),
            Demo::Sphere => sphere::start(gpu, setup, scheduler),
            Demo::Grid => grid::start(gpu, setup, scheduler),
        }
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Demo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Demo::ALL
            .into_iter()
            .find(|demo| demo.name() == s.trim())
            .ok_or_else(|| {
                let names: Vec<_> = Demo::ALL.iter().map(|d| d.name()).collect();
                format!("unknown demo '{s}', expected one of {}", names.join(", "))
            })
    }
}

/// Inputs a scene is built from.
#[derive(Clone, Copy, Debug)]
pub struct SceneSetup<'a> {
    pub params: &'a SceneParams,
    pub lines: &'a LinePoints,
    pub clear_color: wgpu::Color,
    /// Rotation the new loop starts from; zero for a fresh scene.
    pub rotation: Vec3,
}

impl SceneSetup<'_> {
    /// Animation state of a loop started from this setup.
    pub fn animation(&self) -> AnimationState {
        AnimationState {
            rotation: self.rotation,
            rate: self.params.rate,
        }
    }
}

/// First-frame contents of the lit scenes' vertex and fragment blocks.
///
/// The view-projection and eye are written once; the light starts at the eye.
fn lit_blocks(vp: &ViewProjection) -> Result<(UniformBlock, UniformBlock)> {
    let mut vertex = UniformBlock::new(UniformLayout::vertex_lit());
    let mut fragment = UniformBlock::new(UniformLayout::fragment_lit());

    vertex.write_mat4(UniformRole::ViewProjection, &vp.view_projection)?;
    fragment.write_vec3(UniformRole::LightPosition, vp.camera.eye)?;
    fragment.write_vec3(UniformRole::EyePosition, vp.camera.eye)?;

    Ok((vertex, fragment))
}

/// Vertex and fragment uniform buffers of the lit scenes.
struct LitUniforms {
    vertex: UniformBuffer,
    fragment: UniformBuffer,
}

impl LitUniforms {
    fn new(device: &wgpu::Device, vp: &ViewProjection) -> Result<Self> {
        let (vertex, fragment) = lit_blocks(vp)?;
        Ok(Self {
            vertex: UniformBuffer::from_block(device, vertex),
            fragment: UniformBuffer::from_block(device, fragment),
        })
    }

    /// Writes the model and its normal matrix.
    fn set_model(&mut self, model: &glam::Mat4) -> Result<()> {
        self.vertex.write_mat4(UniformRole::Model, model)?;
        self.vertex
            .write_mat4(UniformRole::Normal, &crate::transform::normal_matrix(model))
    }

    fn set_light(&mut self, position: Vec3) -> Result<()> {
        self.fragment.write_vec3(UniformRole::LightPosition, position)
    }

    fn flush(&mut self, queue: &wgpu::Queue) {
        self.vertex.flush(queue);
        self.fragment.flush(queue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn demo_names_round_trip() {
        for demo in Demo::ALL {
            assert_eq!(demo.name().parse::<Demo>(), Ok(demo));
        }
        assert_eq!(Demo::default(), Demo::Cube);
    }

    #[test]
    fn lit_blocks_start_the_light_at_the_eye() {
        let vp = Camera::new(1.0).build();
        let (vertex, fragment) = lit_blocks(&vp).unwrap();

        assert_eq!(vertex.read_mat4(UniformRole::ViewProjection).unwrap(), vp.view_projection);
        assert!(vertex.read(UniformRole::Model).unwrap().iter().all(|b| *b == 0));

        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(fragment.as_bytes());
        assert_eq!(floats, [2.0, 2.0, 4.0, 1.0, 2.0, 2.0, 4.0, 1.0]);
    }

    #[test]
    fn animation_resumes_from_setup_rotation() {
        let params = SceneParams {
            rate: Vec3::new(0.01, 0.0, 0.02),
            ..SceneParams::default()
        };
        let lines = LinePoints::default();
        let setup = SceneSetup {
            params: &params,
            lines: &lines,
            clear_color: wgpu::Color::WHITE,
            rotation: Vec3::new(1.0, 2.0, 3.0),
        };

        let state = setup.animation();
        assert_eq!(state.rotation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.rate, params.rate);
    }

    #[test]
    fn unknown_demo_lists_choices() {
        let err = "teapot".parse::<Demo>().unwrap_err();
        assert!(err.contains("lines, cube, textured, sphere, grid"), "{err}");
    }
}
