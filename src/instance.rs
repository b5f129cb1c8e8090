//! Instanced lattice of model matrices.
//!
//! An [`InstanceBatch`] places `nx × ny × nz` copies of one mesh on a 3D grid
//! centred on the X/Y origin and receding along -Z. Every tick each instance
//! steps a little along Z; the direction comes from a sine wave whose frequency
//! grows with the instance's column `i`, so the columns drift in and out of phase
//! with one another.
//!
//! After an update the batch multiplies every model matrix by the shared
//! view-projection and packs the results back to back, ready for a single
//! instanced draw.

use glam::{Mat4, UVec3, Vec3};
use std::f32::consts::PI;

use crate::error::Result;
use crate::uniform::{UniformBlock, UniformLayout, UniformRole};

/// Z distance an instance moves per tick.
pub const WAVE_STEP: f32 = 0.02;
/// Phase added after each lattice column is updated.
pub const PHASE_STEP: f32 = 0.5;
/// The accumulated phase is divided by this before it enters the sine.
pub const PHASE_DIVISOR: f32 = 100.0;

/// One lattice cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    /// `(i, j, k)` lattice coordinate.
    pub cell: UVec3,
    /// Current world position.
    pub position: Vec3,
    /// Frequency multiplier of the wave, `i / 10 + 1`.
    pub frequency: f32,
}

impl Instance {
    pub fn model(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }

    /// Z step for the given accumulated phase: `±WAVE_STEP`, or zero on a node.
    pub fn wave_step(&self, phase: f32) -> f32 {
        WAVE_STEP * sign((phase / PHASE_DIVISOR * self.frequency * PI).sin())
    }
}

/// Three-way sign: zero stays zero.
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Starting position of cell `(i, j, k)` in a lattice of size `dims`.
pub fn lattice_position(cell: UVec3, dims: UVec3) -> Vec3 {
    let half = dims.as_vec3() / 2.0;
    let c = cell.as_vec3();
    Vec3::new(
        2.0 * (c.x - half.x) + 1.0,
        2.0 * (c.y - half.y) + 1.0,
        -2.0 * c.z,
    )
}

/// Model matrices on a lattice, animated and packed per frame.
#[derive(Clone, Debug)]
pub struct InstanceBatch {
    dims: UVec3,
    instances: Vec<Instance>,
    phase: f32,
    mvps: Vec<Mat4>,
}

impl InstanceBatch {
    /// Lays out `nx × ny × nz` instances, indexed `i`-major then `j` then `k`.
    pub fn new(nx: u32, ny: u32, nz: u32) -> Self {
        let dims = UVec3::new(nx, ny, nz);
        let mut instances = Vec::with_capacity((nx * ny * nz) as usize);

        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let cell = UVec3::new(i, j, k);
                    instances.push(Instance {
                        cell,
                        position: lattice_position(cell, dims),
                        frequency: i as f32 / 10.0 + 1.0,
                    });
                }
            }
        }

        let mvps = vec![Mat4::IDENTITY; instances.len()];
        Self {
            dims,
            instances,
            phase: 0.0,
            mvps,
        }
    }

    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Uniform layout sized for this batch's MVP array.
    pub fn uniform_layout(&self) -> Result<UniformLayout> {
        UniformLayout::mvp_array(self.instance_count())
    }

    /// Moves every instance one wave step.
    ///
    /// Columns are visited in order of `i`; the phase grows by [`PHASE_STEP`] after
    /// each column, so later columns of the same tick see a later phase.
    pub fn update(&mut self) {
        let per_column = (self.dims.y * self.dims.z) as usize;
        if per_column == 0 {
            return;
        }

        for column in self.instances.chunks_mut(per_column) {
            for instance in column {
                instance.position.z += instance.wave_step(self.phase);
            }
            self.phase += PHASE_STEP;
        }
    }

    /// Computes `view_projection * model` for every instance.
    pub fn pack(&mut self, view_projection: &Mat4) -> &[Mat4] {
        for (mvp, instance) in self.mvps.iter_mut().zip(&self.instances) {
            *mvp = *view_projection * instance.model();
        }
        &self.mvps
    }

    /// Packs the batch and writes it into `block`'s MVP array region.
    pub fn write_into(&mut self, block: &mut UniformBlock, view_projection: &Mat4) -> Result<()> {
        let mvps = self.pack(view_projection);
        block.write_mat4_array(UniformRole::MvpArray, mvps)
    }
}
