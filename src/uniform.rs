//! Uniform buffer layouts and byte-exact writes.
//!
//! Host code and WGSL agree on a uniform struct only by convention: the shader
//! declares fields, the host writes bytes at offsets. A write of the wrong size
//! silently corrupts whatever follows it. This module makes the convention
//! explicit:
//!
//! - [`UniformLayout`] names every region of a buffer by its [`UniformRole`] with a
//!   fixed offset and size, and is validated once at construction (regions in
//!   bounds, 4-byte aligned, non-overlapping, roles unique).
//! - [`UniformBlock`] is the CPU copy of one buffer. Every write goes through a
//!   region and fails with [`RenderError::LayoutMismatch`] if its length disagrees
//!   with the region.
//! - [`UniformBuffer`] pairs a block with the GPU buffer it mirrors and uploads
//!   only the bytes touched since the last flush.
//!
//! # Layouts used by the scenes
//!
//! | Layout | Region | Offset | Size |
//! |---|---|---|---|
//! | [`mvp`](UniformLayout::mvp) | model-view-projection | 0 | 64 |
//! | [`vertex_lit`](UniformLayout::vertex_lit) | view-projection | 0 | 64 |
//! | | model | 64 | 64 |
//! | | normal | 128 | 64 |
//! | [`fragment_lit`](UniformLayout::fragment_lit) | light position | 0 | 16 |
//! | | eye position | 16 | 16 |
//! | [`lighting`](UniformLayout::lighting) | lighting parameters | 0 | 36 |
//! | [`mvp_array`](UniformLayout::mvp_array) | per-instance MVPs | 0 | 64 × n |
//!
//! Matrices are stored column-major, 16 little-endian `f32`s, exactly as WGSL's
//! `mat4x4<f32>` expects.

use std::fmt;
use std::mem::{offset_of, size_of};
use std::ops::Range;

use glam::{Mat4, Vec3};

use crate::error::{RenderError, Result};

/// Byte size of a `mat4x4<f32>`.
pub const MAT4_SIZE: u64 = 64;
/// Byte size of a `vec3<f32>` padded to its 16-byte uniform alignment.
pub const VEC3_PADDED_SIZE: u64 = 16;
/// Copy granularity required by `Queue::write_buffer`.
const WRITE_ALIGN: u64 = wgpu::COPY_BUFFER_ALIGNMENT;

/// What a uniform region holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformRole {
    /// Combined model-view-projection matrix.
    Mvp,
    ViewProjection,
    Model,
    /// Inverse-transpose of the model matrix.
    Normal,
    LightPosition,
    EyePosition,
    /// The nine-float [`LightingParams`] block.
    LightingParams,
    /// One model-view-projection matrix per instance.
    MvpArray,
}

impl fmt::Display for UniformRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniformRole::Mvp => "mvp matrix",
            UniformRole::ViewProjection => "view-projection matrix",
            UniformRole::Model => "model matrix",
            UniformRole::Normal => "normal matrix",
            UniformRole::LightPosition => "light position",
            UniformRole::EyePosition => "eye position",
            UniformRole::LightingParams => "lighting parameters",
            UniformRole::MvpArray => "instance mvp array",
        };
        f.write_str(name)
    }
}

/// A named byte range within a uniform buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformRegion {
    pub role: UniformRole,
    pub offset: u64,
    pub size: u64,
}

impl UniformRegion {
    pub const fn new(role: UniformRole, offset: u64, size: u64) -> Self {
        Self { role, offset, size }
    }

    /// One past the last byte. Saturates, so an overflowing region is never in bounds.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }

    fn range(&self) -> Range<usize> {
        self.offset as usize..self.end() as usize
    }
}

/// Vertex-stage uniforms of the lit scenes, as the shader declares them.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

/// Fragment-stage uniforms of the lit scenes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FragmentUniforms {
    pub light_position: [f32; 4],
    pub eye_position: [f32; 4],
}

/// Phong / Blinn-Phong shading parameters.
///
/// Nine consecutive `f32`s in this exact order; the flags are `0.0` or `1.0`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingParams {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
    pub specular_color: [f32; 3],
    pub is_phong: f32,
    pub is_two_sided: f32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            ambient: 0.2,
            diffuse: 0.8,
            specular: 0.4,
            shininess: 30.0,
            specular_color: [1.0, 1.0, 1.0],
            is_phong: 1.0,
            is_two_sided: 1.0,
        }
    }
}

impl LightingParams {
    /// Switches between Phong (`true`) and Blinn-Phong (`false`) highlights.
    pub fn phong(mut self, enabled: bool) -> Self {
        self.is_phong = if enabled { 1.0 } else { 0.0 };
        self
    }

    /// Lights back faces as well as front faces.
    pub fn two_sided(mut self, enabled: bool) -> Self {
        self.is_two_sided = if enabled { 1.0 } else { 0.0 };
        self
    }
}

const _: () = assert!(size_of::<VertexUniforms>() == 192);
const _: () = assert!(size_of::<FragmentUniforms>() == 32);
const _: () = assert!(size_of::<LightingParams>() == 36);

/// The region table of one uniform buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformLayout {
    label: &'static str,
    size: u64,
    regions: Vec<UniformRegion>,
}

impl UniformLayout {
    /// Validates and builds a layout.
    ///
    /// Fails with [`RenderError::InvalidLayout`] if the buffer is empty, a region is
    /// empty, misaligned, out of bounds, overlaps another, or repeats a role.
    pub fn new(
        label: &'static str,
        size: u64,
        regions: impl IntoIterator<Item = UniformRegion>,
    ) -> Result<Self> {
        let mut regions: Vec<UniformRegion> = regions.into_iter().collect();
        regions.sort_by_key(|r| r.offset);

        if size == 0 || size % WRITE_ALIGN != 0 {
            return Err(RenderError::InvalidLayout(format!(
                "{label}: buffer size {size} must be a non-zero multiple of {WRITE_ALIGN}"
            )));
        }

        for (i, region) in regions.iter().enumerate() {
            if region.size == 0 {
                return Err(RenderError::InvalidLayout(format!(
                    "{label}: {} region is empty",
                    region.role
                )));
            }
            if region.offset % WRITE_ALIGN != 0 || region.size % WRITE_ALIGN != 0 {
                return Err(RenderError::InvalidLayout(format!(
                    "{label}: {} region {}+{} is not {WRITE_ALIGN}-byte aligned",
                    region.role, region.offset, region.size
                )));
            }
            if region.end() > size {
                return Err(RenderError::InvalidLayout(format!(
                    "{label}: {} region ends at {} past buffer size {size}",
                    region.role,
                    region.end()
                )));
            }
            if let Some(next) = regions.get(i + 1)
                && next.offset < region.end()
            {
                return Err(RenderError::InvalidLayout(format!(
                    "{label}: {} overlaps {}",
                    region.role, next.role
                )));
            }
            if regions[..i].iter().any(|r| r.role == region.role) {
                return Err(RenderError::InvalidLayout(format!(
                    "{label}: {} appears twice",
                    region.role
                )));
            }
        }

        Ok(Self {
            label,
            size,
            regions,
        })
    }

    /// Builds a layout from a table that is valid by construction.
    fn fixed(label: &'static str, size: u64, regions: &[UniformRegion]) -> Self {
        let layout = Self {
            label,
            size,
            regions: regions.to_vec(),
        };
        debug_assert!(Self::new(label, size, regions.iter().copied()).is_ok());
        layout
    }

    /// A single model-view-projection matrix.
    pub fn mvp() -> Self {
        Self::fixed(
            "MVP Uniforms",
            MAT4_SIZE,
            &[UniformRegion::new(UniformRole::Mvp, 0, MAT4_SIZE)],
        )
    }

    /// View-projection, model and normal matrices for the lit scenes.
    pub fn vertex_lit() -> Self {
        Self::fixed(
            "Vertex Uniforms",
            size_of::<VertexUniforms>() as u64,
            &[
                UniformRegion::new(
                    UniformRole::ViewProjection,
                    offset_of!(VertexUniforms, view_projection) as u64,
                    MAT4_SIZE,
                ),
                UniformRegion::new(
                    UniformRole::Model,
                    offset_of!(VertexUniforms, model) as u64,
                    MAT4_SIZE,
                ),
                UniformRegion::new(
                    UniformRole::Normal,
                    offset_of!(VertexUniforms, normal) as u64,
                    MAT4_SIZE,
                ),
            ],
        )
    }

    /// Light and eye positions for the lit scenes.
    pub fn fragment_lit() -> Self {
        Self::fixed(
            "Fragment Uniforms",
            size_of::<FragmentUniforms>() as u64,
            &[
                UniformRegion::new(
                    UniformRole::LightPosition,
                    offset_of!(FragmentUniforms, light_position) as u64,
                    VEC3_PADDED_SIZE,
                ),
                UniformRegion::new(
                    UniformRole::EyePosition,
                    offset_of!(FragmentUniforms, eye_position) as u64,
                    VEC3_PADDED_SIZE,
                ),
            ],
        )
    }

    /// The lighting parameter block.
    pub fn lighting() -> Self {
        let size = size_of::<LightingParams>() as u64;
        Self::fixed(
            "Lighting Uniforms",
            size,
            &[UniformRegion::new(UniformRole::LightingParams, 0, size)],
        )
    }

    /// `count` consecutive MVP matrices for an instanced draw.
    pub fn mvp_array(count: u32) -> Result<Self> {
        let size = MAT4_SIZE * count as u64;
        Self::new(
            "Instance MVP Uniforms",
            size,
            [UniformRegion::new(UniformRole::MvpArray, 0, size)],
        )
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Total buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn regions(&self) -> &[UniformRegion] {
        &self.regions
    }

    /// The region tagged with `role`.
    pub fn region(&self, role: UniformRole) -> Result<&UniformRegion> {
        self.regions
            .iter()
            .find(|r| r.role == role)
            .ok_or(RenderError::UnknownRegion(role))
    }

    /// The region starting exactly at `offset`, if any.
    pub fn region_at(&self, offset: u64) -> Option<&UniformRegion> {
        self.regions.iter().find(|r| r.offset == offset)
    }
}

/// CPU-side contents of one uniform buffer.
///
/// Tracks the span of bytes written since the last [`take_dirty`](Self::take_dirty)
/// so the GPU copy can be refreshed with a single upload.
#[derive(Clone, Debug)]
pub struct UniformBlock {
    layout: UniformLayout,
    bytes: Vec<u8>,
    dirty: Option<Range<u64>>,
}

impl UniformBlock {
    /// Zero-filled block for `layout`.
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.size() as usize];
        Self {
            layout,
            bytes,
            dirty: None,
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Writes raw bytes into the region tagged `role`.
    ///
    /// `data` must cover the region exactly.
    pub fn write(&mut self, role: UniformRole, data: &[u8]) -> Result<()> {
        let region = *self.layout.region(role)?;
        self.write_region(region, data)
    }

    /// Writes raw bytes at `offset`, which must be the start of a region whose size
    /// equals `data.len()`.
    pub fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.checked_range(offset, data.len() as u64)?;
        let region = *self.layout.region_at(offset).ok_or_else(|| {
            RenderError::InvalidLayout(format!(
                "{}: no region starts at offset {offset}",
                self.layout.label()
            ))
        })?;
        self.write_region(region, data)
    }

    fn write_region(&mut self, region: UniformRegion, data: &[u8]) -> Result<()> {
        if data.len() as u64 != region.size {
            return Err(RenderError::LayoutMismatch {
                role: region.role,
                expected: region.size,
                actual: data.len() as u64,
            });
        }

        self.bytes[region.range()].copy_from_slice(data);
        self.mark_dirty(region.offset..region.end());
        Ok(())
    }

    /// Writes a matrix, column-major.
    pub fn write_mat4(&mut self, role: UniformRole, matrix: &Mat4) -> Result<()> {
        self.write(role, bytemuck::cast_slice(&matrix.to_cols_array()))
    }

    /// Writes a point as `vec4(x, y, z, 1)`, filling its padded 16-byte slot.
    pub fn write_vec3(&mut self, role: UniformRole, v: Vec3) -> Result<()> {
        self.write(role, bytemuck::cast_slice(&v.extend(1.0).to_array()))
    }

    /// Writes a `#[repr(C)]` struct that must match the region byte for byte.
    pub fn write_pod<T: bytemuck::Pod>(&mut self, role: UniformRole, value: &T) -> Result<()> {
        self.write(role, bytemuck::bytes_of(value))
    }

    /// Packs `matrices` back to back into the region tagged `role`.
    ///
    /// The matrix count must fill the region exactly.
    pub fn write_mat4_array(&mut self, role: UniformRole, matrices: &[Mat4]) -> Result<()> {
        let region = *self.layout.region(role)?;
        let actual = matrices.len() as u64 * MAT4_SIZE;
        if actual != region.size {
            return Err(RenderError::LayoutMismatch {
                role,
                expected: region.size,
                actual,
            });
        }

        let dst = &mut self.bytes[region.range()];
        for (chunk, matrix) in dst.chunks_exact_mut(MAT4_SIZE as usize).zip(matrices) {
            chunk.copy_from_slice(bytemuck::cast_slice(&matrix.to_cols_array()));
        }
        self.mark_dirty(region.offset..region.end());
        Ok(())
    }

    /// Bytes currently stored for `role`.
    pub fn read(&self, role: UniformRole) -> Result<&[u8]> {
        let region = self.layout.region(role)?;
        Ok(&self.bytes[region.range()])
    }

    /// Bytes in `offset..offset + len`.
    pub fn read_range(&self, offset: u64, len: u64) -> Result<&[u8]> {
        let range = self.checked_range(offset, len)?;
        Ok(&self.bytes[range])
    }

    fn checked_range(&self, offset: u64, len: u64) -> Result<Range<usize>> {
        let capacity = self.layout.size();
        offset
            .checked_add(len)
            .filter(|end| *end <= capacity)
            .map(|end| offset as usize..end as usize)
            .ok_or(RenderError::OutOfBounds {
                offset,
                len,
                capacity,
            })
    }

    /// Reads a matrix back from its region.
    pub fn read_mat4(&self, role: UniformRole) -> Result<Mat4> {
        let bytes = self.read(role)?;
        if bytes.len() as u64 != MAT4_SIZE {
            return Err(RenderError::LayoutMismatch {
                role,
                expected: bytes.len() as u64,
                actual: MAT4_SIZE,
            });
        }
        let floats: [f32; 16] = bytemuck::pod_read_unaligned(bytes);
        Ok(Mat4::from_cols_array(&floats))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns and clears the span written since the last call.
    pub fn take_dirty(&mut self) -> Option<Range<u64>> {
        self.dirty.take()
    }

    fn mark_dirty(&mut self, span: Range<u64>) {
        self.dirty = Some(match self.dirty.take() {
            Some(d) => d.start.min(span.start)..d.end.max(span.end),
            None => span,
        });
    }
}

/// A GPU uniform buffer and its CPU mirror.
///
/// The buffer is allocated once at the layout's size and never resized. Writes
/// land in the mirror; [`flush`](Self::flush) uploads the touched span.
pub struct UniformBuffer {
    buffer: wgpu::Buffer,
    block: UniformBlock,
}

impl UniformBuffer {
    pub fn new(device: &wgpu::Device, layout: UniformLayout) -> Self {
        Self::from_block(device, UniformBlock::new(layout))
    }

    /// Allocates a buffer for an already staged block. Whatever the block holds
    /// is uploaded by the next [`flush`](Self::flush).
    pub fn from_block(device: &wgpu::Device, block: UniformBlock) -> Self {
        let layout = block.layout();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(layout.label()),
            size: layout.size(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!("allocated {} ({} bytes)", layout.label(), layout.size());

        Self { buffer, block }
    }

    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    pub fn block_mut(&mut self) -> &mut UniformBlock {
        &mut self.block
    }

    pub fn write_mat4(&mut self, role: UniformRole, matrix: &Mat4) -> Result<()> {
        self.block.write_mat4(role, matrix)
    }

    pub fn write_vec3(&mut self, role: UniformRole, v: Vec3) -> Result<()> {
        self.block.write_vec3(role, v)
    }

    pub fn write_pod<T: bytemuck::Pod>(&mut self, role: UniformRole, value: &T) -> Result<()> {
        self.block.write_pod(role, value)
    }

    pub fn write_mat4_array(&mut self, role: UniformRole, matrices: &[Mat4]) -> Result<()> {
        self.block.write_mat4_array(role, matrices)
    }

    /// Uploads bytes written since the previous flush. Queue submission order makes
    /// the upload visible to the next submitted draw.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if let Some(span) = self.block.take_dirty() {
            let bytes = &self.block.as_bytes()[span.start as usize..span.end as usize];
            queue.write_buffer(&self.buffer, span.start, bytes);
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// The whole buffer as a bind group resource.
    pub fn binding(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    pub fn size(&self) -> u64 {
        self.block.layout().size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> Mat4 {
        Mat4::from_cols_array(&std::array::from_fn(|i| i as f32 * 1.5 - 4.0))
    }

    #[test]
    fn preset_layouts_match_shader_structs() {
        let vertex = UniformLayout::vertex_lit();
        assert_eq!(vertex.size(), 192);
        assert_eq!(vertex.region(UniformRole::ViewProjection).unwrap().offset, 0);
        assert_eq!(vertex.region(UniformRole::Model).unwrap().offset, 64);
        assert_eq!(vertex.region(UniformRole::Normal).unwrap().offset, 128);

        let fragment = UniformLayout::fragment_lit();
        assert_eq!(fragment.size(), 32);
        assert_eq!(
            *fragment.region(UniformRole::EyePosition).unwrap(),
            UniformRegion::new(UniformRole::EyePosition, 16, 16)
        );

        assert_eq!(UniformLayout::lighting().size(), 36);
        assert_eq!(UniformLayout::mvp().size(), 64);
        assert_eq!(UniformLayout::mvp_array(125).unwrap().size(), 8000);
    }

    #[test]
    fn matrix_round_trips_through_model_slot() {
        let mut block = UniformBlock::new(UniformLayout::vertex_lit());
        let matrix = sample_matrix();

        block.write_at(64, bytemuck::cast_slice(&matrix.to_cols_array())).unwrap();

        let bytes = block.read_range(64, 64).unwrap();
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(floats, &matrix.to_cols_array()[..]);
        assert_eq!(floats[4], matrix.y_axis.x);

        assert_eq!(block.read_mat4(UniformRole::Model).unwrap(), matrix);
        assert!(block.read_range(0, 64).unwrap().iter().all(|b| *b == 0));
        assert!(block.read_range(128, 64).unwrap().iter().all(|b| *b == 0));
    }

    #[test]
    fn wrong_sized_write_is_a_layout_mismatch() {
        let mut block = UniformBlock::new(UniformLayout::fragment_lit());

        // a bare vec3 is 12 bytes, its slot is 16
        let err = block
            .write(UniformRole::LightPosition, bytemuck::cast_slice(&[1.0f32, 2.0, 3.0]))
            .unwrap_err();

        assert!(matches!(
            err,
            RenderError::LayoutMismatch {
                role: UniformRole::LightPosition,
                expected: 16,
                actual: 12
            }
        ));
        assert!(block.as_bytes().iter().all(|b| *b == 0));
        assert!(block.take_dirty().is_none());
    }

    #[test]
    fn raw_writes_must_start_on_a_region() {
        let mut block = UniformBlock::new(UniformLayout::vertex_lit());
        let matrix = bytemuck::cast_slice::<f32, u8>(&[0.0; 16]).to_vec();

        assert!(matches!(block.write_at(32, &matrix), Err(RenderError::InvalidLayout(_))));
        assert!(matches!(block.write_at(160, &matrix), Err(RenderError::OutOfBounds { .. })));
    }

    #[test]
    fn huge_ranges_are_out_of_bounds() {
        let mut block = UniformBlock::new(UniformLayout::vertex_lit());

        let err = block.write_at(u64::MAX - 8, &[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::OutOfBounds { offset, len: 16, capacity: 192 } if offset == u64::MAX - 8
        ));

        let err = block.read_range(64, u64::MAX).unwrap_err();
        assert!(matches!(
            err,
            RenderError::OutOfBounds { offset: 64, len: u64::MAX, capacity: 192 }
        ));
        assert!(block.take_dirty().is_none());
    }

    #[test]
    fn overflowing_region_is_rejected_by_layout() {
        let layout = UniformLayout::new(
            "overflow",
            64,
            [UniformRegion::new(UniformRole::Mvp, u64::MAX - 3, 64)],
        );
        assert!(matches!(layout, Err(RenderError::InvalidLayout(_))));
    }

    #[test]
    fn unknown_role_is_reported() {
        let mut block = UniformBlock::new(UniformLayout::mvp());
        let err = block.write_mat4(UniformRole::Normal, &Mat4::IDENTITY).unwrap_err();
        assert!(matches!(err, RenderError::UnknownRegion(UniformRole::Normal)));
    }

    #[test]
    fn vec3_is_padded_to_sixteen_bytes() {
        let mut block = UniformBlock::new(UniformLayout::fragment_lit());
        block.write_vec3(UniformRole::EyePosition, Vec3::new(2.0, 2.0, 4.0)).unwrap();

        let floats: &[f32] = bytemuck::cast_slice(block.read(UniformRole::EyePosition).unwrap());
        assert_eq!(floats, &[2.0, 2.0, 4.0, 1.0]);
    }

    #[test]
    fn lighting_params_keep_field_order() {
        let mut block = UniformBlock::new(UniformLayout::lighting());
        let params = LightingParams::default().phong(false).two_sided(false);
        block.write_pod(UniformRole::LightingParams, &params).unwrap();

        let floats: &[f32] = bytemuck::cast_slice(block.as_bytes());
        assert_eq!(floats, &[0.2, 0.8, 0.4, 30.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn instance_array_must_be_filled_exactly() {
        let mut block = UniformBlock::new(UniformLayout::mvp_array(3).unwrap());
        let err = block
            .write_mat4_array(UniformRole::MvpArray, &[Mat4::IDENTITY; 2])
            .unwrap_err();
        assert!(matches!(err, RenderError::LayoutMismatch { expected: 192, actual: 128, .. }));

        let matrices = [Mat4::IDENTITY, sample_matrix(), Mat4::from_scale(Vec3::splat(2.0))];
        block.write_mat4_array(UniformRole::MvpArray, &matrices).unwrap();

        let second: &[f32] = bytemuck::cast_slice(block.read_range(64, 64).unwrap());
        assert_eq!(second, &sample_matrix().to_cols_array()[..]);
    }

    #[test]
    fn dirty_span_covers_all_writes_since_last_take() {
        let mut block = UniformBlock::new(UniformLayout::vertex_lit());
        block.write_mat4(UniformRole::Normal, &Mat4::IDENTITY).unwrap();
        block.write_mat4(UniformRole::Model, &Mat4::IDENTITY).unwrap();

        assert_eq!(block.take_dirty(), Some(64..192));
        assert_eq!(block.take_dirty(), None);
    }

    #[test]
    fn invalid_layouts_are_rejected() {
        let overlapping = UniformLayout::new(
            "overlap",
            128,
            [
                UniformRegion::new(UniformRole::Model, 0, 64),
                UniformRegion::new(UniformRole::Normal, 32, 64),
            ],
        );
        assert!(matches!(overlapping, Err(RenderError::InvalidLayout(_))));

        let out_of_bounds =
            UniformLayout::new("oob", 64, [UniformRegion::new(UniformRole::Mvp, 16, 64)]);
        assert!(out_of_bounds.is_err());

        let misaligned =
            UniformLayout::new("misaligned", 64, [UniformRegion::new(UniformRole::Mvp, 2, 16)]);
        assert!(misaligned.is_err());

        let duplicate = UniformLayout::new(
            "dup",
            128,
            [
                UniformRegion::new(UniformRole::Mvp, 0, 64),
                UniformRegion::new(UniformRole::Mvp, 64, 64),
            ],
        );
        assert!(duplicate.is_err());

        assert!(UniformLayout::mvp_array(0).is_err());
    }
}
