//! Declarative render pipeline construction.
//!
//! A [`RenderPipelineBuilder`] collects everything a draw needs to agree on with
//! its shaders: vertex buffer layouts, bind group slots, topology, culling, the
//! depth test and the color target format. [`validate`](RenderPipelineBuilder::validate)
//! checks the description before any GPU object exists, and
//! [`build`](RenderPipelineBuilder::build) compiles the shaders inside a validation
//! error scope so a bad shader surfaces as a [`RenderError`] instead of a device
//! panic later on.
//!
//! Built pipelines are immutable. A scene with a different vertex layout builds a
//! new pipeline.
//!
//! # Example
//!
//! ```ignore
//! let pipeline = RenderPipelineBuilder::new("Cube Pipeline")
//!     .shaders(ShaderSources::single(include_str!("shaders/color_cube.wgsl")))
//!     .vertex_buffer(VertexBufferSpec::position())
//!     .vertex_buffer(VertexBufferSpec::color())
//!     .binding(BindingSpec::uniform(0, wgpu::ShaderStages::VERTEX, 64))
//!     .cull_mode(Some(wgpu::Face::Back))
//!     .depth(DepthSpec::default())
//!     .build(&gpu.device, gpu.config.format)?;
//! ```

use std::borrow::Cow;
use std::collections::HashSet;
use std::num::NonZeroU64;

use crate::error::{RenderError, Result};

/// Depth format used by every 3D scene.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

const VERTEX_STRIDE_ALIGN: u64 = 4;

/// WGSL source and entry point of one shader stage.
#[derive(Clone, Debug)]
pub struct ShaderStage {
    pub code: Cow<'static, str>,
    pub entry_point: &'static str,
}

/// Vertex and fragment shader text.
#[derive(Clone, Debug)]
pub struct ShaderSources {
    pub vertex: ShaderStage,
    pub fragment: ShaderStage,
}

impl ShaderSources {
    /// Separate modules for each stage, with `vs_main` / `fs_main` entry points.
    pub fn new(vertex: impl Into<Cow<'static, str>>, fragment: impl Into<Cow<'static, str>>) -> Self {
        Self {
            vertex: ShaderStage {
                code: vertex.into(),
                entry_point: "vs_main",
            },
            fragment: ShaderStage {
                code: fragment.into(),
                entry_point: "fs_main",
            },
        }
    }

    /// One module holding both `vs_main` and `fs_main`.
    pub fn single(code: impl Into<Cow<'static, str>>) -> Self {
        let code = code.into();
        Self::new(code.clone(), code)
    }

    fn shares_module(&self) -> bool {
        self.vertex.code == self.fragment.code
    }
}

/// Layout of one vertex buffer slot.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexBufferSpec {
    pub stride: u64,
    pub step_mode: wgpu::VertexStepMode,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexBufferSpec {
    pub fn new(stride: u64) -> Self {
        Self {
            stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, shader_location: u32, format: wgpu::VertexFormat, offset: u64) -> Self {
        self.attributes.push(wgpu::VertexAttribute {
            format,
            offset,
            shader_location,
        });
        self
    }

    /// Tightly packed stream holding one attribute.
    pub fn packed(shader_location: u32, format: wgpu::VertexFormat) -> Self {
        Self::new(format.size()).attribute(shader_location, format, 0)
    }

    /// `vec3` position at location 0, 12-byte stride.
    pub fn position() -> Self {
        Self::packed(0, wgpu::VertexFormat::Float32x3)
    }

    /// `vec2` clip-space position at location 0, 8-byte stride.
    pub fn position_2d() -> Self {
        Self::packed(0, wgpu::VertexFormat::Float32x2)
    }

    /// `vec3` normal at location 1.
    pub fn normal() -> Self {
        Self::packed(1, wgpu::VertexFormat::Float32x3)
    }

    /// `vec3` color at location 1.
    pub fn color() -> Self {
        Self::packed(1, wgpu::VertexFormat::Float32x3)
    }

    /// `vec2` texture coordinate at location 2.
    pub fn uv() -> Self {
        Self::packed(2, wgpu::VertexFormat::Float32x2)
    }

    pub fn layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: self.step_mode,
            attributes: &self.attributes,
        }
    }
}

/// Resource type bound at a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    /// Uniform buffer of at least `size` bytes.
    Uniform { size: u64 },
    Sampler,
    Texture,
}

/// One entry of the pipeline's single bind group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindingSpec {
    pub binding: u32,
    pub visibility: wgpu::ShaderStages,
    pub kind: BindingKind,
}

impl BindingSpec {
    pub fn uniform(binding: u32, visibility: wgpu::ShaderStages, size: u64) -> Self {
        Self {
            binding,
            visibility,
            kind: BindingKind::Uniform { size },
        }
    }

    pub fn sampler(binding: u32) -> Self {
        Self {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            kind: BindingKind::Sampler,
        }
    }

    pub fn texture(binding: u32) -> Self {
        Self {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            kind: BindingKind::Texture,
        }
    }

    fn layout_entry(&self) -> wgpu::BindGroupLayoutEntry {
        let ty = match self.kind {
            BindingKind::Uniform { size } => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size),
            },
            BindingKind::Sampler => {
                wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
            }
            BindingKind::Texture => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
        };

        wgpu::BindGroupLayoutEntry {
            binding: self.binding,
            visibility: self.visibility,
            ty,
            count: None,
        }
    }
}

/// Depth test configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthSpec {
    pub format: wgpu::TextureFormat,
    pub write_enabled: bool,
    pub compare: wgpu::CompareFunction,
}

impl Default for DepthSpec {
    /// `depth24plus`, writes on, `less`.
    fn default() -> Self {
        Self {
            format: DEPTH_FORMAT,
            write_enabled: true,
            compare: wgpu::CompareFunction::Less,
        }
    }
}

impl DepthSpec {
    fn state(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: self.format,
            depth_write_enabled: self.write_enabled,
            depth_compare: self.compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

/// Collects a pipeline description.
#[derive(Clone, Debug)]
pub struct RenderPipelineBuilder {
    label: Cow<'static, str>,
    shaders: Option<ShaderSources>,
    vertex_buffers: Vec<VertexBufferSpec>,
    bindings: Vec<BindingSpec>,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    depth: Option<DepthSpec>,
}

impl RenderPipelineBuilder {
    /// Triangle list, no culling, no depth test, no buffers.
    pub fn new(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            shaders: None,
            vertex_buffers: Vec::new(),
            bindings: Vec::new(),
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth: None,
        }
    }

    pub fn shaders(mut self, shaders: ShaderSources) -> Self {
        self.shaders = Some(shaders);
        self
    }

    /// Appends a vertex buffer; slots are numbered in call order.
    pub fn vertex_buffer(mut self, spec: VertexBufferSpec) -> Self {
        self.vertex_buffers.push(spec);
        self
    }

    pub fn binding(mut self, spec: BindingSpec) -> Self {
        self.bindings.push(spec);
        self
    }

    pub fn topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn cull_mode(mut self, cull_mode: Option<wgpu::Face>) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn depth(mut self, depth: DepthSpec) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertex_buffers(&self) -> &[VertexBufferSpec] {
        &self.vertex_buffers
    }

    pub fn bindings(&self) -> &[BindingSpec] {
        &self.bindings
    }

    pub fn depth_spec(&self) -> Option<&DepthSpec> {
        self.depth.as_ref()
    }

    /// Checks the description for mistakes that would otherwise only show up as
    /// device validation errors or garbage on screen.
    pub fn validate(&self, color_format: wgpu::TextureFormat) -> Result<()> {
        let invalid = |msg: String| Err(RenderError::InvalidPipeline(format!("{}: {msg}", self.label)));

        let Some(shaders) = &self.shaders else {
            return invalid("no shader sources".into());
        };
        for stage in [&shaders.vertex, &shaders.fragment] {
            if stage.code.trim().is_empty() {
                return invalid(format!("shader for entry point '{}' is empty", stage.entry_point));
            }
            if stage.entry_point.is_empty() {
                return invalid("empty entry point name".into());
            }
        }

        let mut locations = HashSet::new();
        for (slot, buffer) in self.vertex_buffers.iter().enumerate() {
            if buffer.stride == 0 || buffer.stride % VERTEX_STRIDE_ALIGN != 0 {
                return invalid(format!("vertex buffer {slot} has stride {}", buffer.stride));
            }
            if buffer.attributes.is_empty() {
                return invalid(format!("vertex buffer {slot} declares no attributes"));
            }
            for attribute in &buffer.attributes {
                if attribute.offset + attribute.format.size() > buffer.stride {
                    return invalid(format!(
                        "attribute at location {} overruns the {}-byte stride of buffer {slot}",
                        attribute.shader_location, buffer.stride
                    ));
                }
                if !locations.insert(attribute.shader_location) {
                    return invalid(format!(
                        "shader location {} is bound twice",
                        attribute.shader_location
                    ));
                }
            }
        }

        let mut slots = HashSet::new();
        for binding in &self.bindings {
            if !slots.insert(binding.binding) {
                return invalid(format!("binding {} is declared twice", binding.binding));
            }
            if binding.kind == (BindingKind::Uniform { size: 0 }) {
                return invalid(format!("uniform at binding {} has zero size", binding.binding));
            }
        }

        if color_format.is_depth_stencil_format() {
            return invalid(format!("{color_format:?} cannot be a color target"));
        }
        if let Some(depth) = &self.depth
            && !depth.format.is_depth_stencil_format()
        {
            return invalid(format!("{:?} is not a depth format", depth.format));
        }

        Ok(())
    }

    /// Validates the description, compiles the shaders and creates the pipeline.
    ///
    /// Shader and pipeline errors are captured in a validation error scope and
    /// returned; nothing is left half-built on failure.
    pub fn build(&self, device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Result<RenderPipeline> {
        self.validate(color_format)?;
        let shaders = self
            .shaders
            .as_ref()
            .ok_or_else(|| RenderError::InvalidPipeline(format!("{}: no shader sources", self.label)))?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} Vertex Shader", self.label)),
            source: wgpu::ShaderSource::Wgsl(shaders.vertex.code.clone()),
        });
        let fragment_module = if shaders.shares_module() {
            None
        } else {
            Some(device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{} Fragment Shader", self.label)),
                source: wgpu::ShaderSource::Wgsl(shaders.fragment.code.clone()),
            }))
        };
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderCompilation {
                label: self.label.to_string(),
                message: error.to_string(),
            });
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let entries: Vec<_> = self.bindings.iter().map(BindingSpec::layout_entry).collect();
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} Bind Group Layout", self.label)),
            entries: &entries,
        });

        // A pipeline without bindings declares no group, so draws need not set one.
        let group_layouts = [&bind_group_layout];
        let group_count = usize::from(!self.bindings.is_empty());
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", self.label)),
            bind_group_layouts: &group_layouts[..group_count],
            push_constant_ranges: &[],
        });

        let buffers: Vec<_> = self.vertex_buffers.iter().map(VertexBufferSpec::layout).collect();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&self.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(shaders.vertex.entry_point),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment_module.as_ref().unwrap_or(&vertex_module),
                entry_point: Some(shaders.fragment.entry_point),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                cull_mode: self.cull_mode,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: self.depth.as_ref().map(DepthSpec::state),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::PipelineCreation {
                label: self.label.to_string(),
                message: error.to_string(),
            });
        }

        log::debug!(
            "built pipeline '{}' ({:?}, {} vertex buffers, {} bindings)",
            self.label,
            self.topology,
            self.vertex_buffers.len(),
            self.bindings.len()
        );

        Ok(RenderPipeline {
            label: self.label.to_string(),
            pipeline,
            bind_group_layout,
            bindings: self.bindings.clone(),
            depth: self.depth,
        })
    }
}

/// A compiled pipeline and the layout of its bind group.
#[derive(Debug)]
pub struct RenderPipeline {
    label: String,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bindings: Vec<BindingSpec>,
    depth: Option<DepthSpec>,
}

impl RenderPipeline {
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn bindings(&self) -> &[BindingSpec] {
        &self.bindings
    }

    pub fn uses_depth(&self) -> bool {
        self.depth.is_some()
    }

    /// Creates the bind group for this pipeline.
    ///
    /// `resources` must supply exactly the declared binding indices.
    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        resources: Vec<(u32, wgpu::BindingResource<'_>)>,
    ) -> Result<wgpu::BindGroup> {
        check_binding_indices(&self.label, &self.bindings, resources.iter().map(|(b, _)| *b))?;

        let entries: Vec<_> = resources
            .into_iter()
            .map(|(binding, resource)| wgpu::BindGroupEntry { binding, resource })
            .collect();

        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", self.label)),
            layout: &self.bind_group_layout,
            entries: &entries,
        }))
    }
}

fn check_binding_indices(
    label: &str,
    declared: &[BindingSpec],
    supplied: impl Iterator<Item = u32>,
) -> Result<()> {
    let mut supplied: Vec<u32> = supplied.collect();
    let mut expected: Vec<u32> = declared.iter().map(|b| b.binding).collect();
    supplied.sort_unstable();
    expected.sort_unstable();

    if supplied != expected {
        return Err(RenderError::InvalidPipeline(format!(
            "{label}: bind group supplies bindings {supplied:?}, pipeline declares {expected:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;
    const WGSL: &str = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(); }";

    fn lit_builder() -> RenderPipelineBuilder {
        RenderPipelineBuilder::new("Lit")
            .shaders(ShaderSources::single(WGSL))
            .vertex_buffer(VertexBufferSpec::position())
            .vertex_buffer(VertexBufferSpec::normal())
            .vertex_buffer(VertexBufferSpec::uv())
            .binding(BindingSpec::uniform(0, wgpu::ShaderStages::VERTEX, 192))
            .binding(BindingSpec::uniform(1, wgpu::ShaderStages::FRAGMENT, 32))
            .binding(BindingSpec::sampler(2))
            .binding(BindingSpec::texture(3))
            .depth(DepthSpec::default())
    }

    #[test]
    fn standard_streams_have_expected_strides() {
        let position = VertexBufferSpec::position();
        assert_eq!(position.stride, 12);
        assert_eq!(position.attributes[0].shader_location, 0);
        assert_eq!(position.attributes[0].format, wgpu::VertexFormat::Float32x3);

        assert_eq!(VertexBufferSpec::normal().stride, 12);
        assert_eq!(VertexBufferSpec::color().attributes[0].shader_location, 1);

        let uv = VertexBufferSpec::uv();
        assert_eq!(uv.stride, 8);
        assert_eq!(uv.attributes[0].shader_location, 2);

        let layout = uv.layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
    }

    #[test]
    fn default_depth_is_depth24plus_less_with_writes() {
        let depth = DepthSpec::default();
        assert_eq!(depth.format, wgpu::TextureFormat::Depth24Plus);
        assert!(depth.write_enabled);
        assert_eq!(depth.compare, wgpu::CompareFunction::Less);
    }

    #[test]
    fn lit_description_validates() {
        let builder = lit_builder();
        builder.validate(SURFACE).unwrap();
        assert_eq!(builder.depth_spec(), Some(&DepthSpec::default()));
        assert!(RenderPipelineBuilder::new("Flat").depth_spec().is_none());
    }

    #[test]
    fn rejects_missing_or_empty_shaders() {
        let bare = RenderPipelineBuilder::new("Bare");
        assert!(matches!(bare.validate(SURFACE), Err(RenderError::InvalidPipeline(_))));

        let empty = RenderPipelineBuilder::new("Empty").shaders(ShaderSources::new("", WGSL));
        assert!(empty.validate(SURFACE).is_err());
    }

    #[test]
    fn rejects_duplicate_shader_locations() {
        let builder = lit_builder().vertex_buffer(VertexBufferSpec::color());
        let err = builder.validate(SURFACE).unwrap_err();
        assert!(err.to_string().contains("location 1"), "{err}");
    }

    #[test]
    fn rejects_attribute_overrunning_stride() {
        let builder = RenderPipelineBuilder::new("Overrun")
            .shaders(ShaderSources::single(WGSL))
            .vertex_buffer(VertexBufferSpec::new(8).attribute(0, wgpu::VertexFormat::Float32x3, 0));
        assert!(builder.validate(SURFACE).is_err());
    }

    #[test]
    fn rejects_duplicate_bindings_and_zero_sized_uniforms() {
        let duplicate = lit_builder().binding(BindingSpec::sampler(3));
        assert!(duplicate.validate(SURFACE).is_err());

        let zero = RenderPipelineBuilder::new("Zero")
            .shaders(ShaderSources::single(WGSL))
            .binding(BindingSpec::uniform(0, wgpu::ShaderStages::VERTEX, 0));
        assert!(zero.validate(SURFACE).is_err());
    }

    #[test]
    fn rejects_swapped_color_and_depth_formats() {
        assert!(lit_builder().validate(DEPTH_FORMAT).is_err());

        let bad_depth = lit_builder().depth(DepthSpec {
            format: SURFACE,
            ..Default::default()
        });
        assert!(bad_depth.validate(SURFACE).is_err());
    }

    #[test]
    fn bind_group_indices_must_match_declaration() {
        let declared = lit_builder().bindings().to_vec();

        assert!(check_binding_indices("Lit", &declared, [3, 2, 1, 0].into_iter()).is_ok());
        assert!(check_binding_indices("Lit", &declared, [0, 1, 2].into_iter()).is_err());
        assert!(check_binding_indices("Lit", &declared, [0, 1, 3, 4].into_iter()).is_err());
    }

    #[test]
    fn single_module_is_shared_between_stages() {
        assert!(ShaderSources::single(WGSL).shares_module());
        assert!(!ShaderSources::new(WGSL, "@fragment fn fs_main() {}").shares_module());
    }
}
