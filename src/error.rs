//! Crate-wide error type.
//!
//! Every fallible operation in spinframe returns [`RenderError`]. The variants
//! mirror the failure classes a demo can hit: no usable GPU, a uniform write that
//! disagrees with the shader-side struct layout, a pipeline description that cannot
//! be built, or a surface that refuses to hand out a frame.

use crate::uniform::UniformRole;

/// Errors produced while setting up or driving a scene.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No adapter or surface could be obtained. Detected once at startup.
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    /// The adapter was found but refused to create a device.
    #[error("failed to create device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// A write's byte length disagrees with the size of the region it targets.
    #[error("layout mismatch for {role}: region holds {expected} bytes, write supplied {actual}")]
    LayoutMismatch {
        role: UniformRole,
        expected: u64,
        actual: u64,
    },

    /// The layout has no region tagged with this role.
    #[error("uniform layout has no {0} region")]
    UnknownRegion(UniformRole),

    /// A raw byte range fell outside the buffer.
    #[error("byte range at {offset} (len {len}) exceeds buffer capacity {capacity}")]
    OutOfBounds { offset: u64, len: u64, capacity: u64 },

    /// A uniform layout was rejected at construction time.
    #[error("invalid uniform layout: {0}")]
    InvalidLayout(String),

    /// A pipeline description was rejected before any GPU object was created.
    #[error("invalid pipeline description: {0}")]
    InvalidPipeline(String),

    /// WGSL failed to parse or validate.
    #[error("shader '{label}' failed to compile: {message}")]
    ShaderCompilation { label: String, message: String },

    /// The device rejected the pipeline (binding or interface mismatch).
    #[error("pipeline '{label}' could not be created: {message}")]
    PipelineCreation { label: String, message: String },

    /// The surface could not provide a texture for this frame.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// An image could not be decoded into a texture.
    #[error("texture load failed: {0}")]
    Texture(#[from] image::ImageError),

    /// A user-supplied parameter was rejected under the strict input policy.
    #[error("invalid input for {field}: {value:?}")]
    InvalidInput { field: &'static str, value: String },
}

/// Result alias used throughout the crate.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;
