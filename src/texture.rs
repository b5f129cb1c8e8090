use std::path::Path;

use crate::error::Result;
use crate::gpu::GpuContext;

/// Two-tone checker used when a material image cannot be loaded.
const CHECKER_LIGHT: [u8; 4] = [230, 230, 230, 255];
const CHECKER_DARK: [u8; 4] = [150, 90, 60, 255];

/// A sampled 2D texture with its view and a linear, repeating sampler.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from tightly packed RGBA8 pixels.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &Path) -> Result<Self> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(gpu, &img, width, height, &path.display().to_string()))
    }

    /// Procedural checkerboard of `cells × cells` squares.
    pub fn checker(gpu: &GpuContext, size: u32, cells: u32) -> Self {
        let data = checker_pixels(size, cells);
        Self::from_rgba(gpu, &data, size, size, "Checker Texture")
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

/// Loads the scene material, falling back to a checkerboard.
///
/// A missing or undecodable image is not fatal; it is logged and replaced.
pub fn load_material(gpu: &GpuContext, material: Option<&Path>) -> Texture {
    let Some(path) = material else {
        return Texture::checker(gpu, 256, 8);
    };

    match Texture::from_file(gpu, path) {
        Ok(texture) => {
            log::info!(
                "loaded material {} ({}x{})",
                path.display(),
                texture.width,
                texture.height
            );
            texture
        }
        Err(err) => {
            log::warn!("material {} unavailable ({err}), using checker", path.display());
            Texture::checker(gpu, 256, 8)
        }
    }
}

/// RGBA8 pixels of a `size × size` checkerboard with `cells` squares per side.
pub fn checker_pixels(size: u32, cells: u32) -> Vec<u8> {
    let cell = (size / cells.max(1)).max(1);
    let mut data = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let light = (x / cell + y / cell) % 2 == 0;
            data.extend_from_slice(if light { &CHECKER_LIGHT } else { &CHECKER_DARK });
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(data: &[u8], size: u32, x: u32, y: u32) -> &[u8] {
        let idx = ((y * size + x) * 4) as usize;
        &data[idx..idx + 4]
    }

    #[test]
    fn checker_alternates_cells() {
        let data = checker_pixels(16, 4);
        assert_eq!(data.len(), 16 * 16 * 4);

        assert_eq!(pixel(&data, 16, 0, 0), CHECKER_LIGHT);
        assert_eq!(pixel(&data, 16, 3, 3), CHECKER_LIGHT);
        assert_eq!(pixel(&data, 16, 4, 0), CHECKER_DARK);
        assert_eq!(pixel(&data, 16, 4, 4), CHECKER_LIGHT);
    }

    #[test]
    fn checker_tolerates_more_cells_than_pixels() {
        let data = checker_pixels(2, 8);
        assert_eq!(pixel(&data, 2, 1, 0), CHECKER_DARK);
    }
}
