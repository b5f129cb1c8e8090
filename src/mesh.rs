//! Vertex buffers on the GPU.
//!
//! A [`Mesh`] is a set of vertex buffers, one per attribute stream, plus the
//! number of vertices to draw. Buffer slots follow the order the streams were
//! added in, which must match the pipeline's vertex buffer order.
//!
//! ```ignore
//! let cube = geometry::cube();
//! let mesh = Mesh::builder("Cube")
//!     .stream(&cube.positions)
//!     .stream(&cube.colors)
//!     .build(&gpu.device, cube.vertex_count());
//! ```

use wgpu::util::DeviceExt;

use crate::geometry::VertexData;

/// Uploads `data` into a new vertex buffer.
pub fn create_vertex_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    data: &[T],
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Vertex buffers ready to bind, in slot order.
#[derive(Debug)]
pub struct Mesh {
    buffers: Vec<wgpu::Buffer>,
    vertex_count: u32,
}

/// Collects attribute streams for a [`Mesh`].
pub struct MeshBuilder<'a> {
    label: &'a str,
    streams: Vec<&'a [u8]>,
}

impl<'a> MeshBuilder<'a> {
    /// Adds the next vertex buffer slot.
    pub fn stream<T: bytemuck::Pod>(mut self, data: &'a [T]) -> Self {
        self.streams.push(bytemuck::cast_slice(data));
        self
    }

    pub fn build(self, device: &wgpu::Device, vertex_count: u32) -> Mesh {
        let label = self.label;
        let buffers = self
            .streams
            .into_iter()
            .enumerate()
            .map(|(slot, bytes)| {
                create_vertex_buffer(device, &format!("{label} Vertex Buffer {slot}"), bytes)
            })
            .collect();

        Mesh {
            buffers,
            vertex_count,
        }
    }
}

impl Mesh {
    pub fn builder(label: &str) -> MeshBuilder<'_> {
        MeshBuilder {
            label,
            streams: Vec::new(),
        }
    }

    /// Positions in slot 0, colors in slot 1.
    pub fn colored(device: &wgpu::Device, label: &str, data: &VertexData) -> Self {
        Self::builder(label)
            .stream(&data.positions)
            .stream(&data.colors)
            .build(device, data.vertex_count())
    }

    /// Positions, normals and uvs in slots 0, 1 and 2.
    pub fn lit(device: &wgpu::Device, label: &str, data: &VertexData) -> Self {
        Self::builder(label)
            .stream(&data.positions)
            .stream(&data.normals)
            .stream(&data.uvs)
            .build(device, data.vertex_count())
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Binds every stream and issues one draw of `instances` instances.
    ///
    /// An empty mesh draws nothing.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: u32) {
        if self.vertex_count == 0 || instances == 0 {
            return;
        }
        for (slot, buffer) in self.buffers.iter().enumerate() {
            pass.set_vertex_buffer(slot as u32, buffer.slice(..));
        }
        pass.draw(0..self.vertex_count, 0..instances);
    }
}
