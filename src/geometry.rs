//! CPU-side vertex data for the demo shapes.
//!
//! Every shape is emitted as non-indexed triangle (or line) lists split into
//! separate attribute streams, one vertex buffer per attribute:
//!
//! | Stream | Format | Stride | Location |
//! |---|---|---|---|
//! | positions | `float32x3` | 12 | 0 |
//! | normals or colors | `float32x3` | 12 | 1 |
//! | uvs | `float32x2` | 8 | 2 |
//!
//! Nothing here touches the GPU; [`crate::mesh`] uploads the streams.

use glam::{Vec2, Vec3};

/// Attribute streams of one shape. Unused streams stay empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
}

impl VertexData {
    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }
}

// Two triangles per face: (0, 1, 2) and (2, 3, 0) over the corners below.
const CUBE_FACES: [([[f32; 3]; 4], [f32; 3]); 6] = [
    // front
    ([[-1., -1., 1.], [1., -1., 1.], [1., 1., 1.], [-1., 1., 1.]], [0., 0., 1.]),
    // right
    ([[1., -1., 1.], [1., -1., -1.], [1., 1., -1.], [1., 1., 1.]], [1., 0., 0.]),
    // back
    ([[-1., -1., -1.], [-1., 1., -1.], [1., 1., -1.], [1., -1., -1.]], [0., 0., -1.]),
    // left
    ([[-1., -1., 1.], [-1., 1., 1.], [-1., 1., -1.], [-1., -1., -1.]], [-1., 0., 0.]),
    // top
    ([[-1., 1., 1.], [1., 1., 1.], [1., 1., -1.], [-1., 1., -1.]], [0., 1., 0.]),
    // bottom
    ([[-1., -1., 1.], [-1., -1., -1.], [1., -1., -1.], [1., -1., 1.]], [0., -1., 0.]),
];

const QUAD_CORNERS: [usize; 6] = [0, 1, 2, 2, 3, 0];
const QUAD_UVS: [[f32; 2]; 4] = [[0., 0.], [1., 0.], [1., 1.], [0., 1.]];

/// A 2×2×2 cube centred on the origin, 36 vertices.
///
/// Each vertex carries its face normal, a per-face UV square and a color equal
/// to its position remapped from `[-1, 1]` to `[0, 1]`.
pub fn cube() -> VertexData {
    let mut data = VertexData::default();

    for (corners, normal) in CUBE_FACES {
        for corner in QUAD_CORNERS {
            let position = corners[corner];
            data.positions.push(position);
            data.normals.push(normal);
            data.colors.push(position.map(|c| (c + 1.0) * 0.5));
            data.uvs.push(QUAD_UVS[corner]);
        }
    }

    data
}

/// Point on a sphere at polar angle `theta` and azimuth `phi`, both in degrees.
///
/// `theta = 0` is the +Y pole; `phi` runs counter-clockwise seen from above,
/// starting at +X.
pub fn sphere_point(radius: f32, theta: f32, phi: f32) -> Vec3 {
    let (sin_t, cos_t) = theta.to_radians().sin_cos();
    let (sin_p, cos_p) = phi.to_radians().sin_cos();
    Vec3::new(radius * sin_t * cos_p, radius * cos_t, -radius * sin_t * sin_p)
}

/// Equirectangular texture coordinate of a unit-sphere direction.
pub fn sphere_uv(n: Vec3) -> [f32; 2] {
    use std::f32::consts::PI;
    [
        0.5 + n.x.atan2(n.z) / PI / 2.0,
        0.5 + n.y.clamp(-1.0, 1.0).asin() / PI,
    ]
}

/// UV sphere with `u` rings of latitude and `v` meridians.
///
/// Emits `(u - 1) * (v - 1)` quads, each as triangles `(p0, p1, p3)` and
/// `(p1, p2, p3)`. Normals are `p / radius`. Returns `None` when `u < 2`,
/// `v < 2` or the radius is not positive.
pub fn sphere(radius: f32, u: u32, v: u32) -> Option<VertexData> {
    if u < 2 || v < 2 || radius <= 0.0 || !radius.is_finite() {
        return None;
    }

    let grid: Vec<Vec<Vec3>> = (0..u)
        .map(|i| {
            let theta = i as f32 * 180.0 / (u - 1) as f32;
            (0..v)
                .map(|j| sphere_point(radius, theta, j as f32 * 360.0 / (v - 1) as f32))
                .collect()
        })
        .collect();

    let quads = ((u - 1) * (v - 1)) as usize;
    let mut data = VertexData {
        positions: Vec::with_capacity(quads * 6),
        normals: Vec::with_capacity(quads * 6),
        colors: Vec::new(),
        uvs: Vec::with_capacity(quads * 6),
    };

    for i in 0..(u - 1) as usize {
        for j in 0..(v - 1) as usize {
            let p0 = grid[i][j];
            let p1 = grid[i + 1][j];
            let p2 = grid[i + 1][j + 1];
            let p3 = grid[i][j + 1];

            for p in [p0, p1, p3, p1, p2, p3] {
                let n = p / radius;
                data.positions.push(p.to_array());
                data.normals.push(n.to_array());
                data.uvs.push(sphere_uv(n));
            }
        }
    }

    Some(data)
}

/// Endpoints shown by the line demo before the user adds any.
pub const DEFAULT_LINE_POINTS: [Vec2; 4] = [
    Vec2::new(-0.75, 0.75),
    Vec2::new(0.75, -0.75),
    Vec2::new(0.75, 0.75),
    Vec2::new(-0.75, -0.75),
];

/// Maps a cursor position in pixels to normalized device coordinates.
///
/// The window centre is the origin; +Y points up.
pub fn cursor_to_ndc(cursor: Vec2, width: u32, height: u32) -> Vec2 {
    let half = Vec2::new(width.max(1) as f32, height.max(1) as f32) * 0.5;
    Vec2::new((cursor.x - half.x) / half.x, (-cursor.y + half.y) / half.y)
}

/// Line-list endpoints in NDC.
///
/// Starts out showing [`DEFAULT_LINE_POINTS`]. The first user point replaces the
/// defaults; every further point extends the list. Consecutive pairs form one
/// segment, so an odd trailing point is not drawn until it gets a partner.
#[derive(Clone, Debug, PartialEq)]
pub struct LinePoints {
    points: Vec<Vec2>,
    user_points: bool,
}

impl Default for LinePoints {
    fn default() -> Self {
        Self {
            points: DEFAULT_LINE_POINTS.to_vec(),
            user_points: false,
        }
    }
}

impl LinePoints {
    pub fn push(&mut self, point: Vec2) {
        if !self.user_points {
            self.points.clear();
            self.user_points = true;
        }
        self.points.push(point);
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() / 2
    }

    /// The points as a `float32x2` position stream.
    pub fn positions(&self) -> Vec<[f32; 2]> {
        self.points.iter().map(|p| p.to_array()).collect()
    }
}
