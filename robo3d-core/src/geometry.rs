/// Geometry primitives: the shared unit cube every robot segment is drawn with
use nalgebra::{Point3, Vector3};

/// Number of vertices in the flat-shaded cube (6 faces x 2 triangles x 3).
pub const CUBE_VERTEX_COUNT: usize = 36;

/// RGBA color, components in `[0, 1]`.
pub type Color = [f32; 4];

/// A 3D vertex with position, face normal and face color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub color: Color,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, color: Color) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's winding
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

// Corners of a unit cube centered at the origin.
const CORNERS: [[f32; 3]; 8] = [
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
];

const FACE_COLORS: [Color; 6] = [
    [1.0, 0.0, 0.0, 1.0], // red
    [0.0, 1.0, 0.0, 1.0], // green
    [0.0, 0.0, 1.0, 1.0], // blue
    [1.0, 1.0, 0.0, 1.0], // yellow
    [1.0, 0.0, 1.0, 1.0], // magenta
    [0.0, 1.0, 1.0, 1.0], // cyan
];

const FACE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
];

#[rustfmt::skip]
const INDICES: [usize; CUBE_VERTEX_COUNT] = [
    0, 1, 2, 0, 2, 3, // +z face
    1, 5, 6, 1, 6, 2, // +x face
    5, 4, 7, 5, 7, 6, // -z face
    4, 0, 3, 4, 3, 7, // -x face
    3, 2, 6, 3, 6, 7, // +y face
    4, 5, 1, 4, 1, 0, // -y face
];

/// Immutable cube mesh, generated once and shared by every draw call.
///
/// Vertices are stored unindexed so that each face carries its own normal
/// and color: the two triangles of a face share one normal and one color.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMesh {
    vertices: Vec<Vertex>,
}

impl CubeMesh {
    /// Build the unit cube. Deterministic; the same data on every call.
    pub fn unit() -> Self {
        let vertices = INDICES
            .iter()
            .enumerate()
            .map(|(i, &corner)| {
                let face = i / 6;
                let [x, y, z] = CORNERS[corner];
                let [nx, ny, nz] = FACE_NORMALS[face];
                Vertex::new(
                    Point3::new(x, y, z),
                    Vector3::new(nx, ny, nz),
                    FACE_COLORS[face],
                )
            })
            .collect();

        Self { vertices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|tri| Triangle::new(tri[0], tri[1], tri[2]))
    }

    /// Positions as a flat `x, y, z` buffer, ready for upload.
    pub fn positions(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| [v.position.x, v.position.y, v.position.z])
            .collect()
    }

    /// Normals as a flat `x, y, z` buffer.
    pub fn normals(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| [v.normal.x, v.normal.y, v.normal.z])
            .collect()
    }

    /// Colors as a flat `r, g, b, a` buffer.
    pub fn colors(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.color).collect()
    }
}

impl Default for CubeMesh {
    fn default() -> Self {
        Self::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_buffer_sizes() {
        let cube = CubeMesh::unit();
        assert_eq!(cube.vertex_count(), CUBE_VERTEX_COUNT);
        assert_eq!(cube.positions().len(), CUBE_VERTEX_COUNT * 3);
        assert_eq!(cube.normals().len(), CUBE_VERTEX_COUNT * 3);
        assert_eq!(cube.colors().len(), CUBE_VERTEX_COUNT * 4);
        assert_eq!(cube.triangles().count(), 12);
    }

    #[test]
    fn test_cube_is_deterministic() {
        assert_eq!(CubeMesh::unit(), CubeMesh::unit());
        assert_eq!(CubeMesh::unit().positions(), CubeMesh::unit().positions());
    }

    #[test]
    fn test_faces_share_normal_and_color() {
        let cube = CubeMesh::unit();
        for face in cube.vertices().chunks_exact(6) {
            let first = face[0];
            for v in face {
                assert_eq!(v.normal, first.normal);
                assert_eq!(v.color, first.color);
            }
        }
    }

    #[test]
    fn test_normals_point_outward() {
        let cube = CubeMesh::unit();
        for v in cube.vertices() {
            // Every vertex lies on the face plane at distance 0.5 along its normal.
            assert!((v.position.coords.dot(&v.normal) - 0.5).abs() < 1e-6);
        }
        for tri in cube.triangles() {
            let winding = tri.calculate_normal();
            assert!((winding - tri.vertices[0].normal).norm() < 1e-6);
        }
    }
}
