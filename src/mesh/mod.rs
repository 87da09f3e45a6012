use std::error;
use std::fmt;

use nalgebra::Point3;

use crate::convert::cast_usize;
use crate::geometry;

use self::orientation::OrientationRepair;
use self::topology::{FaceTopology, TopologyError};

pub mod orientation;
pub mod topology;

/// Errors raised when tetrahedra don't form a valid mesh together with its
/// vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A tetrahedron references a vertex that doesn't exist.
    InvalidTetrahedron {
        tet_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },
}

impl error::Error for MeshError {}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MeshError::InvalidTetrahedron {
                tet_index,
                vertex_index,
                vertex_count,
            } => write!(
                f,
                "Tetrahedron #{} references vertex {}, but the mesh only has {} vertices",
                tet_index, vertex_index, vertex_count,
            ),
        }
    }
}

/// A tetrahedral mesh: a list of vertex positions and a list of tetrahedra
/// indexing into it.
///
/// Vertex ids are always zero-based, regardless of the index origin of the
/// file the mesh was read from. Every tetrahedron is guaranteed to reference
/// existing vertices.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    tetrahedra: Vec<Tetrahedron>,
}

impl Mesh {
    /// Creates a new mesh from vertices and tetrahedra.
    ///
    /// Fails with `MeshError::InvalidTetrahedron` if any tetrahedron refers
    /// to an out-of-bounds vertex.
    pub fn new<V, T>(vertices: V, tetrahedra: T) -> Result<Self, MeshError>
    where
        V: IntoIterator<Item = Point3<f64>>,
        T: IntoIterator<Item = Tetrahedron>,
    {
        let vertices: Vec<_> = vertices.into_iter().collect();
        let tetrahedra: Vec<_> = tetrahedra.into_iter().collect();

        validate_tetrahedra(&tetrahedra, vertices.len())?;

        Ok(Self {
            vertices,
            tetrahedra,
        })
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.tetrahedra
    }

    /// Returns the positions of the four corners of a tetrahedron of this
    /// mesh, in the tetrahedron's vertex order.
    pub fn tetrahedron_corners(&self, tetrahedron: Tetrahedron) -> [Point3<f64>; 4] {
        corners(&self.vertices, tetrahedron)
    }

    /// Returns a mesh with every tetrahedron positively oriented, along
    /// with the repair describing the corrections made and the degenerate
    /// tetrahedra found.
    ///
    /// See `orientation::repair_orientation`.
    pub fn repair_orientation(self) -> (Mesh, OrientationRepair) {
        let repair = orientation::repair_validated(&self.vertices, &self.tetrahedra);
        let mesh = Mesh {
            vertices: self.vertices,
            tetrahedra: repair.tetrahedra.clone(),
        };

        (mesh, repair)
    }

    /// Recovers faces and their relations to tetrahedra from the mesh
    /// connectivity.
    pub fn face_topology(&self) -> Result<FaceTopology, TopologyError> {
        FaceTopology::build(&self.tetrahedra)
    }

    /// Returns a copy of the mesh with all vertex coordinates multiplied by
    /// `factor`.
    pub fn scaled(&self, factor: f64) -> Mesh {
        Mesh {
            vertices: self
                .vertices
                .iter()
                .map(|v| Point3::from(v.coords * factor))
                .collect(),
            tetrahedra: self.tetrahedra.clone(),
        }
    }

    /// Sum of signed volumes of all tetrahedra.
    pub fn signed_volume(&self) -> f64 {
        self.tetrahedra
            .iter()
            .map(|tetrahedron| {
                let [a, b, c, d] = self.tetrahedron_corners(*tetrahedron);
                geometry::signed_volume(&a, &b, &c, &d)
            })
            .sum()
    }
}

/// Checks that all tetrahedra reference vertices in `0..vertex_count`.
pub fn validate_tetrahedra(tetrahedra: &[Tetrahedron], vertex_count: usize) -> Result<(), MeshError> {
    for (tet_index, tetrahedron) in tetrahedra.iter().enumerate() {
        for &vertex_index in &tetrahedron.vertices {
            if cast_usize(vertex_index) >= vertex_count {
                return Err(MeshError::InvalidTetrahedron {
                    tet_index,
                    vertex_index,
                    vertex_count,
                });
            }
        }
    }

    Ok(())
}

pub(crate) fn corners(vertices: &[Point3<f64>], tetrahedron: Tetrahedron) -> [Point3<f64>; 4] {
    let [i0, i1, i2, i3] = tetrahedron.vertices;

    [
        vertices[cast_usize(i0)],
        vertices[cast_usize(i1)],
        vertices[cast_usize(i2)],
        vertices[cast_usize(i3)],
    ]
}

/// A tetrahedral mesh element. Contains indices of its four vertices.
///
/// The vertex order determines the orientation of the tetrahedron and the
/// winding of its faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Tetrahedron {
    pub vertices: [u32; 4],
}

impl Tetrahedron {
    pub fn new(i0: u32, i1: u32, i2: u32, i3: u32) -> Self {
        Tetrahedron {
            vertices: [i0, i1, i2, i3],
        }
    }

    /// Generates the 4 oriented faces of the tetrahedron.
    ///
    /// For `(i0, i1, i2, i3)` the faces are `(i0, i1, i2)`, `(i0, i2, i3)`,
    /// `(i0, i3, i1)` and `(i1, i3, i2)`, in this order. For a positively
    /// oriented tetrahedron all of them face outwards.
    pub fn to_oriented_faces(&self) -> [OrientedFace; 4] {
        let [i0, i1, i2, i3] = self.vertices;

        [
            OrientedFace::new(i0, i1, i2),
            OrientedFace::new(i0, i2, i3),
            OrientedFace::new(i0, i3, i1),
            OrientedFace::new(i1, i3, i2),
        ]
    }

    /// Generates the 4 unoriented faces of the tetrahedron, in the same
    /// order as `to_oriented_faces`.
    pub fn to_unoriented_faces(&self) -> [UnorientedFace; 4] {
        let [f0, f1, f2, f3] = self.to_oriented_faces();

        [
            f0.to_unoriented(),
            f1.to_unoriented(),
            f2.to_unoriented(),
            f3.to_unoriented(),
        ]
    }

    /// Returns the same tetrahedron with its first two vertices swapped,
    /// which inverts its orientation.
    pub fn to_flipped(&self) -> Self {
        let [i0, i1, i2, i3] = self.vertices;
        Tetrahedron::new(i1, i0, i2, i3)
    }
}

impl From<[u32; 4]> for Tetrahedron {
    fn from(vertices: [u32; 4]) -> Tetrahedron {
        Tetrahedron { vertices }
    }
}

impl fmt::Display for Tetrahedron {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [i0, i1, i2, i3] = self.vertices;
        write!(f, "Tet({}, {}, {}, {})", i0, i1, i2, i3)
    }
}

/// Oriented triangular face.
///
/// Contains indices to mesh vertices. The winding of the vertices
/// determines which side of the face is its front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct OrientedFace {
    pub vertices: (u32, u32, u32),
}

impl OrientedFace {
    pub fn new(i0: u32, i1: u32, i2: u32) -> Self {
        OrientedFace {
            vertices: (i0, i1, i2),
        }
    }

    pub fn to_unoriented(self) -> UnorientedFace {
        UnorientedFace::new(self.vertices.0, self.vertices.1, self.vertices.2)
    }

    pub fn contains_vertex(self, vertex_index: u32) -> bool {
        self.vertices.0 == vertex_index
            || self.vertices.1 == vertex_index
            || self.vertices.2 == vertex_index
    }
}

/// Unoriented triangular face.
///
/// The vertex indices are always kept sorted in ascending order, so two
/// unoriented faces are equal (and hash equally) if and only if they
/// consist of the same vertices, regardless of the order they were listed
/// in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct UnorientedFace {
    vertices: (u32, u32, u32),
}

impl UnorientedFace {
    pub fn new(i0: u32, i1: u32, i2: u32) -> Self {
        let mut sorted = [i0, i1, i2];
        sorted.sort_unstable();

        UnorientedFace {
            vertices: (sorted[0], sorted[1], sorted[2]),
        }
    }

    /// The sorted vertex indices of the face.
    pub fn vertices(self) -> (u32, u32, u32) {
        self.vertices
    }
}

impl fmt::Display for UnorientedFace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}, {}, {}}}",
            self.vertices.0, self.vertices.1, self.vertices.2,
        )
    }
}
