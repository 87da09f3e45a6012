use std::error;
use std::fmt;

use fxhash::FxHashMap;

use crate::convert::{cast_u32, cast_usize};
use crate::diagnostics::Diagnostic;

use super::{OrientedFace, Tetrahedron, UnorientedFace};

/// Raised when face topology can't be recovered consistently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A boundary face couldn't be found among the faces of the tetrahedron
    /// owning it. Indicates corrupted topology data.
    Inconsistency { face_index: u32, tet_index: u32 },
}

impl error::Error for TopologyError {}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TopologyError::Inconsistency {
                face_index,
                tet_index,
            } => write!(
                f,
                "Face #{} is not a face of its owning tetrahedron #{}",
                face_index, tet_index,
            ),
        }
    }
}

/// The tetrahedra owning a face. A face in a manifold tetrahedral mesh
/// has one owner if it lies on the boundary and two if it's interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FaceOwners {
    pub first: u32,
    pub second: Option<u32>,
}

impl FaceOwners {
    pub fn is_boundary(&self) -> bool {
        self.second.is_none()
    }
}

/// Faces of a tetrahedral mesh and their relations to its tetrahedra,
/// recovered from the tetrahedra alone.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTopology {
    unique_faces: Vec<UnorientedFace>,
    tet_to_face: Vec<[u32; 4]>,
    face_to_tet: Vec<FaceOwners>,
    boundary_faces: Vec<OrientedFace>,
    diagnostics: Vec<Diagnostic>,
}

impl FaceTopology {
    /// Recovers faces, tet <-> face relations and boundary faces.
    ///
    /// Every tetrahedron contributes its four oriented faces (see
    /// `Tetrahedron::to_oriented_faces`). Faces are identified by their
    /// sorted vertex indices and deduplicated, keeping the order in which
    /// they were first seen. A face is owned by the tetrahedra it was
    /// generated from, in tetrahedron order.
    ///
    /// Faces with a single owner are boundary faces. They are returned with
    /// the winding they have in their owning tetrahedron, so for positively
    /// oriented tetrahedra they face out of the mesh.
    ///
    /// A face with more than two owners makes the mesh non-manifold. It is
    /// reported as `Diagnostic::NonManifoldFace` for every extra owner and
    /// only the first two owners are kept.
    pub fn build(tetrahedra: &[Tetrahedron]) -> Result<Self, TopologyError> {
        // A closed tetrahedral mesh has roughly twice as many faces as
        // tetrahedra.
        let face_capacity = tetrahedra.len() * 2 + 4;
        let mut face_indices: FxHashMap<UnorientedFace, u32> =
            FxHashMap::with_capacity_and_hasher(face_capacity, Default::default());
        let mut unique_faces: Vec<UnorientedFace> = Vec::with_capacity(face_capacity);
        let mut tet_to_face: Vec<[u32; 4]> = Vec::with_capacity(tetrahedra.len());

        for tetrahedron in tetrahedra {
            let mut tet_faces = [0; 4];

            for (slot, face) in tetrahedron.to_unoriented_faces().iter().enumerate() {
                tet_faces[slot] = *face_indices.entry(*face).or_insert_with(|| {
                    unique_faces.push(*face);
                    cast_u32(unique_faces.len() - 1)
                });
            }

            tet_to_face.push(tet_faces);
        }

        let mut owners: Vec<(Option<u32>, Option<u32>)> = vec![(None, None); unique_faces.len()];
        let mut diagnostics = Vec::new();

        for (tet_index, tet_faces) in tet_to_face.iter().enumerate() {
            let tet_index = cast_u32(tet_index);

            for &face_index in tet_faces {
                let face_owners = &mut owners[cast_usize(face_index)];

                match *face_owners {
                    (None, _) => face_owners.0 = Some(tet_index),
                    (Some(_), None) => face_owners.1 = Some(tet_index),
                    (Some(first), Some(second)) => {
                        diagnostics.push(Diagnostic::NonManifoldFace {
                            face_index,
                            face: unique_faces[cast_usize(face_index)],
                            owners: (first, second),
                            extra_owner: tet_index,
                        });
                    }
                }
            }
        }

        let mut face_to_tet = Vec::with_capacity(owners.len());
        let mut boundary_faces = Vec::new();

        for (face_index, (face, face_owners)) in unique_faces.iter().zip(&owners).enumerate() {
            let face_index = cast_u32(face_index);
            // Every unique face was generated from some tetrahedron, which
            // became its first owner.
            let first = face_owners.0.ok_or(TopologyError::Inconsistency {
                face_index,
                tet_index: 0,
            })?;
            let face_owners = FaceOwners {
                first,
                second: face_owners.1,
            };

            if face_owners.is_boundary() {
                let owner = tetrahedra[cast_usize(first)];
                let oriented_face = find_oriented_face(owner, *face).ok_or(
                    TopologyError::Inconsistency {
                        face_index,
                        tet_index: first,
                    },
                )?;
                boundary_faces.push(oriented_face);
            }

            face_to_tet.push(face_owners);
        }

        Ok(FaceTopology {
            unique_faces,
            tet_to_face,
            face_to_tet,
            boundary_faces,
            diagnostics,
        })
    }

    /// Unique faces, in the order they were first encountered.
    pub fn unique_faces(&self) -> &[UnorientedFace] {
        &self.unique_faces
    }

    /// For each tetrahedron, indices into `unique_faces` of its four faces,
    /// in the order of `Tetrahedron::to_oriented_faces`.
    pub fn tet_to_face(&self) -> &[[u32; 4]] {
        &self.tet_to_face
    }

    /// For each unique face, the tetrahedra owning it.
    pub fn face_to_tet(&self) -> &[FaceOwners] {
        &self.face_to_tet
    }

    /// Faces owned by a single tetrahedron, oriented as in their owner, in
    /// the order of `unique_faces`.
    pub fn boundary_faces(&self) -> &[OrientedFace] {
        &self.boundary_faces
    }

    /// `Diagnostic::NonManifoldFace` for each extra face owner found.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn interior_face_count(&self) -> usize {
        self.unique_faces.len() - self.boundary_faces.len()
    }

    /// Number of distinct faces shared by more than two tetrahedra.
    pub fn non_manifold_face_count(&self) -> usize {
        let mut face_indices: Vec<u32> = self
            .diagnostics
            .iter()
            .filter_map(|diagnostic| match diagnostic {
                Diagnostic::NonManifoldFace { face_index, .. } => Some(*face_index),
                _ => None,
            })
            .collect();
        face_indices.sort_unstable();
        face_indices.dedup();

        face_indices.len()
    }

    /// Returns whether no face is shared by more than two tetrahedra.
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_face_count() == 0
    }
}

/// Finds the face of `tetrahedron` consisting of the same vertices as
/// `face`, with the winding it has in the tetrahedron.
fn find_oriented_face(tetrahedron: Tetrahedron, face: UnorientedFace) -> Option<OrientedFace> {
    tetrahedron
        .to_oriented_faces()
        .iter()
        .copied()
        .find(|oriented_face| oriented_face.to_unoriented() == face)
}
