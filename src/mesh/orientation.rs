use nalgebra::Point3;

use crate::convert::cast_u32;
use crate::diagnostics::Diagnostic;
use crate::geometry;

use super::{corners, validate_tetrahedra, MeshError, Tetrahedron};

/// Result of an orientation repair pass.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationRepair {
    /// The repaired tetrahedra, in the same order as the input.
    pub tetrahedra: Vec<Tetrahedron>,
    /// One `OrientationCorrected` per flipped tetrahedron and one
    /// `DegenerateTetrahedron` per zero-volume tetrahedron, in tetrahedron
    /// order.
    pub diagnostics: Vec<Diagnostic>,
}

impl OrientationRepair {
    pub fn corrected_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::OrientationCorrected { .. }))
            .count()
    }

    pub fn degenerate_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::DegenerateTetrahedron { .. }))
            .count()
    }
}

/// Makes all tetrahedra positively oriented.
///
/// Every tetrahedron with a negative `orient3d` gets its first two vertices
/// swapped, which inverts its orientation while keeping its vertex set.
/// Tetrahedra with exactly zero `orient3d` can't be fixed and are reported
/// as degenerate, keeping their vertex order. The tetrahedra are never
/// reordered, added or removed, and vertices are never touched.
///
/// Running the repair on already repaired tetrahedra is a no-op.
///
/// Fails with `MeshError::InvalidTetrahedron` if a tetrahedron references a
/// vertex that doesn't exist.
pub fn repair_orientation(
    vertices: &[Point3<f64>],
    tetrahedra: &[Tetrahedron],
) -> Result<OrientationRepair, MeshError> {
    validate_tetrahedra(tetrahedra, vertices.len())?;

    Ok(repair_validated(vertices, tetrahedra))
}

/// Same as `repair_orientation`, for tetrahedra already known to reference
/// valid vertices.
pub(crate) fn repair_validated(
    vertices: &[Point3<f64>],
    tetrahedra: &[Tetrahedron],
) -> OrientationRepair {
    let mut repaired = Vec::with_capacity(tetrahedra.len());
    let mut diagnostics = Vec::new();

    for (tet_index, tetrahedron) in tetrahedra.iter().enumerate() {
        let tet_corners = corners(vertices, *tetrahedron);
        let [a, b, c, d] = &tet_corners;
        let orientation = geometry::orient3d(a, b, c, d);

        if orientation == 0.0 {
            diagnostics.push(Diagnostic::DegenerateTetrahedron {
                tet_index: cast_u32(tet_index),
                tetrahedron: *tetrahedron,
                corners: tet_corners,
            });
            repaired.push(*tetrahedron);
        } else if orientation < 0.0 {
            diagnostics.push(Diagnostic::OrientationCorrected {
                tet_index: cast_u32(tet_index),
            });
            repaired.push(tetrahedron.to_flipped());
        } else {
            repaired.push(*tetrahedron);
        }
    }

    OrientationRepair {
        tetrahedra: repaired,
        diagnostics,
    }
}
