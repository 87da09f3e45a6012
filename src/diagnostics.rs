use std::fmt;

use nalgebra::Point3;

use crate::mesh::{Tetrahedron, UnorientedFace};

/// How serious a diagnostic is. None of them stops a conversion on its own,
/// the caller decides what to do about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn log_level(self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

/// A per-tetrahedron or per-face issue found while repairing orientation
/// or recovering face topology.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Diagnostic {
    /// The tetrahedron has zero signed volume. It was left unchanged.
    DegenerateTetrahedron {
        tet_index: u32,
        tetrahedron: Tetrahedron,
        corners: [Point3<f64>; 4],
    },
    /// The tetrahedron had negative signed volume and its first two
    /// vertices were swapped.
    OrientationCorrected { tet_index: u32 },
    /// More than two tetrahedra share the face. Only the first two owners
    /// are recorded in the face topology.
    NonManifoldFace {
        face_index: u32,
        face: UnorientedFace,
        owners: (u32, u32),
        extra_owner: u32,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::DegenerateTetrahedron { .. } => Severity::Warning,
            Diagnostic::OrientationCorrected { .. } => Severity::Info,
            Diagnostic::NonManifoldFace { .. } => Severity::Error,
        }
    }

    /// Index of the tetrahedron the diagnostic is about. For non-manifold
    /// faces this is the tetrahedron that was found to be the extra owner.
    pub fn tet_index(&self) -> u32 {
        match self {
            Diagnostic::DegenerateTetrahedron { tet_index, .. } => *tet_index,
            Diagnostic::OrientationCorrected { tet_index } => *tet_index,
            Diagnostic::NonManifoldFace { extra_owner, .. } => *extra_owner,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::DegenerateTetrahedron {
                tet_index,
                tetrahedron,
                corners,
            } => {
                write!(f, "Zero-volume tetrahedron #{} {}:", tet_index, tetrahedron)?;
                for (name, corner) in ["a", "b", "c", "d"].iter().zip(corners) {
                    // Debug formatting of floats round-trips exactly.
                    write!(f, " {}= {:?} {:?} {:?}", name, corner.x, corner.y, corner.z)?;
                }
                Ok(())
            }
            Diagnostic::OrientationCorrected { tet_index } => {
                write!(f, "Corrected inverted tetrahedron #{}", tet_index)
            }
            Diagnostic::NonManifoldFace {
                face_index,
                face,
                owners,
                extra_owner,
            } => write!(
                f,
                "Face #{} {} is shared by more than two tetrahedra: #{}, #{} and #{}",
                face_index, face, owners.0, owners.1, extra_owner,
            ),
        }
    }
}
