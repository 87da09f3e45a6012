//! Boundary surface of a tetrahedral mesh in Wavefront OBJ format.

use std::io::{self, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::mesh::topology::FaceTopology;
use crate::mesh::{Mesh, OrientedFace};

use super::{create_file, FormatError};

/// Writes the boundary faces of the mesh to `path`, naming the object after
/// the file stem.
pub fn write(path: &Path, mesh: &Mesh, topology: Option<&FaceTopology>) -> Result<(), FormatError> {
    let topology = topology.ok_or(FormatError::MissingTopology)?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("mesh"));

    export_obj(
        &mut create_file(path)?,
        &name,
        mesh.vertices(),
        topology.boundary_faces(),
    )
    .map_err(|err| FormatError::from(err).in_file(path))
}

/// Write boundary triangles serialized in OBJ format to provided output
/// writer.
///
/// All vertices are written, so vertex indices stay the same as in the
/// tetrahedral mesh (shifted by one, because OBJ indices start with 1).
/// Faces keep their winding. Flushes `writer` after all data has been
/// written.
pub fn export_obj<W: Write>(
    writer: &mut W,
    name: &str,
    vertices: &[Point3<f64>],
    faces: &[OrientedFace],
) -> io::Result<()> {
    writeln!(writer, "# Exported by tetconvert")?;
    writeln!(writer)?;
    writeln!(writer, "o {}", name)?;
    writeln!(writer)?;

    for vertex in vertices {
        writeln!(writer, "v {:?} {:?} {:?}", vertex.x, vertex.y, vertex.z)?;
    }
    writeln!(writer)?;

    for face in faces {
        let (i0, i1, i2) = face.vertices;
        writeln!(
            writer,
            "f {} {} {}",
            u64::from(i0) + 1,
            u64::from(i1) + 1,
            u64::from(i2) + 1,
        )?;
    }

    writer.flush()
}
