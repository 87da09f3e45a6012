//! The tetrahedral mesh format of the AIM@SHAPE repository.
//!
//! ```text
//! <#vertices> vertices
//! <#inner tets> inner tets
//! <#outer tets> outer tets
//! x y z              (one line per vertex)
//! 4 i0 i1 i2 i3      (one line per tetrahedron, zero-based)
//! ```
//!
//! The leading value of a tetrahedron line is its vertex count. The format
//! can't store faces.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::convert::shift_vertex_id;
use crate::mesh::topology::FaceTopology;
use crate::mesh::{Mesh, Tetrahedron};

use super::{capacity_for, create_file, open_file, FormatError, IndexOrigin, ReadOptions, RecordReader};

pub fn read(path: &Path, options: &ReadOptions) -> Result<Mesh, FormatError> {
    let index_origin = options.index_origin.unwrap_or(IndexOrigin::Zero);

    read_tet(open_file(path)?, index_origin).map_err(|err| err.in_file(path))
}

/// Reads a mesh in `.tet` format. Inner and outer tetrahedra are read into
/// a single list, inner ones first.
pub fn read_tet<R: BufRead>(reader: R, index_origin: IndexOrigin) -> Result<Mesh, FormatError> {
    let mut records = RecordReader::new(reader);

    let vertex_count: usize = records
        .expect_record("vertex count")?
        .parse(0, "vertex count")?;
    let inner_count: usize = records
        .expect_record("inner tetrahedron count")?
        .parse(0, "inner tetrahedron count")?;
    let outer_record = records.expect_record("outer tetrahedron count")?;
    let outer_count: usize = outer_record.parse(0, "outer tetrahedron count")?;
    let tetrahedron_count = inner_count.checked_add(outer_count).ok_or_else(|| {
        outer_record.invalid(format!(
            "{} inner and {} outer tetrahedra are too many",
            inner_count, outer_count,
        ))
    })?;

    let mut vertices = Vec::with_capacity(capacity_for(vertex_count));
    for _ in 0..vertex_count {
        let record = records.expect_record("vertex")?;
        record.expect_tokens(3, "vertex")?;

        vertices.push(record.parse_point(0)?);
    }

    let mut tetrahedra = Vec::with_capacity(capacity_for(tetrahedron_count));
    for _ in 0..tetrahedron_count {
        let record = records.expect_record("tetrahedron")?;
        record.expect_tokens(5, "tetrahedron")?;

        let mut tet_vertices = [0; 4];
        for (slot, vertex) in tet_vertices.iter_mut().enumerate() {
            let id: u64 = record.parse(slot + 1, "vertex index")?;
            *vertex = shift_vertex_id(id, index_origin.offset()).ok_or_else(|| {
                record.invalid(format!(
                    "vertex index {} is not valid with {} numbering",
                    id, index_origin,
                ))
            })?;
        }

        tetrahedra.push(Tetrahedron::from(tet_vertices));
    }

    Ok(Mesh::new(vertices, tetrahedra)?)
}

/// Writes the mesh to `path`. All tetrahedra are written as inner ones.
pub fn write(path: &Path, mesh: &Mesh, _topology: Option<&FaceTopology>) -> Result<(), FormatError> {
    write_tet(&mut create_file(path)?, mesh).map_err(|err| FormatError::from(err).in_file(path))
}

pub fn write_tet<W: Write>(writer: &mut W, mesh: &Mesh) -> io::Result<()> {
    writeln!(writer, "{} vertices", mesh.vertices().len())?;
    writeln!(writer, "{} inner tets", mesh.tetrahedra().len())?;
    writeln!(writer, "0 outer tets")?;

    for vertex in mesh.vertices() {
        writeln!(writer, "{:?} {:?} {:?}", vertex.x, vertex.y, vertex.z)?;
    }

    for tetrahedron in mesh.tetrahedra() {
        let [i0, i1, i2, i3] = tetrahedron.vertices;
        writeln!(writer, "4 {} {} {} {}", i0, i1, i2, i3)?;
    }

    writer.flush()
}
