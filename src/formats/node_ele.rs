//! Jonathan Shewchuk's `.node`/`.ele`/`.face` files, as used by Triangle,
//! TetGen and Stellar.
//!
//! A mesh is stored in several files sharing a stem: `.node` contains the
//! vertices, `.ele` the tetrahedra and the optional `.face` the boundary
//! faces. Vertices may be numbered from either zero or one; the numbering
//! of the first vertex determines the numbering of the whole mesh.

use std::io::{BufRead, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::convert::shift_vertex_id;
use crate::mesh::topology::FaceTopology;
use crate::mesh::{Mesh, OrientedFace, Tetrahedron};

use super::{capacity_for, create_file, open_file, FormatError, IndexOrigin, ReadOptions, RecordReader};

/// Reads the `.node` and `.ele` files sharing the stem of `path`.
pub fn read(path: &Path, options: &ReadOptions) -> Result<Mesh, FormatError> {
    let node_path = path.with_extension("node");
    let ele_path = path.with_extension("ele");

    let (vertices, index_origin) = read_node(open_file(&node_path)?, options.index_origin)
        .map_err(|err| err.in_file(&node_path))?;
    let tetrahedra =
        read_ele(open_file(&ele_path)?, index_origin).map_err(|err| err.in_file(&ele_path))?;

    Mesh::new(vertices, tetrahedra).map_err(|err| FormatError::from(err).in_file(&ele_path))
}

/// Reads vertices from a `.node` file.
///
/// Returns the vertices and the index origin of the file. If `index_origin`
/// is `None`, it is detected from the first vertex. Either way, all vertices
/// must be numbered consecutively from the origin.
pub fn read_node<R: BufRead>(
    reader: R,
    index_origin: Option<IndexOrigin>,
) -> Result<(Vec<Point3<f64>>, IndexOrigin), FormatError> {
    let mut records = RecordReader::new(reader);

    let header = records.expect_record("node header")?;
    let vertex_count: usize = header.parse(0, "vertex count")?;
    if header.tokens.len() > 1 {
        let dimension: u32 = header.parse(1, "dimension")?;
        if dimension != 3 {
            return Err(header.invalid(format!(
                "only 3-dimensional vertices are supported, found dimension {}",
                dimension,
            )));
        }
    }

    let mut index_origin = index_origin;
    let mut vertices = Vec::with_capacity(capacity_for(vertex_count));

    for position in 0..vertex_count {
        let record = records.expect_record("vertex")?;
        record.expect_tokens(4, "vertex")?;

        let index: u64 = record.parse(0, "vertex index")?;
        let origin = match index_origin {
            Some(origin) => origin,
            None => {
                let detected = IndexOrigin::detect(index).ok_or_else(|| {
                    record.invalid(format!(
                        "first vertex index must be 0 or 1, found {}",
                        index,
                    ))
                })?;
                index_origin = Some(detected);
                detected
            }
        };

        let expected_index = origin.offset() + position as u64;
        if index != expected_index {
            return Err(record.invalid(format!(
                "vertex index {} out of sequence, expected {} ({} numbering)",
                index, expected_index, origin,
            )));
        }

        // Attributes and boundary markers following the coordinates are
        // not needed.
        vertices.push(record.parse_point(1)?);
    }

    Ok((vertices, index_origin.unwrap_or(IndexOrigin::Zero)))
}

/// Reads tetrahedra from an `.ele` file, converting vertex indices with the
/// given origin to zero-based ones.
pub fn read_ele<R: BufRead>(
    reader: R,
    index_origin: IndexOrigin,
) -> Result<Vec<Tetrahedron>, FormatError> {
    let mut records = RecordReader::new(reader);

    let header = records.expect_record("element header")?;
    let tetrahedron_count: usize = header.parse(0, "tetrahedron count")?;
    if header.tokens.len() > 1 {
        let nodes_per_tetrahedron: u32 = header.parse(1, "nodes per tetrahedron")?;
        if nodes_per_tetrahedron != 4 {
            return Err(header.invalid(format!(
                "only linear tetrahedra with 4 nodes are supported, found {} nodes",
                nodes_per_tetrahedron,
            )));
        }
    }

    let mut tetrahedra = Vec::with_capacity(capacity_for(tetrahedron_count));

    for _ in 0..tetrahedron_count {
        let record = records.expect_record("tetrahedron")?;
        record.expect_tokens(5, "tetrahedron")?;

        let mut vertices = [0; 4];
        for (slot, vertex) in vertices.iter_mut().enumerate() {
            let id: u64 = record.parse(slot + 1, "vertex index")?;
            *vertex = shift_vertex_id(id, index_origin.offset()).ok_or_else(|| {
                record.invalid(format!(
                    "vertex index {} is not valid with {} numbering",
                    id, index_origin,
                ))
            })?;
        }

        tetrahedra.push(Tetrahedron::from(vertices));
    }

    Ok(tetrahedra)
}

/// Writes `.node`, `.ele` and, if boundary faces are available, `.face`
/// files sharing the stem of `path`. All files are numbered from one.
pub fn write(path: &Path, mesh: &Mesh, topology: Option<&FaceTopology>) -> Result<(), FormatError> {
    let node_path = path.with_extension("node");
    let ele_path = path.with_extension("ele");

    write_node(&mut create_file(&node_path)?, mesh.vertices())
        .map_err(|err| FormatError::from(err).in_file(&node_path))?;
    write_ele(&mut create_file(&ele_path)?, mesh.tetrahedra())
        .map_err(|err| FormatError::from(err).in_file(&ele_path))?;

    if let Some(topology) = topology {
        let face_path = path.with_extension("face");

        write_face(&mut create_file(&face_path)?, topology.boundary_faces())
            .map_err(|err| FormatError::from(err).in_file(&face_path))?;
    }

    Ok(())
}

/// Writes vertices in `.node` format.
///
/// Coordinates are written with the shortest representation that parses
/// back to the same value.
pub fn write_node<W: Write>(writer: &mut W, vertices: &[Point3<f64>]) -> std::io::Result<()> {
    writeln!(writer, "{} 3 0 0", vertices.len())?;
    for (i, vertex) in vertices.iter().enumerate() {
        writeln!(
            writer,
            "{} {:?} {:?} {:?}",
            i + 1,
            vertex.x,
            vertex.y,
            vertex.z,
        )?;
    }

    writer.flush()
}

/// Writes tetrahedra in `.ele` format.
pub fn write_ele<W: Write>(writer: &mut W, tetrahedra: &[Tetrahedron]) -> std::io::Result<()> {
    writeln!(writer, "{} 4 0", tetrahedra.len())?;
    for (i, tetrahedron) in tetrahedra.iter().enumerate() {
        let [i0, i1, i2, i3] = tetrahedron.vertices;
        writeln!(
            writer,
            "{} {} {} {} {}",
            i + 1,
            u64::from(i0) + 1,
            u64::from(i1) + 1,
            u64::from(i2) + 1,
            u64::from(i3) + 1,
        )?;
    }

    writer.flush()
}

/// Writes boundary faces in `.face` format, without boundary markers.
pub fn write_face<W: Write>(writer: &mut W, faces: &[OrientedFace]) -> std::io::Result<()> {
    writeln!(writer, "{} 0", faces.len())?;
    for (i, face) in faces.iter().enumerate() {
        let (i0, i1, i2) = face.vertices;
        writeln!(
            writer,
            "{} {} {} {}",
            i + 1,
            u64::from(i0) + 1,
            u64::from(i1) + 1,
            u64::from(i2) + 1,
        )?;
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn unwrap_invalid_structure<T: std::fmt::Debug>(
        result: Result<T, FormatError>,
    ) -> (usize, String) {
        match result {
            Err(FormatError::InvalidStructure { line, reason }) => (line, reason),
            other => panic!("Expected invalid structure, got {:?}", other),
        }
    }

    #[test]
    fn test_read_node_one_based() {
        let input = "\
            4 3 0 0\n\
            1 0.0 0.0 0.0\n\
            2 1.0 0.0 0.0\n\
            3 0.0 1.0 0.0\n\
            4 0.0 0.0 1.0\n";

        let (vertices, origin) = read_node(Cursor::new(input), None).unwrap();

        assert_eq!(origin, IndexOrigin::One);
        assert_eq!(
            vertices,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
        );
    }

    #[test]
    fn test_read_node_zero_based_with_attributes_markers_and_comments() {
        let input = "\
            # Node count, 3 dim, 1 attribute, 1 boundary marker\n\
            3 3 1 1\n\
            0 0.5 -1.5 2e3 17.0 1\n\
            \n\
            1 1 2 3 0.0 0 # inline comment\n\
            2 -0.0 0.25 1e-20 3.0 1\n";

        let (vertices, origin) = read_node(Cursor::new(input), None).unwrap();

        assert_eq!(origin, IndexOrigin::Zero);
        assert_eq!(
            vertices,
            vec![
                Point3::new(0.5, -1.5, 2000.0),
                Point3::new(1.0, 2.0, 3.0),
                Point3::new(-0.0, 0.25, 1e-20),
            ],
        );
    }

    #[test]
    fn test_read_node_rejects_out_of_sequence_index() {
        let input = "3 3 0 0\n1 0 0 0\n2 1 0 0\n2 0 1 0\n";

        let (line, reason) = unwrap_invalid_structure(read_node(Cursor::new(input), None));

        assert_eq!(line, 4);
        assert_eq!(
            reason,
            "vertex index 2 out of sequence, expected 3 (one-based numbering)",
        );
    }

    #[test]
    fn test_read_node_rejects_index_disagreeing_with_explicit_origin() {
        let input = "2 3 0 0\n0 0 0 0\n1 1 0 0\n";

        let (line, _) =
            unwrap_invalid_structure(read_node(Cursor::new(input), Some(IndexOrigin::One)));

        assert_eq!(line, 2);
    }

    #[test]
    fn test_read_node_rejects_unknown_first_index() {
        let input = "1 3 0 0\n5 0 0 0\n";

        let (_, reason) = unwrap_invalid_structure(read_node(Cursor::new(input), None));

        assert_eq!(reason, "first vertex index must be 0 or 1, found 5");
    }

    #[test]
    fn test_read_node_rejects_two_dimensional_vertices() {
        let input = "1 2 0 0\n1 0 0\n";

        let (line, _) = unwrap_invalid_structure(read_node(Cursor::new(input), None));

        assert_eq!(line, 1);
    }

    #[test]
    fn test_read_node_rejects_truncated_file() {
        let input = "3 3 0 0\n1 0 0 0\n";

        let (_, reason) = unwrap_invalid_structure(read_node(Cursor::new(input), None));

        assert_eq!(reason, "unexpected end of file, expected vertex");
    }

    #[test]
    fn test_read_node_rejects_non_finite_coordinates() {
        let input = "2 3 0 0\n1 nan 0 0\n2 0 inf 0\n";

        let (line, reason) = unwrap_invalid_structure(read_node(Cursor::new(input), None));

        assert_eq!(line, 2);
        assert_eq!(reason, "x coordinate must be finite, found NaN");
    }

    #[test]
    fn test_read_node_huge_vertex_count_fails_without_allocating() {
        let input = "99999999999999999 3 0 0\n1 0 0 0\n";

        let (_, reason) = unwrap_invalid_structure(read_node(Cursor::new(input), None));

        assert_eq!(reason, "unexpected end of file, expected vertex");
    }

    #[test]
    fn test_read_ele_huge_tetrahedron_count_fails_without_allocating() {
        let input = "99999999999999999 4 0\n1 1 2 3 4\n";

        let (_, reason) =
            unwrap_invalid_structure(read_ele(Cursor::new(input), IndexOrigin::One));

        assert_eq!(reason, "unexpected end of file, expected tetrahedron");
    }

    #[test]
    fn test_read_node_empty_uses_explicit_origin() {
        let (vertices, origin) =
            read_node(Cursor::new("0 3 0 0\n"), Some(IndexOrigin::One)).unwrap();

        assert!(vertices.is_empty());
        assert_eq!(origin, IndexOrigin::One);
    }

    #[test]
    fn test_read_ele_one_based_with_attribute() {
        let input = "2 4 1\n1 1 2 3 4 0\n2 2 3 4 5 1\n";

        let tetrahedra = read_ele(Cursor::new(input), IndexOrigin::One).unwrap();

        assert_eq!(
            tetrahedra,
            vec![Tetrahedron::new(0, 1, 2, 3), Tetrahedron::new(1, 2, 3, 4)],
        );
    }

    #[test]
    fn test_read_ele_rejects_quadratic_tetrahedra() {
        let (line, _) = unwrap_invalid_structure(read_ele(
            Cursor::new("1 10 0\n1 1 2 3 4 5 6 7 8 9 10\n"),
            IndexOrigin::One,
        ));

        assert_eq!(line, 1);
    }

    #[test]
    fn test_read_ele_rejects_zero_index_in_one_based_file() {
        let (line, reason) = unwrap_invalid_structure(read_ele(
            Cursor::new("1 4 0\n1 0 1 2 3\n"),
            IndexOrigin::One,
        ));

        assert_eq!(line, 2);
        assert_eq!(reason, "vertex index 0 is not valid with one-based numbering");
    }

    #[test]
    fn test_read_ele_rejects_missing_vertex() {
        let (_, reason) = unwrap_invalid_structure(read_ele(
            Cursor::new("1 4 0\n1 0 1 2\n"),
            IndexOrigin::Zero,
        ));

        assert_eq!(reason, "expected tetrahedron with at least 5 values, found 4");
    }

    #[test]
    fn test_write_node() {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, -2.0, 0.1),
            Point3::new(1e-20, 3.0, 12345.0),
        ];
        let mut output = Vec::new();

        write_node(&mut output, &vertices).unwrap();

        insta::assert_snapshot!(String::from_utf8(output).unwrap(), @r###"
        3 3 0 0
        1 0.0 0.0 0.0
        2 1.5 -2.0 0.1
        3 1e-20 3.0 12345.0
        "###);
    }

    #[test]
    fn test_write_ele_is_one_based() {
        let mut output = Vec::new();

        write_ele(
            &mut output,
            &[Tetrahedron::new(1, 0, 2, 3), Tetrahedron::new(0, 1, 2, 4)],
        )
        .unwrap();

        insta::assert_snapshot!(String::from_utf8(output).unwrap(), @r###"
        2 4 0
        1 2 1 3 4
        2 1 2 3 5
        "###);
    }

    #[test]
    fn test_write_face_is_one_based() {
        let mut output = Vec::new();

        write_face(
            &mut output,
            &[OrientedFace::new(1, 0, 2), OrientedFace::new(1, 2, 3)],
        )
        .unwrap();

        insta::assert_snapshot!(String::from_utf8(output).unwrap(), @r###"
        2 0
        1 2 1 3
        2 2 3 4
        "###);
    }

    #[test]
    fn test_written_node_and_ele_read_back() {
        let vertices = vec![
            Point3::new(0.1, 0.2, 0.3),
            Point3::new(1.0 / 3.0, -7.25, 1e10),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 2.0),
        ];
        let tetrahedra = vec![Tetrahedron::new(1, 0, 2, 3)];
        let mut node = Vec::new();
        let mut ele = Vec::new();

        write_node(&mut node, &vertices).unwrap();
        write_ele(&mut ele, &tetrahedra).unwrap();

        let (read_vertices, origin) = read_node(Cursor::new(node), None).unwrap();
        let read_tetrahedra = read_ele(Cursor::new(ele), origin).unwrap();

        assert_eq!(read_vertices, vertices);
        assert_eq!(read_tetrahedra, tetrahedra);
    }
}
