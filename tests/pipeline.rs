use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use tetconvert::diagnostics::Diagnostic;
use tetconvert::formats::{self, FormatRegistry, IndexOrigin, ReadOptions};
use tetconvert::geometry;
use tetconvert::pipeline::{self, ConvertError, ConvertOptions};

fn output_dir(test_name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("tetconvert-{}-{}", test_name, process::id()));
    fs::create_dir_all(&dir).expect("Output directory should be created");

    dir
}

fn read_output(path: &PathBuf) -> String {
    fs::read_to_string(path).expect("Output file should be read")
}

#[test]
fn test_node_to_tet_corrects_inverted_tetrahedra() {
    let registry = FormatRegistry::builtin();
    let output = output_dir("node-to-tet").join("cube.tet");
    let options = ConvertOptions::new("tests/fixtures/cube.node", &output);

    let report = pipeline::convert(&registry, &options).expect("Cube should convert");

    assert_eq!(report.vertex_count, 8);
    assert_eq!(report.tetrahedron_count, 5);
    assert_eq!(report.corrected_count, 3);
    assert_eq!(report.degenerate_count, 0);
    assert_eq!(report.unique_face_count, None);
    approx::assert_relative_eq!(report.volume, 1.0);

    insta::assert_snapshot!(read_output(&output), @r###"
    8 vertices
    5 inner tets
    0 outer tets
    0.0 0.0 0.0
    1.0 0.0 0.0
    1.0 1.0 0.0
    0.0 1.0 0.0
    0.0 0.0 1.0
    1.0 0.0 1.0
    1.0 1.0 1.0
    0.0 1.0 1.0
    4 1 0 3 4
    4 2 1 3 6
    4 1 5 4 6
    4 7 3 4 6
    4 3 1 4 6
    "###);
}

#[test]
fn test_tet_to_node_writes_positive_tetrahedra() {
    let registry = FormatRegistry::builtin();
    let output = output_dir("tet-to-node").join("cube.node");
    let options = ConvertOptions::new("tests/fixtures/cube.tet", &output);

    pipeline::convert(&registry, &options).expect("Cube should convert");
    let mesh = formats::node_ele::read(&output, &ReadOptions::default())
        .expect("Converted mesh should be read back");

    assert_eq!(mesh.tetrahedra().len(), 5);
    for tetrahedron in mesh.tetrahedra() {
        let [a, b, c, d] = mesh.tetrahedron_corners(*tetrahedron);
        assert!(geometry::orient3d(&a, &b, &c, &d) > 0.0);
    }
    assert!(!output.with_extension("face").exists());
}

#[test]
fn test_node_to_node_with_faces() {
    let registry = FormatRegistry::builtin();
    let output = output_dir("node-with-faces").join("cube.node");
    let mut options = ConvertOptions::new("tests/fixtures/cube.node", &output);
    options.compute_faces = true;

    let report = pipeline::convert(&registry, &options).expect("Cube should convert");
    let faces = read_output(&output.with_extension("face"));

    assert_eq!(report.unique_face_count, Some(16));
    assert_eq!(report.boundary_face_count, Some(12));
    assert!(faces.starts_with("12 0\n"));
    assert_eq!(faces.lines().count(), 13);
}

#[test]
fn test_scale_is_applied_to_written_vertices() {
    let registry = FormatRegistry::builtin();
    let output = output_dir("scale").join("cube.tet");
    let mut options = ConvertOptions::new("tests/fixtures/cube.node", &output);
    options.scale = Some(2.5);

    let report = pipeline::convert(&registry, &options).expect("Cube should convert");
    let mesh = formats::tet::read(&output, &ReadOptions::default())
        .expect("Converted mesh should be read back");

    approx::assert_relative_eq!(report.volume, 1.0);
    approx::assert_relative_eq!(mesh.signed_volume(), 15.625);
    assert_eq!(mesh.vertices()[6].coords.z, 2.5);
}

#[test]
fn test_obj_output_contains_boundary_surface() {
    let registry = FormatRegistry::builtin();
    let output = output_dir("obj").join("cube.obj");
    let options = ConvertOptions::new("tests/fixtures/cube.tet", &output);

    let report = pipeline::convert(&registry, &options).expect("Cube should convert");
    let obj = read_output(&output);

    assert_eq!(report.boundary_face_count, Some(12));
    assert!(obj.contains("o cube\n"));
    assert_eq!(obj.lines().filter(|line| line.starts_with("v ")).count(), 8);
    assert_eq!(obj.lines().filter(|line| line.starts_with("f ")).count(), 12);
}

#[test]
fn test_degenerate_tetrahedron_is_reported_and_kept() {
    let registry = FormatRegistry::builtin();
    let output = output_dir("degenerate").join("degenerate.tet");
    let options = ConvertOptions::new("tests/fixtures/degenerate.node", &output);

    let report = pipeline::convert(&registry, &options).expect("Mesh should convert");

    assert_eq!(report.tetrahedron_count, 2);
    assert_eq!(report.corrected_count, 1);
    assert_eq!(report.degenerate_count, 1);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::DegenerateTetrahedron { tet_index: 1, .. })));
    approx::assert_relative_eq!(report.volume, 1.0 / 6.0);
}

#[test]
fn test_non_manifold_mesh_is_converted_with_diagnostic() {
    let registry = FormatRegistry::builtin();
    let output = output_dir("non-manifold").join("non_manifold.node");
    let mut options = ConvertOptions::new("tests/fixtures/non_manifold.node", &output);
    options.compute_faces = true;

    let report = pipeline::convert(&registry, &options).expect("Mesh should convert");

    assert_eq!(report.unique_face_count, Some(10));
    assert_eq!(report.boundary_face_count, Some(9));
    assert_eq!(report.non_manifold_face_count, 1);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::NonManifoldFace { extra_owner: 2, .. })));
}

#[test]
fn test_non_manifold_mesh_fails_in_strict_mode() {
    let registry = FormatRegistry::builtin();
    let output = output_dir("non-manifold-strict").join("non_manifold.obj");
    let mut options = ConvertOptions::new("tests/fixtures/non_manifold.node", &output);
    options.strict = true;

    match pipeline::convert(&registry, &options) {
        Err(ConvertError::NonManifold { face_count }) => assert_eq!(face_count, 1),
        other => panic!("Unexpected result {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn test_forced_index_origin_is_validated() {
    let registry = FormatRegistry::builtin();
    let output = output_dir("index-origin").join("cube.tet");
    let mut options = ConvertOptions::new("tests/fixtures/cube.node", &output);
    options.read_options.index_origin = Some(IndexOrigin::Zero);

    match pipeline::convert(&registry, &options) {
        Err(ConvertError::Read { .. }) => {}
        other => panic!("Unexpected result {:?}", other),
    }
}

#[test]
fn test_unknown_output_format() {
    let registry = FormatRegistry::builtin();
    let options = ConvertOptions::new("tests/fixtures/cube.node", "cube.vtk");

    match pipeline::convert(&registry, &options) {
        Err(ConvertError::UnknownFormat(path)) => assert_eq!(path, PathBuf::from("cube.vtk")),
        other => panic!("Unexpected result {:?}", other),
    }
}

#[test]
fn test_report_is_written_as_ron() {
    let registry = FormatRegistry::builtin();
    let dir = output_dir("report");
    let mut options = ConvertOptions::new("tests/fixtures/cube.node", dir.join("cube.tet"));
    options.report = Some(dir.join("report.ron"));

    pipeline::convert(&registry, &options).expect("Cube should convert");
    let report = read_output(&dir.join("report.ron"));

    assert!(report.contains("corrected_count: 3"));
    assert!(report.contains("OrientationCorrected"));
}
