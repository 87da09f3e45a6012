use nalgebra::geometry::Point3;

/// Orientation of four points in 3-D space.
///
/// Computes the determinant of the 3x3 matrix whose rows are `a - d`,
/// `b - d` and `c - d`, which equals six times the signed volume of the
/// tetrahedron `(a, b, c, d)`. A positive value means the tetrahedron is
/// positively oriented, zero means the points are coplanar.
///
/// The determinant is expanded into its six products, summed in a fixed
/// order. This is a plain floating point determinant, not an adaptive exact
/// predicate. Nearly coplanar points may produce a value with
/// the wrong sign.
pub fn orient3d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    let ad = a - d;
    let bd = b - d;
    let cd = c - d;

    (ad.x * bd.y * cd.z) + (ad.y * bd.z * cd.x) + (ad.z * bd.x * cd.y)
        - (ad.x * bd.z * cd.y)
        - (ad.y * bd.x * cd.z)
        - (ad.z * bd.y * cd.x)
}

/// Signed volume of the tetrahedron `(a, b, c, d)`. Has the same sign as
/// `orient3d`.
pub fn signed_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    orient3d(a, b, c, d) / 6.0
}
