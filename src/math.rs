//! Element-level matrices for 3D frame members

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, SVector, Vector3};

pub type Mat3 = Matrix3<f64>;
/// 12x12 matrix for element stiffness and transformation
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for element end forces/displacements
pub type Vec12 = SVector<f64, 12>;

/// Compute the 12x12 local stiffness matrix for a 3D frame element.
///
/// Classical Euler-Bernoulli terms: EA/L axial, GJ/L torsion, and the
/// 12EI/L³, 6EI/L², 4EI/L, 2EI/L bending family in each transverse plane.
pub fn local_stiffness(e: f64, g: f64, a: f64, iy: f64, iz: f64, jt: f64, length: f64) -> Mat12 {
    let l = length;
    let mut k = Mat12::zeros();

    // Axial (DOFs 0, 6)
    let ka = e * a / l;
    k[(0, 0)] = ka;
    k[(0, 6)] = -ka;
    k[(6, 0)] = -ka;
    k[(6, 6)] = ka;

    // Torsion (DOFs 3, 9)
    let kt = g * jt / l;
    k[(3, 3)] = kt;
    k[(3, 9)] = -kt;
    k[(9, 3)] = -kt;
    k[(9, 9)] = kt;

    // Bending about local z: translation y, rotation z (DOFs 1, 5, 7, 11)
    fill_bending(&mut k, [1, 5, 7, 11], e * iz, l, 1.0);
    // Bending about local y: translation z, rotation y (DOFs 2, 4, 8, 10),
    // with the shear/rotation coupling sign flipped by the right-hand rule
    fill_bending(&mut k, [2, 4, 8, 10], e * iy, l, -1.0);

    k
}

/// Fill the 4x4 bending block for one transverse plane.
/// `dofs` = [translation_i, rotation_i, translation_j, rotation_j].
fn fill_bending(k: &mut Mat12, dofs: [usize; 4], ei: f64, l: f64, sign: f64) {
    let [v1, r1, v2, r2] = dofs;
    let k_vv = 12.0 * ei / (l * l * l);
    let k_vr = sign * 6.0 * ei / (l * l);
    let k_rr = 4.0 * ei / l;
    let k_rr2 = 2.0 * ei / l;

    k[(v1, v1)] = k_vv;
    k[(v1, r1)] = k_vr;
    k[(v1, v2)] = -k_vv;
    k[(v1, r2)] = k_vr;

    k[(r1, v1)] = k_vr;
    k[(r1, r1)] = k_rr;
    k[(r1, v2)] = -k_vr;
    k[(r1, r2)] = k_rr2;

    k[(v2, v1)] = -k_vv;
    k[(v2, r1)] = -k_vr;
    k[(v2, v2)] = k_vv;
    k[(v2, r2)] = -k_vr;

    k[(r2, v1)] = k_vr;
    k[(r2, r1)] = k_rr2;
    k[(r2, v2)] = -k_vr;
    k[(r2, r2)] = k_rr;
}

/// Compute the 12x12 global-to-local transformation matrix for an element
/// running from `i` to `j`, supporting arbitrary orientation.
///
/// Local axis convention (PyNite):
/// - vertical members: local y lies in the global XY plane, local z = global Z;
/// - horizontal members: local y = global Y, local z = x × y;
/// - inclined members: local z is horizontal and perpendicular to x, y = z × x.
///
/// The caller guarantees a nonzero length; degenerate elements are rejected
/// before this runs.
pub fn transformation_matrix(i: &[f64; 3], j: &[f64; 3]) -> Mat12 {
    let axis = Vector3::new(j[0] - i[0], j[1] - i[1], j[2] - i[2]);
    let x = axis / axis.norm();

    let (y, z) = if x.x.abs() < 1e-10 && x.z.abs() < 1e-10 {
        // Vertical member: only a Y component remains
        if x.y > 0.0 {
            (Vector3::new(-1.0, 0.0, 0.0), Vector3::z())
        } else {
            (Vector3::new(1.0, 0.0, 0.0), Vector3::z())
        }
    } else if axis.y.abs() < 1e-10 {
        // Horizontal member
        let y = Vector3::y();
        (y, x.cross(&y).normalize())
    } else {
        // Inclined member: project the axis onto the global XZ plane
        let horizontal = Vector3::new(axis.x, 0.0, axis.z);
        let z = if x.y > 0.0 {
            horizontal.cross(&x)
        } else {
            x.cross(&horizontal)
        }
        .normalize();
        (z.cross(&x).normalize(), z)
    };

    let r = Mat3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]);

    let mut t = Mat12::zeros();
    for block in 0..4 {
        t.fixed_view_mut::<3, 3>(block * 3, block * 3).copy_from(&r);
    }
    t
}

/// Solve a dense linear system by LU elimination.
/// Returns `None` for a singular matrix.
pub fn solve_dense(a: DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    a.lu().solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transformation_horizontal() {
        let t = transformation_matrix(&[0.0, 0.0, 0.0], &[10.0, 0.0, 0.0]);
        // Local axes coincide with the global ones for a member along +X
        assert_relative_eq!(t[(0, 0)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(t[(1, 1)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(t[(2, 2)], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_transformation_vertical() {
        let t = transformation_matrix(&[0.0, 0.0, 0.0], &[0.0, 10.0, 0.0]);
        // Member up: local x = global Y, local y = -global X, local z = global Z
        assert_relative_eq!(t[(0, 1)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(t[(1, 0)], -1.0, epsilon = 1e-10);
        assert_relative_eq!(t[(2, 2)], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_transformation_is_orthogonal() {
        let t = transformation_matrix(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0]);
        let identity = t.transpose() * t;
        for r in 0..12 {
            for c in 0..12 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_relative_eq!(identity[(r, c)], expected, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_local_stiffness_symmetry() {
        let k = local_stiffness(200e9, 77e9, 0.01, 1e-4, 2e-4, 1e-5, 10.0);
        for r in 0..12 {
            for c in 0..12 {
                assert_relative_eq!(k[(r, c)], k[(c, r)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_local_stiffness_axial_term() {
        let k = local_stiffness(200e9, 77e9, 0.01, 1e-4, 2e-4, 1e-5, 4.0);
        assert_relative_eq!(k[(0, 0)], 200e9 * 0.01 / 4.0, epsilon = 1e-3);
        assert_relative_eq!(k[(0, 6)], -k[(0, 0)], epsilon = 1e-3);
    }
}
