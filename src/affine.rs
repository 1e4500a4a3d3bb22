//! 4×4 affine manipulation and quality control.
//!
//! An affine maps homogeneous voxel indices `(i, j, k, 1)` to world-space
//! millimeter coordinates. Its upper-left 3×3 block carries rotation, scale
//! and shear; the rightmost column carries the translation. Everything in
//! this crate computes in `f64`.
use crate::reorient::CenterMode;
use nalgebra::{Matrix3, Matrix4, Vector3};

/// The linear (rotation/scale/shear) part of an affine.
pub type Affine3 = Matrix3<f64>;
/// A 4×4 homogeneous voxel-to-world affine.
pub type Affine4 = Matrix4<f64>;

/// Separate a 4x4 affine into its 3x3 linear and translation components.
pub fn get_affine_and_translation(affine: &Affine4) -> (Affine3, Vector3<f64>) {
    let translation = Vector3::new(affine[12], affine[13], affine[14]);
    let linear = affine.fixed_view::<3, 3>(0, 0).into_owned();
    (linear, translation)
}

/// Euclidean norm of each column of the linear part, i.e. the voxel size
/// along each input axis.
pub(crate) fn column_norms(linear: &Affine3) -> [f64; 3] {
    [
        linear.column(0).norm(),
        linear.column(1).norm(),
        linear.column(2).norm(),
    ]
}

/// Measure how far the affine's linear part deviates from an orthogonal
/// basis.
///
/// The columns are normalized to unit length and the Gram matrix of the
/// result is compared against the identity. A purely orthogonal affine
/// (rotation and scale only, no shear) leaves no off-diagonal residual.
///
/// Returns the maximum absolute off-diagonal entry and the Frobenius norm
/// of the off-diagonal residual. A zero column norm yields
/// `(inf, inf)`: the affine is degenerate and orthogonality cannot be
/// assessed. This helper is advisory only, so it never fails; callers that
/// need a usable affine validate it separately.
///
/// # Example
///
/// ```
/// use reorient::{non_orthogonality, Affine4};
///
/// let (max_abs, frob) = non_orthogonality(&Affine4::identity());
/// assert_eq!((max_abs, frob), (0.0, 0.0));
/// ```
pub fn non_orthogonality(affine: &Affine4) -> (f64, f64) {
    let (linear, _) = get_affine_and_translation(affine);
    let zooms = column_norms(&linear);
    if zooms.iter().any(|&z| z == 0.0) {
        return (f64::INFINITY, f64::INFINITY);
    }
    let mut rot = linear;
    for (j, &zoom) in zooms.iter().enumerate() {
        let mut column = rot.column_mut(j);
        column /= zoom;
    }
    let gram = rot.transpose() * rot;
    let mut off = gram - Affine3::identity();
    off.fill_diagonal(0.0);
    (off.amax(), off.norm())
}

/// Build a diagonal affine implied by the given voxel sizes and centering
/// policy. All shear and rotation is dropped; the diagonal carries `res`.
///
/// With [`CenterMode::FovCenter`] the translation places the geometric
/// center of the field of view at the world origin. With
/// [`CenterMode::AbsTranslation`] the translation keeps the magnitude of
/// `t_consistent` per axis, forced onto the negative convention.
pub(crate) fn forced_diag_affine(
    res: &[f64; 3],
    shape_xyz: &[usize],
    center_mode: CenterMode,
    t_consistent: &Vector3<f64>,
) -> Affine4 {
    let mut affine = Affine4::identity();
    for axis in 0..3 {
        affine[(axis, axis)] = res[axis];
        affine[(axis, 3)] = match center_mode {
            CenterMode::FovCenter => -res[axis] * (shape_xyz[axis] as f64 - 1.0) / 2.0,
            CenterMode::AbsTranslation => -t_consistent[axis].abs(),
        };
    }
    affine
}
