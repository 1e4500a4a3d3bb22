//! Axis-permutation and flip inference from a voxel-to-world affine.
//!
//! Reorienting without resampling means picking, for each canonical world
//! axis (x = Right, y = Anterior, z = Superior), the single voxel axis that
//! best explains it, plus a sign. The assignment is read off the affine's
//! normalized linear part: voxel axis `j` is taken to feed the world axis
//! with the largest absolute component in column `j`. When the affine is
//! rotated near 45° two voxel axes may claim the same world axis; the
//! assignment is still resolved deterministically, but the result is marked
//! ambiguous so that downstream quality control can warn the caller.
use crate::affine::{column_norms, get_affine_and_translation, Affine3, Affine4};
use crate::error::{ReorientError, Result};
use ndarray::{ArrayD, Axis};

/// Per-world-axis label pair `(negative end, positive end)`, in world
/// x, y, z order.
pub type AxisLabels = [(char, char); 3];

/// Neurological convention: x toward Right, y toward Anterior, z toward
/// Superior.
pub const RAS_AXIS_LABELS: AxisLabels = [('L', 'R'), ('P', 'A'), ('I', 'S')];

/// Bruker subject-space convention, with the anterior/posterior pair
/// reversed relative to [`RAS_AXIS_LABELS`].
pub const BRUKER_AXIS_LABELS: AxisLabels = [('L', 'R'), ('A', 'P'), ('I', 'S')];

/// Voxel-grid orientation inferred from an affine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelOrientation {
    /// For each world axis in x, y, z order, the input voxel axis that
    /// feeds it. Always a permutation of `{0, 1, 2}`.
    pub perm: [usize; 3],
    /// For each *output* axis, whether it must be reversed to point in the
    /// positive world direction.
    pub flips: [bool; 3],
    /// Voxel sizes along the output axes, in world x, y, z order. Always
    /// strictly positive.
    pub zooms: [f64; 3],
    /// Two or more voxel axes claimed the same world axis. The assignment
    /// above is still deterministic, but should be treated with suspicion.
    pub ambiguous: bool,
}

/// Normalize the affine's columns to unit length, rejecting zero-norm
/// columns. Returns the would-be rotation matrix and the column norms.
fn normalized_columns(affine: &Affine4) -> Result<(Affine3, [f64; 3])> {
    let (linear, _) = get_affine_and_translation(affine);
    let zooms = column_norms(&linear);
    let mut rot = linear;
    for (j, &zoom) in zooms.iter().enumerate() {
        if zoom == 0.0 {
            return Err(ReorientError::DegenerateAffine(j));
        }
        let mut column = rot.column_mut(j);
        column /= zoom;
    }
    Ok((rot, zooms))
}

/// World axis with the largest absolute component in column `j`. Ties go to
/// the lowest row index.
fn dominant_world_axis(rot: &Affine3, j: usize) -> usize {
    let mut best = 0;
    for w in 1..3 {
        if rot[(w, j)].abs() > rot[(best, j)].abs() {
            best = w;
        }
    }
    best
}

/// Infer which voxel axis feeds each world axis, and with which sign.
///
/// Each voxel axis is assigned to the world axis dominating its column of
/// the normalized linear part. World axes are then filled in x, y, z order:
/// the lowest-index voxel axis claiming the world axis wins; a world axis
/// left unclaimed falls back to the not-yet-used voxel axis with the
/// strongest component along it, so the result is always a true
/// permutation. Any unclaimed world axis (equivalently, any doubly-claimed
/// one) marks the result [`ambiguous`](VoxelOrientation::ambiguous).
///
/// # Errors
///
/// A zero column norm in the affine's linear part is a hard precondition
/// failure ([`ReorientError::DegenerateAffine`]), not a quality-control
/// warning: no direction can be derived from a zero column.
pub fn infer_orientation(affine: &Affine4) -> Result<VoxelOrientation> {
    let (rot, zooms_in) = normalized_columns(affine)?;

    let mut voxel_to_world = [0usize; 3];
    for j in 0..3 {
        voxel_to_world[j] = dominant_world_axis(&rot, j);
    }
    let mut claimed = [false; 3];
    for &w in &voxel_to_world {
        claimed[w] = true;
    }
    let ambiguous = claimed.iter().any(|&c| !c);

    let mut perm = [0usize; 3];
    let mut used = [false; 3];
    let mut assigned = [false; 3];
    for w in 0..3 {
        if let Some(j) = (0..3).find(|&j| !used[j] && voxel_to_world[j] == w) {
            perm[w] = j;
            used[j] = true;
            assigned[w] = true;
        }
    }
    for w in 0..3 {
        if assigned[w] {
            continue;
        }
        let mut best: Option<usize> = None;
        for j in (0..3).filter(|&j| !used[j]) {
            match best {
                Some(b) if rot[(w, b)].abs() >= rot[(w, j)].abs() => {}
                _ => best = Some(j),
            }
        }
        // every unassigned world axis leaves at least one spare voxel axis
        let j = best.expect("spare voxel axis");
        perm[w] = j;
        used[j] = true;
    }

    let flips = [
        rot[(0, perm[0])] < 0.0,
        rot[(1, perm[1])] < 0.0,
        rot[(2, perm[2])] < 0.0,
    ];
    let zooms = [zooms_in[perm[0]], zooms_in[perm[1]], zooms_in[perm[2]]];
    Ok(VoxelOrientation {
        perm,
        flips,
        zooms,
        ambiguous,
    })
}

/// Apply an inferred permutation and flips to a volume.
///
/// The first three axes are transposed into `perm` order and reversed where
/// `flips` says so; trailing axes (time, channel, repetition) are carried
/// through unchanged, preserving their relative order. This is pure data
/// movement into a freshly allocated array: the input is never mutated and
/// no value is interpolated.
pub fn apply_orientation<T>(data: &ArrayD<T>, perm: [usize; 3], flips: [bool; 3]) -> ArrayD<T>
where
    T: Clone,
{
    let mut axes: Vec<usize> = perm.to_vec();
    axes.extend(3..data.ndim());
    let mut view = data.view().permuted_axes(axes);
    for axis in 0..3 {
        if flips[axis] {
            view.invert_axis(Axis(axis));
        }
    }
    view.to_owned()
}

/// Homogeneous transform `T` from reoriented voxel indices back to input
/// voxel indices, for the given input spatial shape.
///
/// Composing the input affine with this matrix (`A * T`) yields an affine
/// over the *reoriented* grid that reproduces exactly the coordinate change
/// applied by [`apply_orientation`]: an unflipped output axis maps 1:1 onto
/// its source axis, a flipped one maps through `-1` with offset
/// `size - 1`. The translation of `A * T` is therefore consistent with the
/// permuted and flipped data, unlike the raw input translation.
pub fn voxel_index_transform(shape: &[usize], perm: [usize; 3], flips: [bool; 3]) -> Affine4 {
    let mut t = Affine4::identity();
    for axis in 0..3 {
        t[(axis, axis)] = 0.0;
    }
    for new_axis in 0..3 {
        let old_axis = perm[new_axis];
        if flips[new_axis] {
            t[(old_axis, new_axis)] = -1.0;
            t[(old_axis, 3)] = shape[old_axis] as f64 - 1.0;
        } else {
            t[(old_axis, new_axis)] = 1.0;
        }
    }
    t
}

/// Anatomical axis codes of a volume under the given affine.
///
/// For each voxel axis in input order, returns the label of the anatomical
/// direction the axis points toward, e.g. `['R', 'A', 'S']` for an
/// identity affine under [`RAS_AXIS_LABELS`].
///
/// # Errors
///
/// Fails with [`ReorientError::DegenerateAffine`] on a zero column norm.
pub fn affine_axcodes(affine: &Affine4, labels: &AxisLabels) -> Result<[char; 3]> {
    let (rot, _) = normalized_columns(affine)?;
    let mut codes = ['\0'; 3];
    for j in 0..3 {
        let w = dominant_world_axis(&rot, j);
        let (negative, positive) = labels[w];
        codes[j] = if rot[(w, j)] < 0.0 { negative } else { positive };
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::{
        affine_axcodes, infer_orientation, voxel_index_transform, BRUKER_AXIS_LABELS,
        RAS_AXIS_LABELS,
    };
    use crate::affine::Affine4;
    use crate::error::ReorientError;

    #[test]
    fn identity_is_already_canonical() {
        let orientation = infer_orientation(&Affine4::identity()).unwrap();
        assert_eq!(orientation.perm, [0, 1, 2]);
        assert_eq!(orientation.flips, [false, false, false]);
        assert_eq!(orientation.zooms, [1.0, 1.0, 1.0]);
        assert!(!orientation.ambiguous);
    }

    #[test]
    #[rustfmt::skip]
    fn swapped_axes_are_permuted_back() {
        // Voxel axis 0 points along world y, axis 1 along world x.
        let affine = Affine4::new(
            0.0, 1.5, 0.0, 0.0,
            2.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 3.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        let orientation = infer_orientation(&affine).unwrap();
        assert_eq!(orientation.perm, [1, 0, 2]);
        assert_eq!(orientation.flips, [false, false, false]);
        assert_eq!(orientation.zooms, [1.5, 2.0, 3.0]);
        assert!(!orientation.ambiguous);
    }

    #[test]
    #[rustfmt::skip]
    fn negative_column_requests_flip() {
        let affine = Affine4::new(
            -1.2, 0.0, 0.0, 0.0,
             0.0, 0.8, 0.0, 0.0,
             0.0, 0.0, 2.0, 0.0,
             0.0, 0.0, 0.0, 1.0,
        );
        let orientation = infer_orientation(&affine).unwrap();
        assert_eq!(orientation.perm, [0, 1, 2]);
        assert_eq!(orientation.flips, [true, false, false]);
        assert_eq!(orientation.zooms, [1.2, 0.8, 2.0]);
    }

    #[test]
    #[rustfmt::skip]
    fn in_plane_45_degree_rotation_is_ambiguous_but_still_a_permutation() {
        let c = std::f64::consts::FRAC_1_SQRT_2;
        let affine = Affine4::new(
            c,  -c,  0.0, 0.0,
            c,   c,  0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        let orientation = infer_orientation(&affine).unwrap();
        assert!(orientation.ambiguous);
        // Both in-plane columns claim world x; the tie-break keeps axis 0
        // there and hands axis 1 to the unclaimed world y.
        assert_eq!(orientation.perm, [0, 1, 2]);
        assert_eq!(orientation.flips, [false, false, false]);
    }

    #[test]
    fn zero_column_is_rejected() {
        let mut affine = Affine4::identity();
        affine[(1, 1)] = 0.0;
        assert_eq!(
            infer_orientation(&affine),
            Err(ReorientError::DegenerateAffine(1))
        );
    }

    #[test]
    fn index_transform_encodes_flip_offsets() {
        let t = voxel_index_transform(&[4, 5, 6], [0, 1, 2], [true, false, false]);
        assert_eq!(t[(0, 0)], -1.0);
        assert_eq!(t[(0, 3)], 3.0);
        assert_eq!(t[(1, 1)], 1.0);
        assert_eq!(t[(1, 3)], 0.0);
        assert_eq!(t[(2, 2)], 1.0);
        assert_eq!(t[(3, 3)], 1.0);
    }

    #[test]
    #[rustfmt::skip]
    fn index_transform_routes_permuted_axes() {
        let t = voxel_index_transform(&[4, 5, 6], [1, 0, 2], [false, false, false]);
        // Output axis 0 reads from input axis 1 and vice versa.
        assert_eq!(t[(1, 0)], 1.0);
        assert_eq!(t[(0, 1)], 1.0);
        assert_eq!(t[(2, 2)], 1.0);
        assert_eq!(t[(0, 0)], 0.0);
        assert_eq!(t[(1, 1)], 0.0);
    }

    #[test]
    fn axcodes_follow_label_convention() {
        let identity = Affine4::identity();
        assert_eq!(
            affine_axcodes(&identity, &RAS_AXIS_LABELS).unwrap(),
            ['R', 'A', 'S']
        );
        assert_eq!(
            affine_axcodes(&identity, &BRUKER_AXIS_LABELS).unwrap(),
            ['R', 'P', 'S']
        );
    }

    #[test]
    #[rustfmt::skip]
    fn axcodes_report_negative_directions() {
        let affine = Affine4::new(
            -1.0, 0.0, 0.0, 0.0,
             0.0, 0.0, 2.0, 0.0,
             0.0, 3.0, 0.0, 0.0,
             0.0, 0.0, 0.0, 1.0,
        );
        assert_eq!(
            affine_axcodes(&affine, &RAS_AXIS_LABELS).unwrap(),
            ['L', 'S', 'A']
        );
    }
}
