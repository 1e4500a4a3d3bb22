//! Reorientation of scanner-native volumes to RAS+ canonical space.
//!
//! Preclinical scanners deliver volumes in acquisition order, with the
//! voxel-to-world mapping recorded in a 4×4 affine. This crate reorders and
//! flips the voxel grid so that the first three axes point toward anatomical
//! Right, Anterior and Superior, and rebuilds a simplified diagonal affine
//! consistent with the transformed grid. Voxel values are never resampled,
//! only permuted and flipped, so no interpolation artifacts are introduced.
//!
//! Shear and rotation in the input affine cannot be expressed by a
//! permutation, so they are discarded by design. How much information was
//! lost is reported through a quality-control record attached to every
//! result, rather than by refusing the input: the caller decides whether a
//! `warn` or `high_risk` verdict warrants a resampling-based regrid instead.
//!
//! # Example
//!
//! ```
//! use ndarray::Array3;
//! use reorient::{reorient_to_ras, Affine4, QcLevel};
//!
//! let volume = Array3::<f32>::zeros((4, 5, 6)).into_dyn();
//! let affine = Affine4::identity();
//! let (volume_ras, affine_ras, info) = reorient_to_ras(&volume, &affine)?;
//!
//! assert_eq!(info.perm_xyz, [0, 1, 2]);
//! assert_eq!(info.flips_xyz, [false, false, false]);
//! assert_eq!(info.qc_level, QcLevel::Ok);
//! assert_eq!(volume_ras.shape(), volume.shape());
//! # let _ = affine_ras;
//! # Ok::<(), reorient::ReorientError>(())
//! ```
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate quick_error;

pub mod affine;
pub mod error;
pub mod orientation;
pub mod reorient;

pub use affine::{non_orthogonality, Affine3, Affine4};
pub use error::{ReorientError, Result};
pub use orientation::{
    affine_axcodes, apply_orientation, infer_orientation, voxel_index_transform, AxisLabels,
    VoxelOrientation, BRUKER_AXIS_LABELS, RAS_AXIS_LABELS,
};
pub use reorient::{
    reorient_to_ras, reorient_to_ras_with, CenterMode, QcLevel, ReorientInfo, ReorientOptions,
};
