//! Types for error handling
use std::result;

quick_error! {
    /// Error type for all reorientation operations.
    #[derive(Debug, Clone, PartialEq)]
    pub enum ReorientError {
        /// The volume does not carry three spatial dimensions.
        InvalidRank(rank: usize) {
            display("volume must be at least 3-dimensional, got rank {}", rank)
        }
        /// A column of the affine's linear part has zero norm, so no voxel
        /// size or direction can be derived from it.
        DegenerateAffine(column: usize) {
            display("invalid affine: zero column norm in linear part (column {})", column)
        }
        /// Unrecognized centering policy name.
        InvalidCenterMode(mode: String) {
            display("center mode must be \"fov_center\" or \"abs_translation\", got \"{}\"", mode)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = result::Result<T, ReorientError>;
