//! Blend math: the eased progress curve, Bézier evaluation over poses and
//! scalars, and optional arc-length reparametrization.

pub mod arc_length;
pub mod bezier;
pub mod ease;
pub mod functions;

pub use arc_length::arc_length_parametrization;
pub use bezier::{bezier_pose, bezier_position, bezier_rotation, bezier_scalar, MAX_CONTROL_POINTS};
pub use ease::ease;
