//! 2D geometry kernels shared by the meshfix checks and fixers.
//!
//! Everything here is a pure function over plain `[f64; 2]` points. There is
//! no state and no allocation beyond what a caller passes in.
//!
//! Conventions:
//! - A positive signed area means counter-clockwise winding.
//! - Predicates take an explicit tolerance; the defaults match what the
//!   check rules use when no threshold overrides them.

mod aabb;
mod kernels;

pub use aabb::Aabb2;
pub use kernels::{
    DEFAULT_COLLINEAR_EPS, DEFAULT_CONTAINMENT_EPS, centroid, edge_length, orient, point_in_quad,
    point_in_triangle, polygon_interior_angles, polygon_signed_area, segments_intersect,
    triangle_angles, triangle_signed_area,
};

/// A point in the XY plane.
pub type Point2 = [f64; 2];
