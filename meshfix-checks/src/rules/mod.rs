//! Rule implementations.
//!
//! Every rule has the same shape, `(view, thresholds, cache) -> Finding`. The
//! id and severity a rule writes are provisional; the orchestrator restamps
//! both from the registry.

pub(crate) mod errors;
pub(crate) mod warnings;

use crate::view::MeshView;
use meshfix_geom::{polygon_signed_area, triangle_signed_area};

/// Examples kept by most rules, below the hard cap on findings.
pub(crate) const SAMPLE: usize = 20;

/// Shoelace area of a unified cell; positive means counter-clockwise.
pub(crate) fn signed_cell_area(view: &MeshView<'_>, cid: usize) -> f64 {
    polygon_signed_area(&view.cell_points(cid))
}

/// Unsigned area with quads split along the 0-2 diagonal, which stays
/// meaningful for bow-tie quads.
pub(crate) fn split_cell_area(view: &MeshView<'_>, cid: usize) -> f64 {
    let p = view.cell_points(cid);
    match p.as_slice() {
        [a, b, c] => triangle_signed_area(*a, *b, *c).abs(),
        [a, b, c, d] => {
            triangle_signed_area(*a, *b, *c).abs() + triangle_signed_area(*a, *d, *c).abs()
        }
        _ => polygon_signed_area(&p).abs(),
    }
}
