//! Batched connectivity edits.
//!
//! Both ops take per-type local indices, ignore repeats, and are no-ops on an
//! empty selection or an empty block. Cell tags follow the edit.

use crate::error::{RepairError, RepairResult};
use meshfix_geom::polygon_signed_area;
use meshfix_mesh::MeshData;
use meshfix_types::CellKind;
use std::collections::BTreeSet;
use tracing::debug;

fn block_len(mesh: &MeshData, kind: CellKind) -> usize {
    match kind {
        CellKind::Tri => mesh.triangles.len(),
        CellKind::Quad => mesh.quads.len(),
    }
}

/// Deduplicated selection, or `None` when there is nothing to do.
fn selection(mesh: &MeshData, kind: CellKind, indices: &[usize]) -> RepairResult<Option<BTreeSet<usize>>> {
    let len = block_len(mesh, kind);
    if indices.is_empty() || len == 0 {
        return Ok(None);
    }
    let set: BTreeSet<usize> = indices.iter().copied().collect();
    match set.last() {
        Some(&index) if index >= len => Err(RepairError::IndexOutOfRange { kind, index, len }),
        _ => Ok(Some(set)),
    }
}

fn drop_masked<T>(cells: &mut Vec<T>, doomed: &BTreeSet<usize>) {
    let mut i = 0;
    cells.retain(|_| {
        let keep = !doomed.contains(&i);
        i += 1;
        keep
    });
}

/// Removes tagged references to `doomed` and shifts the survivors down.
fn remap_tags(mesh: &mut MeshData, kind: CellKind, doomed: &BTreeSet<usize>) {
    for tag in mesh.cell_tags.values_mut() {
        let indices = match kind {
            CellKind::Tri => &mut tag.triangle,
            CellKind::Quad => &mut tag.quad,
        };
        *indices = indices
            .iter()
            .filter(|&&i| !doomed.contains(&i))
            .map(|&i| i - doomed.range(..i).count())
            .collect();
    }
}

/// Deletes cells of one kind. Returns the number of distinct cells removed.
pub fn remove_cells(mesh: &mut MeshData, kind: CellKind, indices: &[usize]) -> RepairResult<usize> {
    let Some(doomed) = selection(mesh, kind, indices)? else {
        return Ok(0);
    };
    match kind {
        CellKind::Tri => drop_masked(&mut mesh.triangles, &doomed),
        CellKind::Quad => drop_masked(&mut mesh.quads, &doomed),
    }
    remap_tags(mesh, kind, &doomed);
    debug!(kind = %kind, removed = doomed.len(), "cells removed");
    Ok(doomed.len())
}

/// Reverses node order (CW <-> CCW). Returns the number of distinct cells
/// flipped.
pub fn reorient_cells(mesh: &mut MeshData, kind: CellKind, indices: &[usize]) -> RepairResult<usize> {
    let Some(targets) = selection(mesh, kind, indices)? else {
        return Ok(0);
    };
    for &i in &targets {
        match kind {
            CellKind::Tri => mesh.triangles[i].reverse(),
            CellKind::Quad => mesh.quads[i].reverse(),
        }
    }
    Ok(targets.len())
}

/// Shoelace signed area of a live cell, `None` when the index is stale.
pub fn cell_signed_area(mesh: &MeshData, kind: CellKind, index: usize) -> Option<f64> {
    let nodes: &[usize] = match kind {
        CellKind::Tri => mesh.triangles.get(index)?,
        CellKind::Quad => mesh.quads.get(index)?,
    };
    let pts: Vec<_> = nodes.iter().map(|&n| mesh.points[n]).collect();
    Some(polygon_signed_area(&pts))
}
