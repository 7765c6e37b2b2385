//! Per-entity adjacency resolution.
//!
//! These functions read the reactor without touching its caches. The caching
//! entry points are [`Reactor::neighbors_of`] and [`Reactor::adjacent_rods`].
//!
//! Two rods are adjacent when they would exchange neutron flux:
//!
//! - inside one 2x2 cell, a rod touches its horizontal and vertical mirror
//!   (never the diagonal);
//! - across two touching cells, rods on the facing sides are paired with
//!   [`boundary_pairs`]. A 1x1 cell's only rod stands for its whole side, so
//!   it pairs with both boundary rods of a 2x2 neighbor.

use crate::geometry::{
    CellSize, Direction, boundary_pairs, edge_rod_positions, internal_mirrors,
};
use crate::id::{CellId, RodId};
use crate::reactor::{Reactor, ReactorError};

/// Cells touching `cell`, in probe order `+x, -x, +y, -y`.
pub fn cell_neighbors(reactor: &Reactor, cell: CellId) -> Result<Vec<CellId>, ReactorError> {
    let origin = reactor.try_cell(cell)?.position();
    Ok(Direction::all()
        .into_iter()
        .filter_map(|dir| reactor.cell_at(origin.step(dir)?))
        .collect())
}

/// Whether the rod sits inside its cell's local grid. Rods stranded by a
/// resize have no adjacency at all.
pub fn has_valid_position(reactor: &Reactor, rod: RodId) -> Result<bool, ReactorError> {
    let entry = reactor.try_rod(rod)?;
    let size = reactor.try_cell(entry.cell())?.size();
    Ok(size.is_valid_local_position(entry.position()))
}

/// Rods sharing an internal edge with `rod` inside its own 2x2 cell.
pub fn internal_partners(reactor: &Reactor, rod: RodId) -> Result<Vec<RodId>, ReactorError> {
    let entry = reactor.try_rod(rod)?;
    let cell = reactor.try_cell(entry.cell())?;
    if cell.size() != CellSize::TwoByTwo || !has_valid_position(reactor, rod)? {
        return Ok(Vec::new());
    }
    Ok(internal_mirrors(entry.position())
        .into_iter()
        .filter_map(|pos| reactor.rod_at(entry.cell(), pos))
        .collect())
}

/// Rods of `neighbor` touching `rod` across the shared cell boundary. Empty
/// when `rod` is not on the side of its cell facing `neighbor`.
pub fn cross_cell_partners(
    reactor: &Reactor,
    rod: RodId,
    neighbor: CellId,
) -> Result<Vec<RodId>, ReactorError> {
    let entry = reactor.try_rod(rod)?;
    let this_cell = reactor.try_cell(entry.cell())?;
    let that_cell = reactor.try_cell(neighbor)?;
    if !has_valid_position(reactor, rod)? {
        return Ok(Vec::new());
    }

    let pos_diff = that_cell.position() - this_cell.position();
    let this_edge = edge_rod_positions(this_cell.size(), pos_diff)?;
    if !this_edge.contains(&entry.position()) {
        return Ok(Vec::new());
    }
    let that_edge = edge_rod_positions(that_cell.size(), -pos_diff)?;

    Ok(boundary_pairs(&this_edge, &that_edge)
        .filter(|&(this_pos, _)| this_pos == entry.position())
        .filter_map(|(_, that_pos)| reactor.rod_at(neighbor, that_pos))
        .collect())
}

/// Every rod adjacent to `rod`, given the already resolved neighbors of its
/// cell. Internal partners come first, then each neighbor cell's partners in
/// the order of `neighbor_cells`.
pub fn rod_neighbors(
    reactor: &Reactor,
    rod: RodId,
    neighbor_cells: &[CellId],
) -> Result<Vec<RodId>, ReactorError> {
    if !has_valid_position(reactor, rod)? {
        return Ok(Vec::new());
    }
    let mut partners = internal_partners(reactor, rod)?;
    for &neighbor in neighbor_cells {
        partners.extend(cross_cell_partners(reactor, rod, neighbor)?);
    }
    Ok(partners)
}
