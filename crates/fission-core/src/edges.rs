//! Whole-reactor edge lists.
//!
//! The batch counterpart of [`crate::adjacency`]: instead of resolving one rod
//! at a time it emits every cell edge and every rod edge of the reactor in two
//! passes. Each physical edge appears exactly once. For every rod, the set of
//! partners in [`find_rod_edges`] equals [`Reactor::adjacent_rods`].

use crate::geometry::{CellSize, Direction, INTERNAL_PAIRS, boundary_pairs, edge_rod_positions};
use crate::id::{CellId, RodId};
use crate::reactor::{Reactor, ReactorError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Two touching cells, oriented from the lower coordinate to the higher one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellEdge {
    pub from: CellId,
    pub to: CellId,
}

/// Two rods exchanging flux. Semantically undirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RodEdge {
    pub from: RodId,
    pub to: RodId,
}

impl RodEdge {
    /// The same edge with endpoints in key order, for set comparisons.
    pub fn normalized(self) -> Self {
        if self.from <= self.to {
            self
        } else {
            Self {
                from: self.to,
                to: self.from,
            }
        }
    }
}

/// Every pair of touching cells. Only the `+x` and `+y` sides of each cell are
/// probed, so each edge is found once.
pub fn find_cell_edges(reactor: &Reactor) -> Vec<CellEdge> {
    let mut edges = Vec::new();
    for (id, cell) in reactor.cells() {
        for dir in [Direction::East, Direction::South] {
            if let Some(to) = cell.position().step(dir).and_then(|p| reactor.cell_at(p)) {
                edges.push(CellEdge { from: id, to });
            }
        }
    }
    edges
}

/// Every pair of adjacent rods: first the internal edges of each 2x2 cell,
/// then the boundary edges along each of `cell_edges`. An edge is emitted
/// only when both slots hold a rod.
pub fn find_rod_edges(
    reactor: &Reactor,
    cell_edges: &[CellEdge],
) -> Result<Vec<RodEdge>, ReactorError> {
    let mut edges = Vec::new();
    let mut try_add = |from: Option<RodId>, to: Option<RodId>| {
        if let (Some(from), Some(to)) = (from, to) {
            edges.push(RodEdge { from, to });
        }
    };

    for (id, cell) in reactor.cells() {
        if cell.size() != CellSize::TwoByTwo {
            continue;
        }
        for (a, b) in INTERNAL_PAIRS {
            try_add(reactor.rod_at(id, a), reactor.rod_at(id, b));
        }
    }

    for edge in cell_edges {
        let from_cell = reactor.try_cell(edge.from)?;
        let to_cell = reactor.try_cell(edge.to)?;
        let pos_diff = to_cell.position() - from_cell.position();
        let from_side = edge_rod_positions(from_cell.size(), pos_diff)?;
        let to_side = edge_rod_positions(to_cell.size(), -pos_diff)?;
        for (a, b) in boundary_pairs(&from_side, &to_side) {
            try_add(reactor.rod_at(edge.from, a), reactor.rod_at(edge.to, b));
        }
    }

    Ok(edges)
}

/// Undirected partner sets keyed by rod. Rods without edges are absent.
pub fn partner_map(edges: &[RodEdge]) -> BTreeMap<RodId, BTreeSet<RodId>> {
    let mut map: BTreeMap<RodId, BTreeSet<RodId>> = BTreeMap::new();
    for edge in edges {
        map.entry(edge.from).or_default().insert(edge.to);
        map.entry(edge.to).or_default().insert(edge.from);
    }
    map
}
