//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::edges::{find_cell_edges, find_rod_edges, partner_map};
use crate::geometry::{CellSize, Position};
use crate::id::{CellId, RodId};
use crate::reactor::{Reactor, RodPlacement};
use std::collections::{BTreeMap, BTreeSet};

// ===========================================================================
// Rod placements
// ===========================================================================

pub fn u235() -> RodPlacement {
    RodPlacement::new("Uranium235")
}

pub fn absorber() -> RodPlacement {
    RodPlacement::new("NeutronAbsorber")
}

// ===========================================================================
// Reactor builders
// ===========================================================================

/// Add a cell with every slot filled with Uranium235.
pub fn full_cell(reactor: &mut Reactor, x: i32, y: i32, size: CellSize) -> CellId {
    let cell = reactor.add_cell(Position::new(x, y), size, None).unwrap();
    for _ in 0..size.capacity() {
        reactor.add_rod(cell, u235()).unwrap();
    }
    cell
}

/// A row of full cells along `+x`, starting at the origin.
pub fn row_of_cells(count: usize, size: CellSize) -> (Reactor, Vec<CellId>) {
    let mut reactor = Reactor::default();
    let cells = (0..count as i32)
        .map(|x| full_cell(&mut reactor, x, 0, size))
        .collect();
    (reactor, cells)
}

/// A square grid of full cells, alternating sizes in a checkerboard.
pub fn checkerboard(side: i32) -> Reactor {
    let mut reactor = Reactor::default();
    for y in 0..side {
        for x in 0..side {
            let size = if (x + y) % 2 == 0 {
                CellSize::TwoByTwo
            } else {
                CellSize::OneByOne
            };
            full_cell(&mut reactor, x, y, size);
        }
    }
    reactor
}

/// A 2x2 cell at `(1,1)` with a 1x1 cell on each side, plus a detached 1x1
/// cell at `(3,2)`. Returned cells: `[center, left, right, up, down, detached]`.
pub fn plus_layout() -> (Reactor, Vec<CellId>) {
    let mut reactor = Reactor::default();
    let cells = vec![
        full_cell(&mut reactor, 1, 1, CellSize::TwoByTwo),
        full_cell(&mut reactor, 0, 1, CellSize::OneByOne),
        full_cell(&mut reactor, 2, 1, CellSize::OneByOne),
        full_cell(&mut reactor, 1, 0, CellSize::OneByOne),
        full_cell(&mut reactor, 1, 2, CellSize::OneByOne),
        full_cell(&mut reactor, 3, 2, CellSize::OneByOne),
    ];
    (reactor, cells)
}

/// Build a reactor from `(x, y, size, slot_mask)` tuples. Bit `i` of the mask
/// fills the `i`-th local slot in placement order. Cells on an occupied
/// position are skipped.
pub fn reactor_from_layout(layout: &[(i32, i32, CellSize, u8)]) -> Reactor {
    let mut reactor = Reactor::default();
    for &(x, y, size, mask) in layout {
        let Ok(cell) = reactor.add_cell(Position::new(x, y), size, None) else {
            continue;
        };
        for (i, slot) in size.local_positions().enumerate() {
            if mask & (1 << i) != 0 {
                reactor.add_rod(cell, u235().at(slot)).unwrap();
            }
        }
    }
    reactor
}

// ===========================================================================
// Graph views
// ===========================================================================

/// Rod found at a local slot. Panics when the slot is empty.
pub fn rod(reactor: &Reactor, cell: CellId, x: i32, y: i32) -> RodId {
    reactor.rod_at(cell, Position::new(x, y)).unwrap()
}

/// Undirected cell pairs from the per-cell resolver.
pub fn per_cell_pairs(reactor: &mut Reactor, use_cache: bool) -> BTreeSet<(CellId, CellId)> {
    let mut pairs = BTreeSet::new();
    for cell in reactor.cell_ids().to_vec() {
        for neighbor in reactor.neighbors_of(cell, use_cache).unwrap() {
            pairs.insert((cell.min(neighbor), cell.max(neighbor)));
        }
    }
    pairs
}

/// Undirected cell pairs from the batch builder.
pub fn batch_cell_pairs(reactor: &Reactor) -> BTreeSet<(CellId, CellId)> {
    find_cell_edges(reactor)
        .into_iter()
        .map(|e| (e.from.min(e.to), e.from.max(e.to)))
        .collect()
}

/// Partner sets from the per-rod resolver. Rods without partners are absent.
pub fn per_rod_partners(
    reactor: &mut Reactor,
    use_cache: bool,
) -> BTreeMap<RodId, BTreeSet<RodId>> {
    let rods: Vec<RodId> = reactor.rods().map(|(id, _)| id).collect();
    let mut map = BTreeMap::new();
    for rod in rods {
        let partners: BTreeSet<RodId> = reactor
            .adjacent_rods(rod, use_cache)
            .unwrap()
            .into_iter()
            .collect();
        if !partners.is_empty() {
            map.insert(rod, partners);
        }
    }
    map
}

/// Partner sets from the batch builder.
pub fn batch_rod_partners(reactor: &Reactor) -> BTreeMap<RodId, BTreeSet<RodId>> {
    let cell_edges = find_cell_edges(reactor);
    partner_map(&find_rod_edges(reactor, &cell_edges).unwrap())
}
