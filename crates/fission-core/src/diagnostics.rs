//! Diagnostic views of a reactor.
//!
//! - [`RodDiagnostic`] explains why a rod has the adjacency it has.
//! - [`ReactorSummary`] counts cells, rods, edges and stale caches.

use crate::adjacency::{
    cell_neighbors, cross_cell_partners, has_valid_position, internal_partners,
};
use crate::edges::{find_cell_edges, find_rod_edges};
use crate::geometry::{CellSize, Direction, Position};
use crate::id::{CellId, RodId};
use crate::reactor::{Reactor, ReactorError};

/// Breakdown of one rod's adjacency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RodDiagnostic {
    pub rod: RodId,
    pub cell: CellId,
    pub cell_position: Position,
    pub cell_size: CellSize,
    pub local_position: Position,
    /// False when the rod lies outside its cell's local grid.
    pub valid_position: bool,
    /// Directions of neighboring cells whose facing side includes this rod.
    pub facing: Vec<Direction>,
    pub internal: Vec<RodId>,
    /// Partners per neighboring cell, in probe order. Cells contributing
    /// nothing are omitted.
    pub cross_cell: Vec<(CellId, Vec<RodId>)>,
    pub cache_fresh: bool,
}

impl RodDiagnostic {
    /// Every partner, internal first.
    pub fn partners(&self) -> Vec<RodId> {
        self.internal
            .iter()
            .chain(self.cross_cell.iter().flat_map(|(_, rods)| rods))
            .copied()
            .collect()
    }
}

/// Whole-reactor counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactorSummary {
    pub cells: usize,
    pub rods: usize,
    pub cell_edges: usize,
    pub rod_edges: usize,
    /// Rods outside their cell's local grid.
    pub stranded_rods: usize,
    pub stale_cell_caches: usize,
    pub stale_rod_caches: usize,
}

impl Reactor {
    /// Explain a rod's adjacency without touching any cache.
    pub fn diagnose_rod(&self, rod: RodId) -> Result<RodDiagnostic, ReactorError> {
        let entry = self.try_rod(rod)?;
        let cell = self.try_cell(entry.cell())?;
        let valid_position = has_valid_position(self, rod)?;

        let mut facing = Vec::new();
        let mut cross_cell = Vec::new();
        if valid_position {
            for neighbor in cell_neighbors(self, entry.cell())? {
                let partners = cross_cell_partners(self, rod, neighbor)?;
                if partners.is_empty() {
                    continue;
                }
                let offset = self.try_cell(neighbor)?.position() - cell.position();
                facing.push(Direction::from_offset(offset)?);
                cross_cell.push((neighbor, partners));
            }
        }

        Ok(RodDiagnostic {
            rod,
            cell: entry.cell(),
            cell_position: cell.position(),
            cell_size: cell.size(),
            local_position: entry.position(),
            valid_position,
            facing,
            internal: internal_partners(self, rod)?,
            cross_cell,
            cache_fresh: entry.neighbor_cache().is_fresh(),
        })
    }

    /// Count cells, rods, edges and stale caches.
    pub fn summary(&self) -> Result<ReactorSummary, ReactorError> {
        let cell_edges = find_cell_edges(self);
        let rod_edges = find_rod_edges(self, &cell_edges)?;
        let mut summary = ReactorSummary {
            cells: self.cell_count(),
            rods: self.rod_count(),
            cell_edges: cell_edges.len(),
            rod_edges: rod_edges.len(),
            ..ReactorSummary::default()
        };
        for (_, cell) in self.cells() {
            if !cell.neighbor_cache().is_fresh() {
                summary.stale_cell_caches += 1;
            }
        }
        for (id, rod) in self.rods() {
            if !rod.neighbor_cache().is_fresh() {
                summary.stale_rod_caches += 1;
            }
            if !has_valid_position(self, id)? {
                summary.stranded_rods += 1;
            }
        }
        Ok(summary)
    }
}
