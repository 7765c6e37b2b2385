//! The reactor aggregate: cells on a grid, rods inside cells, and the
//! adjacency caches derived from them.
//!
//! Cells and rods live in arenas keyed by [`CellId`] and [`RodId`]. A rod
//! refers back to its cell by key, never by pointer. Structural mutators
//! invalidate exactly the caches whose contents they can change: the touched
//! cell, its four grid neighbors, and the rods in those cells.

use crate::adjacency;
use crate::cache::AdjacencyCache;
use crate::geometry::{CellSize, Direction, GeometryError, Position, next_rod_position};
use crate::id::{CellId, RodId, RodTypeId};
use crate::registry::{RegistryError, RodTypeRef, RodTypeRegistry};
use crate::rod_type::{Durability, EmissionError, Flux, RodType};
use slotmap::SlotMap;
use std::collections::BTreeMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from reactor operations.
#[derive(Debug, thiserror::Error)]
pub enum ReactorError {
    #[error("cell not found: {0:?}")]
    CellNotFound(CellId),
    #[error("rod not found: {0:?}")]
    RodNotFound(RodId),
    #[error("a cell already occupies {0}")]
    CellOccupied(Position),
    #[error("slot {position} of cell {cell:?} already holds a rod")]
    SlotOccupied { cell: CellId, position: Position },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Emission(#[from] EmissionError),
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A grid unit holding a 1x1 or 2x2 block of rod slots.
#[derive(Debug, Clone)]
pub struct Cell {
    position: Position,
    size: CellSize,
    fluid: Option<String>,
    rods: Vec<RodId>,
    neighbors: AdjacencyCache<Vec<CellId>>,
}

impl Cell {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> CellSize {
        self.size
    }

    /// Coolant identifier. Opaque to this crate.
    pub fn fluid(&self) -> Option<&str> {
        self.fluid.as_deref()
    }

    /// Rods in insertion order.
    pub fn rod_ids(&self) -> &[RodId] {
        &self.rods
    }

    pub fn neighbor_cache(&self) -> &AdjacencyCache<Vec<CellId>> {
        &self.neighbors
    }
}

/// A fuel or control element occupying one local slot of a cell.
#[derive(Debug, Clone)]
pub struct Rod {
    cell: CellId,
    position: Position,
    rod_type: RodTypeId,
    initial_durability: Durability,
    durability: Durability,
    neighbors: AdjacencyCache<Vec<RodId>>,
}

impl Rod {
    /// The owning cell.
    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// Local position inside the owning cell.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn rod_type(&self) -> RodTypeId {
        self.rod_type
    }

    pub fn initial_durability(&self) -> Durability {
        self.initial_durability
    }

    /// Current durability. Equal to the initial value until a simulation
    /// driver depletes it.
    pub fn durability(&self) -> Durability {
        self.durability
    }

    pub fn neighbor_cache(&self) -> &AdjacencyCache<Vec<RodId>> {
        &self.neighbors
    }
}

/// How to place a rod: its type plus optional slot and starting durability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RodPlacement {
    pub rod_type: RodTypeRef,
    /// Defaults to the next free slot of the cell.
    pub position: Option<Position>,
    /// Defaults to the type's maximum durability.
    pub durability: Option<Durability>,
}

impl RodPlacement {
    pub fn new(rod_type: impl Into<RodTypeRef>) -> Self {
        Self {
            rod_type: rod_type.into(),
            position: None,
            durability: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = Some(durability);
        self
    }
}

// ---------------------------------------------------------------------------
// Reactor
// ---------------------------------------------------------------------------

/// Root aggregate owning every cell and rod.
#[derive(Debug, Clone)]
pub struct Reactor {
    registry: Arc<RodTypeRegistry>,
    cells: SlotMap<CellId, Cell>,
    rods: SlotMap<RodId, Rod>,
    /// Cells in insertion order.
    order: Vec<CellId>,
    grid: BTreeMap<Position, CellId>,
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new(Arc::new(RodTypeRegistry::with_defaults()))
    }
}

impl Reactor {
    pub fn new(registry: Arc<RodTypeRegistry>) -> Self {
        Self {
            registry,
            cells: SlotMap::with_key(),
            rods: SlotMap::with_key(),
            order: Vec::new(),
            grid: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &RodTypeRegistry {
        &self.registry
    }

    // -- Point queries --

    pub fn cell(&self, cell: CellId) -> Option<&Cell> {
        self.cells.get(cell)
    }

    pub fn rod(&self, rod: RodId) -> Option<&Rod> {
        self.rods.get(rod)
    }

    pub(crate) fn try_cell(&self, cell: CellId) -> Result<&Cell, ReactorError> {
        self.cells.get(cell).ok_or(ReactorError::CellNotFound(cell))
    }

    pub(crate) fn try_rod(&self, rod: RodId) -> Result<&Rod, ReactorError> {
        self.rods.get(rod).ok_or(ReactorError::RodNotFound(rod))
    }

    /// The cell at a reactor grid position.
    pub fn cell_at(&self, position: Position) -> Option<CellId> {
        self.grid.get(&position).copied()
    }

    /// The rod in a local slot of a cell.
    pub fn rod_at(&self, cell: CellId, position: Position) -> Option<RodId> {
        self.cells
            .get(cell)?
            .rods
            .iter()
            .copied()
            .find(|&rod| self.rods[rod].position == position)
    }

    /// The type of a rod.
    pub fn rod_type(&self, rod: RodId) -> Result<&RodType, ReactorError> {
        let id = self.try_rod(rod)?.rod_type;
        Ok(self.registry.lookup(&RodTypeRef::from(id))?)
    }

    // -- Iteration --

    pub fn cell_ids(&self) -> &[CellId] {
        &self.order
    }

    /// Cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.order.iter().map(move |&id| (id, &self.cells[id]))
    }

    /// Every rod, cell by cell.
    pub fn rods(&self) -> impl Iterator<Item = (RodId, &Rod)> {
        self.cells()
            .flat_map(move |(_, cell)| cell.rods.iter().map(move |&id| (id, &self.rods[id])))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn rod_count(&self) -> usize {
        self.rods.len()
    }

    // -- Mutation --

    /// Position for the next cell: one to the right of the last cell added,
    /// or the origin for an empty reactor. Fails when the last cell sits on
    /// the right edge of the grid.
    pub fn next_cell_position(&self) -> Result<Position, ReactorError> {
        let Some(&last) = self.order.last() else {
            return Ok(Position::new(0, 0));
        };
        let position = self.cells[last].position;
        position
            .step(Direction::East)
            .ok_or(ReactorError::Geometry(GeometryError::OffGrid {
                position,
                direction: Direction::East,
            }))
    }

    /// Place a cell on the reactor grid.
    pub fn add_cell(
        &mut self,
        position: Position,
        size: CellSize,
        fluid: Option<String>,
    ) -> Result<CellId, ReactorError> {
        if self.grid.contains_key(&position) {
            return Err(ReactorError::CellOccupied(position));
        }
        let id = self.cells.insert(Cell {
            position,
            size,
            fluid,
            rods: Vec::new(),
            neighbors: AdjacencyCache::Stale,
        });
        self.order.push(id);
        self.grid.insert(position, id);
        self.invalidate_around(position, true);
        Ok(id)
    }

    /// Add a rod to a cell. The type must exist in the registry. A position
    /// outside the cell's local grid is accepted; such a rod has no adjacency.
    pub fn add_rod(
        &mut self,
        cell: CellId,
        placement: RodPlacement,
    ) -> Result<RodId, ReactorError> {
        let rod_type = self.registry.lookup(&placement.rod_type)?;
        let (type_id, max_durability) = (rod_type.id, rod_type.duability);

        let owner = self.try_cell(cell)?;
        let position = match placement.position {
            Some(position) => position,
            None => {
                let taken: Vec<Position> =
                    owner.rods.iter().map(|&r| self.rods[r].position).collect();
                next_rod_position(&taken, owner.size)
            }
        };
        if self.rod_at(cell, position).is_some() {
            return Err(ReactorError::SlotOccupied { cell, position });
        }

        let durability = placement.durability.unwrap_or(max_durability);
        let id = self.rods.insert(Rod {
            cell,
            position,
            rod_type: type_id,
            initial_durability: durability,
            durability,
            neighbors: AdjacencyCache::Stale,
        });
        let owner_position = {
            let owner = &mut self.cells[cell];
            owner.rods.push(id);
            owner.position
        };
        self.invalidate_around(owner_position, false);
        Ok(id)
    }

    /// Remove a rod from its cell.
    pub fn remove_rod(&mut self, rod: RodId) -> Result<Rod, ReactorError> {
        let removed = self.rods.remove(rod).ok_or(ReactorError::RodNotFound(rod))?;
        let owner = &mut self.cells[removed.cell];
        owner.rods.retain(|&r| r != rod);
        let position = owner.position;
        self.invalidate_around(position, false);
        Ok(removed)
    }

    /// Remove a cell together with its rods.
    pub fn remove_cell(&mut self, cell: CellId) -> Result<(), ReactorError> {
        let removed = self.cells.remove(cell).ok_or(ReactorError::CellNotFound(cell))?;
        for rod in &removed.rods {
            self.rods.remove(*rod);
        }
        self.order.retain(|&c| c != cell);
        self.grid.remove(&removed.position);
        self.invalidate_around(removed.position, true);
        Ok(())
    }

    /// Change a cell's size. Rods left outside the new local grid stay in the
    /// cell but lose all adjacency until moved or removed.
    pub fn resize_cell(&mut self, cell: CellId, size: CellSize) -> Result<(), ReactorError> {
        let owner = self.cells.get_mut(cell).ok_or(ReactorError::CellNotFound(cell))?;
        owner.size = size;
        let position = owner.position;
        self.invalidate_around(position, false);
        Ok(())
    }

    // -- Adjacency --

    /// Neighboring cells in probe order `+x, -x, +y, -y`. With `use_cache`,
    /// a fresh cached result is returned as is; otherwise the neighbors are
    /// recomputed and cached.
    pub fn neighbors_of(
        &mut self,
        cell: CellId,
        use_cache: bool,
    ) -> Result<Vec<CellId>, ReactorError> {
        if use_cache {
            if let Some(cached) = self.try_cell(cell)?.neighbors.get() {
                return Ok(cached.clone());
            }
        }
        let neighbors = adjacency::cell_neighbors(self, cell)?;
        self.cells[cell].neighbors.store(neighbors.clone());
        Ok(neighbors)
    }

    /// Every rod exchanging flux with `rod`. `use_cache` applies to both the
    /// rod's own cache and the neighbor lookup of its cell.
    pub fn adjacent_rods(
        &mut self,
        rod: RodId,
        use_cache: bool,
    ) -> Result<Vec<RodId>, ReactorError> {
        let cell = {
            let entry = self.try_rod(rod)?;
            if use_cache {
                if let Some(cached) = entry.neighbors.get() {
                    return Ok(cached.clone());
                }
            }
            entry.cell
        };
        let neighbor_cells = self.neighbors_of(cell, use_cache)?;
        let partners = adjacency::rod_neighbors(self, rod, &neighbor_cells)?;
        self.rods[rod].neighbors.store(partners.clone());
        Ok(partners)
    }

    /// Cached neighbors of a cell, if fresh. Read-only.
    pub fn cached_neighbors(&self, cell: CellId) -> Option<&[CellId]> {
        self.cells.get(cell)?.neighbors.get().map(Vec::as_slice)
    }

    /// Cached adjacency of a rod, if fresh. Read-only.
    pub fn cached_adjacent_rods(&self, rod: RodId) -> Option<&[RodId]> {
        self.rods.get(rod)?.neighbors.get().map(Vec::as_slice)
    }

    /// Mark every adjacency cache stale.
    pub fn clear_cache(&mut self) {
        for cell in self.cells.values_mut() {
            cell.neighbors.invalidate();
        }
        for rod in self.rods.values_mut() {
            rod.neighbors.invalidate();
        }
    }

    /// Recompute every stale cache. Afterwards the cached accessors answer
    /// for every cell and rod, so a shared `&Reactor` can serve all reads.
    pub fn refresh_caches(&mut self) -> Result<(), ReactorError> {
        for cell in self.order.clone() {
            self.neighbors_of(cell, true)?;
        }
        let rods: Vec<RodId> = self.rods().map(|(id, _)| id).collect();
        for rod in rods {
            self.adjacent_rods(rod, true)?;
        }
        Ok(())
    }

    fn invalidate_around(&mut self, position: Position, cells_too: bool) {
        let touched = std::iter::once(position)
            .chain(Direction::all().into_iter().filter_map(|d| position.step(d)));
        for pos in touched {
            let Some(&cell) = self.grid.get(&pos) else {
                continue;
            };
            let entry = &mut self.cells[cell];
            if cells_too {
                entry.neighbors.invalidate();
            }
            for &rod in &entry.rods {
                self.rods[rod].neighbors.invalidate();
            }
        }
    }

    // -- Emission --

    /// Flux a rod sends to all its neighbors given the flux it received.
    pub fn emission_to_others(&self, rod: RodId, received: Flux) -> Result<Flux, ReactorError> {
        Ok(self.rod_type(rod)?.emission_to_others(received)?)
    }
}
