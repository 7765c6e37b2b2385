//! Fission Core -- geometric adjacency for grid-based fission reactors.
//!
//! A reactor is a grid of cells. Each cell holds a 1x1 or 2x2 block of rods,
//! and neutron flux flows between rods that touch. This crate resolves which
//! cells touch, which rods touch (including across the boundary between a 1x1
//! and a 2x2 cell), and how much flux each rod type passes on.
//!
//! # Two ways to get adjacency
//!
//! - **Per entity, cached** -- [`reactor::Reactor::neighbors_of`] and
//!   [`reactor::Reactor::adjacent_rods`] resolve one cell or rod and cache the
//!   result until a structural mutation invalidates it.
//! - **Whole reactor, batch** -- [`edges::find_cell_edges`] and
//!   [`edges::find_rod_edges`] emit every edge once, ready to seed a flux
//!   propagation pass.
//!
//! Both produce the same undirected graph.
//!
//! ```rust,ignore
//! let mut reactor = Reactor::default();
//! let cell = reactor.add_cell(Position::new(0, 0), CellSize::TwoByTwo, None)?;
//! let rod = reactor.add_rod(cell, RodPlacement::new("Uranium235"))?;
//! let partners = reactor.adjacent_rods(rod, true)?;
//! ```
//!
//! # Key Types
//!
//! - [`reactor::Reactor`] -- Root aggregate owning cells, rods and caches.
//! - [`geometry::CellSize`] / [`geometry::Position`] -- Grid arithmetic and
//!   boundary matching.
//! - [`rod_type::RodType`] -- Per-type constants and the emission formula.
//! - [`registry::RodTypeRegistry`] -- Immutable rod type catalog.
//! - [`diagnostics::RodDiagnostic`] -- Why a rod touches what it touches.

pub mod adjacency;
pub mod cache;
pub mod diagnostics;
pub mod edges;
pub mod geometry;
pub mod id;
pub mod reactor;
pub mod registry;
pub mod rod_type;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
