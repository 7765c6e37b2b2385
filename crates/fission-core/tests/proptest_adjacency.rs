//! Property-based tests for adjacency resolution.
//!
//! Uses proptest to generate random reactor layouts (mixed cell sizes, partly
//! filled cells, gaps) and checks that the per-entity resolvers and the batch
//! edge builder describe the same graph, including after random structural
//! edits applied to a reactor whose caches are warm.

use fission_core::geometry::{CellSize, Position};
use fission_core::id::{RodId, RodTypeId};
use fission_core::reactor::Reactor;
use fission_core::registry::RodTypeRegistry;
use fission_core::rod_type::{Durability, Factor, RodType};
use fission_core::test_utils::*;
use proptest::prelude::*;
use std::num::NonZeroU64;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_size() -> impl Strategy<Value = CellSize> {
    prop_oneof![Just(CellSize::OneByOne), Just(CellSize::TwoByTwo)]
}

/// Up to `max_cells` cells scattered on a small grid so that most of them
/// touch. Duplicate positions are dropped by the builder.
fn arb_reactor(max_cells: usize) -> impl Strategy<Value = Reactor> {
    proptest::collection::vec((0..5i32, 0..5i32, arb_size(), 0..16u8), 0..=max_cells)
        .prop_map(|layout| reactor_from_layout(&layout))
}

/// A structural edit. Indices are taken modulo the current cell or rod count.
#[derive(Debug, Clone)]
enum Edit {
    /// Explicit slot; coordinates up to 2 can fall outside the cell.
    AddRod { cell: usize, x: i32, y: i32 },
    AddDefaultRod { cell: usize },
    RemoveRod { rod: usize },
    AddCell { x: i32, y: i32, size: CellSize },
    RemoveCell { cell: usize },
    Resize { cell: usize, size: CellSize },
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (any::<usize>(), 0..3i32, 0..3i32).prop_map(|(cell, x, y)| Edit::AddRod { cell, x, y }),
        any::<usize>().prop_map(|cell| Edit::AddDefaultRod { cell }),
        any::<usize>().prop_map(|rod| Edit::RemoveRod { rod }),
        (0..5i32, 0..5i32, arb_size()).prop_map(|(x, y, size)| Edit::AddCell { x, y, size }),
        any::<usize>().prop_map(|cell| Edit::RemoveCell { cell }),
        (any::<usize>(), arb_size()).prop_map(|(cell, size)| Edit::Resize { cell, size }),
    ]
}

/// Apply an edit. Rejected edits (occupied cell or slot) leave the reactor
/// unchanged.
fn apply(reactor: &mut Reactor, edit: &Edit) {
    let cells = reactor.cell_ids().to_vec();
    let rods: Vec<RodId> = reactor.rods().map(|(id, _)| id).collect();
    let pick_cell = |i: usize| (!cells.is_empty()).then(|| cells[i % cells.len()]);
    match *edit {
        Edit::AddRod { cell, x, y } => {
            if let Some(cell) = pick_cell(cell) {
                let _ = reactor.add_rod(cell, u235().at(Position::new(x, y)));
            }
        }
        Edit::AddDefaultRod { cell } => {
            if let Some(cell) = pick_cell(cell) {
                let _ = reactor.add_rod(cell, u235());
            }
        }
        Edit::RemoveRod { rod } => {
            if !rods.is_empty() {
                reactor.remove_rod(rods[rod % rods.len()]).unwrap();
            }
        }
        Edit::AddCell { x, y, size } => {
            let _ = reactor.add_cell(Position::new(x, y), size, None);
        }
        Edit::RemoveCell { cell } => {
            if let Some(cell) = pick_cell(cell) {
                reactor.remove_cell(cell).unwrap();
            }
        }
        Edit::Resize { cell, size } => {
            if let Some(cell) = pick_cell(cell) {
                reactor.resize_cell(cell, size).unwrap();
            }
        }
    }
}

fn arb_fuel() -> impl Strategy<Value = RodType> {
    (0..4096u64, 0..4096u64, 1..128u64).prop_map(|(emission_self, emission_others, factor)| {
        RodType {
            id: RodTypeId(1),
            fullname: "Testium".to_string(),
            basename: "T".to_string(),
            superscript: String::new(),
            color: "#000000".to_string(),
            duability: Durability::Finite(1),
            emission_self,
            emission_others,
            factor: Factor::Finite(NonZeroU64::new(factor).unwrap()),
        }
    })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// The undirected closure of the batch cell edges equals the union of
    /// per-cell neighbor sets.
    #[test]
    fn cell_edges_match_neighbors(mut reactor in arb_reactor(20)) {
        let batch = batch_cell_pairs(&reactor);
        prop_assert_eq!(per_cell_pairs(&mut reactor, false), batch);
    }

    /// Every physical cell edge is emitted once.
    #[test]
    fn cell_edges_are_unique(reactor in arb_reactor(20)) {
        let edges = fission_core::edges::find_cell_edges(&reactor);
        prop_assert_eq!(edges.len(), batch_cell_pairs(&reactor).len());
        for edge in &edges {
            let from = reactor.cell(edge.from).unwrap().position();
            let to = reactor.cell(edge.to).unwrap().position();
            prop_assert!(from < to);
        }
    }

    /// For every rod, batch partners equal per-rod partners.
    #[test]
    fn rod_edges_match_adjacent_rods(mut reactor in arb_reactor(20)) {
        let batch = batch_rod_partners(&reactor);
        prop_assert_eq!(per_rod_partners(&mut reactor, true), batch);
    }

    /// Rod edges are never duplicated, even as undirected pairs.
    #[test]
    fn rod_edges_are_unique(reactor in arb_reactor(20)) {
        let cell_edges = fission_core::edges::find_cell_edges(&reactor);
        let edges = fission_core::edges::find_rod_edges(&reactor, &cell_edges).unwrap();
        let unique: std::collections::BTreeSet<_> =
            edges.iter().map(|e| e.normalized()).collect();
        prop_assert_eq!(unique.len(), edges.len());
    }

    /// r2 in adjacent(r1) iff r1 in adjacent(r2).
    #[test]
    fn adjacency_is_symmetric(mut reactor in arb_reactor(20)) {
        let partners = per_rod_partners(&mut reactor, false);
        for (rod, others) in &partners {
            for other in others {
                prop_assert!(partners.get(other).is_some_and(|set| set.contains(rod)));
            }
        }
    }

    /// Diagonal slots of a 2x2 cell are never adjacent.
    #[test]
    fn no_internal_diagonal(mut reactor in arb_reactor(20)) {
        let cells: Vec<_> = reactor.cell_ids().to_vec();
        for cell in cells {
            let diagonals = [
                (Position::new(0, 0), Position::new(1, 1)),
                (Position::new(1, 0), Position::new(0, 1)),
            ];
            for (a, b) in diagonals {
                let (Some(ra), Some(rb)) = (reactor.rod_at(cell, a), reactor.rod_at(cell, b)) else {
                    continue;
                };
                prop_assert!(!reactor.adjacent_rods(ra, true).unwrap().contains(&rb));
            }
        }
    }

    /// Cached and uncached queries agree, and repeated cached queries are stable.
    #[test]
    fn cache_is_transparent(mut reactor in arb_reactor(20)) {
        let uncached = per_rod_partners(&mut reactor, false);
        let cached_once = per_rod_partners(&mut reactor, true);
        let cached_twice = per_rod_partners(&mut reactor, true);
        prop_assert_eq!(&uncached, &cached_once);
        prop_assert_eq!(&cached_once, &cached_twice);
    }

    /// After every edit, warm caches answer like a from-scratch resolve and
    /// like the batch builder, also when resizes or explicit slots strand rods
    /// outside their cell.
    #[test]
    fn edits_keep_caches_consistent(
        mut reactor in arb_reactor(12),
        edits in proptest::collection::vec(arb_edit(), 1..24),
    ) {
        reactor.refresh_caches().unwrap();
        for edit in &edits {
            apply(&mut reactor, edit);
            let cached = per_rod_partners(&mut reactor, true);
            let uncached = per_rod_partners(&mut reactor.clone(), false);
            prop_assert_eq!(&cached, &uncached, "after {:?}", edit);
            prop_assert_eq!(&cached, &batch_rod_partners(&reactor), "after {:?}", edit);
            prop_assert_eq!(
                per_cell_pairs(&mut reactor, true),
                batch_cell_pairs(&reactor),
                "after {:?}",
                edit
            );
        }
    }

    /// Emission never decreases as received flux grows.
    #[test]
    fn emission_is_monotonic(rod_type in arb_fuel(), extra in 0..100_000u64, step in 0..1_000u64) {
        let low = rod_type.emission_self + extra;
        let a = rod_type.emission_to_others(low).unwrap();
        let b = rod_type.emission_to_others(low + step).unwrap();
        prop_assert!(a <= b);
    }

    /// Flux below self emission is rejected.
    #[test]
    fn emission_underflow(rod_type in arb_fuel()) {
        prop_assume!(rod_type.emission_self > 0);
        prop_assert!(rod_type.emission_to_others(rod_type.emission_self - 1).is_err());
    }

    /// Built-in types follow the same rules.
    #[test]
    fn builtin_emission_is_monotonic(index in 0..14usize, received in 0..10_000u64) {
        let registry = RodTypeRegistry::with_defaults();
        let rod_type = &registry.types()[index];
        match rod_type.emission_to_others(received) {
            Ok(low) => {
                let high = rod_type.emission_to_others(received + 1).unwrap();
                prop_assert!(low <= high);
            }
            Err(_) => prop_assert!(received < rod_type.emission_self),
        }
    }
}
