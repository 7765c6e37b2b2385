//! Rod type constants and the per-type emission formula.

use crate::id::RodTypeId;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Neutron count per tick.
pub type Flux = u64;

/// Maximum or current durability of a rod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Durability {
    Finite(u64),
    /// Absorbers, reflectors and empty slots never deplete.
    Infinite,
}

impl Durability {
    pub fn is_infinite(self) -> bool {
        matches!(self, Durability::Infinite)
    }

    /// Convert a raw value where any negative number means infinite.
    pub fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            Durability::Infinite
        } else {
            Durability::Finite(raw as u64)
        }
    }
}

/// Divisor applied to surplus flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Factor {
    Finite(NonZeroU64),
    /// The type passes no surplus flux on.
    Infinite,
}

impl Factor {
    /// Convert a raw value where zero or any negative number means infinite.
    pub fn from_raw(raw: i64) -> Self {
        match u64::try_from(raw).ok().and_then(NonZeroU64::new) {
            Some(factor) => Factor::Finite(factor),
            None => Factor::Infinite,
        }
    }
}

/// Immutable physical constants of a rod type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RodType {
    /// In-game item id.
    pub id: RodTypeId,
    /// Translation key name, e.g. `Uranium235`. Unique within a registry.
    pub fullname: String,
    /// Element abbreviation, e.g. `U`.
    pub basename: String,
    /// Superscript shown next to the basename, e.g. `235`.
    pub superscript: String,
    /// `#RRGGBB` display color.
    pub color: String,
    pub duability: Durability,
    /// Flux the rod always feeds back into itself.
    pub emission_self: Flux,
    /// Flux the rod always sends to its neighbors.
    pub emission_others: Flux,
    pub factor: Factor,
}

/// Errors from the emission formula.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmissionError {
    #[error("received flux {received} is lower than self emission {emission_self}")]
    FluxUnderflow { received: Flux, emission_self: Flux },
    #[error("emission for received flux {received} exceeds the flux range")]
    FluxOverflow { received: Flux },
}

/// Integer ceiling division, `ceil(a / b)`.
pub fn ceil_div(a: u64, b: NonZeroU64) -> u64 {
    let b = b.get();
    let r = a % b;
    (a - r) / b + u64::from(r != 0)
}

impl RodType {
    /// Total flux sent to all adjacent rods given the flux received last tick
    /// (self emission included).
    pub fn emission_to_others(&self, received: Flux) -> Result<Flux, EmissionError> {
        if received < self.emission_self {
            return Err(EmissionError::FluxUnderflow {
                received,
                emission_self: self.emission_self,
            });
        }
        let surplus = match self.factor {
            Factor::Finite(factor) => ceil_div(received - self.emission_self, factor),
            Factor::Infinite => 0,
        };
        surplus
            .checked_add(self.emission_others)
            .ok_or(EmissionError::FluxOverflow { received })
    }
}

// ---------------------------------------------------------------------------
// Built-in types
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn fuel(
    id: u32,
    fullname: &str,
    basename: &str,
    superscript: &str,
    color: &str,
    duability: u64,
    emission: Flux,
    factor: u64,
) -> RodType {
    RodType {
        id: RodTypeId(id),
        fullname: fullname.to_string(),
        basename: basename.to_string(),
        superscript: superscript.to_string(),
        color: color.to_string(),
        duability: Durability::Finite(duability),
        emission_self: emission,
        emission_others: emission,
        factor: NonZeroU64::new(factor).map_or(Factor::Infinite, Factor::Finite),
    }
}

fn inert(id: u32, fullname: &str, basename: &str, superscript: &str, color: &str) -> RodType {
    RodType {
        id: RodTypeId(id),
        fullname: fullname.to_string(),
        basename: basename.to_string(),
        superscript: superscript.to_string(),
        color: color.to_string(),
        duability: Durability::Infinite,
        emission_self: 0,
        emission_others: 0,
        factor: Factor::Infinite,
    }
}

/// The rod types every registry starts from.
pub fn default_rod_types() -> Vec<RodType> {
    vec![
        inert(9201, "Empty", "?", "", "#CCCCCC"),
        inert(9202, "NeutronAbsorber", "n", "a", "#646480"),
        inert(9203, "NeutronReflector", "n", "r", "#192D19"),
        fuel(9210, "Thorium230", "Th", "230", "#001E00", 6_000_000, 8, 64),
        fuel(9220, "Uranium238", "U", "238", "#24AB24", 3_000_000, 16, 32),
        fuel(9221, "Uranium235", "U", "235", "#58DF58", 600_000, 128, 8),
        fuel(9230, "Plutonium244", "Pu", "244", "#F03232", 600_000, 256, 8),
        fuel(9231, "Plutonium241", "Pu", "241", "#F26B6B", 600_000, 512, 6),
        fuel(9232, "Plutonium243", "Pu", "243", "#F0C3C3", 600_000, 512, 6),
        fuel(9240, "Americium245", "Am", "245", "#8F8F8F", 600_000, 256, 8),
        fuel(9241, "Americium241", "Am", "241", "#3D4D4D", 600_000, 512, 6),
        fuel(9250, "Cobalt60", "Co", "60", "#5A5AFE", 3_000_000, 8, 32),
        fuel(9260, "EnrichedNaquadah", "Nq", "+", "#5F5F5F", 6_000_000, 512, 8),
        fuel(9261, "Naquadria", "Nq", "", "#3B3B3B", 6_000_000, 2048, 6),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(v: u64) -> NonZeroU64 {
        NonZeroU64::new(v).unwrap()
    }

    fn uranium235() -> RodType {
        default_rod_types()
            .into_iter()
            .find(|t| t.fullname == "Uranium235")
            .unwrap()
    }

    #[test]
    fn ceil_div_rounds_up() {
        assert_eq!(ceil_div(0, nz(8)), 0);
        assert_eq!(ceil_div(1, nz(8)), 1);
        assert_eq!(ceil_div(8, nz(8)), 1);
        assert_eq!(ceil_div(9, nz(8)), 2);
        assert_eq!(ceil_div(128, nz(8)), 16);
        assert_eq!(ceil_div(7, nz(1)), 7);
    }

    #[test]
    fn uranium235_emission() {
        let u235 = uranium235();
        assert_eq!(u235.emission_to_others(256).unwrap(), 144);
        assert_eq!(u235.emission_to_others(128).unwrap(), 128);
        assert_eq!(u235.emission_to_others(129).unwrap(), 129);
    }

    #[test]
    fn flux_underflow_is_an_error() {
        let u235 = uranium235();
        let err = u235.emission_to_others(127).unwrap_err();
        assert_eq!(
            err,
            EmissionError::FluxUnderflow {
                received: 127,
                emission_self: 128
            }
        );
        assert!(err.to_string().contains("lower than self emission"));
    }

    #[test]
    fn flux_overflow_is_an_error() {
        let mut hot = uranium235();
        hot.emission_others = u64::MAX - 1;
        assert_eq!(hot.emission_to_others(128).unwrap(), u64::MAX - 1);
        assert_eq!(hot.emission_to_others(136).unwrap(), u64::MAX);
        assert_eq!(
            hot.emission_to_others(137).unwrap_err(),
            EmissionError::FluxOverflow { received: 137 }
        );
    }

    #[test]
    fn infinite_factor_emits_nothing_further() {
        let absorber = inert(9202, "NeutronAbsorber", "n", "a", "#646480");
        assert_eq!(absorber.emission_to_others(0).unwrap(), 0);
        assert_eq!(absorber.emission_to_others(10_000).unwrap(), 0);
    }

    #[test]
    fn raw_sentinels() {
        assert_eq!(Durability::from_raw(-1), Durability::Infinite);
        assert_eq!(Durability::from_raw(600_000), Durability::Finite(600_000));
        assert!(Durability::Infinite.is_infinite());
        assert_eq!(Factor::from_raw(-1), Factor::Infinite);
        assert_eq!(Factor::from_raw(0), Factor::Infinite);
        assert_eq!(Factor::from_raw(8), Factor::Finite(nz(8)));
    }

    #[test]
    fn defaults_have_unique_ids_and_names() {
        let types = default_rod_types();
        assert_eq!(types.len(), 14);
        let ids: std::collections::HashSet<_> = types.iter().map(|t| t.id).collect();
        let names: std::collections::HashSet<_> = types.iter().map(|t| &t.fullname).collect();
        assert_eq!(ids.len(), types.len());
        assert_eq!(names.len(), types.len());
    }

    #[test]
    fn inert_defaults_never_deplete() {
        for t in default_rod_types().iter().take(3) {
            assert!(t.duability.is_infinite());
            assert_eq!(t.factor, Factor::Infinite);
        }
    }
}
