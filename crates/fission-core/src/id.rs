use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a cell placed in a reactor.
    pub struct CellId;

    /// Identifies a rod placed in a cell.
    pub struct RodId;
}

/// Identifies a rod type by its in-game item id (e.g. `9221` for Uranium235).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RodTypeId(pub u32);

impl std::fmt::Display for RodTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
