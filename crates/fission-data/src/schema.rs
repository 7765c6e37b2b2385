//! Serde data file structs for reactor configurations.
//!
//! These structs define the on-disk format of a reactor: optional rod type
//! definitions followed by an ordered list of cells. They are deserialized
//! from RON, JSON, or TOML and then resolved into a [`Reactor`] by the loader.
//!
//! [`Reactor`]: fission_core::reactor::Reactor

use fission_core::id::RodTypeId;
use fission_core::registry::RodTypeRef;
use fission_core::rod_type::{Durability, Factor, RodType};
use serde::Deserialize;

// ===========================================================================
// Top level
// ===========================================================================

/// A whole reactor configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactorData {
    /// Rod types to register, or to update when the id or fullname is known.
    #[serde(default)]
    pub rod_types: Vec<RodTypeData>,
    #[serde(default)]
    pub cells: Vec<CellData>,
}

// ===========================================================================
// Rod types
// ===========================================================================

/// A rod type definition. Negative `duability` and non-positive `factor`
/// mean infinite.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RodTypeData {
    pub id: u32,
    pub fullname: String,
    #[serde(default)]
    pub basename: String,
    #[serde(default)]
    pub superscript: String,
    #[serde(default = "default_color")]
    pub color: String,
    pub duability: i64,
    pub emission_self: u64,
    pub emission_others: u64,
    pub factor: i64,
}

fn default_color() -> String {
    "#CCCCCC".to_string()
}

impl RodTypeData {
    pub fn to_rod_type(&self) -> RodType {
        RodType {
            id: RodTypeId(self.id),
            fullname: self.fullname.clone(),
            basename: self.basename.clone(),
            superscript: self.superscript.clone(),
            color: self.color.clone(),
            duability: Durability::from_raw(self.duability),
            emission_self: self.emission_self,
            emission_others: self.emission_others,
            factor: Factor::from_raw(self.factor),
        }
    }
}

// ===========================================================================
// Cells and rods
// ===========================================================================

/// A cell in a data file. Without `x`/`y` the cell goes one step to the
/// right of the previous cell.
#[derive(Debug, Clone, Deserialize)]
pub struct CellData {
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    /// `"1x1"` or `"2x2"`.
    #[serde(default = "default_size", alias = "type")]
    pub size: String,
    #[serde(default)]
    pub fluid: Option<String>,
    #[serde(default)]
    pub rods: Vec<RodData>,
}

fn default_size() -> String {
    "2x2".to_string()
}

/// A rod entry, supporting a bare type reference or the full form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RodData {
    /// Short form: a fullname or numeric id.
    Short(RodTypeRef),
    /// Full form with optional slot and starting durability.
    Full {
        #[serde(rename = "type")]
        rod_type: RodTypeRef,
        #[serde(default)]
        x: Option<i32>,
        #[serde(default)]
        y: Option<i32>,
        #[serde(default, alias = "initialDurability")]
        duability: Option<i64>,
    },
}

impl RodData {
    pub fn rod_type(&self) -> &RodTypeRef {
        match self {
            RodData::Short(rod_type) | RodData::Full { rod_type, .. } => rod_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rod_data_short_forms() {
        let rods: Vec<RodData> = serde_json::from_str(r#"["Uranium235", 9221]"#).unwrap();
        assert_eq!(rods[0].rod_type(), &RodTypeRef::from("Uranium235"));
        assert_eq!(rods[1].rod_type(), &RodTypeRef::Id(9221));
    }

    #[test]
    fn rod_data_full_form() {
        let rod: RodData =
            serde_json::from_str(r#"{"type": "Uranium235", "x": 1, "y": 1, "duability": 0}"#)
                .unwrap();
        match rod {
            RodData::Full {
                rod_type,
                x,
                y,
                duability,
            } => {
                assert_eq!(rod_type, RodTypeRef::from("Uranium235"));
                assert_eq!((x, y), (Some(1), Some(1)));
                assert_eq!(duability, Some(0));
            }
            other => panic!("expected full form, got {other:?}"),
        }
    }

    #[test]
    fn rod_data_accepts_initial_durability() {
        let rod: RodData =
            serde_json::from_str(r#"{"type": "Uranium235", "initialDurability": 42}"#).unwrap();
        match rod {
            RodData::Full { duability, .. } => assert_eq!(duability, Some(42)),
            other => panic!("expected full form, got {other:?}"),
        }
    }

    #[test]
    fn cell_defaults() {
        let cell: CellData = serde_json::from_str("{}").unwrap();
        assert_eq!(cell.size, "2x2");
        assert!(cell.x.is_none() && cell.y.is_none());
        assert!(cell.rods.is_empty());
        assert!(cell.fluid.is_none());
    }

    #[test]
    fn cell_accepts_type_alias() {
        let cell: CellData = serde_json::from_str(r#"{"type": "1x1"}"#).unwrap();
        assert_eq!(cell.size, "1x1");
    }

    #[test]
    fn rod_type_data_sentinels() {
        let data: RodTypeData = serde_json::from_str(
            r#"{"id": 1, "fullname": "Lead", "duability": -1,
                "emissionSelf": 0, "emissionOthers": 0, "factor": -1}"#,
        )
        .unwrap();
        let rod_type = data.to_rod_type();
        assert_eq!(rod_type.duability, Durability::Infinite);
        assert_eq!(rod_type.factor, Factor::Infinite);
        assert_eq!(rod_type.color, "#CCCCCC");
    }
}
