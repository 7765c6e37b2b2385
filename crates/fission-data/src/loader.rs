//! Resolution pipeline: reads a reactor file, registers its rod types, and
//! builds the reactor.
//!
//! Provides format detection (RON/JSON/TOML), deserialization helpers, and
//! the conversion from [`ReactorData`] into a [`Reactor`].

use crate::schema::{CellData, ReactorData, RodData};
use fission_core::geometry::{CellSize, GeometryError, Position};
use fission_core::reactor::{Reactor, ReactorError, RodPlacement};
use fission_core::registry::{RegistryError, RodTypeRegistry, RodTypeRegistryBuilder};
use fission_core::rod_type::Durability;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Only one of `x` and `y` was given.
    #[error("cell {cell}: x and y must be given together")]
    PartialCellPosition { cell: usize },

    /// Only one of `x` and `y` was given for a rod.
    #[error("cell {cell}, rod {rod}: x and y must be given together")]
    PartialRodPosition { cell: usize, rod: usize },

    /// A rod without coordinates found no free slot left in its cell.
    #[error("cell {cell}, rod {rod}: no free slot for a rod without position")]
    CellFull { cell: usize, rod: usize },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Reactor(#[from] ReactorError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(file: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: file.to_path_buf(),
        detail: detail.to_string(),
    }
}

fn parse_with_origin(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<ReactorData, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(origin, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(origin, e)),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(origin, e)),
    }
}

/// Parse reactor data held in memory.
pub fn parse_reactor_data(content: &str, format: Format) -> Result<ReactorData, DataLoadError> {
    parse_with_origin(content, format, Path::new("<inline>"))
}

/// Read a file and parse it according to its extension.
pub fn read_reactor_data(path: &Path) -> Result<ReactorData, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_with_origin(&content, format, path)
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Register the file's rod types on top of `builder` and freeze the registry.
pub fn build_registry(
    data: &ReactorData,
    mut builder: RodTypeRegistryBuilder,
) -> Result<RodTypeRegistry, DataLoadError> {
    for rod_type in &data.rod_types {
        builder.register(rod_type.to_rod_type());
    }
    Ok(builder.build()?)
}

fn pair(x: Option<i32>, y: Option<i32>) -> Result<Option<Position>, ()> {
    match (x, y) {
        (Some(x), Some(y)) => Ok(Some(Position::new(x, y))),
        (None, None) => Ok(None),
        _ => Err(()),
    }
}

fn placement(cell: usize, index: usize, rod: &RodData) -> Result<RodPlacement, DataLoadError> {
    let mut placement = RodPlacement::new(rod.rod_type().clone());
    if let RodData::Full { x, y, duability, .. } = rod {
        placement.position = pair(*x, *y)
            .map_err(|()| DataLoadError::PartialRodPosition { cell, rod: index })?;
        placement.durability = duability.map(Durability::from_raw);
    }
    Ok(placement)
}

fn add_cell(reactor: &mut Reactor, index: usize, cell: &CellData) -> Result<(), DataLoadError> {
    let size: CellSize = cell.size.parse()?;
    let position = match pair(cell.x, cell.y)
        .map_err(|()| DataLoadError::PartialCellPosition { cell: index })?
    {
        Some(position) => position,
        None => reactor.next_cell_position()?,
    };
    let id = reactor.add_cell(position, size, cell.fluid.clone())?;
    for (rod_index, rod) in cell.rods.iter().enumerate() {
        let placement = placement(index, rod_index, rod)?;
        let has_free_slot = size
            .local_positions()
            .any(|slot| reactor.rod_at(id, slot).is_none());
        if placement.position.is_none() && !has_free_slot {
            return Err(DataLoadError::CellFull {
                cell: index,
                rod: rod_index,
            });
        }
        reactor.add_rod(id, placement)?;
    }
    Ok(())
}

/// Build a reactor from parsed data. Cells are added in file order; rod types
/// must already be present in `registry`.
pub fn build_reactor(
    data: &ReactorData,
    registry: Arc<RodTypeRegistry>,
) -> Result<Reactor, DataLoadError> {
    let mut reactor = Reactor::new(registry);
    for (index, cell) in data.cells.iter().enumerate() {
        add_cell(&mut reactor, index, cell)?;
    }
    Ok(reactor)
}

/// Load a reactor file: built-in rod types, then the file's own rod types,
/// then its cells.
pub fn load_reactor(path: &Path) -> Result<Reactor, DataLoadError> {
    let data = read_reactor_data(path)?;
    let registry = build_registry(&data, RodTypeRegistryBuilder::with_defaults())?;
    build_reactor(&data, Arc::new(registry))
}

// ===========================================================================
// Tests
// ===========================================================================
