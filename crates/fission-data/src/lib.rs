pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, Format, build_reactor, build_registry, load_reactor};
pub use schema::{CellData, ReactorData, RodData, RodTypeData};
