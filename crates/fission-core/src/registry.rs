use crate::id::RodTypeId;
use crate::rod_type::{RodType, default_rod_types};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A reference to a rod type, by in-game id or by fullname.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RodTypeRef {
    Id(u32),
    Name(String),
}

impl From<RodTypeId> for RodTypeRef {
    fn from(id: RodTypeId) -> Self {
        RodTypeRef::Id(id.0)
    }
}

impl From<&str> for RodTypeRef {
    fn from(name: &str) -> Self {
        RodTypeRef::Name(name.to_string())
    }
}

impl std::fmt::Display for RodTypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RodTypeRef::Id(id) => write!(f, "id \"{id}\""),
            RodTypeRef::Name(name) => write!(f, "fullname \"{name}\""),
        }
    }
}

/// Builder for constructing an immutable rod type registry.
/// Types are registered or updated first, then frozen with [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RodTypeRegistryBuilder {
    types: Vec<RodType>,
}

impl RodTypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder seeded with the built-in rod types.
    pub fn with_defaults() -> Self {
        Self {
            types: default_rod_types(),
        }
    }

    fn position(&self, id: RodTypeId, fullname: &str) -> Option<usize> {
        self.types
            .iter()
            .position(|t| t.id == id)
            .or_else(|| self.types.iter().position(|t| t.fullname == fullname))
    }

    /// Register a rod type. If a type with the same id (or, failing that, the
    /// same fullname) exists it is replaced in place.
    pub fn register(&mut self, info: RodType) -> RodTypeId {
        let id = info.id;
        match self.position(info.id, &info.fullname) {
            Some(idx) => self.types[idx] = info,
            None => self.types.push(info),
        }
        id
    }

    /// Mutate an existing rod type by fullname.
    pub fn mutate<F>(&mut self, fullname: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut RodType),
    {
        let rod_type = self
            .types
            .iter_mut()
            .find(|t| t.fullname == fullname)
            .ok_or_else(|| RegistryError::NotFound(RodTypeRef::from(fullname).to_string()))?;
        f(rod_type);
        Ok(())
    }

    pub fn get(&self, reference: &RodTypeRef) -> Option<&RodType> {
        match reference {
            RodTypeRef::Id(id) => self.types.iter().find(|t| t.id.0 == *id),
            RodTypeRef::Name(name) => self.types.iter().find(|t| &t.fullname == name),
        }
    }

    /// Finalize. Ids and fullnames must be unique.
    pub fn build(self) -> Result<RodTypeRegistry, RegistryError> {
        let mut by_id = HashMap::with_capacity(self.types.len());
        let mut by_name = HashMap::with_capacity(self.types.len());
        for (idx, rod_type) in self.types.iter().enumerate() {
            if by_id.insert(rod_type.id, idx).is_some() {
                return Err(RegistryError::DuplicateId(rod_type.id));
            }
            if by_name.insert(rod_type.fullname.clone(), idx).is_some() {
                return Err(RegistryError::DuplicateName(rod_type.fullname.clone()));
            }
        }
        Ok(RodTypeRegistry {
            types: self.types,
            by_id,
            by_name,
        })
    }
}

/// Immutable rod type registry. Frozen after build(). Thread-safe to share.
#[derive(Debug)]
pub struct RodTypeRegistry {
    types: Vec<RodType>,
    by_id: HashMap<RodTypeId, usize>,
    by_name: HashMap<String, usize>,
}

impl RodTypeRegistry {
    /// Registry holding only the built-in types.
    pub fn with_defaults() -> Self {
        let types = default_rod_types();
        let by_id = types.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
        let by_name = types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.fullname.clone(), i))
            .collect();
        Self {
            types,
            by_id,
            by_name,
        }
    }

    pub fn get(&self, id: RodTypeId) -> Option<&RodType> {
        self.by_id.get(&id).map(|&idx| &self.types[idx])
    }

    pub fn get_by_name(&self, fullname: &str) -> Option<&RodType> {
        self.by_name.get(fullname).map(|&idx| &self.types[idx])
    }

    /// Resolve a reference, failing with [`RegistryError::NotFound`].
    pub fn lookup(&self, reference: &RodTypeRef) -> Result<&RodType, RegistryError> {
        let found = match reference {
            RodTypeRef::Id(id) => self.get(RodTypeId(*id)),
            RodTypeRef::Name(name) => self.get_by_name(name),
        };
        found.ok_or_else(|| RegistryError::NotFound(reference.to_string()))
    }

    pub fn types(&self) -> &[RodType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for RodTypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown rod type with {0}")]
    NotFound(String),
    #[error("duplicate rod type id {0}")]
    DuplicateId(RodTypeId),
    #[error("duplicate rod type fullname \"{0}\"")]
    DuplicateName(String),
}
