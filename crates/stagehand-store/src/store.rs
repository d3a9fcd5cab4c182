use std::collections::BTreeMap;

use crate::entity::{Entity, SavedEntity};
use crate::error::StoreError;

/// Persistence seam between the population engine and a target site.
pub trait EntityStore {
    /// Persists an entity, assigning its id on first save and a fresh
    /// revision id on every save. The passed entity is updated in place.
    fn save(&mut self, entity: &mut Entity) -> Result<SavedEntity, StoreError>;

    fn load(&self, entity_type: &str, id: i64) -> Option<&Entity>;

    /// Ids of all stored entities of one bundle, ascending.
    fn ids_of_bundle(&self, entity_type: &str, bundle: &str) -> Vec<i64>;

    /// Removes the listed entities. Ids that are not present are ignored.
    /// Returns the number actually removed.
    fn delete(&mut self, entity_type: &str, ids: &[i64]) -> Result<u64, StoreError>;

    fn count(&self, entity_type: &str) -> u64;

    /// Every stored entity, ordered by entity type then id.
    fn all(&self) -> Vec<Entity>;
}

/// In-memory store with per-type id sequences and one global revision
/// sequence, both starting at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: BTreeMap<String, BTreeMap<i64, Entity>>,
    next_ids: BTreeMap<String, i64>,
    next_revision_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_ids: BTreeMap::new(),
            next_revision_id: 1,
        }
    }
}

impl EntityStore for MemoryStore {
    fn save(&mut self, entity: &mut Entity) -> Result<SavedEntity, StoreError> {
        if entity.entity_type.trim().is_empty() {
            return Err(StoreError::InvalidEntity(
                "entity has no entity type".to_string(),
            ));
        }
        if entity.bundle.trim().is_empty() {
            return Err(StoreError::InvalidEntity(format!(
                "{} entity has no bundle",
                entity.entity_type
            )));
        }

        let next_id = self
            .next_ids
            .entry(entity.entity_type.clone())
            .or_insert(1);
        let id = match entity.id {
            Some(id) => {
                // Preset ids move the sequence past themselves.
                if id >= *next_id {
                    *next_id = id + 1;
                }
                id
            }
            None => {
                let id = *next_id;
                *next_id += 1;
                id
            }
        };

        let revision_id = self.next_revision_id;
        self.next_revision_id += 1;

        entity.id = Some(id);
        entity.revision_id = Some(revision_id);
        self.entities
            .entry(entity.entity_type.clone())
            .or_default()
            .insert(id, entity.clone());

        Ok(SavedEntity { id, revision_id })
    }

    fn load(&self, entity_type: &str, id: i64) -> Option<&Entity> {
        self.entities.get(entity_type)?.get(&id)
    }

    fn ids_of_bundle(&self, entity_type: &str, bundle: &str) -> Vec<i64> {
        match self.entities.get(entity_type) {
            Some(by_id) => by_id
                .iter()
                .filter(|(_, entity)| entity.bundle == bundle)
                .map(|(id, _)| *id)
                .collect(),
            None => Vec::new(),
        }
    }

    fn delete(&mut self, entity_type: &str, ids: &[i64]) -> Result<u64, StoreError> {
        let Some(by_id) = self.entities.get_mut(entity_type) else {
            return Ok(0);
        };
        let mut removed = 0;
        for id in ids {
            if by_id.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn count(&self, entity_type: &str) -> u64 {
        self.entities
            .get(entity_type)
            .map(|by_id| by_id.len() as u64)
            .unwrap_or(0)
    }

    fn all(&self) -> Vec<Entity> {
        self.entities
            .values()
            .flat_map(|by_id| by_id.values().cloned())
            .collect()
    }
}
