//! ObjectId → Entity registry.
//!
//! Scene objects are addressed by their editor id. Next to the entity the
//! registry keeps the transform the object was spawned with, so framing works
//! in the same frame as the spawn (before deferred commands are applied).

use bevy::prelude::*;
use std::collections::HashMap;

use crate::scene::ObjectId;

#[derive(Debug, Clone, Copy)]
pub struct Tracked {
    pub entity: Entity,
    pub transform: Transform,
}

#[derive(Resource, Default)]
pub struct ObjectRegistry {
    by_object: HashMap<ObjectId, Tracked>,
}

impl ObjectRegistry {
    /// Track `entity` for `object`, returning the entity it replaces.
    pub fn insert(
        &mut self,
        object: ObjectId,
        entity: Entity,
        transform: Transform,
    ) -> Option<Entity> {
        let previous = self.remove_by_object(object);
        self.by_object.insert(object, Tracked { entity, transform });
        previous
    }

    pub fn get(&self, object: ObjectId) -> Option<&Tracked> {
        self.by_object.get(&object)
    }

    pub fn remove_by_object(&mut self, object: ObjectId) -> Option<Entity> {
        self.by_object.remove(&object).map(|tracked| tracked.entity)
    }

    pub fn len(&self) -> usize {
        self.by_object.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_object.is_empty()
    }
}
