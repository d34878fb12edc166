use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Simple entity storage using a flat Vec.
/// Designed for small-to-medium entity counts (hundreds, not millions).
///
/// Also hands out entity IDs, so pools can create entities without a
/// separate allocator.
pub struct Scene {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(256),
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    ///
    /// Once the counter reaches `u32::MAX` this falls back to the lowest ID
    /// not in the scene, which stays free until something is spawned with it.
    pub fn alloc_id(&mut self) -> EntityId {
        if let Some(next) = self.next_id.checked_add(1) {
            let id = EntityId(self.next_id);
            self.next_id = next;
            return id;
        }
        let id = (1..u32::MAX)
            .map(EntityId)
            .find(|&id| !self.contains(id))
            .unwrap_or(EntityId(u32::MAX));
        log::debug!("Entity ID counter exhausted, reusing {}", id);
        id
    }

    /// Add an entity to the scene.
    pub fn spawn(&mut self, entity: Entity) {
        // Keep alloc_id ahead of hand-picked IDs.
        self.next_id = self.next_id.max(entity.id.0.saturating_add(1));
        self.entities.push(entity);
    }

    /// Remove an entity by ID. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        if let Some(idx) = self.entities.iter().position(|e| e.id == id) {
            Some(self.entities.swap_remove(idx))
        } else {
            None
        }
    }

    /// Whether an entity with this ID is in the scene.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    /// Get a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Re-parent an entity. Pass `None` to move it to the scene root.
    /// Returns false if either entity is missing or the move would make the
    /// child its own ancestor.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> bool {
        if let Some(p) = parent {
            if !self.contains(p) || self.is_ancestor(child, p) {
                return false;
            }
        }
        match self.get_mut(child) {
            Some(entity) => {
                entity.parent = parent;
                true
            }
            None => false,
        }
    }

    /// Whether `ancestor` is `id` or one of its parents.
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            // Bail out on hierarchies corrupted outside set_parent.
            steps += 1;
            if steps > self.entities.len() {
                return false;
            }
            current = self.get(c).and_then(|e| e.parent);
        }
        false
    }

    /// IDs of the direct children of `parent`.
    pub fn children_of(&self, parent: EntityId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.parent == Some(parent))
            .map(|e| e.id)
            .collect()
    }

    /// Iterate over all entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterate over all entities mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Find the first entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    /// Number of entities in the scene.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Clear all entities.
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
