use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Builds fresh entities for a pool when it needs to grow.
///
/// Implement this to roll your own instantiation; `EntityTemplate` clones a
/// prototype, and any `Fn(EntityId) -> Entity` works too.
pub trait Template {
    /// Create a new entity with the given ID. The pool attaches it afterwards.
    fn instantiate(&self, id: EntityId) -> Entity;
}

impl<F> Template for F
where
    F: Fn(EntityId) -> Entity,
{
    fn instantiate(&self, id: EntityId) -> Entity {
        self(id)
    }
}

/// Template that clones a prototype entity.
///
/// Components on the prototype (listeners on its `PooledEntity`, a `Suicide`)
/// are copied to every instance. Pool ownership and hierarchy are not.
#[derive(Debug, Clone)]
pub struct EntityTemplate {
    prototype: Entity,
}

impl EntityTemplate {
    pub fn new(prototype: Entity) -> Self {
        Self { prototype }
    }

    /// A bare prototype with only a tag.
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self::new(Entity::new(EntityId(0)).with_tag(tag))
    }

    pub fn prototype(&self) -> &Entity {
        &self.prototype
    }
}

impl Template for EntityTemplate {
    fn instantiate(&self, id: EntityId) -> Entity {
        let mut entity = self.prototype.clone();
        entity.id = id;
        entity.parent = None;
        if let Some(pooled) = entity.pooled.as_mut() {
            pooled.detach();
        }
        entity
    }
}
