use glam::{Quat, Vec3};
use crate::api::types::EntityId;
use crate::components::pooled::PooledEntity;
use crate::components::suicide::Suicide;

/// Fat Entity: a single struct with optional components.
/// Pool-managed entities carry a `PooledEntity`; disposable ones a `Suicide`.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// String tag for finding entities by name.
    pub tag: String,
    /// Whether this entity is live in the world (inactive entities are skipped by the host).
    pub active: bool,
    /// Position in world space.
    pub pos: Vec3,
    /// Orientation in world space.
    pub rotation: Quat,
    /// Local scale.
    pub scale: Vec3,
    /// Parent in the scene hierarchy (`None` = scene root).
    pub parent: Option<EntityId>,
    /// Pool membership (only pool-managed entities have one).
    pub pooled: Option<PooledEntity>,
    /// Delayed self-destruct (optional).
    pub suicide: Option<Suicide>,
}

impl Entity {
    /// Create a new entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            pos: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent: None,
            pooled: None,
            suicide: None,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec3) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_pooled(mut self, pooled: PooledEntity) -> Self {
        self.pooled = Some(pooled);
        self
    }

    pub fn with_suicide(mut self, suicide: Suicide) -> Self {
        self.suicide = Some(suicide);
        self
    }

    /// Move to a world position and orientation.
    pub fn place(&mut self, pos: Vec3, rotation: Quat) {
        self.pos = pos;
        self.rotation = rotation;
    }

    /// Snap back to the neutral pose (origin, identity rotation).
    pub fn reset_pose(&mut self) {
        self.place(Vec3::ZERO, Quat::IDENTITY);
    }

    /// Whether this entity belongs to a pool.
    pub fn is_pooled(&self) -> bool {
        self.pooled.as_ref().is_some_and(|p| p.owner().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::PoolId;

    #[test]
    fn new_entity_is_at_neutral_pose() {
        let e = Entity::new(EntityId(7));
        assert_eq!(e.pos, Vec3::ZERO);
        assert_eq!(e.rotation, Quat::IDENTITY);
        assert_eq!(e.scale, Vec3::ONE);
        assert!(e.active);
        assert!(!e.is_pooled());
    }

    #[test]
    fn reset_pose_clears_transform() {
        let mut e = Entity::new(EntityId(1))
            .with_pos(Vec3::new(3.0, 4.0, 5.0))
            .with_rotation(Quat::from_rotation_y(1.0));
        e.reset_pose();
        assert_eq!(e.pos, Vec3::ZERO);
        assert_eq!(e.rotation, Quat::IDENTITY);
    }

    #[test]
    fn unowned_pooled_component_is_not_pooled() {
        let e = Entity::new(EntityId(1)).with_pooled(PooledEntity::new());
        assert!(!e.is_pooled());

        let mut owned = PooledEntity::new();
        owned.attach(PoolId(3));
        let e = Entity::new(EntityId(2)).with_pooled(owned);
        assert!(e.is_pooled());
    }
}
