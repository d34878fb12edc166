//! Pool membership component and the entity-side lifecycle transitions.
//!
//! An entity moves `Uninitialized → Free → Active → Free → …`. Leaving the
//! scene (despawn) is the terminal state and may happen from either side.

use std::fmt;
use std::rc::Rc;
use glam::{Quat, Vec3};
use crate::api::types::{EntityId, PoolId};
use crate::components::entity::Entity;
use crate::core::scene::Scene;
use crate::pool::object_pool::ObjectPool;

/// Observer notified when a pooled entity changes state.
pub type Listener = Rc<dyn Fn(EntityId)>;

/// Ordered list of listeners, fired in registration order.
/// A panicking listener stops the ones after it.
#[derive(Clone, Default)]
pub struct Listeners(Vec<Listener>);

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, listener: impl Fn(EntityId) + 'static) {
        self.0.push(Rc::new(listener));
    }

    pub fn fire(&self, id: EntityId) {
        for listener in &self.0 {
            listener(id);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listeners({})", self.0.len())
    }
}

/// Where an entity is in its pool lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolState {
    /// Not attached to any pool yet.
    #[default]
    Uninitialized,
    /// Parked in the owner's free queue.
    Free,
    /// Checked out and live in the world.
    Active,
}

/// Where to put an entity when it is checked out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: Vec3,
    pub rotation: Quat,
    pub parent: EntityId,
}

/// Marks an entity as reusable by an `ObjectPool`.
///
/// Prototypes may carry one with listeners already registered; the pool
/// attaches itself as owner when it adopts or instantiates the entity.
#[derive(Debug, Clone, Default)]
pub struct PooledEntity {
    owner: Option<PoolId>,
    state: PoolState,
    /// Fired after the entity is checked out.
    pub on_activate: Listeners,
    /// Fired after the entity is returned to the free queue.
    pub on_deactivate: Listeners,
}

impl PooledEntity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_on_activate(mut self, listener: impl Fn(EntityId) + 'static) -> Self {
        self.on_activate.push(listener);
        self
    }

    pub fn with_on_deactivate(mut self, listener: impl Fn(EntityId) + 'static) -> Self {
        self.on_deactivate.push(listener);
        self
    }

    /// The pool this entity belongs to, if any.
    pub fn owner(&self) -> Option<PoolId> {
        self.owner
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    /// Does this entity have an owning pool?
    pub fn is_initialized(&self) -> bool {
        self.state != PoolState::Uninitialized
    }

    /// Is this entity currently checked out?
    pub fn is_active(&self) -> bool {
        self.state == PoolState::Active
    }

    pub(crate) fn attach(&mut self, pool: PoolId) {
        self.owner = Some(pool);
        self.state = PoolState::Free;
    }

    pub(crate) fn detach(&mut self) {
        self.owner = None;
        self.state = PoolState::Uninitialized;
    }
}

/// Attach `entity` to `owner`. With `deactivate_on_init` the entity is parked
/// in `storage`, hidden and its countdown disarmed, all without firing
/// `on_deactivate`.
pub(crate) fn initialize(
    entity: &mut Entity,
    owner: PoolId,
    storage: Option<EntityId>,
    deactivate_on_init: bool,
) {
    entity.pooled.get_or_insert_with(PooledEntity::new).attach(owner);

    if deactivate_on_init {
        entity.parent = storage;
        entity.active = false;
        if let Some(suicide) = entity.suicide.as_mut() {
            suicide.cancel();
        }
    }
}

/// Check `id` out of `pool`. With a placement the entity is re-parented
/// through the scene and moved first; without one it goes live where it
/// already is.
///
/// Returns `false` (and touches nothing) if `pool` does not own the entity
/// or the scene refuses the new parent.
pub(crate) fn activate(
    scene: &mut Scene,
    id: EntityId,
    pool: &mut ObjectPool,
    placement: Option<Placement>,
) -> bool {
    let Some(entity) = scene.get(id) else { return false };
    if !owned_by(entity, pool) {
        return false;
    }

    if let Some(p) = placement {
        if !scene.set_parent(id, Some(p.parent)) {
            log::error!("Cannot parent {} under {}", id, p.parent);
            return false;
        }
    }

    let Some(entity) = scene.get_mut(id) else { return false };
    if let Some(p) = placement {
        entity.place(p.pos, p.rotation);
        entity.scale = Vec3::ONE;
    }
    entity.active = true;

    let Some(pooled) = entity.pooled.as_mut() else { return false };
    pooled.state = PoolState::Active;
    pool.move_to_active(id);
    pooled.on_activate.fire(id);

    if let Some(suicide) = entity.suicide.as_mut() {
        suicide.start();
    }
    true
}

/// Send `id` back to `pool`'s storage at the neutral pose.
///
/// Returns `false` (and touches nothing) if `pool` does not own the entity.
pub(crate) fn deactivate(scene: &mut Scene, id: EntityId, pool: &mut ObjectPool) -> bool {
    let Some(entity) = scene.get(id) else { return false };
    if !owned_by(entity, pool) {
        return false;
    }

    // Storage may have been despawned by the host; fall back to the root.
    if !scene.set_parent(id, pool.storage()) {
        scene.set_parent(id, None);
    }

    let Some(entity) = scene.get_mut(id) else { return false };
    entity.reset_pose();
    entity.active = false;

    if let Some(suicide) = entity.suicide.as_mut() {
        suicide.cancel();
    }

    let Some(pooled) = entity.pooled.as_mut() else { return false };
    pooled.state = PoolState::Free;
    pool.return_to_free(id);
    pooled.on_deactivate.fire(id);
    true
}

fn owned_by(entity: &Entity, pool: &ObjectPool) -> bool {
    let owner = entity.pooled.as_ref().and_then(PooledEntity::owner);
    if owner == Some(pool.id()) {
        true
    } else {
        log::error!("{} is not owned by {} (owner: {:?})", entity.id, pool.id(), owner);
        false
    }
}
