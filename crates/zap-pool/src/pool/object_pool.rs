// pool/object_pool.rs
//
// A pool of interchangeable entities. Free entities wait in a FIFO queue
// parked under the pool's storage entity; checked-out entities are tracked in
// the active list. Every owned entity is in exactly one of the two.
//
// Usage:
//   let mut pool = ObjectPool::new(PoolId(1), PoolConfig::new().with_size(8), template);
//   pool.initialize(&mut scene, &mut registry, None)?;
//   let id = pool.activate(&mut scene, pos, rot, Some(parent));
//   pool.deactivate(&mut scene, id)?;

use std::collections::VecDeque;
use std::fmt;
use glam::{Quat, Vec3};
use crate::api::types::{EntityId, PoolId};
use crate::components::entity::Entity;
use crate::components::pooled::{self, Placement, PooledEntity};
use crate::core::scene::Scene;
use crate::pool::config::PoolConfig;
use crate::pool::error::PoolError;
use crate::pool::registry::{normalize, PoolRegistry};
use crate::pool::template::Template;

pub struct ObjectPool {
    id: PoolId,
    config: PoolConfig,
    template: Box<dyn Template>,
    /// Parent of every free entity. Created on initialization if unset.
    storage: Option<EntityId>,
    /// Free entities, oldest return first.
    free: VecDeque<EntityId>,
    active: Vec<EntityId>,
    initialized: bool,
    /// Whether this pool currently holds its accessor in a registry.
    registered: bool,
}

impl ObjectPool {
    pub fn new(id: PoolId, config: PoolConfig, template: impl Template + 'static) -> Self {
        Self {
            id,
            config,
            template: Box::new(template),
            storage: None,
            free: VecDeque::new(),
            active: Vec::new(),
            initialized: false,
            registered: false,
        }
    }

    /// Use an existing entity as storage instead of creating one on initialization.
    pub fn with_storage(mut self, storage: EntityId) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set up the pool: create storage, pre-fill `pool_size` entities and, for
    /// global pools, register under the accessor.
    ///
    /// A non-blank `accessor` overrides the configured one and makes the pool
    /// global. On error nothing is created or registered.
    pub fn initialize(
        &mut self,
        scene: &mut Scene,
        registry: &mut PoolRegistry,
        accessor: Option<&str>,
    ) -> Result<(), PoolError> {
        if self.initialized {
            log::warn!("{} is already initialized", self.id);
            return Err(PoolError::AlreadyInitialized);
        }

        // Validate against the effective name first; commit only once it passes.
        let override_name = accessor.filter(|a| !a.trim().is_empty());
        let global = self.config.global || override_name.is_some();
        let name = override_name.or_else(|| self.accessor());

        if global {
            let Some(name) = name else {
                log::warn!("Global pool accessor cannot be empty ({})", self.id);
                return Err(PoolError::MissingAccessor);
            };
            if registry.contains(name) {
                log::warn!("Global pool accessor `{}` already exists", normalize(name));
                return Err(PoolError::DuplicateAccessor(normalize(name)));
            }
        }

        if let Some(name) = override_name {
            self.config.accessor = Some(name.to_string());
            self.config.global = true;
        }

        if !self.storage.is_some_and(|s| scene.contains(s)) {
            let id = scene.alloc_id();
            scene.spawn(Entity::new(id).with_tag(self.config.storage_tag.clone()));
            self.storage = Some(id);
        }

        self.add_to_pool(scene, self.config.pool_size);
        self.initialized = true;
        self.register(registry)?;

        log::info!(
            "{} initialized with {} entities{}",
            self.id,
            self.free.len(),
            self.accessor().map(|a| format!(" as `{}`", normalize(a))).unwrap_or_default()
        );
        Ok(())
    }

    /// Re-register a global pool after `disable`.
    pub fn enable(&mut self, registry: &mut PoolRegistry) -> Result<(), PoolError> {
        if !self.initialized {
            return Err(PoolError::NotInitialized);
        }
        self.register(registry)
    }

    /// Return every active entity to the pool and drop the registry entry.
    /// The pool keeps its entities and can be enabled again.
    pub fn disable(&mut self, scene: &mut Scene, registry: &mut PoolRegistry) {
        self.deactivate_all(scene);
        if self.registered {
            if let Some(name) = self.config.accessor.as_deref() {
                if registry.get(name) == Some(self.id) {
                    registry.unregister(name);
                }
            }
            self.registered = false;
        }
        log::debug!("{} disabled", self.id);
    }

    fn register(&mut self, registry: &mut PoolRegistry) -> Result<(), PoolError> {
        if !self.config.global || self.registered {
            return Ok(());
        }
        let Some(name) = self.accessor() else {
            log::warn!("Global pool accessor cannot be empty ({})", self.id);
            return Err(PoolError::MissingAccessor);
        };
        let name = name.to_string();
        registry.register(&name, self.id)?;
        self.registered = true;
        Ok(())
    }

    /// Check out an entity at `pos`/`rotation` under `parent`.
    ///
    /// Takes the free entity that was returned longest ago, or creates one if
    /// none are free. Returns `None` (with the sets unchanged) if `parent` is
    /// missing, the pool is uninitialized, or `max_size` is reached.
    pub fn activate(
        &mut self,
        scene: &mut Scene,
        pos: Vec3,
        rotation: Quat,
        parent: Option<EntityId>,
    ) -> Option<EntityId> {
        if !self.initialized {
            log::warn!("{} must be initialized before activating entities", self.id);
            return None;
        }
        let Some(parent) = parent else {
            log::error!("Pooled entity must have a parent!");
            return None;
        };
        if !scene.contains(parent) {
            log::error!("Parent {} of pooled entity is not in the scene", parent);
            return None;
        }
        if self.free.contains(&parent) {
            log::error!("Parent {} is a free entity of {}", parent, self.id);
            return None;
        }

        let id = self.next_free(scene)?;
        pooled::activate(scene, id, self, Some(Placement { pos, rotation, parent })).then_some(id)
    }

    /// Check out a specific free entity where it currently is.
    pub fn activate_in_place(&mut self, scene: &mut Scene, id: EntityId) -> Result<(), PoolError> {
        if !self.initialized {
            return Err(PoolError::NotInitialized);
        }
        if !scene.contains(id) {
            return Err(PoolError::UnknownEntity(id));
        }
        if pooled::activate(scene, id, self, None) {
            Ok(())
        } else {
            Err(PoolError::NotOwned { entity: id, pool: self.id })
        }
    }

    /// The entity the next `activate` will hand out, without checking it out.
    /// Grows the pool by one if nothing is free.
    pub fn next_free(&mut self, scene: &mut Scene) -> Option<EntityId> {
        while let Some(&head) = self.free.front() {
            if scene.contains(head) {
                return Some(head);
            }
            log::debug!("{} dropping {} (despawned while free)", self.id, head);
            self.free.pop_front();
        }
        self.add_single(scene)
    }

    /// Return an owned entity to the pool.
    pub fn deactivate(&mut self, scene: &mut Scene, id: EntityId) -> Result<(), PoolError> {
        if !scene.contains(id) {
            return Err(PoolError::UnknownEntity(id));
        }
        if pooled::deactivate(scene, id, self) {
            Ok(())
        } else {
            Err(PoolError::NotOwned { entity: id, pool: self.id })
        }
    }

    /// Return every active entity to the pool.
    pub fn deactivate_all(&mut self, scene: &mut Scene) {
        let active = self.active.clone();
        for id in active {
            if self.deactivate(scene, id).is_err() {
                self.forget(id);
            }
        }
    }

    /// Create `amount` new free entities. Stops early at `max_size`.
    pub fn add_to_pool(&mut self, scene: &mut Scene, amount: usize) {
        for _ in 0..amount {
            if self.add_single(scene).is_none() {
                break;
            }
        }
    }

    /// Instantiate one entity from the template and queue it as free.
    pub fn add_single(&mut self, scene: &mut Scene) -> Option<EntityId> {
        if let Some(max) = self.config.max_size {
            if self.len() >= max {
                log::warn!("{} cannot grow past {} entities", self.id, max);
                return None;
            }
        }

        let id = scene.alloc_id();
        let mut entity = self.template.instantiate(id);
        entity.id = id;
        pooled::initialize(&mut entity, self.id, self.storage, true);
        scene.spawn(entity);
        self.free.push_back(id);
        Some(id)
    }

    /// Adopt an entity created outside the pool and queue it as free.
    ///
    /// With `deactivate` it is parked in storage and hidden first. Entities
    /// that already belong to a pool are rejected; `release` them first.
    pub fn add_orphan(&mut self, scene: &mut Scene, id: EntityId, deactivate: bool) -> Result<(), PoolError> {
        if !self.initialized {
            log::warn!("{} must be initialized before adopting {}", self.id, id);
            return Err(PoolError::NotInitialized);
        }
        if let Some(max) = self.config.max_size {
            if self.len() >= max {
                log::warn!("{} cannot adopt {}: at its maximum of {}", self.id, id, max);
                return Err(PoolError::CapacityReached(max));
            }
        }
        let Some(entity) = scene.get_mut(id) else {
            log::warn!("{} cannot adopt {}: not in the scene", self.id, id);
            return Err(PoolError::UnknownEntity(id));
        };
        if let Some(owner) = entity.pooled.as_ref().and_then(PooledEntity::owner) {
            log::warn!("{} cannot adopt {}: already owned by {}", self.id, id, owner);
            return Err(PoolError::AlreadyOwned { entity: id, owner });
        }

        pooled::initialize(entity, self.id, self.storage, deactivate);
        self.free.push_back(id);
        Ok(())
    }

    /// Detach an owned entity from the pool, leaving it in the scene as is.
    pub fn release(&mut self, scene: &mut Scene, id: EntityId) -> Result<(), PoolError> {
        if !self.owns(id) {
            return Err(PoolError::NotOwned { entity: id, pool: self.id });
        }
        self.forget(id);
        if let Some(pooled) = scene.get_mut(id).and_then(|e| e.pooled.as_mut()) {
            pooled.detach();
        }
        Ok(())
    }

    /// Drop all bookkeeping for an entity, e.g. before despawning it.
    pub fn forget(&mut self, id: EntityId) {
        self.free.retain(|&e| e != id);
        self.active.retain(|&e| e != id);
    }

    /// Called from the activation transition. Moving an entity that is not
    /// free only makes sure it is listed once as active.
    pub(crate) fn move_to_active(&mut self, id: EntityId) {
        if let Some(idx) = self.free.iter().position(|&e| e == id) {
            self.free.remove(idx);
        }
        if !self.active.contains(&id) {
            self.active.push(id);
        }
    }

    /// Called from the deactivation transition. Returning an entity that is
    /// not active only makes sure it is queued once as free.
    pub(crate) fn return_to_free(&mut self, id: EntityId) {
        if let Some(idx) = self.active.iter().position(|&e| e == id) {
            self.active.remove(idx);
        }
        if !self.free.contains(&id) {
            self.free.push_back(id);
        }
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The registry name, if set and not blank.
    pub fn accessor(&self) -> Option<&str> {
        self.config.accessor.as_deref().filter(|a| !a.trim().is_empty())
    }

    pub fn storage(&self) -> Option<EntityId> {
        self.storage
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Free entities, next to be handed out first.
    pub fn free(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.free.iter().copied()
    }

    pub fn active(&self) -> &[EntityId] {
        &self.active
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Total entities owned (free + active).
    pub fn len(&self) -> usize {
        self.free.len() + self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn owns(&self, id: EntityId) -> bool {
        self.free.contains(&id) || self.active.contains(&id)
    }
}

impl fmt::Debug for ObjectPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("id", &self.id)
            .field("accessor", &self.config.accessor)
            .field("storage", &self.storage)
            .field("free", &self.free)
            .field("active", &self.active)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
