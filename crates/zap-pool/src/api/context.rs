use std::collections::BTreeMap;
use glam::{Quat, Vec3};
use crate::api::types::{EntityId, PoolId};
use crate::components::entity::Entity;
use crate::core::scene::Scene;
use crate::pool::config::PoolConfig;
use crate::pool::error::PoolError;
use crate::pool::object_pool::ObjectPool;
use crate::pool::registry::PoolRegistry;
use crate::pool::template::Template;
use crate::systems::suicide::tick_suicides;

/// Mutable access to the scene, the pools and the pool registry.
///
/// Built once when the host starts and passed to whatever needs pools;
/// there is no global state. Entities refer to their pool by `PoolId`,
/// which resolves through this context.
pub struct PoolContext {
    pub scene: Scene,
    pub registry: PoolRegistry,
    pools: BTreeMap<PoolId, ObjectPool>,
    next_pool: u32,
}

impl PoolContext {
    pub fn new() -> Self {
        Self::with_scene(Scene::new())
    }

    /// Create a context around an existing scene.
    pub fn with_scene(scene: Scene) -> Self {
        Self {
            scene,
            registry: PoolRegistry::new(),
            pools: BTreeMap::new(),
            next_pool: 1,
        }
    }

    /// Add an uninitialized pool. Call `initialize_pool` (or `start` for
    /// self-initializing pools) before using it.
    pub fn create_pool(&mut self, config: PoolConfig, template: impl Template + 'static) -> PoolId {
        let id = PoolId(self.next_pool);
        self.next_pool += 1;
        self.pools.insert(id, ObjectPool::new(id, config, template));
        id
    }

    pub fn pool(&self, id: PoolId) -> Option<&ObjectPool> {
        self.pools.get(&id)
    }

    pub fn pool_mut(&mut self, id: PoolId) -> Option<&mut ObjectPool> {
        self.pools.get_mut(&id)
    }

    /// Iterate over all pools in creation order.
    pub fn pools(&self) -> impl Iterator<Item = &ObjectPool> {
        self.pools.values()
    }

    /// Look up a global pool by name. Logs an error if there is none.
    pub fn get_pool(&self, name: &str) -> Option<&ObjectPool> {
        self.registry.lookup(name).and_then(|id| self.pools.get(&id))
    }

    pub fn initialize_pool(&mut self, id: PoolId, accessor: Option<&str>) -> Result<(), PoolError> {
        let pool = self.pools.get_mut(&id).ok_or(PoolError::UnknownPool(id))?;
        pool.initialize(&mut self.scene, &mut self.registry, accessor)
    }

    /// Initialize every pool that is neither initialized nor self-initializing.
    /// With `global_only`, local pools are skipped too. Failures are logged.
    pub fn initialize_pools(&mut self, global_only: bool) {
        for pool in self.pools.values_mut() {
            if global_only && !pool.config().global {
                continue;
            }
            if pool.is_initialized() || pool.config().self_initialize {
                continue;
            }
            if pool.initialize(&mut self.scene, &mut self.registry, None).is_err() {
                log::warn!("Object pool {} failed to initialize!", pool.id());
            }
        }
    }

    /// Initialize self-initializing pools and arm start-triggered suicides.
    /// Call once after the initial scene is set up.
    pub fn start(&mut self) {
        for pool in self.pools.values_mut() {
            if pool.config().self_initialize && !pool.is_initialized() {
                if pool.initialize(&mut self.scene, &mut self.registry, None).is_err() {
                    log::warn!("Object pool {} failed to initialize!", pool.id());
                }
            }
        }
        for entity in self.scene.iter_mut() {
            if entity.is_pooled() {
                continue;
            }
            if let Some(suicide) = entity.suicide.as_mut() {
                suicide.start();
            }
        }
    }

    /// Spawn a plain (not pooled) entity, arming its suicide if it has one.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        if let Some(suicide) = entity.suicide.as_mut() {
            suicide.start();
        }
        let id = entity.id;
        self.scene.spawn(entity);
        id
    }

    /// Check out an entity from a pool.
    pub fn activate(&mut self, pool: PoolId, pos: Vec3, rotation: Quat, parent: Option<EntityId>) -> Option<EntityId> {
        let Some(p) = self.pools.get_mut(&pool) else {
            log::error!("No pool with id {}", pool);
            return None;
        };
        p.activate(&mut self.scene, pos, rotation, parent)
    }

    /// Return a pooled entity to whichever pool owns it.
    pub fn deactivate(&mut self, entity: EntityId) -> Result<(), PoolError> {
        if !self.scene.contains(entity) {
            return Err(PoolError::UnknownEntity(entity));
        }
        let Some(owner) = self.owner_of(entity) else {
            log::error!("{} is not a pooled entity", entity);
            return Err(PoolError::NotPooled(entity));
        };
        let pool = self.pools.get_mut(&owner).ok_or(PoolError::UnknownPool(owner))?;
        pool.deactivate(&mut self.scene, entity)
    }

    /// Hand an externally spawned entity to a pool.
    pub fn add_orphan(&mut self, pool: PoolId, entity: EntityId, deactivate: bool) -> Result<(), PoolError> {
        let p = self.pools.get_mut(&pool).ok_or(PoolError::UnknownPool(pool))?;
        p.add_orphan(&mut self.scene, entity, deactivate)
    }

    /// Detach a pooled entity from its owner so another pool may adopt it.
    pub fn release(&mut self, entity: EntityId) -> Result<(), PoolError> {
        let owner = self.owner_of(entity).ok_or(PoolError::NotPooled(entity))?;
        let pool = self.pools.get_mut(&owner).ok_or(PoolError::UnknownPool(owner))?;
        pool.release(&mut self.scene, entity)
    }

    /// Despawn an entity outright, pooled or not. Its pool stops tracking it.
    pub fn destroy(&mut self, entity: EntityId) -> Option<Entity> {
        if let Some(owner) = self.owner_of(entity) {
            if let Some(pool) = self.pools.get_mut(&owner) {
                pool.forget(entity);
            }
        }
        self.scene.despawn(entity)
    }

    /// Deactivate everything in a pool and drop its registry entry.
    pub fn disable_pool(&mut self, id: PoolId) -> Result<(), PoolError> {
        let pool = self.pools.get_mut(&id).ok_or(PoolError::UnknownPool(id))?;
        pool.disable(&mut self.scene, &mut self.registry);
        Ok(())
    }

    /// Re-register a disabled global pool.
    pub fn enable_pool(&mut self, id: PoolId) -> Result<(), PoolError> {
        let pool = self.pools.get_mut(&id).ok_or(PoolError::UnknownPool(id))?;
        pool.enable(&mut self.registry)
    }

    /// Tear a pool down: disable it, then despawn its entities and storage.
    pub fn destroy_pool(&mut self, id: PoolId) -> Result<(), PoolError> {
        let mut pool = self.pools.remove(&id).ok_or(PoolError::UnknownPool(id))?;
        pool.disable(&mut self.scene, &mut self.registry);

        let owned: Vec<EntityId> = pool.free().chain(pool.active().iter().copied()).collect();
        for entity in owned {
            self.scene.despawn(entity);
        }
        if let Some(storage) = pool.storage() {
            self.scene.despawn(storage);
        }
        log::info!("{} destroyed", id);
        Ok(())
    }

    /// Advance per-frame timers (delayed self-destructs).
    pub fn tick(&mut self, dt: f32) {
        tick_suicides(self, dt);
    }

    /// Destroy every pool and clear the registry.
    pub fn shutdown(&mut self) {
        let ids: Vec<PoolId> = self.pools.keys().copied().collect();
        for id in ids {
            let _ = self.destroy_pool(id);
        }
        self.registry.clear();
    }

    fn owner_of(&self, entity: EntityId) -> Option<PoolId> {
        self.scene.get(entity)?.pooled.as_ref()?.owner()
    }
}

impl Default for PoolContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::suicide::Suicide;
    use crate::pool::template::EntityTemplate;

    fn world(ctx: &mut PoolContext) -> EntityId {
        let id = ctx.scene.alloc_id();
        ctx.spawn(Entity::new(id).with_tag("world"))
    }

    #[test]
    fn global_pool_reachable_by_name() {
        let mut ctx = PoolContext::new();
        let id = ctx.create_pool(PoolConfig::new().with_size(3).global("Bullets"), EntityTemplate::tagged("bullet"));
        ctx.initialize_pool(id, None).unwrap();

        let pool = ctx.get_pool(" BULLETS ").unwrap();
        assert_eq!(pool.id(), id);
        assert_eq!(pool.free_len(), 3);
        assert!(ctx.get_pool("missing").is_none());
    }

    #[test]
    fn second_pool_with_same_name_is_rejected() {
        let mut ctx = PoolContext::new();
        let first = ctx.create_pool(PoolConfig::new().global("fx"), EntityTemplate::tagged("a"));
        let second = ctx.create_pool(PoolConfig::new().global(" FX"), EntityTemplate::tagged("b"));

        ctx.initialize_pool(first, None).unwrap();
        assert_eq!(
            ctx.initialize_pool(second, None),
            Err(PoolError::DuplicateAccessor("fx".to_string()))
        );
        assert_eq!(ctx.get_pool("fx").unwrap().id(), first);
        assert!(!ctx.pool(second).unwrap().is_initialized());
    }

    #[test]
    fn initialize_pools_skips_local_and_self_initializing() {
        let mut ctx = PoolContext::new();
        let global = ctx.create_pool(PoolConfig::new().global("g"), EntityTemplate::tagged("g"));
        let local = ctx.create_pool(PoolConfig::new(), EntityTemplate::tagged("l"));
        let auto = ctx.create_pool(PoolConfig::new().global("auto").self_initializing(), EntityTemplate::tagged("a"));

        ctx.initialize_pools(true);
        assert!(ctx.pool(global).unwrap().is_initialized());
        assert!(!ctx.pool(local).unwrap().is_initialized());
        assert!(!ctx.pool(auto).unwrap().is_initialized());

        ctx.initialize_pools(false);
        assert!(ctx.pool(local).unwrap().is_initialized());

        ctx.start();
        assert!(ctx.pool(auto).unwrap().is_initialized());
    }

    #[test]
    fn deactivate_routes_to_owner() {
        let mut ctx = PoolContext::new();
        let parent = world(&mut ctx);
        let a = ctx.create_pool(PoolConfig::new().with_size(1), EntityTemplate::tagged("a"));
        let b = ctx.create_pool(PoolConfig::new().with_size(1), EntityTemplate::tagged("b"));
        ctx.initialize_pools(false);

        let ea = ctx.activate(a, Vec3::ONE, Quat::IDENTITY, Some(parent)).unwrap();
        let eb = ctx.activate(b, Vec3::ONE, Quat::IDENTITY, Some(parent)).unwrap();

        ctx.deactivate(eb).unwrap();
        assert_eq!(ctx.pool(a).unwrap().active(), &[ea]);
        assert_eq!(ctx.pool(b).unwrap().active_len(), 0);
        assert_eq!(ctx.deactivate(parent), Err(PoolError::NotPooled(parent)));
    }

    #[test]
    fn destroy_escape_hatch_untracks_entity() {
        let mut ctx = PoolContext::new();
        let parent = world(&mut ctx);
        let id = ctx.create_pool(PoolConfig::new().with_size(1), EntityTemplate::tagged("a"));
        ctx.initialize_pool(id, None).unwrap();
        let e = ctx.activate(id, Vec3::ZERO, Quat::IDENTITY, Some(parent)).unwrap();

        assert!(ctx.destroy(e).is_some());
        assert!(!ctx.scene.contains(e));
        assert!(ctx.pool(id).unwrap().is_empty());
    }

    #[test]
    fn destroy_pool_despawns_everything() {
        let mut ctx = PoolContext::new();
        let parent = world(&mut ctx);
        let id = ctx.create_pool(PoolConfig::new().with_size(3).global("x"), EntityTemplate::tagged("a"));
        ctx.initialize_pool(id, None).unwrap();
        ctx.activate(id, Vec3::ZERO, Quat::IDENTITY, Some(parent)).unwrap();

        ctx.destroy_pool(id).unwrap();
        assert_eq!(ctx.scene.len(), 1);
        assert!(ctx.pool(id).is_none());
        assert!(ctx.registry.is_empty());
        assert_eq!(ctx.destroy_pool(id), Err(PoolError::UnknownPool(id)));
    }

    #[test]
    fn start_arms_plain_suicides() {
        let mut ctx = PoolContext::new();
        let id = ctx.scene.alloc_id();
        ctx.scene.spawn(Entity::new(id).with_suicide(Suicide::new(1.0)));
        assert!(!ctx.scene.get(id).unwrap().suicide.as_ref().unwrap().is_armed());

        ctx.start();
        assert!(ctx.scene.get(id).unwrap().suicide.as_ref().unwrap().is_armed());
    }

    #[test]
    fn shutdown_clears_everything() {
        let mut ctx = PoolContext::new();
        ctx.create_pool(PoolConfig::new().with_size(2).global("a"), EntityTemplate::tagged("a"));
        ctx.create_pool(PoolConfig::new().with_size(2).global("b"), EntityTemplate::tagged("b"));
        ctx.initialize_pools(true);

        ctx.shutdown();
        assert_eq!(ctx.pools().count(), 0);
        assert!(ctx.registry.is_empty());
        assert!(ctx.scene.is_empty());
    }
}
