//! Suicide system: counts down delayed self-destructs and carries them out.

use crate::api::context::PoolContext;
use crate::api::types::EntityId;
use crate::components::pooled::PoolState;

/// Tick every armed `Suicide`. Expired pool-managed entities go back to their
/// pool; everything else is despawned.
///
/// Call this once per frame.
pub fn tick_suicides(ctx: &mut PoolContext, dt: f32) {
    let expired: Vec<EntityId> = ctx
        .scene
        .iter_mut()
        .filter_map(|e| e.suicide.as_mut()?.tick(dt).then_some(e.id))
        .collect();

    for id in expired {
        kill(ctx, id);
    }
}

/// Deactivate `id` if a pool owns it, otherwise despawn it.
/// Pool-managed entities that are not checked out are left alone.
pub fn kill(ctx: &mut PoolContext, id: EntityId) {
    let Some(entity) = ctx.scene.get(id) else { return };
    let pool_state = entity
        .pooled
        .as_ref()
        .filter(|p| p.owner().is_some())
        .map(|p| p.state());

    match pool_state {
        Some(PoolState::Active) => {
            if let Err(err) = ctx.deactivate(id) {
                log::warn!("Could not return {} to its pool: {}", id, err);
            }
        }
        Some(state) => log::debug!("{} is {:?} in its pool, not killing it", id, state),
        None => {
            ctx.destroy(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::cell::Cell;
    use std::rc::Rc;
    use crate::components::entity::Entity;
    use crate::components::pooled::PooledEntity;
    use crate::components::suicide::Suicide;
    use crate::pool::config::PoolConfig;
    use crate::pool::template::EntityTemplate;

    #[test]
    fn plain_entity_is_despawned_after_delay() {
        let mut ctx = PoolContext::new();
        let id = ctx.scene.alloc_id();
        ctx.spawn(Entity::new(id).with_suicide(Suicide::new(0.5)));

        tick_suicides(&mut ctx, 0.25);
        assert!(ctx.scene.contains(id));
        tick_suicides(&mut ctx, 0.25);
        assert!(!ctx.scene.contains(id));
    }

    #[test]
    fn pooled_entity_returns_to_pool() {
        let mut ctx = PoolContext::new();
        let parent = ctx.scene.alloc_id();
        ctx.spawn(Entity::new(parent));
        let template = EntityTemplate::new(Entity::new(EntityId(0)).with_suicide(Suicide::new(1.0)));
        let pool = ctx.create_pool(PoolConfig::new().with_size(1), template);
        ctx.initialize_pool(pool, None).unwrap();

        let e = ctx.activate(pool, Vec3::ONE, Quat::IDENTITY, Some(parent)).unwrap();
        assert!(ctx.scene.get(e).unwrap().suicide.as_ref().unwrap().is_armed());

        ctx.tick(1.0);
        assert!(ctx.scene.contains(e));
        assert_eq!(ctx.pool(pool).unwrap().active_len(), 0);
        assert_eq!(ctx.pool(pool).unwrap().free_len(), 1);
        assert_eq!(ctx.scene.get(e).unwrap().pos, Vec3::ZERO);
    }

    #[test]
    fn early_deactivation_disarms_countdown() {
        let mut ctx = PoolContext::new();
        let parent = ctx.scene.alloc_id();
        ctx.spawn(Entity::new(parent));
        let template = EntityTemplate::new(Entity::new(EntityId(0)).with_suicide(Suicide::new(1.0)));
        let pool = ctx.create_pool(PoolConfig::new(), template);
        ctx.initialize_pool(pool, None).unwrap();

        let e = ctx.activate(pool, Vec3::ZERO, Quat::IDENTITY, Some(parent)).unwrap();
        ctx.deactivate(e).unwrap();
        assert!(!ctx.scene.get(e).unwrap().suicide.as_ref().unwrap().is_armed());
    }

    fn orphan_with_countdown(ctx: &mut PoolContext, deactivated: &Rc<Cell<u32>>) -> EntityId {
        let counter = Rc::clone(deactivated);
        let id = ctx.scene.alloc_id();
        ctx.spawn(
            Entity::new(id)
                .with_suicide(Suicide::new(0.5))
                .with_pooled(PooledEntity::new().with_on_deactivate(move |_| counter.set(counter.get() + 1))),
        );
        id
    }

    #[test]
    fn adopted_orphan_is_not_killed_while_free() {
        let mut ctx = PoolContext::new();
        let pool = ctx.create_pool(PoolConfig::new(), EntityTemplate::new(Entity::new(EntityId(0))));
        ctx.initialize_pool(pool, None).unwrap();

        let deactivated = Rc::new(Cell::new(0));
        let orphan = orphan_with_countdown(&mut ctx, &deactivated);
        assert!(ctx.scene.get(orphan).unwrap().suicide.as_ref().unwrap().is_armed());

        ctx.add_orphan(pool, orphan, true).unwrap();
        tick_suicides(&mut ctx, 1.0);

        let entity = ctx.scene.get(orphan).unwrap();
        assert!(!entity.suicide.as_ref().unwrap().is_armed());
        assert_eq!(entity.pooled.as_ref().unwrap().state(), PoolState::Free);
        assert_eq!(deactivated.get(), 0);
        assert_eq!(ctx.pool(pool).unwrap().free_len(), 1);
    }

    #[test]
    fn live_free_orphan_survives_its_countdown() {
        let mut ctx = PoolContext::new();
        let pool = ctx.create_pool(PoolConfig::new(), EntityTemplate::new(Entity::new(EntityId(0))));
        ctx.initialize_pool(pool, None).unwrap();

        let deactivated = Rc::new(Cell::new(0));
        let orphan = orphan_with_countdown(&mut ctx, &deactivated);
        ctx.add_orphan(pool, orphan, false).unwrap();
        tick_suicides(&mut ctx, 1.0);

        assert!(ctx.scene.contains(orphan));
        assert_eq!(deactivated.get(), 0);
        assert_eq!(ctx.pool(pool).unwrap().free_len(), 1);
        assert_eq!(ctx.pool(pool).unwrap().active_len(), 0);
    }

    #[test]
    fn unarmed_suicide_does_nothing() {
        let mut ctx = PoolContext::new();
        let id = ctx.scene.alloc_id();
        ctx.spawn(Entity::new(id).with_suicide(Suicide::new(0.0).with_trigger_on_start(false)));

        tick_suicides(&mut ctx, 5.0);
        assert!(ctx.scene.contains(id));
    }
}
