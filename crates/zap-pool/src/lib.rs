pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod pool;

// Re-export key types at crate root for convenience
pub use api::context::PoolContext;
pub use api::types::{EntityId, PoolId};
pub use components::entity::Entity;
pub use components::pooled::{Listener, Listeners, Placement, PoolState, PooledEntity};
pub use components::suicide::Suicide;
pub use core::scene::Scene;
pub use systems::suicide::tick_suicides;

// Pooling
pub use pool::{
    normalize, EntityTemplate, ObjectPool, PoolConfig, PoolError, PoolManifest,
    PoolRegistry, Template,
};
pub use pool::config::PoolDescriptor;
