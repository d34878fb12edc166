// pool/mod.rs
//
// Entity pooling: reusable entities checked out FIFO and returned on deactivation.
// Pools track entities by EntityId; the entities themselves live in the Scene.

pub mod config;
pub mod error;
pub mod object_pool;
pub mod registry;
pub mod template;

pub use config::{PoolConfig, PoolManifest};
pub use error::PoolError;
pub use object_pool::ObjectPool;
pub use registry::{normalize, PoolRegistry};
pub use template::{EntityTemplate, Template};
