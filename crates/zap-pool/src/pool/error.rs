use crate::api::types::{EntityId, PoolId};

/// Why a pool or registry operation was rejected.
///
/// None of these are fatal: the operation is skipped and the pool is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// A global pool has no accessor name (or only whitespace).
    #[error("global pool accessor cannot be empty")]
    MissingAccessor,
    /// Another pool is already registered under this (normalized) name.
    #[error("global pool accessor `{0}` already exists")]
    DuplicateAccessor(String),
    #[error("pool is already initialized")]
    AlreadyInitialized,
    #[error("pool is not initialized")]
    NotInitialized,
    /// The entity already belongs to a pool; detach it with `release` first.
    #[error("{entity} is already owned by {owner}")]
    AlreadyOwned { entity: EntityId, owner: PoolId },
    #[error("{entity} is not owned by {pool}")]
    NotOwned { entity: EntityId, pool: PoolId },
    #[error("{0} is not a pooled entity")]
    NotPooled(EntityId),
    #[error("{0} is not in the scene")]
    UnknownEntity(EntityId),
    #[error("no pool with id {0}")]
    UnknownPool(PoolId),
    #[error("pool is at its maximum size of {0}")]
    CapacityReached(usize),
}
