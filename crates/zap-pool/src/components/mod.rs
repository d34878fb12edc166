pub mod entity;
pub mod pooled;
pub mod suicide;
