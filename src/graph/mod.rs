//! The knowledge graph: types, persistence, mutation, and queries.

pub mod manager;
pub mod observations;
pub mod query;
pub mod store;
pub mod types;

pub use manager::{GraphManager, ObservationDeletion};
pub use store::{FileGraphStore, GraphStore, MemoryGraphStore};
pub use types::{
    Entity, EntityType, KnowledgeGraph, PriorityValue, Relation, RelationType, StatusValue,
};
