//! Trellis: Project-Management Knowledge Graph
//!
//! A typed property graph of projects, tasks, milestones, team members,
//! and the relations between them, persisted as a single JSON document,
//! with a query engine and report builders for dependency trees,
//! critical paths, timelines, and project health scoring.

pub mod analytics;
pub mod config;
pub mod error;
pub mod graph;

pub use analytics::{
    DecisionLog, MilestoneProgress, ProjectHealth, ProjectOverview, ProjectRisks,
    ProjectTimeline, RelatedProjects, ResourceAllocation, TaskDependencyReport,
    TeamMemberAssignments,
};
pub use config::Config;
pub use error::{ConfigError, GraphError, Result, StorageError, TrellisError};
pub use graph::{
    Entity, EntityType, FileGraphStore, GraphManager, GraphStore, KnowledgeGraph,
    MemoryGraphStore, ObservationDeletion, PriorityValue, Relation, RelationType, StatusValue,
};
