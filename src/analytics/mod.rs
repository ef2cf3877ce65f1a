//! Report builders.
//!
//! Every function here is a pure, read-only computation over a loaded
//! graph snapshot. The [`GraphManager`](crate::graph::GraphManager)
//! loads a fresh snapshot and delegates; nothing in this module mutates
//! or retains the graph.
//!
//! Reports resolve status and dates from `"Key: value"` observations,
//! via [`crate::graph::observations`]. When an observation is absent
//! each builder falls back to a documented default ("not_started" for
//! tasks, "planning" for projects, and so on) instead of failing.

pub mod assignments;
pub mod decisions;
pub mod dependencies;
pub mod health;
pub mod milestones;
pub mod overview;
pub mod related;
pub mod resources;
pub mod risks;
pub mod timeline;

pub use assignments::TeamMemberAssignments;
pub use decisions::DecisionLog;
pub use dependencies::TaskDependencyReport;
pub use health::ProjectHealth;
pub use milestones::MilestoneProgress;
pub use overview::ProjectOverview;
pub use related::RelatedProjects;
pub use resources::ResourceAllocation;
pub use risks::ProjectRisks;
pub use timeline::ProjectTimeline;

use crate::error::{GraphError, Result};
use crate::graph::observations::observation_value;
use crate::graph::types::{Entity, EntityType, KnowledgeGraph};

/// Look up a report's root entity, failing with `NotFound` when the
/// name is absent or belongs to a different type.
pub(crate) fn require_entity<'a>(
    graph: &'a KnowledgeGraph,
    name: &str,
    entity_type: EntityType,
    kind: &'static str,
) -> Result<&'a Entity> {
    graph
        .entity_of_type(name, entity_type)
        .ok_or_else(|| GraphError::not_found(kind, name).into())
}

/// The entity's `Status:` observation, or `default` when unset.
pub(crate) fn status_or<'a>(entity: &'a Entity, default: &'a str) -> &'a str {
    observation_value(entity, "Status").unwrap_or(default)
}

/// Percentage of `part` in `whole`, rounded, 0 when `whole` is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}
