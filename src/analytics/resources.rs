//! Resource allocation report.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analytics::{require_entity, status_or};
use crate::error::{GraphError, Result};
use crate::graph::observations::{cmp_dates_none_last, due_date_of, observation_value};
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    pub resource_type: Option<String>,
    pub availability: Option<String>,
    pub capacity: Option<String>,
    pub cost: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub total_tasks: usize,
    pub in_progress_tasks: usize,
    pub usage_percentage: u32,
}

/// One resource with the tasks and people drawing on it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub resource: Entity,
    pub info: ResourceInfo,
    pub usage: ResourceUsage,
    pub assigned_tasks: Vec<Entity>,
    pub tasks_by_status: BTreeMap<String, Vec<Entity>>,
    pub team_members: Vec<Entity>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub total_resources: usize,
    pub overallocated_count: usize,
    pub underutilized_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAllocation {
    pub project: Entity,
    pub resources: Vec<ResourceEntry>,
    pub summary: ResourceSummary,
    pub overallocated_resources: Vec<String>,
    pub underutilized_resources: Vec<String>,
}

/// How a project's resources are used, optionally narrowed to one.
///
/// Usage is the in-progress share of a declared integer `Capacity:`,
/// capped at 100; without a parseable capacity it is a flat 50 when any
/// task requires the resource, else 0. Over 90 flags overallocation;
/// under 20 with at least one task flags underutilization.
pub fn resource_allocation(
    graph: &KnowledgeGraph,
    project_name: &str,
    resource_name: Option<&str>,
) -> Result<ResourceAllocation> {
    let project = require_entity(graph, project_name, EntityType::Project, "Project")?;

    let resources: Vec<&Entity> = graph
        .members_of(project_name, RelationType::PartOf, EntityType::Resource)
        .into_iter()
        .filter(|r| resource_name.is_none_or(|wanted| r.name == wanted))
        .collect();

    if let Some(wanted) = resource_name {
        if resources.is_empty() {
            return Err(GraphError::not_found("Resource", wanted).into());
        }
    }

    let total_resources = resources.len();
    let mut entries: Vec<ResourceEntry> = resources
        .into_iter()
        .map(|resource| build_entry(graph, resource))
        .collect();
    entries.sort_by(|a, b| b.usage.usage_percentage.cmp(&a.usage.usage_percentage));

    let overallocated: Vec<String> = entries
        .iter()
        .filter(|e| e.usage.usage_percentage > 90)
        .map(|e| e.resource.name.clone())
        .collect();
    let underutilized: Vec<String> = entries
        .iter()
        .filter(|e| e.usage.usage_percentage < 20 && e.usage.total_tasks > 0)
        .map(|e| e.resource.name.clone())
        .collect();

    Ok(ResourceAllocation {
        project: project.clone(),
        resources: entries,
        summary: ResourceSummary {
            total_resources,
            overallocated_count: overallocated.len(),
            underutilized_count: underutilized.len(),
        },
        overallocated_resources: overallocated,
        underutilized_resources: underutilized,
    })
}

fn build_entry(graph: &KnowledgeGraph, resource: &Entity) -> ResourceEntry {
    let capacity = observation_value(resource, "Capacity").map(String::from);

    let mut assigned_tasks: Vec<&Entity> =
        graph.members_of(&resource.name, RelationType::Requires, EntityType::Task);
    assigned_tasks.sort_by(|a, b| cmp_dates_none_last(due_date_of(a), due_date_of(b)));

    let mut tasks_by_status: BTreeMap<String, Vec<Entity>> = BTreeMap::new();
    for task in &assigned_tasks {
        tasks_by_status
            .entry(status_or(task, "not_started").to_string())
            .or_default()
            .push((*task).clone());
    }

    let team_members: Vec<Entity> = graph
        .members_of(&resource.name, RelationType::Uses, EntityType::TeamMember)
        .into_iter()
        .cloned()
        .collect();

    let total_tasks = assigned_tasks.len();
    let in_progress_tasks = tasks_by_status
        .get("in_progress")
        .map_or(0, |tasks| tasks.len());

    let usage_percentage = match capacity.as_deref().and_then(|c| c.parse::<u32>().ok()) {
        Some(cap) if cap > 0 => {
            ((in_progress_tasks as f64 / cap as f64 * 100.0).round() as u32).min(100)
        }
        _ if total_tasks > 0 => 50,
        _ => 0,
    };

    ResourceEntry {
        info: ResourceInfo {
            resource_type: observation_value(resource, "Type").map(String::from),
            availability: observation_value(resource, "Availability").map(String::from),
            capacity,
            cost: observation_value(resource, "Cost").map(String::from),
        },
        usage: ResourceUsage {
            total_tasks,
            in_progress_tasks,
            usage_percentage,
        },
        assigned_tasks: assigned_tasks.into_iter().cloned().collect(),
        tasks_by_status,
        team_members,
        resource: resource.clone(),
    }
}
