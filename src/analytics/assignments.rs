//! Team member workload report.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{percentage, require_entity, status_or};
use crate::error::Result;
use crate::graph::observations::{cmp_dates_none_last, observation_value, parse_date};
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

/// A task assigned to the member, with its resolved project and the
/// fields workload math needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub task: Entity,
    pub project: Option<Entity>,
    pub due_date: Option<String>,
    pub status: String,
    pub priority: Option<String>,
}

impl TaskAssignment {
    fn due(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_date)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub role: Option<String>,
    pub skills: Option<String>,
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub not_started_tasks: usize,
    pub blocked_tasks: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberAssignments {
    pub team_member: Entity,
    pub info: MemberInfo,
    pub workload: Workload,
    pub assigned_tasks: Vec<TaskAssignment>,
    pub tasks_by_project: BTreeMap<String, Vec<TaskAssignment>>,
    pub tasks_by_status: BTreeMap<String, Vec<TaskAssignment>>,
    pub projects: Vec<Entity>,
    pub upcoming_deadlines: Vec<TaskAssignment>,
    pub overdue_tasks: Vec<TaskAssignment>,
}

/// Collect everything assigned to `member_name` and compute workload
/// metrics. `today` anchors the upcoming/overdue windows.
pub fn team_member_assignments(
    graph: &KnowledgeGraph,
    member_name: &str,
    today: NaiveDate,
) -> Result<TeamMemberAssignments> {
    let member = require_entity(graph, member_name, EntityType::TeamMember, "Team member")?;

    let info = MemberInfo {
        role: observation_value(member, "Role").map(String::from),
        skills: observation_value(member, "Skills").map(String::from),
        availability: observation_value(member, "Availability").map(String::from),
    };

    let mut assigned_tasks: Vec<TaskAssignment> = graph
        .relations_to(member_name, RelationType::AssignedTo)
        .filter_map(|r| graph.entity_of_type(&r.from, EntityType::Task))
        .map(|task| {
            let project = graph
                .relations_from(&task.name, RelationType::PartOf)
                .find_map(|r| graph.entity_of_type(&r.to, EntityType::Project))
                .cloned();
            TaskAssignment {
                due_date: observation_value(task, "DueDate").map(String::from),
                status: status_or(task, "not_started").to_string(),
                priority: observation_value(task, "Priority").map(String::from),
                task: task.clone(),
                project,
            }
        })
        .collect();
    assigned_tasks.sort_by(|a, b| cmp_dates_none_last(a.due(), b.due()));

    // Projects the member manages or contributes to, once each.
    let mut projects: Vec<Entity> = Vec::new();
    for relation in graph.relations.iter().filter(|r| {
        r.from == member_name
            && matches!(
                r.relation_type,
                RelationType::Manages | RelationType::ContributesTo
            )
    }) {
        if let Some(project) = graph.entity_of_type(&relation.to, EntityType::Project) {
            if !projects.iter().any(|p| p.name == project.name) {
                projects.push(project.clone());
            }
        }
    }

    let mut tasks_by_project: BTreeMap<String, Vec<TaskAssignment>> = BTreeMap::new();
    let mut tasks_by_status: BTreeMap<String, Vec<TaskAssignment>> = BTreeMap::new();
    for assignment in &assigned_tasks {
        let project_name = assignment
            .project
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Unassigned".to_string());
        tasks_by_project
            .entry(project_name)
            .or_default()
            .push(assignment.clone());
        tasks_by_status
            .entry(assignment.status.clone())
            .or_default()
            .push(assignment.clone());
    }

    let count_status =
        |status: &str| assigned_tasks.iter().filter(|t| t.status == status).count();
    let completed_tasks = count_status("completed");

    let upcoming_deadlines: Vec<TaskAssignment> = assigned_tasks
        .iter()
        .filter(|t| {
            if t.status == "completed" {
                return false;
            }
            t.due().is_some_and(|due| {
                let days = (due - today).num_days();
                (0..=7).contains(&days)
            })
        })
        .cloned()
        .collect();

    let overdue_tasks: Vec<TaskAssignment> = assigned_tasks
        .iter()
        .filter(|t| t.status != "completed" && t.due().is_some_and(|due| due < today))
        .cloned()
        .collect();

    Ok(TeamMemberAssignments {
        team_member: member.clone(),
        info,
        workload: Workload {
            total_tasks: assigned_tasks.len(),
            completed_tasks,
            in_progress_tasks: count_status("in_progress"),
            not_started_tasks: count_status("not_started"),
            blocked_tasks: count_status("blocked"),
            completion_rate: percentage(completed_tasks, assigned_tasks.len()),
        },
        assigned_tasks,
        tasks_by_project,
        tasks_by_status,
        projects,
        upcoming_deadlines,
        overdue_tasks,
    })
}
