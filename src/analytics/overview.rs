//! Project overview report.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{percentage, require_entity, status_or};
use crate::error::Result;
use crate::graph::observations::{date_of, observation_value, parse_date};
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

/// Descriptive fields lifted from the project's observations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub priority: Option<String>,
    pub status: String,
    pub goal: Option<String>,
    pub budget: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSummary {
    pub task_count: usize,
    pub completed_tasks: usize,
    pub task_completion_rate: u32,
    pub milestone_count: usize,
    pub team_member_count: usize,
    pub issue_count: usize,
    pub risk_count: usize,
    pub component_count: usize,
}

/// Everything attached to a project, grouped and summarized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOverview {
    pub project: Entity,
    pub info: ProjectInfo,
    pub summary: OverviewSummary,
    pub components: Vec<Entity>,
    pub tasks: Vec<Entity>,
    pub tasks_by_status: BTreeMap<String, Vec<Entity>>,
    pub milestones: Vec<Entity>,
    pub upcoming_milestones: Vec<Entity>,
    pub team_members: Vec<Entity>,
    pub issues: Vec<Entity>,
    pub issues_by_status: BTreeMap<String, Vec<Entity>>,
    pub risks: Vec<Entity>,
    pub resources: Vec<Entity>,
    pub stakeholders: Vec<Entity>,
}

/// Aggregate every entity attached to `project_name` and summarize it.
pub fn project_overview(
    graph: &KnowledgeGraph,
    project_name: &str,
    today: NaiveDate,
) -> Result<ProjectOverview> {
    let project = require_entity(graph, project_name, EntityType::Project, "Project")?;

    let info = ProjectInfo {
        description: observation_value(project, "Description").map(String::from),
        start_date: observation_value(project, "StartDate").map(String::from),
        end_date: observation_value(project, "EndDate").map(String::from),
        priority: observation_value(project, "Priority").map(String::from),
        status: status_or(project, "planning").to_string(),
        goal: observation_value(project, "Goal").map(String::from),
        budget: observation_value(project, "Budget").map(String::from),
    };

    let components = graph.members_of(project_name, RelationType::PartOf, EntityType::Component);
    let tasks = graph.members_of(project_name, RelationType::PartOf, EntityType::Task);
    let issues = graph.members_of(project_name, RelationType::PartOf, EntityType::Issue);
    let risks = graph.members_of(project_name, RelationType::PartOf, EntityType::Risk);
    let resources = graph.members_of(project_name, RelationType::PartOf, EntityType::Resource);
    let stakeholders =
        graph.members_of(project_name, RelationType::StakeholderOf, EntityType::Stakeholder);

    let mut milestones =
        graph.members_of(project_name, RelationType::PartOf, EntityType::Milestone);
    milestones.sort_by(|a, b| {
        crate::graph::observations::cmp_dates_none_last(date_of(a), date_of(b))
    });

    // Team members join through any of the assignment relations, once each.
    let mut team_members: Vec<&Entity> = Vec::new();
    for relation_type in [
        RelationType::AssignedTo,
        RelationType::Manages,
        RelationType::ContributesTo,
    ] {
        for member in graph.members_of(project_name, relation_type, EntityType::TeamMember) {
            if !team_members.iter().any(|m| m.name == member.name) {
                team_members.push(member);
            }
        }
    }

    let tasks_by_status = group_by_status(&tasks, "not_started");
    let issues_by_status = group_by_status(&issues, "identified");

    let completed_tasks = tasks
        .iter()
        .filter(|t| status_or(t, "not_started") == "completed")
        .count();

    let upcoming_milestones: Vec<Entity> = milestones
        .iter()
        .filter(|m| {
            observation_value(m, "Date")
                .and_then(parse_date)
                .is_some_and(|d| d >= today)
        })
        .map(|m| (*m).clone())
        .collect();

    Ok(ProjectOverview {
        project: project.clone(),
        info,
        summary: OverviewSummary {
            task_count: tasks.len(),
            completed_tasks,
            task_completion_rate: percentage(completed_tasks, tasks.len()),
            milestone_count: milestones.len(),
            team_member_count: team_members.len(),
            issue_count: issues.len(),
            risk_count: risks.len(),
            component_count: components.len(),
        },
        components: cloned(components),
        tasks: cloned(tasks),
        tasks_by_status,
        milestones: cloned(milestones),
        upcoming_milestones,
        team_members: cloned(team_members),
        issues: cloned(issues),
        issues_by_status,
        risks: cloned(risks),
        resources: cloned(resources),
        stakeholders: cloned(stakeholders),
    })
}

fn cloned(entities: Vec<&Entity>) -> Vec<Entity> {
    entities.into_iter().cloned().collect()
}

fn group_by_status(entities: &[&Entity], default: &str) -> BTreeMap<String, Vec<Entity>> {
    let mut groups: BTreeMap<String, Vec<Entity>> = BTreeMap::new();
    for entity in entities {
        groups
            .entry(status_or(entity, default).to_string())
            .or_default()
            .push((*entity).clone());
    }
    groups
}
