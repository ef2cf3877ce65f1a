//! Milestone progress report.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{percentage, require_entity, status_or};
use crate::error::{GraphError, Result};
use crate::graph::observations::{cmp_dates_none_last, observation_value, parse_date};
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneInfo {
    pub description: Option<String>,
    pub date: Option<String>,
    pub status: String,
    pub criteria: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_percentage: u32,
    pub days_remaining: Option<i64>,
    pub is_overdue: bool,
}

/// One milestone with its required tasks and progress math.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneEntry {
    pub milestone: Entity,
    pub info: MilestoneInfo,
    pub progress: MilestoneStats,
    pub related_tasks: Vec<Entity>,
    pub blockers: Vec<Entity>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSummary {
    pub total_milestones: usize,
    pub reached_milestones: usize,
    pub milestone_completion_rate: u32,
    pub average_completion: u32,
    pub next_milestone: Option<String>,
    pub overdue_milestones: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneProgress {
    pub project: Entity,
    pub milestones: Vec<MilestoneEntry>,
    pub summary: MilestoneSummary,
}

/// Progress of a project's milestones, optionally narrowed to one.
///
/// A milestone's completion is the completed fraction of its
/// `required_for` tasks; with no required tasks it falls back to 100
/// when the milestone's own status is "reached", else 0.
pub fn milestone_progress(
    graph: &KnowledgeGraph,
    project_name: &str,
    milestone_name: Option<&str>,
    today: NaiveDate,
) -> Result<MilestoneProgress> {
    let project = require_entity(graph, project_name, EntityType::Project, "Project")?;

    let milestones: Vec<&Entity> = graph
        .members_of(project_name, RelationType::PartOf, EntityType::Milestone)
        .into_iter()
        .filter(|m| milestone_name.is_none_or(|wanted| m.name == wanted))
        .collect();

    if let Some(wanted) = milestone_name {
        if milestones.is_empty() {
            return Err(GraphError::not_found("Milestone", wanted).into());
        }
    }

    let mut entries: Vec<MilestoneEntry> = milestones
        .into_iter()
        .map(|milestone| build_entry(graph, milestone, today))
        .collect();
    entries.sort_by(|a, b| {
        cmp_dates_none_last(
            a.info.date.as_deref().and_then(parse_date),
            b.info.date.as_deref().and_then(parse_date),
        )
    });

    let total = entries.len();
    let reached = entries.iter().filter(|e| e.info.status == "reached").count();
    let average_completion = if total > 0 {
        (entries
            .iter()
            .map(|e| e.progress.completion_percentage as f64)
            .sum::<f64>()
            / total as f64)
            .round() as u32
    } else {
        0
    };
    let next_milestone = entries
        .iter()
        .find(|e| e.info.status != "reached" && e.info.status != "missed")
        .map(|e| e.milestone.name.clone());
    let overdue = entries.iter().filter(|e| e.progress.is_overdue).count();

    Ok(MilestoneProgress {
        project: project.clone(),
        milestones: entries,
        summary: MilestoneSummary {
            total_milestones: total,
            reached_milestones: reached,
            milestone_completion_rate: percentage(reached, total),
            average_completion,
            next_milestone,
            overdue_milestones: overdue,
        },
    })
}

fn build_entry(graph: &KnowledgeGraph, milestone: &Entity, today: NaiveDate) -> MilestoneEntry {
    let status = status_or(milestone, "planned").to_string();
    let date = observation_value(milestone, "Date").map(String::from);

    let related_tasks: Vec<&Entity> =
        graph.members_of(&milestone.name, RelationType::RequiredFor, EntityType::Task);

    let completed_tasks = related_tasks
        .iter()
        .filter(|t| status_or(t, "not_started") == "completed")
        .count();

    let completion_percentage = if !related_tasks.is_empty() {
        percentage(completed_tasks, related_tasks.len())
    } else if status == "reached" {
        100
    } else {
        0
    };

    let mut days_remaining = None;
    let mut is_overdue = false;
    if let Some(milestone_date) = date.as_deref().and_then(parse_date) {
        let days = (milestone_date - today).num_days();
        days_remaining = Some(days);
        is_overdue = days < 0 && status != "reached" && status != "missed";
    }

    let blockers: Vec<Entity> = related_tasks
        .iter()
        .filter(|t| {
            let s = status_or(t, "not_started");
            s != "completed" && s != "cancelled"
        })
        .map(|t| (*t).clone())
        .collect();

    MilestoneEntry {
        info: MilestoneInfo {
            description: observation_value(milestone, "Description").map(String::from),
            date,
            status,
            criteria: observation_value(milestone, "Criteria").map(String::from),
        },
        progress: MilestoneStats {
            total_tasks: related_tasks.len(),
            completed_tasks,
            completion_percentage,
            days_remaining,
            is_overdue,
        },
        related_tasks: related_tasks.into_iter().cloned().collect(),
        blockers,
        milestone: milestone.clone(),
    }
}
