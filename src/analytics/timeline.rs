//! Project timeline report.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{require_entity, status_or};
use crate::error::Result;
use crate::graph::observations::{
    due_date_of, end_date_of, observation_value, parse_date, start_date_of,
};
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventType {
    ProjectStart,
    ProjectEnd,
    Milestone,
    Task,
}

/// A dated point on the project timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub entity: Entity,
    pub event_type: TimelineEventType,
    pub description: Option<String>,
    pub status: Option<String>,
    /// Days since the previous event; 0 for the first.
    pub days_from_previous: i64,
    /// Days until the next event; 0 for the last.
    pub days_to_next: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTimeline {
    pub project: Entity,
    pub timeline: Vec<TimelineEvent>,
    /// Index of the first event on or after today, or the last event
    /// when everything is in the past; -1 when there are no events.
    pub current_position: i64,
    /// Elapsed fraction of the first-to-last event span, clamped to
    /// [0, 100].
    pub progress_percentage: u32,
    pub project_duration_days: i64,
    pub upcoming_events: Vec<TimelineEvent>,
}

/// Merge project start/end, milestone dates, and task due dates into a
/// chronological event list.
pub fn project_timeline(
    graph: &KnowledgeGraph,
    project_name: &str,
    today: NaiveDate,
) -> Result<ProjectTimeline> {
    let project = require_entity(graph, project_name, EntityType::Project, "Project")?;

    struct RawEvent {
        date: NaiveDate,
        entity: Entity,
        event_type: TimelineEventType,
        description: Option<String>,
        status: Option<String>,
    }

    let mut events: Vec<RawEvent> = Vec::new();

    if let Some(date) = start_date_of(project) {
        events.push(RawEvent {
            date,
            entity: project.clone(),
            event_type: TimelineEventType::ProjectStart,
            description: Some("Project Start".to_string()),
            status: None,
        });
    }
    if let Some(date) = end_date_of(project) {
        events.push(RawEvent {
            date,
            entity: project.clone(),
            event_type: TimelineEventType::ProjectEnd,
            description: Some("Project End".to_string()),
            status: None,
        });
    }

    for milestone in graph.members_of(project_name, RelationType::PartOf, EntityType::Milestone)
    {
        if let Some(date) = observation_value(milestone, "Date").and_then(parse_date) {
            events.push(RawEvent {
                date,
                entity: milestone.clone(),
                event_type: TimelineEventType::Milestone,
                description: observation_value(milestone, "Description").map(String::from),
                status: observation_value(milestone, "Status").map(String::from),
            });
        }
    }

    for task in graph.members_of(project_name, RelationType::PartOf, EntityType::Task) {
        if let Some(date) = due_date_of(task) {
            events.push(RawEvent {
                date,
                entity: task.clone(),
                event_type: TimelineEventType::Task,
                description: observation_value(task, "Description").map(String::from),
                status: observation_value(task, "Status").map(String::from),
            });
        }
    }

    events.sort_by_key(|e| e.date);

    let dates: Vec<NaiveDate> = events.iter().map(|e| e.date).collect();
    let timeline: Vec<TimelineEvent> = events
        .into_iter()
        .enumerate()
        .map(|(i, e)| TimelineEvent {
            days_from_previous: if i > 0 {
                (e.date - dates[i - 1]).num_days()
            } else {
                0
            },
            days_to_next: if i + 1 < dates.len() {
                (dates[i + 1] - e.date).num_days()
            } else {
                0
            },
            date: e.date,
            entity: e.entity,
            event_type: e.event_type,
            description: e.description,
            status: e.status,
        })
        .collect();

    let current_position = match dates.iter().position(|d| *d >= today) {
        Some(i) => i as i64,
        None if !dates.is_empty() => dates.len() as i64 - 1,
        None => -1,
    };

    let mut progress_percentage = 0;
    let mut project_duration_days = 0;
    if dates.len() >= 2 {
        let first = dates[0];
        let last = dates[dates.len() - 1];
        project_duration_days = (last - first).num_days();
        if project_duration_days > 0 {
            let elapsed = (today - first).num_days() as f64;
            let fraction = elapsed / project_duration_days as f64 * 100.0;
            progress_percentage = fraction.round().clamp(0.0, 100.0) as u32;
        }
    }

    let upcoming_events: Vec<TimelineEvent> = timeline
        .iter()
        .filter(|e| e.date >= today)
        .take(5)
        .cloned()
        .collect();

    Ok(ProjectTimeline {
        project: project.clone(),
        timeline,
        current_position,
        progress_percentage,
        project_duration_days,
        upcoming_events,
    })
}
