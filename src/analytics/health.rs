//! Composite project health score.
//!
//! Nine equally weighted factors: task completion and blocked ratio,
//! milestone completion and missed ratio, issue resolution and open
//! ratio, risk mitigation and active ratio, and schedule adherence.
//! A category with no members contributes two neutral 50s rather than
//! being skipped, so sparse projects still score near the middle.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{percentage, require_entity, status_or};
use crate::error::Result;
use crate::graph::observations::{end_date_of, observation_value, start_date_of};
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    AttentionNeeded,
    AtRisk,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetrics {
    pub total: usize,
    pub completed: usize,
    pub blocked: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneMetrics {
    pub total: usize,
    pub reached: usize,
    pub missed: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueMetrics {
    pub total: usize,
    pub resolved: usize,
    pub open: usize,
    pub resolution_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub total: usize,
    pub mitigated: usize,
    pub active: usize,
    pub mitigation_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMetrics {
    pub progress: u32,
    pub behind_schedule: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    pub tasks: TaskMetrics,
    pub milestones: MilestoneMetrics,
    pub issues: IssueMetrics,
    pub risks: RiskMetrics,
    pub timeline: TimelineMetrics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHealth {
    pub project: Entity,
    pub health_score: u32,
    pub health_status: HealthStatus,
    pub metrics: HealthMetrics,
    pub top_issues: Vec<Entity>,
    pub recommendations: Vec<String>,
}

/// Score the project's overall health as of `today`.
pub fn project_health(
    graph: &KnowledgeGraph,
    project_name: &str,
    today: NaiveDate,
) -> Result<ProjectHealth> {
    let project = require_entity(graph, project_name, EntityType::Project, "Project")?;

    let tasks = graph.members_of(project_name, RelationType::PartOf, EntityType::Task);
    let milestones = graph.members_of(project_name, RelationType::PartOf, EntityType::Milestone);
    let issues = graph.members_of(project_name, RelationType::PartOf, EntityType::Issue);
    let risks = graph.members_of(project_name, RelationType::PartOf, EntityType::Risk);

    let count = |entities: &[&Entity], default: &str, statuses: &[&str]| {
        entities
            .iter()
            .filter(|e| statuses.contains(&status_or(e, default)))
            .count()
    };

    let completed = count(&tasks, "not_started", &["completed"]);
    let blocked = count(&tasks, "not_started", &["blocked"]);
    let task_completion_rate = if tasks.is_empty() {
        0.0
    } else {
        completed as f64 / tasks.len() as f64 * 100.0
    };

    let reached = count(&milestones, "planned", &["reached"]);
    let missed = count(&milestones, "planned", &["missed"]);

    let resolved = count(&issues, "identified", &["resolved"]);
    let open = issues.len() - resolved;

    let mitigated = count(&risks, "identified", &["mitigating", "avoided"]);
    let active = count(&risks, "identified", &["identified", "monitoring"]);

    // Schedule adherence needs both project dates.
    let mut timeline_progress = 0;
    let mut behind_schedule = false;
    if let (Some(start), Some(end)) = (start_date_of(project), end_date_of(project)) {
        let total_days = (end - start).num_days();
        if total_days > 0 {
            let elapsed = (today - start).num_days() as f64;
            let elapsed_percent =
                (elapsed / total_days as f64 * 100.0).clamp(0.0, 100.0);
            behind_schedule = task_completion_rate < elapsed_percent - 15.0;
            timeline_progress = elapsed_percent.round() as u32;
        }
    }

    let ratio_factor = |part: usize, whole: usize, weight: f64| {
        if whole == 0 {
            50.0
        } else {
            (100.0 - part as f64 / whole as f64 * weight).max(0.0)
        }
    };
    let rate_factor = |part: usize, whole: usize| {
        if whole == 0 {
            50.0
        } else {
            (part as f64 / whole as f64 * 100.0).min(100.0)
        }
    };

    let factors = [
        rate_factor(completed, tasks.len()),
        ratio_factor(blocked, tasks.len(), 200.0),
        rate_factor(reached, milestones.len()),
        ratio_factor(missed, milestones.len(), 200.0),
        rate_factor(resolved, issues.len()),
        ratio_factor(open, issues.len(), 100.0),
        rate_factor(mitigated, risks.len()),
        ratio_factor(active, risks.len(), 100.0),
        if behind_schedule { 30.0 } else { 70.0 },
    ];
    let health_score =
        (factors.iter().sum::<f64>() / factors.len() as f64).round() as u32;

    let health_status = if health_score >= 80 {
        HealthStatus::Healthy
    } else if health_score >= 60 {
        HealthStatus::AttentionNeeded
    } else if health_score >= 40 {
        HealthStatus::AtRisk
    } else {
        HealthStatus::Critical
    };

    let top_issues = top_issues(&issues);
    let recommendations =
        recommendations(health_status, blocked, open, active, behind_schedule);

    Ok(ProjectHealth {
        project: project.clone(),
        health_score,
        health_status,
        metrics: HealthMetrics {
            tasks: TaskMetrics {
                total: tasks.len(),
                completed,
                blocked,
                completion_rate: task_completion_rate.round() as u32,
            },
            milestones: MilestoneMetrics {
                total: milestones.len(),
                reached,
                missed,
                completion_rate: percentage(reached, milestones.len()),
            },
            issues: IssueMetrics {
                total: issues.len(),
                resolved,
                open,
                resolution_rate: percentage(resolved, issues.len()),
            },
            risks: RiskMetrics {
                total: risks.len(),
                mitigated,
                active,
                mitigation_rate: percentage(mitigated, risks.len()),
            },
            timeline: TimelineMetrics {
                progress: timeline_progress,
                behind_schedule,
            },
        },
        top_issues,
        recommendations,
    })
}

/// Up to three unresolved issues, high priority first. Issues with no
/// priority rank above explicit "low".
fn top_issues(issues: &[&Entity]) -> Vec<Entity> {
    let mut open: Vec<&Entity> = issues
        .iter()
        .copied()
        .filter(|i| {
            let status = status_or(i, "identified");
            status != "resolved" && status != "wont_fix"
        })
        .collect();

    let rank = |issue: &Entity| match observation_value(issue, "Priority") {
        Some("high") => 0,
        Some("low") => 2,
        _ => 1,
    };
    open.sort_by_key(|i| rank(i));

    open.into_iter().take(3).cloned().collect()
}

fn recommendations(
    status: HealthStatus,
    blocked_tasks: usize,
    open_issues: usize,
    active_risks: usize,
    behind_schedule: bool,
) -> Vec<String> {
    let mut out: Vec<&str> = Vec::new();
    match status {
        HealthStatus::Healthy => {
            out.push("Continue current management practices");
            out.push("Document successful strategies for future projects");
        }
        HealthStatus::AttentionNeeded => {
            if blocked_tasks > 0 {
                out.push("Address blocked tasks to maintain momentum");
            }
            if open_issues > 2 {
                out.push("Resolve open issues to prevent escalation");
            }
            if behind_schedule {
                out.push("Review project timeline and adjust as needed");
            }
        }
        HealthStatus::AtRisk => {
            if blocked_tasks > 0 {
                out.push("Urgently resolve blocked tasks - consider reassigning resources");
            }
            if behind_schedule {
                out.push("Reevaluate project scope and timeline - consider adjustments");
            }
            if active_risks > 0 {
                out.push("Implement mitigation strategies for active risks immediately");
            }
            if open_issues > 0 {
                out.push("Prioritize issue resolution and prevent new issues");
            }
        }
        HealthStatus::Critical => {
            out.push("Conduct emergency project review with stakeholders");
            out.push("Consider project restructuring or reset");
            out.push("Implement daily status meetings and tight monitoring");
            if blocked_tasks > 0 {
                out.push("Escalate blocked tasks to management for immediate action");
            }
            if active_risks > 0 {
                out.push("Reassess all project risks and implement mitigation measures");
            }
        }
    }
    out.into_iter().map(String::from).collect()
}
