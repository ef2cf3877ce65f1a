//! Project risk assessment.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analytics::{require_entity, status_or};
use crate::error::Result;
use crate::graph::observations::observation_value;
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInfo {
    pub description: Option<String>,
    pub likelihood: Option<String>,
    pub impact: Option<String>,
    pub status: String,
    pub mitigation: Option<String>,
    /// `likelihood × impact` when both parse as integers.
    pub risk_score: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEntry {
    pub risk: Entity,
    pub info: RiskInfo,
    pub affected_entities: Vec<Entity>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub total_risks: usize,
    pub high_priority_count: usize,
    pub mitigated_count: usize,
    pub avoided_count: usize,
    pub accepted_count: usize,
    pub occurred_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRisks {
    pub project: Entity,
    pub risks: Vec<RiskEntry>,
    pub risks_by_status: BTreeMap<String, Vec<String>>,
    pub summary: RiskSummary,
    pub high_priority_risks: Vec<String>,
}

/// Score and rank a project's risks.
///
/// A risk is high priority when its numeric score reaches 15, or, with
/// no numeric score, when its likelihood or impact reads literally
/// "high". Risks sort by score descending with unscored risks last.
pub fn project_risks(graph: &KnowledgeGraph, project_name: &str) -> Result<ProjectRisks> {
    let project = require_entity(graph, project_name, EntityType::Project, "Project")?;

    let risks = graph.members_of(project_name, RelationType::PartOf, EntityType::Risk);
    let total_risks = risks.len();

    let mut entries: Vec<RiskEntry> = risks
        .into_iter()
        .map(|risk| {
            let likelihood = observation_value(risk, "Likelihood").map(String::from);
            let impact = observation_value(risk, "Impact").map(String::from);
            let risk_score = match (
                likelihood.as_deref().and_then(|v| v.parse::<i64>().ok()),
                impact.as_deref().and_then(|v| v.parse::<i64>().ok()),
            ) {
                (Some(l), Some(i)) => Some(l * i),
                _ => None,
            };

            let affected_entities: Vec<Entity> = graph
                .relations_to(&risk.name, RelationType::ImpactedBy)
                .filter_map(|r| graph.entity(&r.from))
                .cloned()
                .collect();

            RiskEntry {
                info: RiskInfo {
                    description: observation_value(risk, "Description").map(String::from),
                    likelihood,
                    impact,
                    status: status_or(risk, "identified").to_string(),
                    mitigation: observation_value(risk, "Mitigation").map(String::from),
                    risk_score,
                },
                affected_entities,
                risk: risk.clone(),
            }
        })
        .collect();

    // Descending by score, None last.
    entries.sort_by(|a, b| match (a.info.risk_score, b.info.risk_score) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut risks_by_status: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in &entries {
        risks_by_status
            .entry(entry.info.status.clone())
            .or_default()
            .push(entry.risk.name.clone());
    }

    let high_priority_risks: Vec<String> = entries
        .iter()
        .filter(|e| match e.info.risk_score {
            Some(score) => score >= 15,
            None => {
                e.info.impact.as_deref() == Some("high")
                    || e.info.likelihood.as_deref() == Some("high")
            }
        })
        .map(|e| e.risk.name.clone())
        .collect();

    let count_status = |status: &str| risks_by_status.get(status).map_or(0, |r| r.len());

    Ok(ProjectRisks {
        project: project.clone(),
        summary: RiskSummary {
            total_risks,
            high_priority_count: high_priority_risks.len(),
            mitigated_count: count_status("mitigating"),
            avoided_count: count_status("avoided"),
            accepted_count: count_status("accepted"),
            occurred_count: count_status("occurred"),
        },
        risks: entries,
        risks_by_status,
        high_priority_risks,
    })
}
