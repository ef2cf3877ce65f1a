//! Project decision log.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analytics::{require_entity, status_or};
use crate::error::Result;
use crate::graph::observations::{observation_value, parse_date};
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionInfo {
    pub description: Option<String>,
    pub date: Option<String>,
    pub status: String,
    pub rationale: Option<String>,
    pub alternatives: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionEntry {
    pub decision: Entity,
    pub info: DecisionInfo,
    pub involved_team_members: Vec<Entity>,
    pub affected_entities: Vec<Entity>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSummary {
    pub total_decisions: usize,
    pub approved_count: usize,
    pub implemented_count: usize,
    pub rejected_count: usize,
    pub proposed_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionLog {
    pub project: Entity,
    pub decisions: Vec<DecisionEntry>,
    pub decisions_by_status: BTreeMap<String, Vec<String>>,
    pub summary: DecisionSummary,
}

/// The project's decisions, most recent first, with who made them and
/// what they touched.
pub fn decision_log(graph: &KnowledgeGraph, project_name: &str) -> Result<DecisionLog> {
    let project = require_entity(graph, project_name, EntityType::Project, "Project")?;

    let decisions = graph.members_of(project_name, RelationType::PartOf, EntityType::Decision);
    let total_decisions = decisions.len();

    let mut entries: Vec<DecisionEntry> = decisions
        .into_iter()
        .map(|decision| {
            let involved_team_members: Vec<Entity> = graph
                .relations_from(&decision.name, RelationType::CreatedBy)
                .filter_map(|r| graph.entity_of_type(&r.to, EntityType::TeamMember))
                .cloned()
                .collect();

            let affected_entities: Vec<Entity> = graph
                .relations_to(&decision.name, RelationType::ImpactedBy)
                .filter_map(|r| graph.entity(&r.from))
                .cloned()
                .collect();

            DecisionEntry {
                info: DecisionInfo {
                    description: observation_value(decision, "Description").map(String::from),
                    date: observation_value(decision, "Date").map(String::from),
                    status: status_or(decision, "proposed").to_string(),
                    rationale: observation_value(decision, "Rationale").map(String::from),
                    alternatives: observation_value(decision, "Alternatives").map(String::from),
                },
                involved_team_members,
                affected_entities,
                decision: decision.clone(),
            }
        })
        .collect();

    // Most recent first; undated decisions last.
    entries.sort_by(|a, b| {
        let a_date = a.info.date.as_deref().and_then(parse_date);
        let b_date = b.info.date.as_deref().and_then(parse_date);
        match (a_date, b_date) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });

    let mut decisions_by_status: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in &entries {
        decisions_by_status
            .entry(entry.info.status.clone())
            .or_default()
            .push(entry.decision.name.clone());
    }
    let count_status = |status: &str| decisions_by_status.get(status).map_or(0, |d| d.len());

    Ok(DecisionLog {
        project: project.clone(),
        summary: DecisionSummary {
            total_decisions,
            approved_count: count_status("approved"),
            implemented_count: count_status("implemented"),
            rejected_count: count_status("rejected"),
            proposed_count: count_status("proposed"),
        },
        decisions: entries,
        decisions_by_status,
    })
}
