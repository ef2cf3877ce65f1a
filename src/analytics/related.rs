//! Cross-project relatedness discovery.
//!
//! Starting from a seed project, walks outward through discovered
//! connections up to a depth bound, scoring each pair of projects by
//! what they share. The walk is iterative with a visited set, so a
//! tangle of mutually connected projects still terminates, and each
//! project is reported at most once per run.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::Serialize;

use crate::analytics::require_entity;
use crate::error::Result;
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

/// Primary label for a connection, in descending precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Dependency,
    SharedTeam,
    SharedResources,
    SharedStakeholders,
    Related,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedEntities {
    pub team_members: Vec<String>,
    pub dependencies: Vec<String>,
    pub resources: Vec<String>,
    pub stakeholders: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConnection {
    pub project: Entity,
    pub connection_type: ConnectionType,
    pub connection_strength: f64,
    pub shared_entities: SharedEntities,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedSummary {
    pub total_related: usize,
    pub by_connection_type: BTreeMap<String, usize>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedProjects {
    pub project: Entity,
    pub related_projects: Vec<ProjectConnection>,
    pub summary: RelatedSummary,
}

/// Discover projects connected to `project_name`, directly or through
/// intermediate connected projects up to `depth` hops away.
///
/// Connection strength weighs shared team members at 2, shared
/// resources at 1.5, inter-project dependencies at 3, and shared
/// stakeholders at 1; zero-strength pairs are dropped.
pub fn related_projects(
    graph: &KnowledgeGraph,
    project_name: &str,
    depth: usize,
) -> Result<RelatedProjects> {
    let project = require_entity(graph, project_name, EntityType::Project, "Project")?;

    let mut connections: Vec<ProjectConnection> = Vec::new();
    let mut visited: HashSet<String> = HashSet::from([project_name.to_string()]);
    let mut frontier: VecDeque<(String, usize)> = VecDeque::new();
    frontier.push_back((project_name.to_string(), 1));

    while let Some((current, level)) = frontier.pop_front() {
        if level > depth {
            continue;
        }
        let candidates: Vec<&Entity> = graph
            .entities
            .iter()
            .filter(|e| e.entity_type == EntityType::Project && !visited.contains(&e.name))
            .collect();

        for candidate in candidates {
            visited.insert(candidate.name.clone());

            let shared = shared_entities(graph, &current, &candidate.name);
            let strength = shared.team_members.len() as f64 * 2.0
                + shared.resources.len() as f64 * 1.5
                + shared.dependencies.len() as f64 * 3.0
                + shared.stakeholders.len() as f64;
            if strength <= 0.0 {
                continue;
            }

            let connection_type = if !shared.dependencies.is_empty() {
                ConnectionType::Dependency
            } else if !shared.team_members.is_empty() {
                ConnectionType::SharedTeam
            } else if !shared.resources.is_empty() {
                ConnectionType::SharedResources
            } else if !shared.stakeholders.is_empty() {
                ConnectionType::SharedStakeholders
            } else {
                ConnectionType::Related
            };

            connections.push(ProjectConnection {
                project: candidate.clone(),
                connection_type,
                connection_strength: strength,
                shared_entities: shared,
            });
            frontier.push_back((candidate.name.clone(), level + 1));
        }
    }

    connections.sort_by(|a, b| {
        b.connection_strength
            .partial_cmp(&a.connection_strength)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut by_connection_type: BTreeMap<String, usize> = BTreeMap::new();
    for label in [
        ConnectionType::Dependency,
        ConnectionType::SharedTeam,
        ConnectionType::SharedResources,
        ConnectionType::SharedStakeholders,
    ] {
        let count = connections
            .iter()
            .filter(|c| c.connection_type == label)
            .count();
        by_connection_type.insert(label_name(label).to_string(), count);
    }

    Ok(RelatedProjects {
        project: project.clone(),
        summary: RelatedSummary {
            total_related: connections.len(),
            by_connection_type,
            max_depth: depth,
        },
        related_projects: connections,
    })
}

fn label_name(label: ConnectionType) -> &'static str {
    match label {
        ConnectionType::Dependency => "dependency",
        ConnectionType::SharedTeam => "shared_team",
        ConnectionType::SharedResources => "shared_resources",
        ConnectionType::SharedStakeholders => "shared_stakeholders",
        ConnectionType::Related => "related",
    }
}

fn shared_entities(graph: &KnowledgeGraph, a: &str, b: &str) -> SharedEntities {
    let team_a = linked_members(graph, a);
    let team_members: Vec<String> = linked_members(graph, b)
        .into_iter()
        .filter(|m| team_a.contains(m))
        .collect();

    let resources_a = project_members(graph, a, EntityType::Resource);
    let resources: Vec<String> = project_members(graph, b, EntityType::Resource)
        .into_iter()
        .filter(|r| resources_a.contains(r))
        .collect();

    let stakeholders_a = linked_by(graph, a, RelationType::StakeholderOf, EntityType::Stakeholder);
    let stakeholders: Vec<String> =
        linked_by(graph, b, RelationType::StakeholderOf, EntityType::Stakeholder)
            .into_iter()
            .filter(|s| stakeholders_a.contains(s))
            .collect();

    // Direct depends_on edges between the two projects, either way.
    let dependencies: Vec<String> = graph
        .relations
        .iter()
        .filter(|r| r.relation_type == RelationType::DependsOn)
        .filter_map(|r| {
            if r.from == a && r.to == b {
                Some(b.to_string())
            } else if r.from == b && r.to == a {
                Some(a.to_string())
            } else {
                None
            }
        })
        .collect();

    SharedEntities {
        team_members,
        dependencies,
        resources,
        stakeholders,
    }
}

fn linked_members(graph: &KnowledgeGraph, project: &str) -> HashSet<String> {
    graph
        .relations
        .iter()
        .filter(|r| {
            r.to == project
                && matches!(
                    r.relation_type,
                    RelationType::AssignedTo | RelationType::ContributesTo | RelationType::Manages
                )
        })
        .filter_map(|r| graph.entity_of_type(&r.from, EntityType::TeamMember))
        .map(|m| m.name.clone())
        .collect()
}

fn project_members(
    graph: &KnowledgeGraph,
    project: &str,
    entity_type: EntityType,
) -> HashSet<String> {
    graph
        .members_of(project, RelationType::PartOf, entity_type)
        .into_iter()
        .map(|e| e.name.clone())
        .collect()
}

fn linked_by(
    graph: &KnowledgeGraph,
    project: &str,
    relation_type: RelationType,
    entity_type: EntityType,
) -> HashSet<String> {
    graph
        .members_of(project, relation_type, entity_type)
        .into_iter()
        .map(|e| e.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::Relation;

    fn two_projects() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::default();
        graph.entities.push(Entity::new("P1", EntityType::Project));
        graph.entities.push(Entity::new("P2", EntityType::Project));
        graph
    }

    fn share_member(graph: &mut KnowledgeGraph, member: &str, projects: &[&str]) {
        graph
            .entities
            .push(Entity::new(member, EntityType::TeamMember));
        for project in projects {
            graph
                .relations
                .push(Relation::new(member, RelationType::ContributesTo, *project));
        }
    }

    #[test]
    fn test_shared_member_scores_two() {
        let mut graph = two_projects();
        share_member(&mut graph, "Alice", &["P1", "P2"]);

        let report = related_projects(&graph, "P1", 1).unwrap();
        assert_eq!(report.related_projects.len(), 1);
        let connection = &report.related_projects[0];
        assert_eq!(connection.connection_strength, 2.0);
        assert_eq!(connection.connection_type, ConnectionType::SharedTeam);
        assert_eq!(connection.shared_entities.team_members, vec!["Alice".to_string()]);
    }

    #[test]
    fn test_dependency_outranks_shared_team() {
        let mut graph = two_projects();
        share_member(&mut graph, "Alice", &["P1", "P2"]);
        graph
            .relations
            .push(Relation::new("P1", RelationType::DependsOn, "P2"));

        let report = related_projects(&graph, "P1", 1).unwrap();
        let connection = &report.related_projects[0];
        assert_eq!(connection.connection_type, ConnectionType::Dependency);
        assert_eq!(connection.connection_strength, 5.0);
    }

    #[test]
    fn test_unconnected_projects_excluded() {
        let graph = two_projects();
        let report = related_projects(&graph, "P1", 1).unwrap();
        assert!(report.related_projects.is_empty());
    }

    #[test]
    fn test_depth_two_reaches_transitive_projects() {
        let mut graph = two_projects();
        graph.entities.push(Entity::new("P3", EntityType::Project));
        share_member(&mut graph, "Alice", &["P1", "P2"]);
        share_member(&mut graph, "Bob", &["P2", "P3"]);

        let shallow = related_projects(&graph, "P1", 1).unwrap();
        assert_eq!(shallow.related_projects.len(), 1);

        let deep = related_projects(&graph, "P1", 2).unwrap();
        let names: Vec<_> = deep
            .related_projects
            .iter()
            .map(|c| c.project.name.as_str())
            .collect();
        assert!(names.contains(&"P2"));
        assert!(names.contains(&"P3"));
    }

    #[test]
    fn test_mutual_connections_terminate() {
        let mut graph = two_projects();
        graph
            .relations
            .push(Relation::new("P1", RelationType::DependsOn, "P2"));
        graph
            .relations
            .push(Relation::new("P2", RelationType::DependsOn, "P1"));

        let report = related_projects(&graph, "P1", 10).unwrap();
        assert_eq!(report.related_projects.len(), 1);
        // Both directions count toward the dependency weight.
        assert_eq!(report.related_projects[0].connection_strength, 6.0);
    }

    #[test]
    fn test_sorted_by_strength() {
        let mut graph = two_projects();
        graph.entities.push(Entity::new("P3", EntityType::Project));
        share_member(&mut graph, "Alice", &["P1", "P2"]);
        graph
            .relations
            .push(Relation::new("P1", RelationType::DependsOn, "P3"));

        let report = related_projects(&graph, "P1", 1).unwrap();
        assert_eq!(report.related_projects[0].project.name, "P3");
        assert_eq!(report.summary.by_connection_type["dependency"], 1);
        assert_eq!(report.summary.by_connection_type["shared_team"], 1);
    }
}
