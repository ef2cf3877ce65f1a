//! Graph manager.
//!
//! [`GraphManager`] is the single entry point for mutating and reading
//! the knowledge graph. Every operation loads the full graph from the
//! store, works on it, and (for mutations) saves it back, so the store
//! is always the source of truth and no graph state is held between
//! calls.
//!
//! Mutating batch operations validate the entire batch before applying
//! any of it. A batch that fails validation leaves the graph untouched.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::analytics;
use crate::analytics::{
    DecisionLog, MilestoneProgress, ProjectHealth, ProjectOverview, ProjectRisks,
    ProjectTimeline, RelatedProjects, ResourceAllocation, TaskDependencyReport,
    TeamMemberAssignments,
};
use crate::error::{GraphError, Result};
use crate::graph::query;
use crate::graph::store::GraphStore;
use crate::graph::types::{
    Entity, EntityType, KnowledgeGraph, PriorityValue, Relation, RelationType, StatusValue,
};

/// A request to remove specific observations from an entity.
#[derive(Debug, Clone)]
pub struct ObservationDeletion {
    pub entity_name: String,
    pub observations: Vec<String>,
}

/// Coordinates all graph reads and writes through a [`GraphStore`].
pub struct GraphManager {
    store: Arc<dyn GraphStore>,
}

impl GraphManager {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Entity and relation CRUD
    // ========================================================================

    /// Add a batch of new entities.
    ///
    /// Every name must be new, both against the stored graph and within
    /// the batch itself. On any duplicate the whole batch is rejected.
    pub async fn create_entities(&self, entities: Vec<Entity>) -> Result<KnowledgeGraph> {
        let mut graph = self.store.load().await?;

        for (i, entity) in entities.iter().enumerate() {
            let duplicate = graph.has_entity(&entity.name)
                || entities[..i].iter().any(|e| e.name == entity.name);
            if duplicate {
                return Err(GraphError::DuplicateName(entity.name.clone()).into());
            }
        }

        debug!(count = entities.len(), "creating entities");
        graph.entities.extend(entities);
        self.store.save(&graph).await?;
        Ok(graph)
    }

    /// Add a batch of new relations.
    ///
    /// Both endpoints of every relation must already exist, and no
    /// relation may repeat an existing `(from, to, type)` triple or one
    /// earlier in the batch. On any failure the whole batch is rejected.
    pub async fn create_relations(&self, relations: Vec<Relation>) -> Result<KnowledgeGraph> {
        let mut graph = self.store.load().await?;

        for (i, relation) in relations.iter().enumerate() {
            if !graph.has_entity(&relation.from) {
                return Err(GraphError::UnknownEntity(relation.from.clone()).into());
            }
            if !graph.has_entity(&relation.to) {
                return Err(GraphError::UnknownEntity(relation.to.clone()).into());
            }
            let duplicate = graph.has_triple(relation)
                || relations[..i].iter().any(|r| r.same_triple(relation));
            if duplicate {
                return Err(GraphError::DuplicateRelation {
                    from: relation.from.clone(),
                    to: relation.to.clone(),
                    relation_type: relation.relation_type.to_string(),
                }
                .into());
            }
        }

        debug!(count = relations.len(), "creating relations");
        graph.relations.extend(relations);
        self.store.save(&graph).await?;
        Ok(graph)
    }

    /// Append observations to an existing entity.
    pub async fn add_observations(
        &self,
        entity_name: &str,
        observations: Vec<String>,
    ) -> Result<KnowledgeGraph> {
        let mut graph = self.store.load().await?;

        let entity = graph
            .entity_mut(entity_name)
            .ok_or_else(|| GraphError::UnknownEntity(entity_name.to_string()))?;
        entity.observations.extend(observations);

        self.store.save(&graph).await?;
        Ok(graph)
    }

    /// Remove entities by name, cascading to every relation that touches
    /// them. Unknown names are ignored.
    pub async fn delete_entities(&self, entity_names: &[String]) -> Result<()> {
        let mut graph = self.store.load().await?;

        graph
            .entities
            .retain(|e| !entity_names.contains(&e.name));
        graph
            .relations
            .retain(|r| !entity_names.contains(&r.from) && !entity_names.contains(&r.to));

        self.store.save(&graph).await
    }

    /// Remove specific observations from entities. Unknown entities and
    /// observations that are not present are ignored.
    pub async fn delete_observations(&self, deletions: &[ObservationDeletion]) -> Result<()> {
        let mut graph = self.store.load().await?;

        for deletion in deletions {
            if let Some(entity) = graph.entity_mut(&deletion.entity_name) {
                entity
                    .observations
                    .retain(|o| !deletion.observations.contains(o));
            }
        }

        self.store.save(&graph).await
    }

    /// Remove relations matching the given `(from, to, type)` triples.
    /// Triples with no match are ignored.
    pub async fn delete_relations(&self, relations: &[Relation]) -> Result<()> {
        let mut graph = self.store.load().await?;

        graph
            .relations
            .retain(|r| !relations.iter().any(|rel| r.same_triple(rel)));

        self.store.save(&graph).await
    }

    // ========================================================================
    // Status and priority attributes
    // ========================================================================

    /// Seed the synthetic `status:*` and `priority:*` value entities.
    /// Safe to call repeatedly; existing value entities are left alone.
    pub async fn initialize_status_and_priority(&self) -> Result<()> {
        let mut graph = self.store.load().await?;

        for status in StatusValue::ALL {
            let name = status.entity_name();
            if graph.entity_of_type(&name, EntityType::Status).is_none() {
                graph.entities.push(
                    Entity::new(name, EntityType::Status)
                        .with_observation(format!("A {status} status value")),
                );
            }
        }
        for priority in PriorityValue::ALL {
            let name = priority.entity_name();
            if graph.entity_of_type(&name, EntityType::Priority).is_none() {
                graph.entities.push(
                    Entity::new(name, EntityType::Priority)
                        .with_observation(format!("A {priority} priority value")),
                );
            }
        }

        self.store.save(&graph).await
    }

    /// Set an entity's status, replacing any previous one.
    ///
    /// The status lives as a `has_status` relation to a synthetic value
    /// entity; the value entity is created on demand so the relation
    /// never dangles. The entity's `Status:` observation is rewritten to
    /// the same value so reports reading observations stay in agreement.
    pub async fn set_status(&self, entity_name: &str, status: StatusValue) -> Result<()> {
        let mut graph = self.store.load().await?;

        let entity = graph
            .entity_mut(entity_name)
            .ok_or_else(|| GraphError::UnknownEntity(entity_name.to_string()))?;
        entity.observations.retain(|o| !is_keyed(o, "Status"));
        entity.observations.push(format!("Status: {status}"));

        let value_name = status.entity_name();
        if graph.entity_of_type(&value_name, EntityType::Status).is_none() {
            graph.entities.push(
                Entity::new(value_name.clone(), EntityType::Status)
                    .with_observation(format!("A {status} status value")),
            );
        }

        graph
            .relations
            .retain(|r| !(r.from == entity_name && r.relation_type == RelationType::HasStatus));
        graph
            .relations
            .push(Relation::new(entity_name, RelationType::HasStatus, value_name));

        self.store.save(&graph).await
    }

    /// The entity's current status, if any has been set.
    pub async fn get_status(&self, entity_name: &str) -> Result<Option<StatusValue>> {
        let graph = self.store.load().await?;
        Ok(status_of(&graph, entity_name))
    }

    /// Set an entity's priority, replacing any previous one. Mirrors
    /// [`set_status`](Self::set_status), including the observation
    /// rewrite.
    pub async fn set_priority(&self, entity_name: &str, priority: PriorityValue) -> Result<()> {
        let mut graph = self.store.load().await?;

        let entity = graph
            .entity_mut(entity_name)
            .ok_or_else(|| GraphError::UnknownEntity(entity_name.to_string()))?;
        entity.observations.retain(|o| !is_keyed(o, "Priority"));
        entity.observations.push(format!("Priority: {priority}"));

        let value_name = priority.entity_name();
        if graph
            .entity_of_type(&value_name, EntityType::Priority)
            .is_none()
        {
            graph.entities.push(
                Entity::new(value_name.clone(), EntityType::Priority)
                    .with_observation(format!("A {priority} priority value")),
            );
        }

        graph
            .relations
            .retain(|r| !(r.from == entity_name && r.relation_type == RelationType::HasPriority));
        graph.relations.push(Relation::new(
            entity_name,
            RelationType::HasPriority,
            value_name,
        ));

        self.store.save(&graph).await
    }

    /// The entity's current priority, if any has been set.
    pub async fn get_priority(&self, entity_name: &str) -> Result<Option<PriorityValue>> {
        let graph = self.store.load().await?;
        Ok(priority_of(&graph, entity_name))
    }

    // ========================================================================
    // Reads and queries
    // ========================================================================

    /// The whole graph.
    pub async fn read_graph(&self) -> Result<KnowledgeGraph> {
        self.store.load().await
    }

    /// Case-insensitive substring search; see [`query::search_nodes`].
    pub async fn search_nodes(&self, q: &str) -> Result<KnowledgeGraph> {
        let graph = self.store.load().await?;
        Ok(query::search_nodes(&graph, q))
    }

    /// Exact-name lookup; see [`query::open_nodes`].
    pub async fn open_nodes(&self, names: &[String]) -> Result<KnowledgeGraph> {
        let graph = self.store.load().await?;
        Ok(query::open_nodes(&graph, names))
    }

    // ========================================================================
    // Reports
    // ========================================================================

    pub async fn project_overview(&self, project_name: &str) -> Result<ProjectOverview> {
        let graph = self.store.load().await?;
        analytics::overview::project_overview(&graph, project_name, Utc::now().date_naive())
    }

    pub async fn task_dependencies(
        &self,
        task_name: &str,
        depth: usize,
    ) -> Result<TaskDependencyReport> {
        let graph = self.store.load().await?;
        analytics::dependencies::task_dependencies(&graph, task_name, depth)
    }

    pub async fn team_member_assignments(
        &self,
        member_name: &str,
    ) -> Result<TeamMemberAssignments> {
        let graph = self.store.load().await?;
        analytics::assignments::team_member_assignments(
            &graph,
            member_name,
            Utc::now().date_naive(),
        )
    }

    pub async fn milestone_progress(
        &self,
        project_name: &str,
        milestone_name: Option<&str>,
    ) -> Result<MilestoneProgress> {
        let graph = self.store.load().await?;
        analytics::milestones::milestone_progress(
            &graph,
            project_name,
            milestone_name,
            Utc::now().date_naive(),
        )
    }

    pub async fn project_timeline(&self, project_name: &str) -> Result<ProjectTimeline> {
        let graph = self.store.load().await?;
        analytics::timeline::project_timeline(&graph, project_name, Utc::now().date_naive())
    }

    pub async fn resource_allocation(
        &self,
        project_name: &str,
        resource_name: Option<&str>,
    ) -> Result<ResourceAllocation> {
        let graph = self.store.load().await?;
        analytics::resources::resource_allocation(&graph, project_name, resource_name)
    }

    pub async fn project_risks(&self, project_name: &str) -> Result<ProjectRisks> {
        let graph = self.store.load().await?;
        analytics::risks::project_risks(&graph, project_name)
    }

    pub async fn related_projects(
        &self,
        project_name: &str,
        depth: usize,
    ) -> Result<RelatedProjects> {
        let graph = self.store.load().await?;
        analytics::related::related_projects(&graph, project_name, depth)
    }

    pub async fn decision_log(&self, project_name: &str) -> Result<DecisionLog> {
        let graph = self.store.load().await?;
        analytics::decisions::decision_log(&graph, project_name)
    }

    pub async fn project_health(&self, project_name: &str) -> Result<ProjectHealth> {
        let graph = self.store.load().await?;
        analytics::health::project_health(&graph, project_name, Utc::now().date_naive())
    }
}

/// Whether an observation is a `"Key: value"` pair with the given key.
fn is_keyed(observation: &str, key: &str) -> bool {
    observation
        .split_once(':')
        .is_some_and(|(k, _)| k.trim() == key)
}

/// Read an entity's status straight off a loaded graph.
pub fn status_of(graph: &KnowledgeGraph, entity_name: &str) -> Option<StatusValue> {
    graph
        .relations_from(entity_name, RelationType::HasStatus)
        .next()
        .and_then(|r| r.to.strip_prefix("status:"))
        .and_then(|v| v.parse().ok())
}

/// Read an entity's priority straight off a loaded graph.
pub fn priority_of(graph: &KnowledgeGraph, entity_name: &str) -> Option<PriorityValue> {
    graph
        .relations_from(entity_name, RelationType::HasPriority)
        .next()
        .and_then(|r| r.to.strip_prefix("priority:"))
        .and_then(|v| v.parse().ok())
}
