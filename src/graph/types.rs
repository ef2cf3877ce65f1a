//! Core types for the knowledge graph.
//!
//! This module defines the entities and typed relations that form the
//! project-management graph, together with the closed enums that govern
//! which entity types, relation types, and attribute values are legal.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

// ============================================================================
// Entity
// ============================================================================

/// A node in the knowledge graph.
///
/// Entities are keyed by their globally unique `name` and carry free-text
/// observations. By convention many observations are `"Key: value"` pairs
/// (Description, Date, DueDate, Status, ...) that the analytics layer
/// parses positionally; that convention is not enforced structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Globally unique name, the primary key across all entity types.
    pub name: String,
    /// The type of entity.
    #[serde(rename = "entityType")]
    pub entity_type: EntityType,
    /// Ordered free-text facts about the entity.
    pub observations: Vec<String>,
    /// Optional embedding vector, reserved for semantic lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Entity {
    /// Create a new entity with no observations.
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            name: name.into(),
            entity_type,
            observations: Vec::new(),
            embedding: None,
        }
    }

    /// Append an observation.
    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observations.push(observation.into());
        self
    }

    /// Append multiple observations.
    pub fn with_observations(
        mut self,
        observations: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.observations
            .extend(observations.into_iter().map(|o| o.into()));
        self
    }
}

/// The type classification of an entity.
///
/// Serialized camelCase to match the persisted graph document
/// (`teamMember`; single-word variants come out lowercase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    /// A project requiring multiple tasks to complete.
    Project,
    /// A unit of work within a project.
    Task,
    /// A dated checkpoint a project works toward.
    Milestone,
    /// Equipment, budget, or other allocatable resource.
    Resource,
    /// A person doing project work.
    TeamMember,
    /// A free-form note.
    Note,
    /// Reference material.
    Document,
    /// A problem under investigation.
    Issue,
    /// A potential future problem with likelihood and impact.
    Risk,
    /// A recorded decision with rationale.
    Decision,
    /// An external dependency.
    Dependency,
    /// A structural piece of a project.
    Component,
    /// An interested external party.
    Stakeholder,
    /// A change request.
    Change,
    /// Synthetic value entity backing `has_status` relations.
    Status,
    /// Synthetic value entity backing `has_priority` relations.
    Priority,
}

impl EntityType {
    /// All legal entity types.
    pub const ALL: [EntityType; 16] = [
        EntityType::Project,
        EntityType::Task,
        EntityType::Milestone,
        EntityType::Resource,
        EntityType::TeamMember,
        EntityType::Note,
        EntityType::Document,
        EntityType::Issue,
        EntityType::Risk,
        EntityType::Decision,
        EntityType::Dependency,
        EntityType::Component,
        EntityType::Stakeholder,
        EntityType::Change,
        EntityType::Status,
        EntityType::Priority,
    ];

    /// The wire name of this type (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Project => "project",
            EntityType::Task => "task",
            EntityType::Milestone => "milestone",
            EntityType::Resource => "resource",
            EntityType::TeamMember => "teamMember",
            EntityType::Note => "note",
            EntityType::Document => "document",
            EntityType::Issue => "issue",
            EntityType::Risk => "risk",
            EntityType::Decision => "decision",
            EntityType::Dependency => "dependency",
            EntityType::Component => "component",
            EntityType::Stakeholder => "stakeholder",
            EntityType::Change => "change",
            EntityType::Status => "status",
            EntityType::Priority => "priority",
        }
    }

    fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GraphError::InvalidEntityType {
                given: s.to_string(),
                valid: Self::valid_list(),
            })
    }
}

// ============================================================================
// Relation
// ============================================================================

/// A typed directed edge between two entities, referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Name of the source entity.
    pub from: String,
    /// Name of the target entity.
    pub to: String,
    /// Type of relation.
    #[serde(rename = "relationType")]
    pub relation_type: RelationType,
    /// Optional free-text facts about the relation itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<Vec<String>>,
}

impl Relation {
    /// Create a new relation without observations.
    pub fn new(
        from: impl Into<String>,
        relation_type: RelationType,
        to: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type,
            observations: None,
        }
    }

    /// Check whether this relation has the same `(from, to, type)` triple
    /// as another. Triples are the uniqueness key for relations.
    pub fn same_triple(&self, other: &Relation) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.relation_type == other.relation_type
    }
}

/// The type of relation between entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Entity is a constituent of a project (tasks, milestones, risks, ...).
    PartOf,
    /// Completion of `to` is required before `from` can proceed.
    DependsOn,
    /// Task is assigned to a team member, or a person to a project.
    AssignedTo,
    /// Entity was authored by a team member.
    CreatedBy,
    /// Entity was last changed by a team member.
    ModifiedBy,
    /// Loose association between entities.
    RelatedTo,
    /// Entity prevents progress on another.
    Blocks,
    /// Team member manages a project.
    Manages,
    /// Team member contributes to a project.
    ContributesTo,
    /// Document describes an entity.
    Documents,
    /// Entity is scheduled for a milestone or date.
    ScheduledFor,
    /// Team member owns an entity.
    ResponsibleFor,
    /// Team member reports to another.
    ReportsTo,
    /// Entity belongs to a category.
    CategorizedAs,
    /// Task must complete before a milestone is reached.
    RequiredFor,
    /// Issue was found in a component.
    DiscoveredIn,
    /// Issue was fixed by a change or team member.
    ResolvedBy,
    /// Entity is affected by a risk or decision.
    ImpactedBy,
    /// Stakeholder has an interest in a project.
    StakeholderOf,
    /// Entity carries a priority categorization.
    PrioritizedAs,
    /// Attribute edge to a synthetic `status:<value>` entity.
    HasStatus,
    /// Attribute edge to a synthetic `priority:<value>` entity.
    HasPriority,
    /// Ordering constraint between tasks.
    Precedes,
    /// Team member uses a resource.
    Uses,
    /// Task requires a resource.
    Requires,
    /// Change resolves an issue.
    Resolves,
}

impl RelationType {
    /// All legal relation types.
    pub const ALL: [RelationType; 26] = [
        RelationType::PartOf,
        RelationType::DependsOn,
        RelationType::AssignedTo,
        RelationType::CreatedBy,
        RelationType::ModifiedBy,
        RelationType::RelatedTo,
        RelationType::Blocks,
        RelationType::Manages,
        RelationType::ContributesTo,
        RelationType::Documents,
        RelationType::ScheduledFor,
        RelationType::ResponsibleFor,
        RelationType::ReportsTo,
        RelationType::CategorizedAs,
        RelationType::RequiredFor,
        RelationType::DiscoveredIn,
        RelationType::ResolvedBy,
        RelationType::ImpactedBy,
        RelationType::StakeholderOf,
        RelationType::PrioritizedAs,
        RelationType::HasStatus,
        RelationType::HasPriority,
        RelationType::Precedes,
        RelationType::Uses,
        RelationType::Requires,
        RelationType::Resolves,
    ];

    /// The wire name of this type (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::PartOf => "part_of",
            RelationType::DependsOn => "depends_on",
            RelationType::AssignedTo => "assigned_to",
            RelationType::CreatedBy => "created_by",
            RelationType::ModifiedBy => "modified_by",
            RelationType::RelatedTo => "related_to",
            RelationType::Blocks => "blocks",
            RelationType::Manages => "manages",
            RelationType::ContributesTo => "contributes_to",
            RelationType::Documents => "documents",
            RelationType::ScheduledFor => "scheduled_for",
            RelationType::ResponsibleFor => "responsible_for",
            RelationType::ReportsTo => "reports_to",
            RelationType::CategorizedAs => "categorized_as",
            RelationType::RequiredFor => "required_for",
            RelationType::DiscoveredIn => "discovered_in",
            RelationType::ResolvedBy => "resolved_by",
            RelationType::ImpactedBy => "impacted_by",
            RelationType::StakeholderOf => "stakeholder_of",
            RelationType::PrioritizedAs => "prioritized_as",
            RelationType::HasStatus => "has_status",
            RelationType::HasPriority => "has_priority",
            RelationType::Precedes => "precedes",
            RelationType::Uses => "uses",
            RelationType::Requires => "requires",
            RelationType::Resolves => "resolves",
        }
    }

    fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RelationType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GraphError::InvalidRelationType {
                given: s.to_string(),
                valid: Self::valid_list(),
            })
    }
}

// ============================================================================
// Attribute value enums
// ============================================================================

/// Legal values for the `has_status` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusValue {
    Active,
    Completed,
    Pending,
    Blocked,
    Cancelled,
}

impl StatusValue {
    /// All legal status values.
    pub const ALL: [StatusValue; 5] = [
        StatusValue::Active,
        StatusValue::Completed,
        StatusValue::Pending,
        StatusValue::Blocked,
        StatusValue::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusValue::Active => "active",
            StatusValue::Completed => "completed",
            StatusValue::Pending => "pending",
            StatusValue::Blocked => "blocked",
            StatusValue::Cancelled => "cancelled",
        }
    }

    /// Name of the synthetic value entity backing this status.
    pub fn entity_name(&self) -> String {
        format!("status:{}", self.as_str())
    }

    fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StatusValue {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| GraphError::InvalidStatus {
                given: s.to_string(),
                valid: Self::valid_list(),
            })
    }
}

/// Legal values for the `has_priority` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityValue {
    High,
    Low,
}

impl PriorityValue {
    /// All legal priority values.
    pub const ALL: [PriorityValue; 2] = [PriorityValue::High, PriorityValue::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityValue::High => "high",
            PriorityValue::Low => "low",
        }
    }

    /// Name of the synthetic value entity backing this priority.
    pub fn entity_name(&self) -> String {
        format!("priority:{}", self.as_str())
    }

    fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for PriorityValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PriorityValue {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| GraphError::InvalidPriority {
                given: s.to_string(),
                valid: Self::valid_list(),
            })
    }
}

// ============================================================================
// Graph aggregate
// ============================================================================

/// The whole graph, the unit of persistence.
///
/// Loaded in full by the persistence gateway, mutated in place by the
/// graph manager, and written back whole. Nothing holds a graph across
/// operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
}

impl KnowledgeGraph {
    /// Look up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Look up an entity by name, requiring a specific type.
    pub fn entity_of_type(&self, name: &str, entity_type: EntityType) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.name == name && e.entity_type == entity_type)
    }

    /// Mutable entity lookup by name.
    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.name == name)
    }

    /// Whether an entity with this name exists.
    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.iter().any(|e| e.name == name)
    }

    /// Whether a relation with this exact triple exists.
    pub fn has_triple(&self, relation: &Relation) -> bool {
        self.relations.iter().any(|r| r.same_triple(relation))
    }

    /// All relations of a given type originating at `from`.
    pub fn relations_from<'a>(
        &'a self,
        from: &'a str,
        relation_type: RelationType,
    ) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations
            .iter()
            .filter(move |r| r.relation_type == relation_type && r.from == from)
    }

    /// All relations of a given type pointing at `to`.
    pub fn relations_to<'a>(
        &'a self,
        to: &'a str,
        relation_type: RelationType,
    ) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations
            .iter()
            .filter(move |r| r.relation_type == relation_type && r.to == to)
    }

    /// Entities of `entity_type` linked to `target` by a `relation_type`
    /// edge pointing at `target`. This is the join every report builder
    /// uses to collect a project's tasks, milestones, risks, and so on.
    pub fn members_of<'a>(
        &'a self,
        target: &'a str,
        relation_type: RelationType,
        entity_type: EntityType,
    ) -> Vec<&'a Entity> {
        self.relations_to(target, relation_type)
            .filter_map(|r| self.entity_of_type(&r.from, entity_type))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_round_trip() {
        for t in EntityType::ALL {
            assert_eq!(t.as_str().parse::<EntityType>().unwrap(), t);
        }
        assert_eq!("teamMember".parse::<EntityType>().unwrap(), EntityType::TeamMember);
        assert!("widget".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_entity_type_serde_matches_wire_names() {
        for t in EntityType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_relation_type_round_trip() {
        for t in RelationType::ALL {
            assert_eq!(t.as_str().parse::<RelationType>().unwrap(), t);
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_status_value_entity_name() {
        assert_eq!(StatusValue::Completed.entity_name(), "status:completed");
        assert_eq!(PriorityValue::High.entity_name(), "priority:high");
    }

    #[test]
    fn test_invalid_status_lists_values() {
        let err = "done".parse::<StatusValue>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("done"));
        assert!(msg.contains("completed"));
    }

    #[test]
    fn test_same_triple_ignores_observations() {
        let mut a = Relation::new("T1", RelationType::DependsOn, "T2");
        let b = Relation::new("T1", RelationType::DependsOn, "T2");
        a.observations = Some(vec!["added during planning".to_string()]);
        assert!(a.same_triple(&b));
    }

    #[test]
    fn test_graph_lookups() {
        let graph = KnowledgeGraph {
            entities: vec![
                Entity::new("P1", EntityType::Project),
                Entity::new("T1", EntityType::Task),
            ],
            relations: vec![Relation::new("T1", RelationType::PartOf, "P1")],
        };

        assert!(graph.has_entity("T1"));
        assert!(graph.entity_of_type("T1", EntityType::Task).is_some());
        assert!(graph.entity_of_type("T1", EntityType::Project).is_none());

        let tasks = graph.members_of("P1", RelationType::PartOf, EntityType::Task);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "T1");
    }

    #[test]
    fn test_entity_json_shape() {
        let entity = Entity::new("Alice", EntityType::TeamMember).with_observation("Role: Lead");
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["entityType"], "teamMember");
        assert_eq!(json["observations"][0], "Role: Lead");
    }
}
