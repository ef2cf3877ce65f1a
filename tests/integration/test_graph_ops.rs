//! End-to-end graph CRUD tests over a file-backed store.

use std::sync::Arc;

use tempfile::TempDir;

use trellis::{
    Entity, EntityType, FileGraphStore, GraphManager, ObservationDeletion, PriorityValue,
    Relation, RelationType, StatusValue, TrellisError,
};

fn manager_in(dir: &TempDir) -> GraphManager {
    let store = FileGraphStore::new(dir.path().join("graph.json"));
    GraphManager::new(Arc::new(store))
}

#[tokio::test]
async fn test_entities_survive_manager_restart() {
    let dir = TempDir::new().unwrap();

    {
        let manager = manager_in(&dir);
        manager
            .create_entities(vec![
                Entity::new("Apollo", EntityType::Project),
                Entity::new("Design API", EntityType::Task),
            ])
            .await
            .unwrap();
        manager
            .create_relations(vec![Relation::new(
                "Design API",
                RelationType::PartOf,
                "Apollo",
            )])
            .await
            .unwrap();
    }

    // A fresh manager over the same path sees the persisted graph.
    let manager = manager_in(&dir);
    let graph = manager.read_graph().await.unwrap();
    assert_eq!(graph.entities.len(), 2);
    assert_eq!(graph.relations.len(), 1);
}

#[tokio::test]
async fn test_duplicate_name_rejects_batch_and_leaves_graph_unchanged() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![Entity::new("Apollo", EntityType::Project)])
        .await
        .unwrap();

    let err = manager
        .create_entities(vec![
            Entity::new("Fresh Task", EntityType::Task),
            Entity::new("Apollo", EntityType::Task),
        ])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Apollo"));

    // The valid entity in the failed batch must not have been applied.
    let graph = manager.read_graph().await.unwrap();
    assert_eq!(graph.entities.len(), 1);
}

#[tokio::test]
async fn test_relation_to_unknown_entity_fails() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![Entity::new("Apollo", EntityType::Project)])
        .await
        .unwrap();

    let err = manager
        .create_relations(vec![Relation::new(
            "Ghost Task",
            RelationType::PartOf,
            "Apollo",
        )])
        .await
        .unwrap_err();
    assert!(matches!(err, TrellisError::Graph(_)));
    assert!(err.to_string().contains("Ghost Task"));

    let graph = manager.read_graph().await.unwrap();
    assert!(graph.relations.is_empty());
}

#[tokio::test]
async fn test_delete_entity_cascades_to_relations() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project),
            Entity::new("Design API", EntityType::Task),
            Entity::new("Build API", EntityType::Task),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![
            Relation::new("Design API", RelationType::PartOf, "Apollo"),
            Relation::new("Build API", RelationType::DependsOn, "Design API"),
        ])
        .await
        .unwrap();

    manager
        .delete_entities(&["Design API".to_string()])
        .await
        .unwrap();

    let graph = manager.read_graph().await.unwrap();
    assert_eq!(graph.entities.len(), 2);
    assert!(
        graph.relations.is_empty(),
        "both relations touched the deleted entity"
    );

    let opened = manager
        .open_nodes(&["Design API".to_string()])
        .await
        .unwrap();
    assert!(opened.entities.is_empty());
}

#[tokio::test]
async fn test_set_status_replaces_previous_value() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![Entity::new("Design API", EntityType::Task)])
        .await
        .unwrap();

    manager
        .set_status("Design API", StatusValue::Active)
        .await
        .unwrap();
    manager
        .set_status("Design API", StatusValue::Blocked)
        .await
        .unwrap();

    assert_eq!(
        manager.get_status("Design API").await.unwrap(),
        Some(StatusValue::Blocked)
    );

    // Exactly one has_status edge remains.
    let graph = manager.read_graph().await.unwrap();
    let status_edges = graph
        .relations
        .iter()
        .filter(|r| r.from == "Design API" && r.relation_type == RelationType::HasStatus)
        .count();
    assert_eq!(status_edges, 1);
}

#[tokio::test]
async fn test_set_priority_and_unset_defaults() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![Entity::new("Design API", EntityType::Task)])
        .await
        .unwrap();

    assert_eq!(manager.get_status("Design API").await.unwrap(), None);
    assert_eq!(manager.get_priority("Design API").await.unwrap(), None);

    manager
        .set_priority("Design API", PriorityValue::High)
        .await
        .unwrap();
    assert_eq!(
        manager.get_priority("Design API").await.unwrap(),
        Some(PriorityValue::High)
    );

    // The synthetic value entity was created on demand.
    let graph = manager.read_graph().await.unwrap();
    assert!(graph.has_entity("priority:high"));
}

#[tokio::test]
async fn test_initialize_status_and_priority_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager.initialize_status_and_priority().await.unwrap();
    manager.initialize_status_and_priority().await.unwrap();

    // 5 status values + 2 priority values, created once.
    let graph = manager.read_graph().await.unwrap();
    assert_eq!(graph.entities.len(), 7);
}

#[tokio::test]
async fn test_observations_add_and_delete() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Design API", EntityType::Task).with_observation("DueDate: 2026-10-01")
        ])
        .await
        .unwrap();
    manager
        .add_observations(
            "Design API",
            vec!["Assignee: dana".to_string(), "Estimate: 3d".to_string()],
        )
        .await
        .unwrap();

    manager
        .delete_observations(&[ObservationDeletion {
            entity_name: "Design API".to_string(),
            observations: vec![
                "Estimate: 3d".to_string(),
                "Never existed".to_string(), // silently skipped
            ],
        }])
        .await
        .unwrap();

    let graph = manager.read_graph().await.unwrap();
    let entity = graph.entity("Design API").unwrap();
    assert_eq!(
        entity.observations,
        vec!["DueDate: 2026-10-01", "Assignee: dana"]
    );
}

#[tokio::test]
async fn test_search_matches_names_types_and_observations() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project),
            Entity::new("Design API", EntityType::Task).with_observation("Owner: dana"),
            Entity::new("Unrelated", EntityType::Note),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![Relation::new(
            "Design API",
            RelationType::PartOf,
            "Apollo",
        )])
        .await
        .unwrap();

    // Case-insensitive substring over observations.
    let found = manager.search_nodes("DANA").await.unwrap();
    assert_eq!(found.entities.len(), 1);
    assert_eq!(found.entities[0].name, "Design API");

    // Entity-type matches pull in the typed entities.
    let tasks = manager.search_nodes("task").await.unwrap();
    assert!(tasks.entities.iter().any(|e| e.name == "Design API"));
    assert!(!tasks.entities.iter().any(|e| e.name == "Unrelated"));
}

#[tokio::test]
async fn test_duplicate_relation_triple_rejected() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project),
            Entity::new("Design API", EntityType::Task),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![Relation::new(
            "Design API",
            RelationType::PartOf,
            "Apollo",
        )])
        .await
        .unwrap();

    let err = manager
        .create_relations(vec![Relation::new(
            "Design API",
            RelationType::PartOf,
            "Apollo",
        )])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // A different type between the same endpoints is a new triple.
    manager
        .create_relations(vec![Relation::new(
            "Design API",
            RelationType::RelatedTo,
            "Apollo",
        )])
        .await
        .unwrap();

    let graph = manager.read_graph().await.unwrap();
    assert_eq!(graph.relations.len(), 2);
}
