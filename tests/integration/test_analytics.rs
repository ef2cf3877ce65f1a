//! Report builders exercised through the manager over a file store.
//!
//! Date-sensitive assertions pin fixture dates far in the past or
//! future so they hold regardless of when the tests run.

use std::sync::Arc;

use tempfile::TempDir;

use trellis::{
    Entity, EntityType, FileGraphStore, GraphManager, Relation, RelationType, StatusValue,
};

fn manager_in(dir: &TempDir) -> GraphManager {
    let store = FileGraphStore::new(dir.path().join("graph.json"));
    GraphManager::new(Arc::new(store))
}

/// A project with two tasks (one completed), a milestone, and a member.
async fn seed_apollo(manager: &GraphManager) {
    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project)
                .with_observation("Description: Payments revamp")
                .with_observation("StartDate: 2020-01-01")
                .with_observation("EndDate: 2020-03-01")
                .with_observation("Status: active"),
            Entity::new("Design API", EntityType::Task)
                .with_observation("Status: completed")
                .with_observation("DueDate: 2020-01-20"),
            Entity::new("Build API", EntityType::Task).with_observation("DueDate: 2020-02-10"),
            Entity::new("API Complete", EntityType::Milestone)
                .with_observation("Date: 2099-06-01"),
            Entity::new("Dana", EntityType::TeamMember).with_observation("Role: Engineer"),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![
            Relation::new("Design API", RelationType::PartOf, "Apollo"),
            Relation::new("Build API", RelationType::PartOf, "Apollo"),
            Relation::new("API Complete", RelationType::PartOf, "Apollo"),
            Relation::new("Dana", RelationType::ContributesTo, "Apollo"),
            Relation::new("Design API", RelationType::AssignedTo, "Dana"),
            Relation::new("Build API", RelationType::AssignedTo, "Dana"),
            Relation::new("Build API", RelationType::DependsOn, "Design API"),
            Relation::new("Design API", RelationType::RequiredFor, "API Complete"),
            Relation::new("Build API", RelationType::RequiredFor, "API Complete"),
        ])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_overview_counts_and_groupings() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    seed_apollo(&manager).await;

    let report = manager.project_overview("Apollo").await.unwrap();

    assert_eq!(report.info.status, "active");
    assert_eq!(report.info.description.as_deref(), Some("Payments revamp"));
    assert_eq!(report.summary.task_count, 2);
    assert_eq!(report.summary.completed_tasks, 1);
    assert_eq!(report.summary.task_completion_rate, 50);
    assert_eq!(report.summary.milestone_count, 1);
    assert_eq!(report.summary.team_member_count, 1);

    // Grouped by Status: observation, defaulting to not_started.
    assert_eq!(report.tasks_by_status["completed"].len(), 1);
    assert_eq!(report.tasks_by_status["not_started"].len(), 1);

    // 2099 milestone is still upcoming.
    assert_eq!(report.upcoming_milestones.len(), 1);
}

#[tokio::test]
async fn test_set_status_flows_through_to_overview() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("P1", EntityType::Project),
            Entity::new("T1", EntityType::Task),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![Relation::new("T1", RelationType::PartOf, "P1")])
        .await
        .unwrap();
    manager
        .set_status("T1", StatusValue::Completed)
        .await
        .unwrap();

    let report = manager.project_overview("P1").await.unwrap();
    assert_eq!(report.summary.task_count, 1);
    assert_eq!(report.summary.completed_tasks, 1);
    assert_eq!(report.summary.task_completion_rate, 100);
}

#[tokio::test]
async fn test_overview_unknown_project_fails() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    seed_apollo(&manager).await;

    let err = manager.project_overview("Atlantis").await.unwrap_err();
    assert!(err.to_string().contains("Atlantis"));
}

#[tokio::test]
async fn test_dependency_tree_and_critical_path() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    // C depends on B depends on A.
    manager
        .create_entities(vec![
            Entity::new("A", EntityType::Task).with_observation("Status: completed"),
            Entity::new("B", EntityType::Task),
            Entity::new("C", EntityType::Task),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![
            Relation::new("C", RelationType::DependsOn, "B"),
            Relation::new("B", RelationType::DependsOn, "A"),
        ])
        .await
        .unwrap();

    let report = manager.task_dependencies("C", 3).await.unwrap();

    assert_eq!(report.dependencies.len(), 3);
    let level_of = |name: &str| {
        report
            .dependencies
            .iter()
            .find(|d| d.task.name == name)
            .unwrap()
            .level
    };
    assert_eq!(level_of("C"), 0);
    assert_eq!(level_of("B"), 1);
    assert_eq!(level_of("A"), 2);

    // Execution order: dependency before dependent.
    assert_eq!(report.critical_path, vec!["A", "B", "C"]);

    // B is incomplete, A is completed, so one blocker remains.
    assert_eq!(report.summary.total_dependencies, 2);
    assert_eq!(report.summary.blocked_by, 1);
}

#[tokio::test]
async fn test_dependency_cycle_terminates() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("A", EntityType::Task),
            Entity::new("B", EntityType::Task),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![
            Relation::new("A", RelationType::DependsOn, "B"),
            Relation::new("B", RelationType::DependsOn, "A"),
        ])
        .await
        .unwrap();

    let report = manager.task_dependencies("A", 5).await.unwrap();
    assert_eq!(report.dependencies.len(), 2);
}

#[tokio::test]
async fn test_assignments_workload_and_overdue() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    seed_apollo(&manager).await;

    let report = manager.team_member_assignments("Dana").await.unwrap();

    assert_eq!(report.info.role.as_deref(), Some("Engineer"));
    assert_eq!(report.workload.total_tasks, 2);
    assert_eq!(report.workload.completed_tasks, 1);
    assert_eq!(report.workload.completion_rate, 50);
    assert_eq!(report.projects.len(), 1);
    assert_eq!(report.tasks_by_project["Apollo"].len(), 2);

    // Build API is due 2020-02-10 and not completed.
    assert_eq!(report.overdue_tasks.len(), 1);
    assert_eq!(report.overdue_tasks[0].task.name, "Build API");
}

#[tokio::test]
async fn test_milestone_progress_from_required_tasks() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    seed_apollo(&manager).await;

    let report = manager.milestone_progress("Apollo", None).await.unwrap();

    assert_eq!(report.milestones.len(), 1);
    let entry = &report.milestones[0];
    assert_eq!(entry.progress.total_tasks, 2);
    assert_eq!(entry.progress.completed_tasks, 1);
    assert_eq!(entry.progress.completion_percentage, 50);
    assert!(!entry.progress.is_overdue);

    assert_eq!(report.summary.average_completion, 50);
    assert_eq!(
        report.summary.next_milestone.as_deref(),
        Some("API Complete")
    );

    // Narrowing to an unknown milestone fails.
    let err = manager
        .milestone_progress("Apollo", Some("Nope"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Nope"));
}

#[tokio::test]
async fn test_timeline_events_sorted_with_deltas() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project)
                .with_observation("StartDate: 2020-01-01")
                .with_observation("EndDate: 2020-03-01"),
            Entity::new("Kickoff Review", EntityType::Milestone)
                .with_observation("Date: 2020-02-01"),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![Relation::new(
            "Kickoff Review",
            RelationType::PartOf,
            "Apollo",
        )])
        .await
        .unwrap();

    let report = manager.project_timeline("Apollo").await.unwrap();

    let dates: Vec<String> = report
        .timeline
        .iter()
        .map(|e| e.date.to_string())
        .collect();
    assert_eq!(dates, vec!["2020-01-01", "2020-02-01", "2020-03-01"]);
    assert_eq!(report.timeline[1].days_from_previous, 31);
    assert_eq!(report.timeline[1].days_to_next, 29);
    assert_eq!(report.project_duration_days, 60);

    // Everything is in the past: progress clamps to 100, position is
    // the last event, nothing is upcoming.
    assert_eq!(report.progress_percentage, 100);
    assert_eq!(report.current_position, 2);
    assert!(report.upcoming_events.is_empty());
}

#[tokio::test]
async fn test_resource_usage_against_capacity() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project),
            Entity::new("Build Server", EntityType::Resource)
                .with_observation("Capacity: 2"),
            Entity::new("Compile", EntityType::Task).with_observation("Status: in_progress"),
            Entity::new("Package", EntityType::Task).with_observation("Status: in_progress"),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![
            Relation::new("Build Server", RelationType::PartOf, "Apollo"),
            Relation::new("Compile", RelationType::Requires, "Build Server"),
            Relation::new("Package", RelationType::Requires, "Build Server"),
        ])
        .await
        .unwrap();

    let report = manager.resource_allocation("Apollo", None).await.unwrap();

    assert_eq!(report.resources.len(), 1);
    let entry = &report.resources[0];
    assert_eq!(entry.usage.total_tasks, 2);
    assert_eq!(entry.usage.in_progress_tasks, 2);
    assert_eq!(entry.usage.usage_percentage, 100);

    assert_eq!(report.summary.overallocated_count, 1);
    assert_eq!(report.overallocated_resources, vec!["Build Server"]);
}

#[tokio::test]
async fn test_risks_ranked_by_score() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project),
            Entity::new("Vendor delay", EntityType::Risk)
                .with_observation("Likelihood: 2")
                .with_observation("Impact: 3"),
            Entity::new("Data loss", EntityType::Risk)
                .with_observation("Likelihood: 4")
                .with_observation("Impact: 5")
                .with_observation("Status: mitigating"),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![
            Relation::new("Vendor delay", RelationType::PartOf, "Apollo"),
            Relation::new("Data loss", RelationType::PartOf, "Apollo"),
        ])
        .await
        .unwrap();

    let report = manager.project_risks("Apollo").await.unwrap();

    // Score 20 sorts ahead of score 6, and 20 >= 15 is high priority.
    assert_eq!(report.risks[0].risk.name, "Data loss");
    assert_eq!(report.risks[0].info.risk_score, Some(20));
    assert_eq!(report.risks[1].info.risk_score, Some(6));
    assert_eq!(report.summary.high_priority_count, 1);
    assert_eq!(report.summary.mitigated_count, 1);
    assert_eq!(report.high_priority_risks, vec!["Data loss"]);
}

#[tokio::test]
async fn test_related_projects_through_shared_team() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project),
            Entity::new("Borealis", EntityType::Project),
            Entity::new("Orphan", EntityType::Project),
            Entity::new("Dana", EntityType::TeamMember),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![
            Relation::new("Dana", RelationType::ContributesTo, "Apollo"),
            Relation::new("Dana", RelationType::ContributesTo, "Borealis"),
        ])
        .await
        .unwrap();

    let report = manager.related_projects("Apollo", 1).await.unwrap();

    assert_eq!(report.related_projects.len(), 1);
    let conn = &report.related_projects[0];
    assert_eq!(conn.project.name, "Borealis");
    assert_eq!(conn.connection_strength, 2.0);
    assert_eq!(conn.shared_entities.team_members, vec!["Dana"]);
    assert_eq!(report.summary.total_related, 1);
}

#[tokio::test]
async fn test_decision_log_most_recent_first() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project),
            Entity::new("Use Postgres", EntityType::Decision)
                .with_observation("Date: 2021-03-01")
                .with_observation("Status: approved"),
            Entity::new("Adopt Kubernetes", EntityType::Decision)
                .with_observation("Date: 2021-06-01")
                .with_observation("Status: implemented"),
            Entity::new("Undated idea", EntityType::Decision),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![
            Relation::new("Use Postgres", RelationType::PartOf, "Apollo"),
            Relation::new("Adopt Kubernetes", RelationType::PartOf, "Apollo"),
            Relation::new("Undated idea", RelationType::PartOf, "Apollo"),
        ])
        .await
        .unwrap();

    let report = manager.decision_log("Apollo").await.unwrap();

    let names: Vec<&str> = report
        .decisions
        .iter()
        .map(|d| d.decision.name.as_str())
        .collect();
    assert_eq!(names, vec!["Adopt Kubernetes", "Use Postgres", "Undated idea"]);

    assert_eq!(report.summary.approved_count, 1);
    assert_eq!(report.summary.implemented_count, 1);
    // Missing status defaults to proposed.
    assert_eq!(report.summary.proposed_count, 1);
}

#[tokio::test]
async fn test_health_neutral_empty_project() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![Entity::new("Apollo", EntityType::Project)])
        .await
        .unwrap();

    let report = manager.project_health("Apollo").await.unwrap();

    // Empty categories score neutral 50 except the two zero ratios and
    // full schedule credit.
    assert_eq!(report.health_score, 52);
    assert_eq!(report.metrics.tasks.total, 0);
    assert!(!report.metrics.timeline.behind_schedule);
}

#[tokio::test]
async fn test_health_blocked_tasks_surface_in_recommendations() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);

    manager
        .create_entities(vec![
            Entity::new("Apollo", EntityType::Project),
            Entity::new("T1", EntityType::Task).with_observation("Status: blocked"),
            Entity::new("T2", EntityType::Task).with_observation("Status: blocked"),
            Entity::new("T3", EntityType::Task),
        ])
        .await
        .unwrap();
    manager
        .create_relations(vec![
            Relation::new("T1", RelationType::PartOf, "Apollo"),
            Relation::new("T2", RelationType::PartOf, "Apollo"),
            Relation::new("T3", RelationType::PartOf, "Apollo"),
        ])
        .await
        .unwrap();

    let report = manager.project_health("Apollo").await.unwrap();

    assert_eq!(report.metrics.tasks.blocked, 2);
    assert!(report.health_score < 52);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.to_lowercase().contains("blocked")));
}
