//! Task dependency tree and critical path.
//!
//! The tree is built by bounded breadth-first traversal of `depends_on`
//! relations in both directions from a root task. Nothing in the data
//! model forbids dependency cycles, so traversal carries a visited set
//! and an explicit depth counter, and the output refers to neighbors by
//! name instead of nesting nodes.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::analytics::{require_entity, status_or};
use crate::error::Result;
use crate::graph::observations::observation_value;
use crate::graph::types::{Entity, EntityType, KnowledgeGraph, RelationType};

/// One task in the dependency tree.
///
/// `level` is the shortest distance from the root along the `dependsOn`
/// direction; tasks discovered only as dependents sit at level 0.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyNode {
    pub task: Entity,
    pub level: usize,
    pub depends_on: Vec<String>,
    pub depended_on_by: Vec<String>,
    pub status: String,
    pub due_date: Option<String>,
    pub assignee: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySummary {
    pub total_dependencies: usize,
    pub max_depth: usize,
    pub blocked_by: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDependencyReport {
    pub task: Entity,
    pub project_name: Option<String>,
    pub dependencies: Vec<DependencyNode>,
    pub critical_path: Vec<String>,
    pub summary: DependencySummary,
}

#[derive(Default)]
struct TreeNode {
    level: usize,
    depends_on: Vec<String>,
    depended_on_by: Vec<String>,
}

/// Build the bidirectional dependency tree around `task_name`, bounded
/// by `depth` hops in each direction, and compute its critical path.
pub fn task_dependencies(
    graph: &KnowledgeGraph,
    task_name: &str,
    depth: usize,
) -> Result<TaskDependencyReport> {
    let task = require_entity(graph, task_name, EntityType::Task, "Task")?;

    let project_name = graph
        .relations_from(task_name, RelationType::PartOf)
        .find_map(|r| graph.entity_of_type(&r.to, EntityType::Project))
        .map(|p| p.name.clone());

    let mut nodes: HashMap<String, TreeNode> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    nodes.insert(task_name.to_string(), TreeNode::default());
    order.push(task_name.to_string());

    // Downstream: what the root (transitively) depends on. Levels grow
    // with distance; revisits keep the minimum level seen.
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((task_name.to_string(), 0));
    while let Some((current, level)) = queue.pop_front() {
        if level >= depth {
            continue;
        }
        let dependencies: Vec<String> = graph
            .relations_from(&current, RelationType::DependsOn)
            .filter(|r| graph.entity_of_type(&r.to, EntityType::Task).is_some())
            .map(|r| r.to.clone())
            .collect();
        for dependency in dependencies {
            link(&mut nodes, &mut order, &current, &dependency);
            let node = nodes.get_mut(&dependency).expect("node just linked");
            if node.level == 0 || level + 1 < node.level {
                // Level 0 on a non-root node means it was first seen as
                // a dependent; a dependsOn path always overrides that.
                if dependency != task_name {
                    node.level = level + 1;
                    queue.push_back((dependency, level + 1));
                }
            }
        }
    }

    // Upstream: what (transitively) depends on the root. These stay at
    // level 0 unless a downstream path already assigned one.
    let mut visited_up: std::collections::HashSet<String> =
        std::collections::HashSet::from([task_name.to_string()]);
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((task_name.to_string(), 0));
    while let Some((current, level)) = queue.pop_front() {
        if level >= depth {
            continue;
        }
        let dependents: Vec<String> = graph
            .relations_to(&current, RelationType::DependsOn)
            .filter(|r| graph.entity_of_type(&r.from, EntityType::Task).is_some())
            .map(|r| r.from.clone())
            .collect();
        for dependent in dependents {
            link(&mut nodes, &mut order, &dependent, &current);
            if visited_up.insert(dependent.clone()) {
                queue.push_back((dependent, level + 1));
            }
        }
    }

    // Flatten to serializable nodes, stably ordered by level.
    let mut dependencies: Vec<DependencyNode> = order
        .iter()
        .filter_map(|name| {
            let node = &nodes[name];
            let entity = graph.entity_of_type(name, EntityType::Task)?;
            Some(DependencyNode {
                task: entity.clone(),
                level: node.level,
                depends_on: node.depends_on.clone(),
                depended_on_by: node.depended_on_by.clone(),
                status: status_or(entity, "not_started").to_string(),
                due_date: observation_value(entity, "DueDate").map(String::from),
                assignee: assignee_of(graph, name),
            })
        })
        .collect();
    dependencies.sort_by_key(|d| d.level);

    let critical_path = critical_path(&dependencies);

    let root_completed = status_or(task, "not_started") == "completed";
    let blocked_by = dependencies
        .iter()
        .filter(|d| d.task.name != task_name && d.status != "completed" && !root_completed)
        .count();

    let total = dependencies.len();
    Ok(TaskDependencyReport {
        task: task.clone(),
        project_name,
        dependencies,
        critical_path,
        summary: DependencySummary {
            total_dependencies: total.saturating_sub(1),
            max_depth: depth,
            blocked_by,
        },
    })
}

/// Record the edge `dependent depends_on dependency` in both node
/// adjacency lists, creating nodes as needed.
fn link(
    nodes: &mut HashMap<String, TreeNode>,
    order: &mut Vec<String>,
    dependent: &str,
    dependency: &str,
) {
    for name in [dependent, dependency] {
        if !nodes.contains_key(name) {
            nodes.insert(name.to_string(), TreeNode::default());
            order.push(name.to_string());
        }
    }
    let node = nodes.get_mut(dependent).expect("inserted above");
    if !node.depends_on.iter().any(|n| n == dependency) {
        node.depends_on.push(dependency.to_string());
    }
    let node = nodes.get_mut(dependency).expect("inserted above");
    if !node.depended_on_by.iter().any(|n| n == dependent) {
        node.depended_on_by.push(dependent.to_string());
    }
}

fn assignee_of(graph: &KnowledgeGraph, task_name: &str) -> Option<String> {
    graph
        .relations_from(task_name, RelationType::AssignedTo)
        .find_map(|r| graph.entity_of_type(&r.to, EntityType::TeamMember))
        .map(|m| m.name.clone())
}

/// Longest simple path, by node count, from any zero-dependency node to
/// any zero-dependent node in the induced subgraph. Paths follow the
/// execution direction (dependency before dependent). Ties keep the
/// first path found.
fn critical_path(dependencies: &[DependencyNode]) -> Vec<String> {
    // Edges run dependency -> dependent.
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in dependencies {
        successors.entry(node.task.name.as_str()).or_default();
    }
    for node in dependencies {
        for dependency in &node.depends_on {
            successors
                .entry(dependency.as_str())
                .or_default()
                .push(node.task.name.as_str());
        }
    }

    let start_nodes: Vec<&str> = dependencies
        .iter()
        .filter(|d| d.depends_on.is_empty())
        .map(|d| d.task.name.as_str())
        .collect();
    let end_nodes: Vec<&str> = dependencies
        .iter()
        .filter(|d| d.depended_on_by.is_empty())
        .map(|d| d.task.name.as_str())
        .collect();

    let mut best: Vec<&str> = Vec::new();
    let mut path: Vec<&str> = Vec::new();

    fn walk<'a>(
        current: &'a str,
        successors: &HashMap<&'a str, Vec<&'a str>>,
        end_nodes: &[&str],
        path: &mut Vec<&'a str>,
        best: &mut Vec<&'a str>,
    ) {
        path.push(current);
        if end_nodes.contains(&current) {
            if path.len() > best.len() {
                *best = path.clone();
            }
        } else if let Some(next) = successors.get(current) {
            for &next in next {
                if !path.contains(&next) {
                    walk(next, successors, end_nodes, path, best);
                }
            }
        }
        path.pop();
    }

    for start in start_nodes {
        walk(start, &successors, &end_nodes, &mut path, &mut best);
    }

    best.into_iter().map(String::from).collect()
}
