//! Query engine.
//!
//! Pure functions over a loaded graph. Both queries return a subgraph
//! (a [`KnowledgeGraph`] value) rather than bare entity lists, so callers
//! always see matching entities together with the relations among them.

use std::collections::HashSet;

use crate::graph::types::KnowledgeGraph;

/// Case-insensitive substring search across the graph.
///
/// An entity matches when the query appears in its name, its type's wire
/// name, or any observation. A relation matches when its type's wire name
/// or any relation observation contains the query; matched relations pull
/// their endpoint entities into the result even when those entities did
/// not match on their own. Relations between two matching entities are
/// always included. Input order is preserved and nothing is duplicated.
pub fn search_nodes(graph: &KnowledgeGraph, query: &str) -> KnowledgeGraph {
    let needle = query.to_lowercase();

    let mut entities: Vec<_> = graph
        .entities
        .iter()
        .filter(|entity| {
            entity.name.to_lowercase().contains(&needle)
                || entity.entity_type.as_str().to_lowercase().contains(&needle)
                || entity
                    .observations
                    .iter()
                    .any(|o| o.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();

    let mut matched_names: HashSet<String> =
        entities.iter().map(|e| e.name.clone()).collect();

    let mut relations: Vec<_> = graph
        .relations
        .iter()
        .filter(|r| matched_names.contains(&r.from) && matched_names.contains(&r.to))
        .cloned()
        .collect();

    // Relations whose own type or observations match bring in their
    // endpoints too.
    for relation in &graph.relations {
        let matches = relation
            .relation_type
            .as_str()
            .to_lowercase()
            .contains(&needle)
            || relation
                .observations
                .as_deref()
                .unwrap_or_default()
                .iter()
                .any(|o| o.to_lowercase().contains(&needle));
        if !matches || relations.iter().any(|r| r.same_triple(relation)) {
            continue;
        }
        relations.push(relation.clone());

        for endpoint in [&relation.from, &relation.to] {
            if !matched_names.contains(endpoint) {
                if let Some(entity) = graph.entity(endpoint) {
                    entities.push(entity.clone());
                    matched_names.insert(endpoint.clone());
                }
            }
        }
    }

    KnowledgeGraph { entities, relations }
}

/// Exact-name lookup for a set of entities.
///
/// Returns the named entities and the relations among them. Unknown
/// names are silently skipped; none known yields an empty subgraph.
pub fn open_nodes(graph: &KnowledgeGraph, names: &[String]) -> KnowledgeGraph {
    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();

    let entities: Vec<_> = graph
        .entities
        .iter()
        .filter(|e| wanted.contains(e.name.as_str()))
        .cloned()
        .collect();

    let relations: Vec<_> = graph
        .relations
        .iter()
        .filter(|r| wanted.contains(r.from.as_str()) && wanted.contains(r.to.as_str()))
        .cloned()
        .collect();

    KnowledgeGraph { entities, relations }
}
