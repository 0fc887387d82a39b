//! Cross-Reference Resolver
//!
//! Turns [`CrossReference`] edges into handles on their targets. Resolution is
//! a pure function of the edge and the indexes; problems come back as values,
//! one per edge, and never stop sibling edges from resolving.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::warn;

use crate::catalog::Catalog;
use crate::error::ResolutionError;
use crate::index::Indexes;
use crate::schema::{ContentEntity, ContentType, CrossReference, Relationship};

/// Resolve one edge declared by `source_id`.
///
/// A target whose type differs from `target_type` yields
/// [`ResolutionError::TypeMismatch`]; the target still exists and can be
/// fetched by id.
pub fn resolve<'a>(
    source_id: &str,
    reference: &CrossReference,
    indexes: &'a Indexes,
) -> Result<&'a Arc<ContentEntity>, ResolutionError> {
    let target = indexes
        .get(&reference.target_id)
        .ok_or_else(|| ResolutionError::DanglingReference {
            source_id: source_id.to_string(),
            target_id: reference.target_id.clone(),
        })?;

    let actual = target.content_type();
    if actual != reference.target_type {
        return Err(ResolutionError::TypeMismatch {
            source_id: source_id.to_string(),
            target_id: reference.target_id.clone(),
            expected: reference.target_type,
            actual,
        });
    }
    Ok(target)
}

/// Resolve every edge of `entity`, in declaration order
pub fn resolve_all<'a>(
    entity: &ContentEntity,
    indexes: &'a Indexes,
) -> Vec<Result<&'a Arc<ContentEntity>, ResolutionError>> {
    entity
        .cross_references
        .iter()
        .map(|reference| resolve(&entity.id, reference, indexes))
        .collect()
}

/// Every resolution problem in the catalog, in catalog then edge order
pub fn check_integrity(catalog: &Catalog, indexes: &Indexes) -> Vec<ResolutionError> {
    let mut problems = Vec::new();
    for entity in catalog.iter() {
        for result in resolve_all(entity, indexes) {
            if let Err(err) = result {
                warn!(source = %err.source_id(), target = %err.target_id(), "{}", err);
                problems.push(err);
            }
        }
    }
    problems
}

/// Directed graph of every edge whose target exists
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    graph: DiGraph<Arc<ContentEntity>, Relationship>,
    node_indices: HashMap<String, NodeIndex>,
}

impl ReferenceGraph {
    /// Nodes in catalog order; dangling edges are left out
    pub fn build(catalog: &Catalog) -> Self {
        let mut graph = DiGraph::with_capacity(catalog.len(), catalog.len() * 2);
        let mut node_indices = HashMap::with_capacity(catalog.len());

        for entity in catalog.iter() {
            let idx = graph.add_node(Arc::clone(entity));
            node_indices.insert(entity.id.clone(), idx);
        }

        for entity in catalog.iter() {
            let from = node_indices[&entity.id];
            for reference in &entity.cross_references {
                if let Some(&to) = node_indices.get(&reference.target_id) {
                    graph.add_edge(from, to, reference.relationship);
                }
            }
        }

        Self { graph, node_indices }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Entities that link to `id` (one hop), in catalog order
    pub fn referenced_by(&self, id: &str) -> Vec<(&Arc<ContentEntity>, Relationship)> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Resolvable targets of `id`, in declaration order
    pub fn references_from(&self, id: &str) -> Vec<(&Arc<ContentEntity>, Relationship)> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<(&Arc<ContentEntity>, Relationship)> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                (other, edge.id(), *edge.weight())
            })
            .collect();
        edges.sort_by_key(|(other, edge_id, _)| match direction {
            Direction::Incoming => (other.index(), edge_id.index()),
            Direction::Outgoing => (edge_id.index(), other.index()),
        });

        edges
            .into_iter()
            .map(|(other, _, relationship)| (&self.graph[other], relationship))
            .collect()
    }

    /// Export as GraphViz DOT
    pub fn to_dot(&self) -> String {
        let mut output = String::new();

        output.push_str("digraph ContentGraph {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8, fontcolor=\"#606060\"];\n");
        output.push('\n');

        for idx in self.graph.node_indices() {
            let entity = &self.graph[idx];
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\"];\n",
                escape(&entity.id),
                escape(&entity.name),
                type_color(entity.content_type())
            ));
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                escape(&self.graph[edge.source()].id),
                escape(&self.graph[edge.target()].id),
                edge.weight()
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn type_color(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Structure => "#90CAF9",
        ContentType::System => "#CE93D8",
        ContentType::Pathway => "#80CBC4",
        ContentType::Process => "#A5D6A7",
        ContentType::Condition => "#EF9A9A",
        ContentType::Concept => "#FFE082",
        ContentType::Topic => "#FFCC80",
        ContentType::Module => "#B0BEC5",
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RawModule;
    use serde_json::{json, Value};

    fn structure(id: &str, refs: Value) -> Value {
        json!({
            "id": id,
            "type": "structure",
            "name": id,
            "classification": { "region": "head", "system": "respiratory" },
            "crossReferences": refs
        })
    }

    fn load(entities: Vec<Value>) -> Catalog {
        Catalog::load(vec![RawModule::new("anatomy", entities)]).unwrap()
    }

    #[test]
    fn test_resolve_existing_target() {
        let catalog = load(vec![
            structure(
                "nasal-cavity",
                json!([{ "targetId": "pharynx", "targetType": "structure", "relationship": "related" }]),
            ),
            structure("pharynx", json!([])),
        ]);
        let indexes = Indexes::build(&catalog);
        let entity = catalog.get("nasal-cavity").unwrap();

        let results = resolve_all(entity, &indexes);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().id, "pharynx");
    }

    #[test]
    fn test_dangling_reference() {
        let catalog = load(vec![structure(
            "nasal-cavity",
            json!([{ "targetId": "pharynx", "targetType": "structure", "relationship": "related" }]),
        )]);
        let indexes = Indexes::build(&catalog);
        let entity = catalog.get("nasal-cavity").unwrap();

        let results = resolve_all(entity, &indexes);
        assert_eq!(
            results[0].as_ref().unwrap_err(),
            &ResolutionError::DanglingReference {
                source_id: "nasal-cavity".to_string(),
                target_id: "pharynx".to_string(),
            }
        );
    }

    #[test]
    fn test_errors_do_not_short_circuit() {
        let catalog = load(vec![
            structure(
                "nasal-cavity",
                json!([
                    { "targetId": "missing", "targetType": "structure", "relationship": "related" },
                    { "targetId": "pharynx", "targetType": "condition", "relationship": "see-also" },
                    { "targetId": "pharynx", "targetType": "structure", "relationship": "sibling" }
                ]),
            ),
            structure("pharynx", json!([])),
        ]);
        let indexes = Indexes::build(&catalog);
        let results = resolve_all(catalog.get("nasal-cavity").unwrap(), &indexes);

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Err(ResolutionError::DanglingReference { .. })));
        assert!(results[1].as_ref().unwrap_err().is_warning());
        assert_eq!(results[2].as_ref().unwrap().id, "pharynx");

        let problems = check_integrity(&catalog, &indexes);
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_backlinks_in_catalog_order() {
        let catalog = load(vec![
            structure(
                "nasal-cavity",
                json!([{ "targetId": "pharynx", "targetType": "structure", "relationship": "related" }]),
            ),
            structure("pharynx", json!([])),
            structure(
                "larynx",
                json!([
                    { "targetId": "pharynx", "targetType": "structure", "relationship": "parent" },
                    { "targetId": "trachea", "targetType": "structure", "relationship": "sibling" }
                ]),
            ),
        ]);
        let graph = ReferenceGraph::build(&catalog);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let backlinks: Vec<(&str, Relationship)> = graph
            .referenced_by("pharynx")
            .into_iter()
            .map(|(entity, rel)| (entity.id.as_str(), rel))
            .collect();
        assert_eq!(
            backlinks,
            vec![("nasal-cavity", Relationship::Related), ("larynx", Relationship::Parent)]
        );
        assert!(graph.referenced_by("unknown").is_empty());
    }

    #[test]
    fn test_to_dot() {
        let catalog = load(vec![
            structure(
                "nasal-cavity",
                json!([{ "targetId": "pharynx", "targetType": "structure", "relationship": "see-also" }]),
            ),
            structure("pharynx", json!([])),
        ]);
        let dot = ReferenceGraph::build(&catalog).to_dot();
        assert!(dot.starts_with("digraph ContentGraph {"));
        assert!(dot.contains("\"nasal-cavity\" -> \"pharynx\" [label=\"see-also\"]"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
