//! Relation graph: cardinality checks and traversal over instance-level
//! relation edges.

use crate::Graph;
use schemata_core::{Instance, InstanceId, Value, Violation, ViolationKind};
use schemata_registry::{Cardinality, PropertyDef, Registry};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Read view over accepted instances, optionally overlaid with the candidate
/// of the write being validated. The candidate shadows any stored instance
/// with the same id, so an update is checked against its new state.
pub struct RelationGraph<'a> {
    registry: &'a Registry,
    graph: &'a Graph,
    candidate: Option<&'a Instance>,
}

impl<'a> RelationGraph<'a> {
    pub fn new(registry: &'a Registry, graph: &'a Graph) -> Self {
        Self {
            registry,
            graph,
            candidate: None,
        }
    }

    /// Overlay the instance being written.
    pub fn with_candidate(mut self, candidate: &'a Instance) -> Self {
        self.candidate = Some(candidate);
        self
    }

    /// Look up an instance, candidate first.
    pub fn instance(&self, id: InstanceId) -> Option<&'a Instance> {
        match self.candidate {
            Some(candidate) if candidate.id == id => Some(candidate),
            _ => self.graph.get(id),
        }
    }

    /// Check one relation-valued property.
    ///
    /// An absent obligatory relation is `ObligatoryMissing`. A `one` relation
    /// must hold a single id and a `many` relation a set of ids without
    /// duplicates. Every id must be an existing instance of the target.
    /// Values of a non-reference shape are left to the type check.
    pub fn validate_cardinality(&self, property: &PropertyDef, value: Option<&Value>) -> Vec<Violation> {
        let mut violations = Vec::new();
        let Some(relation) = &property.relation else {
            return violations;
        };
        let path = property.name.as_str();

        let value = match value {
            Some(v) if !v.is_blank() => v,
            _ => {
                if relation.obligatory {
                    violations.push(Violation::of_kind(
                        ViolationKind::ObligatoryMissing,
                        path,
                        format!("Obligatory relation '{}' to {} is missing", path, relation.target),
                    ));
                }
                return violations;
            }
        };

        let ids = match (relation.cardinality, value) {
            (Cardinality::One, Value::Ref(id)) => vec![*id],
            (Cardinality::Many, Value::Refs(ids)) => ids.clone(),
            (Cardinality::One, Value::Refs(ids)) => {
                violations.push(Violation::of_kind(
                    ViolationKind::CardinalityMismatch,
                    path,
                    format!("Relation '{}' holds a single reference, got {}", path, ids.len()),
                ));
                return violations;
            }
            (Cardinality::Many, Value::Ref(_)) => {
                violations.push(Violation::of_kind(
                    ViolationKind::CardinalityMismatch,
                    path,
                    format!("Relation '{}' holds a set of references", path),
                ));
                return violations;
            }
            _ => return violations,
        };

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for id in &ids {
            if !seen.insert(*id) && reported.insert(*id) {
                violations.push(Violation::of_kind(
                    ViolationKind::DuplicateReference,
                    path,
                    format!("Relation '{}' lists {} more than once", path, id),
                ));
            }
        }

        let target_id = self.registry.get_id(&relation.target);
        let mut checked = HashSet::new();
        for id in ids {
            if !checked.insert(id) {
                continue;
            }
            let resolves = match (self.instance(id), target_id) {
                (Some(instance), Some(target)) => instance.def_id == target,
                _ => false,
            };
            if !resolves {
                violations.push(Violation::of_kind(
                    ViolationKind::DanglingReference,
                    path,
                    format!("Relation '{}' references {} which is not an instance of {}", path, id, relation.target),
                ));
            }
        }

        violations
    }

    /// Ids referenced from `id` through `property`.
    pub fn dependencies(&self, id: InstanceId, property: &str) -> Vec<InstanceId> {
        self.instance(id)
            .map(|instance| instance.references(property))
            .unwrap_or_default()
    }

    /// Detect a cycle reachable from `start` over `property`.
    pub fn detect_cycle(&self, start: InstanceId, property: &str) -> Option<Violation> {
        detect_cycle(start, property, |id| self.dependencies(id, property))
    }

    /// Every instance reachable from `id` over `property`, breadth-first.
    /// `id` itself is included only if a path leads back to it.
    pub fn descendants(&self, id: InstanceId, property: &str) -> Vec<InstanceId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for next in self.dependencies(current, property) {
                if visited.insert(next) {
                    result.push(next);
                    queue.push_back(next);
                }
            }
        }
        result
    }

    /// Every instance from which `id` is reachable over `property`,
    /// breadth-first, found through the reverse-reference index.
    pub fn ancestors(&self, id: InstanceId, property: &str) -> Vec<InstanceId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            let mut referrers: Vec<InstanceId> = self.graph.referrers(current).collect();
            if let Some(candidate) = self.candidate {
                if !referrers.contains(&candidate.id) {
                    referrers.push(candidate.id);
                }
            }
            referrers.sort();

            for referrer in referrers {
                if !self.dependencies(referrer, property).contains(&current) {
                    continue;
                }
                if visited.insert(referrer) {
                    result.push(referrer);
                    queue.push_back(referrer);
                }
            }
        }
        result
    }
}

/// A node on the traversal stack with its unexplored dependencies.
struct Frame {
    node: InstanceId,
    dependencies: Vec<InstanceId>,
    next: usize,
}

/// Depth-first search for a cycle over `property`, starting at `start`.
///
/// Iterative with an explicit stack, so chain depth is bounded by memory and
/// not by the call stack. A cycle is reported when a dependency is already
/// on the current path; a node reached again through a different branch
/// (diamond sharing) is not a cycle. Nodes whose whole subtree has been
/// explored are not descended into again within the same traversal.
///
/// Returns at most one `CircularDependency` violation, at path `property`.
pub fn detect_cycle<F>(start: InstanceId, property: &str, mut resolve_dependencies: F) -> Option<Violation>
where
    F: FnMut(InstanceId) -> Vec<InstanceId>,
{
    let mut path: HashSet<InstanceId> = HashSet::new();
    let mut finished: HashSet<InstanceId> = HashSet::new();
    let mut stack = vec![Frame {
        node: start,
        dependencies: resolve_dependencies(start),
        next: 0,
    }];
    path.insert(start);

    while let Some(frame) = stack.last_mut() {
        let Some(&next) = frame.dependencies.get(frame.next) else {
            // Backtrack
            let node = frame.node;
            stack.pop();
            path.remove(&node);
            finished.insert(node);
            continue;
        };
        frame.next += 1;

        if path.contains(&next) {
            debug!(%start, %next, property, "circular dependency detected");
            return Some(Violation::of_kind(
                ViolationKind::CircularDependency,
                property,
                format!("Circular dependency in '{}': {} depends on itself", property, next),
            ));
        }
        if finished.contains(&next) {
            continue;
        }

        let dependencies = resolve_dependencies(next);
        path.insert(next);
        stack.push(Frame {
            node: next,
            dependencies,
            next: 0,
        });
    }

    None
}
