//! Constraint checking for one instance write.

use schemata_core::{Instance, Properties, Value, Violation, ViolationKind, Violations};
use schemata_graph::{Graph, RelationGraph};
use schemata_registry::{ObjectDef, PropertyDef, Registry, UniqueConstraint};

use crate::error::{ConstraintError, ConstraintResult};
use crate::hook::HookRunner;

/// Constraint checker.
///
/// Evaluation accumulates; every step runs whatever the earlier steps found:
/// 1. property checks (obligatory presence, shape, option set, range, pattern)
/// 2. relation checks (cardinality, existence, cycles on acyclic relations)
/// 3. uniqueness against stored instances
/// 4. the definition's custom hook, which sees 1-3 and can only add
pub struct ConstraintChecker<'a> {
    registry: &'a Registry,
    graph: &'a Graph,
    hooks: HookRunner,
}

impl<'a> ConstraintChecker<'a> {
    /// Create a new constraint checker.
    pub fn new(registry: &'a Registry, graph: &'a Graph) -> Self {
        Self {
            registry,
            graph,
            hooks: HookRunner::default(),
        }
    }

    /// Use a specific hook runner.
    pub fn with_hooks(mut self, hooks: HookRunner) -> Self {
        self.hooks = hooks;
        self
    }

    /// Run all four steps for a candidate instance.
    pub fn check(&self, candidate: &Instance) -> ConstraintResult<Violations> {
        let def = self.definition(candidate)?;
        let mut violations = self.check_builtin(def, candidate);
        let added = self.hooks.run(def, candidate, violations.all());
        violations.extend(added);
        Ok(violations)
    }

    /// Steps 1 to 3.
    pub fn check_builtin(&self, def: &ObjectDef, candidate: &Instance) -> Violations {
        let mut violations = Violations::new();
        violations.extend(self.check_properties(def, candidate));
        violations.extend(self.check_relations(def, candidate));
        violations.extend(self.check_uniques(def, candidate));
        violations
    }

    fn definition(&self, candidate: &Instance) -> ConstraintResult<&'a ObjectDef> {
        self.registry
            .get(candidate.def_id)
            .ok_or(ConstraintError::UnknownDefinition(candidate.def_id))
    }

    // ========== Step 1: properties ==========

    /// Obligatory presence, value shape, option membership, range and
    /// pattern for every declared property; unknown properties last.
    pub fn check_properties(&self, def: &ObjectDef, candidate: &Instance) -> Vec<Violation> {
        let mut violations = Vec::new();

        for prop in &def.properties {
            let value = candidate.get(&prop.name).filter(|v| !v.is_blank());

            let Some(value) = value else {
                // Relation presence is checked with the relation
                if prop.obligatory && !prop.is_relation() {
                    violations.push(Violation::of_kind(
                        ViolationKind::ObligatoryMissing,
                        &prop.name,
                        format!("Obligatory property '{}' is missing", prop.name),
                    ));
                }
                continue;
            };

            if !prop.value_type.accepts(value) {
                violations.push(Violation::of_kind(
                    ViolationKind::TypeMismatch,
                    &prop.name,
                    format!(
                        "Property '{}' expects {}, got {}",
                        prop.name,
                        prop.value_type.name(),
                        value.type_name()
                    ),
                ));
                continue;
            }

            violations.extend(check_option(prop, value));
            violations.extend(check_range(prop, value));
            violations.extend(check_pattern(prop, value));
        }

        let mut unknown: Vec<&String> = candidate
            .properties
            .keys()
            .filter(|name| !def.has_property(name))
            .collect();
        unknown.sort();
        for name in unknown {
            violations.push(Violation::of_kind(
                ViolationKind::UnknownProperty,
                name.as_str(),
                format!("{} has no property '{}'", def.qualified_name, name),
            ));
        }

        violations
    }

    // ========== Step 2: relations ==========

    /// Cardinality and target existence of every relation, plus cycle
    /// detection on acyclic relations.
    pub fn check_relations(&self, def: &ObjectDef, candidate: &Instance) -> Vec<Violation> {
        let relations = RelationGraph::new(self.registry, self.graph).with_candidate(candidate);
        let mut violations = Vec::new();

        for (prop, relation) in def.relations() {
            let value = candidate.get(&prop.name);
            let found = relations.validate_cardinality(prop, value);
            let well_formed = found.is_empty();
            violations.extend(found);

            let present = value.is_some_and(|v| !v.is_blank());
            if relation.acyclic && present && well_formed {
                violations.extend(relations.detect_cycle(candidate.id, &prop.name));
            }
        }

        violations
    }

    // ========== Step 3: uniqueness ==========

    /// Look for another stored instance with identical values across each
    /// unique tuple. An absent or blank component equals any other absent or
    /// blank component.
    pub fn check_uniques(&self, def: &ObjectDef, candidate: &Instance) -> Vec<Violation> {
        def.uniques
            .iter()
            .filter_map(|unique| self.check_unique(def, unique, candidate))
            .collect()
    }

    fn check_unique(
        &self,
        def: &ObjectDef,
        unique: &UniqueConstraint,
        candidate: &Instance,
    ) -> Option<Violation> {
        let tuple: Vec<_> = unique
            .properties
            .iter()
            .map(|prop| (prop.as_str(), candidate.get(prop)))
            .collect();

        let other = self
            .graph
            .find_by_tuple(def.id, &tuple)
            .into_iter()
            .find(|id| *id != candidate.id)?;

        Some(Violation::of_kind(
            ViolationKind::UniqueConstraintViolation,
            unique.properties.first().map(String::as_str).unwrap_or_default(),
            format!(
                "Another {} ({}) already has the same ({})",
                def.qualified_name,
                other,
                unique.name()
            ),
        ))
    }
}

/// Add declared defaults for absent properties.
pub fn apply_defaults(def: &ObjectDef, properties: &mut Properties) {
    for prop in &def.properties {
        if let Some(default) = &prop.default {
            let absent = properties.get(&prop.name).map_or(true, Value::is_null);
            if absent {
                properties.insert(prop.name.clone(), default.clone());
            }
        }
    }
}

fn check_option(prop: &PropertyDef, value: &Value) -> Option<Violation> {
    let option_set = prop.option_set.as_ref()?;
    let code = value.as_str()?;
    if option_set.contains(code) {
        return None;
    }
    Some(Violation::of_kind(
        ViolationKind::OptionNotInSet,
        &prop.name,
        format!(
            "'{}' is not a valid option for '{}' ({})",
            code, prop.name, option_set.code
        ),
    ))
}

fn check_range(prop: &PropertyDef, value: &Value) -> Option<Violation> {
    let i = value.as_int()?;
    let below = prop.min.is_some_and(|min| i < min);
    let above = prop.max.is_some_and(|max| i > max);
    if !below && !above {
        return None;
    }
    let range = match (prop.min, prop.max) {
        (Some(min), Some(max)) => format!("between {} and {}", min, max),
        (Some(min), None) => format!(">= {}", min),
        (None, Some(max)) => format!("<= {}", max),
        (None, None) => String::new(),
    };
    Some(Violation::of_kind(
        ViolationKind::OutOfRange,
        &prop.name,
        format!("Property '{}' must be {}, got {}", prop.name, range, i),
    ))
}

fn check_pattern(prop: &PropertyDef, value: &Value) -> Option<Violation> {
    let pattern = prop.pattern.as_ref()?;
    let text = value.as_str()?;
    if pattern.is_match(text) {
        return None;
    }
    Some(Violation::of_kind(
        ViolationKind::PatternMismatch,
        &prop.name,
        format!("'{}' does not match the pattern of '{}'", text, prop.name),
    ))
}
