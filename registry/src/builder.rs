//! RegistryBuilder for constructing an immutable Registry.

use crate::{
    resolve_property, ObjectDef, ObjectDefDecl, PropertyGroup, Registry, SchemaError,
    SchemaResult, TemplateOptions, UniqueConstraint, ValidationHook,
};
use schemata_core::ObjectDefId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Builder for constructing an immutable Registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Next object definition ID to allocate.
    next_def_id: u32,
    /// Definitions in registration order.
    defs: Vec<ObjectDef>,
    /// Qualified name to ID mapping.
    names: HashMap<String, ObjectDefId>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object definition in `module`.
    pub fn add_object_def(
        &mut self,
        module: impl Into<String>,
        name: impl Into<String>,
    ) -> ObjectDefBuilder<'_> {
        ObjectDefBuilder {
            builder: self,
            module: module.into(),
            name: name.into(),
            properties: Vec::new(),
            uniques: Vec::new(),
            hook: None,
        }
    }

    /// Start an object definition from a parsed declaration. A hook can still
    /// be attached before `done()`.
    pub fn declare(&mut self, decl: ObjectDefDecl) -> ObjectDefBuilder<'_> {
        let mut def = self.add_object_def(decl.module, decl.name);
        for group in decl.properties {
            for prop in group.properties {
                def = def.property(&group.group, prop.name, prop.template, prop.options);
            }
        }
        for unique in decl.uniques {
            def = def.unique(unique);
        }
        def
    }

    /// Register a parsed declaration that has no hook.
    pub fn register(&mut self, decl: ObjectDefDecl) -> SchemaResult<ObjectDefId> {
        self.declare(decl).done()
    }

    /// Get an object definition ID by qualified name (during building).
    pub fn get_id(&self, name: &str) -> Option<ObjectDefId> {
        self.names.get(name).copied()
    }

    /// Build the immutable Registry.
    ///
    /// Relation targets are resolved here, so definitions may reference each
    /// other regardless of registration order.
    pub fn build(self) -> SchemaResult<Registry> {
        for def in &self.defs {
            for (prop, relation) in def.relations() {
                if !self.names.contains_key(&relation.target) {
                    return Err(SchemaError::UnresolvedRelationTarget {
                        definition: def.qualified_name.clone(),
                        property: prop.name.clone(),
                        target: relation.target.clone(),
                    });
                }
                if relation.acyclic && relation.target != def.qualified_name {
                    return Err(SchemaError::AcyclicTargetMismatch {
                        definition: def.qualified_name.clone(),
                        property: prop.name.clone(),
                        target: relation.target.clone(),
                    });
                }
            }
        }

        info!(definitions = self.defs.len(), "schema registry built");
        Ok(Registry::new(self.defs, self.names))
    }
}

/// A property waiting for resolution in `done()`.
struct PendingProperty {
    group: String,
    name: String,
    template: String,
    options: TemplateOptions,
}

/// Builder for an object definition.
pub struct ObjectDefBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    module: String,
    name: String,
    properties: Vec<PendingProperty>,
    uniques: Vec<Vec<String>>,
    hook: Option<Arc<dyn ValidationHook>>,
}

impl<'a> ObjectDefBuilder<'a> {
    /// Add a property to a group.
    pub fn property(
        mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        template: impl Into<String>,
        options: TemplateOptions,
    ) -> Self {
        self.properties.push(PendingProperty {
            group: group.into(),
            name: name.into(),
            template: template.into(),
            options,
        });
        self
    }

    /// Add a uniqueness constraint.
    pub fn unique<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uniques
            .push(properties.into_iter().map(Into::into).collect());
        self
    }

    /// Attach a custom validation hook.
    pub fn hook(mut self, hook: impl ValidationHook) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Finish building this object definition.
    pub fn done(self) -> SchemaResult<ObjectDefId> {
        let qualified_name = format!("{}.{}", self.module, self.name);

        // Check for duplicate name
        if self.builder.names.contains_key(&qualified_name) {
            return Err(SchemaError::DuplicateName(qualified_name));
        }

        // Resolve templates, keeping declaration order
        let mut seen = HashSet::new();
        let mut groups: Vec<PropertyGroup> = Vec::new();
        let mut properties = Vec::with_capacity(self.properties.len());
        for pending in self.properties {
            if !seen.insert(pending.name.clone()) {
                return Err(SchemaError::DuplicateProperty {
                    definition: qualified_name,
                    property: pending.name,
                });
            }

            let prop = resolve_property(
                &self.module,
                &pending.group,
                &pending.name,
                &pending.template,
                &pending.options,
            )?;

            match groups.iter_mut().find(|g| g.name == pending.group) {
                Some(group) => group.properties.push(pending.name),
                None => groups.push(PropertyGroup {
                    name: pending.group,
                    properties: vec![pending.name],
                }),
            }
            properties.push(prop);
        }

        // Check unique tuples against the resolved property set
        let mut uniques = Vec::with_capacity(self.uniques.len());
        for tuple in self.uniques {
            if tuple.is_empty() {
                return Err(SchemaError::EmptyUniqueConstraint {
                    definition: qualified_name,
                });
            }
            if let Some(unknown) = tuple.iter().find(|p| !seen.contains(*p)) {
                return Err(SchemaError::UnknownUniqueProperty {
                    definition: qualified_name,
                    property: unknown.clone(),
                });
            }
            let repeated = tuple
                .iter()
                .enumerate()
                .find_map(|(i, p)| tuple[..i].contains(p).then_some(p));
            if let Some(repeated) = repeated {
                return Err(SchemaError::DuplicateUniqueProperty {
                    definition: qualified_name,
                    property: repeated.clone(),
                });
            }
            uniques.push(UniqueConstraint::new(tuple));
        }

        let id = ObjectDefId::new(self.builder.next_def_id);
        self.builder.next_def_id += 1;

        debug!(
            definition = %qualified_name,
            properties = properties.len(),
            uniques = uniques.len(),
            "object definition registered"
        );

        self.builder.names.insert(qualified_name.clone(), id);
        self.builder.defs.push(ObjectDef {
            id,
            module: self.module,
            name: self.name,
            qualified_name,
            groups,
            properties,
            uniques,
            hook: self.hook,
        });

        Ok(id)
    }
}
