//! Resource dependency graph.
//!
//! Declares resources by name and orders them so that every resource comes
//! after everything its constructor arguments refer to. Ties are broken by
//! declaration order, which makes the order deterministic and lets the
//! declaration double as documentation of the intended sequence.

use crate::GraphError;
use indexmap::IndexMap;
use provisioner_types::ResourceSpec;
use std::collections::HashSet;

/// A named set of resource specs with dependency edges.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    specs: IndexMap<String, ResourceSpec>,
}

impl ResourceGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from specs in declaration order.
    pub fn from_specs<I>(specs: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = ResourceSpec>,
    {
        let mut graph = Self::new();
        for spec in specs {
            graph.insert(spec)?;
        }
        Ok(graph)
    }

    /// Declare a resource. Names must be unique.
    pub fn insert(&mut self, spec: ResourceSpec) -> Result<(), GraphError> {
        if self.specs.contains_key(spec.name()) {
            return Err(GraphError::Duplicate(spec.name().to_string()));
        }
        self.specs.insert(spec.name().to_string(), spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ResourceSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Topological order, ties broken by declaration order.
    pub fn deployment_order(&self) -> Result<Vec<&ResourceSpec>, GraphError> {
        for spec in self.specs.values() {
            if let Some(missing) = spec.depends_on().iter().find(|d| !self.contains(d)) {
                return Err(GraphError::UnknownDependency {
                    resource: spec.name().to_string(),
                    dependency: missing.clone(),
                });
            }
        }

        let mut placed: HashSet<&str> = HashSet::with_capacity(self.specs.len());
        let mut order = Vec::with_capacity(self.specs.len());

        while order.len() < self.specs.len() {
            let next = self.specs.values().find(|spec| {
                !placed.contains(spec.name())
                    && spec
                        .depends_on()
                        .iter()
                        .all(|d| placed.contains(d.as_str()))
            });

            match next {
                Some(spec) => {
                    placed.insert(spec.name());
                    order.push(spec);
                }
                None => {
                    let remaining = self
                        .specs
                        .keys()
                        .filter(|name| !placed.contains(name.as_str()))
                        .cloned()
                        .collect();
                    return Err(GraphError::Cycle(remaining));
                }
            }
        }

        Ok(order)
    }
}
