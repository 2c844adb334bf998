//! Plugin dependency graph derived from a [`PackageMap`].
//!
//! Ordering edges are `requiredPlugins` plus those `optionalPlugins` that
//! exist in the repository. `requiredBundles` only have to name known
//! plugins; they do not constrain start order.

use crate::map::PackageMap;
use kbn_manifest::PluginId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Required,
    Optional,
    Bundle,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Bundle => "bundle",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("plugin {plugin} depends on unknown {kind} plugin {dependency}")]
    MissingDependency {
        plugin: String,
        dependency: String,
        kind: DependencyKind,
    },
    #[error("circular plugin dependency: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },
    #[error("unknown plugin {0}")]
    UnknownPlugin(String),
}

/// A dependency naming a plugin that does not exist in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    pub plugin: PluginId,
    pub dependency: PluginId,
    pub kind: DependencyKind,
}

impl MissingDependency {
    /// Optional dependencies may legitimately be absent.
    pub fn is_error(&self) -> bool {
        self.kind != DependencyKind::Optional
    }

    fn to_error(&self) -> GraphError {
        GraphError::MissingDependency {
            plugin: self.plugin.to_string(),
            dependency: self.dependency.to_string(),
            kind: self.kind,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PluginNode {
    required: Vec<PluginId>,
    optional: Vec<PluginId>,
    bundles: Vec<PluginId>,
}

#[derive(Debug, Clone, Default)]
pub struct PluginGraph {
    nodes: BTreeMap<PluginId, PluginNode>,
}

impl PluginGraph {
    pub fn from_map(map: &PackageMap) -> Self {
        let nodes = map
            .plugins()
            .filter_map(|pkg| pkg.plugin())
            .map(|plugin| {
                (
                    plugin.id.clone(),
                    PluginNode {
                        required: plugin.required_plugins().to_vec(),
                        optional: plugin.optional_plugins().to_vec(),
                        bundles: plugin.required_bundles().to_vec(),
                    },
                )
            })
            .collect();
        let graph = Self { nodes };
        debug!("plugin graph with {} plugins", graph.len());
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Ordering edges of `id`: required deps plus optional deps that exist.
    fn edges<'a>(&'a self, node: &'a PluginNode) -> impl Iterator<Item = &'a PluginId> + 'a {
        node.required
            .iter()
            .chain(node.optional.iter())
            .filter(move |dep| self.nodes.contains_key(dep.as_str()))
    }

    pub fn missing_dependencies(&self) -> Vec<MissingDependency> {
        let mut missing = Vec::new();
        for (id, node) in &self.nodes {
            let groups = [
                (DependencyKind::Required, &node.required),
                (DependencyKind::Optional, &node.optional),
                (DependencyKind::Bundle, &node.bundles),
            ];
            for (kind, deps) in groups {
                for dep in deps.iter().filter(|d| !self.contains(d)) {
                    missing.push(MissingDependency {
                        plugin: id.clone(),
                        dependency: dep.clone(),
                        kind,
                    });
                }
            }
        }
        missing
    }

    /// First cycle found, as `a -> b -> ... -> a`.
    pub fn find_cycle(&self) -> Option<Vec<PluginId>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            graph: &'a PluginGraph,
            id: &'a PluginId,
            marks: &mut BTreeMap<&'a PluginId, Mark>,
            stack: &mut Vec<&'a PluginId>,
        ) -> Option<Vec<PluginId>> {
            match marks.get(id) {
                Some(Mark::Done) => return None,
                Some(Mark::Visiting) => {
                    let start = stack.iter().position(|s| *s == id).unwrap_or(0);
                    let mut cycle: Vec<PluginId> =
                        stack[start..].iter().map(|s| (*s).clone()).collect();
                    cycle.push(id.clone());
                    return Some(cycle);
                }
                None => {}
            }
            marks.insert(id, Mark::Visiting);
            stack.push(id);
            if let Some(node) = graph.nodes.get(id) {
                for dep in graph.edges(node) {
                    if let Some(cycle) = visit(graph, dep, marks, stack) {
                        return Some(cycle);
                    }
                }
            }
            stack.pop();
            marks.insert(id, Mark::Done);
            None
        }

        let mut marks = BTreeMap::new();
        let mut stack = Vec::new();
        self.nodes
            .keys()
            .find_map(|id| visit(self, id, &mut marks, &mut stack))
    }

    /// Plugins ordered so that every plugin comes after its dependencies.
    /// Ties are broken alphabetically.
    pub fn topological_order(&self) -> Result<Vec<PluginId>, GraphError> {
        let mut remaining: BTreeMap<&PluginId, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&PluginId, Vec<&PluginId>> = BTreeMap::new();
        for (id, node) in &self.nodes {
            let deps: BTreeSet<&PluginId> = self.edges(node).collect();
            remaining.insert(id, deps.len());
            for dep in deps {
                dependents.entry(dep).or_default().push(id);
            }
        }

        let mut ready: BTreeSet<&PluginId> = remaining
            .iter()
            .filter(|(_, &n)| n == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = ready.pop_first() {
            order.push(id.clone());
            for dependent in dependents.get(id).into_iter().flatten() {
                if let Some(n) = remaining.get_mut(dependent) {
                    *n -= 1;
                    if *n == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            let cycle = self.find_cycle().unwrap_or_default();
            Err(GraphError::Cycle {
                cycle: cycle.into_iter().map(PluginId::into_inner).collect(),
            })
        }
    }

    /// Transitive dependencies of `id` that exist in the graph, sorted.
    pub fn dependencies_of(&self, id: &str) -> Result<Vec<PluginId>, GraphError> {
        let Some(root) = self.nodes.get_key_value(id) else {
            return Err(GraphError::UnknownPlugin(id.to_owned()));
        };

        let mut seen: BTreeSet<&PluginId> = BTreeSet::new();
        let mut queue: VecDeque<&PluginId> = VecDeque::from([root.0]);
        while let Some(current) = queue.pop_front() {
            if let Some(node) = self.nodes.get(current) {
                for dep in self.edges(node) {
                    if seen.insert(dep) {
                        queue.push_back(dep);
                    }
                }
            }
        }
        seen.remove(root.0);
        Ok(seen.into_iter().cloned().collect())
    }

    /// Every problem in the graph: missing required or bundle deps, then a
    /// cycle if one exists. Missing optional deps are only logged.
    pub fn problems(&self) -> Vec<GraphError> {
        let mut problems = Vec::new();
        for missing in self.missing_dependencies() {
            if missing.is_error() {
                problems.push(missing.to_error());
            } else {
                warn!(
                    "plugin {} lists unknown optional plugin {}",
                    missing.plugin, missing.dependency
                );
            }
        }
        if let Some(cycle) = self.find_cycle() {
            problems.push(GraphError::Cycle {
                cycle: cycle.into_iter().map(PluginId::into_inner).collect(),
            });
        }
        problems
    }

    /// Fail on the first problem reported by [`problems`](Self::problems).
    pub fn check(&self) -> Result<(), GraphError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }
}
