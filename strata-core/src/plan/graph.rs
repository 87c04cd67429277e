//! Dependency graph over stacks.
//!
//! Built once from the declared requirements, validated for unknown
//! dependencies and cycles up front. Destroy plans use the reversed view:
//! "A requires B" becomes "destroy A before B".

use crate::error::{Result, StrataError};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Directed dependency relation keyed by stack FQN.
///
/// An edge `a -> b` in `deps` means `a` requires `b` to finish first.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    deps: BTreeMap<String, BTreeSet<String>>,
}

impl Graph {
    /// Build a graph from `(fqn, requires)` pairs.
    ///
    /// Fails fast if a declared dependency references an unknown stack or if
    /// the relation contains a cycle. Cycles are a configuration defect, not
    /// a runtime condition to recover from.
    pub fn build<'a, I>(stacks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a BTreeSet<String>)>,
    {
        let mut deps: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (fqn, requires) in stacks {
            deps.insert(fqn.to_string(), requires.clone());
        }

        for (fqn, requires) in &deps {
            for dep in requires {
                if !deps.contains_key(dep) {
                    return Err(StrataError::MissingDependency {
                        stack: fqn.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let graph = Self { deps };
        // Topological sort doubles as cycle detection.
        graph.topological_sort()?;
        Ok(graph)
    }

    /// Return a new graph with every edge direction inverted.
    pub fn reverse(&self) -> Self {
        let mut deps: BTreeMap<String, BTreeSet<String>> =
            self.deps.keys().map(|k| (k.clone(), BTreeSet::new())).collect();
        for (fqn, requires) in &self.deps {
            for dep in requires {
                deps.get_mut(dep).expect("node present by construction").insert(fqn.clone());
            }
        }
        Self { deps }
    }

    /// Dependencies of one node.
    pub fn requires(&self, fqn: &str) -> Option<&BTreeSet<String>> {
        self.deps.get(fqn)
    }

    /// All node FQNs.
    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.deps.keys()
    }

    /// Restrict the graph to `targets` plus everything they transitively
    /// require. An empty target set keeps the whole graph.
    pub fn restrict(&self, targets: &[String]) -> Self {
        if targets.is_empty() {
            return self.clone();
        }

        let mut keep: BTreeSet<String> = BTreeSet::new();
        let mut queue: VecDeque<&str> = targets.iter().map(String::as_str).collect();
        while let Some(fqn) = queue.pop_front() {
            if !keep.insert(fqn.to_string()) {
                continue;
            }
            if let Some(requires) = self.deps.get(fqn) {
                for dep in requires {
                    queue.push_back(dep);
                }
            }
        }

        let deps = self
            .deps
            .iter()
            .filter(|(fqn, _)| keep.contains(*fqn))
            .map(|(fqn, requires)| {
                let kept: BTreeSet<String> =
                    requires.iter().filter(|d| keep.contains(*d)).cloned().collect();
                (fqn.clone(), kept)
            })
            .collect();
        Self { deps }
    }

    /// Nodes in dependency order (Kahn's algorithm).
    ///
    /// Fails with `CircularDependency` naming the unprocessed nodes if the
    /// relation contains a cycle.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        let mut in_degree: BTreeMap<&str, usize> =
            self.deps.keys().map(|k| (k.as_str(), 0)).collect();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for (fqn, requires) in &self.deps {
            for dep in requires {
                *in_degree.get_mut(fqn.as_str()).expect("node present") += 1;
                dependents.entry(dep.as_str()).or_default().push(fqn.as_str());
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&fqn, _)| fqn)
            .collect();
        let mut order = Vec::with_capacity(self.deps.len());

        while let Some(fqn) = queue.pop_front() {
            order.push(fqn.to_string());
            if let Some(deps) = dependents.get(fqn) {
                for &dependent in deps {
                    let deg = in_degree.get_mut(dependent).expect("node present");
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if order.len() != self.deps.len() {
            let stacks = self
                .deps
                .keys()
                .filter(|k| !order.contains(k))
                .cloned()
                .collect();
            return Err(StrataError::CircularDependency { stacks });
        }

        Ok(order)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}
