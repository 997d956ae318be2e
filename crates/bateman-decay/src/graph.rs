//! Decay-chain graph and topological sorter.
//!
//! Nodes live in an arena and are addressed by index; edges point from a
//! parent to every daughter it produces. Stable nuclides are sinks.
//!
//! The sorter peels leaves: every round removes all nodes that have no
//! remaining outgoing edge, in name order, and appends them to the result.
//! Reversing the peeled sequence puts each producer before everything it
//! produces. A round that finds no leaf while nodes remain means the graph
//! holds a cycle.

use std::collections::{HashMap, VecDeque};

use bateman_core::error::ChainError;
use bateman_core::types::NuclideRegistry;

/// Per-solve graph over the nuclides reachable from a set of roots.
#[derive(Debug, Clone, Default)]
pub struct DecayGraph {
    labels: Vec<String>,
    index: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
}

impl DecayGraph {
    /// Build the graph of `roots` and everything they decay into.
    ///
    /// A root missing from the registry is [`ChainError::UnknownNuclide`];
    /// a daughter missing from it is [`ChainError::UnknownDaughter`].
    pub fn from_roots<'a, I>(registry: &NuclideRegistry, roots: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut graph = Self::default();
        let mut queue = VecDeque::new();

        for root in roots {
            if !registry.contains(root) {
                return Err(ChainError::UnknownNuclide(root.to_string()));
            }
            if let (idx, true) = graph.intern(root) {
                queue.push_back(idx);
            }
        }

        while let Some(parent) = queue.pop_front() {
            let name = graph.labels[parent].clone();
            let nuclide = registry
                .get(&name)
                .ok_or_else(|| ChainError::UnknownNuclide(name.clone()))?;
            if nuclide.stable {
                continue;
            }
            for daughter in nuclide.daughters.keys() {
                if !nuclide.decays_to(daughter) {
                    continue;
                }
                if !registry.contains(daughter) {
                    return Err(ChainError::UnknownDaughter {
                        parent: name.clone(),
                        daughter: daughter.clone(),
                    });
                }
                let (child, fresh) = graph.intern(daughter);
                graph.children[parent].push(child);
                graph.parents[child].push(parent);
                if fresh {
                    queue.push_back(child);
                }
            }
        }

        Ok(graph)
    }

    /// Build the graph over every nuclide in the registry.
    pub fn from_registry(registry: &NuclideRegistry) -> Result<Self, ChainError> {
        Self::from_roots(registry, registry.names())
    }

    /// Index of `label`, inserting a new node when unseen. The flag is true for new nodes.
    fn intern(&mut self, label: &str) -> (usize, bool) {
        if let Some(&idx) = self.index.get(label) {
            return (idx, false);
        }
        let idx = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), idx);
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
        (idx, true)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Daughters produced by node `idx`.
    pub fn children(&self, idx: usize) -> &[usize] {
        self.children.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All `(parent, daughter)` edges.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.children
            .iter()
            .enumerate()
            .flat_map(|(p, ds)| ds.iter().map(move |&d| (p, d)))
    }

    /// Order the nodes so that every parent precedes all of its daughters.
    ///
    /// Leaves peeled in the same round are sorted by name, which makes the
    /// order deterministic. Fails with [`ChainError::Cycle`] naming the nodes
    /// that could not be peeled.
    pub fn topological_order(&self) -> Result<Vec<String>, ChainError> {
        let n = self.len();
        let mut out_degree: Vec<usize> = self.children.iter().map(Vec::len).collect();
        let mut leaves: Vec<usize> = (0..n).filter(|&i| out_degree[i] == 0).collect();
        let mut peeled: Vec<usize> = Vec::with_capacity(n);

        while !leaves.is_empty() {
            leaves.sort_by(|&a, &b| self.labels[a].cmp(&self.labels[b]));
            let mut next = Vec::new();
            for &leaf in &leaves {
                for &parent in &self.parents[leaf] {
                    out_degree[parent] -= 1;
                    if out_degree[parent] == 0 {
                        next.push(parent);
                    }
                }
            }
            peeled.append(&mut leaves);
            leaves = next;
        }

        if peeled.len() < n {
            let mut done = vec![false; n];
            for &i in &peeled {
                done[i] = true;
            }
            let mut remaining: Vec<String> = (0..n)
                .filter(|&i| !done[i])
                .map(|i| self.labels[i].clone())
                .collect();
            remaining.sort();
            return Err(ChainError::Cycle(remaining));
        }

        Ok(peeled
            .into_iter()
            .rev()
            .map(|i| self.labels[i].clone())
            .collect())
    }
}
