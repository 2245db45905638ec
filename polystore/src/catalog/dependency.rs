// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dependency resolver
//!
//! Catalog objects form a directed graph with an edge from every referent to
//! each of its dependents. Topological order (Kahn) sequences creation,
//! its reverse sequences drops, and a breadth-first walk answers what a drop
//! would affect. `DependencyPaths` is the read-optimized companion for path
//! questions such as foreign-key reachability.

use super::error::{CatalogError, CatalogResult};
use super::id::EntityId;
use super::logical::NamespaceCatalog;
use super::operations::CatalogObject;
use super::state::CatalogState;
use petgraph::graphmap::{DiGraphMap, NodeTrait};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fmt;

/// Directed referent -> dependent graph over catalog objects
#[derive(Debug, Clone)]
pub struct DependencyGraph<N: NodeTrait> {
    graph: DiGraphMap<N, ()>,
}

impl<N: NodeTrait + fmt::Display> Default for DependencyGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeTrait + fmt::Display> DependencyGraph<N> {
    pub fn new() -> Self {
        Self {
            graph: DiGraphMap::new(),
        }
    }

    pub fn add_node(&mut self, node: N) {
        self.graph.add_node(node);
    }

    /// Record that `dependent` references `referent`; self references are ignored
    pub fn add_dependency(&mut self, referent: N, dependent: N) {
        if referent == dependent {
            self.graph.add_node(referent);
            return;
        }
        self.graph.add_edge(referent, dependent, ());
    }

    pub fn contains(&self, node: N) -> bool {
        self.graph.contains_node(node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> BTreeSet<N> {
        self.graph.nodes().collect()
    }

    pub fn edges(&self) -> Vec<(N, N)> {
        self.graph.all_edges().map(|(a, b, _)| (a, b)).collect()
    }

    /// Direct dependents of a node, sorted
    pub fn dependents(&self, node: N) -> Vec<N> {
        let mut out: Vec<_> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        out.sort();
        out
    }

    /// Creation order: every referent before its dependents
    ///
    /// Kahn's algorithm; nodes left over once no zero in-degree node remains
    /// sit on a cycle and are reported instead of a partial order.
    pub fn topological_order(&self) -> CatalogResult<Vec<N>> {
        let mut in_degree: BTreeMap<N, usize> = self
            .graph
            .nodes()
            .map(|n| (n, self.graph.neighbors_directed(n, Direction::Incoming).count()))
            .collect();

        let mut ready: VecDeque<N> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(node) = ready.pop_front() {
            in_degree.remove(&node);
            order.push(node);
            for dependent in self.dependents(node) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }

        if !in_degree.is_empty() {
            return Err(CatalogError::CycleDetected {
                nodes: in_degree.keys().map(|n| n.to_string()).collect(),
            });
        }
        Ok(order)
    }

    /// Everything transitively depending on `root`, root first, breadth first
    pub fn affected_by(&self, root: N) -> Vec<N> {
        if !self.contains(root) {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        let mut affected = Vec::new();
        seen.insert(root);
        queue.push_back(root);
        while let Some(node) = queue.pop_front() {
            affected.push(node);
            for dependent in self.dependents(node) {
                if seen.insert(dependent) {
                    queue.push_back(dependent);
                }
            }
        }
        affected
    }

    /// The graph restricted to `nodes`
    pub fn subgraph(&self, nodes: &[N]) -> Self {
        let keep: HashSet<_> = nodes.iter().copied().collect();
        let mut sub = Self::new();
        for node in nodes {
            sub.add_node(*node);
        }
        for (a, b, _) in self.graph.all_edges() {
            if keep.contains(&a) && keep.contains(&b) {
                sub.add_dependency(a, b);
            }
        }
        sub
    }

    /// Safe drop sequence for `root` and everything depending on it
    ///
    /// Dependents come before their referents. Fails with `CycleDetected` if
    /// the affected objects reference each other in a cycle.
    pub fn drop_order(&self, root: N) -> CatalogResult<Vec<N>> {
        let affected = self.affected_by(root);
        let mut order = self.subgraph(&affected).topological_order()?;
        order.reverse();
        Ok(order)
    }
}

/// Precomputed shortest paths over an immutable dependency graph
#[derive(Debug, Clone)]
pub struct DependencyPaths<N: NodeTrait> {
    adjacency: BTreeMap<N, Vec<N>>,
    shortest: BTreeMap<(N, N), Vec<N>>,
}

impl<N: NodeTrait + fmt::Display> DependencyPaths<N> {
    /// Relax paths edge by edge until a full pass shortens nothing
    pub fn build(graph: &DependencyGraph<N>) -> Self {
        let edges = graph.edges();
        let mut adjacency: BTreeMap<N, Vec<N>> = BTreeMap::new();
        for node in graph.nodes() {
            adjacency.insert(node, graph.dependents(node));
        }

        let mut shortest: BTreeMap<(N, N), Vec<N>> = BTreeMap::new();
        for (a, b) in &edges {
            shortest.insert((*a, *b), vec![*a, *b]);
        }

        loop {
            let mut updates = Vec::new();
            for (via, to) in &edges {
                for ((from, end), path) in &shortest {
                    if end != via || from == to || path.contains(to) {
                        continue;
                    }
                    let length = path.len() + 1;
                    let better = shortest
                        .get(&(*from, *to))
                        .map_or(true, |known| known.len() > length);
                    if better {
                        let mut extended = path.clone();
                        extended.push(*to);
                        updates.push(((*from, *to), extended));
                    }
                }
            }

            let mut changed = false;
            for (pair, path) in updates {
                let better = shortest
                    .get(&pair)
                    .map_or(true, |known| known.len() > path.len());
                if better {
                    shortest.insert(pair, path);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        Self {
            adjacency,
            shortest,
        }
    }

    /// Shortest path from `from` to `to`, both ends included
    pub fn shortest_path(&self, from: N, to: N) -> Option<&[N]> {
        self.shortest.get(&(from, to)).map(Vec::as_slice)
    }

    /// Number of edges on the shortest path
    pub fn distance(&self, from: N, to: N) -> Option<usize> {
        self.shortest_path(from, to).map(|p| p.len() - 1)
    }

    pub fn is_reachable(&self, from: N, to: N) -> bool {
        self.shortest.contains_key(&(from, to))
    }

    /// Every simple path from `from` to `to`
    pub fn all_paths(&self, from: N, to: N) -> Vec<Vec<N>> {
        let mut paths = Vec::new();
        if from == to || !self.adjacency.contains_key(&from) {
            return paths;
        }
        let mut current = vec![from];
        let mut visited = HashSet::new();
        visited.insert(from);
        self.walk(from, to, &mut current, &mut visited, &mut paths);
        paths
    }

    fn walk(
        &self,
        node: N,
        target: N,
        current: &mut Vec<N>,
        visited: &mut HashSet<N>,
        paths: &mut Vec<Vec<N>>,
    ) {
        let Some(next) = self.adjacency.get(&node) else {
            return;
        };
        for &step in next {
            if visited.contains(&step) {
                continue;
            }
            current.push(step);
            if step == target {
                paths.push(current.clone());
            } else {
                visited.insert(step);
                self.walk(step, target, current, visited, paths);
                visited.remove(&step);
            }
            current.pop();
        }
    }
}

/// Build the referent -> dependent graph of every object in `state`
pub fn build_dependency_graph(state: &CatalogState) -> DependencyGraph<CatalogObject> {
    use CatalogObject as O;

    let mut graph = DependencyGraph::new();

    for (namespace_id, catalog) in &state.logical {
        graph.add_node(O::Namespace(*namespace_id));
        for entity in catalog.as_catalog().entities() {
            graph.add_dependency(O::Namespace(*namespace_id), O::Entity(entity.id()));
        }

        if let NamespaceCatalog::Relational(rel) = catalog {
            for table in rel.tables() {
                for column in rel.columns(table.id) {
                    graph.add_dependency(O::Entity(table.id), O::Column(column.id));
                }
                for index in rel.indexes(table.id) {
                    graph.add_dependency(O::Key(index.key_id), O::Index(index.id));
                    if let Some(adapter) = index.location {
                        graph.add_dependency(O::Adapter(adapter), O::Index(index.id));
                    }
                }
            }
            for key in rel.all_keys() {
                graph.add_dependency(O::Entity(key.table_id), O::Key(key.id));
                for column in &key.column_ids {
                    graph.add_dependency(O::Column(*column), O::Key(key.id));
                }
                if let Some(fk) = key.foreign() {
                    graph.add_dependency(O::Entity(fk.referenced_table_id), O::Entity(key.table_id));
                    graph.add_dependency(O::Key(fk.referenced_key_id), O::Key(key.id));
                }
            }
        }
    }

    for template in state.templates.values() {
        graph.add_node(O::AdapterTemplate(template.id));
    }
    for adapter in state.adapters.values() {
        graph.add_dependency(O::AdapterTemplate(adapter.template_id), O::Adapter(adapter.id));
    }
    for interface in state.interfaces.keys() {
        graph.add_node(O::Interface(*interface));
    }
    for user in state.users.keys() {
        graph.add_node(O::User(*user));
    }

    let alloc = &state.allocation;
    for group in alloc.groups() {
        graph.add_dependency(O::Entity(group.entity_id), O::PartitionGroup(group.id));
        // A placement is laid out on every group and partition of its entity
        for placement in alloc.placements_of(group.entity_id) {
            graph.add_dependency(O::PartitionGroup(group.id), O::Placement(placement.id));
        }
    }
    for property in alloc.properties() {
        if let Some(column) = property.partition_column {
            for group in &property.group_ids {
                graph.add_dependency(O::Column(column), O::PartitionGroup(*group));
            }
        }
    }
    for partition in alloc.partitions() {
        graph.add_dependency(O::PartitionGroup(partition.group_id), O::Partition(partition.id));
        for placement in alloc.placements_of(partition.entity_id) {
            graph.add_dependency(O::Partition(partition.id), O::Placement(placement.id));
        }
    }
    for placement in alloc.placements() {
        graph.add_dependency(O::Entity(placement.logical_id), O::Placement(placement.id));
        graph.add_dependency(O::Adapter(placement.adapter_id), O::Placement(placement.id));
    }
    for allocation in alloc.allocations() {
        graph.add_dependency(O::Placement(allocation.placement_id), O::Allocation(allocation.id));
        graph.add_dependency(O::Partition(allocation.partition_id), O::Allocation(allocation.id));
    }
    for column in alloc.columns() {
        let node = O::AllocationColumn(column.key());
        graph.add_dependency(O::Placement(column.placement_id), node);
        graph.add_dependency(O::Partition(column.partition_id), node);
        graph.add_dependency(O::Column(column.column_id), node);
        if let Some(allocation) = alloc.allocation_for(column.placement_id, column.partition_id) {
            graph.add_dependency(O::Allocation(allocation.id), node);
        }
    }

    for physical in state.physical.iter() {
        graph.add_dependency(O::Allocation(physical.allocation_id), O::Physical(physical.id));
    }

    graph
}

/// Foreign-key graph between tables: an edge from each referencing table to
/// the table it references
pub fn foreign_key_graph(state: &CatalogState) -> DependencyGraph<EntityId> {
    let mut graph = DependencyGraph::new();
    for catalog in state.logical.values() {
        if let NamespaceCatalog::Relational(rel) = catalog {
            for table in rel.tables() {
                graph.add_node(table.id);
            }
            for key in rel.all_keys() {
                if let Some(fk) = key.foreign() {
                    graph.add_dependency(key.table_id, fk.referenced_table_id);
                }
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> DependencyGraph<u64> {
        // 1 -> 2 -> 3, 1 -> 3, 3 -> 4
        let mut graph = DependencyGraph::new();
        graph.add_dependency(1, 2);
        graph.add_dependency(2, 3);
        graph.add_dependency(1, 3);
        graph.add_dependency(3, 4);
        graph
    }

    #[test]
    fn test_topological_order_puts_referents_first() {
        let order = chain().topological_order().unwrap();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(1u64, 2);
        graph.add_dependency(2, 3);
        graph.add_dependency(3, 1);
        graph.add_dependency(0, 1);
        let err = graph.topological_order().unwrap_err();
        assert_eq!(
            err,
            CatalogError::CycleDetected {
                nodes: vec!["1".into(), "2".into(), "3".into()]
            }
        );
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(5u64, 5);
        assert_eq!(graph.topological_order().unwrap(), vec![5]);
    }

    #[test]
    fn test_drop_order_and_affected_set() {
        let graph = chain();
        assert_eq!(graph.affected_by(2), vec![2, 3, 4]);
        assert_eq!(graph.drop_order(2).unwrap(), vec![4, 3, 2]);
        assert!(graph.affected_by(42).is_empty());
    }

    #[test]
    fn test_shortest_and_all_paths() {
        let paths = DependencyPaths::build(&chain());
        assert_eq!(paths.shortest_path(1, 4), Some(&[1, 3, 4][..]));
        assert_eq!(paths.distance(1, 3), Some(1));
        assert!(paths.is_reachable(2, 4));
        assert!(!paths.is_reachable(4, 1));

        let mut all = paths.all_paths(1, 4);
        all.sort();
        assert_eq!(all, vec![vec![1, 2, 3, 4], vec![1, 3, 4]]);
    }

    #[test]
    fn test_paths_on_cycle_stay_simple() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(1u64, 2);
        graph.add_dependency(2, 3);
        graph.add_dependency(3, 1);
        let paths = DependencyPaths::build(&graph);
        assert_eq!(paths.shortest_path(1, 3), Some(&[1, 2, 3][..]));
        assert_eq!(paths.shortest_path(3, 2), Some(&[3, 1, 2][..]));
        assert!(!paths.is_reachable(1, 1));
        assert_eq!(paths.all_paths(2, 1), vec![vec![2, 3, 1]]);
    }
}
