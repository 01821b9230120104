use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use super::SymbolTable;

/// Dependency graph over a set of static libraries. Nodes are indices into
/// `libraries`; an edge `a -> b` means `a` needs a symbol `b` defines.
#[derive(Debug)]
pub struct DepGraph {
    libraries: Vec<PathBuf>,
    graph: DiGraphMap<usize, ()>,
    unresolved: BTreeMap<usize, BTreeSet<String>>,
}

/// Link order plus the cycles that had to be broken to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReport {
    /// Every library exactly once, dependencies first.
    pub order: Vec<PathBuf>,
    /// Groups of mutually dependent libraries (diagnostic; their relative
    /// internal order is arbitrary).
    pub cycles: Vec<Vec<PathBuf>>,
}

impl DepGraph {
    /// Builds the graph. A library depends on *every* other library that
    /// defines one of its undefined symbols. Symbols nobody defines are
    /// recorded as unresolved unless the baseline covers them.
    pub fn build(
        libraries: Vec<PathBuf>,
        tables: &[SymbolTable],
        baseline: &HashSet<String>,
    ) -> DepGraph {
        let mut graph = DiGraphMap::new();
        for index in 0..libraries.len() {
            graph.add_node(index);
        }

        let mut unresolved: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
        for (index, table) in tables.iter().enumerate() {
            for symbol in &table.undefined {
                let mut found = false;
                for (other, other_table) in tables.iter().enumerate() {
                    if other != index && other_table.defined.contains(symbol) {
                        graph.add_edge(index, other, ());
                        found = true;
                    }
                }
                if !found && !baseline.contains(symbol) {
                    unresolved.entry(index).or_default().insert(symbol.clone());
                }
            }
        }

        DepGraph {
            libraries,
            graph,
            unresolved,
        }
    }

    pub fn libraries(&self) -> &[PathBuf] {
        &self.libraries
    }

    /// Direct dependencies of one library, sorted.
    pub fn dependencies_of(&self, index: usize) -> Vec<&PathBuf> {
        let mut deps: Vec<usize> = self.graph.neighbors(index).collect();
        deps.sort_unstable();
        deps.into_iter().map(|dep| &self.libraries[dep]).collect()
    }

    /// Symbols no library or baseline defines, per library.
    pub fn unresolved(&self) -> Vec<(&PathBuf, &BTreeSet<String>)> {
        self.unresolved
            .iter()
            .map(|(index, symbols)| (&self.libraries[*index], symbols))
            .collect()
    }

    /// Orders the libraries dependencies-first.
    ///
    /// Strongly connected components are condensed, so libraries that
    /// depend on each other still all appear in the output; each
    /// multi-member component is also reported as a cycle diagnostic.
    pub fn ordered(&self) -> OrderReport {
        // tarjan_scc emits components in reverse topological order of the
        // condensation; with edges pointing at dependencies that places
        // every dependency before its dependents.
        let components = tarjan_scc(&self.graph);
        let mut order = Vec::with_capacity(self.libraries.len());
        let mut cycles = Vec::new();
        for mut component in components {
            component.sort_unstable();
            if component.len() > 1 {
                cycles.push(
                    component
                        .iter()
                        .map(|&index| self.libraries[index].clone())
                        .collect(),
                );
            }
            order.extend(component.into_iter().map(|index| self.libraries[index].clone()));
        }
        OrderReport { order, cycles }
    }
}
