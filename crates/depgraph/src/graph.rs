//! IncludeGraph - deduplicated include digraph

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Directed graph of headers, nodes kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct IncludeGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    successors: Vec<BTreeSet<usize>>,
}

impl IncludeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `name`, adding the node on first sight
    pub fn add_node(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        self.successors.push(BTreeSet::new());
        idx
    }

    pub fn add_edge(&mut self, from: usize, to: usize) {
        self.successors[from].insert(to);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(BTreeSet::len).sum()
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.nodes[idx]
    }

    pub fn successors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.successors[idx].iter().copied()
    }

    /// All `(from, to)` edges, ordered by source then target index
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(from, targets)| targets.iter().map(move |&to| (from, to)))
    }

    fn predecessors(&self) -> Vec<Vec<usize>> {
        let mut preds = vec![Vec::new(); self.nodes.len()];
        for (from, to) in self.edges() {
            preds[to].push(from);
        }
        preds
    }

    /// Nodes >= `start` reachable from `start` through nodes >= `start`
    fn reach(&self, start: usize, next: &dyn Fn(usize) -> Vec<usize>) -> HashSet<usize> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for w in next(v) {
                if w >= start && seen.insert(w) {
                    queue.push_back(w);
                }
            }
        }
        seen
    }

    /// Every elementary circuit, each starting at its smallest node index
    ///
    /// Johnson's algorithm: for each start node `s`, circuits through `s` are
    /// searched inside the strongly connected component of `s` in the
    /// subgraph of nodes `>= s`, so every circuit is found exactly once.
    pub fn simple_cycles(&self) -> Vec<Vec<usize>> {
        let n = self.nodes.len();
        let preds = self.predecessors();
        let mut cycles = Vec::new();

        for s in 0..n {
            let forward = self.reach(s, &|v| self.successors(v).collect());
            let backward = self.reach(s, &|v| preds[v].clone());
            let mut component = vec![false; n];
            for v in forward.intersection(&backward) {
                component[*v] = true;
            }

            let mut search = CircuitSearch {
                graph: self,
                start: s,
                component,
                blocked: vec![false; n],
                blocked_by: vec![HashSet::new(); n],
                stack: Vec::new(),
                cycles: &mut cycles,
            };
            search.circuit(s);
        }

        cycles
    }

    /// Cycles as node names, closed by repeating the first node
    pub fn named_cycles(&self) -> Vec<Vec<&str>> {
        self.simple_cycles()
            .into_iter()
            .map(|cycle| {
                let mut names: Vec<&str> = cycle.iter().map(|&i| self.name(i)).collect();
                names.push(self.name(cycle[0]));
                names
            })
            .collect()
    }

    /// Graphviz rendering
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph includes {\n");
        for node in &self.nodes {
            out.push_str(&format!("  {};\n", dot_quote(node)));
        }
        for (from, to) in self.edges() {
            out.push_str(&format!(
                "  {} -> {};\n",
                dot_quote(self.name(from)),
                dot_quote(self.name(to))
            ));
        }
        out.push_str("}\n");
        out
    }
}

struct CircuitSearch<'a> {
    graph: &'a IncludeGraph,
    start: usize,
    component: Vec<bool>,
    blocked: Vec<bool>,
    blocked_by: Vec<HashSet<usize>>,
    stack: Vec<usize>,
    cycles: &'a mut Vec<Vec<usize>>,
}

impl CircuitSearch<'_> {
    fn circuit(&mut self, v: usize) -> bool {
        let mut found = false;
        self.stack.push(v);
        self.blocked[v] = true;

        let next: Vec<usize> = self
            .graph
            .successors(v)
            .filter(|&w| self.component[w])
            .collect();
        for &w in &next {
            if w == self.start {
                self.cycles.push(self.stack.clone());
                found = true;
            } else if !self.blocked[w] && self.circuit(w) {
                found = true;
            }
        }

        if found {
            self.unblock(v);
        } else {
            for &w in &next {
                self.blocked_by[w].insert(v);
            }
        }

        self.stack.pop();
        found
    }

    fn unblock(&mut self, u: usize) {
        self.blocked[u] = false;
        let waiting: Vec<usize> = self.blocked_by[u].drain().collect();
        for w in waiting {
            if self.blocked[w] {
                self.unblock(w);
            }
        }
    }
}

fn dot_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `a -> b -> a`
pub fn format_cycle(names: &[&str]) -> String {
    names.join(" -> ")
}
