use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use itertools::Itertools;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::{NodeTrait, UnGraphMap};
use tracing::trace;
use unordered_pair::UnorderedPair;

/// A set of edges whose removal disconnects a graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cut<N>
where
    N: NodeTrait,
{
    edges: HashSet<UnorderedPair<N>>,
    weight: usize,
}

impl<N> Cut<N>
where
    N: NodeTrait,
{
    /// The cut edges, by endpoints.
    pub fn edges(&self) -> &HashSet<UnorderedPair<N>> {
        &self.edges
    }

    /// Total weight of the cut edges; every edge weighs one.
    pub fn weight(&self) -> usize {
        self.weight
    }
}

/// The capability of finding a minimum edge cut of an undirected graph.
pub trait MinCut {
    /// A cut of least weight, or `None` if the graph has fewer than two nodes.
    fn min_cut<N, E>(&self, graph: &UnGraphMap<N, E>) -> Option<Cut<N>>
    where
        N: NodeTrait;
}

/// Deterministic global minimum cut by Stoer and Wagner.
///
/// # Method
/// Each phase grows a set A from an arbitrary node, always adding the node most tightly connected to A.
/// The weight connecting the last node added to the rest is a cut; the last two nodes are then merged.
/// After `n - 1` phases the lightest such cut is a global minimum.
#[derive(Copy, Clone, Debug, Default)]
pub struct StoerWagner;

impl StoerWagner {
    /// Run one phase over the active nodes, returning the last two nodes added and the cut-of-the-phase weight.
    fn phase(adjacency: &[HashMap<usize, usize>], active: &[bool]) -> Option<(usize, usize, usize)> {
        let mut added = vec![false; adjacency.len()];
        let mut connection = vec![0usize; adjacency.len()];
        let mut frontier = active.iter()
            .positions(|is_active| *is_active)
            .map(|node| (0, Reverse(node)))
            .collect::<BinaryHeap<_>>();

        let mut order: Vec<usize> = Vec::new();
        while let Some((weight, Reverse(node))) = frontier.pop() {
            // stale entries carry an older, smaller weight
            if added[node] || weight != connection[node] {
                continue;
            }

            added[node] = true;
            order.push(node);
            for (&neighbor, &edge_weight) in adjacency[node].iter() {
                if !added[neighbor] {
                    connection[neighbor] += edge_weight;
                    frontier.push((connection[neighbor], Reverse(neighbor)));
                }
            }
        }

        match order[..] {
            [.., s, t] => Some((s, t, connection[t])),
            _ => None,
        }
    }

    fn merge(adjacency: &mut [HashMap<usize, usize>], s: usize, t: usize) {
        let edges = std::mem::take(&mut adjacency[t]);
        for (neighbor, weight) in edges {
            adjacency[neighbor].remove(&t);
            if neighbor != s {
                *adjacency[s].entry(neighbor).or_default() += weight;
                *adjacency[neighbor].entry(s).or_default() += weight;
            }
        }
    }
}

impl MinCut for StoerWagner {
    fn min_cut<N, E>(&self, graph: &UnGraphMap<N, E>) -> Option<Cut<N>>
    where
        N: NodeTrait,
    {
        let nodes = graph.nodes().collect_vec();
        let index: HashMap<N, usize> = nodes.iter().enumerate().map(|(i, node)| (*node, i)).collect();

        let mut adjacency = vec![HashMap::new(); nodes.len()];
        for (a, b, _) in graph.all_edges() {
            let (a, b) = (index[&a], index[&b]);
            // self loops never cross a cut
            if a != b {
                *adjacency[a].entry(b).or_default() += 1;
                *adjacency[b].entry(a).or_default() += 1;
            }
        }

        let mut members = (0..nodes.len()).map(|i| vec![i]).collect_vec();
        let mut active = vec![true; nodes.len()];
        let mut best: Option<(usize, Vec<usize>)> = None;

        for _ in 1..nodes.len() {
            let (s, t, weight) = Self::phase(&adjacency, &active)?;
            trace!(s, t, weight, "cut of the phase");

            if best.as_ref().map_or(true, |(best_weight, _)| weight < *best_weight) {
                best = Some((weight, members[t].clone()));
            }

            Self::merge(&mut adjacency, s, t);
            let moved = std::mem::take(&mut members[t]);
            members[s].extend(moved);
            active[t] = false;
        }

        let (weight, side) = best?;
        let side: HashSet<N> = side.into_iter().map(|i| nodes[i]).collect();
        let edges = graph.all_edges()
            .filter(|(a, b, _)| side.contains(a) != side.contains(b))
            .map(|(a, b, _)| UnorderedPair(a, b))
            .collect::<HashSet<_>>();

        Some(Cut { edges, weight })
    }
}

/// The connected components of `graph`, each as a list of nodes.
pub fn components<N, E>(graph: &UnGraphMap<N, E>) -> Vec<Vec<N>>
where
    N: NodeTrait,
{
    // in an undirected graph, strongly connected means connected
    tarjan_scc(graph)
}
