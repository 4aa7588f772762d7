//! Wiring diagrams: `jqt: rhn xhk nvd` connects `jqt` to each of the three named components.

use itertools::Itertools;
use num_bigint::BigInt;
use petgraph::graphmap::UnGraphMap;
use tracing::{debug, info};

use crate::cut::{components, MinCut};
use crate::error::{Error, ParseError, Result};
use crate::puzzles::{non_empty, numbered_lines};

/// Read the diagram into an undirected graph; connections are listed once but go both ways.
pub fn parse(input: &str) -> std::result::Result<UnGraphMap<&str, ()>, ParseError> {
    let lines = numbered_lines(input)
        .map(|(line, text)| {
            let (left, right) = text.split_once(':').ok_or(ParseError::BadWiring { line })?;
            let (left, right) = (left.trim(), right.split_whitespace().collect_vec());
            if left.is_empty() || left.contains(char::is_whitespace) || right.is_empty() {
                return Err(ParseError::BadWiring { line });
            }

            Ok((left, right))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut graph = UnGraphMap::new();
    for (left, right) in non_empty(lines)? {
        for node in right {
            graph.add_edge(left, node, ());
        }
    }

    Ok(graph)
}

/// Cut the fewest wires splitting `graph` in two, answering with the product of the two group sizes.
///
/// If `expected_cut` is given, the minimum cut must have exactly that many wires.
pub fn split<N, E>(graph: &UnGraphMap<N, E>, expected_cut: Option<usize>, cutter: &impl MinCut) -> Result<BigInt>
where
    N: petgraph::graphmap::NodeTrait + std::fmt::Debug,
    E: Clone,
{
    let cut = cutter.min_cut(graph).ok_or(Error::NoCut)?;
    info!(wires = cut.weight(), cut = ?cut.edges(), "minimum cut found");
    if let Some(expected) = expected_cut.filter(|expected| *expected != cut.weight()) {
        return Err(Error::CutSize { found: cut.weight(), expected });
    }

    let mut remaining = graph.clone();
    for wire in cut.edges() {
        remaining.remove_edge(wire.0, wire.1);
    }

    let groups = components(&remaining);
    debug!(groups = groups.len(), "graph cut");
    match &groups[..] {
        [a, b] => Ok(BigInt::from(a.len()) * BigInt::from(b.len())),
        _ => Err(Error::Partition(groups.len())),
    }
}
