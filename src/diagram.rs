use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{FlowGraph, FlowSummary, LinkEntry};

pub const DEFAULT_TITLE: &str = "Game, visualized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramNode {
    pub id: u8,
    pub label: String,
    pub color: String,
    /// Occupancy count from the aggregator.
    pub weight: usize,
    /// Larger of the node's source and target occurrences among the used links.
    pub link_freq: usize,
}

/// Renderer-facing payload: nodes, per-transition edges and aggregated flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SankeyDiagram {
    pub title: String,
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<LinkEntry>,
    pub flows: Vec<FlowSummary>,
}

impl SankeyDiagram {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.nodes.iter().all(|n| n.weight == 0)
    }
}

pub fn build_diagram(graph: FlowGraph, max_links: Option<usize>) -> SankeyDiagram {
    let FlowGraph {
        nodes,
        flows,
        mut links,
    } = graph;

    if let Some(cap) = max_links {
        links.truncate(cap);
    }

    let freq = link_frequencies(&links);
    let nodes = nodes
        .into_iter()
        .map(|n| DiagramNode {
            link_freq: freq.get(&n.id).copied().unwrap_or(0),
            id: n.id,
            label: n.label,
            color: n.color,
            weight: n.count,
        })
        .collect();

    SankeyDiagram {
        title: DEFAULT_TITLE.to_string(),
        nodes,
        edges: links,
        flows,
    }
}

fn link_frequencies(links: &[LinkEntry]) -> BTreeMap<u8, usize> {
    let mut as_source: BTreeMap<u8, usize> = BTreeMap::new();
    let mut as_target: BTreeMap<u8, usize> = BTreeMap::new();
    for link in links {
        *as_source.entry(link.source).or_default() += 1;
        *as_target.entry(link.target).or_default() += 1;
    }

    let mut out = as_source.clone();
    for (id, count) in as_target {
        let entry = out.entry(id).or_default();
        *entry = (*entry).max(count);
    }
    out
}
