use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::play::{Play, PlayId};
use crate::sequencer::Transition;
use crate::situation::{SituationState, StateTable};

/// Restricts counting to one team's offensive or defensive plays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "team", rename_all = "snake_case")]
pub enum TeamFilter {
    #[default]
    All,
    Offense(String),
    Defense(String),
}

impl TeamFilter {
    pub fn matches(&self, play: &Play) -> bool {
        match self {
            TeamFilter::All => true,
            TeamFilter::Offense(team) => play.poss == *team,
            TeamFilter::Defense(team) => play.def == *team,
        }
    }

    pub fn team(&self) -> Option<&str> {
        match self {
            TeamFilter::All => None,
            TeamFilter::Offense(team) | TeamFilter::Defense(team) => Some(team),
        }
    }
}

/// Play memberships per node and per flow, deduplicated by play identity.
/// Values are positions in the sequenced slice.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    nodes: BTreeMap<SituationState, BTreeMap<PlayId, usize>>,
    flows: BTreeMap<(SituationState, SituationState), BTreeMap<PlayId, usize>>,
}

impl Ledger {
    pub fn build(plays: &[Play], transitions: &[Transition], states: &StateTable) -> Self {
        let mut ledger = Ledger::default();
        for state in SituationState::ALL {
            ledger.nodes.insert(state, BTreeMap::new());
        }

        for t in transitions {
            let src_id = plays[t.source].id;
            ledger
                .nodes
                .entry(t.source_state)
                .or_default()
                .insert(src_id, t.source);

            if t.target_state.is_terminal() {
                ledger
                    .nodes
                    .entry(t.target_state)
                    .or_default()
                    .insert(plays[t.target].id, t.target);
            }

            if !states.shares_leading_char(t.source_state, t.target_state) {
                ledger
                    .flows
                    .entry((t.source_state, t.target_state))
                    .or_default()
                    .insert(src_id, t.source);
            }
        }
        ledger
    }

    pub fn node_members(&self, state: SituationState) -> impl Iterator<Item = PlayId> + '_ {
        self.nodes.get(&state).into_iter().flat_map(|m| m.keys().copied())
    }

    pub fn flow_members(
        &self,
        source: SituationState,
        target: SituationState,
    ) -> impl Iterator<Item = PlayId> + '_ {
        self.flows
            .get(&(source, target))
            .into_iter()
            .flat_map(|m| m.keys().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub id: u8,
    pub label: String,
    pub color: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSummary {
    pub source: u8,
    pub target: u8,
    pub value: usize,
    pub color: String,
}

/// One transition as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEntry {
    pub source: u8,
    pub target: u8,
    pub value: usize,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<NodeSummary>,
    pub flows: Vec<FlowSummary>,
    pub links: Vec<LinkEntry>,
}

impl FlowGraph {
    pub fn node_count(&self, state: SituationState) -> usize {
        self.nodes
            .iter()
            .find(|n| n.id == state.id())
            .map(|n| n.count)
            .unwrap_or(0)
    }

    pub fn flow_count(&self, source: SituationState, target: SituationState) -> usize {
        self.flows
            .iter()
            .find(|f| f.source == source.id() && f.target == target.id())
            .map(|f| f.value)
            .unwrap_or(0)
    }
}

/// Fold transitions into node and flow counts under `filter`.
pub fn aggregate(
    plays: &[Play],
    transitions: &[Transition],
    filter: &TeamFilter,
    states: &StateTable,
) -> FlowGraph {
    let ledger = Ledger::build(plays, transitions, states);

    let nodes = ledger
        .nodes
        .iter()
        .map(|(state, members)| NodeSummary {
            id: state.id(),
            label: states.label(*state).to_string(),
            color: states.node_color(*state).to_string(),
            count: members.values().filter(|&&idx| filter.matches(&plays[idx])).count(),
        })
        .collect();

    let flows = ledger
        .flows
        .iter()
        .map(|((source, target), members)| FlowSummary {
            source: source.id(),
            target: target.id(),
            value: members.values().filter(|&&idx| filter.matches(&plays[idx])).count(),
            color: states.flow_color(*target).to_string(),
        })
        .collect();

    let links = transitions
        .iter()
        .filter(|t| filter.matches(&plays[t.source]))
        .filter(|t| !states.shares_leading_char(t.source_state, t.target_state))
        .map(|t| LinkEntry {
            source: t.source_state.id(),
            target: t.target_state.id(),
            value: 1,
            label: t.label.clone(),
            color: states.flow_color(t.target_state).to_string(),
        })
        .collect();

    if let Some(team) = filter.team() {
        log::debug!("aggregated {} transitions filtered to {team}", transitions.len());
    }

    FlowGraph {
        nodes,
        flows,
        links,
    }
}
