use crate::types::{
    Component, DrawingStroke, GroundSymbol, NodeId, PowerBus, PowerSymbol, StrokeKind,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One object attached to a net.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NetMember {
    Stroke {
        id: String,
        stroke: StrokeKind,
    },
    #[serde(rename_all = "camelCase")]
    ComponentPin {
        component_id: String,
        designator: String,
        pin: usize,
    },
    PowerSymbol {
        id: String,
    },
    GroundSymbol {
        id: String,
    },
}

/// Electrical classification of a node, used for colouring and labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeType {
    /// Claimed by a power symbol whose bus is missing or has no voltage.
    PowerSignal,
    Power { bus: String, voltage: String },
    Ground,
    Signal,
    Unknown,
}

impl NodeType {
    pub fn label(&self) -> String {
        match self {
            NodeType::PowerSignal => "Power".to_string(),
            NodeType::Power { voltage, .. } => voltage.clone(),
            NodeType::Ground => "GND".to_string(),
            NodeType::Signal => "Signal".to_string(),
            NodeType::Unknown => "Unknown".to_string(),
        }
    }
}

/// Every member sharing one node id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Net {
    pub node_id: NodeId,
    pub node_type: NodeType,
    pub members: BTreeSet<NetMember>,
}

impl Net {
    fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            node_type: NodeType::Unknown,
            members: BTreeSet::new(),
        }
    }

    /// `(component id, designator, pin)` of every component pin on this net.
    pub fn pins(&self) -> impl Iterator<Item = (&str, &str, usize)> {
        self.members.iter().filter_map(|m| match m {
            NetMember::ComponentPin {
                component_id,
                designator,
                pin,
            } => Some((component_id.as_str(), designator.as_str(), *pin)),
            _ => None,
        })
    }

    pub fn stroke_ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|m| match m {
            NetMember::Stroke { id, .. } => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn contains_stroke(&self, stroke_id: &str) -> bool {
        self.stroke_ids().any(|id| id == stroke_id)
    }
}

/// Counts reported after a sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub nets: usize,
    pub strokes: usize,
    pub pins: usize,
    pub power_symbols: usize,
    pub ground_symbols: usize,
}

/// Index from node id to net members, rebuilt from a snapshot on each sync.
/// Members join a net by carrying its id; coordinates play no part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectivityManager {
    nets: BTreeMap<NodeId, Net>,
    /// Bus id of the first power symbol claiming each node.
    power_claims: BTreeMap<NodeId, String>,
    ground_claims: BTreeSet<NodeId>,
    /// Nodes referenced by at least one via, pad or trace.
    copper: BTreeSet<NodeId>,
    stats: SyncStats,
}

impl ConnectivityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the graph from the current collections.
    ///
    /// Inputs are only read. Calling this twice with the same snapshot leaves
    /// the manager in the same state.
    pub fn sync<'a, I>(
        &mut self,
        strokes: &[DrawingStroke],
        components: I,
        power_symbols: &[PowerSymbol],
        ground_symbols: &[GroundSymbol],
        power_buses: &[PowerBus],
    ) where
        I: IntoIterator<Item = &'a Component>,
    {
        self.nets.clear();
        self.power_claims.clear();
        self.ground_claims.clear();
        self.copper.clear();
        let mut stats = SyncStats::default();

        for stroke in strokes {
            let mut touched = false;
            for node in stroke.node_ids() {
                touched = true;
                if stroke.kind != StrokeKind::TestPoint {
                    self.copper.insert(node);
                }
                self.net_mut(node).members.insert(NetMember::Stroke {
                    id: stroke.id.clone(),
                    stroke: stroke.kind,
                });
            }
            if touched {
                stats.strokes += 1;
            }
        }

        for component in components {
            for (pin, node) in component.connected_pins() {
                stats.pins += 1;
                self.net_mut(node).members.insert(NetMember::ComponentPin {
                    component_id: component.id.clone(),
                    designator: component.designator.clone(),
                    pin,
                });
            }
        }

        for symbol in power_symbols {
            stats.power_symbols += 1;
            self.power_claims
                .entry(symbol.node_id)
                .or_insert_with(|| symbol.bus_id.clone());
            self.net_mut(symbol.node_id)
                .members
                .insert(NetMember::PowerSymbol {
                    id: symbol.id.clone(),
                });
        }

        for symbol in ground_symbols {
            stats.ground_symbols += 1;
            self.ground_claims.insert(symbol.node_id);
            self.net_mut(symbol.node_id)
                .members
                .insert(NetMember::GroundSymbol {
                    id: symbol.id.clone(),
                });
        }

        let node_ids: Vec<NodeId> = self.nets.keys().copied().collect();
        for node in node_ids {
            let node_type = self.resolve_node_type(node, power_buses);
            if let Some(net) = self.nets.get_mut(&node) {
                net.node_type = node_type;
            }
        }

        stats.nets = self.nets.len();
        self.stats = stats;
        log::debug!(
            "connectivity sync: {} nets from {} strokes, {} pins, {} power, {} ground",
            stats.nets,
            stats.strokes,
            stats.pins,
            stats.power_symbols,
            stats.ground_symbols
        );
    }

    fn net_mut(&mut self, node: NodeId) -> &mut Net {
        self.nets.entry(node).or_insert_with(|| Net::new(node))
    }

    /// Classify a node: power (by bus voltage), ground, signal or unknown.
    pub fn resolve_node_type(&self, node: NodeId, power_buses: &[PowerBus]) -> NodeType {
        if let Some(bus_id) = self.power_claims.get(&node) {
            return match power_buses.iter().find(|b| &b.id == bus_id) {
                Some(bus) if !bus.voltage.trim().is_empty() => NodeType::Power {
                    bus: bus.name.clone(),
                    voltage: bus.voltage.clone(),
                },
                _ => NodeType::PowerSignal,
            };
        }
        if self.ground_claims.contains(&node) {
            NodeType::Ground
        } else if self.copper.contains(&node) {
            NodeType::Signal
        } else {
            NodeType::Unknown
        }
    }

    /// Members sharing `node`, or `None` when nothing references it.
    pub fn net_of(&self, node: NodeId) -> Option<&Net> {
        self.nets.get(&node)
    }

    /// Every net in ascending node-id order.
    pub fn all_nets(&self) -> impl Iterator<Item = &Net> + '_ {
        self.nets.values()
    }

    /// Net a stroke belongs to, via any of its id-bearing vertices.
    pub fn nets_of_stroke<'a>(&'a self, stroke: &'a DrawingStroke) -> impl Iterator<Item = &'a Net> {
        let ids: BTreeSet<NodeId> = stroke.node_ids().collect();
        ids.into_iter().filter_map(move |id| self.nets.get(&id))
    }

    pub fn is_power_node(&self, node: NodeId) -> bool {
        self.power_claims.contains_key(&node)
    }

    pub fn is_ground_node(&self, node: NodeId) -> bool {
        self.ground_claims.contains(&node)
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }
}
