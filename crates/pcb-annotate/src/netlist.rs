use crate::connectivity::{ConnectivityManager, Net, NetMember, NodeType};
use crate::project::Project;
use crate::types::{natural_sort_key, NodeId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Bus tying a net to others: the power bus of one of its power symbols,
/// or the ground bus of its ground symbols (`GND` when they have none).
fn bus_name(net: &Net, project: &Project) -> Option<String> {
    for member in &net.members {
        match member {
            NetMember::PowerSymbol { id } => {
                let bus = project
                    .power_symbols
                    .iter()
                    .find(|s| &s.id == id)
                    .and_then(|s| project.power_buses.iter().find(|b| b.id == s.bus_id));
                if let Some(bus) = bus {
                    return Some(bus.name.clone());
                }
            }
            NetMember::GroundSymbol { id } => {
                let bus = project
                    .ground_symbols
                    .iter()
                    .find(|s| &s.id == id)
                    .and_then(|s| s.bus_id.as_deref())
                    .and_then(|bus_id| project.ground_buses.iter().find(|b| b.id == bus_id));
                return Some(bus.map_or_else(|| "GND".to_string(), |b| b.name.clone()));
            }
            _ => {}
        }
    }
    None
}

/// Name a net: bus name for power/ground, else the first pin it touches,
/// else the bare node id.
pub fn suggest_net_name(net: &Net, project: &Project) -> String {
    if let Some(name) = bus_name(net, project) {
        return name;
    }
    let first_pin = net
        .pins()
        .min_by(|a, b| (natural_sort_key(a.1), a.2).cmp(&(natural_sort_key(b.1), b.2)));
    match first_pin {
        Some((_, designator, pin)) => format!("Net-({designator}-Pad{pin})"),
        None => format!("N{}", net.node_id),
    }
}

/// Suggested name of every net, by node id.
pub fn net_names(project: &Project, manager: &ConnectivityManager) -> BTreeMap<NodeId, String> {
    manager
        .all_nets()
        .map(|net| (net.node_id, suggest_net_name(net, project)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetlistPin {
    pub designator: String,
    pub pin: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetlistNet {
    pub name: String,
    pub node_ids: Vec<NodeId>,
    pub node_type: NodeType,
    pub pins: Vec<NetlistPin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Netlist {
    pub project_name: String,
    pub nets: Vec<NetlistNet>,
}

/// Every net touching at least one component pin, sorted by name.
///
/// Nets on the same bus become one entry. Every other net keeps its own
/// entry, even when two of them end up with the same name.
pub fn build_netlist(project: &Project, manager: &ConnectivityManager) -> Netlist {
    // (name, node) with no node for bus-tied entries
    let mut entries: BTreeMap<(String, Option<NodeId>), NetlistNet> = BTreeMap::new();
    for net in manager.all_nets() {
        let mut pins: Vec<NetlistPin> = net
            .pins()
            .map(|(component_id, designator, pin)| NetlistPin {
                designator: designator.to_string(),
                pin,
                pin_name: project
                    .component(component_id)
                    .and_then(|c| c.pin_name(pin))
                    .map(str::to_string),
            })
            .collect();
        if pins.is_empty() {
            continue;
        }
        let key = match bus_name(net, project) {
            Some(bus) => (bus, None),
            None => (suggest_net_name(net, project), Some(net.node_id)),
        };
        let name = key.0.clone();
        let entry = entries.entry(key).or_insert_with(|| NetlistNet {
            name,
            node_ids: Vec::new(),
            node_type: net.node_type.clone(),
            pins: Vec::new(),
        });
        entry.node_ids.push(net.node_id);
        entry.pins.append(&mut pins);
    }

    let nets = entries
        .into_values()
        .map(|mut net| {
            net.pins
                .sort_by_key(|p| (natural_sort_key(&p.designator), p.pin));
            net
        })
        .collect();
    Netlist {
        project_name: project.name.clone(),
        nets,
    }
}

impl Netlist {
    /// One `NET` line per net followed by its pins, indented.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Netlist: {}", self.project_name);
        for net in &self.nets {
            let ids: Vec<String> = net.node_ids.iter().map(NodeId::to_string).collect();
            let _ = writeln!(
                out,
                "NET \"{}\" {} (node {})",
                net.name,
                net.node_type.label(),
                ids.join(", ")
            );
            for pin in &net.pins {
                match &pin.pin_name {
                    Some(name) => {
                        let _ = writeln!(out, "  {}.{} ({name})", pin.designator, pin.pin);
                    }
                    None => {
                        let _ = writeln!(out, "  {}.{}", pin.designator, pin.pin);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::find_definition;
    use crate::instance::InstanceOptions;
    use crate::types::{Layer, Point};
    use crate::EditorOptions;

    fn place(p: &mut Project, name: &str, at: f64) -> String {
        p.place_component(
            find_definition(name).unwrap(),
            Layer::Top,
            Point::new(at, 200.0),
            InstanceOptions::default(),
        )
        .unwrap()
    }

    /// R1 and D1 in series from +5V to GND, with the middle node unnamed.
    fn divider() -> Project {
        let mut p = Project::new("blinky", EditorOptions::default());
        let bus = p.add_power_bus("+5V", "+5V", "#f00");
        let vcc = p.add_power_symbol(Point::new(0.0, 0.0), Layer::Top, &bus).unwrap();
        let gnd = p.add_ground_symbol(Point::new(100.0, 0.0), Layer::Top, None).unwrap();
        let mid = p.add_via(Point::new(50.0, 0.0), Layer::Top, "#0a0", 6.0).unwrap();
        let r = place(&mut p, "Resistor", 0.0);
        let d = place(&mut p, "Diode", 100.0);
        p.connect_pin(&r, 1, vcc.node_id).unwrap();
        p.connect_pin(&r, 2, mid.node_id).unwrap();
        p.connect_pin(&d, 1, mid.node_id).unwrap();
        p.connect_pin(&d, 2, gnd.node_id).unwrap();
        p
    }

    #[test]
    fn test_net_names() {
        let p = divider();
        let mgr = p.connectivity();
        let names: Vec<String> = net_names(&p, &mgr).into_values().collect();
        assert_eq!(names, vec!["+5V", "GND", "Net-(D1-Pad1)"]);
    }

    #[test]
    fn test_unconnected_node_named_by_id() {
        let mut p = Project::new("x", EditorOptions::default());
        let v = p.add_via(Point::new(0.0, 0.0), Layer::Top, "#0a0", 6.0).unwrap();
        let mgr = p.connectivity();
        let net = mgr.net_of(v.node_id).unwrap();
        assert_eq!(suggest_net_name(net, &p), format!("N{}", v.node_id));
    }

    #[test]
    fn test_ground_bus_name() {
        let mut p = Project::new("x", EditorOptions::default());
        let bus = p.add_ground_bus("AGND", "#888");
        let g = p.add_ground_symbol(Point::new(0.0, 0.0), Layer::Top, Some(&bus)).unwrap();
        let mgr = p.connectivity();
        assert_eq!(suggest_net_name(mgr.net_of(g.node_id).unwrap(), &p), "AGND");
    }

    #[test]
    fn test_build_netlist_skips_pinless_nets() {
        let mut p = divider();
        p.add_via(Point::new(500.0, 500.0), Layer::Bottom, "#0a0", 6.0).unwrap();
        let mgr = p.connectivity();
        let netlist = build_netlist(&p, &mgr);
        assert_eq!(netlist.nets.len(), 3);

        let mid = netlist.nets.iter().find(|n| n.name == "Net-(D1-Pad1)").unwrap();
        let pins: Vec<(&str, usize)> = mid.pins.iter().map(|p| (p.designator.as_str(), p.pin)).collect();
        assert_eq!(pins, vec![("D1", 1), ("R1", 2)]);
        assert_eq!(mid.pins[0].pin_name.as_deref(), Some("A"));
        assert_eq!(mid.node_type, NodeType::Signal);
    }

    #[test]
    fn test_nets_sharing_a_bus_merge() {
        let mut p = Project::new("x", EditorOptions::default());
        let bus = p.add_power_bus("VCC", "+3.3V", "#f00");
        let a = p.add_power_symbol(Point::new(0.0, 0.0), Layer::Top, &bus).unwrap();
        let b = p.add_power_symbol(Point::new(300.0, 0.0), Layer::Top, &bus).unwrap();
        assert_ne!(a.node_id, b.node_id);
        let r = place(&mut p, "Resistor", 0.0);
        let c = place(&mut p, "Ceramic Capacitor", 50.0);
        p.connect_pin(&r, 1, a.node_id).unwrap();
        p.connect_pin(&c, 1, b.node_id).unwrap();

        let netlist = build_netlist(&p, &p.connectivity());
        assert_eq!(netlist.nets.len(), 1);
        assert_eq!(netlist.nets[0].node_ids, vec![a.node_id, b.node_id]);
        assert_eq!(netlist.nets[0].pins.len(), 2);
    }

    #[test]
    fn test_same_name_on_separate_nodes_stays_separate() {
        let mut p = Project::new("x", EditorOptions::default());
        let a = p.add_via(Point::new(0.0, 0.0), Layer::Top, "#0a0", 6.0).unwrap();
        let b = p.add_via(Point::new(100.0, 0.0), Layer::Top, "#0a0", 6.0).unwrap();
        let first = place(&mut p, "Resistor", 0.0);
        let second = place(&mut p, "Resistor", 100.0);
        // A hand-edited project file can carry a repeated designator.
        p.top_components[1].designator = "R1".to_string();
        p.connect_pin(&first, 1, a.node_id).unwrap();
        p.connect_pin(&second, 1, b.node_id).unwrap();

        let netlist = build_netlist(&p, &p.connectivity());
        assert_eq!(netlist.nets.len(), 2);
        for net in &netlist.nets {
            assert_eq!(net.name, "Net-(R1-Pad1)");
            assert_eq!(net.node_ids.len(), 1);
            assert_eq!(net.pins.len(), 1);
        }
        assert_eq!(netlist.nets[0].node_ids, vec![a.node_id]);
        assert_eq!(netlist.nets[1].node_ids, vec![b.node_id]);
    }

    #[test]
    fn test_to_text() {
        let p = divider();
        let text = build_netlist(&p, &p.connectivity()).to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Netlist: blinky");
        assert_eq!(lines[1], "NET \"+5V\" +5V (node 1)");
        assert_eq!(lines[2], "  R1.1");
        assert!(lines.contains(&"  D1.2 (K)"));
    }
}
