use crate::bom::{display_value, format_type_name};
use crate::connectivity::ConnectivityManager;
use crate::netlist::{build_netlist, net_names};
use crate::project::Project;
use crate::types::{natural_sort_key, Component};
use std::fmt::Write;

/// Plain-text schematic: every component with its pin nets, then every net.
///
/// Unconnected pins read `NC`. Components are listed in natural designator
/// order.
pub fn schematic_text(project: &Project, manager: &ConnectivityManager, title: &str) -> String {
    let names = net_names(project, manager);
    let mut components: Vec<&Component> = project.components().collect();
    components.sort_by_key(|c| natural_sort_key(&c.designator));

    let mut out = String::new();
    let _ = writeln!(out, "SCHEMATIC: {title}");
    let _ = writeln!(out);
    let _ = writeln!(out, "COMPONENTS ({})", components.len());
    for comp in &components {
        let _ = writeln!(
            out,
            "{} {} [{}] {}",
            comp.designator,
            format_type_name(&comp.component_type),
            display_value(comp),
            comp.layer
        );
        for pin in 1..=comp.pin_count {
            let net = match comp.pin_node(pin) {
                Some(node) => names
                    .get(&node)
                    .cloned()
                    .unwrap_or_else(|| format!("N{node}")),
                None => "NC".to_string(),
            };
            match comp.pin_name(pin) {
                Some(name) => {
                    let _ = writeln!(out, "  {pin} ({name}): {net}");
                }
                None => {
                    let _ = writeln!(out, "  {pin}: {net}");
                }
            }
        }
    }

    let netlist = build_netlist(project, manager);
    let _ = writeln!(out);
    let _ = writeln!(out, "NETS ({})", netlist.nets.len());
    for net in &netlist.nets {
        let pins: Vec<String> = net
            .pins
            .iter()
            .map(|p| format!("{}.{}", p.designator, p.pin))
            .collect();
        let _ = writeln!(out, "{}: {}", net.name, pins.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::find_definition;
    use crate::instance::InstanceOptions;
    use crate::types::{Layer, Point};
    use crate::EditorOptions;

    #[test]
    fn test_schematic_text() {
        let mut p = Project::new("led", EditorOptions::default());
        let gnd = p.add_ground_symbol(Point::new(0.0, 0.0), Layer::Top, None).unwrap();
        let opts = |d: &str| InstanceOptions {
            designator: Some(d.to_string()),
            ..Default::default()
        };
        let r10 = p.place_component(
            find_definition("Resistor").unwrap(),
            Layer::Top,
            Point::new(0.0, 100.0),
            opts("R10"),
        )
        .unwrap();
        p.place_component(
            find_definition("Resistor").unwrap(),
            Layer::Bottom,
            Point::new(50.0, 100.0),
            opts("R2"),
        )
        .unwrap();
        let d1 = p.place_component(
            find_definition("LED").unwrap(),
            Layer::Top,
            Point::new(100.0, 100.0),
            InstanceOptions::default(),
        )
        .unwrap();
        p.connect_pin(&r10, 2, gnd.node_id).unwrap();
        p.connect_pin(&d1, 2, gnd.node_id).unwrap();

        let text = schematic_text(&p, &p.connectivity(), "LED board");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SCHEMATIC: LED board");
        assert_eq!(lines[2], "COMPONENTS (3)");
        assert_eq!(lines[3], "D1 LED [LED] top");
        assert_eq!(lines[4], "  1 (A): NC");
        assert_eq!(lines[5], "  2 (K): GND");
        assert_eq!(lines[6], "R2 Resistor [10kΩ] bottom");
        assert_eq!(lines[9], "R10 Resistor [10kΩ] top");
        assert_eq!(lines[11], "  2: GND");
        assert!(text.ends_with("NETS (1)\nGND: D1.2, R10.2\n"));
    }
}
